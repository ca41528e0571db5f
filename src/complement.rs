//! Complementary products: what a video uses that the user does not own.

use crate::content::{ContentIndex, ContentMention};
use crate::matcher::OwnedKeys;
use ahash::AHashSet;
use std::cmp::Ordering;

/// Mentions in `video_id` whose key is not owned, ordered by first
/// appearance time (undefined timestamps sort last) and deduplicated by key,
/// keeping the earliest occurrence.
pub fn complements<'a>(
    video_id: &str,
    content: &'a ContentIndex,
    owned: &OwnedKeys,
) -> Vec<&'a ContentMention> {
    let mut items: Vec<&ContentMention> = content
        .mentions()
        .iter()
        .filter(|m| m.video_id == video_id && !owned.contains(&m.key))
        .collect();

    // Stable sort keeps original row order among equal timestamps.
    items.sort_by(|a, b| cmp_seconds(a.seconds, b.seconds));

    let mut seen: AHashSet<&str> = AHashSet::new();
    items.retain(|m| seen.insert(m.key.as_str()));
    items
}

/// Ascending by timestamp; an undefined timestamp sorts after all defined
/// ones.
pub(crate) fn cmp_seconds(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
