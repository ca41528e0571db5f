//! Video ranking by kit coverage.
//!
//! The score rewards breadth (fraction of the owned kit a video uses) and
//! depth (distinct routine steps, contribution capped at 10), and privileges
//! tutorials that reference kit items early. The constants are fixed design
//! parameters; changing them breaks output parity with the reference scoring.

use crate::content::{ContentIndex, ContentMention};
use crate::matcher::OwnedKeys;
use ahash::{AHashMap, AHashSet};
use serde::Serialize;

const COVERAGE_WEIGHT: f64 = 0.7;
const STEP_WEIGHT: f64 = 0.3;
const STEP_CAP: f64 = 10.0;
const EARLY_BOOST: f64 = 1.15;
const EARLY_CUTOFF_SECS: f64 = 600.0;

/// One video's aggregate ranking.
#[derive(Debug, Clone, Serialize)]
pub struct VideoRanking {
    pub video_id: String,
    pub title: String,
    /// Distinct owned keys mentioned in the video.
    pub used_items: usize,
    /// Distinct step values, or `used_items` when no step carries a value.
    pub used_steps: usize,
    /// `used_items / max(1, |owned|)`, always in `[0, 1]`.
    pub coverage: f64,
    pub score: f64,
}

/// Outcome of ranking: either an ordered list or a legitimate empty state.
#[derive(Debug)]
pub enum RankOutcome {
    /// Videos ordered by score descending, ties broken by `used_items`
    /// descending.
    Ranked(Vec<VideoRanking>),
    /// No content mention intersects the owned-key set. Not an error; callers
    /// render it distinctly from a crash.
    NoOverlap,
}

/// Rank every video whose mentions intersect the owned-key set.
pub fn rank(content: &ContentIndex, owned: &OwnedKeys) -> RankOutcome {
    let hits: Vec<&ContentMention> = content
        .mentions()
        .iter()
        .filter(|m| owned.contains(&m.key))
        .collect();
    if hits.is_empty() {
        return RankOutcome::NoOverlap;
    }

    // Group by video in first-seen order, preserving row order within each
    // group for downstream tie-breaking.
    let mut order: Vec<&str> = Vec::new();
    let mut groups: AHashMap<&str, Vec<&ContentMention>> = AHashMap::new();
    for &hit in &hits {
        groups
            .entry(hit.video_id.as_str())
            .or_insert_with(|| {
                order.push(hit.video_id.as_str());
                Vec::new()
            })
            .push(hit);
    }

    let mut rankings: Vec<VideoRanking> = order
        .into_iter()
        .map(|video_id| score_group(video_id, &groups[video_id], owned.len()))
        .collect();

    rankings.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(b.used_items.cmp(&a.used_items))
    });
    tracing::debug!("Ranked {} videos", rankings.len());
    RankOutcome::Ranked(rankings)
}

fn score_group(video_id: &str, group: &[&ContentMention], owned_count: usize) -> VideoRanking {
    let title = group[0].title.clone();

    let used_items = group
        .iter()
        .map(|m| m.key.as_str())
        .collect::<AHashSet<_>>()
        .len();

    let used_steps = if group.iter().all(|m| m.step.is_empty()) {
        used_items
    } else {
        group
            .iter()
            .map(|m| m.step.as_str())
            .collect::<AHashSet<_>>()
            .len()
    };

    let coverage = used_items as f64 / owned_count.max(1) as f64;

    // Absent timestamps are excluded from the median; none defined means no
    // boost.
    let mut times: Vec<f64> = group.iter().filter_map(|m| m.seconds).collect();
    times.sort_by(f64::total_cmp);
    let early_boost = match median(&times) {
        Some(mid) if mid < EARLY_CUTOFF_SECS => EARLY_BOOST,
        _ => 1.0,
    };

    let score = (COVERAGE_WEIGHT * coverage + STEP_WEIGHT * (used_steps as f64 / STEP_CAP))
        * early_boost;

    VideoRanking {
        video_id: video_id.to_string(),
        title,
        used_items,
        used_steps,
        coverage,
        score,
    }
}

/// Median of an ascending-sorted slice; the mean of the middle pair for even
/// lengths.
fn median(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentSchema;

    fn content(csv: &str) -> ContentIndex {
        ContentIndex::from_reader(csv.as_bytes(), ContentSchema::Routine).unwrap()
    }

    fn owned(keys: &[&str]) -> OwnedKeys {
        keys.iter().map(|k| (*k).to_string()).collect()
    }

    fn ranked(outcome: RankOutcome) -> Vec<VideoRanking> {
        match outcome {
            RankOutcome::Ranked(r) => r,
            RankOutcome::NoOverlap => panic!("expected rankings"),
        }
    }

    const ROUTINE: &str = "\
videoId,title,step,brand,product,product_type,shade,time_start
v1,Soft Glam,Base,A,P1,T1,,700
v1,Soft Glam,Eyes,B,P2,T2,,800
v1,Soft Glam,Lips,B,P2,T2,,900
v2,Quick Look,Base,A,P1,T1,,30
";

    #[test]
    fn no_accepted_matches_is_no_overlap() {
        let idx = content(ROUTINE);
        assert!(matches!(rank(&idx, &owned(&[])), RankOutcome::NoOverlap));
        assert!(matches!(
            rank(&idx, &owned(&["nobody|owns|this"])),
            RankOutcome::NoOverlap
        ));
    }

    #[test]
    fn coverage_and_steps_follow_the_reference_formula() {
        // Two owned keys out of four hit v1; three distinct steps; late
        // timestamps so no boost.
        let idx = content(ROUTINE);
        let keys = owned(&["a|p1|t1", "b|p2|t2", "c|p3|t3", "d|p4|t4"]);
        let rankings = ranked(rank(&idx, &keys));
        let v1 = rankings.iter().find(|r| r.video_id == "v1").unwrap();
        assert_eq!(v1.used_items, 2);
        assert_eq!(v1.used_steps, 3);
        assert!((v1.coverage - 0.5).abs() < 1e-9);
        assert!((v1.score - 0.44).abs() < 1e-9);
    }

    #[test]
    fn early_videos_get_the_boost() {
        let idx = content(ROUTINE);
        let keys = owned(&["a|p1|t1"]);
        let rankings = ranked(rank(&idx, &keys));
        let v2 = rankings.iter().find(|r| r.video_id == "v2").unwrap();
        // coverage 1.0, one step, median 30s < 600s.
        let expected = (0.7 + 0.3 * 0.1) * 1.15;
        assert!((v2.score - expected).abs() < 1e-9);
    }

    #[test]
    fn ordering_is_score_then_used_items_descending() {
        let idx = content(ROUTINE);
        let keys = owned(&["a|p1|t1", "b|p2|t2"]);
        let rankings = ranked(rank(&idx, &keys));
        for pair in rankings.windows(2) {
            assert!(
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score
                        && pair[0].used_items >= pair[1].used_items)
            );
        }
    }

    #[test]
    fn coverage_stays_within_bounds() {
        let idx = content(ROUTINE);
        let keys = owned(&["a|p1|t1", "b|p2|t2"]);
        for r in ranked(rank(&idx, &keys)) {
            assert!(r.coverage >= 0.0 && r.coverage <= 1.0);
        }
    }

    #[test]
    fn missing_steps_fall_back_to_used_items() {
        let csv = "\
videoId,title,brand,product,product_type,time_start
v1,No Steps,A,P1,T1,10
v1,No Steps,B,P2,T2,20
";
        let idx = content(csv);
        let rankings = ranked(rank(&idx, &owned(&["a|p1|t1", "b|p2|t2"])));
        assert_eq!(rankings[0].used_steps, rankings[0].used_items);
    }

    #[test]
    fn undefined_timestamps_are_excluded_from_the_median() {
        let csv = "\
videoId,title,step,brand,product,product_type,time_start
v1,Mixed,Base,A,P1,T1,
v1,Mixed,Eyes,B,P2,T2,100
";
        let idx = content(csv);
        let rankings = ranked(rank(&idx, &owned(&["a|p1|t1", "b|p2|t2"])));
        // Only the defined 100s timestamp counts: boost applies.
        let expected = (0.7 * 1.0 + 0.3 * 0.2) * 1.15;
        assert!((rankings[0].score - expected).abs() < 1e-9);
    }

    #[test]
    fn median_of_even_and_odd_lengths() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[5.0]), Some(5.0));
        assert_eq!(median(&[1.0, 3.0]), Some(2.0));
        assert_eq!(median(&[1.0, 2.0, 100.0]), Some(2.0));
    }
}
