//! Fuzzy kit-to-catalog matching.
//!
//! Each kit entry is scored against a candidate pool (same brand, or the full
//! catalog when the brand is unknown) with a token-set similarity scorer and
//! the single best candidate is kept. Matches at or above the caller's
//! threshold form the owned-key set consumed by ranking and complement
//! resolution.

use crate::catalog::CatalogIndex;
use crate::kit::KitEntry;
use crate::normalize::composite_key;
use ahash::AHashSet;
use rapidfuzz::fuzz;
use serde::Serialize;
use std::collections::BTreeSet;

/// The set of composite keys the user owns. Single source of truth for
/// "what does the user own" downstream.
pub type OwnedKeys = AHashSet<String>;

/// Similarity scorer seam.
///
/// Implementations must be symmetric, case-insensitive, and return a score in
/// `[0, 100]`. Kept behind a trait so the scorer can be swapped or tested
/// independently of the matching loop.
pub trait Scorer {
    fn score(&self, query: &str, candidate: &str) -> f64;
}

/// Token-set similarity: unique-word overlap, insensitive to word order and
/// duplication, built on rapidfuzz's indel ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSetRatio;

impl Scorer for TokenSetRatio {
    fn score(&self, query: &str, candidate: &str) -> f64 {
        token_set_ratio(query, candidate)
    }
}

/// The standard token-set construction: compare the sorted shared words
/// against each side's shared-plus-remainder string and keep the best ratio.
fn token_set_ratio(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    match (tokens_a.is_empty(), tokens_b.is_empty()) {
        (true, true) => return 100.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }

    let shared: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    // One token set contained in the other: the shared words are a full match.
    if !shared.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 100.0;
    }

    let base = shared.join(" ");
    let combined_a = join_tokens(&base, &only_a);
    let combined_b = join_tokens(&base, &only_b);

    // rapidfuzz returns ratios in [0, 1]; this crate's scorer contract is [0, 100].
    fuzz::ratio(base.chars(), combined_a.chars())
        .max(fuzz::ratio(base.chars(), combined_b.chars()))
        .max(fuzz::ratio(combined_a.chars(), combined_b.chars()))
        * 100.0
}

fn join_tokens(base: &str, rest: &[&str]) -> String {
    if base.is_empty() {
        rest.join(" ")
    } else if rest.is_empty() {
        base.to_string()
    } else {
        format!("{} {}", base, rest.join(" "))
    }
}

/// One kit entry's match against the catalog.
///
/// `score` is 0 only when no candidate pool existed at all; otherwise it is
/// the best candidate's similarity even when below the acceptance threshold.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub brand: String,
    pub product_name: String,
    pub product_type: String,
    pub shade_name: String,
    pub matched_brand: String,
    pub matched_product_name: String,
    pub matched_product_type: String,
    pub matched_category_group: String,
    pub score: u32,
    /// Composite key of the matched catalog entry.
    pub key: String,
}

/// All match results plus the accepted subset.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
    pub all: Vec<MatchResult>,
    /// Results with `score >= threshold`, in kit order.
    pub accepted: Vec<MatchResult>,
}

impl MatchOutcome {
    /// Composite keys of the accepted matches.
    pub fn owned_keys(&self) -> OwnedKeys {
        self.accepted.iter().map(|m| m.key.clone()).collect()
    }
}

/// Match every kit entry against the catalog.
///
/// `threshold` is an integer score in `[0, 100]`; the interactive caller
/// constrains it to `[50, 95]` but the algorithm accepts the full range.
pub fn match_all(
    kit: &[KitEntry],
    catalog: &CatalogIndex,
    threshold: u32,
    scorer: &dyn Scorer,
) -> MatchOutcome {
    let mut all = Vec::with_capacity(kit.len());
    for entry in kit {
        all.push(match_entry(entry, catalog, scorer));
    }
    let accepted: Vec<MatchResult> = all
        .iter()
        .filter(|m| m.score >= threshold)
        .cloned()
        .collect();

    tracing::info!(
        "Matched {} of {} kit entries at threshold {}",
        accepted.len(),
        all.len(),
        threshold
    );
    MatchOutcome { all, accepted }
}

fn match_entry(entry: &KitEntry, catalog: &CatalogIndex, scorer: &dyn Scorer) -> MatchResult {
    // Same-brand pool first; unknown brands search the whole catalog.
    let pool = catalog.pool_for(&entry.brand_lower);
    let full: Vec<usize>;
    let pool: &[usize] = if pool.is_empty() {
        full = (0..catalog.len()).collect();
        &full
    } else {
        pool
    };

    // Strictly-greater replacement keeps the first of equal-scoring
    // candidates, in candidate order.
    let mut best: Option<(usize, f64)> = None;
    for &idx in pool {
        let score = scorer.score(&entry.query, &catalog.get(idx).search_text);
        if best.is_none_or(|(_, prev)| score > prev) {
            best = Some((idx, score));
        }
    }

    match best {
        Some((idx, score)) => {
            let hit = catalog.get(idx);
            tracing::debug!(
                "'{}' -> '{}' ({:.0})",
                entry.query,
                hit.search_text,
                score
            );
            MatchResult {
                brand: entry.brand.clone(),
                product_name: entry.product_name.clone(),
                product_type: entry.product_type.clone(),
                shade_name: entry.shade_name.clone(),
                matched_brand: hit.brand.clone(),
                matched_product_name: hit.product_name.clone(),
                matched_product_type: hit.product_type.clone(),
                matched_category_group: hit.category_group.clone(),
                score: score as u32,
                key: composite_key(&hit.brand, &hit.product_name, &hit.product_type),
            }
        }
        // Empty catalog: a zero-score, empty-match result rather than a failure.
        None => MatchResult {
            brand: entry.brand.clone(),
            product_name: entry.product_name.clone(),
            product_type: entry.product_type.clone(),
            shade_name: entry.shade_name.clone(),
            matched_brand: String::new(),
            matched_product_name: String::new(),
            matched_product_type: String::new(),
            matched_category_group: String::new(),
            score: 0,
            key: composite_key("", "", ""),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kit::parse_kit;

    fn catalog(csv: &str) -> CatalogIndex {
        CatalogIndex::from_reader(csv.as_bytes()).unwrap()
    }

    fn kit(csv: &str) -> Vec<KitEntry> {
        parse_kit(csv.as_bytes()).unwrap()
    }

    const CATALOG: &str = "\
Brand,Product Name,Product Type,Category Group
Urban Decay,Naked3 Eyeshadow Palette,Eyeshadow Palette,Eyes
Too Faced,Better Than Sex Mascara,Mascara,Eyes
KVD Beauty,Tattoo Liner,Liquid Eyeliner,Eyes
";

    #[test]
    fn token_set_ratio_ignores_order_and_duplicates() {
        let scorer = TokenSetRatio;
        assert_eq!(scorer.score("tattoo liner", "liner tattoo"), 100.0);
        assert_eq!(scorer.score("liner liner tattoo", "tattoo liner"), 100.0);
        assert_eq!(scorer.score("Tattoo Liner", "tattoo liner"), 100.0);
    }

    #[test]
    fn token_set_ratio_is_symmetric() {
        let scorer = TokenSetRatio;
        let a = "naked 3 palette";
        let b = "naked3 eyeshadow palette eyeshadow palette";
        assert_eq!(scorer.score(a, b), scorer.score(b, a));
    }

    #[test]
    fn token_set_ratio_empty_inputs() {
        let scorer = TokenSetRatio;
        assert_eq!(scorer.score("", ""), 100.0);
        assert_eq!(scorer.score("", "mascara"), 0.0);
        assert_eq!(scorer.score("mascara", ""), 0.0);
    }

    #[test]
    fn naked3_scenario_matches_above_seventy() {
        let cat = catalog(CATALOG);
        let kit = kit("Brand,Product Name,Product Type,Shade Name\nurban decay,naked 3 palette,,\n");
        let outcome = match_all(&kit, &cat, 70, &TokenSetRatio);
        assert_eq!(outcome.accepted.len(), 1);
        let m = &outcome.accepted[0];
        assert!(m.score >= 70, "score was {}", m.score);
        assert_eq!(m.key, "urban decay|naked3 eyeshadow palette|eyeshadow palette");
        assert_eq!(m.matched_brand, "Urban Decay");
    }

    #[test]
    fn unknown_brand_falls_back_to_full_catalog() {
        let cat = catalog(CATALOG);
        let kit = kit("Brand,Product Name\nSomebody Else,Tattoo Liner\n");
        let outcome = match_all(&kit, &cat, 90, &TokenSetRatio);
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].matched_brand, "KVD Beauty");
    }

    #[test]
    fn below_threshold_still_reports_best_score() {
        let cat = catalog(CATALOG);
        let kit = kit("Brand,Product Name\nUrban Decay,Completely Unrelated Thing\n");
        let outcome = match_all(&kit, &cat, 95, &TokenSetRatio);
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.all.len(), 1);
        assert!(!outcome.all[0].matched_product_name.is_empty());
    }

    #[test]
    fn empty_catalog_gives_zero_score_empty_match() {
        let cat = catalog("Brand,Product Name,Product Type,Category Group\n");
        let kit = kit("Brand,Product Name\nUrban Decay,Naked3\n");
        let outcome = match_all(&kit, &cat, 70, &TokenSetRatio);
        assert_eq!(outcome.all.len(), 1);
        assert_eq!(outcome.all[0].score, 0);
        assert_eq!(outcome.all[0].matched_brand, "");
        assert!(outcome.accepted.is_empty());
    }

    #[test]
    fn raising_threshold_never_accepts_more() {
        let cat = catalog(CATALOG);
        let kit = kit("Brand,Product Name\nurban decay,naked 3 palette\nToo Faced,Better Than Sex\nKVD Beauty,Tatoo Linr\n");
        let mut previous = usize::MAX;
        for threshold in [0, 25, 50, 70, 85, 95, 100] {
            let accepted = match_all(&kit, &cat, threshold, &TokenSetRatio).accepted.len();
            assert!(accepted <= previous, "threshold {} accepted {}", threshold, accepted);
            previous = accepted;
        }
    }

    #[test]
    fn tie_break_keeps_first_candidate() {
        // Two identical search texts under the same brand: the first row wins.
        let cat = catalog(
            "Brand,Product Name,Product Type,Category Group\n\
             A,Same Thing,Gloss,Lips\n\
             A,Same  Thing,Gloss,Lips Duplicate\n",
        );
        let kit = kit("Brand,Product Name,Product Type\nA,Same Thing,Gloss\n");
        let outcome = match_all(&kit, &cat, 70, &TokenSetRatio);
        assert_eq!(outcome.accepted[0].matched_category_group, "Lips");
    }
}
