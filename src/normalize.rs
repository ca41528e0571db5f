//! Free-text canonicalization and composite join keys.
//!
//! Every field that participates in matching or joining passes through
//! [`canon`] exactly once at load time. The composite key produced by
//! [`composite_key`] is the exact-match join key shared by catalog matches and
//! content mentions.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Collapse any run of whitespace to a single space and trim the ends.
///
/// Idempotent: `canon(canon(s)) == canon(s)`.
pub fn canon(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Build the canonical `brand|product|type` join key.
///
/// The three fields are canonicalized, joined with `|` (a delimiter that does
/// not occur in product text), and lowercased. Two records with the same
/// normalized triple always produce the same key, regardless of original
/// casing or whitespace.
pub fn composite_key(brand: &str, product: &str, product_type: &str) -> String {
    format!(
        "{}|{}|{}",
        canon(brand),
        canon(product),
        canon(product_type)
    )
    .to_lowercase()
}

/// Build the lowercase search string fuzzy matching runs against:
/// `product name + " " + product type`, canonicalized.
///
/// Kit queries and catalog targets use this same construction so the scorer
/// compares like with like.
pub fn search_text(product: &str, product_type: &str) -> String {
    canon(&format!("{} {}", product, product_type)).to_lowercase()
}

/// Parse a free-form timestamp field into seconds.
///
/// Non-numeric or non-finite values become `None` ("no timestamp"), which is
/// distinct from a timestamp of `0`. Never fails.
pub fn parse_seconds(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    value.is_finite().then_some(value)
}
