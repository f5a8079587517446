//! Fuzzy matching of OCR candidates against known identifiers.
//!
//! The session resolver and the suggestion report share the same scoring;
//! they differ only in the `MatchPolicy` they pass in.

pub mod similarity;

pub use similarity::{distance, similarity};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Declaration keywords OCR often glues onto the identifier, checked in order.
pub const STRIP_PREFIXES: &[&str] = &["def", "var", "function", "func", "const", "let"];

/// Thresholds applied when ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    /// Minimum score granted when candidate and identifier contain one another
    pub substring_floor: f64,
    /// A match must score strictly above this
    pub threshold: f64,
}

/// A scored identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub identifier: String,
    pub score: f64,
}

/// Trimmed, lowercased form every stage works on.
pub fn normalize_candidate(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Removes one leading declaration keyword, then surrounding whitespace.
///
/// Only the first prefix in `STRIP_PREFIXES` order that matches is removed.
pub fn strip_declaration_prefix(candidate: &str) -> &str {
    STRIP_PREFIXES
        .iter()
        .find_map(|prefix| candidate.strip_prefix(prefix))
        .unwrap_or(candidate)
        .trim()
}

/// Score of one identifier against a candidate and its cleaned form.
pub fn score_identifier(candidate: &str, clean: &str, identifier: &str, substring_floor: f64) -> f64 {
    let mut score = similarity(candidate, identifier).max(similarity(clean, identifier));
    if !clean.is_empty() && (clean.contains(identifier) || identifier.contains(clean)) {
        score = score.max(substring_floor);
    }
    score
}

/// Orders by score descending, then shorter identifier, then lexicographically.
fn rank_order(a: &Suggestion, b: &Suggestion) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.identifier.chars().count().cmp(&b.identifier.chars().count()))
        .then_with(|| a.identifier.cmp(&b.identifier))
}

/// Scores every identifier and returns them best first.
pub fn rank<'a, I>(candidate: &str, identifiers: I, substring_floor: f64) -> Vec<Suggestion>
where
    I: IntoIterator<Item = &'a str>,
{
    let candidate = normalize_candidate(candidate);
    let clean = strip_declaration_prefix(&candidate);

    let mut scored: Vec<Suggestion> = identifiers
        .into_iter()
        .map(|id| Suggestion {
            identifier: id.to_string(),
            score: score_identifier(&candidate, clean, id, substring_floor),
        })
        .collect();
    scored.sort_by(rank_order);
    scored
}

/// Best identifier scoring above the policy threshold.
pub fn best_match<'a, I>(candidate: &str, identifiers: I, policy: MatchPolicy) -> Option<Suggestion>
where
    I: IntoIterator<Item = &'a str>,
{
    rank(candidate, identifiers, policy.substring_floor)
        .into_iter()
        .next()
        .filter(|s| s.score > policy.threshold)
}

/// Up to `limit` identifiers scoring above the policy threshold, best first.
pub fn suggest<'a, I>(candidate: &str, identifiers: I, policy: MatchPolicy, limit: usize) -> Vec<Suggestion>
where
    I: IntoIterator<Item = &'a str>,
{
    rank(candidate, identifiers, policy.substring_floor)
        .into_iter()
        .filter(|s| s.score > policy.threshold)
        .take(limit)
        .collect()
}

/// First identifier (in iteration order) that contains, or is contained in,
/// the uncleaned candidate.
pub fn substring_fallback<'a, I>(candidate: &str, identifiers: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let candidate = normalize_candidate(candidate);
    if candidate.is_empty() {
        return None;
    }
    identifiers
        .into_iter()
        .find(|id| candidate.contains(id) || id.contains(candidate.as_str()))
}
