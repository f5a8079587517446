//! Language tag normalization and detection from screen text.

use regex::Regex;
use std::sync::OnceLock;

/// Tag used for catalog records that carry no language.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Normalizes a language tag: trimmed, lowercased, common aliases folded.
pub fn normalize_language(tag: &str) -> String {
    let lower = tag.trim().to_lowercase();
    match lower.as_str() {
        "" => UNKNOWN_LANGUAGE.to_string(),
        "py" | "python3" => "python".to_string(),
        "js" | "node" => "javascript".to_string(),
        "ts" => "typescript".to_string(),
        "golang" => "go".to_string(),
        "rs" => "rust".to_string(),
        "c++" => "cpp".to_string(),
        _ => lower,
    }
}

/// Detection rules, checked in order. First hit wins.
const DETECTION_RULES: &[(&str, &str)] = &[
    ("python", r"(?m)\bdef\s+\w+\s*\(|^\s*(def|class)\b.*:\s*$"),
    ("go", r"\bfunc\s+\w+\s*\("),
    ("rust", r"\bfn\s+\w+\s*[<(]"),
    ("javascript", r"\bfunction\b|\b(const|let|var)\s+\w+\s*=|=>"),
];

fn detection_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        DETECTION_RULES
            .iter()
            .filter_map(|(lang, pattern)| Regex::new(pattern).ok().map(|re| (*lang, re)))
            .collect()
    })
}

/// Guesses the snippet language from auxiliary screen text.
///
/// Heuristic only: the caller uses the result only if the resolved
/// identifier actually has a variant in that language.
pub fn detect_language(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    detection_patterns()
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(lang, _)| lang.to_string())
}
