use regex::Regex;
use std::sync::OnceLock;

/// Declaration shapes the challenge title is rendered in, tried in order.
/// Capture group 1 is the identifier.
const DECLARATION_PATTERNS: &[&str] = &[
    r"(?i)\bvar\s+(\w+)\s*=",
    r"(?i)\bfunction\s+(\w+)\s*\(",
    r"(?i)\bdef\s+(\w+)\s*\(",
    r"(?i)\bconst\s+(\w+)\s*=",
    r"(?i)\blet\s+(\w+)\s*=",
    r"(?i)\b(\w+)\s*=\s*function\b",
    r"(?i)\bexport\s+function\s+(\w+)",
    r"(?i)\bfunc\s+(\w+)\s*\(",
];

/// Fallback: any lowercase-led word that could be a camelCase identifier.
const WORD_PATTERN: &str = r"\b[a-z][a-zA-Z0-9_]+\b";

const KEYWORDS: &[&str] = &[
    "var", "let", "const", "function", "func", "def", "class", "return", "if", "else", "for",
    "while",
];

fn declaration_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        DECLARATION_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

fn word_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(WORD_PATTERN).ok()).as_ref()
}

/// Pulls the function identifier out of OCR'd title text.
///
/// Returns the lowercased identifier, or `None` if the text holds nothing
/// that looks like one.
pub fn extract_candidate(text: &str) -> Option<String> {
    for re in declaration_patterns() {
        if let Some(name) = re.captures(text).and_then(|c| c.get(1)) {
            let name = name.as_str();
            if !KEYWORDS.contains(&name.to_lowercase().as_str()) {
                return Some(name.to_lowercase());
            }
        }
    }

    word_pattern()?
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|w| w.len() > 3 && !KEYWORDS.contains(&w.to_lowercase().as_str()))
        .map(str::to_lowercase)
}
