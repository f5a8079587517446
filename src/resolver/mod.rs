//! Resolution of an OCR candidate to a catalog entry and source variant.
//!
//! Stages, in priority order, each short-circuiting on success:
//! 1. Exact catalog key
//! 2. Correction table override (only if it points at a catalog key)
//! 3-4. Fuzzy scoring of the candidate and its prefix-stripped form
//! 5. Raw substring containment, first in catalog order
//!
//! Once an identifier is chosen, the source variant is picked by: sticky
//! session language, then the request's hint, then the language detected from
//! screen text, then the first variant.

pub mod extract;
pub mod session;

pub use extract::extract_candidate;
pub use session::Session;

use crate::catalog::{detect_language, normalize_language, Catalog, Variants};
use crate::config::ResolverConfig;
use crate::corrections::CorrectionTable;
use crate::matching::{self, normalize_candidate, Suggestion};

/// One challenge to resolve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionRequest {
    pub raw_candidate: String,
    /// Language the OCR collaborator thinks the snippet is in
    pub language_hint: Option<String>,
    /// Language chosen in the game menu; sticky for the whole session
    pub selected_language: Option<String>,
    /// Auxiliary screen text used for language detection
    pub screen_text: Option<String>,
}

impl ResolutionRequest {
    pub fn new(raw_candidate: impl Into<String>) -> Self {
        Self {
            raw_candidate: raw_candidate.into(),
            ..Default::default()
        }
    }

    pub fn with_hint(mut self, language: impl Into<String>) -> Self {
        self.language_hint = Some(language.into());
        self
    }

    pub fn with_selected_language(mut self, language: impl Into<String>) -> Self {
        self.selected_language = Some(language.into());
        self
    }

    pub fn with_screen_text(mut self, text: impl Into<String>) -> Self {
        self.screen_text = Some(text.into());
        self
    }
}

/// How an identifier was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchStage {
    Exact,
    Correction,
    Fuzzy { score: f64 },
    Substring,
}

impl std::fmt::Display for MatchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStage::Exact => write!(f, "exact match"),
            MatchStage::Correction => write!(f, "correction table"),
            MatchStage::Fuzzy { score } => write!(f, "fuzzy match ({:.0}%)", score * 100.0),
            MatchStage::Substring => write!(f, "substring match"),
        }
    }
}

/// Outcome of one resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionResult {
    Resolved {
        identifier: String,
        language_used: String,
        source: String,
        stage: MatchStage,
    },
    Unresolved {
        raw_candidate: String,
        /// Best-scoring identifiers, best first
        top_suggestions: Vec<Suggestion>,
    },
}

impl ResolutionResult {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionResult::Resolved { .. })
    }
}

/// Picks an identifier for the candidate (stages 1-5).
fn find_identifier<'c>(
    candidate: &str,
    catalog: &'c Catalog,
    corrections: &CorrectionTable,
    config: &ResolverConfig,
) -> Option<(&'c str, MatchStage)> {
    if candidate.is_empty() {
        return None;
    }

    if let Some(entry) = catalog.entry(candidate) {
        return Some((entry.identifier.as_str(), MatchStage::Exact));
    }

    if let Some(canonical) = corrections.lookup(candidate) {
        match catalog.entry(canonical) {
            Some(entry) => return Some((entry.identifier.as_str(), MatchStage::Correction)),
            None => crate::log(&format!(
                "Correction '{}' -> '{}' points at an unknown identifier, ignoring",
                candidate, canonical
            )),
        }
    }

    if let Some(best) = matching::best_match(
        candidate,
        catalog.all_identifiers(),
        config.session_policy(),
    ) {
        let entry = catalog.entry(&best.identifier)?;
        return Some((
            entry.identifier.as_str(),
            MatchStage::Fuzzy { score: best.score },
        ));
    }

    matching::substring_fallback(candidate, catalog.all_identifiers())
        .map(|id| (id, MatchStage::Substring))
}

/// Picks the source body for a chosen identifier.
pub fn select_variant<'v>(
    variants: &'v Variants,
    request: &ResolutionRequest,
) -> Option<(&'v str, &'v str)> {
    let preferred = [
        request.selected_language.as_deref().map(normalize_language),
        request.language_hint.as_deref().map(normalize_language),
        request.screen_text.as_deref().and_then(detect_language),
    ];

    preferred
        .iter()
        .flatten()
        .find_map(|language| variants.entry(language))
        .or_else(|| variants.first())
}

/// Resolves one request. Pure: reads the catalog and correction table only.
pub fn resolve(
    request: &ResolutionRequest,
    catalog: &Catalog,
    corrections: &CorrectionTable,
    config: &ResolverConfig,
) -> ResolutionResult {
    let candidate = normalize_candidate(&request.raw_candidate);

    let found = find_identifier(&candidate, catalog, corrections, config).and_then(
        |(identifier, stage)| {
            let variants = catalog.lookup(identifier)?;
            let (language, source) = select_variant(variants, request)?;
            Some(ResolutionResult::Resolved {
                identifier: identifier.to_string(),
                language_used: language.to_string(),
                source: source.to_string(),
                stage,
            })
        },
    );

    if let Some(result) = found {
        if let ResolutionResult::Resolved {
            identifier,
            language_used,
            stage,
            ..
        } = &result
        {
            crate::log(&format!(
                "Resolved '{}' -> '{}' [{}] via {}",
                request.raw_candidate, identifier, language_used, stage
            ));
        }
        return result;
    }

    // Always the best few, however weak; display filtering is the caller's job.
    let top_suggestions: Vec<Suggestion> = matching::rank(
        &candidate,
        catalog.all_identifiers(),
        config.session_substring_floor,
    )
    .into_iter()
    .take(config.max_suggestions)
    .collect();

    crate::log(&format!(
        "Unresolved '{}' ({} suggestions)",
        request.raw_candidate,
        top_suggestions.len()
    ));

    ResolutionResult::Unresolved {
        raw_candidate: request.raw_candidate.clone(),
        top_suggestions,
    }
}
