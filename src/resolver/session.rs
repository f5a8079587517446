//! Per-game session context.
//!
//! Holds the state that lives across challenges: the sticky language picked
//! in the game menu, the unknown recorder and its sequence counter, and
//! running counts. Resolution itself stays pure; the session only adds the
//! side effects around it.

use std::path::PathBuf;

use super::{resolve, MatchStage, ResolutionRequest, ResolutionResult};
use crate::catalog::{normalize_language, Catalog};
use crate::config::ResolverConfig;
use crate::corrections::CorrectionTable;
use crate::unknowns::{RecordContext, UnknownRecord, UnknownRecorder};

pub struct Session<'a> {
    catalog: &'a Catalog,
    catalog_path: PathBuf,
    corrections: CorrectionTable,
    recorder: UnknownRecorder,
    config: ResolverConfig,
    selected_language: Option<String>,
    resolved_count: u32,
    unresolved_count: u32,
    last_unknown: Option<UnknownRecord>,
}

impl<'a> Session<'a> {
    /// Creates a session. The sticky language starts from the config.
    pub fn new(
        catalog: &'a Catalog,
        catalog_path: PathBuf,
        corrections: CorrectionTable,
        recorder: UnknownRecorder,
        config: ResolverConfig,
    ) -> Self {
        let selected_language = config.selected_language.as_deref().map(normalize_language);
        Self {
            catalog,
            catalog_path,
            corrections,
            recorder,
            config,
            selected_language,
            resolved_count: 0,
            unresolved_count: 0,
            last_unknown: None,
        }
    }

    /// Sets the language chosen in the game menu for the rest of the session.
    pub fn select_language(&mut self, language: &str) {
        let language = normalize_language(language);
        crate::log(&format!("Session language set to {}", language));
        self.selected_language = Some(language);
    }

    pub fn selected_language(&self) -> Option<&str> {
        self.selected_language.as_deref()
    }

    /// Resolves one challenge.
    ///
    /// On failure an unknown record is written; a failed write is logged and
    /// the session carries on.
    pub fn resolve(&mut self, mut request: ResolutionRequest) -> ResolutionResult {
        if request.selected_language.is_none() {
            request.selected_language = self.selected_language.clone();
        }

        let result = resolve(&request, self.catalog, &self.corrections, &self.config);

        match &result {
            ResolutionResult::Resolved {
                identifier, stage, ..
            } => {
                self.resolved_count += 1;
                if self.config.auto_learn
                    && matches!(stage, MatchStage::Fuzzy { .. } | MatchStage::Substring)
                {
                    self.learn(&request.raw_candidate, identifier);
                }
            }
            ResolutionResult::Unresolved {
                raw_candidate,
                top_suggestions,
            } => {
                self.unresolved_count += 1;
                let context = RecordContext {
                    selected_language: self.selected_language.as_deref(),
                    suggestions: top_suggestions,
                    catalog: self.catalog,
                    catalog_path: &self.catalog_path,
                };
                match self.recorder.record(raw_candidate, &context) {
                    Ok(record) => self.last_unknown = Some(record),
                    Err(e) => crate::log(&format!(
                        "Failed to record unknown '{}': {}",
                        raw_candidate, e
                    )),
                }
            }
        }

        result
    }

    fn learn(&mut self, candidate: &str, identifier: &str) {
        let key = candidate.trim().to_lowercase();
        if key.is_empty() || key == identifier {
            return;
        }
        match self.corrections.upsert(&key, identifier) {
            Ok(()) => crate::log(&format!("Learned correction '{}' -> '{}'", key, identifier)),
            Err(e) => crate::log(&format!(
                "Failed to learn correction '{}' -> '{}': {}",
                key, identifier, e
            )),
        }
    }

    pub fn resolved_count(&self) -> u32 {
        self.resolved_count
    }

    pub fn unresolved_count(&self) -> u32 {
        self.unresolved_count
    }

    /// Most recent unknown record written by this session.
    pub fn last_unknown(&self) -> Option<&UnknownRecord> {
        self.last_unknown.as_ref()
    }

    pub fn corrections(&self) -> &CorrectionTable {
        &self.corrections
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }
}
