//! Resolver configuration.
//!
//! Loads settings from config.json at startup. Provides file locations,
//! matching thresholds and session defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::matching::MatchPolicy;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<ResolverConfig> = OnceLock::new();

/// Minimum score for automatic resolution during play.
pub const ACCEPT_THRESHOLD: f64 = 0.6;
/// Minimum score for a suggestion to be shown to a human.
pub const DISPLAY_THRESHOLD: f64 = 0.5;
/// Substring boost floor used by the game-session resolver.
pub const SESSION_SUBSTRING_FLOOR: f64 = 0.85;
/// Substring boost floor used when ranking suggestions for curation.
pub const SUGGESTION_SUBSTRING_FLOOR: f64 = 0.8;
/// Number of suggestions kept for an unresolved candidate.
pub const MAX_SUGGESTIONS: usize = 5;

/// Complete resolver configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Code snippet database (array of `{title, language, blocks}`)
    pub catalog_path: String,
    /// Curated OCR error → identifier table
    pub corrections_path: String,
    /// Directory receiving unknown-candidate records
    pub unknowns_dir: String,
    /// Score a candidate must exceed to be resolved automatically
    pub accept_threshold: f64,
    /// Score a suggestion must exceed to be listed for a human
    pub display_threshold: f64,
    /// Substring boost floor for the session resolver
    pub session_substring_floor: f64,
    /// Substring boost floor for the suggestion report
    pub suggestion_substring_floor: f64,
    /// Suggestions kept per unresolved candidate
    pub max_suggestions: usize,
    /// Write fuzzy/substring resolutions back to the correction table
    pub auto_learn: bool,
    /// Session language to use when the menu collaborator doesn't set one
    pub selected_language: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            catalog_path: "CodeBlocks.json".to_string(),
            corrections_path: "ocr_corrections.json".to_string(),
            unknowns_dir: "unknown_snippets_history".to_string(),
            accept_threshold: ACCEPT_THRESHOLD,
            display_threshold: DISPLAY_THRESHOLD,
            session_substring_floor: SESSION_SUBSTRING_FLOOR,
            suggestion_substring_floor: SUGGESTION_SUBSTRING_FLOOR,
            max_suggestions: MAX_SUGGESTIONS,
            auto_learn: false,
            selected_language: None,
        }
    }
}

impl ResolverConfig {
    /// Policy the game session commits to.
    pub fn session_policy(&self) -> MatchPolicy {
        MatchPolicy {
            substring_floor: self.session_substring_floor,
            threshold: self.accept_threshold,
        }
    }

    /// Advisory policy for the suggestion report.
    pub fn suggestion_policy(&self) -> MatchPolicy {
        MatchPolicy {
            substring_floor: self.suggestion_substring_floor,
            threshold: self.display_threshold,
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        crate::paths::resolve(&self.catalog_path)
    }

    pub fn corrections_path(&self) -> PathBuf {
        crate::paths::resolve(&self.corrections_path)
    }

    pub fn unknowns_dir(&self) -> PathBuf {
        crate::paths::resolve(&self.unknowns_dir)
    }
}

/// Loads configuration from the given file or returns defaults.
pub fn load_config_from(config_path: &Path) -> ResolverConfig {
    if config_path.exists() {
        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    crate::log(&format!("Config loaded from {}", config_path.display()));
                    return config;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse {}: {}. Using defaults.",
                        config_path.display(),
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read {}: {}. Using defaults.",
                    config_path.display(),
                    e
                ));
            }
        }
    } else {
        crate::log("config.json not found. Using default config.");
    }

    ResolverConfig::default()
}

/// Initializes the global configuration from `<base_dir>/config.json`.
pub fn init_config() {
    let config_path = crate::paths::get_base_dir().join("config.json");
    let _ = CONFIG.set(load_config_from(&config_path));
}

/// Returns the global configuration, or defaults if `init_config` was never called.
pub fn get_config() -> &'static ResolverConfig {
    CONFIG.get_or_init(ResolverConfig::default)
}
