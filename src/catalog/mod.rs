//! In-memory index of known function identifiers and their source bodies.
//!
//! The catalog is built once from a JSON snapshot (the game's code block
//! database) and never mutated afterwards. Records are grouped by lowercased
//! title; each title carries one source body per language.

pub mod language;

pub use language::{detect_language, normalize_language, UNKNOWN_LANGUAGE};

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::LoadError;

/// One record of the snapshot, as stored on disk.
#[derive(Debug, Deserialize)]
struct SnapshotRecord {
    title: String,
    #[serde(default)]
    language: Option<String>,
    /// Source lines, concatenated verbatim into one body
    blocks: Vec<String>,
}

/// Language-specific source bodies for one identifier, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variants {
    entries: Vec<(String, String)>,
}

impl Variants {
    /// Inserts or replaces the body for `language`. A replaced body keeps its
    /// original position.
    fn insert(&mut self, language: String, source: String) {
        match self.entries.iter_mut().find(|(lang, _)| *lang == language) {
            Some(entry) => entry.1 = source,
            None => self.entries.push((language, source)),
        }
    }

    /// Source body for a (normalized) language tag.
    pub fn get(&self, language: &str) -> Option<&str> {
        self.entry(language).map(|(_, source)| source)
    }

    /// `(language, source)` pair for a (normalized) language tag.
    pub fn entry(&self, language: &str) -> Option<(&str, &str)> {
        self.entries
            .iter()
            .find(|(lang, _)| lang == language)
            .map(|(lang, source)| (lang.as_str(), source.as_str()))
    }

    pub fn contains(&self, language: &str) -> bool {
        self.get(language).is_some()
    }

    /// First variant in insertion order.
    pub fn first(&self) -> Option<(&str, &str)> {
        self.entries
            .first()
            .map(|(lang, source)| (lang.as_str(), source.as_str()))
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(lang, _)| lang.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A known identifier and its variants.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Lowercase, unique
    pub identifier: String,
    /// Never empty
    pub variants: Variants,
}

/// Immutable identifier → variants index.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
    record_count: usize,
}

impl Catalog {
    /// Loads the catalog from a JSON snapshot file.
    ///
    /// Fails if the file is missing, malformed, or holds no records.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog = Self::parse(&contents, path)?;
        crate::log(&format!(
            "Loaded {} code blocks ({} unique functions) from {}",
            catalog.record_count,
            catalog.len(),
            path.display()
        ));
        Ok(catalog)
    }

    /// Parses a snapshot held in memory.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Self::parse(json, Path::new("<memory>"))
    }

    /// `origin` only labels errors.
    fn parse(json: &str, origin: &Path) -> Result<Self, LoadError> {
        let records: Vec<SnapshotRecord> =
            serde_json::from_str(json).map_err(|source| LoadError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;
        if records.is_empty() {
            return Err(LoadError::Empty(origin.to_path_buf()));
        }
        Self::from_records(records)
    }

    fn from_records(records: Vec<SnapshotRecord>) -> Result<Self, LoadError> {
        let record_count = records.len();
        let mut entries: Vec<CatalogEntry> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (i, record) in records.into_iter().enumerate() {
            let identifier = record.title.trim().to_lowercase();
            if identifier.is_empty() {
                return Err(LoadError::InvalidRecord {
                    index: i,
                    reason: "empty title".to_string(),
                });
            }

            let language = record
                .language
                .as_deref()
                .map(normalize_language)
                .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());
            let source = record.blocks.concat();

            let slot = *index.entry(identifier.clone()).or_insert_with(|| {
                entries.push(CatalogEntry {
                    identifier,
                    variants: Variants::default(),
                });
                entries.len() - 1
            });
            entries[slot].variants.insert(language, source);
        }

        Ok(Self {
            entries,
            index,
            record_count,
        })
    }

    /// Variants for an identifier. The key is matched as given (lowercase).
    pub fn lookup(&self, identifier: &str) -> Option<&Variants> {
        self.entry(identifier).map(|e| &e.variants)
    }

    /// Full entry for an identifier.
    pub fn entry(&self, identifier: &str) -> Option<&CatalogEntry> {
        self.index.get(identifier).map(|&slot| &self.entries[slot])
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    /// All identifiers in insertion order. The iterator is `Clone`, so it can
    /// be restarted.
    pub fn all_identifiers(&self) -> impl Iterator<Item = &str> + Clone {
        self.entries.iter().map(|e| e.identifier.as_str())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of unique identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
