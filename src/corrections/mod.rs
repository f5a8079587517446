//! Curated exact-match overrides from known OCR errors to canonical identifiers.
//!
//! Stored as `ocr_corrections.json`:
//!
//! ```json
//! {
//!   "comment": "Map common OCR errors to correct function names",
//!   "corrections": { "inordertraversait": "inordertraversal" }
//! }
//! ```
//!
//! Writes replace the whole file atomically (temp file in the same directory,
//! then rename), so an interrupted write never leaves a truncated table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{LoadError, PersistenceError};

const DEFAULT_COMMENT: &str = "Map common OCR errors to correct function names";

/// Name of the maintenance binary, as printed in ready-to-run commands.
pub const MAINTENANCE_BIN: &str = "ocr-corrections";

/// Shell command that adds `ocr_text -> canonical` to the table.
pub fn add_command(ocr_text: &str, canonical: &str) -> String {
    format!(
        "{} add {} {}",
        MAINTENANCE_BIN,
        shell_quote(ocr_text),
        shell_quote(canonical)
    )
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// On-disk document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CorrectionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(default)]
    corrections: BTreeMap<String, String>,
}

/// OCR text → canonical identifier, both lowercase.
#[derive(Debug, Clone)]
pub struct CorrectionTable {
    path: PathBuf,
    comment: Option<String>,
    corrections: BTreeMap<String, String>,
}

impl CorrectionTable {
    /// An empty table that persists to `path`.
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            comment: Some(DEFAULT_COMMENT.to_string()),
            corrections: BTreeMap::new(),
        }
    }

    /// Loads the table. A missing file yields an empty table; a file that
    /// exists but can't be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            crate::log(&format!(
                "No correction table at {}, starting empty",
                path.display()
            ));
            return Ok(Self::empty(path));
        }

        let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CorrectionFile =
            serde_json::from_str(&contents).map_err(|source| LoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        // Keys and values are matched lowercase regardless of how the file was edited
        let corrections = file
            .corrections
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_lowercase()))
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            comment: file.comment,
            corrections,
        })
    }

    /// Exact, case-insensitive lookup.
    pub fn lookup(&self, ocr_text: &str) -> Option<&str> {
        self.corrections
            .get(&ocr_text.trim().to_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, ocr_text: &str) -> bool {
        self.lookup(ocr_text).is_some()
    }

    /// Inserts or replaces one correction and persists the merged table.
    ///
    /// The on-disk table is the base: only this one key is written over it,
    /// and the in-memory table is replaced by the result. A file that exists
    /// but doesn't parse is left untouched.
    pub fn upsert(&mut self, ocr_text: &str, canonical: &str) -> Result<(), PersistenceError> {
        let key = ocr_text.trim().to_lowercase();
        let value = canonical.trim().to_lowercase();

        let on_disk = Self::load(&self.path).map_err(|e| PersistenceError::Unreadable {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let mut merged = on_disk.corrections;
        merged.insert(key, value);
        self.corrections = merged;
        self.comment = on_disk.comment.or_else(|| self.comment.take());
        self.save()
    }

    /// All corrections, sorted by key.
    pub fn list(&self) -> impl Iterator<Item = (&str, &str)> {
        self.corrections
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), PersistenceError> {
        let parent_dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent_dir).map_err(|e| PersistenceError::io(parent_dir, e))?;

        let file = CorrectionFile {
            comment: self.comment.clone(),
            corrections: self.corrections.clone(),
        };

        let temp_file =
            NamedTempFile::new_in(parent_dir).map_err(|e| PersistenceError::io(parent_dir, e))?;
        {
            let mut writer = BufWriter::new(&temp_file);
            serde_json::to_writer_pretty(&mut writer, &file).map_err(|source| {
                PersistenceError::Serialize {
                    what: "correction table",
                    source,
                }
            })?;
            writer
                .write_all(b"\n")
                .and_then(|_| writer.flush())
                .map_err(|e| PersistenceError::io(temp_file.path(), e))?;
        }

        temp_file
            .persist(&self.path)
            .map_err(|e| PersistenceError::io(&self.path, e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_add_command_quotes_arguments() {
        assert_eq!(
            add_command("inordertraversait", "inordertraversal"),
            "ocr-corrections add 'inordertraversait' 'inordertraversal'"
        );
        assert_eq!(add_command("it's", "its"), "ocr-corrections add 'it'\\''s' 'its'");
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let table = CorrectionTable::load(&dir.path().join("ocr_corrections.json")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ocr_corrections.json");
        std::fs::write(
            &path,
            r#"{"comment": "x", "corrections": {"InOrderTraversait": "inordertraversal"}}"#,
        )
        .unwrap();

        let table = CorrectionTable::load(&path).unwrap();
        assert_eq!(table.lookup("inordertraversait"), Some("inordertraversal"));
        assert_eq!(table.lookup("INORDERTRAVERSAIT"), Some("inordertraversal"));
        assert_eq!(table.lookup("inordertraversa"), None);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ocr_corrections.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            CorrectionTable::load(&path),
            Err(LoadError::Parse { .. })
        ));
    }

    #[test]
    fn test_upsert_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ocr_corrections.json");

        let mut table = CorrectionTable::load(&path).unwrap();
        table.upsert("SearchInsrt", "searchinsert").unwrap();

        let reloaded = CorrectionTable::load(&path).unwrap();
        assert_eq!(reloaded.lookup("searchinsrt"), Some("searchinsert"));
        assert_eq!(reloaded.len(), 1);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"corrections\""));
        assert!(raw.contains(DEFAULT_COMMENT));
    }

    #[test]
    fn test_upsert_twice_single_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ocr_corrections.json");

        let mut table = CorrectionTable::load(&path).unwrap();
        table.upsert("twosun", "twosum").unwrap();
        table.upsert("twosun", "twosum").unwrap();

        let reloaded = CorrectionTable::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.lookup("twosun"), Some("twosum"));
    }

    #[test]
    fn test_upsert_last_write_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ocr_corrections.json");

        let mut table = CorrectionTable::load(&path).unwrap();
        table.upsert("twosun", "twosum").unwrap();
        table.upsert("twosun", "threesum").unwrap();

        let reloaded = CorrectionTable::load(&path).unwrap();
        assert_eq!(reloaded.lookup("twosun"), Some("threesum"));
    }

    #[test]
    fn test_upsert_merges_entries_written_elsewhere() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ocr_corrections.json");

        let mut first = CorrectionTable::load(&path).unwrap();
        let mut second = CorrectionTable::load(&path).unwrap();
        first.upsert("a1", "alpha").unwrap();
        second.upsert("b1", "beta").unwrap();

        let reloaded = CorrectionTable::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_upsert_keeps_newer_disk_value_for_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ocr_corrections.json");

        let mut session = CorrectionTable::load(&path).unwrap();
        session.upsert("x", "old").unwrap();

        let mut tool = CorrectionTable::load(&path).unwrap();
        tool.upsert("x", "new").unwrap();

        // Stale in-memory "x" must not be written back
        session.upsert("y", "z").unwrap();

        let reloaded = CorrectionTable::load(&path).unwrap();
        assert_eq!(reloaded.lookup("x"), Some("new"));
        assert_eq!(reloaded.lookup("y"), Some("z"));
        assert_eq!(session.lookup("x"), Some("new"));
    }

    #[test]
    fn test_upsert_refuses_to_clobber_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ocr_corrections.json");

        let mut table = CorrectionTable::empty(&path);
        std::fs::write(&path, "{ hand edited, broken").unwrap();

        let err = table.upsert("twosun", "twosum").unwrap_err();
        assert!(matches!(err, PersistenceError::Unreadable { .. }));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{ hand edited, broken"
        );
    }

    #[test]
    fn test_list_sorted_by_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ocr_corrections.json");

        let mut table = CorrectionTable::load(&path).unwrap();
        table.upsert("zeta", "z").unwrap();
        table.upsert("alpha", "a").unwrap();
        table.upsert("mid", "m").unwrap();

        let keys: Vec<&str> = table.list().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }
}
