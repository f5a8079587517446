//! Durable records of candidates that could not be resolved.
//!
//! Each failure produces two files in the history directory:
//! - `unknown_<seq>_<timestamp>.json`: the record itself, read back by the
//!   maintenance tool
//! - `unknown_<seq>_<timestamp>.txt`: a human-readable summary ending in a
//!   ready-to-run correction command
//!
//! Files are never overwritten. Repeated failures for the same candidate
//! produce repeated records; their frequency drives curation priority.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::corrections::add_command;
use crate::error::{LoadError, PersistenceError};
use crate::matching::Suggestion;

const FILE_PREFIX: &str = "unknown_";

/// One unresolved candidate, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownRecord {
    /// Strictly increasing within a history directory
    pub sequence_number: u64,
    pub timestamp: DateTime<Local>,
    pub raw_candidate: String,
    pub selected_language: Option<String>,
    /// Snapshot the catalog was loaded from
    pub catalog_path: String,
    /// Every identifier known at failure time
    pub known_identifiers: Vec<String>,
    /// Best-scoring identifiers, best first
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

impl UnknownRecord {
    /// File stem shared by the JSON record and its text summary.
    pub fn file_stem(&self) -> String {
        format!(
            "{}{:04}_{}",
            FILE_PREFIX,
            self.sequence_number,
            self.timestamp.format("%Y%m%d_%H%M%S")
        )
    }

    /// Human-readable summary written next to the JSON record.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("OCR Detected: {}\n", self.raw_candidate));
        out.push_str(&format!(
            "Timestamp: {}\n",
            self.timestamp.format("%Y-%m-%dT%H:%M:%S")
        ));
        out.push_str(&format!(
            "Session Language: {}\n",
            self.selected_language.as_deref().unwrap_or("auto")
        ));
        out.push_str(&format!("Sequence: {}\n", self.sequence_number));

        if self.suggestions.is_empty() {
            out.push_str("No similar functions found\n");
        } else {
            out.push_str("Top suggestions:\n");
            for s in &self.suggestions {
                out.push_str(&format!(
                    "  - {:25} (similarity: {:.0}%)\n",
                    s.identifier,
                    s.score * 100.0
                ));
            }
            out.push_str(&format!(
                "Suggested: {}\n",
                add_command(&self.raw_candidate, &self.suggestions[0].identifier)
            ));
        }
        out
    }
}

/// What the recorder needs to know about the failing challenge.
pub struct RecordContext<'a> {
    pub selected_language: Option<&'a str>,
    pub suggestions: &'a [Suggestion],
    pub catalog: &'a Catalog,
    pub catalog_path: &'a Path,
}

/// Appends unknown records to a history directory.
#[derive(Debug)]
pub struct UnknownRecorder {
    dir: PathBuf,
    last_sequence: u64,
}

impl UnknownRecorder {
    /// Creates a recorder for `dir`. Numbering continues after the highest
    /// sequence already present so earlier runs are never shadowed.
    pub fn new(dir: &Path) -> Self {
        let last_sequence = highest_sequence(dir).unwrap_or(0);
        Self {
            dir: dir.to_path_buf(),
            last_sequence,
        }
    }

    /// Sequence number of the most recent record (0 if none).
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Builds the next record and writes it plus its summary.
    ///
    /// The sequence number is consumed even if the write fails.
    pub fn record(
        &mut self,
        candidate: &str,
        context: &RecordContext<'_>,
    ) -> Result<UnknownRecord, PersistenceError> {
        self.last_sequence += 1;
        let record = UnknownRecord {
            sequence_number: self.last_sequence,
            timestamp: Local::now(),
            raw_candidate: candidate.to_string(),
            selected_language: context.selected_language.map(str::to_string),
            catalog_path: context.catalog_path.display().to_string(),
            known_identifiers: context
                .catalog
                .all_identifiers()
                .map(str::to_string)
                .collect(),
            suggestions: context.suggestions.to_vec(),
        };

        fs::create_dir_all(&self.dir).map_err(|e| PersistenceError::io(&self.dir, e))?;

        let stem = record.file_stem();
        let json = serde_json::to_string_pretty(&record).map_err(|source| {
            PersistenceError::Serialize {
                what: "unknown record",
                source,
            }
        })?;
        write_new(&self.dir.join(format!("{}.json", stem)), &json)?;
        write_new(&self.dir.join(format!("{}.txt", stem)), &record.summary())?;

        crate::log(&format!(
            "Recorded unknown #{}: '{}' ({})",
            record.sequence_number,
            candidate,
            self.dir.join(&stem).display()
        ));
        Ok(record)
    }
}

/// Creates `path` (failing if it exists) and writes `contents`.
fn write_new(path: &Path, contents: &str) -> Result<(), PersistenceError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| PersistenceError::io(path, e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| PersistenceError::io(path, e))
}

/// Parses the sequence number out of `unknown_0042_20260101_120000.json`.
fn parse_sequence(file_name: &str) -> Option<u64> {
    file_name
        .strip_prefix(FILE_PREFIX)?
        .split('_')
        .next()?
        .parse()
        .ok()
}

fn highest_sequence(dir: &Path) -> Option<u64> {
    fs::read_dir(dir)
        .ok()?
        .flatten()
        .filter_map(|entry| parse_sequence(&entry.file_name().to_string_lossy()))
        .max()
}

/// Reads every JSON record in `dir`, ordered by sequence number.
///
/// A missing directory yields no records. Unparsable files are skipped with
/// a warning.
pub fn read_records(dir: &Path) -> Result<Vec<UnknownRecord>, LoadError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let parsed = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|contents| {
                serde_json::from_str::<UnknownRecord>(&contents).map_err(|e| e.to_string())
            });
        match parsed {
            Ok(record) => records.push(record),
            Err(e) => {
                crate::log(&format!(
                    "Warning: Skipping malformed record {}: {}",
                    path.display(),
                    e
                ));
            }
        }
    }

    records.sort_by_key(|r| r.sequence_number);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"[
                {"title": "twoSum", "language": "python", "blocks": ["a"]},
                {"title": "threeSum", "language": "python", "blocks": ["b"]}
            ]"#,
        )
        .unwrap()
    }

    fn suggestions() -> Vec<Suggestion> {
        vec![
            Suggestion {
                identifier: "twosum".to_string(),
                score: 0.83,
            },
            Suggestion {
                identifier: "threesum".to_string(),
                score: 0.5,
            },
        ]
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_sequence("unknown_0042_20260101_120000.json"), Some(42));
        assert_eq!(parse_sequence("unknown_7_x.txt"), Some(7));
        assert_eq!(parse_sequence("notes.txt"), None);
        assert_eq!(parse_sequence("unknown_abc.json"), None);
    }

    #[test]
    fn test_record_writes_json_and_summary() {
        let dir = tempdir().unwrap();
        let catalog = catalog();
        let suggestions = suggestions();
        let mut recorder = UnknownRecorder::new(dir.path());

        let record = recorder
            .record(
                "twosvm",
                &RecordContext {
                    selected_language: Some("python"),
                    suggestions: &suggestions,
                    catalog: &catalog,
                    catalog_path: Path::new("CodeBlocks.json"),
                },
            )
            .unwrap();

        assert_eq!(record.sequence_number, 1);
        assert_eq!(record.known_identifiers, vec!["twosum", "threesum"]);

        let stem = record.file_stem();
        let summary = std::fs::read_to_string(dir.path().join(format!("{}.txt", stem))).unwrap();
        assert!(summary.starts_with("OCR Detected: twosvm"));
        assert!(summary.contains("Session Language: python"));
        assert!(summary.contains("ocr-corrections add 'twosvm' 'twosum'"));

        let records = read_records(dir.path()).unwrap();
        assert_eq!(records, vec![record]);
    }

    #[test]
    fn test_sequence_strictly_increases_for_repeats() {
        let dir = tempdir().unwrap();
        let catalog = catalog();
        let mut recorder = UnknownRecorder::new(dir.path());
        let context = RecordContext {
            selected_language: None,
            suggestions: &[],
            catalog: &catalog,
            catalog_path: Path::new("CodeBlocks.json"),
        };

        let first = recorder.record("zzz", &context).unwrap();
        let second = recorder.record("zzz", &context).unwrap();
        assert_eq!(second.sequence_number, first.sequence_number + 1);
        assert_eq!(read_records(dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_numbering_continues_across_recorders() {
        let dir = tempdir().unwrap();
        let catalog = catalog();
        let context = RecordContext {
            selected_language: None,
            suggestions: &[],
            catalog: &catalog,
            catalog_path: Path::new("CodeBlocks.json"),
        };

        let mut first_run = UnknownRecorder::new(dir.path());
        first_run.record("aaa", &context).unwrap();
        first_run.record("bbb", &context).unwrap();

        let mut second_run = UnknownRecorder::new(dir.path());
        assert_eq!(second_run.last_sequence(), 2);
        let record = second_run.record("ccc", &context).unwrap();
        assert_eq!(record.sequence_number, 3);
    }

    #[test]
    fn test_summary_without_suggestions() {
        let dir = tempdir().unwrap();
        let catalog = catalog();
        let mut recorder = UnknownRecorder::new(dir.path());
        let record = recorder
            .record(
                "qqqq",
                &RecordContext {
                    selected_language: None,
                    suggestions: &[],
                    catalog: &catalog,
                    catalog_path: Path::new("CodeBlocks.json"),
                },
            )
            .unwrap();
        let summary = record.summary();
        assert!(summary.contains("Session Language: auto"));
        assert!(summary.contains("No similar functions found"));
        assert!(!summary.contains("Suggested:"));
    }

    #[test]
    fn test_read_records_skips_malformed() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("unknown_0001_x.json"), "{ broken").unwrap();
        std::fs::write(dir.path().join("readme.txt"), "ignored").unwrap();
        assert!(read_records(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_read_records_missing_dir() {
        let dir = tempdir().unwrap();
        assert!(read_records(&dir.path().join("absent")).unwrap().is_empty());
    }
}
