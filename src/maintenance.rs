//! Offline curation of the correction table.
//!
//! Lists and appends corrections, and turns recorded unknowns into ranked
//! suggestions with ready-to-run commands. The suggestion report never
//! writes to the table itself.

use chrono::{DateTime, Local};
use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::corrections::{add_command, CorrectionTable};
use crate::error::{MaintenanceError, ValidationError};
use crate::matching::{self, MatchPolicy, Suggestion};
use crate::unknowns::UnknownRecord;

/// Table contents as display lines, sorted by key.
pub fn list_corrections(table: &CorrectionTable) -> Vec<String> {
    table
        .list()
        .map(|(ocr, canonical)| format!("  {:30} → {}", ocr, canonical))
        .collect()
}

/// Adds one correction and persists it. Returns the new total.
pub fn add_correction(
    table: &mut CorrectionTable,
    ocr_text: &str,
    canonical: &str,
) -> Result<usize, MaintenanceError> {
    if ocr_text.trim().is_empty() {
        return Err(ValidationError::EmptyArgument("ocr_text").into());
    }
    if canonical.trim().is_empty() {
        return Err(ValidationError::EmptyArgument("canonical").into());
    }

    table.upsert(ocr_text, canonical)?;
    crate::log(&format!(
        "Added correction '{}' -> '{}'",
        ocr_text.trim().to_lowercase(),
        canonical.trim().to_lowercase()
    ));
    Ok(table.len())
}

/// One distinct unknown candidate and what it most likely meant.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub candidate: String,
    /// Number of records for this candidate
    pub occurrences: usize,
    pub last_seen: DateTime<Local>,
    pub suggestions: Vec<Suggestion>,
}

impl ReportEntry {
    /// Command adding the best suggestion, if there is one.
    pub fn command(&self) -> Option<String> {
        self.suggestions
            .first()
            .map(|best| add_command(&self.candidate, &best.identifier))
    }
}

/// Output of `suggest_corrections`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionReport {
    /// Candidates already in the table, with their current mapping
    pub already_corrected: Vec<(String, String)>,
    /// Most frequent first
    pub entries: Vec<ReportEntry>,
}

/// Scores every recorded, not-yet-corrected candidate against the catalog.
///
/// Without a catalog, each candidate is scored against the identifier list
/// stored in its most recent record.
pub fn suggest_corrections(
    table: &CorrectionTable,
    records: &[UnknownRecord],
    catalog: Option<&Catalog>,
    policy: MatchPolicy,
    limit: usize,
) -> SuggestionReport {
    // candidate -> (occurrences, latest record)
    let mut groups: HashMap<String, (usize, &UnknownRecord)> = HashMap::new();
    for record in records {
        let key = matching::normalize_candidate(&record.raw_candidate);
        if key.is_empty() {
            continue;
        }
        groups
            .entry(key)
            .and_modify(|(count, latest)| {
                *count += 1;
                if record.sequence_number > latest.sequence_number {
                    *latest = record;
                }
            })
            .or_insert((1, record));
    }

    let mut report = SuggestionReport::default();
    for (candidate, (occurrences, latest)) in groups {
        if let Some(canonical) = table.lookup(&candidate) {
            report
                .already_corrected
                .push((candidate.clone(), canonical.to_string()));
            continue;
        }

        let suggestions = match catalog {
            Some(catalog) => matching::suggest(&candidate, catalog.all_identifiers(), policy, limit),
            None => matching::suggest(
                &candidate,
                latest.known_identifiers.iter().map(String::as_str),
                policy,
                limit,
            ),
        };

        report.entries.push(ReportEntry {
            candidate,
            occurrences,
            last_seen: latest.timestamp,
            suggestions,
        });
    }

    report.already_corrected.sort();
    report.entries.sort_by(|a, b| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| a.candidate.cmp(&b.candidate))
    });
    report
}

/// Renders the report for the terminal.
pub fn render_report(report: &SuggestionReport) -> String {
    let mut out = String::new();

    for (candidate, canonical) in &report.already_corrected {
        out.push_str(&format!("Already corrected: {} → {}\n", candidate, canonical));
    }
    if !report.already_corrected.is_empty() {
        out.push('\n');
    }

    for entry in &report.entries {
        out.push_str(&format!(
            "Unknown: {} (seen {} time{}, last {})\n",
            entry.candidate,
            entry.occurrences,
            if entry.occurrences == 1 { "" } else { "s" },
            entry.last_seen.format("%Y-%m-%d %H:%M:%S")
        ));
        if entry.suggestions.is_empty() {
            out.push_str("   No similar functions found\n");
        } else {
            out.push_str("   Top suggestions:\n");
            for s in &entry.suggestions {
                out.push_str(&format!(
                    "     - {:25} (similarity: {:.0}%)\n",
                    s.identifier,
                    s.score * 100.0
                ));
            }
        }
        if let Some(command) = entry.command() {
            out.push_str(&format!("   Suggested: {}\n", command));
        }
        out.push('\n');
    }

    let commands: Vec<String> = report.entries.iter().filter_map(ReportEntry::command).collect();
    if !commands.is_empty() {
        out.push_str(&"=".repeat(60));
        out.push_str("\nSUGGESTED CORRECTIONS:\n");
        out.push_str(&"=".repeat(60));
        out.push('\n');
        for command in commands {
            out.push_str(&command);
            out.push('\n');
        }
    }

    out
}
