//! OCR correction table maintenance.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::process::ExitCode;

use wpm_resolver::config::{get_config, init_config, ResolverConfig};
use wpm_resolver::maintenance::{add_correction, list_corrections, render_report, suggest_corrections};
use wpm_resolver::unknowns::read_records;
use wpm_resolver::{log, Catalog, CorrectionTable};

/// Maintain the OCR correction table.
#[derive(Parser, Debug)]
#[command(name = "ocr-corrections")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// List all corrections (default)
    List,

    /// Add a correction
    Add {
        /// Text as the OCR engine reads it
        ocr_text: String,
        /// Catalog identifier it stands for
        canonical: String,
    },

    /// Suggest corrections from the unknown history
    Suggest,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_config();
    let stdout = io::stdout();
    match run(cli.command.unwrap_or(Command::List), get_config(), &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(command: Command, config: &ResolverConfig, out: &mut impl Write) -> Result<()> {
    let corrections_path = config.corrections_path();

    match command {
        Command::List => {
            let table = CorrectionTable::load(&corrections_path)?;
            writeln!(out, "Current OCR corrections ({}):", table.len())?;
            writeln!(out, "{}", "=".repeat(60))?;
            for line in list_corrections(&table) {
                writeln!(out, "{}", line)?;
            }
        }
        Command::Add {
            ocr_text,
            canonical,
        } => {
            let mut table = CorrectionTable::load(&corrections_path)?;

            let identifier = canonical.trim().to_lowercase();
            match Catalog::load(&config.catalog_path()) {
                Ok(catalog) if !identifier.is_empty() && !catalog.contains(&identifier) => {
                    eprintln!(
                        "Warning: '{}' is not in the catalog; the correction will be ignored until it is.",
                        identifier
                    );
                }
                Ok(_) => {}
                Err(e) => log(&format!("Could not check catalog: {}", e)),
            }

            let total = add_correction(&mut table, &ocr_text, &canonical)?;
            writeln!(
                out,
                "Added correction: '{}' → '{}'",
                ocr_text.trim().to_lowercase(),
                identifier
            )?;
            writeln!(out, "Total corrections: {}", total)?;
        }
        Command::Suggest => {
            let table = CorrectionTable::load(&corrections_path)?;
            let unknowns_dir = config.unknowns_dir();
            let records = read_records(&unknowns_dir)
                .with_context(|| format!("Failed to read {}", unknowns_dir.display()))?;
            if records.is_empty() {
                writeln!(out, "No unknown snippets found in {}", unknowns_dir.display())?;
                return Ok(());
            }

            let catalog = match Catalog::load(&config.catalog_path()) {
                Ok(catalog) => Some(catalog),
                Err(e) => {
                    log(&format!(
                        "Could not load catalog ({}). Using identifiers stored in the records.",
                        e
                    ));
                    None
                }
            };

            writeln!(out, "Analyzing {} unknown snippets...\n", records.len())?;
            let report = suggest_corrections(
                &table,
                &records,
                catalog.as_ref(),
                config.suggestion_policy(),
                config.max_suggestions,
            );
            write!(out, "{}", render_report(&report))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use std::path::Path;
    use tempfile::tempdir;
    use wpm_resolver::error::{MaintenanceError, ValidationError};
    use wpm_resolver::unknowns::{RecordContext, UnknownRecorder};

    const SNAPSHOT: &str = r#"[
        {"title": "inorderTraversal", "language": "python", "blocks": ["def inorderTraversal(root):\n"]},
        {"title": "twoSum", "language": "python", "blocks": ["def twoSum(nums, target):\n"]}
    ]"#;

    /// Config whose files all live in `dir`.
    fn config_in(dir: &Path) -> ResolverConfig {
        let catalog_path = dir.join("CodeBlocks.json");
        std::fs::write(&catalog_path, SNAPSHOT).unwrap();
        ResolverConfig {
            catalog_path: catalog_path.display().to_string(),
            corrections_path: dir.join("ocr_corrections.json").display().to_string(),
            unknowns_dir: dir.join("unknown_snippets_history").display().to_string(),
            ..ResolverConfig::default()
        }
    }

    fn run_to_string(command: Command, config: &ResolverConfig) -> Result<String> {
        let mut out = Vec::new();
        run(command, config, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn add(ocr_text: &str, canonical: &str) -> Command {
        Command::Add {
            ocr_text: ocr_text.to_string(),
            canonical: canonical.to_string(),
        }
    }

    #[test]
    fn test_no_subcommand_means_list() {
        let cli = Cli::try_parse_from(["ocr-corrections"]).unwrap();
        assert_eq!(cli.command, None);
        let cli = Cli::try_parse_from(["ocr-corrections", "list"]).unwrap();
        assert_eq!(cli.command, Some(Command::List));
    }

    #[test]
    fn test_add_parses_two_arguments() {
        let cli = Cli::try_parse_from(["ocr-corrections", "add", "twosun", "twosum"]).unwrap();
        assert_eq!(cli.command, Some(add("twosun", "twosum")));
    }

    #[test]
    fn test_bad_arity_is_usage_error() {
        let err = Cli::try_parse_from(["ocr-corrections", "add", "twosun"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);

        let err = Cli::try_parse_from(["ocr-corrections", "add", "a", "b", "c"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = Cli::try_parse_from(["ocr-corrections", "frobnicate"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_add_prints_new_total() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let first = run_to_string(add("InorderTraversait", "inordertraversal"), &config).unwrap();
        assert!(first.contains("'inordertraversait' → 'inordertraversal'"));
        assert!(first.contains("Total corrections: 1"));

        let second = run_to_string(add("twosun", "twosum"), &config).unwrap();
        assert!(second.contains("Total corrections: 2"));

        let listing = run_to_string(Command::List, &config).unwrap();
        assert!(listing.contains("Current OCR corrections (2):"));
        assert!(listing.contains("inordertraversait"));
    }

    #[test]
    fn test_add_unknown_identifier_still_writes() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let out = run_to_string(add("climbstair", "climbstairs"), &config).unwrap();
        assert!(out.contains("Total corrections: 1"));
    }

    #[test]
    fn test_add_empty_argument_fails() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let err = run_to_string(add("", "twosum"), &config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MaintenanceError>(),
            Some(MaintenanceError::Validation(ValidationError::EmptyArgument(
                "ocr_text"
            )))
        ));
        assert!(!dir.path().join("ocr_corrections.json").exists());
    }

    #[test]
    fn test_suggest_without_history() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let out = run_to_string(Command::Suggest, &config).unwrap();
        assert!(out.contains("No unknown snippets found"));
    }

    #[test]
    fn test_suggest_from_recorded_unknowns() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let catalog_path = config.catalog_path();
        let catalog = Catalog::load(&catalog_path).unwrap();

        let mut recorder = UnknownRecorder::new(&config.unknowns_dir());
        let context = RecordContext {
            selected_language: Some("python"),
            suggestions: &[],
            catalog: &catalog,
            catalog_path: &catalog_path,
        };
        recorder.record("inordertraversait", &context).unwrap();
        recorder.record("inordertraversait", &context).unwrap();

        let out = run_to_string(Command::Suggest, &config).unwrap();
        assert!(out.contains("Analyzing 2 unknown snippets"));
        assert!(out.contains("seen 2 times"));
        assert!(out.contains("ocr-corrections add 'inordertraversait' 'inordertraversal'"));
    }
}
