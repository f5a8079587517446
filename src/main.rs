//! Game-session resolver.
//!
//! Reads one OCR candidate per stdin line (`candidate` or
//! `candidate<TAB>language_hint`), prints the source to type for each
//! resolved challenge on stdout, and records the ones it can't resolve.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use wpm_resolver::config::{get_config, init_config};
use wpm_resolver::corrections::{add_command, CorrectionTable};
use wpm_resolver::paths;
use wpm_resolver::resolver::extract_candidate;
use wpm_resolver::{log, Catalog, ResolutionRequest, ResolutionResult, Session, UnknownRecorder};

/// Resolve OCR'd function names to the catalog source to type.
#[derive(Parser, Debug)]
#[command(name = "wpm-resolver")]
#[command(version)]
struct Cli {
    /// Language chosen in the game menu, sticky for the whole session
    #[arg(short, long)]
    language: Option<String>,

    /// OCR text dump of the challenge title; read instead of stdin
    #[arg(long, value_name = "FILE")]
    ocr_text: Option<PathBuf>,
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        log(&format!("[PANIC]{} {}", location, msg));
    }));

    let cli = Cli::parse();

    init_config();
    let config = get_config().clone();

    let unknowns_dir = config.unknowns_dir();
    paths::ensure_directories(&unknowns_dir).context("Failed to create output directories")?;

    let catalog_path = config.catalog_path();
    let catalog = Catalog::load(&catalog_path)
        .with_context(|| format!("Cannot start session without {}", catalog_path.display()))?;

    let corrections_path = config.corrections_path();
    let corrections = match CorrectionTable::load(&corrections_path) {
        Ok(table) => table,
        Err(e) => {
            log(&format!("WARNING: {}. Continuing without corrections.", e));
            CorrectionTable::empty(&corrections_path)
        }
    };

    let recorder = UnknownRecorder::new(&unknowns_dir);
    let mut session = Session::new(&catalog, catalog_path, corrections, recorder, config);
    if let Some(language) = &cli.language {
        session.select_language(language);
    }
    let threshold = session.config().display_threshold;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut diag = io::stderr();

    if let Some(ocr_path) = &cli.ocr_text {
        let text = std::fs::read_to_string(ocr_path)
            .with_context(|| format!("Failed to read {}", ocr_path.display()))?;
        match request_from_ocr_text(&text) {
            Some(request) => report(&mut out, &mut diag, session.resolve(request), threshold)?,
            None => log(&format!("No identifier found in {}", ocr_path.display())),
        }
    } else {
        for line in io::stdin().lock().lines() {
            let line = line.context("Failed to read stdin")?;
            if let Some(request) = request_from_line(&line) {
                report(&mut out, &mut diag, session.resolve(request), threshold)?;
            }
        }
    }

    log(&format!(
        "Session finished: {} resolved, {} unresolved",
        session.resolved_count(),
        session.unresolved_count()
    ));
    Ok(())
}

/// Parses `candidate` or `candidate<TAB>hint`. Blank lines yield nothing.
fn request_from_line(line: &str) -> Option<ResolutionRequest> {
    let (candidate, hint) = match line.split_once('\t') {
        Some((candidate, hint)) => (candidate, Some(hint.trim())),
        None => (line, None),
    };
    if candidate.trim().is_empty() {
        return None;
    }

    let request = ResolutionRequest::new(candidate);
    Some(match hint.filter(|h| !h.is_empty()) {
        Some(hint) => request.with_hint(hint),
        None => request,
    })
}

/// Extracts the candidate from an OCR dump; the same text drives language
/// detection.
fn request_from_ocr_text(text: &str) -> Option<ResolutionRequest> {
    extract_candidate(text).map(|candidate| ResolutionRequest::new(candidate).with_screen_text(text))
}

/// Source goes to `out`; diagnostics for humans go to `diag`, listing only
/// suggestions above `display_threshold`.
fn report(
    out: &mut impl Write,
    diag: &mut impl Write,
    result: ResolutionResult,
    display_threshold: f64,
) -> Result<()> {
    match result {
        ResolutionResult::Resolved { source, .. } => {
            out.write_all(source.as_bytes())?;
            if !source.ends_with('\n') {
                out.write_all(b"\n")?;
            }
            out.flush()?;
        }
        ResolutionResult::Unresolved {
            raw_candidate,
            top_suggestions,
        } => {
            writeln!(diag, "Unknown function: {}", raw_candidate)?;
            let shown: Vec<_> = top_suggestions
                .iter()
                .filter(|s| s.score > display_threshold)
                .collect();
            if shown.is_empty() {
                writeln!(diag, "  No similar functions found")?;
            } else {
                writeln!(diag, "  Top suggestions:")?;
                for s in &shown {
                    writeln!(
                        diag,
                        "    - {:25} (similarity: {:.0}%)",
                        s.identifier,
                        s.score * 100.0
                    )?;
                }
                writeln!(
                    diag,
                    "  To add: {}",
                    add_command(&raw_candidate, &shown[0].identifier)
                )?;
            }
        }
    }
    Ok(())
}
