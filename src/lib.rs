//! Identifier resolution for the typing-game bot.
//!
//! Turns a noisy OCR'd function name into a catalog entry and the source
//! body to type, and keeps the correction feedback loop on disk.

pub mod catalog;
pub mod config;
pub mod corrections;
pub mod error;
pub mod maintenance;
pub mod matching;
pub mod paths;
pub mod resolver;
pub mod unknowns;

pub use catalog::{Catalog, CatalogEntry, Variants};
pub use corrections::CorrectionTable;
pub use error::{LoadError, MaintenanceError, PersistenceError, ValidationError};
pub use resolver::{resolve, MatchStage, ResolutionRequest, ResolutionResult, Session};
pub use unknowns::{UnknownRecord, UnknownRecorder};

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

/// Logs a timestamped line to stderr and to the log file.
///
/// Stdout is left to the binaries, which print resolved source there.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    eprint!("{}", line);
    let log_path = paths::get_logs_dir().join("wpm_resolver.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}
