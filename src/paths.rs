use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static BASE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Environment variable overriding the base directory.
pub const HOME_ENV: &str = "WPM_RESOLVER_HOME";

/// Returns the directory the catalog, corrections and history live in.
///
/// `$WPM_RESOLVER_HOME` if set, otherwise the working directory.
pub fn get_base_dir() -> &'static PathBuf {
    BASE_DIR.get_or_init(|| {
        std::env::var_os(HOME_ENV)
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<base_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_base_dir().join("logs")
}

/// Resolves a configured path against the base directory.
/// Absolute paths are returned unchanged.
pub fn resolve(path: &str) -> PathBuf {
    resolve_in(get_base_dir(), path)
}

fn resolve_in(base: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories(unknowns_dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    std::fs::create_dir_all(unknowns_dir)?;
    Ok(())
}
