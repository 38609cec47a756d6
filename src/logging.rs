use anyhow::Result;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "project_manager.log";

/// Initialize file-backed logging.
///
/// The TUI owns the terminal's alternate screen, so diagnostics go to a log
/// file instead of stdout/stderr. The filter is taken from `RUST_LOG` when
/// set, defaulting to `info`.
pub fn init() -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(file)
        .with_ansi(false)
        .init();

    Ok(())
}
