use std::path::{Path, PathBuf};
use std::sync::Once;

use crate::errors::Result;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("finance_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}

/// Creates the directory (and any missing parents).
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Resolves the application data directory, honoring an explicit override.
pub fn resolve_base_dir(overridden: Option<PathBuf>) -> PathBuf {
    if let Some(base) = overridden {
        return base;
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("finance_core")
}
