pub mod build_info;
pub(crate) mod persistence;

use std::{env, path::PathBuf, sync::Once};

const DEFAULT_DIR_NAME: &str = ".subtrack";
const HOME_ENV: &str = "SUBTRACK_HOME";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber, writing to stderr so command
/// output on stdout stays machine-readable.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("subtrack_core=warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Returns the application data directory: `$SUBTRACK_HOME` when set,
/// otherwise `~/.subtrack`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
