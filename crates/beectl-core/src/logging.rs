//! File logging for beectl
//!
//! stdout belongs to the headless console's NDJSON stream, so every log line
//! goes to a daily file under `{data_local_dir}/beectl/logs/`. Filtering uses
//! `BEECTL_LOG` with the usual `EnvFilter` syntax:
//!
//! ```bash
//! BEECTL_LOG=beectl_device=trace beectl --host 192.168.1.40
//! ```

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable controlling the log filter.
pub const LOG_ENV_VAR: &str = "BEECTL_LOG";

/// Filter used when `BEECTL_LOG` is unset or unparsable.
const DEFAULT_FILTER: &str = "beectl=info,warn";

const LOG_FILE_PREFIX: &str = "beectl.log";

/// Install the global subscriber. Call once, before the engine starts.
pub fn init() -> Result<()> {
    let dir = log_directory();
    std::fs::create_dir_all(&dir)?;

    let writer = RollingFileAppender::new(Rotation::DAILY, &dir, LOG_FILE_PREFIX);

    tracing_subscriber::registry()
        .with(log_filter())
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new("%H:%M:%S%.3f".to_string())),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        dir = %dir.display(),
        "beectl logging started"
    );
    Ok(())
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `{data_local_dir}/beectl/logs`, or `./beectl/logs` without a data dir.
fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("beectl")
        .join("logs")
}
