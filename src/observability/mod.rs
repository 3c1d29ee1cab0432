//! # Observability
//!
//! Logging setup for the CLI and span macros for clone runs.

pub mod logging;

use std::str::FromStr;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unsupported log format: '{}'. Use 'text' or 'json'.", s)),
        }
    }
}

/// Default filter directive for the given verbosity.
///
/// Verbose runs trace this crate, which includes request and response bodies.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "info,lbclone=trace"
    } else {
        "info"
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let builder = FmtSubscriber::builder().with_env_filter(filter).with_target(false);
    // A subscriber installed earlier (integration tests) stays in place.
    let _ = match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };
}
