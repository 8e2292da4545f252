//! Log output for the `esc` binary.
//!
//! Nothing is installed unless `ESC_LOG` (or `RUST_LOG`) is set:
//!
//! ```bash
//! ESC_LOG=debug esc parse src/...
//! ESC_LOG=esc::surface=trace ESC_LOG_FORMAT=json esc expr "a + b * c"
//! ```
//!
//! Output always goes to stderr; stdout carries the JSON the commands print.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("ESC_LOG_FORMAT").unwrap_or_default())
    }
}

/// `ESC_LOG` wins over `RUST_LOG` when both are set.
fn build_filter() -> EnvFilter {
    match std::env::var("ESC_LOG") {
        Ok(value) => EnvFilter::builder().parse_lossy(value),
        Err(_) => EnvFilter::from_default_env(),
    }
}

pub fn init_tracing() {
    if std::env::var_os("ESC_LOG").is_none() && std::env::var_os("RUST_LOG").is_none() {
        return;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Json => {
            let layer = fmt::layer().json().with_writer(std::io::stderr);
            let _ = Registry::default().with(filter).with(layer).try_init();
        }
        LogFormat::Text => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LogFormat;

    #[test]
    fn log_format_defaults_to_text() {
        assert_eq!(LogFormat::parse(""), LogFormat::Text);
        assert_eq!(LogFormat::parse("tree"), LogFormat::Text);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
    }
}
