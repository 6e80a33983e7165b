//! Logging utilities: YAML pretty-printing for log lines and subscriber setup.

use serde::Serialize;
use std::fmt::Debug;
use tracing::Level;

/// Wrapper for pretty-printing types in logs as YAML
///
/// ```ignore
/// use workboard_common::Pretty;
/// use tracing::debug;
///
/// debug!("criteria: {}", Pretty(&criteria));
/// ```
///
/// Outputs YAML with a leading newline. Debug is used as a fallback if YAML
/// serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// Install a stderr fmt subscriber filtered at `level`.
///
/// `RUST_LOG` directives, when present, take precedence over `level`.
/// Returns `false` when a global subscriber was already installed, which
/// makes the call safe from several tests in one process.
pub fn init_tracing(level: Level) -> bool {
    use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}
