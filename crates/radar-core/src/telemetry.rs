//! Log setup for the `radar` binary.
//!
//! Stdout carries the Markdown report (it is meant to be piped or redirected),
//! so every log line goes to stderr. `RUST_LOG` overrides the level chosen on
//! the command line.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn log_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Install the stderr subscriber: compact text, or flattened JSON lines with
/// the `event` field at the top level when `json` is set.
///
/// A subscriber installed earlier (tests, embedding callers) is left in place.
pub fn init_tracing(json: bool, level: Level) {
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let registry = tracing_subscriber::registry().with(log_filter(level));

    let installed = if json {
        registry.with(layer.json().flatten_event(true)).try_init()
    } else {
        registry.with(layer.compact()).try_init()
    };
    if installed.is_err() {
        tracing::debug!(event = "telemetry.already_installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_ignored() {
        init_tracing(false, Level::INFO);
        init_tracing(true, Level::DEBUG);
        tracing::info!(event = "telemetry.test");
    }
}
