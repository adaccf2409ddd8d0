//! Tracing subscriber: JSON lines on stderr, filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

fn filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(default_directive: &str) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter(default_directive))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();

    if !installed {
        ::tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directive_applies_without_rust_log() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        assert_eq!(filter("warn").to_string(), "warn");
    }

    #[test]
    fn init_twice_is_harmless() {
        init("warn");
        init("debug");
    }
}
