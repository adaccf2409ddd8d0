//! Process-wide log setup shared by binaries.

/// Initialize tracing with `RUST_LOG`, falling back to `info`.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init("info");
}

/// Like [`init`], with `default_directive` used when `RUST_LOG` is unset
/// (typically `AppConfig::log_filter`).
pub fn init_with_filter(default_directive: &str) {
    tracing::init(default_directive);
}

/// Subscriber construction.
pub mod tracing;
