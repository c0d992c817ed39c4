//! Tracing and logging setup shared by catalog processes.

/// Initialize process-wide tracing, filtered by `RUST_LOG` (default `info`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(None);
}

/// Like [`init`], with `level` as the fallback filter when `RUST_LOG` is unset
/// (typically `CatalogConfig::log_level`).
pub fn init_with_level(level: &str) {
    tracing::init(Some(level));
}

/// Tracing configuration (filters, layers).
pub mod tracing;
