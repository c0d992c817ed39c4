//! Tracing/logging initialization.
//!
//! JSON lines with timestamps. `RUST_LOG` always wins over the configured
//! fallback level.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LEVEL: &str = "info";

/// Filter from `RUST_LOG`, else `fallback`, else [`DEFAULT_LEVEL`].
///
/// An unparseable fallback falls back to [`DEFAULT_LEVEL`] too.
pub fn env_filter(fallback: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        fallback
            .and_then(|level| EnvFilter::try_new(level).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LEVEL))
    })
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(fallback: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(fallback))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_a_no_op() {
        init(Some("debug"));
        init(None);
        ::tracing::info!(component = "observability", "tracing initialized");
    }

    #[test]
    fn bad_fallback_level_does_not_panic() {
        let _ = env_filter(Some("not a [valid filter"));
    }
}
