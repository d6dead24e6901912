//! Shared helpers for unit tests.

use once_cell::sync::OnceCell;

static LOGGER: OnceCell<()> = OnceCell::new();

/// Installs a test-writer tracing subscriber once per process. Controlled
/// via `RUST_LOG`.
pub(crate) fn enable_logger() {
    LOGGER.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
