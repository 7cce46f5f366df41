//! Tracing subscriber setup
//!
//! The subscriber is only installed when `COBALT_LOG` (or `RUST_LOG`) is set.
//! Output goes to stderr.
//!
//! ```bash
//! COBALT_LOG=debug cargo test -p integration-tests
//! COBALT_LOG="cb_semantic::linker=debug,cb_builder=trace" cargo test -p integration-tests
//! ```

use tracing_subscriber::EnvFilter;

/// Variable read before `RUST_LOG`
pub const LOG_VARIABLE: &str = "COBALT_LOG";

/// Filter from `COBALT_LOG`, falling back to `RUST_LOG`; `None` when neither is set
fn build_filter() -> Option<EnvFilter> {
    if let Ok(directives) = std::env::var(LOG_VARIABLE) {
        return Some(EnvFilter::builder().parse_lossy(directives));
    }
    std::env::var(EnvFilter::DEFAULT_ENV)
        .is_ok()
        .then(EnvFilter::from_default_env)
}

/// Install the global tracing subscriber
///
/// Does nothing when no filter variable is set, or when a subscriber is
/// already installed.
pub fn init_tracing() {
    let Some(filter) = build_filter() else {
        return;
    };
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
