//! Suite-wide tracing setup.

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

/// Initialize the tracing subscriber once per process. Respects
/// `RUST_LOG`; defaults to `info` with the suite's own crates at `debug`.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,grid-bridge=debug,response-watch=debug,ui-wait=debug")
        });
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}
