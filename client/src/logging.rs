use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Logs go to stderr so they never interleave with the terminal UI on stdout.
pub fn init() {
    LOGGER_INIT.get_or_init(|| {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "clipcap=info".into()))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    });
}
