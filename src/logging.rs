// Diagnostic logging for verbscan
// tracing events go to stderr so stdout carries only the report

use lazy_static::lazy_static;
use tracing_subscriber::{self, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase();
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.as_str());
}

/// Filter directive used when neither `RUST_LOG` nor the project variable is set.
pub fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "warn" };
    format!("{}={}", env!("CARGO_CRATE_NAME"), level)
}

/// Initializes stderr logging. Safe to call more than once; later calls are ignored.
pub fn initialize_logging(verbose: bool, ansi: bool) {
    let directive = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV.as_str()))
        .unwrap_or_else(|_| default_directive(verbose));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(ansi)
        .with_filter(EnvFilter::new(directive));

    let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
}
