//! Tracing initialization for the CLI.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// HTTP client crates that are only logged with `--verbose`.
const NOISY_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls", "h2"];

/// Initialize tracing.
///
/// Uses the `RUST_LOG` environment variable when set. Otherwise logs at
/// `info`, or `debug` with `debug = true`. HTTP client internals stay at
/// `warn` unless `verbose` is set.
pub fn init_tracing(debug: bool, verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(debug, verbose)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();
}

fn default_directives(debug: bool, verbose: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    if verbose {
        return level.to_string();
    }
    NOISY_TARGETS
        .iter()
        .fold(level.to_string(), |acc, target| format!("{acc},{target}=warn"))
}
