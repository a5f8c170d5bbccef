use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset: warnings from the app only, or
/// everything down to debug when verbose.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,moneymap=debug"
    } else {
        "off,moneymap=warn"
    }
}

/// Installs the global subscriber, logging to stderr so stdout stays
/// reserved for tables and reports.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time();
    let registry = tracing_subscriber::registry().with(filter);
    if verbose {
        registry.with(layer.pretty()).init();
    } else {
        registry.with(layer.compact()).init();
    }
}
