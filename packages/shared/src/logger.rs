//! Tracing subscriber setup shared by the Roomcast binaries.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when it is set. Otherwise the filter enables `default_level`
/// for the binary's own crate and for `tower_http` request tracing.
///
/// # Arguments
///
/// * `bin_name` - Binary name, usually `env!("CARGO_BIN_NAME")`
/// * `default_level` - Level used when `RUST_LOG` is absent (e.g. `"info"`)
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(bin_name, default_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

fn default_directives(bin_name: &str, default_level: &str) -> String {
    let crate_target = bin_name.replace('-', "_");
    format!("{crate_target}={default_level},tower_http={default_level}")
}
