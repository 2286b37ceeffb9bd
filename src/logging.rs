use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// The default level is `info`; the settings file can raise the crate to
/// `debug`. `RUST_LOG` is honored only when debug logging is on, so a stray
/// environment variable cannot make a classroom machine chatty.
pub fn init(debug: bool) {
    let fallback = if debug {
        "info,eduscreen=debug"
    } else {
        "info"
    };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    } else {
        EnvFilter::new(fallback)
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
