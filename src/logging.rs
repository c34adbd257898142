use tracing_subscriber::EnvFilter;

/// Initialise logging at `info`, or `debug` when the settings file asks for
/// it. With debug enabled the `RUST_LOG` environment variable may override
/// the filter; otherwise it is ignored so a stray variable cannot turn on
/// verbose output in the field.
pub fn init(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
