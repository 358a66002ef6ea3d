use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over `default_directive`;
/// `ONLYCATS_LOG_FORMAT=json` switches to one JSON object per line.
///
/// Output goes to stderr so command output on stdout stays machine-readable.
/// Calling this twice is harmless, the second call is ignored.
pub fn init_logging(default_directive: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let json = std::env::var("ONLYCATS_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };
    // already installed (tests, embedding apps)
    let _ = result;
}
