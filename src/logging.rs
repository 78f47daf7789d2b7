use tracing_subscriber::{EnvFilter, fmt};

/// Installs the stderr log subscriber
///
/// 0 = warn, 1 = debug (hyper connection noise suppressed), 2+ = trace.
/// `RUST_LOG` overrides the verbosity flags; `quiet` overrides both.
pub fn init_logging(verbose_level: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        let default = match verbose_level {
            0 => "warn",
            1 => "debug,hyper_util=warn,hyper=warn,rustls=warn",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose_level > 1)
        .init();
}
