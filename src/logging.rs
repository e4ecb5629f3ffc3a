use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,spotpipe=info";

/// Initialize structured logging on stderr.
///
/// `RUST_LOG` overrides the default filter, e.g. `RUST_LOG=spotpipe=debug`
/// shows every retry decision. Console output from the CLI macros stays on
/// stdout, so the two never interleave in redirected output.
pub fn init_logging() -> Result<(), String> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| e.to_string())
}
