use tracing_subscriber::EnvFilter;

/// Initialize a stderr tracing subscriber so stdout stays machine-readable.
///
/// `RUST_LOG` wins over the `verbose` default.
pub fn init_stderr_tracing(verbose: bool) {
    let fallback = if verbose {
        "info,runhistory_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
