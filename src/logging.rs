use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Sends diagnostics to stderr, leaving stdout to the transcript.
/// Verbosity follows `RUST_LOG`, e.g. `RUST_LOG=property_enumerator=debug`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // Only fails if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
