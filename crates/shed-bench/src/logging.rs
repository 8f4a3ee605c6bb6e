use tracing_subscriber::{EnvFilter, fmt};

/// Installs a stderr subscriber once, keeping stdout free for summaries and
/// history exports. `RUST_LOG` wins over the verbosity flag when set.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    // Ignore the error if a global subscriber is already set (e.g. in tests).
    let _ = tracing::subscriber::set_global_default(subscriber);
}
