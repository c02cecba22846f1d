use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Checked in order; the first one set decides the filter.
const LOG_ENV_VARS: [&str; 2] = ["PAGESTRESS_LOG", "RUST_LOG"];

/// Builds the filter from the first set log variable, falling back to the
/// `--verbose` level. Returns the rejected directive when it did not parse.
fn log_filter<F>(verbose: bool, lookup: F) -> (EnvFilter, Option<String>)
where
    F: Fn(&str) -> Option<String>,
{
    let fallback = if verbose { "debug" } else { "info" };
    match LOG_ENV_VARS.iter().find_map(|key| lookup(key)) {
        Some(directive) => match EnvFilter::try_new(&directive) {
            Ok(filter) => (filter, None),
            Err(_err) => (EnvFilter::new(fallback), Some(directive)),
        },
        None => (EnvFilter::new(fallback), None),
    }
}

pub fn init_logging(verbose: bool) {
    let (filter, rejected) = log_filter(verbose, |key| std::env::var(key).ok());

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
        return;
    }
    if let Some(directive) = rejected {
        tracing::warn!("Ignoring invalid log filter '{}'.", directive);
    }
}
