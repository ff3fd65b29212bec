use tracing_subscriber::{EnvFilter, FmtSubscriber};

const LOG_ENV_VARS: [&str; 2] = ["ELEVATOR_LOG", "RUST_LOG"];

/// Installs the global stderr subscriber, filtered by `ELEVATOR_LOG` or
/// `RUST_LOG` when set, else by the verbosity flag.
pub fn init_logging(verbose: bool, no_color: bool) {
    let configured = LOG_ENV_VARS
        .iter()
        .find_map(|name| std::env::var(name).ok());
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(configured.as_deref(), verbose))
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

/// An unparsable directive falls back to `info`.
fn log_filter(configured: Option<&str>, verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    let directive = configured
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback);
    EnvFilter::try_new(directive).unwrap_or_else(|_err| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_prefers_configured_directive() -> Result<(), String> {
        let cases = [
            (Some("elevator=trace"), false, "elevator=trace"),
            (Some("  "), true, "debug"),
            (None, true, "debug"),
            (None, false, "info"),
            (Some("elevator=loud"), true, "info"),
        ];
        for (configured, verbose, expected) in cases {
            let filter = log_filter(configured, verbose).to_string();
            if !filter.eq_ignore_ascii_case(expected) {
                return Err(format!(
                    "Unexpected filter for {:?}/{}: {}",
                    configured, verbose, filter
                ));
            }
        }
        Ok(())
    }

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(false, true);
        init_logging(true, true);
    }
}
