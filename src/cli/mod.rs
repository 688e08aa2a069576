pub mod commands;
pub mod handlers;
pub mod output;

use std::io::IsTerminal;

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Level used when neither `RUST_LOG` nor the config sets a filter
pub fn default_level(verbose: u8, quiet: u8) -> &'static str {
    if quiet >= 2 {
        "off"
    } else if quiet == 1 {
        "error"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    }
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over the config's `log.filter`, which wins over the
/// `-v`/`-q` level. An unparsable filter falls through to the next source.
pub fn init_tracing(verbose: u8, quiet: u8, config_filter: Option<&str>) {
    let level = default_level(verbose, quiet);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| match config_filter {
            Some(filter) => EnvFilter::try_new(filter),
            None => EnvFilter::try_new(level),
        })
        .unwrap_or_else(|_| EnvFilter::new(level));

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
}
