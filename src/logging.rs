//! Console logging setup shared by the scanner binary and the demo.

use env_logger::Env;
use log::LevelFilter;

/// Parse a level name, falling back to `info` with a warning on stderr.
pub fn parse_level(log_level: &str) -> LevelFilter {
    match log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => {
            eprintln!("Warning: Invalid log level '{}', using 'info'", log_level);
            LevelFilter::Info
        }
    }
}

/// Install the global logger. `RUST_LOG` still applies on top of `log_level`.
pub fn initialize_logging(log_level: &str) {
    env_logger::Builder::new()
        .filter_level(parse_level(log_level))
        .parse_env(Env::default())
        .format_timestamp_millis()
        .init();
}
