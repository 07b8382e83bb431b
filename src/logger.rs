use log::LevelFilter;

/// Initializes the logger. `RUST_LOG` still applies on top of `level`.
///
/// Log lines go to stderr, so they never mix with PGM output on stdout.
pub fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .init();
}
