use log::LevelFilter;

/// Initialise the global logger for the binary.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks between debug and warn.
/// Calling this twice is harmless (the second call is ignored).
pub fn init(verbose: bool) {
    let default_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}
