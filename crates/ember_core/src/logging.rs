//! Logger setup for applications built on the engine.
//!
//! Library crates only emit through the `log` facade; installing the
//! actual logger is the application's call, once, usually first thing in
//! `main`.

use log::LevelFilter;

/// Install a fern dispatch writing `[LEVEL][target] message` lines to
/// stdout.  Errors if a logger is already installed.
pub fn init_logging(level: LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:<5}][{}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

/// Parse a config-file level name ("info", "debug", ...).  Unknown names
/// fall back to `Info` with a note on stderr rather than failing startup.
pub fn level_from_str(name: &str) -> LevelFilter {
    match name.parse() {
        Ok(level) => level,
        Err(_) => {
            eprintln!("unknown log level `{name}`, using `info`");
            LevelFilter::Info
        }
    }
}
