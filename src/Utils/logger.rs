use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;
use std::path::Path;

/// Installs a terminal logger and, if a path is given, a file logger at the same level.
/// Returns `Ok(false)` when a global logger was already set.
pub fn init_logger<P: AsRef<Path>>(level: LevelFilter, log_file: Option<P>) -> std::io::Result<bool> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        loggers.push(WriteLogger::new(level, Config::default(), File::create(path)?));
    }
    Ok(CombinedLogger::init(loggers).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::info;
    use tempfile::NamedTempFile;

    #[test]
    fn second_init_is_not_an_error() {
        let file = NamedTempFile::new().unwrap();
        // the first call may already fail if another test installed a logger
        let _ = init_logger(LevelFilter::Info, Some(file.path())).unwrap();
        info!("logger test line");
        let second = init_logger::<&Path>(LevelFilter::Info, None).unwrap();
        assert!(!second);
    }
}
