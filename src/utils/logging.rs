use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

/// Initialize logging with timestamp, level, and source location.
///
/// Format: `[YYYY-MM-DD HH:MM:SS] [LEVEL] [file:line] message`
pub fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] [{}:{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(level)
        .init();
}
