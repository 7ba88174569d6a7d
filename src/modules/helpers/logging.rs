use std::env;
use std::io;

use dotenvy::dotenv;
use fern::Dispatch;

pub fn level_from_str(verbosity: &str) -> log::LevelFilter {
    match verbosity.trim().to_uppercase().as_str() {
        "OFF" => log::LevelFilter::Off,
        "ERROR" => log::LevelFilter::Error,
        "WARN" => log::LevelFilter::Warn,
        "DEBUG" => log::LevelFilter::Debug,
        "TRACE" => log::LevelFilter::Trace,
        // default to info
        _ => log::LevelFilter::Info,
    }
}

/// # set up logging
/// reads `LOGGING_LEVEL` and `LOG_FILE` from the environment (or `.env`)
/// and sends every record to the log file and to stderr.
pub fn setup_logging() -> Result<(), fern::InitError> {
    dotenv().ok();
    let verbosity = env::var("LOGGING_LEVEL").unwrap_or_else(|_| "INFO".to_string());
    let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "program.log".to_string());

    let base_config = Dispatch::new().level(level_from_str(&verbosity));

    let file_logger_config = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .chain(fern::log_file(log_file)?);

    let stderr_config = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}][{}] {}", record.target(), record.level(), message))
        })
        .chain(io::stderr());

    base_config
        .chain(file_logger_config)
        .chain(stderr_config)
        .apply()?;

    Ok(())
}
