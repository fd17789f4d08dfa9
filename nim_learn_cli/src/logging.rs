use anyhow::{Context, Result};
use std::io;

pub fn init(verbose: bool, log_file: Option<&str>) -> Result<()> {
    let stderr_level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    let log_dispatcher = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{}[{}][{}] {}",
            chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
            record.target(),
            record.level(),
            message
        ));
    });

    let log_dispatcher = match log_file {
        Some(log_file) => log_dispatcher
            .chain(
                fern::Dispatch::new()
                    .level(log::LevelFilter::Debug)
                    .chain(fern::log_file(log_file).context("Could not open log file")?),
            )
            .chain(fern::Dispatch::new().level(stderr_level).chain(io::stderr())),
        None => log_dispatcher.level(stderr_level).chain(io::stderr()),
    };

    log_dispatcher
        .apply()
        .context("Could not install logger")?;
    Ok(())
}
