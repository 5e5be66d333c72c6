use log::LevelFilter;

const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

pub fn setup_logger() -> Result<(), fern::InitError> {
    let crate_level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(LevelFilter::Info)
        .level_for(CRATE_TARGET, crate_level)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}
