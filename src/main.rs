use anyhow::{anyhow, Context, Result};
use extrae_cal::{init_logger, run, Config};
use log::{error, info};
use std::path::PathBuf;

fn parse_args() -> Result<PathBuf> {
    let mut args = std::env::args_os().skip(1);
    let input = args.next().ok_or_else(|| anyhow!("Usage: extrae-cal <document.pdf>"))?;
    if args.next().is_some() {
        return Err(anyhow!("Usage: extrae-cal <document.pdf>"));
    }
    Ok(PathBuf::from(input))
}

fn main() {
    init_logger();

    if let Err(err) = try_main() {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let input = parse_args()?;
    let config = Config::load().context("Failed to load configuration")?;

    let summary = run(&input, &config)?;
    info!(
        "Events exported to {} ({} {} records from {} events in {} tables)",
        summary.path.display(),
        summary.records,
        summary.format,
        summary.events,
        summary.tables
    );
    Ok(())
}
