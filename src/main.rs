use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};

use ambient_snake::modes::{Accent, SiteMode, SiteOptions};
use ambient_snake::overlay::{Labels, Locale, OverlayConfig};

#[derive(Parser)]
#[command(name = "ambient_snake")]
#[command(version, about = "Portfolio page with a self-driving snake you can take over")]
struct Cli {
    /// JSON file with game constants, element ids and labels
    #[arg(long)]
    config: Option<PathBuf>,

    /// Label language; overrides labels from the config file
    #[arg(long, value_enum)]
    locale: Option<Locale>,

    /// Site accent theme
    #[arg(long, value_enum, default_value = "indigo")]
    accent: Accent,

    /// Start in dark mode
    #[arg(long)]
    dark: bool,

    /// Behave as if the user prefers reduced motion (no animation)
    #[arg(long)]
    reduced_motion: bool,

    /// Treat the mouse as a touch screen and show the joystick
    #[arg(long)]
    touch: bool,

    /// Where to write the log
    #[arg(long, default_value = "ambient_snake.log")]
    log_file: PathBuf,

    /// Log debug messages too
    #[arg(short, long)]
    verbose: bool,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The terminal belongs to the UI, so logs go to a file
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {}", cli.log_file.display()))?;
    WriteLogger::init(level, Config::default(), log_file).context("Failed to initialize logger")?;

    let mut config = match &cli.config {
        Some(path) => OverlayConfig::from_json_file(path)?,
        None => OverlayConfig::for_locale(cli.locale.unwrap_or_default()),
    };
    if let Some(locale) = cli.locale {
        config.labels = Labels::for_locale(locale);
    }
    let locale = cli.locale.unwrap_or_default();
    info!("starting ambient_snake ({locale:?}, {:?})", cli.accent);

    let options = SiteOptions {
        locale,
        accent: cli.accent,
        dark: cli.dark,
        reduced_motion: cli.reduced_motion,
        touch: cli.touch,
        seed: cli.seed,
    };
    let mut site = SiteMode::new(config, options);
    site.run().await?;

    info!("bye");
    Ok(())
}
