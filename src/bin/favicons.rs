use std::process::ExitCode;

use anyhow::Context;
use favicon_forge::{AssetConfig, Pipeline};
use tracing::log;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

const CONFIG_FILE: &str = "favicons.toml";

fn main() -> ExitCode {
    init_logger();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = AssetConfig::parse_or_default(CONFIG_FILE);
    let source = config.source.clone();

    log::info!("Generating favicon files from {:?}", source);
    let summary = Pipeline::new(config)
        .run()
        .with_context(|| format!("Failed to generate assets from {:?}", source))?;

    println!("\n✓ All icons generated successfully!\n");
    print!("{summary}");
    Ok(())
}

fn init_logger() {
    let layer = fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::new("info"));

    Registry::default().with(layer).init();
}
