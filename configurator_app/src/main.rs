//! Headless configurator host
//!
//! Reads host messages as JSON lines on stdin, writes replies as JSON lines
//! on stdout, and logs a summary of every composed frame. When stdin closes,
//! outstanding fetches are finished and the engraving raster can be dumped
//! to a PNG for inspection.
//!
//! ```text
//! echo '{"type":"changeEngravingText","text":"Forever"}' \
//!     | configurator --config config.toml --dump-engraving engraving.png
//! ```

mod host;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use futures::channel::mpsc;
use futures::executor::block_on;
use gem_engine::foundation::logging;
use gem_engine::prelude::*;

use host::{spawn_stdin_reader, StdoutSink, SummaryRenderer};

const DEFAULT_ASSET_DIR: &str = "assets";

fn main() -> Result<()> {
    let matches = Command::new("configurator")
        .about("Runs the jewellery configurator against JSON messages on stdin")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (.toml or .ron)"),
        )
        .arg(
            Arg::new("assets")
                .short('a')
                .long("assets")
                .value_name("DIR")
                .help("Directory relative asset URLs resolve against")
                .default_value(DEFAULT_ASSET_DIR),
        )
        .arg(
            Arg::new("dump-engraving")
                .long("dump-engraving")
                .value_name("FILE")
                .help("Write the final engraving raster to a PNG"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Override the configured log level"),
        )
        .get_matches();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => ConfiguratorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => ConfiguratorConfig::default(),
    };
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.engine.log_level = level.clone();
    }
    logging::init(&config.engine.log_level);

    let asset_root = matches
        .get_one::<String>("assets")
        .map_or_else(|| PathBuf::from(DEFAULT_ASSET_DIR), PathBuf::from);
    let fonts = FontLibrary::from_config(&config.assets, &asset_root).unwrap_or_else(|e| {
        log::warn!("Font loading failed ({}); using the built-in block face", e);
        FontLibrary::new()
    });
    log::info!("Fonts: {:?}", fonts.families().collect::<Vec<_>>());

    let (tx, rx) = mpsc::unbounded();
    let reader = spawn_stdin_reader(tx).context("Failed to start stdin reader")?;

    let mut configurator = Configurator::new(
        config,
        Box::new(fonts),
        FileAssetLoader::new(&asset_root),
        SummaryRenderer::default(),
        StdoutSink,
    )
    .context("Invalid configuration")?;

    block_on(configurator.run(rx));

    if reader.join().is_err() {
        log::error!("stdin reader panicked");
    }
    log::info!(
        "Finished after {} frames; model {:?}",
        configurator.renderer().frames(),
        configurator.mounted_model()
    );

    if let Some(path) = matches.get_one::<String>("dump-engraving") {
        configurator
            .rasterizer()
            .current()
            .save(path)
            .with_context(|| format!("Failed to write engraving raster to {path}"))?;
        log::info!("Engraving raster written to {}", path);
    }

    Ok(())
}
