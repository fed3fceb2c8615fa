//! Panelpack CLI - unpack comic e-books to images and repack them for e-readers

mod commands;

use anyhow::Result;
use clap::Parser;
use panelpack_core::config::{ENV_CONVERTER, ENV_PACKER, ENV_PROFILE};
use panelpack_core::PipelineConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "panelpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// E-book files to process, in order
    inputs: Vec<PathBuf>,

    /// Device profile passed to the packer (e.g. KPW5, KOA3, KV)
    #[arg(short, long, env = ENV_PROFILE)]
    profile: Option<String>,

    /// Only extract images, skip repacking
    #[arg(long)]
    no_repack: bool,

    /// Path to the packer executable (defaults to kcc-c2e beside this program)
    #[arg(long, env = ENV_PACKER)]
    packer: Option<PathBuf>,

    /// Converter executable name or path
    #[arg(long, env = ENV_CONVERTER)]
    converter: Option<String>,

    /// Print the batch summary as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::from_env();
        if let Some(profile) = &self.profile {
            config = config.with_device_profile(profile);
        }
        if let Some(packer) = &self.packer {
            config = config.with_packer(packer);
        }
        if let Some(converter) = &self.converter {
            config = config.with_converter(converter);
        }
        if self.no_repack {
            config = config.with_repack(false);
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "panelpack_cli=debug,panelpack_core=debug"
    } else {
        "panelpack_cli=info,panelpack_core=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.inputs.is_empty() {
        commands::print_banner();
        return Ok(());
    }

    let config = cli.pipeline_config();
    commands::process(&cli.inputs, config, cli.json)
}
