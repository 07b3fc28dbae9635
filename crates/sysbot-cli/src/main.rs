mod commands;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sysbot_core::{ShutdownSignal, TeardownReason, logbook, offset};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "sysbot")]
#[command(about = "Offset catalog and trainer identity tooling for Switch bots")]
#[command(version)]
struct Args {
    #[arg(short, long, default_value = "sysbot.toml")]
    config: PathBuf,

    /// Extra catalog JSON files to register (in addition to the config file)
    #[arg(long = "catalog-file")]
    catalog_files: Vec<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List registered offset catalogs
    Catalogs,

    /// Dump one catalog in hex form
    Catalog {
        /// Game family (SWSH, BDSP, LA, SV)
        family: Option<String>,
        #[arg(short, long)]
        version: Option<String>,
        /// Write the dump to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Save one catalog as loadable JSON, e.g. as a template for a new version
    Export {
        family: Option<String>,
        #[arg(short, long)]
        version: Option<String>,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Validate trainer fields and print the session label
    Label {
        name: String,
        display_id: u32,
        #[arg(short, long, default_value_t = 2)]
        language: u8,
        #[arg(short, long, default_value_t = 1)]
        game_version: u8,
    },

    /// Replay an identity bootstrap against a recorded memory snapshot
    Replay {
        snapshot: PathBuf,
        #[arg(short, long)]
        family: Option<String>,
        #[arg(short, long)]
        version: Option<String>,
        /// Override the configured retry count
        #[arg(long)]
        retries: Option<u32>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sysbot=info".parse()?))
        .init();

    let args = Args::parse();

    if let Command::Init { force } = args.command {
        if args.config.exists() && !force {
            anyhow::bail!("{} already exists (use --force to overwrite)", args.config.display());
        }
        CliConfig::default().save(&args.config)?;
        println!("Config saved to: {}", args.config.display());
        return Ok(());
    }

    let mut config = match CliConfig::load(&args.config) {
        Ok(c) => {
            info!("Loaded config from {:?}", args.config);
            c
        }
        Err(e) => {
            warn!("Failed to load config: {:#}, using defaults", e);
            CliConfig::default()
        }
    };
    config.catalogs.extend(args.catalog_files);

    let registry = offset::install_global(commands::catalog::build_registry(&config.catalogs)?)?;

    match args.command {
        Command::Init { .. } => Ok(()),
        Command::Catalogs => {
            commands::catalog::list(registry);
            Ok(())
        }
        Command::Catalog {
            family,
            version,
            output,
        } => {
            let family = commands::parse_family(&pick(family, config.family.as_deref()))?;
            let version = version.or_else(|| config.version.clone());
            let catalog = commands::catalog::select(registry, family, version.as_deref())?;
            commands::catalog::show(catalog, output.as_deref())
        }
        Command::Export {
            family,
            version,
            output,
        } => {
            let family = commands::parse_family(&pick(family, config.family.as_deref()))?;
            let version = version.or_else(|| config.version.clone());
            let catalog = commands::catalog::select(registry, family, version.as_deref())?;
            commands::catalog::export(catalog, &output)
        }
        Command::Label {
            name,
            display_id,
            language,
            game_version,
        } => commands::label::run(&name, display_id, language, game_version),
        Command::Replay {
            snapshot,
            family,
            version,
            retries,
        } => {
            let family = family
                .or_else(|| config.family.clone())
                .map(|f| commands::parse_family(&f))
                .transpose()?;
            let version = version.or_else(|| config.version.clone());
            if let Some(retries) = retries {
                config.retry.max_retries = retries;
            }
            let strategy = config.retry.strategy();

            // Setup graceful shutdown handler
            let shutdown = Arc::new(ShutdownSignal::new());
            let shutdown_ctrlc = Arc::clone(&shutdown);
            ctrlc::set_handler(move || {
                info!("Received shutdown signal, stopping...");
                shutdown_ctrlc.trigger(TeardownReason::Interrupted);
            })?;

            commands::replay::run(
                &snapshot,
                registry,
                family,
                version.as_deref(),
                strategy.as_ref(),
                shutdown,
                logbook::install_global(),
            )
        }
    }
}

/// Command-line value, else config value, else Scarlet/Violet
fn pick(arg: Option<String>, configured: Option<&str>) -> String {
    arg.or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| "SV".to_string())
}
