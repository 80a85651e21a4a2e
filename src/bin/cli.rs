//! arena-graph CLI
//!
//! Fetches an Are.na account into a resumable cache and writes the graph
//! document.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use arena_graph::{
    error::Result,
    models::Config,
    pipeline,
    utils::http::{TOKEN_VAR, resolve_token},
};

/// arena-graph - Are.na channel graph builder
#[derive(Parser, Debug)]
#[command(
    name = "arena-graph",
    version,
    about = "Fetch Are.na channels into a consolidated graph document"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch all channels (resuming from the cache) and write the graph
    Fetch {
        /// Ignore the existing cache and start over
        #[arg(long)]
        fresh: bool,

        /// Cache file (default from config)
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Output file (default from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// API access token
        #[arg(long, env = TOKEN_VAR, hide_env_values = true)]
        token: Option<String>,
    },

    /// Validate the configuration file
    Validate,

    /// Show cache and last output info
    Info,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, configured: &str) {
    let level = if verbose { "debug" } else { configured };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load_config(path: &Path, verbose: bool) -> Config {
    match Config::load(path) {
        Ok(config) => {
            init_logging(verbose, &config.logging.level);
            log::info!("Loaded configuration from {}", path.display());
            config
        }
        Err(e) => {
            let config = Config::default();
            init_logging(verbose, &config.logging.level);
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                path.display(),
                e
            );
            config
        }
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli.config, cli.verbose);

    match cli.command {
        Command::Fetch {
            fresh,
            cache,
            output,
            token,
        } => {
            if let Some(cache) = cache {
                config.paths.cache_file = cache.display().to_string();
            }
            if let Some(output) = output {
                config.paths.output_file = output.display().to_string();
            }

            let token = resolve_token(token.as_deref(), Path::new(&config.paths.env_file))?;
            let report = pipeline::run_pipeline(&config, &token, fresh).await?;

            if report.stats.failed > 0 {
                log::warn!(
                    "{} channels failed; re-run to retry them",
                    report.stats.failed
                );
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = pipeline::run_validate(&config) {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("All validations passed!");
        }

        Command::Info => {
            pipeline::run_info(&config).await?;
        }
    }

    log::info!("Done!");

    Ok(())
}
