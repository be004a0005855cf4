use clap::{Parser, Subcommand};
use solar_dataset::config::{CONFIG_ENV, DEFAULT_CONFIG_PATH};
use solar_dataset::{AppConfig, DatasetError, Pipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "solar-dataset")]
#[command(about = "Build an hourly solar production and weather dataset", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, env = CONFIG_ENV, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Fetch new production data and weather history
    Fetch,
    /// Replace the stored weather forecast
    Forecast,
    /// Rebuild the dataset from stored data
    Build,
    /// Fetch, refresh the forecast, then build (default)
    Run,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("solar_dataset=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

async fn execute(cli: Cli) -> Result<(), DatasetError> {
    let config = AppConfig::load(&cli.config)?;
    let mut pipeline = Pipeline::open(config, cli.config).await?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Fetch => {
            pipeline.fetch().await?;
        }
        Commands::Forecast => {
            pipeline.forecast().await?;
        }
        Commands::Build => {
            pipeline.build().await?;
        }
        Commands::Run => {
            pipeline.run().await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let mut message = e.to_string();
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                message.push_str(": ");
                message.push_str(&cause.to_string());
                source = cause.source();
            }
            tracing::error!("{}", message);
            ExitCode::from(e.exit_code())
        }
    }
}
