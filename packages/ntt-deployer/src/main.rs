use clap::{Parser, Subcommand};
use eyre::{eyre, Result};

use ntt_deployer::config::Config;
use ntt_deployer::lcd::LcdClient;
use ntt_deployer::plan::PlanRecorder;
use ntt_deployer::{DeployedContracts, DeploymentRegistry, JsonFileRegistry, Reconciler, Target};

#[derive(Parser, Debug)]
#[command(name = "ntt-deployer", about = "Converge deployed NTT contracts to a declared target")]
struct Cli {
    /// .env file to load before reading the environment
    #[arg(long, global = true)]
    env_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the live deployment and print the groups that would be submitted
    Plan {
        /// Seconds added to timelocked schedules; overrides the target file
        #[arg(long)]
        inclusion_margin: Option<u64>,
    },
    /// Print the recorded deployment of the configured network
    Show,
    /// Record deployed contract addresses for the configured network
    Register {
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        ntt_manager: Option<String>,
        #[arg(long)]
        transceiver_manager: Option<String>,
        #[arg(long)]
        transceiver: Option<String>,
    },
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    init_logging();

    let config = match &cli.env_file {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };
    tracing::info!(
        network = %config.network,
        lcd_url = %config.lcd_url,
        registry = %config.registry_path.display(),
        "Configuration loaded"
    );

    let mut registry = JsonFileRegistry::new(&config.registry_path);

    match cli.command {
        Command::Plan { inclusion_margin } => plan(&config, &registry, inclusion_margin).await,
        Command::Show => {
            let entry = registry
                .get(config.network)?
                .ok_or_else(|| eyre!("No deployment recorded for {}", config.network))?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
            Ok(())
        }
        Command::Register {
            token,
            ntt_manager,
            transceiver_manager,
            transceiver,
        } => {
            registry.record(
                config.network,
                DeployedContracts {
                    token,
                    ntt_manager,
                    transceiver_manager,
                    transceiver,
                },
            )?;
            tracing::info!(network = %config.network, "Deployment recorded");
            Ok(())
        }
    }
}

async fn plan(
    config: &Config,
    registry: &JsonFileRegistry,
    inclusion_margin: Option<u64>,
) -> Result<()> {
    let mut target = Target::load(&config.target_path)?;
    if let Some(margin) = inclusion_margin {
        target.inclusion_margin = margin;
    }
    let reconciler = Reconciler::new(
        LcdClient::new(&config.lcd_url)?,
        PlanRecorder::new(),
        &config.funding_denom,
    )
    .with_retry(config.retry());

    let report = reconciler.run(registry, config.network, &target).await?;
    let (_, recorder) = reconciler.into_parts();

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "report": report,
            "groups": recorder.into_groups(),
        }))?
    );
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ntt_deployer=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
