use alert_digest::{
    cmd::{RenderArgs, render},
    config::AppConfig,
    supervisor::Supervisor,
};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding `app.yaml`.
    #[arg(long, global = true, env = "ALERT_DIGEST_CONFIG_DIR")]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reads alerts as JSON lines from stdin and delivers batched digests.
    Run,
    /// Prints the digest a file of alerts would produce, without sending it.
    Render(RenderArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    tracing::debug!(config_dir = ?cli.config_dir, "Loading application configuration...");
    let config = AppConfig::new(cli.config_dir.as_deref())?;
    tracing::debug!(
        batch_window = ?config.batch_window,
        delivery = ?config.delivery,
        server_enabled = config.server.enabled,
        "Configuration loaded."
    );

    match cli.command {
        Commands::Run => run_supervisor(config).await?,
        Commands::Render(args) => render::execute(args, &config)?,
    }

    Ok(())
}

async fn run_supervisor(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let supervisor = Supervisor::builder().config(config).build()?;

    tracing::info!("Supervisor initialized, reading alerts from stdin...");

    supervisor.run(BufReader::new(tokio::io::stdin())).await?;

    Ok(())
}
