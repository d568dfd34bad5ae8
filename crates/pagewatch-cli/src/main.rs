mod render;
mod visit;

use clap::{Parser, Subcommand};
use pagewatch_core::CredentialPolicy;
use pagewatch_geo::GeoLookupClient;
use pagewatch_notify::{NotificationService, TelegramClient};
use tracing_subscriber::EnvFilter;

use crate::visit::VisitArgs;

#[derive(Debug, Parser)]
#[command(name = "pagewatch-cli")]
#[command(about = "pagewatch visitor-side client and operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve this machine's public IP and location and print it as JSON.
    Resolve,
    /// Play a full visit: resolve identity, post it to the server, show the screens.
    Visit(VisitArgs),
    /// Send the fixed test message straight to the configured chat.
    TestDispatch,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Before parsing, so `.env` can supply clap's env-backed flags.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = pagewatch_core::load_app_config_with(credential_policy(&cli.command))?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // Frames go to stdout; keep logs out of their way.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Resolve => {
            let geo = GeoLookupClient::new(config.geo_timeout_secs, &config.user_agent)?;
            let info = geo.resolve().await;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Visit(args) => visit::run(&config, args).await?,
        Commands::TestDispatch => {
            let service = NotificationService::new(TelegramClient::from_config(&config)?);
            let receipt = service.send_test_message().await?;
            tracing::info!(message_id = ?receipt.message_id, "test message delivered");
            println!("Test message sent to Telegram successfully!");
        }
    }

    Ok(())
}

/// Only `test-dispatch` talks to Telegram; the visitor-side commands run
/// without operator credentials.
fn credential_policy(command: &Commands) -> CredentialPolicy {
    match command {
        Commands::TestDispatch => CredentialPolicy::RequiredOutsideDevelopment,
        Commands::Resolve | Commands::Visit(_) => CredentialPolicy::Optional,
    }
}
