use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rtbhouse_sdk::api_tokens::storage::AsyncJsonFileTokenStorage;
use rtbhouse_sdk::api_tokens::{AsyncApiTokenManager, EnvConfigure};
use rtbhouse_sdk::config::load_config;
use rtbhouse_sdk::utils::logging::{self, LogLevel};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Manage the RTB House API token", long_about = None)]
struct Args {
    #[arg(short, long, env = "RTBH_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "LOG_LEVEL", value_enum, ignore_case = true)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store a token after validating it with the issuer
    Configure {
        /// Token to store; read from the configured environment variable when omitted
        #[arg(long)]
        token: Option<String>,
        /// Replace an already stored token
        #[arg(long)]
        overwrite: bool,
    },
    /// Show expiry and lifecycle state of the stored token
    Status,
    /// Print a usable token, rotating it first when due
    Token,
    /// Heartbeat the stored token and rotate it when allowed
    KeepAlive,
    /// Remove the stored token
    Delete,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init_logging(&logging::resolve(&config, args.log_level))?;

    let storage = AsyncJsonFileTokenStorage::new(&config.tokens.storage_path);
    let manager = AsyncApiTokenManager::from_config(storage, &config)
        .context("failed to build API token client")?;

    match args.command {
        Command::Configure { token: Some(token), .. } => {
            manager.configure(&token).await?;
            info!(path = %config.tokens.storage_path.display(), "token stored");
        }
        Command::Configure { token: None, overwrite } => {
            let env_var = &config.tokens.env_var;
            match manager.configure_from_env(env_var, overwrite).await? {
                EnvConfigure::Configured => info!(env_var = %env_var, "token stored"),
                EnvConfigure::AlreadyConfigured => {
                    info!("token already configured, pass --overwrite to replace it")
                }
                EnvConfigure::NotSet => anyhow::bail!("environment variable '{}' is not set", env_var),
            }
        }
        Command::Status => {
            let snapshot = manager.snapshot().await?;
            println!(
                "expires_at: {}\nstate: {}",
                snapshot.expires_at.to_rfc3339(),
                snapshot.state.as_str()
            );
        }
        Command::Token => println!("{}", manager.get_token().await?),
        Command::KeepAlive => {
            manager.keep_alive().await?;
            info!("token kept alive");
        }
        Command::Delete => {
            manager.delete_token().await?;
        }
    }
    Ok(())
}
