// Servica - session command-line client

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

use servica_session::SessionConfig;

#[derive(Parser, Debug)]
#[command(name = "servica", about = "Servica marketplace session client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SERVICA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show whether the stored session is valid
    Status,
    /// Evaluate the route guard for a URL
    Guard { url: String },
    /// Authenticated GET against the API
    Get { path: String },
    /// Forget the stored session
    Logout,
}

fn print<T: Serialize>(report: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .pretty()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = SessionConfig::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    let config = servica_app::cli_config(config);

    info!(api = %config.api_base_url, "Configuration loaded successfully");

    let app = servica_app::build_app(config).map_err(|e| {
        error!("Failed to open session store: {}", e);
        e
    })?;

    match cli.command {
        Command::Login { email, password } => {
            let report = servica_app::login(&app, &email, &password).await;
            print(&report)?;
            if !report.authenticated {
                anyhow::bail!("Login failed");
            }
        }
        Command::Status => print(&servica_app::status(&app))?,
        Command::Guard { url } => print(&servica_app::guard(&app, &url))?,
        Command::Get { path } => {
            let body = servica_app::get(&app, &path).await.map_err(|e| {
                error!("Request failed: {}", e);
                anyhow::anyhow!("GET {} failed: {}", path, e)
            })?;
            print(&body)?;
        }
        Command::Logout => {
            servica_app::logout(&app);
            info!("Session cleared");
        }
    }

    Ok(())
}
