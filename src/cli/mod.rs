pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "console-gateway")]
#[command(about = "Admin console gateway - cookie sessions in front of the backend API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the gateway (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,
        #[arg(long, help = "Backend API base URL (overrides API_URL)")]
        api_url: Option<String>,
    },

    #[command(about = "Print the effective configuration")]
    Config,

    #[command(about = "Sign in through a running gateway, show the user, sign out")]
    Session {
        #[arg(long, default_value = "http://localhost:3000", help = "Gateway base URL")]
        url: String,
        #[arg(long, help = "Account email")]
        email: String,
        #[arg(long, env = "CONSOLE_PASSWORD", hide_env_values = true, help = "Account password")]
        password: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command.unwrap_or(Commands::Serve { port: None, api_url: None }) {
        Commands::Serve { port, api_url } => commands::serve::handle(port, api_url).await,
        Commands::Config => commands::config::handle(output_format),
        Commands::Session { url, email, password } => {
            commands::session::handle(&url, &email, &password, output_format).await
        }
    }
}
