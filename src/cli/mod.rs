pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "opsctl")]
#[command(about = "opsctl - operator CLI for the Retail Ops API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "OPSCTL_SERVER",
        default_value = "http://localhost:3000",
        help = "Base URL of the API server"
    )]
    pub server: String,

    #[arg(long, global = true, env = "OPSCTL_TOKEN", help = "Bearer token for restricted endpoints")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Reset action ledger inspection")]
    Actions {
        #[command(subcommand)]
        cmd: commands::actions::ActionCommands,
    },

    #[command(about = "Tenant registry management")]
    Tenant {
        #[command(subcommand)]
        cmd: commands::tenant::TenantCommands,
    },

    #[command(about = "Operator token management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Print the effective configuration")]
    Config,
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
    let ctx = utils::CliContext::new(cli.server.clone(), cli.token.clone());

    match cli.command {
        Commands::Actions { cmd } => commands::actions::handle(cmd, &ctx, output_format).await,
        Commands::Tenant { cmd } => commands::tenant::handle(cmd, &ctx, output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(crate::config::config())?);
            Ok(())
        }
    }
}
