use clap::Subcommand;

use crate::cli::utils::CliContext;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "List registered tenants")]
    List,

    #[command(about = "Show one tenant")]
    Show {
        #[arg(help = "Tenant id")]
        id: String,
    },
}

pub async fn handle(
    cmd: TenantCommands,
    ctx: &CliContext,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let body = match cmd {
        TenantCommands::List => ctx.get("/api/root/tenant").await?,
        TenantCommands::Show { id } => ctx.get(&format!("/api/root/tenant/{}", id)).await?,
    };

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&body)?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(&body)?),
    }
    Ok(())
}
