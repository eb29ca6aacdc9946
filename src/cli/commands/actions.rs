use clap::Subcommand;

use crate::cli::utils::CliContext;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ActionCommands {
    #[command(about = "List reset actions from the audit ledger")]
    List {
        #[arg(long, help = "Filter: tenant_reset | system_reset")]
        r#type: Option<String>,
        #[arg(long, help = "Filter: pending | completed | failed")]
        status: Option<String>,
        #[arg(long, help = "Maximum rows (clamped server-side)")]
        limit: Option<i64>,
        #[arg(long)]
        offset: Option<i64>,
    },

    #[command(about = "Show one reset action with its cleanup jobs")]
    Show {
        #[arg(help = "Reset action id")]
        id: String,
    },

    #[command(about = "Delete one audit record (never the data effects)")]
    Delete {
        #[arg(help = "Reset action id")]
        id: String,
    },
}

pub async fn handle(
    cmd: ActionCommands,
    ctx: &CliContext,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let body = match cmd {
        ActionCommands::List { r#type, status, limit, offset } => {
            let mut params = Vec::new();
            if let Some(t) = r#type {
                params.push(format!("type={}", t));
            }
            if let Some(s) = status {
                params.push(format!("status={}", s));
            }
            if let Some(l) = limit {
                params.push(format!("limit={}", l));
            }
            if let Some(o) = offset {
                params.push(format!("offset={}", o));
            }
            let query = if params.is_empty() {
                String::new()
            } else {
                format!("?{}", params.join("&"))
            };
            ctx.get(&format!("/api/root/reset/actions{}", query)).await?
        }
        ActionCommands::Show { id } => ctx.get(&format!("/api/root/reset/actions/{}", id)).await?,
        ActionCommands::Delete { id } => {
            ctx.delete(&format!("/api/root/reset/actions/{}", id)).await?
        }
    };

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&body)?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(&body)?),
    }
    Ok(())
}
