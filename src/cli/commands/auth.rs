use anyhow::Context;
use clap::Subcommand;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims, ACCESS_ROOT};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Mint an operator token signed with the local JWT secret")]
    Mint {
        #[arg(help = "Operator name to embed in the token")]
        operator: String,

        #[arg(long, default_value = ACCESS_ROOT, help = "Access level: read | edit | full | root")]
        access: String,

        #[arg(long, help = "Operator id (random if omitted)")]
        operator_id: Option<Uuid>,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Mint { operator, access, operator_id } => {
            let operator_id = operator_id.unwrap_or_else(Uuid::new_v4);
            let claims = Claims::new(operator.clone(), access.clone(), operator_id);
            let token = generate_jwt(claims).context("failed to sign token")?;

            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({
                        "operator": operator,
                        "access": access,
                        "operator_id": operator_id,
                        "token": token,
                    })
                ),
                OutputFormat::Text => println!("{}", token),
            }
            Ok(())
        }
    }
}
