use anyhow::bail;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::{DatabaseManager, MenuScope};
use crate::services::MenuService;

#[derive(Subcommand)]
pub enum MenuCommands {
    #[command(about = "Delete every binding in one scope, for all owners")]
    Reset {
        #[arg(long, help = "Menu scope, e.g. device or org_student")]
        scope: String,

        #[arg(long, help = "Required: confirm the unscoped delete")]
        confirm: bool,
    },
}

pub async fn handle(cmd: MenuCommands, db: &DatabaseManager, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        MenuCommands::Reset { scope, confirm } => {
            let scope: MenuScope = scope.parse()?;
            if !confirm {
                bail!("refusing to delete all {} menu entries without --confirm", scope);
            }

            let removed = MenuService::new(db.clone()).reset_scope(scope).await?;
            output_success(
                &output_format,
                &format!("Deleted {} {} menu entries", removed, scope),
                Some(json!({ "scope": scope, "removed": removed })),
            )
        }
    }
}
