use clap::Subcommand;

use crate::cli::utils::output_list;
use crate::cli::OutputFormat;
use crate::database::{ComponentRepository, DatabaseManager};

#[derive(Subcommand)]
pub enum ComponentCommands {
    #[command(about = "List distinct component keys")]
    Keys,
}

pub async fn handle(cmd: ComponentCommands, db: &DatabaseManager, output_format: OutputFormat) -> anyhow::Result<()> {
    let components = ComponentRepository::new(db.pool().clone());

    match cmd {
        ComponentCommands::Keys => {
            let keys = components.get_all_component_keys().await?;
            output_list(&output_format, "keys", &keys, "No component keys")
        }
    }
}
