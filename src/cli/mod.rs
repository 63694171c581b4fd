pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "senbox")]
#[command(about = "Senbox CLI - database administration for the Senbox API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "API account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Component inspection")]
    Component {
        #[command(subcommand)]
        cmd: commands::component::ComponentCommands,
    },

    #[command(about = "Menu maintenance")]
    Menu {
        #[command(subcommand)]
        cmd: commands::menu::MenuCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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
    let config = AppConfig::from_env();
    let db = DatabaseManager::connect(&config.database).await?;

    let result = match cli.command {
        Commands::Migrate => commands::migrate::handle(&db, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, &db, output_format).await,
        Commands::Component { cmd } => commands::component::handle(cmd, &db, output_format).await,
        Commands::Menu { cmd } => commands::menu::handle(cmd, &db, output_format).await,
    };

    db.close().await;
    result
}
