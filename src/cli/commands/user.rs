use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{hash_password, Role};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::{DatabaseManager, NewUser, UserRepository};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create an API account")]
    Create {
        #[arg(help = "Login name")]
        username: String,

        #[arg(long, env = "SENBOX_USER_PASSWORD", help = "Password (or set SENBOX_USER_PASSWORD)")]
        password: String,

        #[arg(long, default_value = "admin", help = "super_admin, admin, user or device")]
        role: String,

        #[arg(long, help = "Organization the account belongs to")]
        organization_id: Option<Uuid>,
    },
}

pub async fn handle(cmd: UserCommands, db: &DatabaseManager, output_format: OutputFormat) -> anyhow::Result<()> {
    let users = UserRepository::new(db.pool().clone());

    match cmd {
        UserCommands::Create {
            username,
            password,
            role,
            organization_id,
        } => {
            let role: Role = role.parse()?;
            let user = users
                .create_user(&NewUser {
                    username: username.trim().to_string(),
                    password_hash: hash_password(&password)?,
                    role: role.as_str().to_string(),
                    organization_id,
                })
                .await?;

            output_success(
                &output_format,
                &format!("Created {} account '{}'", role, user.username),
                Some(json!({ "id": user.id, "username": user.username, "role": role })),
            )
        }
    }
}
