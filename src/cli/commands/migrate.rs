use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

pub async fn handle(db: &DatabaseManager, output_format: OutputFormat) -> anyhow::Result<()> {
    db.migrate().await?;
    output_success(&output_format, "Database migrations applied", None)
}
