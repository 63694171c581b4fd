use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::components::ComponentType;
use crate::database::manager::DatabaseError;

/// A stored component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub key: String,
    pub value: Value,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub(crate) struct ComponentRow {
    pub id: Uuid,
    pub name: String,
    pub component_type: String,
    pub key: String,
    pub value: Value,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ComponentRow> for Component {
    type Error = DatabaseError;

    fn try_from(row: ComponentRow) -> Result<Self, Self::Error> {
        let component_type = row.component_type.parse().map_err(|_| {
            tracing::error!("Component {} has unregistered type '{}'", row.id, row.component_type);
            DatabaseError::CorruptRow(format!("component {} has an unregistered type", row.id))
        })?;

        Ok(Component {
            id: row.id,
            name: row.name,
            component_type,
            key: row.key,
            value: row.value,
            language: row.language,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
