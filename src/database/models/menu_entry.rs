use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use super::component::{Component, ComponentRow};
use crate::database::manager::DatabaseError;
use crate::database::menu::ScopeKey;

/// One component bound into one owner's menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MenuEntry {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
    pub component_id: Uuid,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMenuEntry {
    pub key: ScopeKey,
    pub component_id: Uuid,
    pub order: i32,
    pub visible: bool,
}

impl NewMenuEntry {
    pub fn new(key: ScopeKey, component_id: Uuid, order: i32) -> Self {
        Self {
            key,
            component_id,
            order,
            visible: true,
        }
    }
}

/// Partial update of a binding. Only `order` and `visible` are patchable;
/// `None` leaves the column untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntryPatch {
    pub key: ScopeKey,
    pub component_id: Uuid,
    pub order: Option<i32>,
    pub visible: Option<bool>,
}

/// A menu entry together with the component it points at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(flatten)]
    pub entry: MenuEntry,
    pub component: Component,
}

#[derive(Debug, FromRow)]
pub(crate) struct MenuItemRow {
    #[sqlx(flatten)]
    pub entry: MenuEntry,
    pub c_name: String,
    pub c_component_type: String,
    pub c_key: String,
    pub c_value: Value,
    pub c_language: Option<String>,
    pub c_created_at: DateTime<Utc>,
    pub c_updated_at: DateTime<Utc>,
}

impl TryFrom<MenuItemRow> for MenuItem {
    type Error = DatabaseError;

    fn try_from(row: MenuItemRow) -> Result<Self, Self::Error> {
        let component = Component::try_from(ComponentRow {
            id: row.entry.component_id,
            name: row.c_name,
            component_type: row.c_component_type,
            key: row.c_key,
            value: row.c_value,
            language: row.c_language,
            created_at: row.c_created_at,
            updated_at: row.c_updated_at,
        })?;
        Ok(MenuItem {
            entry: row.entry,
            component,
        })
    }
}
