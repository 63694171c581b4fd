use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// Which owner columns a scope's menu table carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape {
    /// One menu for the whole platform
    Global,
    /// `owner_id`
    Owner,
    /// `organization_id` + `owner_id`
    OwnerInOrganization,
}

impl KeyShape {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            KeyShape::Global => &[],
            KeyShape::Owner => &["owner_id"],
            KeyShape::OwnerInOrganization => &["organization_id", "owner_id"],
        }
    }
}

/// The owner a menu belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuScope {
    SuperAdmin,
    Organization,
    OrgDepartment,
    OrgStudent,
    OrgTeacher,
    OrgDevice,
    User,
    Device,
    Parent,
    Staff,
    Student,
    Teacher,
}

impl MenuScope {
    pub const ALL: [MenuScope; 12] = [
        MenuScope::SuperAdmin,
        MenuScope::Organization,
        MenuScope::OrgDepartment,
        MenuScope::OrgStudent,
        MenuScope::OrgTeacher,
        MenuScope::OrgDevice,
        MenuScope::User,
        MenuScope::Device,
        MenuScope::Parent,
        MenuScope::Staff,
        MenuScope::Student,
        MenuScope::Teacher,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MenuScope::SuperAdmin => "super_admin",
            MenuScope::Organization => "organization",
            MenuScope::OrgDepartment => "org_department",
            MenuScope::OrgStudent => "org_student",
            MenuScope::OrgTeacher => "org_teacher",
            MenuScope::OrgDevice => "org_device",
            MenuScope::User => "user",
            MenuScope::Device => "device",
            MenuScope::Parent => "parent",
            MenuScope::Staff => "staff",
            MenuScope::Student => "student",
            MenuScope::Teacher => "teacher",
        }
    }

    /// Table holding this scope's bindings. Never derived from user input.
    pub fn table(&self) -> &'static str {
        match self {
            MenuScope::SuperAdmin => "super_admin_menus",
            MenuScope::Organization => "organization_menus",
            MenuScope::OrgDepartment => "org_department_menus",
            MenuScope::OrgStudent => "org_student_menus",
            MenuScope::OrgTeacher => "org_teacher_menus",
            MenuScope::OrgDevice => "org_device_menus",
            MenuScope::User => "user_menus",
            MenuScope::Device => "device_menus",
            MenuScope::Parent => "parent_menus",
            MenuScope::Staff => "staff_menus",
            MenuScope::Student => "student_menus",
            MenuScope::Teacher => "teacher_menus",
        }
    }

    pub fn key_shape(&self) -> KeyShape {
        match self {
            MenuScope::SuperAdmin => KeyShape::Global,
            MenuScope::OrgDepartment
            | MenuScope::OrgStudent
            | MenuScope::OrgTeacher
            | MenuScope::OrgDevice => KeyShape::OwnerInOrganization,
            MenuScope::Organization
            | MenuScope::User
            | MenuScope::Device
            | MenuScope::Parent
            | MenuScope::Staff
            | MenuScope::Student
            | MenuScope::Teacher => KeyShape::Owner,
        }
    }

    /// Assemble a key from optional request parts, rejecting missing or extra ids
    pub fn scope_key(
        &self,
        organization_id: Option<Uuid>,
        owner_id: Option<Uuid>,
    ) -> Result<ScopeKey, DatabaseError> {
        match (self.key_shape(), organization_id, owner_id) {
            (KeyShape::Global, None, None) => Ok(ScopeKey::Global),
            (KeyShape::Owner, None, Some(owner_id)) => Ok(ScopeKey::Owner(owner_id)),
            (KeyShape::OwnerInOrganization, Some(organization_id), Some(owner_id)) => {
                Ok(ScopeKey::OwnerInOrganization {
                    organization_id,
                    owner_id,
                })
            }
            (shape, _, _) => Err(DatabaseError::InvalidScopeKey(format!(
                "{} menus are keyed by [{}]",
                self,
                shape.columns().join(", ")
            ))),
        }
    }

    pub fn check_key(&self, key: &ScopeKey) -> Result<(), DatabaseError> {
        if key.shape() == self.key_shape() {
            Ok(())
        } else {
            Err(DatabaseError::InvalidScopeKey(format!(
                "{} menus are keyed by [{}]",
                self,
                self.key_shape().columns().join(", ")
            )))
        }
    }

    /// Entry columns selected under `alias`, padding absent key columns with NULL
    /// so every scope decodes into the same `MenuEntry` row.
    pub(crate) fn entry_columns(&self, alias: &str) -> String {
        let shape = self.key_shape();
        let key_column = |name: &str| {
            if shape.columns().contains(&name) {
                format!("{alias}.{name}")
            } else {
                format!("NULL::uuid AS {name}")
            }
        };

        format!(
            "{alias}.id, {}, {}, {alias}.component_id, {alias}.sort_order, {alias}.visible, {alias}.created_at, {alias}.updated_at",
            key_column("organization_id"),
            key_column("owner_id"),
        )
    }
}

impl FromStr for MenuScope {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().replace('-', "_");
        MenuScope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == name)
            .ok_or_else(|| DatabaseError::UnknownScope(s.to_string()))
    }
}

impl fmt::Display for MenuScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one owner's menu within a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKey {
    Global,
    Owner(Uuid),
    OwnerInOrganization { organization_id: Uuid, owner_id: Uuid },
}

impl ScopeKey {
    pub fn shape(&self) -> KeyShape {
        match self {
            ScopeKey::Global => KeyShape::Global,
            ScopeKey::Owner(_) => KeyShape::Owner,
            ScopeKey::OwnerInOrganization { .. } => KeyShape::OwnerInOrganization,
        }
    }

    pub fn organization_id(&self) -> Option<Uuid> {
        match self {
            ScopeKey::OwnerInOrganization { organization_id, .. } => Some(*organization_id),
            _ => None,
        }
    }

    pub fn owner_id(&self) -> Option<Uuid> {
        match self {
            ScopeKey::Global => None,
            ScopeKey::Owner(owner_id) => Some(*owner_id),
            ScopeKey::OwnerInOrganization { owner_id, .. } => Some(*owner_id),
        }
    }

    /// Key values in `KeyShape::columns` order
    pub fn values(&self) -> Vec<Uuid> {
        self.organization_id().into_iter().chain(self.owner_id()).collect()
    }

    /// Append `alias.col = $n AND ...` for every key column, or `TRUE` for a global key
    pub(crate) fn push_predicate(&self, qb: &mut QueryBuilder<'_, Postgres>, alias: &str) {
        let columns = self.shape().columns();
        if columns.is_empty() {
            qb.push("TRUE");
            return;
        }
        for (i, (column, value)) in columns.iter().zip(self.values()).enumerate() {
            if i > 0 {
                qb.push(" AND ");
            }
            qb.push(format!("{alias}.{column} = "));
            qb.push_bind(value);
        }
    }
}
