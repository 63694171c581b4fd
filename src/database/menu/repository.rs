use std::collections::HashSet;

use sqlx::{PgConnection, PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::scope::{MenuScope, ScopeKey};
use crate::components::ComponentType;
use crate::database::manager::DatabaseError;
use crate::database::models::{MenuEntry, MenuEntryPatch, MenuItem, NewMenuEntry};
use crate::database::models::menu_entry::MenuItemRow;

/// Optional narrowing for `list_items`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuFilter {
    pub component_type: Option<ComponentType>,
    pub language: Option<String>,
    pub visible_only: bool,
}

/// Ordered, visibility-flagged component bindings for one owner scope.
/// Every scope shares this implementation; `MenuScope` supplies the table
/// and key columns.
#[derive(Clone)]
pub struct MenuRepository {
    scope: MenuScope,
    pool: PgPool,
}

impl MenuRepository {
    pub fn new(scope: MenuScope, pool: PgPool) -> Self {
        Self { scope, pool }
    }

    /// All entries for one owner, ascending by order
    pub async fn get_by_scope_key(&self, key: &ScopeKey) -> Result<Vec<MenuEntry>, DatabaseError> {
        self.fetch_entries(key, false).await
    }

    /// Visible entries for one owner, ascending by order
    pub async fn get_visible_by_scope_key(&self, key: &ScopeKey) -> Result<Vec<MenuEntry>, DatabaseError> {
        self.fetch_entries(key, true).await
    }

    async fn fetch_entries(&self, key: &ScopeKey, visible_only: bool) -> Result<Vec<MenuEntry>, DatabaseError> {
        self.scope.check_key(key)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {} m WHERE ",
            self.scope.entry_columns("m"),
            self.scope.table()
        ));
        key.push_predicate(&mut qb, "m");
        if visible_only {
            qb.push(" AND m.visible");
        }
        qb.push(" ORDER BY m.sort_order ASC, m.created_at ASC, m.id ASC");

        qb.build_query_as::<MenuEntry>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::storage("failed to get menu"))
    }

    /// Entries joined with their components, optionally filtered by component
    /// type or language
    pub async fn list_items(&self, key: &ScopeKey, filter: &MenuFilter) -> Result<Vec<MenuItem>, DatabaseError> {
        self.scope.check_key(key)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {}, c.name AS c_name, c.component_type AS c_component_type, c.key AS c_key, \
             c.value AS c_value, c.language AS c_language, c.created_at AS c_created_at, \
             c.updated_at AS c_updated_at \
             FROM {} m JOIN components c ON c.id = m.component_id WHERE ",
            self.scope.entry_columns("m"),
            self.scope.table()
        ));
        key.push_predicate(&mut qb, "m");
        if filter.visible_only {
            qb.push(" AND m.visible");
        }
        if let Some(component_type) = filter.component_type {
            qb.push(" AND c.component_type = ");
            qb.push_bind(component_type.as_str());
        }
        if let Some(language) = &filter.language {
            qb.push(" AND c.language = ");
            qb.push_bind(language.trim().to_ascii_lowercase());
        }
        qb.push(" ORDER BY m.sort_order ASC, m.created_at ASC, m.id ASC");

        let rows = qb
            .build_query_as::<MenuItemRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::storage("failed to get menu items"))?;

        rows.into_iter().map(MenuItem::try_from).collect()
    }

    /// One binding, or `NotFound` when the owner's menu does not hold the component
    pub async fn get_entry(&self, key: &ScopeKey, component_id: Uuid) -> Result<MenuEntry, DatabaseError> {
        self.scope.check_key(key)?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {} m WHERE ",
            self.scope.entry_columns("m"),
            self.scope.table()
        ));
        key.push_predicate(&mut qb, "m");
        qb.push(" AND m.component_id = ");
        qb.push_bind(component_id);

        qb.build_query_as::<MenuEntry>()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::storage("failed to get menu entry"))?
            .ok_or_else(|| self.missing(component_id))
    }

    pub async fn create(&self, entry: &NewMenuEntry) -> Result<MenuEntry, DatabaseError> {
        insert_entry(&self.pool, self.scope, entry).await
    }

    pub async fn create_with_tx(
        &self,
        conn: &mut PgConnection,
        entry: &NewMenuEntry,
    ) -> Result<MenuEntry, DatabaseError> {
        insert_entry(&mut *conn, self.scope, entry).await
    }

    /// Insert several entries in one transaction. Orders are stored as given.
    pub async fn bulk_create(&self, entries: &[NewMenuEntry]) -> Result<Vec<MenuEntry>, DatabaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(DatabaseError::storage("failed to start transaction"))?;
        let created = self.bulk_create_with_tx(&mut tx, entries).await?;
        tx.commit()
            .await
            .map_err(DatabaseError::storage("failed to create menu"))?;
        Ok(created)
    }

    pub async fn bulk_create_with_tx(
        &self,
        conn: &mut PgConnection,
        entries: &[NewMenuEntry],
    ) -> Result<Vec<MenuEntry>, DatabaseError> {
        let mut seen = HashSet::new();
        for entry in entries {
            if !seen.insert((entry.key, entry.component_id)) {
                return Err(DatabaseError::Conflict(format!(
                    "component {} appears twice in the same {} menu",
                    entry.component_id, self.scope
                )));
            }
        }

        let mut created = Vec::with_capacity(entries.len());
        for entry in entries {
            created.push(insert_entry(&mut *conn, self.scope, entry).await?);
        }
        Ok(created)
    }

    pub async fn update(&self, patch: &MenuEntryPatch) -> Result<MenuEntry, DatabaseError> {
        update_entry(&self.pool, self.scope, patch).await
    }

    /// Patch `order` and/or `visible` of one binding inside the caller's transaction
    pub async fn update_with_tx(
        &self,
        conn: &mut PgConnection,
        patch: &MenuEntryPatch,
    ) -> Result<MenuEntry, DatabaseError> {
        update_entry(&mut *conn, self.scope, patch).await
    }

    /// Show or hide a binding; its order is left alone
    pub async fn update_visibility(
        &self,
        key: &ScopeKey,
        component_id: Uuid,
        visible: bool,
    ) -> Result<MenuEntry, DatabaseError> {
        self.update(&MenuEntryPatch {
            key: *key,
            component_id,
            order: None,
            visible: Some(visible),
        })
        .await
    }

    pub async fn delete(&self, key: &ScopeKey, component_id: Uuid) -> Result<(), DatabaseError> {
        delete_entry(&self.pool, self.scope, key, component_id).await
    }

    pub async fn delete_with_tx(
        &self,
        conn: &mut PgConnection,
        key: &ScopeKey,
        component_id: Uuid,
    ) -> Result<(), DatabaseError> {
        delete_entry(&mut *conn, self.scope, key, component_id).await
    }

    /// Remove this scope's bindings of a component, for every owner
    pub async fn delete_by_component_id(&self, component_id: Uuid) -> Result<u64, DatabaseError> {
        delete_by_component(&self.pool, self.scope, component_id).await
    }

    pub async fn delete_by_component_id_with_tx(
        &self,
        conn: &mut PgConnection,
        component_id: Uuid,
    ) -> Result<u64, DatabaseError> {
        delete_by_component(&mut *conn, self.scope, component_id).await
    }

    /// Clear one owner's menu, returning the component ids it referenced
    pub async fn delete_by_scope_key(&self, key: &ScopeKey) -> Result<Vec<Uuid>, DatabaseError> {
        delete_by_key(&self.pool, self.scope, key).await
    }

    pub async fn delete_by_scope_key_with_tx(
        &self,
        conn: &mut PgConnection,
        key: &ScopeKey,
    ) -> Result<Vec<Uuid>, DatabaseError> {
        delete_by_key(&mut *conn, self.scope, key).await
    }

    /// Wipe every binding in this scope. Callers must obtain explicit confirmation.
    pub async fn delete_all(&self) -> Result<u64, DatabaseError> {
        delete_everything(&self.pool, self.scope).await
    }

    pub async fn delete_all_with_tx(&self, conn: &mut PgConnection) -> Result<u64, DatabaseError> {
        delete_everything(&mut *conn, self.scope).await
    }

    fn missing(&self, component_id: Uuid) -> DatabaseError {
        DatabaseError::NotFound(format!(
            "component {} is not in this {} menu",
            component_id, self.scope
        ))
    }
}

async fn insert_entry<'e, E>(executor: E, scope: MenuScope, entry: &NewMenuEntry) -> Result<MenuEntry, DatabaseError>
where
    E: PgExecutor<'e>,
{
    scope.check_key(&entry.key)?;

    let key_columns = scope.key_shape().columns();
    let mut qb = QueryBuilder::<Postgres>::new(format!("INSERT INTO {} AS m (id, ", scope.table()));
    for column in key_columns {
        qb.push(format!("{column}, "));
    }
    qb.push("component_id, sort_order, visible) SELECT ");
    {
        let mut values = qb.separated(", ");
        values.push_bind(Uuid::new_v4());
        for value in entry.key.values() {
            values.push_bind(value);
        }
        values.push_bind(entry.component_id);
        values.push_bind(entry.order);
        values.push_bind(entry.visible);
    }
    // No row is inserted when the component is missing
    qb.push(" WHERE EXISTS (SELECT 1 FROM components c WHERE c.id = ");
    qb.push_bind(entry.component_id);
    qb.push(format!(") RETURNING {}", scope.entry_columns("m")));

    qb.build_query_as::<MenuEntry>()
        .fetch_optional(executor)
        .await
        .map_err(DatabaseError::storage("failed to create menu entry"))?
        .ok_or_else(|| DatabaseError::NotFound(format!("component {} not found", entry.component_id)))
}

async fn update_entry<'e, E>(executor: E, scope: MenuScope, patch: &MenuEntryPatch) -> Result<MenuEntry, DatabaseError>
where
    E: PgExecutor<'e>,
{
    scope.check_key(&patch.key)?;

    let mut qb = QueryBuilder::<Postgres>::new(format!("UPDATE {} AS m SET updated_at = now()", scope.table()));
    if let Some(order) = patch.order {
        qb.push(", sort_order = ");
        qb.push_bind(order);
    }
    if let Some(visible) = patch.visible {
        qb.push(", visible = ");
        qb.push_bind(visible);
    }
    qb.push(" WHERE ");
    patch.key.push_predicate(&mut qb, "m");
    qb.push(" AND m.component_id = ");
    qb.push_bind(patch.component_id);
    qb.push(format!(" RETURNING {}", scope.entry_columns("m")));

    qb.build_query_as::<MenuEntry>()
        .fetch_optional(executor)
        .await
        .map_err(DatabaseError::storage("failed to update menu entry"))?
        .ok_or_else(|| {
            DatabaseError::NotFound(format!(
                "component {} is not in this {} menu",
                patch.component_id, scope
            ))
        })
}

async fn delete_entry<'e, E>(
    executor: E,
    scope: MenuScope,
    key: &ScopeKey,
    component_id: Uuid,
) -> Result<(), DatabaseError>
where
    E: PgExecutor<'e>,
{
    scope.check_key(key)?;

    let mut qb = QueryBuilder::<Postgres>::new(format!("DELETE FROM {} AS m WHERE ", scope.table()));
    key.push_predicate(&mut qb, "m");
    qb.push(" AND m.component_id = ");
    qb.push_bind(component_id);

    let result = qb
        .build()
        .execute(executor)
        .await
        .map_err(DatabaseError::storage("failed to delete menu entry"))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!(
            "component {} is not in this {} menu",
            component_id, scope
        )));
    }
    Ok(())
}

async fn delete_by_component<'e, E>(executor: E, scope: MenuScope, component_id: Uuid) -> Result<u64, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(&format!("DELETE FROM {} WHERE component_id = $1", scope.table()))
        .bind(component_id)
        .execute(executor)
        .await
        .map_err(DatabaseError::storage("failed to delete menu by component ID"))?;

    tracing::debug!(
        "Removed {} {} menu bindings of component {}",
        result.rows_affected(),
        scope,
        component_id
    );
    Ok(result.rows_affected())
}

async fn delete_by_key<'e, E>(executor: E, scope: MenuScope, key: &ScopeKey) -> Result<Vec<Uuid>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    scope.check_key(key)?;

    let mut qb = QueryBuilder::<Postgres>::new(format!("DELETE FROM {} AS m WHERE ", scope.table()));
    key.push_predicate(&mut qb, "m");
    qb.push(" RETURNING m.component_id");

    qb.build_query_scalar::<Uuid>()
        .fetch_all(executor)
        .await
        .map_err(DatabaseError::storage("failed to clear menu"))
}

async fn delete_everything<'e, E>(executor: E, scope: MenuScope) -> Result<u64, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(&format!("DELETE FROM {}", scope.table()))
        .execute(executor)
        .await
        .map_err(DatabaseError::storage("failed to delete all menu entries"))?;

    tracing::warn!("Deleted all {} {} menu entries", result.rows_affected(), scope);
    Ok(result.rows_affected())
}
