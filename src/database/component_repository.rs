use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::components::{
    build_component, rebuild_component, ComponentType, CreateMenuComponentRequest, NewComponent,
    UpdateComponentRequest,
};
use crate::database::manager::DatabaseError;
use crate::database::menu::MenuScope;
use crate::database::models::component::{Component, ComponentRow};

const COMPONENT_COLUMNS: &str = "id, name, component_type, key, value, language, created_at, updated_at";

/// Filters and paging for `list_components`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentQuery {
    pub component_type: Option<ComponentType>,
    pub key: Option<String>,
    pub language: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Clone)]
pub struct ComponentRepository {
    pool: PgPool,
}

impl ComponentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Component, DatabaseError> {
        let row = sqlx::query_as::<_, ComponentRow>(&format!(
            "SELECT {COMPONENT_COLUMNS} FROM components WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::storage("failed to get component"))?;

        row.ok_or_else(|| DatabaseError::NotFound(format!("component {} not found", id)))?
            .try_into()
    }

    /// Distinct non-empty keys, sorted
    pub async fn get_all_component_keys(&self) -> Result<Vec<String>, DatabaseError> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT key FROM components WHERE key <> '' ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::storage("failed to get component keys"))
    }

    pub async fn list_components(&self, query: &ComponentQuery) -> Result<Vec<Component>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COMPONENT_COLUMNS} FROM components WHERE TRUE"
        ));
        if let Some(component_type) = query.component_type {
            qb.push(" AND component_type = ");
            qb.push_bind(component_type.as_str());
        }
        if let Some(key) = &query.key {
            qb.push(" AND key = ");
            qb.push_bind(key.trim().to_string());
        }
        if let Some(language) = &query.language {
            qb.push(" AND language = ");
            qb.push_bind(language.trim().to_ascii_lowercase());
        }
        qb.push(" ORDER BY created_at ASC, id ASC LIMIT ");
        qb.push_bind(query.limit);
        qb.push(" OFFSET ");
        qb.push_bind(query.offset.max(0));

        let rows = qb
            .build_query_as::<ComponentRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::storage("failed to list components"))?;

        rows.into_iter().map(Component::try_from).collect()
    }

    /// Build through the factory and insert. Nothing is written if the
    /// request does not normalize.
    pub async fn create_component(&self, request: &CreateMenuComponentRequest) -> Result<Component, DatabaseError> {
        let component = build_component(request)?;
        insert_component(&self.pool, &component, None).await
    }

    pub async fn create_component_with_tx(
        &self,
        conn: &mut PgConnection,
        request: &CreateMenuComponentRequest,
    ) -> Result<Component, DatabaseError> {
        let component = build_component(request)?;
        insert_component(&mut *conn, &component, None).await
    }

    /// All requests are validated before the first insert; the inserts share one transaction.
    pub async fn create_components(
        &self,
        requests: &[CreateMenuComponentRequest],
    ) -> Result<Vec<Component>, DatabaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(DatabaseError::storage("failed to start transaction"))?;
        let created = self.create_components_with_tx(&mut tx, requests).await?;
        tx.commit()
            .await
            .map_err(DatabaseError::storage("failed to create components"))?;
        Ok(created)
    }

    pub async fn create_components_with_tx(
        &self,
        conn: &mut PgConnection,
        requests: &[CreateMenuComponentRequest],
    ) -> Result<Vec<Component>, DatabaseError> {
        let components = requests
            .iter()
            .map(build_component)
            .collect::<Result<Vec<_>, _>>()?;

        let mut created = Vec::with_capacity(components.len());
        for component in &components {
            created.push(insert_component(&mut *conn, component, None).await?);
        }
        Ok(created)
    }

    /// Replace a component by deleting its row and recreating it under the
    /// same id. Both steps run in one transaction so menu entries never see
    /// the component missing.
    pub async fn update_component(&self, request: &UpdateComponentRequest) -> Result<Component, DatabaseError> {
        let replacement = rebuild_component(request)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(DatabaseError::storage("failed to start transaction"))?;
        let updated = replace_component(&mut tx, &replacement).await?;
        tx.commit()
            .await
            .map_err(DatabaseError::storage("failed to update component"))?;
        Ok(updated)
    }

    /// Same as `update_component` inside the caller's transaction. On error the
    /// caller must roll back (dropping the transaction does so).
    pub async fn update_component_with_tx(
        &self,
        conn: &mut PgConnection,
        request: &UpdateComponentRequest,
    ) -> Result<Component, DatabaseError> {
        let replacement = rebuild_component(request)?;
        replace_component(conn, &replacement).await
    }

    /// Hard delete. Fails with `Conflict` while any menu still binds the component.
    pub async fn delete_component(&self, id: Uuid) -> Result<(), DatabaseError> {
        delete_component_row(&self.pool, id).await
    }

    pub async fn delete_component_with_tx(&self, conn: &mut PgConnection, id: Uuid) -> Result<(), DatabaseError> {
        delete_component_row(&mut *conn, id).await
    }

    /// Delete those of `ids` that no menu in any scope references any more
    pub async fn delete_unreferenced_with_tx(
        &self,
        conn: &mut PgConnection,
        ids: &[Uuid],
    ) -> Result<u64, DatabaseError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM components c WHERE c.id = ANY(");
        qb.push_bind(ids.to_vec());
        qb.push(")");
        for scope in MenuScope::ALL {
            qb.push(format!(
                " AND NOT EXISTS (SELECT 1 FROM {} m WHERE m.component_id = c.id)",
                scope.table()
            ));
        }

        let result = qb
            .build()
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::storage("failed to delete components"))?;
        Ok(result.rows_affected())
    }
}

async fn insert_component<'e, E>(
    executor: E,
    component: &NewComponent,
    created_at: Option<DateTime<Utc>>,
) -> Result<Component, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, ComponentRow>(&format!(
        "INSERT INTO components (id, name, component_type, key, value, language, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, now()), now()) \
         RETURNING {COMPONENT_COLUMNS}"
    ))
    .bind(component.id)
    .bind(&component.name)
    .bind(component.component_type.as_str())
    .bind(&component.key)
    .bind(&component.value)
    .bind(&component.language)
    .bind(created_at)
    .fetch_one(executor)
    .await
    .map_err(DatabaseError::storage("failed to create component"))?;

    row.try_into()
}

async fn replace_component(conn: &mut PgConnection, replacement: &NewComponent) -> Result<Component, DatabaseError> {
    let created_at: Option<DateTime<Utc>> =
        sqlx::query_scalar("DELETE FROM components WHERE id = $1 RETURNING created_at")
            .bind(replacement.id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(DatabaseError::storage("failed to update component"))?;

    let Some(created_at) = created_at else {
        return Err(DatabaseError::NotFound(format!(
            "component {} not found",
            replacement.id
        )));
    };

    insert_component(&mut *conn, replacement, Some(created_at)).await
}

async fn delete_component_row<'e, E>(executor: E, id: Uuid) -> Result<(), DatabaseError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM components WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await
        .map_err(DatabaseError::storage("failed to delete component"))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("component {} not found", id)));
    }
    Ok(())
}
