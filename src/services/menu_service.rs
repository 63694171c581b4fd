use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::components::{CreateMenuComponentRequest, UpdateComponentRequest};
use crate::database::models::{MenuEntry, MenuEntryPatch, MenuItem, NewMenuEntry};
use crate::database::{
    ComponentRepository, DatabaseError, DatabaseManager, MenuFilter, MenuRepository, MenuScope, ScopeKey,
};

/// Existing component to bind, with its position in the menu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuComponentRef {
    pub id: Uuid,
    pub order: i32,
    #[serde(default)]
    pub visible: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMenuRequest {
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    pub components: Vec<MenuComponentRef>,
}

/// Create a component and bind it in one step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMenuItemRequest {
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    pub order: i32,
    #[serde(default)]
    pub visible: Option<bool>,
    pub component: CreateMenuComponentRequest,
}

/// Patch a binding and optionally replace the bound component's content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMenuItemRequest {
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub component: Option<CreateMenuComponentRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub component_id: Uuid,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityRequest {
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    pub visible: bool,
}

/// Outcome of clearing an owner's menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearedMenu {
    pub removed: Vec<Uuid>,
    pub purged_components: u64,
}

/// Multi-step menu operations. Each public method is one transaction.
#[derive(Clone)]
pub struct MenuService {
    db: DatabaseManager,
    components: ComponentRepository,
}

impl MenuService {
    pub fn new(db: DatabaseManager) -> Self {
        let components = ComponentRepository::new(db.pool().clone());
        Self { db, components }
    }

    pub fn menu(&self, scope: MenuScope) -> MenuRepository {
        MenuRepository::new(scope, self.db.pool().clone())
    }

    pub fn components(&self) -> &ComponentRepository {
        &self.components
    }

    pub async fn list_menu(
        &self,
        scope: MenuScope,
        key: &ScopeKey,
        filter: &MenuFilter,
    ) -> Result<Vec<MenuItem>, DatabaseError> {
        self.menu(scope).list_items(key, filter).await
    }

    /// Bind existing components to one owner's menu, all or nothing
    pub async fn bind_components(
        &self,
        scope: MenuScope,
        request: &CreateMenuRequest,
    ) -> Result<Vec<MenuEntry>, DatabaseError> {
        let key = scope.scope_key(request.organization_id, request.owner_id)?;
        let entries: Vec<NewMenuEntry> = request
            .components
            .iter()
            .map(|c| NewMenuEntry {
                key,
                component_id: c.id,
                order: c.order,
                visible: c.visible.unwrap_or(true),
            })
            .collect();

        let created = self.menu(scope).bulk_create(&entries).await?;
        info!("Bound {} components to {} menu", created.len(), scope);
        Ok(created)
    }

    /// Create a component and its binding together. A failed bind leaves no component behind.
    pub async fn create_menu_item(
        &self,
        scope: MenuScope,
        request: &CreateMenuItemRequest,
    ) -> Result<MenuItem, DatabaseError> {
        let key = scope.scope_key(request.organization_id, request.owner_id)?;
        let menu = self.menu(scope);

        let mut tx = self.db.begin().await?;
        let component = self
            .components
            .create_component_with_tx(&mut tx, &request.component)
            .await?;
        let entry = menu
            .create_with_tx(
                &mut tx,
                &NewMenuEntry {
                    key,
                    component_id: component.id,
                    order: request.order,
                    visible: request.visible.unwrap_or(true),
                },
            )
            .await?;
        tx.commit()
            .await
            .map_err(DatabaseError::storage("failed to create menu item"))?;

        info!("Created {} component {} in {} menu", component.component_type, component.id, scope);
        Ok(MenuItem { entry, component })
    }

    /// The binding must exist in this owner's menu; otherwise nothing changes.
    pub async fn update_menu_item(
        &self,
        scope: MenuScope,
        component_id: Uuid,
        request: &UpdateMenuItemRequest,
    ) -> Result<MenuItem, DatabaseError> {
        let key = scope.scope_key(request.organization_id, request.owner_id)?;
        let replacement = request
            .component
            .as_ref()
            .map(|c| UpdateComponentRequest::from_create(component_id, c.clone()));
        let menu = self.menu(scope);

        let mut tx = self.db.begin().await?;
        let entry = menu
            .update_with_tx(
                &mut tx,
                &MenuEntryPatch {
                    key,
                    component_id,
                    order: request.order,
                    visible: request.visible,
                },
            )
            .await?;
        let replaced = match &replacement {
            Some(update) => Some(self.components.update_component_with_tx(&mut tx, update).await?),
            None => None,
        };
        tx.commit()
            .await
            .map_err(DatabaseError::storage("failed to update menu item"))?;

        let component = match replaced {
            Some(component) => component,
            None => self.components.get_by_id(component_id).await?,
        };
        Ok(MenuItem { entry, component })
    }

    /// Apply several order changes atomically
    pub async fn reorder(&self, scope: MenuScope, request: &ReorderRequest) -> Result<Vec<MenuEntry>, DatabaseError> {
        let key = scope.scope_key(request.organization_id, request.owner_id)?;
        let menu = self.menu(scope);

        let mut tx = self.db.begin().await?;
        let mut updated = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let patch = MenuEntryPatch {
                key,
                component_id: item.component_id,
                order: Some(item.order),
                visible: None,
            };
            updated.push(menu.update_with_tx(&mut tx, &patch).await?);
        }
        tx.commit()
            .await
            .map_err(DatabaseError::storage("failed to reorder menu"))?;

        updated.sort_by_key(|e| e.order);
        Ok(updated)
    }

    pub async fn set_visibility(
        &self,
        scope: MenuScope,
        component_id: Uuid,
        request: &VisibilityRequest,
    ) -> Result<MenuEntry, DatabaseError> {
        let key = scope.scope_key(request.organization_id, request.owner_id)?;
        self.menu(scope)
            .update_visibility(&key, component_id, request.visible)
            .await
    }

    /// Unbind one component. With `purge`, the component is deleted too once
    /// no menu in any scope references it.
    pub async fn delete_menu_item(
        &self,
        scope: MenuScope,
        key: &ScopeKey,
        component_id: Uuid,
        purge: bool,
    ) -> Result<u64, DatabaseError> {
        let mut tx = self.db.begin().await?;
        self.menu(scope).delete_with_tx(&mut tx, key, component_id).await?;
        let purged = if purge {
            self.components
                .delete_unreferenced_with_tx(&mut tx, &[component_id])
                .await?
        } else {
            0
        };
        tx.commit()
            .await
            .map_err(DatabaseError::storage("failed to delete menu entry"))?;
        Ok(purged)
    }

    /// Remove every binding of one owner, optionally purging orphaned components
    pub async fn clear_menu(
        &self,
        scope: MenuScope,
        key: &ScopeKey,
        purge_components: bool,
    ) -> Result<ClearedMenu, DatabaseError> {
        let mut tx = self.db.begin().await?;
        let removed = self.menu(scope).delete_by_scope_key_with_tx(&mut tx, key).await?;
        let purged_components = if purge_components {
            self.components
                .delete_unreferenced_with_tx(&mut tx, &removed)
                .await?
        } else {
            0
        };
        tx.commit()
            .await
            .map_err(DatabaseError::storage("failed to clear menu"))?;

        info!(
            "Cleared {} menu: {} bindings removed, {} components purged",
            scope,
            removed.len(),
            purged_components
        );
        Ok(ClearedMenu {
            removed,
            purged_components,
        })
    }

    /// Remove a component from every scope's menus, then delete it. Returns
    /// the number of bindings removed.
    pub async fn retire_component(&self, component_id: Uuid) -> Result<u64, DatabaseError> {
        let mut tx = self.db.begin().await?;
        let mut unbound = 0;
        for scope in MenuScope::ALL {
            unbound += self
                .menu(scope)
                .delete_by_component_id_with_tx(&mut tx, component_id)
                .await?;
        }
        self.components.delete_component_with_tx(&mut tx, component_id).await?;
        tx.commit()
            .await
            .map_err(DatabaseError::storage("failed to delete component"))?;

        info!("Retired component {} ({} bindings removed)", component_id, unbound);
        Ok(unbound)
    }

    /// Wipe a whole scope. Only the CLI calls this, after explicit confirmation.
    pub async fn reset_scope(&self, scope: MenuScope) -> Result<u64, DatabaseError> {
        let mut tx = self.db.begin().await?;
        let removed = self.menu(scope).delete_all_with_tx(&mut tx).await?;
        tx.commit()
            .await
            .map_err(DatabaseError::storage("failed to delete all menu entries"))?;
        Ok(removed)
    }
}
