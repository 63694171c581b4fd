use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{MenuEntry, MenuItem};
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::services::menu_service::{CreateMenuItemRequest, UpdateMenuItemRequest, VisibilityRequest};

use super::super::utils::{parse_id, parse_scope};

#[derive(Debug, Deserialize)]
pub struct ItemQuery {
    pub organization_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteItemQuery {
    pub organization_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    /// Also delete the component once nothing references it
    #[serde(default)]
    pub purge: bool,
}

/// POST /api/menus/:scope/items - Create a component and bind it in one transaction
pub async fn create_item(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Json(request): Json<CreateMenuItemRequest>,
) -> ApiResult<MenuItem> {
    let scope = parse_scope(&scope)?;
    Ok(ApiResponse::created(state.menus.create_menu_item(scope, &request).await?))
}

/// GET /api/menus/:scope/items/:component_id - One binding's order and visibility
pub async fn get_item(
    State(state): State<AppState>,
    Path((scope, component_id)): Path<(String, String)>,
    Query(query): Query<ItemQuery>,
) -> ApiResult<MenuEntry> {
    let scope = parse_scope(&scope)?;
    let component_id = parse_id(&component_id)?;
    let key = scope.scope_key(query.organization_id, query.owner_id)?;
    Ok(ApiResponse::success(
        state.menus.menu(scope).get_entry(&key, component_id).await?,
    ))
}

/// PUT /api/menus/:scope/items/:component_id - Patch order/visibility and optionally
/// replace the component, atomically
pub async fn update_item(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path((scope, component_id)): Path<(String, String)>,
    Json(request): Json<UpdateMenuItemRequest>,
) -> ApiResult<MenuItem> {
    let scope = parse_scope(&scope)?;
    let component_id = parse_id(&component_id)?;
    Ok(ApiResponse::success(
        state.menus.update_menu_item(scope, component_id, &request).await?,
    ))
}

/// DELETE /api/menus/:scope/items/:component_id - Unbind a component from one owner's menu
pub async fn delete_item(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path((scope, component_id)): Path<(String, String)>,
    Query(query): Query<DeleteItemQuery>,
) -> ApiResult<Value> {
    let scope = parse_scope(&scope)?;
    let component_id = parse_id(&component_id)?;
    let key = scope.scope_key(query.organization_id, query.owner_id)?;

    let purged = state
        .menus
        .delete_menu_item(scope, &key, component_id, query.purge)
        .await?;
    Ok(ApiResponse::success(json!({
        "component_id": component_id,
        "purged": purged > 0
    })))
}

/// PATCH /api/menus/:scope/items/:component_id/visibility - Show or hide without touching order
pub async fn set_visibility(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path((scope, component_id)): Path<(String, String)>,
    Json(request): Json<VisibilityRequest>,
) -> ApiResult<MenuEntry> {
    let scope = parse_scope(&scope)?;
    let component_id = parse_id(&component_id)?;
    Ok(ApiResponse::success(
        state.menus.set_visibility(scope, component_id, &request).await?,
    ))
}
