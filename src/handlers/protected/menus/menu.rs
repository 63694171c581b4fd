use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::components::ComponentType;
use crate::database::models::{MenuEntry, MenuItem};
use crate::database::MenuFilter;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::services::menu_service::{ClearedMenu, CreateMenuRequest, ReorderRequest};

use super::super::utils::parse_scope;

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub organization_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub visible_only: bool,
    #[serde(rename = "type")]
    pub component_type: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClearQuery {
    pub organization_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub purge_components: bool,
}

/// GET /api/menus/:scope - One owner's menu with its components, in order
pub async fn list(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Query(query): Query<MenuQuery>,
) -> ApiResult<Vec<MenuItem>> {
    let scope = parse_scope(&scope)?;
    let key = scope.scope_key(query.organization_id, query.owner_id)?;
    let filter = MenuFilter {
        component_type: query
            .component_type
            .as_deref()
            .map(str::parse::<ComponentType>)
            .transpose()?,
        language: query.language,
        visible_only: query.visible_only,
    };

    Ok(ApiResponse::success(state.menus.list_menu(scope, &key, &filter).await?))
}

/// POST /api/menus/:scope - Bind existing components to one owner's menu
pub async fn bind(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Json(request): Json<CreateMenuRequest>,
) -> ApiResult<Vec<MenuEntry>> {
    let scope = parse_scope(&scope)?;
    Ok(ApiResponse::created(state.menus.bind_components(scope, &request).await?))
}

/// DELETE /api/menus/:scope - Clear one owner's menu
pub async fn clear(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Query(query): Query<ClearQuery>,
) -> ApiResult<ClearedMenu> {
    let scope = parse_scope(&scope)?;
    let key = scope.scope_key(query.organization_id, query.owner_id)?;
    Ok(ApiResponse::success(
        state.menus.clear_menu(scope, &key, query.purge_components).await?,
    ))
}

/// PUT /api/menus/:scope/order - Apply several order changes in one transaction
pub async fn reorder(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<Vec<MenuEntry>> {
    let scope = parse_scope(&scope)?;
    Ok(ApiResponse::success(state.menus.reorder(scope, &request).await?))
}
