use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::components::{CreateMenuComponentRequest, UpdateComponentRequest};
use crate::database::models::Component;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};

use super::super::utils::parse_id;

/// GET /api/components/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Component> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.components.get_by_id(id).await?))
}

/// PUT /api/components/:id - Replace a component's content. The id stays the
/// same, so every menu binding keeps pointing at it.
pub async fn update(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CreateMenuComponentRequest>,
) -> ApiResult<Component> {
    let id = parse_id(&id)?;
    let request = UpdateComponentRequest::from_create(id, request);
    Ok(ApiResponse::success(state.components.update_component(&request).await?))
}

/// DELETE /api/components/:id - Unbind the component from every menu, then delete it
pub async fn delete(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let unbound = state.menus.retire_component(id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "unbound": unbound })))
}
