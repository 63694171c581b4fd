use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::app::AppState;
use crate::components::{ComponentType, CreateMenuComponentRequest};
use crate::database::models::Component;
use crate::database::ComponentQuery;
use crate::error::ApiError;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub component_type: Option<String>,
    pub key: Option<String>,
    pub language: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/components - List components, optionally filtered by type, key or language
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Vec<Component>> {
    let component_type = query
        .component_type
        .as_deref()
        .map(str::parse::<ComponentType>)
        .transpose()?;

    let components = state
        .components
        .list_components(&ComponentQuery {
            component_type,
            key: query.key,
            language: query.language,
            limit: state.config.page_size(query.limit),
            offset: query.offset.unwrap_or(0),
        })
        .await?;
    Ok(ApiResponse::success(components))
}

/// POST /api/components - Create one component, or several from a JSON array (all or nothing)
pub async fn create(
    AdminUser(user): AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let serialized = if payload.is_array() {
        let requests: Vec<CreateMenuComponentRequest> = parse_payload(payload)?;
        let components = state.components.create_components(&requests).await?;
        serde_json::to_value(components)
    } else {
        let request: CreateMenuComponentRequest = parse_payload(payload)?;
        let component = state.components.create_component(&request).await?;
        serde_json::to_value(component)
    };
    let created = serialized.map_err(|e| {
        tracing::error!("Failed to serialize component: {}", e);
        ApiError::internal_server_error("Failed to format response")
    })?;

    tracing::debug!("Components created by {}", user.id);
    Ok(ApiResponse::created(created))
}

/// GET /api/components/keys - Distinct non-empty component keys
pub async fn keys(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(ApiResponse::success(state.components.get_all_component_keys().await?))
}

fn parse_payload<T: serde::de::DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    serde_json::from_value(payload).map_err(|e| ApiError::invalid_json(e.to_string()))
}
