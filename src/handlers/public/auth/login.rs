// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{verify_password, IssuedToken, Role, Subject, SubjectKind};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub token: IssuedToken,
    pub user: LoginUser,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub organization_id: Option<Uuid>,
}

/// POST /auth/login - Exchange username and password for a bearer token
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    let username = request.username.trim();
    if username.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    // Same answer for unknown user and wrong password
    let denied = || ApiError::unauthorized("Invalid username or password");

    let user = state.users.find_by_username(username).await?.ok_or_else(denied)?;
    if !verify_password(&request.password, &user.password_hash)? {
        tracing::info!("Rejected login for {}", username);
        return Err(denied());
    }

    let role: Role = user.role.parse()?;
    let token = state.tokens.generate_token(&Subject {
        id: user.id,
        kind: SubjectKind::User,
        role,
        organization_id: user.organization_id,
    })?;

    tracing::info!("Issued token for {} ({})", user.username, role);
    Ok(ApiResponse::success(LoginResponse {
        token,
        user: LoginUser {
            id: user.id,
            username: user.username,
            role,
            organization_id: user.organization_id,
        },
    }))
}
