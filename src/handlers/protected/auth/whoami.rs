use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/auth/whoami - The identity carried by the caller's token
pub async fn whoami(user: AuthUser) -> ApiResult<AuthUser> {
    Ok(ApiResponse::success(user))
}
