use uuid::Uuid;

use crate::database::MenuScope;
use crate::error::ApiError;

pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("Invalid UUID: {}", raw)))
}

pub fn parse_scope(raw: &str) -> Result<MenuScope, ApiError> {
    Ok(raw.parse::<MenuScope>()?)
}
