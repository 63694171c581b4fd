use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Request to create a component. `type` stays a plain string so unknown tags
/// reach the factory and fail as `UnknownType` rather than as a JSON error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMenuComponentRequest {
    #[serde(rename = "type")]
    pub component_type: String,
    pub name: String,
    #[serde(default)]
    pub key: String,
    #[serde(default = "empty_object")]
    pub value: Value,
    #[serde(default)]
    pub language: Option<String>,
}

/// Full replacement of an existing component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateComponentRequest {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub component_type: String,
    pub name: String,
    #[serde(default)]
    pub key: String,
    #[serde(default = "empty_object")]
    pub value: Value,
    #[serde(default)]
    pub language: Option<String>,
}

impl UpdateComponentRequest {
    pub fn from_create(id: Uuid, request: CreateMenuComponentRequest) -> Self {
        Self {
            id,
            component_type: request.component_type,
            name: request.name,
            key: request.key,
            value: request.value,
            language: request.language,
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}
