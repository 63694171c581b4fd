use thiserror::Error;

use super::kind::ComponentType;

/// Errors raised while resolving or normalizing a component before it is stored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    #[error("Unknown component type: {0}")]
    UnknownType(String),

    #[error("Invalid {component_type} value: {reason}")]
    InvalidValue {
        component_type: ComponentType,
        field: Option<String>,
        reason: String,
    },

    #[error("Component name is required")]
    MissingName,
}

impl ComponentError {
    pub(crate) fn invalid(
        component_type: ComponentType,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ComponentError::InvalidValue {
            component_type,
            field: Some(field.into()),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(component_type: ComponentType, reason: impl Into<String>) -> Self {
        ComponentError::InvalidValue {
            component_type,
            field: None,
            reason: reason.into(),
        }
    }
}
