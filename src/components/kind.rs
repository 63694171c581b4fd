use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ComponentError;

/// Registered component variants. The wire tag is the snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    ButtonUrl,
    ButtonForm,
    ButtonApp,
    Label,
}

impl ComponentType {
    pub const ALL: [ComponentType; 4] = [
        ComponentType::ButtonUrl,
        ComponentType::ButtonForm,
        ComponentType::ButtonApp,
        ComponentType::Label,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::ButtonUrl => "button_url",
            ComponentType::ButtonForm => "button_form",
            ComponentType::ButtonApp => "button_app",
            ComponentType::Label => "label",
        }
    }
}

impl FromStr for ComponentType {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        ComponentType::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| ComponentError::UnknownType(tag.to_string()))
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opens an external web page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ButtonUrlPayload {
    pub url: String,
    #[serde(default)]
    pub open_in_browser: bool,
}

/// Opens a form by its QR code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ButtonFormPayload {
    pub form_qr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Launches an application installed on the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ButtonAppPayload {
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
}

/// Static text shown between other menu components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelPayload {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A component value parsed into its variant-specific shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentKind {
    ButtonUrl(ButtonUrlPayload),
    ButtonForm(ButtonFormPayload),
    ButtonApp(ButtonAppPayload),
    Label(LabelPayload),
}

impl ComponentKind {
    /// Parse a raw JSON value into the shape required by `component_type`.
    /// The result is not yet normalized.
    pub fn parse(component_type: ComponentType, value: &Value) -> Result<Self, ComponentError> {
        if !value.is_object() {
            return Err(ComponentError::malformed(
                component_type,
                "value must be a JSON object",
            ));
        }

        let kind = match component_type {
            ComponentType::ButtonUrl => ComponentKind::ButtonUrl(decode(component_type, value)?),
            ComponentType::ButtonForm => ComponentKind::ButtonForm(decode(component_type, value)?),
            ComponentType::ButtonApp => ComponentKind::ButtonApp(decode(component_type, value)?),
            ComponentType::Label => ComponentKind::Label(decode(component_type, value)?),
        };
        Ok(kind)
    }

    /// Trim, validate and canonicalize the payload. Idempotent.
    pub fn normalize(self) -> Result<Self, ComponentError> {
        match self {
            ComponentKind::ButtonUrl(p) => normalize_button_url(p).map(ComponentKind::ButtonUrl),
            ComponentKind::ButtonForm(p) => normalize_button_form(p).map(ComponentKind::ButtonForm),
            ComponentKind::ButtonApp(p) => normalize_button_app(p).map(ComponentKind::ButtonApp),
            ComponentKind::Label(p) => normalize_label(p).map(ComponentKind::Label),
        }
    }

    pub fn to_value(&self) -> Value {
        let encoded = match self {
            ComponentKind::ButtonUrl(p) => serde_json::to_value(p),
            ComponentKind::ButtonForm(p) => serde_json::to_value(p),
            ComponentKind::ButtonApp(p) => serde_json::to_value(p),
            ComponentKind::Label(p) => serde_json::to_value(p),
        };
        // Plain structs of strings and bools always serialize.
        encoded.unwrap_or(Value::Null)
    }
}

/// Parse and normalize in one step, returning the canonical JSON value
pub fn normalize_value(component_type: ComponentType, value: &Value) -> Result<Value, ComponentError> {
    Ok(ComponentKind::parse(component_type, value)?.normalize()?.to_value())
}

fn decode<T>(component_type: ComponentType, value: &Value) -> Result<T, ComponentError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(value.clone())
        .map_err(|e| ComponentError::malformed(component_type, e.to_string()))
}

fn trimmed_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn normalize_button_url(payload: ButtonUrlPayload) -> Result<ButtonUrlPayload, ComponentError> {
    let ty = ComponentType::ButtonUrl;
    let url = payload.url.trim().to_string();
    if url.is_empty() {
        return Err(ComponentError::invalid(ty, "url", "url is required"));
    }

    let parsed = url::Url::parse(&url)
        .map_err(|e| ComponentError::invalid(ty, "url", format!("invalid url: {}", e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ComponentError::invalid(
            ty,
            "url",
            format!("unsupported url scheme '{}'", parsed.scheme()),
        ));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ComponentError::invalid(ty, "url", "url must include a host"));
    }

    Ok(ButtonUrlPayload {
        url,
        open_in_browser: payload.open_in_browser,
    })
}

fn normalize_button_form(payload: ButtonFormPayload) -> Result<ButtonFormPayload, ComponentError> {
    let ty = ComponentType::ButtonForm;
    let form_qr = payload.form_qr.trim().to_string();
    if form_qr.is_empty() {
        return Err(ComponentError::invalid(ty, "form_qr", "form_qr is required"));
    }
    if form_qr.chars().any(char::is_whitespace) {
        return Err(ComponentError::invalid(ty, "form_qr", "form_qr must not contain whitespace"));
    }

    Ok(ButtonFormPayload {
        form_qr,
        title: trimmed_optional(payload.title),
    })
}

fn normalize_button_app(payload: ButtonAppPayload) -> Result<ButtonAppPayload, ComponentError> {
    let ty = ComponentType::ButtonApp;
    let package = payload.package.trim().to_string();
    if package.is_empty() {
        return Err(ComponentError::invalid(ty, "package", "package is required"));
    }

    let segments: Vec<&str> = package.split('.').collect();
    let well_formed = segments.len() >= 2
        && segments.iter().all(|s| {
            !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if !well_formed {
        return Err(ComponentError::invalid(
            ty,
            "package",
            format!("'{}' is not a valid package name", package),
        ));
    }

    Ok(ButtonAppPayload {
        package,
        activity: trimmed_optional(payload.activity),
    })
}

fn normalize_label(payload: LabelPayload) -> Result<LabelPayload, ComponentError> {
    let ty = ComponentType::Label;
    let text = payload.text.trim().to_string();
    if text.is_empty() {
        return Err(ComponentError::invalid(ty, "text", "text is required"));
    }

    let color = match trimmed_optional(payload.color) {
        Some(c) => {
            let hex = c.strip_prefix('#').unwrap_or("");
            if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
                return Err(ComponentError::invalid(ty, "color", "color must be #RRGGBB"));
            }
            Some(c.to_ascii_lowercase())
        }
        None => None,
    };

    Ok(LabelPayload { text, color })
}
