use serde_json::Value;
use uuid::Uuid;

use super::error::ComponentError;
use super::kind::{ComponentKind, ComponentType};
use super::requests::{CreateMenuComponentRequest, UpdateComponentRequest};

/// A validated component ready to be written. Only the factory produces these,
/// so a `NewComponent` always carries a normalized value.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComponent {
    pub id: Uuid,
    pub name: String,
    pub component_type: ComponentType,
    pub key: String,
    pub value: Value,
    pub language: Option<String>,
}

/// Mutable component under construction. Fields are set one by one, then
/// `build` normalizes everything and hands back a `NewComponent`.
#[derive(Debug, Clone)]
pub struct ComponentDraft {
    id: Uuid,
    name: String,
    component_type: ComponentType,
    key: String,
    value: Value,
    language: Option<String>,
}

impl ComponentDraft {
    pub fn new(component_type: ComponentType) -> Self {
        Self::with_id(Uuid::new_v4(), component_type)
    }

    pub fn with_id(id: Uuid, component_type: ComponentType) -> Self {
        Self {
            id,
            name: String::new(),
            component_type,
            key: String::new(),
            value: Value::Object(Default::default()),
            language: None,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn set_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.key = key.into();
        self
    }

    pub fn set_value(&mut self, value: Value) -> &mut Self {
        self.value = value;
        self
    }

    pub fn set_language(&mut self, language: Option<String>) -> &mut Self {
        self.language = language;
        self
    }

    /// Replace the raw value with its normalized form
    pub fn normalize_value(&mut self) -> Result<(), ComponentError> {
        let kind = ComponentKind::parse(self.component_type, &self.value)?.normalize()?;
        self.value = kind.to_value();
        Ok(())
    }

    pub fn build(mut self) -> Result<NewComponent, ComponentError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ComponentError::MissingName);
        }
        self.normalize_value()?;

        Ok(NewComponent {
            id: self.id,
            name,
            component_type: self.component_type,
            key: self.key.trim().to_string(),
            value: self.value,
            language: self
                .language
                .map(|l| l.trim().to_ascii_lowercase())
                .filter(|l| !l.is_empty()),
        })
    }
}

/// Resolve the type, set fields and normalize. A fresh id is assigned.
pub fn build_component(request: &CreateMenuComponentRequest) -> Result<NewComponent, ComponentError> {
    let component_type: ComponentType = request.component_type.parse()?;
    let mut draft = ComponentDraft::new(component_type);
    draft
        .set_name(request.name.as_str())
        .set_key(request.key.as_str())
        .set_value(request.value.clone())
        .set_language(request.language.clone());
    draft.build()
}

/// Same pipeline as `build_component`, keeping the id of the row being replaced
pub fn rebuild_component(request: &UpdateComponentRequest) -> Result<NewComponent, ComponentError> {
    let component_type: ComponentType = request.component_type.parse()?;
    let mut draft = ComponentDraft::with_id(request.id, component_type);
    draft
        .set_name(request.name.as_str())
        .set_key(request.key.as_str())
        .set_value(request.value.clone())
        .set_language(request.language.clone());
    draft.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn visit_request() -> CreateMenuComponentRequest {
        CreateMenuComponentRequest {
            component_type: "button_url".to_string(),
            name: " Visit ".to_string(),
            key: " visit_btn ".to_string(),
            value: json!({ "url": "https://example.com" }),
            language: Some(" EN ".to_string()),
        }
    }

    #[test]
    fn builds_button_url_component() {
        let component = build_component(&visit_request()).unwrap();
        assert!(!component.id.is_nil());
        assert_eq!(component.name, "Visit");
        assert_eq!(component.key, "visit_btn");
        assert_eq!(component.component_type, ComponentType::ButtonUrl);
        assert_eq!(component.value["url"], "https://example.com");
        assert_eq!(component.language.as_deref(), Some("en"));
    }

    #[test]
    fn each_build_gets_a_new_id() {
        let a = build_component(&visit_request()).unwrap();
        let b = build_component(&visit_request()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn unknown_type_aborts_construction() {
        let mut request = visit_request();
        request.component_type = "not_a_real_type".to_string();
        assert_eq!(
            build_component(&request).unwrap_err(),
            ComponentError::UnknownType("not_a_real_type".to_string())
        );
    }

    #[test]
    fn invalid_value_aborts_construction() {
        let mut request = visit_request();
        request.value = json!({ "url": "" });
        assert!(matches!(
            build_component(&request).unwrap_err(),
            ComponentError::InvalidValue { .. }
        ));
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut request = visit_request();
        request.name = "   ".to_string();
        assert_eq!(build_component(&request).unwrap_err(), ComponentError::MissingName);
    }

    #[test]
    fn rebuild_keeps_the_id() {
        let id = Uuid::new_v4();
        let update = UpdateComponentRequest::from_create(id, visit_request());
        let rebuilt = rebuild_component(&update).unwrap();
        assert_eq!(rebuilt.id, id);
    }

    #[test]
    fn draft_builds_from_its_fields() {
        let mut draft = ComponentDraft::new(ComponentType::Label);
        draft
            .set_name(" Title ")
            .set_key(" title ")
            .set_value(json!({ "text": " Welcome " }))
            .set_language(Some(" EN ".to_string()));
        draft.normalize_value().unwrap();

        let first = draft.clone().build().unwrap();
        let second = draft.build().unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.name, "Title");
        assert_eq!(first.key, "title");
        assert_eq!(first.component_type, ComponentType::Label);
        assert_eq!(first.value, json!({ "text": "Welcome" }));
        assert_eq!(first.language.as_deref(), Some("en"));
    }
}
