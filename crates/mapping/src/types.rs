use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Treats an explicit JSON `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One observed UI element as written by the key generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    #[serde(default, deserialize_with = "nullable")]
    pub tag_name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub classes: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub inner_text: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub xpath: String,
    #[serde(default)]
    pub semantic_key: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub alternative_names: Vec<String>,
    #[serde(default)]
    pub alternative_selectors: Option<Vec<String>>,
    #[serde(default)]
    pub feature_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub stable_id: Option<String>,
}

impl ElementRecord {
    /// The semantic key, if present and non-blank.
    pub fn key(&self) -> Option<&str> {
        self.semantic_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn test_id(&self) -> Option<&str> {
        self.attribute("data-testid")
    }

    /// The `id` field, falling back to the `id` attribute.
    pub fn element_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|v| !v.is_empty())
            .or_else(|| self.attribute("id"))
    }

    pub fn text(&self) -> Option<&str> {
        self.inner_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn feature(&self) -> Option<&str> {
        self.feature_name.as_deref().filter(|f| !f.is_empty())
    }

    /// True when the element belongs to `scope` by feature name or key prefix.
    pub fn in_scope(&self, scope: &str) -> bool {
        if self.feature() == Some(scope) {
            return true;
        }
        match self.key() {
            Some(key) => key
                .strip_prefix(scope)
                .is_some_and(|rest| rest.starts_with('_')),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingMetadata {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub feature_name: Option<String>,
    #[serde(default)]
    pub element_count: Option<usize>,
}

impl MappingMetadata {
    /// Parsed ISO 8601 timestamp; `None` when absent or unparseable.
    pub fn captured_at(&self) -> Option<DateTime<FixedOffset>> {
        self.timestamp
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
    }
}

/// Versioned mapping file: metadata wrapper around the element list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingFile {
    #[serde(default)]
    pub metadata: MappingMetadata,
    pub elements: Vec<ElementRecord>,
}

/// Either accepted on-disk shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MappingDocument {
    // Legacy is tried first: serde also accepts arrays for structs.
    Legacy(Vec<ElementRecord>),
    Versioned(MappingFile),
}

impl MappingDocument {
    pub fn into_parts(self) -> (Option<MappingMetadata>, Vec<ElementRecord>) {
        match self {
            MappingDocument::Versioned(file) => (Some(file.metadata), file.elements),
            MappingDocument::Legacy(elements) => (None, elements),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_file_shapes() {
        let legacy: MappingDocument =
            serde_json::from_str(r#"[{"tagName":"button","xpath":"/html/body/button"}]"#).unwrap();
        let (meta, elements) = legacy.into_parts();
        assert!(meta.is_none());
        assert_eq!(elements.len(), 1);

        let versioned: MappingDocument = serde_json::from_str(
            r#"{
                "metadata": {"url": "https://app.test/login", "timestamp": "2024-05-01T10:00:00Z",
                             "featureName": "login", "elementCount": 1},
                "elements": [{"tagName": "input", "xpath": "//input", "semanticKey": "login_text_input_username"}]
            }"#,
        )
        .unwrap();
        let (meta, elements) = versioned.into_parts();
        let meta = meta.unwrap();
        assert_eq!(meta.feature_name.as_deref(), Some("login"));
        assert_eq!(meta.captured_at().map(|t| t.to_rfc3339()).as_deref(), Some("2024-05-01T10:00:00+00:00"));
        let loose = MappingMetadata { timestamp: Some("yesterday".into()), ..Default::default() };
        assert!(loose.captured_at().is_none());
        assert_eq!(elements[0].key(), Some("login_text_input_username"));
    }

    #[test]
    fn ignores_unknown_fields_and_nulls() {
        let record: ElementRecord = serde_json::from_str(
            r#"{"tagName":"a","xpath":"//a","classes":null,"boundingBox":{"x":1},"confidence":0.4}"#,
        )
        .unwrap();
        assert!(record.classes.is_empty());
        assert!(record.alternative_names.is_empty());
    }

    #[test]
    fn scope_membership_uses_feature_or_key_prefix() {
        let record = ElementRecord {
            semantic_key: Some("settings_save_button".into()),
            feature_name: Some("profile".into()),
            ..Default::default()
        };
        assert!(record.in_scope("profile"));
        assert!(record.in_scope("settings"));
        assert!(!record.in_scope("setting"));
        assert!(!record.in_scope("checkout"));
    }

    #[test]
    fn id_falls_back_to_attribute() {
        let mut record = ElementRecord::default();
        record.attributes.insert("id".into(), "email".into());
        assert_eq!(record.element_id(), Some("email"));
        record.id = Some("primary-email".into());
        assert_eq!(record.element_id(), Some("primary-email"));
    }
}
