use crate::types::{ElementRecord, MappingMetadata};
use std::path::{Path, PathBuf};

/// Elements contributed by one mapping file.
#[derive(Debug, Clone, Default)]
pub struct MappingSource {
    pub path: PathBuf,
    pub metadata: Option<MappingMetadata>,
    pub elements: Vec<ElementRecord>,
}

impl MappingSource {
    pub fn feature(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.feature_name.as_deref())
            .filter(|f| !f.is_empty())
    }
}

/// All records loaded from one mapping directory, in file-name order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    directory: PathBuf,
    sources: Vec<MappingSource>,
}

impl Corpus {
    pub fn new(directory: impl Into<PathBuf>, sources: Vec<MappingSource>) -> Self {
        Self { directory: directory.into(), sources }
    }

    /// Builds a single-source corpus from in-memory records.
    pub fn from_elements(elements: Vec<ElementRecord>) -> Self {
        Self::new(
            PathBuf::new(),
            vec![MappingSource { elements, ..Default::default() }],
        )
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn sources(&self) -> &[MappingSource] {
        &self.sources
    }

    pub fn elements(&self) -> impl Iterator<Item = &ElementRecord> {
        self.sources.iter().flat_map(|s| s.elements.iter())
    }

    pub fn len(&self) -> usize {
        self.sources.iter().map(|s| s.elements.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keyed_count(&self) -> usize {
        self.elements().filter(|e| e.key().is_some()).count()
    }

    /// First record whose key is `scope_key`, then `key`, ignoring case.
    pub fn find_by_exact_key(&self, key: &str, scope: Option<&str>) -> Option<&ElementRecord> {
        let key = key.trim().to_lowercase();
        if let Some(scope) = scope {
            let scoped = format!("{}_{}", scope.to_lowercase(), key);
            if let Some(found) = self.elements().find(|e| has_key(e, &scoped)) {
                return Some(found);
            }
        }
        self.elements().find(|e| has_key(e, &key))
    }
}

fn has_key(element: &ElementRecord, lowered: &str) -> bool {
    element.key().is_some_and(|k| k.to_lowercase() == lowered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(key: &str) -> ElementRecord {
        ElementRecord {
            tag_name: "button".into(),
            semantic_key: Some(key.into()),
            ..Default::default()
        }
    }

    #[test]
    fn exact_lookup_prefers_scoped_key() {
        let corpus = Corpus::from_elements(vec![keyed("save_button"), keyed("settings_save_button")]);
        let found = corpus.find_by_exact_key("save_button", Some("settings")).unwrap();
        assert_eq!(found.key(), Some("settings_save_button"));

        let bare = corpus.find_by_exact_key("save_button", Some("billing")).unwrap();
        assert_eq!(bare.key(), Some("save_button"));
        assert!(corpus.find_by_exact_key("cancel_button", None).is_none());
        assert_eq!(
            corpus.find_by_exact_key("Save_Button", Some("SETTINGS")).and_then(|e| e.key()),
            Some("settings_save_button")
        );
    }

    #[test]
    fn counts_span_all_sources() {
        let corpus = Corpus::new(
            "mappings",
            vec![
                MappingSource { elements: vec![keyed("a_b_c"), ElementRecord::default()], ..Default::default() },
                MappingSource { elements: vec![keyed("d_e_f")], ..Default::default() },
            ],
        );
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.keyed_count(), 2);
    }
}
