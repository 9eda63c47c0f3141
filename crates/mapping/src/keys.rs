use crate::corpus::Corpus;
use crate::types::ElementRecord;
use serde::Serialize;
use std::collections::BTreeSet;

/// One row of the key listing used for tooling and autocomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEntry {
    pub key: String,
    pub human_description: String,
    pub feature_name: Option<String>,
}

/// Every keyed element in the corpus, sorted by key, one row per
/// (key, feature) pair.
pub fn list_keys(corpus: &Corpus) -> Vec<KeyEntry> {
    let mut seen = BTreeSet::new();
    let mut entries: Vec<KeyEntry> = corpus
        .elements()
        .filter_map(|element| {
            let key = element.key()?;
            let feature = element.feature().map(str::to_string);
            if !seen.insert((key.to_string(), feature.clone())) {
                return None;
            }
            Some(KeyEntry {
                key: key.to_string(),
                human_description: human_description(element),
                feature_name: feature,
            })
        })
        .collect();

    entries.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.feature_name.cmp(&b.feature_name)));
    entries
}

/// First alternative name, else the key spelled out.
pub fn human_description(element: &ElementRecord) -> String {
    if let Some(name) = element.alternative_names.first() {
        return name.clone();
    }
    element
        .key()
        .map(|k| k.split('_').filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}
