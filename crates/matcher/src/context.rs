//! Best-effort scope inference.
//!
//! Resolvers are advisory: returning `None` only drops the scope boost and the
//! cross-feature veto, it never blocks a lookup.

use descry_mapping::Corpus;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

pub trait ScopeResolver: Send + Sync {
    /// Scope for a lookup made by `caller` (e.g. a test file), if one can be
    /// inferred from `corpus`.
    fn infer_scope(&self, caller: Option<&str>, corpus: &Corpus) -> Option<String>;
}

/// Never infers a scope.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoScope;

impl ScopeResolver for NoScope {
    fn infer_scope(&self, _caller: Option<&str>, _corpus: &Corpus) -> Option<String> {
        None
    }
}

/// Infers scope from the last URL the page driver navigated to, optionally
/// per caller, by matching it against mapping file metadata.
#[derive(Debug, Default)]
pub struct NavigationScope {
    last_url: Mutex<Option<String>>,
    by_caller: Mutex<HashMap<String, String>>,
}

impl NavigationScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_navigation(&self, caller: Option<&str>, url: &str) {
        if let Ok(mut last) = self.last_url.lock() {
            *last = Some(url.to_string());
        }
        if let Some(caller) = caller {
            if let Ok(mut by_caller) = self.by_caller.lock() {
                by_caller.insert(caller.to_string(), url.to_string());
            }
        }
    }

    pub fn forget(&self) {
        if let Ok(mut last) = self.last_url.lock() {
            *last = None;
        }
        if let Ok(mut by_caller) = self.by_caller.lock() {
            by_caller.clear();
        }
    }

    fn url_for(&self, caller: Option<&str>) -> Option<String> {
        let from_caller = caller.and_then(|c| self.by_caller.lock().ok()?.get(c).cloned());
        from_caller.or_else(|| self.last_url.lock().ok()?.clone())
    }
}

impl ScopeResolver for NavigationScope {
    fn infer_scope(&self, caller: Option<&str>, corpus: &Corpus) -> Option<String> {
        let url = normalize_url(&self.url_for(caller)?);

        let from_metadata = corpus.sources().iter().find_map(|source| {
            let meta_url = source.metadata.as_ref()?.url.as_deref()?;
            (normalize_url(meta_url) == url).then(|| source.feature())?
        });

        let scope = from_metadata
            .or_else(|| {
                corpus
                    .elements()
                    .find(|e| e.url.as_deref().map(normalize_url).as_deref() == Some(url.as_str()))
                    .and_then(|e| e.feature())
            })
            .map(str::to_string);

        debug!("Inferred scope {:?} from {}", scope, url);
        scope
    }
}

/// Drops query string, fragment and trailing slash.
fn normalize_url(url: &str) -> String {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    url[..end].trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use descry_mapping::{ElementRecord, MappingMetadata, MappingSource};

    fn corpus() -> Corpus {
        Corpus::new(
            "mappings",
            vec![
                MappingSource {
                    metadata: Some(MappingMetadata {
                        url: Some("https://app.test/settings/".into()),
                        feature_name: Some("settings".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                MappingSource {
                    elements: vec![ElementRecord {
                        url: Some("https://app.test/profile".into()),
                        feature_name: Some("profile".into()),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
            ],
        )
    }

    #[test]
    fn no_scope_is_silent() {
        assert_eq!(NoScope.infer_scope(Some("login.spec"), &corpus()), None);
    }

    #[test]
    fn matches_metadata_url_loosely() {
        let resolver = NavigationScope::new();
        assert_eq!(resolver.infer_scope(None, &corpus()), None);

        resolver.record_navigation(None, "https://app.test/settings?tab=privacy#top");
        assert_eq!(resolver.infer_scope(None, &corpus()).as_deref(), Some("settings"));
    }

    #[test]
    fn caller_association_wins_over_last_url() {
        let resolver = NavigationScope::new();
        resolver.record_navigation(Some("profile.spec.ts"), "https://app.test/profile");
        resolver.record_navigation(Some("settings.spec.ts"), "https://app.test/settings");

        assert_eq!(resolver.infer_scope(Some("profile.spec.ts"), &corpus()).as_deref(), Some("profile"));
        assert_eq!(resolver.infer_scope(Some("unknown.spec.ts"), &corpus()).as_deref(), Some("settings"));

        resolver.forget();
        assert_eq!(resolver.infer_scope(Some("profile.spec.ts"), &corpus()), None);
    }

    #[test]
    fn unknown_urls_infer_nothing() {
        let resolver = NavigationScope::new();
        resolver.record_navigation(None, "https://elsewhere.test/");
        assert_eq!(resolver.infer_scope(None, &corpus()), None);
    }
}
