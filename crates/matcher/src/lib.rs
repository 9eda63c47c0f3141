//! Descry Matcher - resolve element descriptions to selectors
//!
//! This crate is organized into:
//! - query: Query normalization and shape detection
//! - engine: Multi-mode scoring and ranking (MatchEngine)
//! - ambiguity: Winner selection and disambiguation hints
//! - selector: Selector synthesis for the winning record
//! - context: Advisory scope inference

pub mod query;
pub mod engine;
pub mod ambiguity;
pub mod selector;
pub mod context;
mod error;

pub use ambiguity::{AmbiguityDetector, Assessment, Diagnostics, Suggestion};
pub use context::{NavigationScope, NoScope, ScopeResolver};
pub use engine::{MatchCandidate, MatchEngine};
pub use error::{InvalidPattern, LocatorError};
pub use selector::SelectorSynthesizer;

use descry_core::config::{DescryConfig, MatchConfig};
use descry_mapping::{CorpusProvider, KeyEntry, MappingStore};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub selector: String,
    pub key: Option<String>,
    pub feature_name: Option<String>,
    pub score: u32,
    pub scope: Option<String>,
    pub matched_alternative: Option<String>,
    /// Present when the winner was picked from an ambiguous field.
    pub diagnostics: Option<Diagnostics>,
}

/// Query facade: corpus provider, engine, ambiguity policy and selector
/// synthesis wired together.
pub struct Locator {
    provider: Arc<dyn CorpusProvider>,
    scope_resolver: Arc<dyn ScopeResolver>,
    engine: MatchEngine,
    detector: AmbiguityDetector,
    synthesizer: SelectorSynthesizer,
}

impl Locator {
    /// Locator backed by a fresh `MappingStore`, with no scope inference.
    pub fn new(config: &DescryConfig) -> Self {
        let store = MappingStore::new(config.mapping.clone());
        Self::with_provider(Arc::new(store), config.matching.clone())
    }

    pub fn with_provider(provider: Arc<dyn CorpusProvider>, config: MatchConfig) -> Self {
        Self {
            provider,
            scope_resolver: Arc::new(NoScope),
            detector: AmbiguityDetector::new(&config),
            synthesizer: SelectorSynthesizer::new(config.text_selector_max_len),
            engine: MatchEngine::new(config),
        }
    }

    pub fn with_scope_resolver(mut self, resolver: Arc<dyn ScopeResolver>) -> Self {
        self.scope_resolver = resolver;
        self
    }

    /// Selector for `query`, or `NotFound` / `AmbiguousAcrossFeatures`.
    pub async fn resolve_selector(
        &self,
        query: &str,
        scope: Option<&str>,
        mapping_dir: &Path,
    ) -> Result<String, LocatorError> {
        self.resolve(query, scope, mapping_dir)
            .await
            .map(|resolution| resolution.selector)
    }

    pub async fn resolve(
        &self,
        query: &str,
        scope: Option<&str>,
        mapping_dir: &Path,
    ) -> Result<Resolution, LocatorError> {
        self.resolve_for(query, scope, mapping_dir, None).await
    }

    /// Like `resolve`, letting the scope resolver use `caller` (for example
    /// the calling test file) when no explicit scope is given.
    pub async fn resolve_for(
        &self,
        query: &str,
        scope: Option<&str>,
        mapping_dir: &Path,
        caller: Option<&str>,
    ) -> Result<Resolution, LocatorError> {
        let corpus = self.provider.corpus(mapping_dir).await?;

        let scope = match scope.map(str::trim).filter(|s| !s.is_empty()) {
            Some(explicit) => Some(explicit.to_string()),
            None => self.scope_resolver.infer_scope(caller, &corpus),
        };

        let ranked = self.engine.rank(query, scope.as_deref(), &corpus);
        debug!("{} candidates for \"{}\" (scope {:?})", ranked.len(), query, scope);

        let assessment = self.detector.assess(query, ranked, scope.as_deref())?;
        let winner = assessment.winner.ok_or_else(|| LocatorError::NotFound {
            query: query.to_string(),
        })?;

        let selector = self.synthesizer.synthesize(winner.element);
        info!("🎯 \"{}\" -> {} ({}, score {})", query, selector, winner.label(), winner.score);

        Ok(Resolution {
            selector,
            key: winner.element.key().map(str::to_string),
            feature_name: winner.element.feature().map(str::to_string),
            score: winner.score,
            scope,
            matched_alternative: winner.matched_alternative,
            diagnostics: assessment.diagnostics,
        })
    }

    /// Forgets every loaded mapping directory; the next lookup re-reads disk.
    pub async fn clear_cache(&self) {
        self.provider.clear().await;
    }

    /// Every semantic key in `mapping_dir` with a readable description.
    pub async fn list_keys(&self, mapping_dir: &Path) -> Result<Vec<KeyEntry>, LocatorError> {
        let corpus = self.provider.corpus(mapping_dir).await?;
        Ok(descry_mapping::list_keys(&corpus))
    }
}
