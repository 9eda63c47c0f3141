//! Multi-mode candidate scoring.
//!
//! Every query is checked for an exact key hit first. Failing that, each keyed
//! element is scored by partial-key tiers (when the query is key-shaped) and by
//! free-text description signals, keeping the stronger of the two. Wildcard
//! queries are matched as key patterns only.

use crate::error::InvalidPattern;
use crate::query::{normalize_words, Query};
use descry_core::config::MatchConfig;
use descry_mapping::{Corpus, ElementRecord};
use regex::Regex;
use tracing::debug;

/// A scored element. Borrowed from the corpus, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate<'a> {
    pub element: &'a ElementRecord,
    pub score: u32,
    pub matched_alternative: Option<String>,
}

impl MatchCandidate<'_> {
    /// Key when present, xpath otherwise.
    pub fn label(&self) -> &str {
        self.element.key().unwrap_or(self.element.xpath.as_str())
    }
}

pub struct MatchEngine {
    config: MatchConfig,
}

impl MatchEngine {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    /// Scores every element against `query`, best first. Elements scoring
    /// zero are dropped; equal scores keep corpus order.
    pub fn rank<'a>(&self, query: &str, scope: Option<&str>, corpus: &'a Corpus) -> Vec<MatchCandidate<'a>> {
        let query = Query::parse(query, self.config.min_word_len);
        if query.is_empty() {
            return Vec::new();
        }

        let exact = self.exact_matches(&query, scope, corpus);
        if !exact.is_empty() {
            debug!("Exact key hit for \"{}\" ({} elements)", query.raw(), exact.len());
            return exact;
        }

        let pattern = if query.is_wildcard() {
            match compile_wildcard(query.lowered()) {
                Ok(re) => Some(re),
                Err(e) => {
                    debug!("{}", e);
                    None
                }
            }
        } else {
            None
        };

        let mut ranked: Vec<MatchCandidate<'a>> = corpus
            .elements()
            .filter_map(|element| self.score(element, &query, scope, pattern.as_ref()))
            .collect();

        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        debug!(
            "Ranked {} of {} elements for \"{}\"",
            ranked.len(),
            corpus.len(),
            query.raw()
        );
        ranked
    }

    /// Elements whose key equals `scope_query`, else `query`, ignoring case.
    fn exact_matches<'a>(&self, query: &Query, scope: Option<&str>, corpus: &'a Corpus) -> Vec<MatchCandidate<'a>> {
        let mut targets = Vec::with_capacity(2);
        if let Some(scope) = scope {
            targets.push(format!("{}_{}", scope.to_lowercase(), query.lowered()));
        }
        targets.push(query.lowered().to_string());

        for target in targets {
            let hits: Vec<MatchCandidate<'a>> = corpus
                .elements()
                .filter(|e| e.key().is_some_and(|k| k.to_lowercase() == target))
                .map(|element| MatchCandidate {
                    element,
                    score: self.config.exact_key,
                    matched_alternative: None,
                })
                .collect();
            if !hits.is_empty() {
                return hits;
            }
        }
        Vec::new()
    }

    fn score<'a>(
        &self,
        element: &'a ElementRecord,
        query: &Query,
        scope: Option<&str>,
        pattern: Option<&Regex>,
    ) -> Option<MatchCandidate<'a>> {
        let key = element.key()?;

        let (score, matched_alternative) = if query.is_wildcard() {
            (self.partial_key_score(key, query, scope, pattern), None)
        } else {
            let partial = if query.is_partial_key() {
                self.partial_key_score(key, query, scope, None)
            } else {
                0
            };
            let (description, alternative) = self.description_score(element, key, query);
            if description >= partial {
                (description, alternative)
            } else {
                (partial, None)
            }
        };

        if score == 0 {
            return None;
        }
        let score = if scope.is_some_and(|s| element.in_scope(s)) {
            score + self.config.scope_boost
        } else {
            score
        };

        Some(MatchCandidate { element, score, matched_alternative })
    }

    /// Tiered key comparison for prefixes, fragments and wildcards.
    pub fn partial_key_score(&self, key: &str, query: &Query, scope: Option<&str>, pattern: Option<&Regex>) -> u32 {
        let c = &self.config;
        let key = key.to_lowercase();
        let q = query.lowered();

        if key == q {
            return c.exact_key;
        }
        if let Some(scope) = scope {
            if key == format!("{}_{}", scope.to_lowercase(), q) {
                return c.scoped_key;
            }
        }
        if key.starts_with(q) {
            return c.key_prefix;
        }
        if key.contains(q) {
            return c.key_contains;
        }

        if query.is_wildcard() {
            return match pattern {
                Some(re) if re.is_match(&key) => c.wildcard,
                _ => 0,
            };
        }

        let words = query.key_words();
        if words.is_empty() {
            return 0;
        }
        let matched = words.iter().filter(|w| key.contains(w.as_str())).count() as u32;
        if matched == 0 {
            0
        } else if matched as usize == words.len() {
            c.all_words_base + c.per_word * matched
        } else {
            c.some_words_base + c.per_word * matched
        }
    }

    /// Additive evidence from the key, alternative names, tag and text.
    pub fn description_score(
        &self,
        element: &ElementRecord,
        key: &str,
        query: &Query,
    ) -> (u32, Option<String>) {
        let c = &self.config;
        let key = key.to_lowercase();
        let segments: Vec<&str> = key.split('_').filter(|s| !s.is_empty()).collect();
        let significant = query.significant();
        let mut score = 0;

        // key without its context prefix
        if segments.len() > 1 && segments[1..].join("_") == query.as_key_tail() {
            score += c.context_exact;
        }

        for word in significant {
            if segments.contains(&word.as_str()) {
                score += c.segment_word;
            } else if key.contains(word.as_str()) {
                score += c.substring_word;
            }
        }

        let (alternative_score, matched_alternative) = self.alternative_score(element, query);
        score += alternative_score;

        if !element.tag_name.is_empty() && query.words().iter().any(|w| *w == element.tag_name) {
            score += c.tag_name;
        }

        if let Some(text) = element.text() {
            let text = text.to_lowercase();
            let hits = significant.iter().filter(|w| text.contains(w.as_str())).count() as u32;
            score += c.inner_text_word * hits;
        }

        (score, matched_alternative)
    }

    fn alternative_score(&self, element: &ElementRecord, query: &Query) -> (u32, Option<String>) {
        let c = &self.config;
        let significant = query.significant();
        let normalized_query = query.normalized();

        let mut total = 0;
        let mut best: Option<(u32, &String)> = None;

        for name in &element.alternative_names {
            let normalized = normalize_words(name).join(" ");
            if normalized == normalized_query {
                return (total + c.alternative_exact, Some(name.clone()));
            }
            if significant.is_empty() {
                continue;
            }
            let matched = significant.iter().filter(|w| normalized.contains(w.as_str())).count();
            if matched > 0 {
                let credit = (c.alternative_partial as f64 * matched as f64 / significant.len() as f64).round() as u32;
                total += credit;
                if best.is_none_or(|(b, _)| credit > b) {
                    best = Some((credit, name));
                }
            }
        }

        (total, best.map(|(_, name)| name.clone()))
    }
}

/// `*` becomes `.*`; the pattern must match the whole key.
pub fn compile_wildcard(pattern: &str) -> Result<Regex, InvalidPattern> {
    let body = pattern.replace('*', ".*");
    Regex::new(&format!("(?i)^{}$", body)).map_err(|source| InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
