use crate::engine::MatchCandidate;
use crate::error::LocatorError;
use descry_core::config::MatchConfig;
use serde::Serialize;
use tracing::warn;

/// More specific phrasings for one of the leading candidates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub label: String,
    pub feature_name: Option<String>,
    pub score: u32,
    pub alternative_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub warning: String,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone)]
pub struct Assessment<'a> {
    pub winner: Option<MatchCandidate<'a>>,
    pub ambiguous: bool,
    pub diagnostics: Option<Diagnostics>,
}

pub struct AmbiguityDetector {
    ratio: f64,
    window: usize,
    suggestions_per_candidate: usize,
}

impl AmbiguityDetector {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            ratio: config.ambiguity_ratio,
            window: config.ambiguity_window.max(2),
            suggestions_per_candidate: config.suggestions_per_candidate,
        }
    }

    /// Inclusive: a runner-up at exactly `ratio * top` is ambiguous.
    pub fn is_ambiguous(&self, top: u32, runner_up: u32) -> bool {
        // scores are integers, so the epsilon only absorbs float error
        f64::from(runner_up) >= f64::from(top) * self.ratio - 1e-9
    }

    /// Picks the winner from a ranked list. Fails only when the leaders are
    /// indistinguishable, span several features and no scope was given.
    pub fn assess<'a>(
        &self,
        query: &str,
        candidates: Vec<MatchCandidate<'a>>,
        scope: Option<&str>,
    ) -> Result<Assessment<'a>, LocatorError> {
        if candidates.len() < 2 {
            return Ok(Assessment {
                winner: candidates.into_iter().next(),
                ambiguous: false,
                diagnostics: None,
            });
        }

        let top = &candidates[0];
        let runner_up = &candidates[1];
        if !self.is_ambiguous(top.score, runner_up.score) {
            return Ok(Assessment {
                winner: candidates.into_iter().next(),
                ambiguous: false,
                diagnostics: None,
            });
        }

        let warning = format!(
            "Ambiguous match for \"{}\": {} ({}) vs {} ({})",
            query,
            top.label(),
            top.score,
            runner_up.label(),
            runner_up.score
        );
        warn!("{}", warning);

        let leaders = &candidates[..self.window.min(candidates.len())];
        let suggestions = self.suggestions(query, leaders);
        for suggestion in suggestions.iter().filter(|s| !s.alternative_names.is_empty()) {
            warn!(
                "  try \"{}\" for {}",
                suggestion.alternative_names.join("\" or \""),
                suggestion.label
            );
        }

        let features = distinct_features(leaders);
        if features.len() > 1 && scope.is_none() {
            return Err(LocatorError::AmbiguousAcrossFeatures {
                query: query.to_string(),
                features,
            });
        }

        Ok(Assessment {
            winner: candidates.into_iter().next(),
            ambiguous: true,
            diagnostics: Some(Diagnostics { warning, suggestions }),
        })
    }

    fn suggestions(&self, query: &str, leaders: &[MatchCandidate<'_>]) -> Vec<Suggestion> {
        let query_len = query.trim().chars().count();
        leaders
            .iter()
            .map(|candidate| {
                let mut names: Vec<String> = candidate
                    .element
                    .alternative_names
                    .iter()
                    .filter(|name| name.chars().count() > query_len)
                    .cloned()
                    .collect();
                names.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
                names.truncate(self.suggestions_per_candidate);

                Suggestion {
                    label: candidate.label().to_string(),
                    feature_name: candidate.element.feature().map(str::to_string),
                    score: candidate.score,
                    alternative_names: names,
                }
            })
            .collect()
    }
}

/// Feature names among `leaders`, first-seen order.
fn distinct_features(leaders: &[MatchCandidate<'_>]) -> Vec<String> {
    let mut features: Vec<String> = Vec::new();
    for feature in leaders.iter().filter_map(|c| c.element.feature()) {
        if !features.iter().any(|f| f == feature) {
            features.push(feature.to_string());
        }
    }
    features
}
