use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Scoring weights and thresholds used by the matcher.
///
/// The defaults are empirical values the existing mapping fixtures were tuned
/// against; change them only together with those fixtures.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    // Partial / prefix key tiers
    pub exact_key: u32,
    pub scoped_key: u32,
    pub key_prefix: u32,
    pub key_contains: u32,
    pub wildcard: u32,
    pub all_words_base: u32,
    pub some_words_base: u32,
    pub per_word: u32,

    // Free-text description signals
    pub context_exact: u32,
    pub segment_word: u32,
    pub substring_word: u32,
    pub alternative_exact: u32,
    pub alternative_partial: u32,
    pub tag_name: u32,
    pub inner_text_word: u32,
    pub scope_boost: u32,

    /// Runner-up at or above `top * ambiguity_ratio` is ambiguous.
    pub ambiguity_ratio: f64,
    /// How many leading candidates are inspected for features and hints.
    pub ambiguity_window: usize,
    pub suggestions_per_candidate: usize,

    /// Words shorter than this are not significant.
    pub min_word_len: usize,
    /// Inner text must be shorter than this to become a text selector.
    pub text_selector_max_len: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            exact_key: 100,
            scoped_key: 95,
            key_prefix: 90,
            key_contains: 80,
            wildcard: 70,
            all_words_base: 60,
            some_words_base: 40,
            per_word: 5,
            context_exact: 100,
            segment_word: 10,
            substring_word: 5,
            alternative_exact: 100,
            alternative_partial: 30,
            tag_name: 15,
            inner_text_word: 5,
            scope_boost: 20,
            ambiguity_ratio: 0.8,
            ambiguity_window: 3,
            suggestions_per_candidate: 3,
            min_word_len: 3,
            text_selector_max_len: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MappingConfig {
    /// Alternative names kept per element after load-time cleanup.
    pub max_alternative_names: usize,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self { max_alternative_names: 10 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DescryConfig {
    pub mapping_dir: PathBuf,

    #[serde(default)]
    pub matching: MatchConfig,

    #[serde(default)]
    pub mapping: MappingConfig,
}

impl Default for DescryConfig {
    fn default() -> Self {
        Self {
            mapping_dir: PathBuf::from("mappings"),
            matching: MatchConfig::default(),
            mapping: MappingConfig::default(),
        }
    }
}

impl DescryConfig {
    /// Loads `.env`, an optional `descry.{toml,json,yaml}` and `DESCRY_*`
    /// environment variables, later sources winning.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let builder = Config::builder()
            .set_default("mapping_dir", "mappings")?
            .add_source(File::with_name("descry").required(false))
            .add_source(
                Environment::with_prefix("DESCRY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.mapping_dir = crate::path_utils::get_path(&config.mapping_dir.to_string_lossy());

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_weights() {
        let config = MatchConfig::default();
        assert_eq!(config.exact_key, 100);
        assert_eq!(config.scoped_key, 95);
        assert_eq!(config.wildcard, 70);
        assert_eq!(config.scope_boost, 20);
        assert_eq!(config.ambiguity_ratio, 0.8);
        assert_eq!(config.ambiguity_window, 3);
    }

    #[test]
    fn environment_overrides_defaults() {
        // only this test touches DESCRY_* variables
        unsafe {
            std::env::set_var("DESCRY_MAPPING_DIR", "/srv/ui-mappings");
            std::env::set_var("DESCRY_MATCHING__AMBIGUITY_RATIO", "0.9");
            std::env::set_var("DESCRY_MAPPING__MAX_ALTERNATIVE_NAMES", "4");
        }
        let config = DescryConfig::load();
        unsafe {
            std::env::remove_var("DESCRY_MAPPING_DIR");
            std::env::remove_var("DESCRY_MATCHING__AMBIGUITY_RATIO");
            std::env::remove_var("DESCRY_MAPPING__MAX_ALTERNATIVE_NAMES");
        }

        let config = config.unwrap();
        assert_eq!(config.mapping_dir, PathBuf::from("/srv/ui-mappings"));
        assert_eq!(config.matching.ambiguity_ratio, 0.9);
        assert_eq!(config.matching.scope_boost, 20);
        assert_eq!(config.mapping.max_alternative_names, 4);
    }

    #[test]
    fn partial_sections_fall_back_to_defaults() {
        let config: DescryConfig = serde_json::from_str(
            r#"{ "mapping_dir": "fixtures", "matching": { "ambiguity_ratio": 0.9 } }"#,
        )
        .unwrap();
        assert_eq!(config.mapping_dir, PathBuf::from("fixtures"));
        assert_eq!(config.matching.ambiguity_ratio, 0.9);
        assert_eq!(config.matching.exact_key, 100);
        assert_eq!(config.mapping.max_alternative_names, 10);
    }
}
