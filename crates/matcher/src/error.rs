use descry_mapping::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("No element matches \"{query}\"")]
    NotFound { query: String },
    #[error(
        "\"{query}\" matches elements in several features ({}); retry with a scope",
        .features.join(", ")
    )]
    AmbiguousAcrossFeatures { query: String, features: Vec<String> },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A wildcard query that does not compile. Scored as no match.
#[derive(Error, Debug)]
#[error("Invalid wildcard pattern \"{pattern}\": {source}")]
pub struct InvalidPattern {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}
