use crate::corpus::MappingSource;
use crate::types::{ElementRecord, MappingDocument, MappingMetadata};
use crate::StoreError;
use descry_core::config::MappingConfig;
use descry_core::path_utils::is_mapping_file;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

/// Shortest alternative name worth keeping.
const MIN_ALTERNATIVE_LEN: usize = 3;

/// A single mapping file could not be used. Recovered by the store: the file
/// contributes no elements.
#[derive(Error, Debug)]
pub enum MappingLoadError {
    #[error("Failed to read mapping file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed mapping file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Lists `*.json` files directly inside `dir`, sorted by file name.
pub(crate) fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    if !dir.is_dir() {
        return Err(StoreError::MissingDirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| StoreError::ReadDirectory {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && is_mapping_file(path) {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

pub(crate) async fn read_mapping_file(
    path: &Path,
    config: &MappingConfig,
) -> Result<MappingSource, MappingLoadError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| MappingLoadError::Read { path: path.to_path_buf(), source })?;
    parse_mapping(path, &content, config)
}

pub(crate) fn parse_mapping(
    path: &Path,
    content: &str,
    config: &MappingConfig,
) -> Result<MappingSource, MappingLoadError> {
    let document: MappingDocument = serde_json::from_str(content)
        .map_err(|source| MappingLoadError::Parse { path: path.to_path_buf(), source })?;
    let (metadata, elements) = document.into_parts();

    let elements: Vec<ElementRecord> = elements
        .into_iter()
        .map(|record| sanitize(record, metadata.as_ref(), config))
        .collect();

    warn_duplicate_keys(path, &elements);

    Ok(MappingSource {
        path: path.to_path_buf(),
        metadata,
        elements,
    })
}

/// Normalizes a record in place of the producer's guarantees: lowercase tag,
/// derivable xpath, cleaned alternative names, metadata-inherited scope.
fn sanitize(
    mut record: ElementRecord,
    metadata: Option<&MappingMetadata>,
    config: &MappingConfig,
) -> ElementRecord {
    record.tag_name = record.tag_name.trim().to_lowercase();

    if record.xpath.trim().is_empty() {
        let tag = if record.tag_name.is_empty() { "*" } else { record.tag_name.as_str() };
        record.xpath = format!("//{}", tag);
    }

    let mut seen = HashSet::new();
    record.alternative_names = record
        .alternative_names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| name.chars().count() >= MIN_ALTERNATIVE_LEN)
        .filter(|name| seen.insert(name.to_lowercase()))
        .take(config.max_alternative_names)
        .collect();

    if let Some(meta) = metadata {
        if record.feature().is_none() {
            record.feature_name = meta.feature_name.clone().filter(|f| !f.is_empty());
        }
        if record.url.is_none() {
            record.url = meta.url.clone();
        }
    }

    record
}

fn warn_duplicate_keys(path: &Path, elements: &[ElementRecord]) {
    let mut seen = HashSet::new();
    for key in elements.iter().filter_map(ElementRecord::key) {
        if !seen.insert(key) {
            warn!("Duplicate semantic key \"{}\" in {}", key, path.display());
        }
    }
}
