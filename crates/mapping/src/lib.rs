//! Descry Mapping - element records loaded from mapping files
//!
//! This crate is organized into:
//! - types: On-disk record and file shapes (ElementRecord, MappingFile)
//! - loader: Directory scanning, parsing and record cleanup
//! - corpus: The in-memory view handed to the matcher
//! - keys: Key listing for tooling

mod types;
mod loader;
mod corpus;
mod keys;

// Re-export public types
pub use corpus::{Corpus, MappingSource};
pub use keys::{human_description, list_keys, KeyEntry};
pub use loader::MappingLoadError;
pub use types::{ElementRecord, MappingDocument, MappingFile, MappingMetadata};

use async_trait::async_trait;
use descry_core::config::MappingConfig;
use descry_core::path_utils::ensure_absolute;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

/// The mapping directory itself could not be used.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Mapping directory does not exist: {0}")]
    MissingDirectory(PathBuf),
    #[error("Failed to list mapping directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Source of corpora for the matcher.
#[async_trait]
pub trait CorpusProvider: Send + Sync {
    /// Corpus for `dir`, loading it on first use.
    async fn corpus(&self, dir: &Path) -> Result<Arc<Corpus>, StoreError>;

    /// Drops every cached corpus.
    async fn clear(&self);
}

type DirectorySlot = Arc<OnceCell<Arc<Corpus>>>;

/// Process-wide mapping cache. Directories load lazily, once, and stay
/// cached until `clear`.
#[derive(Default)]
pub struct MappingStore {
    config: MappingConfig,
    directories: Mutex<HashMap<PathBuf, DirectorySlot>>,
    files_read: AtomicUsize,
}

impl MappingStore {
    pub fn new(config: MappingConfig) -> Self {
        Self {
            config,
            directories: Mutex::new(HashMap::new()),
            files_read: AtomicUsize::new(0),
        }
    }

    /// Loads every `*.json` file in `dir`. Concurrent callers share one
    /// in-flight load; malformed files are logged and contribute nothing.
    pub async fn load(&self, dir: &Path) -> Result<Arc<Corpus>, StoreError> {
        let dir = ensure_absolute(dir);
        let slot = {
            let mut directories = self.directories.lock().await;
            directories.entry(dir.clone()).or_default().clone()
        };

        slot.get_or_try_init(|| self.read_directory(&dir))
            .await
            .cloned()
    }

    /// Corpus for `dir` if it is already loaded.
    pub async fn get(&self, dir: &Path) -> Option<Arc<Corpus>> {
        let dir = ensure_absolute(dir);
        let directories = self.directories.lock().await;
        directories.get(&dir).and_then(|slot| slot.get().cloned())
    }

    pub async fn clear(&self) {
        let mut directories = self.directories.lock().await;
        let dropped = directories.len();
        directories.clear();
        info!("Mapping cache cleared ({} directories)", dropped);
    }

    /// Scans every cached corpus for `key`.
    pub async fn find_by_exact_key(&self, key: &str, scope: Option<&str>) -> Option<ElementRecord> {
        let directories = self.directories.lock().await;
        let mut loaded: Vec<(&PathBuf, &Arc<Corpus>)> = directories
            .iter()
            .filter_map(|(dir, slot)| slot.get().map(|corpus| (dir, corpus)))
            .collect();
        loaded.sort_by(|a, b| a.0.cmp(b.0));

        loaded
            .into_iter()
            .find_map(|(_, corpus)| corpus.find_by_exact_key(key, scope).cloned())
    }

    /// Number of mapping files read from disk since construction.
    pub fn files_read(&self) -> usize {
        self.files_read.load(Ordering::SeqCst)
    }

    async fn read_directory(&self, dir: &Path) -> Result<Arc<Corpus>, StoreError> {
        let files = loader::scan_directory(dir)?;
        let found = files.len();

        let mut sources = Vec::with_capacity(found);
        let mut failed = 0;
        for path in files {
            self.files_read.fetch_add(1, Ordering::SeqCst);
            match loader::read_mapping_file(&path, &self.config).await {
                Ok(source) => {
                    if let Some(captured) = source.metadata.as_ref().and_then(|m| m.captured_at()) {
                        debug!(
                            "{} captured {} ({} elements)",
                            path.display(),
                            captured.to_rfc3339(),
                            source.elements.len()
                        );
                    }
                    sources.push(source)
                }
                Err(e) => {
                    failed += 1;
                    warn!("⚠️ {}", e);
                }
            }
        }

        let corpus = Corpus::new(dir, sources);
        info!(
            "📂 Loaded {} mapping files from {} ({} failed): {} elements, {} with semantic keys",
            found - failed,
            dir.display(),
            failed,
            corpus.len(),
            corpus.keyed_count()
        );
        Ok(Arc::new(corpus))
    }
}

#[async_trait]
impl CorpusProvider for MappingStore {
    async fn corpus(&self, dir: &Path) -> Result<Arc<Corpus>, StoreError> {
        self.load(dir).await
    }

    async fn clear(&self) {
        MappingStore::clear(self).await
    }
}
