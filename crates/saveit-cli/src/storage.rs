use anyhow::{Context, Result};
use saveit_core::collection::SaveIt;
use saveit_core::logic::Storage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The collection as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored collection. A missing file is an empty collection.
    pub fn load(&self) -> Result<SaveIt> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no data file yet");
            return Ok(SaveIt::new());
        }

        let bytes = fs::read(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    /// Like [`Self::load`], but a corrupt or unreadable file starts an empty
    /// session instead of failing.
    pub fn load_or_empty(&self) -> SaveIt {
        self.load().unwrap_or_else(|err| {
            warn!(
                error = %format!("{err:#}"),
                "data file unusable, starting with an empty collection"
            );
            SaveIt::new()
        })
    }
}

impl Storage for JsonFileStorage {
    fn save_save_it(&self, save_it: &SaveIt) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(save_it).context("failed to serialize collection")?;

        fs::write(&tmp_path, body)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "failed to atomically move {} to {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        debug!(path = %self.path.display(), issues = save_it.len(), "saved collection");
        Ok(())
    }
}
