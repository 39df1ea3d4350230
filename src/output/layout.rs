//! Batch file naming

use crate::error::OutputError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the batch files for one destination live
///
/// For a base `D/N` the batches go to `D/N_batches/N_<i>.jsonl`, with
/// 1-based `i`. A base without a directory part lands under `.`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLayout {
    dir: PathBuf,
    stem: String,
}

impl BatchLayout {
    /// Compute the layout without touching the filesystem
    pub fn new(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        let parent = match base.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "results".to_string());

        Self {
            dir: parent.join(format!("{}_batches", stem)),
            stem,
        }
    }

    /// Compute the layout and create its batch directory
    pub fn from_base(base: impl AsRef<Path>) -> Result<Self, OutputError> {
        let layout = Self::new(base);
        std::fs::create_dir_all(&layout.dir).map_err(|source| OutputError::CreateDir {
            path: layout.dir.clone(),
            source,
        })?;
        info!(dir = %layout.dir.display(), "Batch output directory ready");
        Ok(layout)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File for the 0-based batch `index`
    pub fn batch_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}_{}.jsonl", self.stem, index + 1))
    }
}
