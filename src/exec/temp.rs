use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use tempfile::{NamedTempFile, TempPath};

use crate::foundation::error::MagickResult;

/// A temporary file that is deleted once the last argument list referencing it is dropped.
pub type ScopedFile = Arc<TempPath>;

/// Creates the temporary files handed to the tool (profiles, loaded blobs, save targets).
#[derive(Clone, Debug, Default)]
pub struct TempStore {
    dir: Option<PathBuf>,
}

impl TempStore {
    /// Store rooted at `dir`, or at the system temp dir when `None`.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Create an empty temporary file; removed when the returned handle drops.
    pub fn create(&self, prefix: &str, suffix: &str) -> MagickResult<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(suffix);
        let file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .with_context(|| format!("failed to create temporary file '{prefix}*{suffix}'"))?;
        Ok(file)
    }

    /// Create a temporary file holding `bytes` and hand back its shared, self-deleting path.
    pub fn write(&self, prefix: &str, bytes: &[u8]) -> MagickResult<ScopedFile> {
        let mut file = self.create(prefix, "")?;
        file.write_all(bytes)
            .and_then(|()| file.flush())
            .with_context(|| format!("failed to write temporary file '{}'", file.path().display()))?;
        Ok(Arc::new(file.into_temp_path()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/exec/temp.rs"]
mod tests;
