pub mod preferences;
pub mod session;

pub use preferences::PreferenceStore;
pub use session::{SessionStore, StoredAnalysis};

use anyhow::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `contents` to `target_path` atomically.
///
/// The data goes to a temporary file in the target's directory first and is
/// then renamed over the target, so readers never observe a partial file.
pub(crate) fn write_atomic(target_path: &Path, contents: &[u8]) -> Result<()> {
    let parent = target_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Target path has no parent directory: {:?}", target_path))?;

    std::fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(contents)?;
    temp.flush()?;
    temp.persist(target_path)?;
    Ok(())
}
