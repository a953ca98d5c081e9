//! Bundled sample images users can analyze without uploading their own.

use std::path::Path;

use crate::api::ImagePayload;
use crate::error::{NailedItError, Result};

/// Shown first in the gallery.
pub const FEATURED_SAMPLES: [&str; 2] = ["test.jpg", "testing.png"];

/// Numbered samples `192.jpg` through `255.jpg`.
pub fn numbered_samples() -> Vec<String> {
    (192..=255).map(|i| format!("{}.jpg", i)).collect()
}

/// Featured samples followed by the numbered range.
pub fn all_samples() -> Vec<String> {
    FEATURED_SAMPLES
        .iter()
        .map(|s| s.to_string())
        .chain(numbered_samples())
        .collect()
}

/// Load a sample from `samples_dir` as an image payload.
pub fn load_sample(samples_dir: &Path, name: &str) -> Result<ImagePayload> {
    if name.contains('/') || name.contains('\\') || name == ".." {
        return Err(NailedItError::InvalidInput(format!(
            "'{}' is not a sample name",
            name
        )));
    }
    ImagePayload::from_path(&samples_dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_numbered_range() {
        let samples = numbered_samples();
        assert_eq!(samples.len(), 64);
        assert_eq!(samples.first().map(String::as_str), Some("192.jpg"));
        assert_eq!(samples.last().map(String::as_str), Some("255.jpg"));
    }

    #[test]
    fn test_all_samples_lists_featured_first() {
        let samples = all_samples();
        assert_eq!(samples.len(), 66);
        assert_eq!(samples[0], "test.jpg");
        assert_eq!(samples[1], "testing.png");
        assert_eq!(samples[2], "192.jpg");
    }

    #[test]
    fn test_load_sample() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("test.jpg"), b"\xFF\xD8\xFF\xE0\0\x10JFIF").unwrap();

        let payload = load_sample(dir.path(), "test.jpg").unwrap();
        assert_eq!(payload.file_name(), "test.jpg");
        assert_eq!(payload.content_type(), "image/jpeg");
    }

    #[test]
    fn test_load_sample_rejects_paths() {
        let dir = TempDir::new().unwrap();
        let result = load_sample(dir.path(), "../secret.jpg");
        assert!(matches!(result, Err(NailedItError::InvalidInput(_))));
    }
}
