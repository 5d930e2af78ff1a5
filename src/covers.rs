//! Cover image storage
//!
//! Uploaded covers arrive base64-encoded (optionally as a `data:` URL),
//! are size-checked after decoding and written to the covers directory as
//! `book_<id>_<uuid><ext>`. The public path is `/static/covers/<file>`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// URL prefix under which the covers directory is served
pub const COVERS_URL_PREFIX: &str = "/static/covers";

const DEFAULT_EXTENSION: &str = ".jpg";

#[derive(Error, Debug)]
pub enum CoverError {
    #[error("Invalid base64 content")]
    InvalidBase64,

    #[error("Cover file is empty")]
    Empty,

    #[error("Cover file is too large ({size} bytes, max {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Directory-backed cover storage
#[derive(Debug, Clone)]
pub struct CoverStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl CoverStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decode upload content and enforce the size limit
    pub fn decode(&self, content: &str) -> Result<Vec<u8>, CoverError> {
        // Accept "data:image/png;base64,...." as sent by FileReader.readAsDataURL
        let payload = match content.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => content,
        };
        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();

        let bytes = STANDARD
            .decode(cleaned.as_bytes())
            .map_err(|_| CoverError::InvalidBase64)?;
        if bytes.is_empty() {
            return Err(CoverError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(CoverError::TooLarge {
                size: bytes.len(),
                max: self.max_bytes,
            });
        }
        Ok(bytes)
    }

    /// Write a cover for `book_id` and return its public path
    pub async fn save(&self, book_id: i64, filename: &str, bytes: &[u8]) -> Result<String, CoverError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = format!(
            "book_{}_{}{}",
            book_id,
            uuid::Uuid::new_v4().simple(),
            extension_of(filename)
        );
        tokio::fs::write(self.dir.join(&name), bytes).await?;

        tracing::info!(book_id, file = %name, size = bytes.len(), "Stored cover image");
        Ok(format!("{}/{}", COVERS_URL_PREFIX, name))
    }

    /// Best-effort removal of a cover previously returned by `save`
    pub async fn remove(&self, public_path: &str) {
        let Some(name) = public_path
            .strip_prefix(COVERS_URL_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return;
        };
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
            tracing::warn!(file = %name, error = %e, "Failed to remove old cover");
        }
    }
}

/// Lowercased extension with leading dot; `.jpg` when missing or odd
fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("cover.PNG"), ".png");
        assert_eq!(extension_of("photo.jpeg"), ".jpeg");
        assert_eq!(extension_of("noext"), ".jpg");
        assert_eq!(extension_of("weird.p/ng"), ".jpg");
        assert_eq!(extension_of(""), ".jpg");
    }

    #[test]
    fn test_decode_limits() {
        let store = CoverStore::new("/unused", 4);

        assert_eq!(store.decode(&STANDARD.encode([1u8, 2, 3])).unwrap(), vec![1, 2, 3]);
        assert!(matches!(store.decode("!!!not base64"), Err(CoverError::InvalidBase64)));
        assert!(matches!(store.decode(""), Err(CoverError::Empty)));
        assert!(matches!(
            store.decode(&STANDARD.encode([0u8; 5])),
            Err(CoverError::TooLarge { size: 5, max: 4 })
        ));

        let data_url = format!("data:image/png;base64,{}", STANDARD.encode([9u8, 9]));
        assert_eq!(store.decode(&data_url).unwrap(), vec![9, 9]);
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = tempdir().unwrap();
        let store = CoverStore::new(dir.path().join("covers"), 1024);

        let public = store.save(7, "front.png", b"png-bytes").await.unwrap();
        assert!(public.starts_with("/static/covers/book_7_"));
        assert!(public.ends_with(".png"));

        let name = public.rsplit('/').next().unwrap();
        let on_disk = dir.path().join("covers").join(name);
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"png-bytes");

        store.remove(&public).await;
        assert!(!on_disk.exists());

        // Paths outside the covers prefix are ignored
        store.remove("/etc/passwd").await;
        store.remove("/static/covers/../secret").await;
    }
}
