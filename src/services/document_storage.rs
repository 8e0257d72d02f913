use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::error::{Error, Result};

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "pdf"];
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Verification document files on local disk under `<root>/documents`.
#[derive(Debug, Clone)]
pub struct DocumentStorage {
    root: PathBuf,
}

impl DocumentStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn directory(&self) -> PathBuf {
        self.root.join("documents")
    }

    /// Checks extension and magic bytes, then writes under a fresh name.
    /// Returns the stored path.
    pub async fn save(&self, filename: &str, data: &[u8]) -> Result<String> {
        if data.is_empty() {
            return Err(Error::BadRequest("Uploaded file is empty".into()));
        }
        if data.len() > MAX_DOCUMENT_BYTES {
            return Err(Error::BadRequest("Uploaded file is too large".into()));
        }

        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(Error::BadRequest(format!("File type .{} is not allowed", ext)));
        }
        check_magic_bytes(&ext, data)?;

        let dir = self.directory();
        fs::create_dir_all(&dir).await?;
        let file_path = dir.join(format!("{}.{}", Uuid::new_v4(), ext));
        fs::write(&file_path, data).await.map_err(|e| {
            tracing::error!(path = %file_path.display(), error = %e, "failed to write document");
            Error::Internal("Failed to save file".into())
        })?;

        Ok(file_path.to_string_lossy().into_owned())
    }

    /// Deletes a stored document. A file that is already gone counts as deleted.
    pub async fn remove(&self, path: &str) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path, "document already absent");
                Ok(())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }
}

fn check_magic_bytes(ext: &str, data: &[u8]) -> Result<()> {
    let ok = match ext {
        "pdf" => data.starts_with(b"%PDF"),
        "jpg" | "jpeg" => data.starts_with(&[0xFF, 0xD8]),
        "png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
        "webp" => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(Error::BadRequest(format!("Invalid .{} file content", ext)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> DocumentStorage {
        DocumentStorage::new(std::env::temp_dir().join(format!("bagoscout-{}", Uuid::new_v4())))
    }

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];

    #[tokio::test]
    async fn saves_and_removes_png() {
        let storage = scratch();
        let path = storage.save("face.PNG", PNG).await.unwrap();
        assert!(path.ends_with(".png"));
        assert!(fs::metadata(&path).await.is_ok());

        storage.remove(&path).await.unwrap();
        assert!(fs::metadata(&path).await.is_err());
    }

    #[tokio::test]
    async fn removing_a_missing_file_succeeds() {
        let storage = scratch();
        let missing = storage.directory().join("gone.png");
        tokio_test::assert_ok!(storage.remove(&missing.to_string_lossy()).await);
    }

    #[tokio::test]
    async fn rejects_disguised_and_disallowed_files() {
        let storage = scratch();
        tokio_test::assert_err!(storage.save("id.pdf", b"not a pdf").await);
        tokio_test::assert_err!(storage.save("id.exe", b"MZ").await);
        tokio_test::assert_err!(storage.save("id.png", b"").await);
    }
}
