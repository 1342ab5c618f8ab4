use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

/// Image formats accepted for battler pictures, with the stored extension.
const ALLOWED: [(&str, &str); 3] = [
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/webp", "webp"),
];

/// Local object storage for uploaded images, served under `/images`.
pub struct ImageService {
    images_dir: PathBuf,
    max_bytes: usize,
}

impl ImageService {
    #[must_use]
    pub fn new(images_path: &str, max_bytes: usize) -> Self {
        Self {
            images_dir: PathBuf::from(images_path),
            max_bytes,
        }
    }

    /// Resolves the stored extension from a content type, falling back to a
    /// guess from the client's file name.
    #[must_use]
    pub fn extension_for(content_type: Option<&str>, file_name: Option<&str>) -> Option<&'static str> {
        let essence = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .filter(|ct| ct != "application/octet-stream")
            .or_else(|| {
                file_name.map(|name| mime_guess::from_path(name).first_or_octet_stream().to_string())
            })?;

        ALLOWED
            .iter()
            .find(|(mime, _)| *mime == essence)
            .map(|(_, ext)| *ext)
    }

    /// Writes the image for a battler and returns the stored file name.
    pub async fn save_battler_image(
        &self,
        battler_id: i32,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String> {
        if bytes.is_empty() {
            bail!("Image body is empty");
        }
        if bytes.len() > self.max_bytes {
            bail!(
                "Image is {} bytes, the limit is {} bytes",
                bytes.len(),
                self.max_bytes
            );
        }

        if !self.images_dir.exists() {
            fs::create_dir_all(&self.images_dir).await?;
        }

        let filename = format!("battler_{battler_id}.{extension}");
        let file_path = self.images_dir.join(&filename);

        // Drop images stored under another extension
        for (_, ext) in ALLOWED {
            if ext != extension {
                let stale = self.images_dir.join(format!("battler_{battler_id}.{ext}"));
                if stale.exists() {
                    fs::remove_file(&stale).await.ok();
                }
            }
        }

        fs::write(&file_path, bytes)
            .await
            .with_context(|| format!("Failed to write image to {}", file_path.display()))?;

        info!(battler_id, path = %file_path.display(), size = bytes.len(), "Stored battler image");
        Ok(filename)
    }

    /// Removes every stored image of a battler. Returns how many files were deleted.
    pub async fn remove_battler_image(&self, battler_id: i32) -> Result<usize> {
        let mut removed = 0;
        for (_, ext) in ALLOWED {
            let path = self.images_dir.join(format!("battler_{battler_id}.{ext}"));
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to remove {}", path.display()));
                }
            }
        }

        if removed > 0 {
            info!(battler_id, removed, "Removed battler image");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_from_content_type() {
        assert_eq!(ImageService::extension_for(Some("image/png"), None), Some("png"));
        assert_eq!(
            ImageService::extension_for(Some("image/jpeg; charset=binary"), None),
            Some("jpg")
        );
        assert_eq!(ImageService::extension_for(Some("image/gif"), None), None);
    }

    #[test]
    fn test_extension_guessed_from_file_name() {
        assert_eq!(ImageService::extension_for(None, Some("face.webp")), Some("webp"));
        assert_eq!(
            ImageService::extension_for(Some("application/octet-stream"), Some("face.jpeg")),
            Some("jpg")
        );
        assert_eq!(ImageService::extension_for(None, Some("notes.txt")), None);
        assert_eq!(ImageService::extension_for(None, None), None);
    }

    #[tokio::test]
    async fn test_save_enforces_size_limit() {
        let dir = std::env::temp_dir().join(format!("barscore-img-{}", uuid::Uuid::new_v4()));
        let service = ImageService::new(dir.to_str().unwrap(), 4);

        assert!(service.save_battler_image(1, "png", b"12345").await.is_err());
        assert!(service.save_battler_image(1, "png", b"").await.is_err());

        let name = service.save_battler_image(1, "png", b"1234").await.unwrap();
        assert_eq!(name, "battler_1.png");
        assert!(dir.join(&name).exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_remove_battler_image() {
        let dir = std::env::temp_dir().join(format!("barscore-img-{}", uuid::Uuid::new_v4()));
        let service = ImageService::new(dir.to_str().unwrap(), 16);

        service.save_battler_image(7, "webp", b"webp").await.unwrap();
        service.save_battler_image(8, "png", b"png").await.unwrap();

        assert_eq!(service.remove_battler_image(7).await.unwrap(), 1);
        assert!(!dir.join("battler_7.webp").exists());
        assert!(dir.join("battler_8.png").exists());

        // Nothing left to remove
        assert_eq!(service.remove_battler_image(7).await.unwrap(), 0);

        std::fs::remove_dir_all(&dir).ok();
    }
}
