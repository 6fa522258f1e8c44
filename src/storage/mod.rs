use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::config;

/// Disk-backed upload store. Files are renamed to UUIDs on save, grouped
/// into per-purpose buckets, and served under the public prefix by the
/// static-file layer.
pub const BUCKET_PROFILE_PHOTOS: &str = "profile-photos";
pub const BUCKET_GALLERY: &str = "gallery";
pub const BUCKET_HERO_IMAGES: &str = "hero-images";
pub const BUCKET_ANNOUNCEMENTS: &str = "announcements";
pub const BUCKET_TEAM: &str = "team";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("uploaded file has no filename")]
    MissingFilename,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Persist an uploaded image and return its public URL.
pub async fn save(bucket: &str, original_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
    let ext = image_extension(original_name)?;
    let filename = format!("{}.{}", Uuid::new_v4(), ext);

    let dir = Path::new(&config::config().storage.upload_dir).join(bucket);
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join(&filename), bytes).await?;

    Ok(format!(
        "{}/{}/{}",
        config::config().storage.public_prefix,
        bucket,
        filename
    ))
}

/// Delete the stored file behind a public URL. URLs outside the upload
/// prefix (or already-deleted files) are ignored so record deletion never
/// fails on a missing image.
pub async fn remove_by_url(public_url: &str) {
    let Some(path) = disk_path_for_url(public_url) else {
        return;
    };
    if let Err(e) = tokio::fs::remove_file(&path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove stored file {}: {}", path.display(), e);
        }
    }
}

/// Map a public URL back onto its on-disk path. Returns None for URLs that
/// are not under the public prefix or that try to escape the upload tree.
fn disk_path_for_url(public_url: &str) -> Option<PathBuf> {
    let prefix = format!("{}/", config::config().storage.public_prefix);
    let relative = public_url.strip_prefix(&prefix)?;

    let mut parts = relative.splitn(2, '/');
    let bucket = parts.next()?;
    let filename = parts.next()?;
    if bucket.is_empty()
        || filename.is_empty()
        || filename.contains('/')
        || bucket.contains("..")
        || filename.contains("..")
    {
        return None;
    }

    Some(
        Path::new(&config::config().storage.upload_dir)
            .join(bucket)
            .join(filename),
    )
}

fn image_extension(original_name: &str) -> Result<String, StorageError> {
    if original_name.is_empty() {
        return Err(StorageError::MissingFilename);
    }
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| StorageError::UnsupportedType("(none)".to_string()))?;

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(StorageError::UnsupportedType(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_image_extensions_case_insensitively() {
        assert_eq!(image_extension("ride.JPG").unwrap(), "jpg");
        assert_eq!(image_extension("cover.webp").unwrap(), "webp");
    }

    #[test]
    fn rejects_non_images_and_missing_names() {
        assert!(matches!(
            image_extension("payload.exe"),
            Err(StorageError::UnsupportedType(_))
        ));
        assert!(matches!(
            image_extension("noextension"),
            Err(StorageError::UnsupportedType(_))
        ));
        assert!(matches!(
            image_extension(""),
            Err(StorageError::MissingFilename)
        ));
    }

    #[test]
    fn url_mapping_stays_inside_upload_tree() {
        let ok = disk_path_for_url("/uploads/gallery/abc.jpg").unwrap();
        assert!(ok.ends_with("gallery/abc.jpg"));

        assert!(disk_path_for_url("https://elsewhere/img.png").is_none());
        assert!(disk_path_for_url("/uploads/..%2F/etc").is_none());
        assert!(disk_path_for_url("/uploads/gallery/../../etc/passwd").is_none());
        assert!(disk_path_for_url("/uploads/gallery/").is_none());
    }
}
