//! Upload Store
//!
//! Writes validated files below the upload root and removes them again.
//! Every path handed out by [`UploadStore::store`] has the form
//! `/uploads/{folder}/{name}` and is the only kind of path
//! [`UploadStore::delete`] will act on.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::content::{detect_mime, verify_content};
use super::error::{UploadError, UploadResult};
use super::form::IncomingFile;
use super::policy::{UploadCategory, UploadFolder};
use super::sanitize::generate_secure_filename;
use super::validate::validate_upload;

/// Public URL prefix for stored files.
pub const PUBLIC_PREFIX: &str = "/uploads/";

/// File mode for stored uploads: owner read/write, everyone else read.
#[cfg(unix)]
const FILE_MODE: u32 = 0o644;

/// Filesystem-backed store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: Arc<PathBuf>,
}

impl UploadStore {
    /// Creates a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }

    /// Upload root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates, verifies and persists `file`.
    ///
    /// `prefix` defaults to the folder name. Returns the public path of the
    /// stored file. Existing files are never overwritten.
    #[tracing::instrument(skip_all, fields(folder = %folder, category = category.as_str()))]
    pub async fn store(
        &self,
        file: &IncomingFile,
        folder: UploadFolder,
        category: UploadCategory,
        prefix: Option<&str>,
    ) -> UploadResult<String> {
        let validated = validate_upload(Some(&file.meta()), category).inspect_err(|e| {
            debug!(error = %e, filename = ?file.name, "Upload rejected by policy");
        })?;

        if !verify_content(&file.bytes, &file.mime_type) {
            warn!(
                target: "security",
                filename = %validated.sanitized_filename,
                declared_mime = %file.mime_type,
                detected_mime = detect_mime(&file.bytes).unwrap_or("unknown"),
                size = file.bytes.len(),
                folder = %folder,
                "Upload content does not match declared type"
            );
            return Err(UploadError::ContentMismatch);
        }

        let dir = self.root.join(folder.as_str());
        fs::create_dir_all(&dir).await?;

        let prefix = prefix.unwrap_or_else(|| folder.as_str());
        let filename = generate_secure_filename(&validated.sanitized_filename, Some(prefix));
        let path = dir.join(&filename);

        write_new_file(&path, &file.bytes).await?;

        info!(
            filename = %filename,
            original = %validated.sanitized_filename,
            size = file.bytes.len(),
            "File stored"
        );

        Ok(format!("{PUBLIC_PREFIX}{folder}/{filename}"))
    }

    /// Deletes a previously stored file by its public path.
    ///
    /// Missing files are not an error. Paths that resolve outside the
    /// upload root fail with [`UploadError::PathTraversal`]; directories
    /// inside it fail with [`UploadError::NotAFile`].
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, public_path: &str) -> UploadResult<()> {
        let target = self.resolve(public_path)?;

        match fs::symlink_metadata(&target).await {
            Ok(meta) if meta.is_dir() => return Err(UploadError::NotAFile),
            Ok(_) => self.ensure_inside_root(&target).await?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %public_path, "File already absent");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        match fs::remove_file(&target).await {
            Ok(()) => {
                info!(path = %public_path, "File deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a file that a record no longer references.
    ///
    /// Only acts on managed `/uploads/` paths; external URLs are left alone.
    /// Failures are logged, since the record change has already happened.
    pub async fn discard(&self, public_path: Option<&str>) {
        let Some(path) = public_path.filter(|p| p.starts_with(PUBLIC_PREFIX)) else {
            return;
        };
        if let Err(e) = self.delete(path).await {
            warn!(path = %path, error = %e, "Failed to remove unreferenced upload");
        }
    }

    /// Discards `old` when an update replaced it with a different value.
    pub async fn discard_replaced(&self, old: Option<&str>, new: Option<&str>) {
        if new.is_some() && new != old {
            self.discard(old).await;
        }
    }

    /// Maps a public path to a location under the root, lexically.
    ///
    /// The leading slash of `/uploads/` is optional.
    fn resolve(&self, public_path: &str) -> UploadResult<PathBuf> {
        let relative = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .or_else(|| public_path.strip_prefix(&PUBLIC_PREFIX[1..]))
            .ok_or(UploadError::PathTraversal)?;

        let mut normalized = PathBuf::new();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(UploadError::PathTraversal);
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(UploadError::PathTraversal);
                }
            }
        }

        if normalized.as_os_str().is_empty() {
            return Err(UploadError::NotAFile);
        }

        Ok(self.root.join(normalized))
    }

    /// Rejects targets whose parent escapes the root through symlinks.
    async fn ensure_inside_root(&self, target: &Path) -> UploadResult<()> {
        let root = fs::canonicalize(self.root.as_path()).await?;
        let parent = target.parent().ok_or(UploadError::PathTraversal)?;
        let parent = fs::canonicalize(parent).await?;

        if parent.starts_with(&root) {
            Ok(())
        } else {
            warn!(
                target: "security",
                path = %target.display(),
                "Upload path escapes the upload root"
            );
            Err(UploadError::PathTraversal)
        }
    }
}

/// Creates `path` exclusively and writes `bytes`, removing partial output
/// on failure.
async fn write_new_file(path: &Path, bytes: &[u8]) -> UploadResult<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(FILE_MODE);

    let mut file = match options.open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            warn!(path = %path.display(), "Generated upload name collided");
            return Err(UploadError::AlreadyExists);
        }
        Err(e) => return Err(e.into()),
    };

    let written = async {
        file.write_all(bytes).await?;
        file.sync_all().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %cleanup, "Failed to remove partial upload");
        }
        return Err(e.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use regex::Regex;
    use tempfile::TempDir;

    use super::*;

    fn jpeg(size: usize) -> Bytes {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
        data.resize(size, 0x42);
        Bytes::from(data)
    }

    fn incoming(name: &str, mime_type: &str, bytes: Bytes) -> IncomingFile {
        IncomingFile {
            name: Some(name.to_string()),
            mime_type: mime_type.to_string(),
            bytes,
        }
    }

    fn on_disk(store: &UploadStore, public_path: &str) -> PathBuf {
        store
            .root()
            .join(public_path.strip_prefix(PUBLIC_PREFIX).unwrap())
    }

    #[tokio::test]
    async fn test_store_returns_public_path() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path());
        let file = incoming("dangerous../../name.jpg", "image/jpeg", jpeg(2 * 1024 * 1024));

        let url = store
            .store(&file, UploadFolder::Team, UploadCategory::Image, None)
            .await
            .unwrap();

        let pattern = Regex::new(r"^/uploads/team/team-\d+-[0-9a-f]{32}\.jpg$").unwrap();
        assert!(pattern.is_match(&url), "unexpected path: {url}");

        let written = std::fs::read(on_disk(&store, &url)).unwrap();
        assert_eq!(written.len(), 2 * 1024 * 1024);
        assert_eq!(&written[..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_store_uses_custom_prefix() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path());
        let file = incoming("receipt.jpg", "image/jpeg", jpeg(64));

        let url = store
            .store(
                &file,
                UploadFolder::PaymentProofs,
                UploadCategory::Image,
                Some("donation"),
            )
            .await
            .unwrap();
        assert!(url.starts_with("/uploads/payment-proofs/donation-"));
    }

    #[tokio::test]
    async fn test_same_name_twice_gives_distinct_files() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path());
        let first = incoming("photo.jpg", "image/jpeg", jpeg(32));
        let mut second_bytes = jpeg(32).to_vec();
        second_bytes[10] = 0x01;
        let second = incoming("photo.jpg", "image/jpeg", Bytes::from(second_bytes.clone()));

        let a = store
            .store(&first, UploadFolder::General, UploadCategory::Image, None)
            .await
            .unwrap();
        let b = store
            .store(&second, UploadFolder::General, UploadCategory::Image, None)
            .await
            .unwrap();

        assert_ne!(a, b);
        assert_eq!(std::fs::read(on_disk(&store, &a)).unwrap(), jpeg(32).to_vec());
        assert_eq!(std::fs::read(on_disk(&store, &b)).unwrap(), second_bytes);
    }

    #[tokio::test]
    async fn test_spoofed_content_is_rejected_and_not_written() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path());
        let file = incoming(
            "innocent.jpg",
            "image/jpeg",
            Bytes::from_static(b"<?php system($_GET['c']); ?>"),
        );

        let err = store
            .store(&file, UploadFolder::News, UploadCategory::Image, None)
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::ContentMismatch));
        assert!(!dir.path().join("news").exists());
    }

    #[tokio::test]
    async fn test_policy_failure_surfaces_validation_message() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path());
        let file = incoming("cv.pdf", "application/pdf", Bytes::from_static(b"%PDF-1.4"));

        let err = store
            .store(&file, UploadFolder::General, UploadCategory::Image, None)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid file extension"));
    }

    #[tokio::test]
    async fn test_document_upload() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path());
        let file = incoming("Annual Report.PDF", "application/pdf", Bytes::from_static(b"%PDF-1.4 body"));

        let url = store
            .store(&file, UploadFolder::Programs, UploadCategory::Document, None)
            .await
            .unwrap();
        assert!(url.ends_with(".pdf"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stored_file_is_not_group_writable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path());
        let file = incoming("photo.jpg", "image/jpeg", jpeg(16));
        let url = store
            .store(&file, UploadFolder::Team, UploadCategory::Image, None)
            .await
            .unwrap();

        let mode = std::fs::metadata(on_disk(&store, &url))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o022, 0);
        assert_eq!(mode & 0o111, 0);
    }

    #[tokio::test]
    async fn test_existing_file_is_never_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taken.jpg");
        std::fs::write(&path, b"original").unwrap();

        let err = write_new_file(&path, b"replacement").await.unwrap_err();
        assert!(matches!(err, UploadError::AlreadyExists));
        assert_eq!(std::fs::read(&path).unwrap(), b"original");
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path());
        let file = incoming("photo.jpg", "image/jpeg", jpeg(16));
        let url = store
            .store(&file, UploadFolder::Events, UploadCategory::Image, None)
            .await
            .unwrap();

        store.delete(&url).await.unwrap();
        assert!(!on_disk(&store, &url).exists());
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path());

        assert!(store.delete("/uploads/general/nonexistent.jpg").await.is_ok());
        assert!(store.delete("/uploads/general/nonexistent.jpg").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("uploads");
        std::fs::create_dir_all(&root).unwrap();
        let outside = dir.path().join("secret.txt");
        std::fs::write(&outside, b"keep me").unwrap();
        let store = UploadStore::new(&root);

        for path in [
            "/uploads/../secret.txt",
            "/uploads/../../etc/passwd",
            "/uploads/team/../../secret.txt",
            "/etc/passwd",
            "uploads/../secret.txt",
            "/uploads/..",
            "/uploads//etc/passwd",
        ] {
            let err = store.delete(path).await.unwrap_err();
            assert!(
                matches!(err, UploadError::PathTraversal),
                "{path} should be rejected"
            );
        }
        assert!(outside.exists());
    }

    #[tokio::test]
    async fn test_delete_accepts_path_without_leading_slash() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path());
        let file = incoming("photo.jpg", "image/jpeg", jpeg(16));
        let url = store
            .store(&file, UploadFolder::Team, UploadCategory::Image, None)
            .await
            .unwrap();

        store.delete(url.trim_start_matches('/')).await.unwrap();
        assert!(!on_disk(&store, &url).exists());
        assert!(store.delete("uploads/team/x.jpg").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_rejects_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("team")).unwrap();
        let store = UploadStore::new(dir.path());

        for path in ["/uploads/team", "/uploads/team/", "/uploads/", "/uploads/."] {
            let err = store.delete(path).await.unwrap_err();
            assert!(matches!(err, UploadError::NotAFile), "{path}: {err:?}");
        }
        assert!(dir.path().join("team").is_dir());
    }

    #[tokio::test]
    async fn test_delete_allows_inner_parent_segments() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path());
        let file = incoming("photo.jpg", "image/jpeg", jpeg(16));
        let url = store
            .store(&file, UploadFolder::Team, UploadCategory::Image, None)
            .await
            .unwrap();
        let name = url.rsplit('/').next().unwrap();

        store
            .delete(&format!("/uploads/news/../team/{name}"))
            .await
            .unwrap();
        assert!(!on_disk(&store, &url).exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_delete_rejects_symlink_escape() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("uploads");
        let outside = dir.path().join("outside");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&outside).unwrap();
        std::fs::write(outside.join("victim.txt"), b"keep me").unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();
        let store = UploadStore::new(&root);

        let err = store.delete("/uploads/link/victim.txt").await.unwrap_err();
        assert!(matches!(err, UploadError::PathTraversal));
        assert!(outside.join("victim.txt").exists());
    }

    #[tokio::test]
    async fn test_discard_ignores_external_urls() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path());

        store.discard(Some("https://cdn.example.org/image.jpg")).await;
        store.discard(None).await;
        store.discard(Some("/uploads/../../etc/passwd")).await;
    }

    #[tokio::test]
    async fn test_discard_replaced_only_when_changed() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path());
        let file = incoming("cover.jpg", "image/jpeg", jpeg(128));
        let url = store
            .store(&file, UploadFolder::News, UploadCategory::Image, None)
            .await
            .unwrap();

        store.discard_replaced(Some(&url), None).await;
        store.discard_replaced(Some(&url), Some(&url)).await;
        assert!(on_disk(&store, &url).exists());

        store
            .discard_replaced(Some(&url), Some("/uploads/news/other.jpg"))
            .await;
        assert!(!on_disk(&store, &url).exists());
    }
}
