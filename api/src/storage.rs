//! Local disk storage for uploaded videos.
//!
//! Files live flat under one upload directory and are named
//! `{id}-{original name}` so listings sort by upload time.

use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the upload directory if missing.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// File name a video is stored under.
    pub fn stored_name(id: &str, original_name: &str) -> String {
        format!("{}-{}", id, sanitize_file_name(original_name))
    }

    /// Path as reported to clients (`{upload dir}/{file name}`).
    pub fn display_path(&self, file_name: &str) -> String {
        self.root.join(file_name).to_string_lossy().into_owned()
    }

    /// Write `data` under `file_name`, creating the directory on demand.
    pub async fn save(&self, file_name: &str, data: &[u8]) -> io::Result<PathBuf> {
        self.ensure_dir().await?;
        let full_path = self.root.join(file_name);
        tokio::fs::write(&full_path, data).await?;
        Ok(full_path)
    }

    /// Resolve a client-supplied relative path to an existing file inside the
    /// upload directory. Returns `None` for traversal attempts and for files
    /// that do not exist.
    pub async fn resolve(&self, relative: &str) -> Option<PathBuf> {
        if relative.contains('\0') || !is_plain_relative(relative) {
            return None;
        }

        let full_path = self.root.join(relative);
        let canonical = tokio::fs::canonicalize(&full_path).await.ok()?;
        let root = tokio::fs::canonicalize(&self.root).await.ok()?;
        if !canonical.starts_with(&root) {
            return None;
        }

        let meta = tokio::fs::metadata(&canonical).await.ok()?;
        meta.is_file().then_some(canonical)
    }

    pub async fn open(&self, file_name: &str) -> io::Result<tokio::fs::File> {
        let Some(path) = self.resolve(file_name).await else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a stored upload", file_name),
            ));
        };
        tokio::fs::File::open(path).await
    }
}

fn is_plain_relative(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

/// Keep only the final path component and replace anything outside
/// `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "video".to_string()
    } else {
        cleaned
    }
}
