//! Image library backed by a directory on disk.
//!
//! Image blocks reference files in this directory by name. The same files are
//! served to browsers under `/images/{name}`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

/// File extensions recognized as images.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

/// Server-managed image collection.
#[derive(Debug, Clone)]
pub struct ImageLibrary {
    dir: PathBuf,
}

impl ImageLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// List image file names, sorted.
    ///
    /// A missing directory is an empty library, not an error.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(dir = %self.dir.display(), "image directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read image directory {}", self.dir.display())
                });
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .context("failed to read image directory entry")?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if is_file && is_image_name(&name) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    /// Resolve a name to a file inside the library, if it exists.
    pub async fn resolve(&self, name: &str) -> Option<PathBuf> {
        if !is_image_name(name) {
            return None;
        }
        let path = self.dir.join(name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(path),
            _ => None,
        }
    }

    /// Whether an image with this name exists.
    pub async fn contains(&self, name: &str) -> bool {
        self.resolve(name).await.is_some()
    }
}

/// A bare file name (no path components) with an image extension.
fn is_image_name(name: &str) -> bool {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.contains("..")
    {
        return false;
    }

    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Content type for an image path.
pub fn mime_from_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
