use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;
use uuid::Uuid;

/// Route prefix uploaded files are served back under.
pub const PUBLIC_PREFIX: &str = "/uploads";

pub fn public_url(file_name: &str) -> String {
    format!("{}/{}", PUBLIC_PREFIX, file_name)
}

#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Persist a file body under a generated unique name and return that name.
    async fn save(&self, ext: &str, body: Bytes) -> anyhow::Result<String>;
    async fn remove(&self, file_name: &str) -> anyhow::Result<()>;
}

/// Local-disk implementation. Files land in the configured directory and are
/// served statically from [`PUBLIC_PREFIX`].
pub struct DiskUploads {
    dir: PathBuf,
}

impl DiskUploads {
    pub async fn new(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create upload dir {}", dir.display()))?;
        Ok(Self { dir })
    }
}

#[async_trait]
impl UploadStore for DiskUploads {
    async fn save(&self, ext: &str, body: Bytes) -> anyhow::Result<String> {
        let file_name = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write upload {}", path.display()))?;
        Ok(file_name)
    }

    async fn remove(&self, file_name: &str) -> anyhow::Result<()> {
        let path = self.dir.join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Already gone; records are the source of truth, not the disk.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove upload {}", path.display())),
        }
    }
}

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}
