//! Per-request artifact directories.

use crate::error::Result;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Compressed audio extension written by the synthesizer.
pub const COMPRESSED_EXTENSION: &str = "mp3";

/// A directory `<root>/<request id>/` owned by one chat request.
///
/// Concurrent requests get distinct ids, so their `message_<i>.*` files
/// never collide.
#[derive(Debug)]
pub struct ArtifactWorkspace {
    request_id: Uuid,
    dir: PathBuf,
}

impl ArtifactWorkspace {
    /// Create a fresh request directory under `root`.
    pub async fn create(root: &Path) -> Result<Self> {
        let request_id = Uuid::new_v4();
        let dir = root.join(request_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { request_id, dir })
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `message_<index>.mp3` inside the request directory.
    pub fn compressed_path(&self, index: usize) -> PathBuf {
        self.dir
            .join(format!("message_{index}"))
            .with_extension(COMPRESSED_EXTENSION)
    }

    /// Delete the request directory and everything in it.
    pub async fn remove(self) -> Result<()> {
        tokio::fs::remove_dir_all(&self.dir).await?;
        Ok(())
    }
}
