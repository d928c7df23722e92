use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::models::{error::Error, media::MediaKind};

/// Physical side of media references. The ranked list only hands over
/// reference strings it no longer points at.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn release(&self, kind: MediaKind, reference: &str) -> Result<(), Error>;
}

/// Media files laid out under a root directory, photos in `img/news/` and
/// videos in `video/`.
pub struct DiskMediaStore {
    root: PathBuf,
}

impl DiskMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, kind: MediaKind, reference: &str) -> Result<PathBuf, Error> {
        let relative = Path::new(reference);
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if reference.is_empty() || !plain {
            return Err(Error::Validation(format!(
                "Refusing to touch media reference '{reference}'"
            )));
        }
        Ok(self.root.join(kind.directory()).join(relative))
    }
}

#[async_trait]
impl MediaStore for DiskMediaStore {
    async fn release(&self, kind: MediaKind, reference: &str) -> Result<(), Error> {
        let path = self.path_for(kind, reference)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Released {kind} {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Media file {} already gone", path.display());
                Ok(())
            }
            Err(e) => Err(Error::Internal(format!(
                "Failed to remove {}: {e}",
                path.display()
            ))),
        }
    }
}
