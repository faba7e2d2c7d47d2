use chrono::{DateTime, Local, Utc};
use image::{ImageFormat, RgbImage};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::{Category, Config, FileNaming};

/// Tracing target for the activity log sink.
pub const ACTIVITY: &str = "activity";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Writes snapshots into one directory per [`Category`].
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    motion_dir: PathBuf,
    face_dir: PathBuf,
    naming: FileNaming,
}

impl SnapshotStore {
    pub fn new(motion_dir: impl Into<PathBuf>, face_dir: impl Into<PathBuf>, naming: FileNaming) -> Self {
        Self {
            motion_dir: motion_dir.into(),
            face_dir: face_dir.into(),
            naming,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.motion_dir, &config.face_dir, config.naming)
    }

    pub fn dir(&self, category: Category) -> &Path {
        match category {
            Category::Motion => &self.motion_dir,
            Category::Face => &self.face_dir,
        }
    }

    /// Create both output directories if they are missing.
    pub fn prepare(&self) -> Result<(), PersistError> {
        for category in Category::ALL {
            let dir = self.dir(category);
            std::fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    /// Path a snapshot taken at `at` is written to.
    ///
    /// Names resolve to the second, so two snapshots in the same second share a path.
    pub fn path_for(&self, category: Category, at: DateTime<Utc>) -> PathBuf {
        let stamp = at.with_timezone(&Local).format(self.naming.pattern());
        self.dir(category).join(format!("{category}_{stamp}.jpg"))
    }

    /// Write `image` as a JPEG and log the event to the activity log.
    pub fn save(
        &self,
        category: Category,
        image: &RgbImage,
        at: DateTime<Utc>,
    ) -> Result<PathBuf, PersistError> {
        let path = self.path_for(category, at);
        image
            .save_with_format(&path, ImageFormat::Jpeg)
            .map_err(|source| PersistError::Write {
                path: path.clone(),
                source,
            })?;
        let label = match category {
            Category::Motion => "Motion",
            Category::Face => "Face",
        };
        info!(target: ACTIVITY, "{label} saved: {}", path.display());
        Ok(path)
    }
}
