use std::path::{Path, PathBuf};

use image::DynamicImage;
use uuid::Uuid;

/// Write failure while persisting a normalized raster or thumbnail.
/// Operational rather than user-correctable; the transport maps this
/// to a 5xx.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("cannot prepare artifact directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Id-addressed file layout for processed images.
///
/// Processed raster: `<root>/<id>.png`
/// Thumbnail:        `<root>/thumbnails/<id>_thumb.png`
pub struct ArtifactStore {
    root: PathBuf,
    thumbnails: PathBuf,
}

impl ArtifactStore {
    /// Open the store, creating both directories if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        let thumbnails = root.join("thumbnails");
        for dir in [&root, &thumbnails] {
            std::fs::create_dir_all(dir).map_err(|source| StorageError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(Self { root, thumbnails })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn image_path(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{id}.png"))
    }

    pub fn thumbnail_path(&self, id: Uuid) -> PathBuf {
        self.thumbnails.join(format!("{id}_thumb.png"))
    }

    /// Encode `img` as PNG at `path`. The extension drives the encoder.
    pub fn save_png(&self, img: &DynamicImage, path: &Path) -> Result<(), StorageError> {
        img.save(path).map_err(|source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
