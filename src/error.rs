use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while selecting, flattening or annotating a Youku split.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Video {video} not found at {path}")]
    MissingVideo { video: String, path: PathBuf },

    #[error("Destination {0} already exists")]
    DestinationExists(PathBuf),

    #[error("Video {0} is listed more than once in the manifest")]
    DuplicateVideo(String),

    #[error("Filename {0} is supposed to be an integer")]
    FilenameNotInteger(String),

    #[error("Frame {frame} for mask {mask} not found")]
    MissingFrame { mask: PathBuf, frame: PathBuf },

    #[error("Mask {mask} of video {video} has no frame with the same name")]
    UnpairedMask { video: String, mask: PathBuf },

    #[error("Pool {dir} is not contiguous: expected index {expected}")]
    PoolGap { dir: PathBuf, expected: u64 },

    #[error("Category id {0} is not part of the configured taxonomy")]
    UnknownCategory(u32),

    #[error("Failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to decode mask {path}: {source}")]
    Png {
        path: PathBuf,
        #[source]
        source: png::DecodingError,
    },

    #[error("Mask {path} is {layout}, expected a palette or grayscale PNG")]
    UnsupportedMask { path: PathBuf, layout: String },

    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attach the offending path to an `std::io::Error`.
pub(crate) trait IoContext<T> {
    fn with_path(self, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn with_path(self, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
