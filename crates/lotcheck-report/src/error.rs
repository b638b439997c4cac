use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("logo file not found: {0}")]
    LogoNotFound(PathBuf),

    #[error("unsupported logo image {path}: {reason}")]
    UnsupportedImage { path: PathBuf, reason: String },

    #[error("built-in logo could not be decoded: {0}")]
    DefaultLogo(image::ImageError),

    #[error("report has no rows")]
    Empty,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
