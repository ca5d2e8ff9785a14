//! Errors from colour parsing and image export.

use thiserror::Error;

/// A colour string the pad does not understand.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognised colour {0:?}")]
pub struct ColorError(pub String);

/// The surface could not be encoded.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The PNG encoder failed.
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
