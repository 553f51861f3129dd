use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or reading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// `item` was called with an index outside `[0, len)`.
    #[error("index {index} is out of range for dataset of length {len}")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Length of the dataset.
        len: usize,
    },
    /// A construction parameter is invalid.
    #[error("invalid `{parameter}`: {reason}")]
    Configuration {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// A buffer does not hold as many elements as the shape requires.
    #[error("shape holds {expected} elements but {actual} were supplied")]
    ShapeMismatch {
        /// Element count implied by the shape.
        expected: usize,
        /// Element count actually present.
        actual: usize,
    },
    /// A directory or file could not be read.
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// An image file could not be decoded.
    #[error("failed to decode `{}`: {source}", path.display())]
    Decode {
        /// Path of the image.
        path: PathBuf,
        /// Error from the `image` crate.
        #[source]
        source: image::ImageError,
    },
    /// A configuration document could not be parsed.
    #[error("malformed configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl DatasetError {
    pub(crate) fn configuration(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            parameter,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
