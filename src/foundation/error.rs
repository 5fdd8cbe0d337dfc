/// Crate-wide result alias.
pub type RasterkitResult<T> = Result<T, RasterkitError>;

/// Error taxonomy for all rasterkit operations.
///
/// Pixel-level operations only fail on structurally invalid arguments
/// (`Validation`); any bit pattern is a legal pixel value. The ICC variants
/// cover the color transform invoker.
#[derive(thiserror::Error, Debug)]
pub enum RasterkitError {
    /// Structurally invalid argument: zero-size view, stride underflow,
    /// mismatched bounds, indexed destination.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed or truncated ICC profile bytes.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// A profile chain could not be composed into a transform.
    #[error("transform creation failed: {0}")]
    Transform(String),

    /// Read of an absent profile tag.
    #[error("tag not found: {0}")]
    TagNotFound(String),

    /// Write to the header tag through the generic path, or a failed
    /// rebuild of the tag layout.
    #[error("tag write rejected: {0}")]
    TagWriteRejected(String),

    /// Scratch buffer or chain-array allocation failed.
    #[error("allocation failed: {0}")]
    Allocation(String),

    /// Passthrough for wrapped external errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RasterkitError {
    /// Build a [`RasterkitError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RasterkitError::InvalidProfile`].
    pub fn invalid_profile(msg: impl Into<String>) -> Self {
        Self::InvalidProfile(msg.into())
    }

    /// Build a [`RasterkitError::Transform`].
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Build a [`RasterkitError::TagNotFound`] from a tag signature.
    pub fn tag_not_found(sig: u32) -> Self {
        Self::TagNotFound(fourcc(sig))
    }

    /// Build a [`RasterkitError::TagWriteRejected`].
    pub fn tag_write_rejected(msg: impl Into<String>) -> Self {
        Self::TagWriteRejected(msg.into())
    }

    /// Build a [`RasterkitError::Allocation`].
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }
}

/// Render a big-endian four-character signature for error messages.
pub(crate) fn fourcc(sig: u32) -> String {
    let bytes = sig.to_be_bytes();
    if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        bytes.iter().map(|&b| b as char).collect()
    } else {
        format!("{sig:#010x}")
    }
}
