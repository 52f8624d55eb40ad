use std::io;

/// Reasons a buffer is declined or fails to load as a DOL image.
#[derive(thiserror::Error, Debug)]
pub enum DolError {
    #[error("buffer too small for a DOL header: {len} bytes, need 256")]
    BufferTooSmall { len: usize },

    #[error("source name {name:?} does not carry the .dol extension")]
    NameMismatch { name: String },

    #[error("buffer does not match the DOL header signature")]
    SignatureMismatch,

    /// The size gate passed but the header could not be read in full.
    #[error("truncated read while loading DOL header")]
    TruncatedRead(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DolError>;
