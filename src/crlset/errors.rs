use thiserror::Error;

use super::types::CompressionMethod;

/// Failures of the package decoding pipeline. Every variant is fatal to the
/// decode call that produced it.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("input truncated: wanted {wanted} bytes but {available} remain")]
    TruncatedInput { wanted: usize, available: usize },

    #[error("invalid CRX magic {0:02x?}, expected \"Cr24\"")]
    InvalidMagic([u8; 4]),

    #[error("archive entry {0:?} not found")]
    EntryNotFound(String),

    #[error("unsupported compression method {0}")]
    UnsupportedCompression(u16),

    #[error("malformed CRLSet header: {0}")]
    MalformedHeader(String),

    #[error("failed to decompress {method} entry")]
    Decompression {
        method: CompressionMethod,
        #[source]
        source: std::io::Error,
    },
}

pub type DecodeResult<T> = Result<T, DecodeError>;
