use clap::error::ErrorKind;
use std::{error::Error, fmt};

/// Problems with the command line itself, reported through clap before any
/// decoding starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrlSetCliError {
    UnsupportedFileType,
    PackageNotFound(String),
    ManifestNotFound(String),
}

impl Error for CrlSetCliError {}

impl fmt::Display for CrlSetCliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrlSetCliError::UnsupportedFileType => write!(
                f,
                "Unsupported file type. Only .crx and .crx.data packages can hold a CRLSet"
            ),
            CrlSetCliError::PackageNotFound(path) => write!(f, "CRLSet package {} not found", path),
            CrlSetCliError::ManifestNotFound(path) => {
                write!(f, "Update-check response {} not found", path)
            }
        }
    }
}

impl From<CrlSetCliError> for ErrorKind {
    fn from(error: CrlSetCliError) -> Self {
        match error {
            CrlSetCliError::UnsupportedFileType => ErrorKind::InvalidValue,
            CrlSetCliError::PackageNotFound(_) | CrlSetCliError::ManifestNotFound(_) => {
                ErrorKind::Io
            }
        }
    }
}
