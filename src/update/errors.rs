use thiserror::Error;

/// Failures while validating an update check or the package it points to.
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("invalid update manifest: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("update manifest has no app element")]
    AppNotFound,

    #[error("update manifest is for app {found}, expected {expected}")]
    AppMismatch { expected: String, found: String },

    #[error("no update check found for app {0}")]
    NoUpdateCheck(String),

    #[error("update check is missing {}", .0.join(", "))]
    MissingKeys(Vec<&'static str>),

    #[error("update check status is {0:?}, expected \"ok\"")]
    Status(String),

    #[error("invalid SHA-256 digest {0:?}")]
    InvalidDigest(String),

    #[error("package digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },
}

pub type UpdateResult<T> = Result<T, UpdateError>;
