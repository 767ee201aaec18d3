use thiserror::Error;
use tracing::info;

use crate::{
    crlset::{decode_package, errors::DecodeError, types::CrlSet},
    update::{errors::UpdateError, helpers::verify_sha256, types::UpdateRecord},
};

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error(transparent)]
    Update(#[from] UpdateError),

    #[error("failed to decode CRLSet package: {0}")]
    Decode(#[from] DecodeError),
}

/// A CRLSet together with the update check that announced it and the CRX
/// envelope it arrived in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    update: UpdateRecord,
    crx_version: u32,
    public_key: Vec<u8>,
    signature: Vec<u8>,
    crl_set: CrlSet,
}

impl Snapshot {
    /// Validates the update check, verifies the package digest and decodes
    /// the package.
    pub fn from_package(update: UpdateRecord, package: &[u8]) -> Result<Self, SnapshotError> {
        update.ensure_ok()?;
        verify_sha256(package, &update.hash_sha256)?;

        Self::from_verified_package(update, package)
    }

    /// Same as [`Snapshot::from_package`] for callers that have already
    /// checked the package digest.
    pub fn from_verified_package(
        update: UpdateRecord,
        package: &[u8],
    ) -> Result<Self, SnapshotError> {
        let decoded = decode_package(package)?;

        info!(
            version = %update.version,
            spkis = decoded.crl_set.certificates().len(),
            serials = decoded.crl_set.certificates().serial_count(),
            "loaded CRLSet snapshot"
        );

        Ok(Self {
            crx_version: decoded.container.version,
            public_key: decoded.container.public_key.to_vec(),
            signature: decoded.container.signature.to_vec(),
            crl_set: decoded.crl_set,
            update,
        })
    }

    pub fn update(&self) -> &UpdateRecord {
        &self.update
    }

    pub fn crx_version(&self) -> u32 {
        self.crx_version
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn crl_set(&self) -> &CrlSet {
        &self.crl_set
    }

    pub fn into_crl_set(self) -> CrlSet {
        self.crl_set
    }
}
