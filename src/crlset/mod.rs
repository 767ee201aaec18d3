//! Decoding of CRLSet update packages: CRX envelope, ZIP entry, record
//! stream.

pub mod archive;
pub mod constants;
pub mod crx;
pub mod cursor;
pub mod errors;
pub mod records;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

use tracing::debug;

use constants::CRL_SET_ENTRY_NAME;
use errors::DecodeResult;
use types::{CrlSet, DecodedPackage};

/// Decodes a whole package, keeping the CRX envelope next to the
/// revocation list.
pub fn decode_package(package: &[u8]) -> DecodeResult<DecodedPackage<'_>> {
    let container = crx::parse_crx(package)?;
    let entry = archive::extract_entry(container.payload, CRL_SET_ENTRY_NAME)?;
    let crl_set = records::decode_crl_set(&entry)?;

    debug!(
        crx_version = container.version,
        spkis = crl_set.certificates().len(),
        "decoded CRLSet package"
    );

    Ok(DecodedPackage { container, crl_set })
}

/// Decodes a package down to its revocation list.
pub fn decode(package: &[u8]) -> DecodeResult<CrlSet> {
    decode_package(package).map(|decoded| decoded.crl_set)
}
