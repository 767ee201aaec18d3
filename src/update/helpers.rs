use sha2::{Digest, Sha256};
use tracing::debug;
use urlencoding::encode;

use super::{
    constants::DEFAULT_UPDATE_URL,
    errors::{UpdateError, UpdateResult},
    types::UpdateParams,
};

/// The update service expects the real parameters url-encoded inside a
/// single `x` parameter.
pub fn build_update_url(params: &UpdateParams) -> String {
    let query = format!(
        "id={}&v={}&uc={}",
        encode(&params.id),
        encode(&params.v),
        encode(&params.uc)
    );

    format!("{}?x={}", DEFAULT_UPDATE_URL, encode(&query))
}

/// Checks downloaded package bytes against the hex digest announced in the
/// update check. Hex case is ignored.
pub fn verify_sha256(data: &[u8], expected_hex: &str) -> UpdateResult<()> {
    let expected = hex::decode(expected_hex.trim())
        .ok()
        .filter(|digest| digest.len() == 32)
        .ok_or_else(|| UpdateError::InvalidDigest(expected_hex.to_string()))?;

    let actual = Sha256::digest(data);
    if actual.as_slice() != expected.as_slice() {
        return Err(UpdateError::DigestMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(actual),
        });
    }

    debug!(bytes = data.len(), "package digest verified");
    Ok(())
}
