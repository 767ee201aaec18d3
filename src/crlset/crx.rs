use tracing::debug;

use super::{
    constants::{CRX3_VERSION, CRX_MAGIC_VALUE},
    cursor::ByteCursor,
    errors::{DecodeError, DecodeResult},
    types::CrxContainer,
};

pub fn is_valid_crx(magic: &[u8; 4]) -> bool {
    magic == &CRX_MAGIC_VALUE
}

/// Splits a CRX package into its header fields and the archive payload.
///
/// Legacy packages carry `version`, `public key length` and `signature
/// length` as little-endian u32 values followed by the key and the
/// signature. Version 3 packages carry a single header length followed by a
/// protobuf header, which is returned as the signature.
pub fn parse_crx(data: &[u8]) -> DecodeResult<CrxContainer<'_>> {
    let mut cursor = ByteCursor::new(data);

    let magic = cursor.take_array::<4>()?;
    if !is_valid_crx(&magic) {
        return Err(DecodeError::InvalidMagic(magic));
    }

    let version = cursor.take_u32_le()?;

    let (public_key, signature) = if version == CRX3_VERSION {
        let header_length = cursor.take_u32_le()?;
        (&[][..], cursor.take_prefixed(header_length as usize)?)
    } else {
        let public_key_length = cursor.take_u32_le()?;
        let signature_length = cursor.take_u32_le()?;

        let public_key = cursor.take_prefixed(public_key_length as usize)?;
        let signature = cursor.take_prefixed(signature_length as usize)?;
        (public_key, signature)
    };

    let payload = cursor.rest();

    debug!(
        version,
        public_key_length = public_key.len(),
        signature_length = signature.len(),
        payload_length = payload.len(),
        "parsed CRX container"
    );

    Ok(CrxContainer {
        version,
        public_key,
        signature,
        payload,
    })
}
