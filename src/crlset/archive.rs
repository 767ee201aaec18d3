//! Single-entry lookup inside the ZIP payload of a CRX package.
//!
//! This is not a general ZIP reader. Central directory records are found by
//! scanning for their signature rather than through the end-of-central-directory
//! record, and the entry data offset is derived from the central directory's
//! name and extra lengths.

use std::{borrow::Cow, io::Read};

use bzip2::read::BzDecoder;
use flate2::read::DeflateDecoder;
use tracing::{debug, trace};

use super::{
    constants::{
        CENTRAL_DIRECTORY_HEADER_LENGTH, CENTRAL_DIRECTORY_SIGNATURE, LOCAL_FILE_HEADER_LENGTH,
    },
    cursor::ByteCursor,
    errors::{DecodeError, DecodeResult},
    types::{CentralDirectoryHeader, CompressionMethod},
};

impl CentralDirectoryHeader {
    pub fn read(cursor: &mut ByteCursor<'_>) -> DecodeResult<Self> {
        Ok(Self {
            signature: cursor.take_array()?,
            version_made_by: cursor.take_u16_le()?,
            version_needed: cursor.take_u16_le()?,
            flags: cursor.take_u16_le()?,
            method: cursor.take_u16_le()?,
            mod_time: cursor.take_u16_le()?,
            mod_date: cursor.take_u16_le()?,
            crc32: cursor.take_u32_le()?,
            compressed_size: cursor.take_u32_le()?,
            uncompressed_size: cursor.take_u32_le()?,
            name_length: cursor.take_u16_le()?,
            extra_length: cursor.take_u16_le()?,
            comment_length: cursor.take_u16_le()?,
            disk_number: cursor.take_u16_le()?,
            internal_attrs: cursor.take_u16_le()?,
            external_attrs: cursor.take_u32_le()?,
            local_header_offset: cursor.take_u32_le()?,
        })
    }
}

fn find_signature(data: &[u8], from: usize) -> Option<usize> {
    data.get(from..)?
        .windows(CENTRAL_DIRECTORY_SIGNATURE.len())
        .position(|window| window == CENTRAL_DIRECTORY_SIGNATURE)
        .map(|position| from + position)
}

/// Locates the central directory record named `name` and returns it with
/// the entry's still-compressed bytes.
///
/// After a record with another name the scan resumes right after that
/// record's fixed 46 bytes, not after its variable-length fields.
pub fn find_entry<'a>(
    payload: &'a [u8],
    name: &str,
) -> DecodeResult<(CentralDirectoryHeader, &'a [u8])> {
    let mut offset = 0;

    loop {
        let found = find_signature(payload, offset)
            .ok_or_else(|| DecodeError::EntryNotFound(name.to_string()))?;

        let mut cursor = ByteCursor::new(&payload[found..]);
        let header = CentralDirectoryHeader::read(&mut cursor)?;
        let entry_name = cursor.take_prefixed(header.name_length as usize)?;

        if entry_name != name.as_bytes() {
            trace!(
                offset = found,
                entry = %String::from_utf8_lossy(entry_name),
                "skipping central directory record"
            );
            offset = found + CENTRAL_DIRECTORY_HEADER_LENGTH;
            continue;
        }

        debug!(
            offset = found,
            method = header.method,
            compressed_size = header.compressed_size,
            uncompressed_size = header.uncompressed_size,
            local_header_offset = header.local_header_offset,
            "found archive entry {name:?}"
        );

        let data = entry_data(payload, &header)?;
        return Ok((header, data));
    }
}

fn entry_data<'a>(payload: &'a [u8], header: &CentralDirectoryHeader) -> DecodeResult<&'a [u8]> {
    let compressed_size = header.compressed_size as usize;
    let truncated = || DecodeError::TruncatedInput {
        wanted: compressed_size,
        available: 0,
    };

    let start = (header.local_header_offset as usize)
        .checked_add(
            LOCAL_FILE_HEADER_LENGTH + header.name_length as usize + header.extra_length as usize,
        )
        .ok_or_else(truncated)?;
    let end = start.checked_add(compressed_size).ok_or_else(truncated)?;

    payload
        .get(start..end)
        .ok_or_else(|| DecodeError::TruncatedInput {
            wanted: compressed_size,
            available: payload.len().saturating_sub(start),
        })
}

/// Stored data is handed back borrowed; everything else is inflated into a
/// fresh buffer.
pub fn decompress(method: CompressionMethod, data: &[u8]) -> DecodeResult<Cow<'_, [u8]>> {
    let mut decompressed = Vec::new();

    let result = match method {
        CompressionMethod::Stored => return Ok(Cow::Borrowed(data)),
        CompressionMethod::Deflate => DeflateDecoder::new(data).read_to_end(&mut decompressed),
        CompressionMethod::Bzip2 => BzDecoder::new(data).read_to_end(&mut decompressed),
        CompressionMethod::Unsupported(code) => {
            return Err(DecodeError::UnsupportedCompression(code))
        }
    };

    result.map_err(|source| DecodeError::Decompression { method, source })?;
    debug!(
        %method,
        compressed = data.len(),
        decompressed = decompressed.len(),
        "decompressed archive entry"
    );

    Ok(Cow::Owned(decompressed))
}

/// Finds `name` in the archive payload and returns its decompressed bytes.
pub fn extract_entry<'a>(payload: &'a [u8], name: &str) -> DecodeResult<Cow<'a, [u8]>> {
    let (header, data) = find_entry(payload, name)?;

    decompress(header.compression_method(), data)
}
