//! Builders for in-memory packages used across the unit tests.

use std::io::Write;

use bzip2::write::BzEncoder;
use flate2::write::DeflateEncoder;

pub fn deflate_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn bzip2_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

struct Entry {
    name: String,
    method: u16,
    data: Vec<u8>,
    extra: Vec<u8>,
}

/// Writes a minimal ZIP archive: local headers and data, the central
/// directory, then the end-of-central-directory record. `data` is written
/// as given, so callers compress it themselves.
#[derive(Default)]
pub struct ArchiveBuilder {
    entries: Vec<Entry>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(self, name: &str, method: u16, data: &[u8]) -> Self {
        self.entry_with_extra(name, method, data, &[])
    }

    pub fn entry_with_extra(mut self, name: &str, method: u16, data: &[u8], extra: &[u8]) -> Self {
        self.entries.push(Entry {
            name: name.to_string(),
            method,
            data: data.to_vec(),
            extra: extra.to_vec(),
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut archive = Vec::new();
        let mut offsets = Vec::new();

        for entry in &self.entries {
            offsets.push(archive.len() as u32);
            archive.extend_from_slice(b"PK\x03\x04");
            archive.extend_from_slice(&20u16.to_le_bytes());
            archive.extend_from_slice(&0u16.to_le_bytes());
            archive.extend_from_slice(&entry.method.to_le_bytes());
            archive.extend_from_slice(&[0; 4]);
            archive.extend_from_slice(&0u32.to_le_bytes());
            archive.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
            archive.extend_from_slice(&0u32.to_le_bytes());
            archive.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
            archive.extend_from_slice(&(entry.extra.len() as u16).to_le_bytes());
            archive.extend_from_slice(entry.name.as_bytes());
            archive.extend_from_slice(&entry.extra);
            archive.extend_from_slice(&entry.data);
        }

        let directory_offset = archive.len() as u32;
        for (entry, offset) in self.entries.iter().zip(&offsets) {
            archive.extend_from_slice(b"PK\x01\x02");
            archive.extend_from_slice(&20u16.to_le_bytes());
            archive.extend_from_slice(&20u16.to_le_bytes());
            archive.extend_from_slice(&0u16.to_le_bytes());
            archive.extend_from_slice(&entry.method.to_le_bytes());
            archive.extend_from_slice(&[0; 4]);
            archive.extend_from_slice(&0u32.to_le_bytes());
            archive.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
            archive.extend_from_slice(&0u32.to_le_bytes());
            archive.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
            archive.extend_from_slice(&(entry.extra.len() as u16).to_le_bytes());
            archive.extend_from_slice(&0u16.to_le_bytes());
            archive.extend_from_slice(&0u16.to_le_bytes());
            archive.extend_from_slice(&0u16.to_le_bytes());
            archive.extend_from_slice(&0u32.to_le_bytes());
            archive.extend_from_slice(&offset.to_le_bytes());
            archive.extend_from_slice(entry.name.as_bytes());
            archive.extend_from_slice(&entry.extra);
        }
        let directory_size = archive.len() as u32 - directory_offset;

        archive.extend_from_slice(b"PK\x05\x06");
        archive.extend_from_slice(&[0; 4]);
        archive.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
        archive.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
        archive.extend_from_slice(&directory_size.to_le_bytes());
        archive.extend_from_slice(&directory_offset.to_le_bytes());
        archive.extend_from_slice(&0u16.to_le_bytes());

        archive
    }
}

/// Wraps a payload in a legacy CRX envelope with an empty key and signature.
pub fn crx_package(payload: &[u8]) -> Vec<u8> {
    let mut package = b"Cr24".to_vec();
    package.extend_from_slice(&2u32.to_le_bytes());
    package.extend_from_slice(&0u32.to_le_bytes());
    package.extend_from_slice(&0u32.to_le_bytes());
    package.extend_from_slice(payload);
    package
}

/// Encodes a CRLSet record stream with a JSON header.
pub fn record_stream(header: &str, entries: &[([u8; 32], Vec<Vec<u8>>)]) -> Vec<u8> {
    let mut stream = (header.len() as u16).to_le_bytes().to_vec();
    stream.extend_from_slice(header.as_bytes());

    for (spki, serials) in entries {
        stream.extend_from_slice(spki);
        stream.extend_from_slice(&(serials.len() as u32).to_le_bytes());
        for serial in serials {
            stream.push(serial.len() as u8);
            stream.extend_from_slice(serial);
        }
    }

    stream
}
