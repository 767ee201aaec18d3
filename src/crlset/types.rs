use std::{collections::HashMap, fmt};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::{Map, Value};

use super::constants::{
    CRX3_VERSION, CRX_MAGIC_VALUE, METHOD_BZIP2, METHOD_DEFLATE, METHOD_STORED, SPKI_HASH_LENGTH,
};

/// The parsed envelope of a CRX package. All fields borrow from the package
/// buffer.
///
/// For version 3 packages `signature` holds the protobuf-encoded signed
/// header and `public_key` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrxContainer<'a> {
    pub version: u32,
    pub public_key: &'a [u8],
    pub signature: &'a [u8],
    pub payload: &'a [u8],
}

impl CrxContainer<'_> {
    pub fn is_crx3(&self) -> bool {
        self.version == CRX3_VERSION
    }

    /// Serializes everything preceding the payload back into its on-disk
    /// layout.
    pub fn header_bytes(&self) -> Vec<u8> {
        let mut header = Vec::with_capacity(16 + self.public_key.len() + self.signature.len());
        header.extend_from_slice(&CRX_MAGIC_VALUE);
        header.extend_from_slice(&self.version.to_le_bytes());

        if !self.is_crx3() {
            header.extend_from_slice(&(self.public_key.len() as u32).to_le_bytes());
        }
        header.extend_from_slice(&(self.signature.len() as u32).to_le_bytes());
        header.extend_from_slice(self.public_key);
        header.extend_from_slice(self.signature);

        header
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Bzip2,
    Unsupported(u16),
}

impl CompressionMethod {
    pub fn code(&self) -> u16 {
        match self {
            CompressionMethod::Stored => METHOD_STORED,
            CompressionMethod::Deflate => METHOD_DEFLATE,
            CompressionMethod::Bzip2 => METHOD_BZIP2,
            CompressionMethod::Unsupported(code) => *code,
        }
    }
}

impl From<u16> for CompressionMethod {
    fn from(code: u16) -> Self {
        match code {
            METHOD_STORED => CompressionMethod::Stored,
            METHOD_DEFLATE => CompressionMethod::Deflate,
            METHOD_BZIP2 => CompressionMethod::Bzip2,
            other => CompressionMethod::Unsupported(other),
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMethod::Stored => write!(f, "stored"),
            CompressionMethod::Deflate => write!(f, "deflate"),
            CompressionMethod::Bzip2 => write!(f, "bzip2"),
            CompressionMethod::Unsupported(code) => write!(f, "method {}", code),
        }
    }
}

/// Fixed 46-byte part of a ZIP central directory file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CentralDirectoryHeader {
    pub signature: [u8; 4],
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub method: u16,
    pub mod_time: u16,
    pub mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub name_length: u16,
    pub extra_length: u16,
    pub comment_length: u16,
    pub disk_number: u16,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    pub local_header_offset: u32,
}

impl CentralDirectoryHeader {
    pub fn compression_method(&self) -> CompressionMethod {
        CompressionMethod::from(self.method)
    }
}

/// SHA-256 hash of a certificate's SubjectPublicKeyInfo.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpkiHash([u8; SPKI_HASH_LENGTH]);

impl SpkiHash {
    pub fn new(bytes: [u8; SPKI_HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parses the base64 rendering used in CRLSet headers and JSON output.
    pub fn from_base64(encoded: &str) -> Option<Self> {
        let bytes = STANDARD.decode(encoded).ok()?;
        let bytes: [u8; SPKI_HASH_LENGTH] = bytes.try_into().ok()?;

        Some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SPKI_HASH_LENGTH] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }
}

impl fmt::Debug for SpkiHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpkiHash({})", self.to_base64())
    }
}

impl fmt::Display for SpkiHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl Serialize for SpkiHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

/// A revoked certificate serial number, kept as the raw bytes from the
/// stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Serial(Vec<u8>);

impl Serial {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl Serialize for Serial {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

/// Revoked serials grouped by issuer SPKI, in stream order.
#[derive(Debug, Clone, Default)]
pub struct Certificates {
    entries: Vec<(SpkiHash, Vec<Serial>)>,
    index: HashMap<SpkiHash, usize>,
}

impl Certificates {
    /// Replaces the serials of an SPKI already present without moving it.
    pub fn insert(&mut self, spki: SpkiHash, serials: Vec<Serial>) {
        match self.index.get(&spki) {
            Some(&position) => self.entries[position].1 = serials,
            None => {
                self.index.insert(spki, self.entries.len());
                self.entries.push((spki, serials));
            }
        }
    }

    pub fn get(&self, spki: &SpkiHash) -> Option<&[Serial]> {
        self.index
            .get(spki)
            .map(|&position| self.entries[position].1.as_slice())
    }

    pub fn contains(&self, spki: &SpkiHash) -> bool {
        self.index.contains_key(spki)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SpkiHash, &[Serial])> {
        self.entries
            .iter()
            .map(|(spki, serials)| (spki, serials.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn serial_count(&self) -> usize {
        self.entries.iter().map(|(_, serials)| serials.len()).sum()
    }
}

impl PartialEq for Certificates {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Certificates {}

impl Serialize for Certificates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (spki, serials) in &self.entries {
            map.serialize_entry(spki, serials)?;
        }
        map.end()
    }
}

/// A decoded CRLSet: the JSON header followed by the revocation records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrlSet {
    header: Map<String, Value>,
    certificates: Certificates,
}

impl CrlSet {
    pub fn new(header: Map<String, Value>, certificates: Certificates) -> Self {
        Self {
            header,
            certificates,
        }
    }

    pub fn header(&self) -> &Map<String, Value> {
        &self.header
    }

    pub fn certificates(&self) -> &Certificates {
        &self.certificates
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.header.get(name)
    }

    /// Chromium publishes `Version`; hand-made sets often use `version`.
    pub fn version(&self) -> Option<u64> {
        self.field("Version")
            .or_else(|| self.field("version"))
            .and_then(Value::as_u64)
    }

    pub fn sequence(&self) -> Option<u64> {
        self.field("Sequence").and_then(Value::as_u64)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.field("ContentType").and_then(Value::as_str)
    }

    /// Expiry as seconds since the Unix epoch.
    pub fn not_after(&self) -> Option<u64> {
        self.field("NotAfter").and_then(Value::as_u64)
    }

    /// SPKIs blocked outright, regardless of serial. Entries that are not
    /// valid base64 SHA-256 hashes are skipped.
    pub fn blocked_spkis(&self) -> Vec<SpkiHash> {
        self.blocked_entries().collect()
    }

    fn blocked_entries(&self) -> impl Iterator<Item = SpkiHash> + '_ {
        self.field("BlockedSPKIs")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .filter_map(SpkiHash::from_base64)
    }

    /// Leading zero bytes of `serial` are ignored, matching how serials are
    /// stored in the set.
    pub fn is_revoked(&self, issuer_spki: &SpkiHash, serial: &[u8]) -> bool {
        if self.blocked_entries().any(|blocked| blocked == *issuer_spki) {
            return true;
        }

        let mut serial = serial;
        while serial.len() > 1 && serial[0] == 0 {
            serial = &serial[1..];
        }

        self.certificates
            .get(issuer_spki)
            .is_some_and(|serials| serials.iter().any(|s| s.as_bytes() == serial))
    }
}

impl Serialize for CrlSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.header.iter().filter(|(key, _)| *key != "certificates") {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("certificates", &self.certificates)?;
        map.end()
    }
}

/// A package decoded down to its revocation list, with the CRX envelope kept
/// alongside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPackage<'a> {
    pub container: CrxContainer<'a>,
    pub crl_set: CrlSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spki(fill: u8) -> SpkiHash {
        SpkiHash::new([fill; SPKI_HASH_LENGTH])
    }

    #[test]
    fn compression_method_codes() {
        assert_eq!(CompressionMethod::from(0), CompressionMethod::Stored);
        assert_eq!(CompressionMethod::from(8), CompressionMethod::Deflate);
        assert_eq!(CompressionMethod::from(12), CompressionMethod::Bzip2);
        assert_eq!(CompressionMethod::from(99), CompressionMethod::Unsupported(99));
        assert_eq!(CompressionMethod::Unsupported(99).code(), 99);
    }

    #[test]
    fn reinserting_spki_overwrites_in_place() {
        let mut certificates = Certificates::default();
        certificates.insert(spki(1), vec![Serial::new(vec![1])]);
        certificates.insert(spki(2), vec![]);
        certificates.insert(spki(1), vec![Serial::new(vec![7]), Serial::new(vec![8])]);

        let order: Vec<_> = certificates.iter().map(|(spki, _)| *spki).collect();
        assert_eq!(order, vec![spki(1), spki(2)]);
        assert_eq!(certificates.get(&spki(1)).unwrap().len(), 2);
        assert_eq!(certificates.serial_count(), 2);
    }

    #[test]
    fn spki_base64_round_trip() {
        let hash = spki(0xAB);
        assert_eq!(SpkiHash::from_base64(&hash.to_base64()), Some(hash));
        assert_eq!(SpkiHash::from_base64("AAAA"), None);
        assert_eq!(SpkiHash::from_base64("not base64!"), None);
    }

    #[test]
    fn header_accessors() {
        let header = json!({
            "Version": 0,
            "ContentType": "CRLSet",
            "Sequence": 7123,
            "NotAfter": 1700000000u64,
            "BlockedSPKIs": [spki(9).to_base64(), "garbage"],
        });
        let crl_set = CrlSet::new(header.as_object().unwrap().clone(), Certificates::default());

        assert_eq!(crl_set.version(), Some(0));
        assert_eq!(crl_set.content_type(), Some("CRLSet"));
        assert_eq!(crl_set.sequence(), Some(7123));
        assert_eq!(crl_set.not_after(), Some(1_700_000_000));
        assert_eq!(crl_set.blocked_spkis(), vec![spki(9)]);
        assert!(crl_set.field("DeltaFrom").is_none());
    }

    #[test]
    fn revocation_checks() {
        let mut certificates = Certificates::default();
        certificates.insert(spki(1), vec![Serial::new(vec![0x12, 0x34])]);
        let header = json!({ "BlockedSPKIs": [spki(2).to_base64()] });
        let crl_set = CrlSet::new(header.as_object().unwrap().clone(), certificates);

        assert!(crl_set.is_revoked(&spki(1), &[0x12, 0x34]));
        assert!(crl_set.is_revoked(&spki(1), &[0x00, 0x12, 0x34]));
        assert!(!crl_set.is_revoked(&spki(1), &[0x12]));
        assert!(crl_set.is_revoked(&spki(2), &[0x01]));
        assert!(!crl_set.is_revoked(&spki(3), &[0x12, 0x34]));
    }

    #[test]
    fn blocked_spki_found_among_malformed_entries() {
        let header = json!({
            "BlockedSPKIs": ["garbage", 42, spki(4).to_base64(), spki(5).to_base64()],
        });
        let crl_set = CrlSet::new(header.as_object().unwrap().clone(), Certificates::default());

        assert!(crl_set.is_revoked(&spki(4), &[0x01]));
        assert!(crl_set.is_revoked(&spki(5), &[0x02]));
        assert!(!crl_set.is_revoked(&spki(6), &[0x01]));
    }

    #[test]
    fn serializes_header_then_certificates() {
        let mut certificates = Certificates::default();
        certificates.insert(spki(0), vec![Serial::new(vec![0xFF])]);
        let header = json!({ "version": 1, "certificates": "shadowed" });
        let crl_set = CrlSet::new(header.as_object().unwrap().clone(), certificates);

        let rendered = serde_json::to_value(&crl_set).unwrap();
        assert_eq!(
            rendered,
            json!({
                "version": 1,
                "certificates": { spki(0).to_base64(): ["/w=="] },
            })
        );
    }

    #[test]
    fn legacy_header_bytes_layout() {
        let container = CrxContainer {
            version: 2,
            public_key: &[0xAA, 0xBB],
            signature: &[0xCC],
            payload: &[],
        };

        assert_eq!(
            container.header_bytes(),
            vec![
                0x43, 0x72, 0x32, 0x34, 2, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 0xAA, 0xBB, 0xCC
            ]
        );
    }
}
