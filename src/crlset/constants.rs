/// "Cr24", the magic value opening every CRX package.
pub const CRX_MAGIC_VALUE: [u8; 4] = [0x43, 0x72, 0x32, 0x34];
/// CRX3 replaces the key/signature length pair with a single protobuf header.
pub const CRX3_VERSION: u32 = 3;

pub const CENTRAL_DIRECTORY_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x01, 0x02];
pub const CENTRAL_DIRECTORY_HEADER_LENGTH: usize = 46;
pub const LOCAL_FILE_HEADER_LENGTH: usize = 30;

pub const METHOD_STORED: u16 = 0;
pub const METHOD_DEFLATE: u16 = 8;
pub const METHOD_BZIP2: u16 = 12;

/// Name of the archive entry holding the revocation records.
pub const CRL_SET_ENTRY_NAME: &str = "crl-set";
pub const SPKI_HASH_LENGTH: usize = 32;
