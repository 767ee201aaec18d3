/// Application ID under which the CRLSet component is published.
pub const DEFAULT_APP_ID: &str = "hfnkpimlhhgieaddgfemjhofmfblmnib";
pub const DEFAULT_UPDATE_URL: &str = "http://clients2.google.com/service/update2/crx";

/// Attributes every `updatecheck` element must carry.
pub const UPDATE_KEYS: [&str; 7] = [
    "status",
    "codebase",
    "fp",
    "hash",
    "hash_sha256",
    "size",
    "version",
];

pub const STATUS_OK: &str = "ok";
