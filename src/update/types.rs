use serde::{Deserialize, Serialize};

use super::{
    constants::{DEFAULT_APP_ID, STATUS_OK},
    errors::{UpdateError, UpdateResult},
};

/// Attributes of the `updatecheck` element describing the current CRLSet
/// package. Everything except `status`, `codebase` and `hash_sha256` is
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub status: String,
    pub codebase: String,
    pub fp: String,
    pub hash: String,
    pub hash_sha256: String,
    pub size: String,
    pub version: String,
}

impl UpdateRecord {
    pub fn ensure_ok(&self) -> UpdateResult<()> {
        if self.status != STATUS_OK {
            return Err(UpdateError::Status(self.status.clone()));
        }

        Ok(())
    }
}

/// Query parameters of the update-check request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateParams {
    pub id: String,
    pub v: String,
    pub uc: String,
}

impl UpdateParams {
    pub fn for_app(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

impl Default for UpdateParams {
    fn default() -> Self {
        Self {
            id: DEFAULT_APP_ID.to_string(),
            v: String::new(),
            uc: String::new(),
        }
    }
}
