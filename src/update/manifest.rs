use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::debug;

use super::{
    constants::UPDATE_KEYS,
    errors::{UpdateError, UpdateResult},
    types::UpdateRecord,
};

#[derive(Debug, Deserialize)]
struct Gupdate {
    #[serde(rename = "app", default)]
    apps: Vec<App>,
}

#[derive(Debug, Deserialize)]
struct App {
    #[serde(rename = "@appid", default)]
    appid: Option<String>,
    updatecheck: Option<UpdateCheck>,
}

#[derive(Debug, Deserialize)]
struct UpdateCheck {
    #[serde(rename = "@status")]
    status: Option<String>,
    #[serde(rename = "@codebase")]
    codebase: Option<String>,
    #[serde(rename = "@fp")]
    fp: Option<String>,
    #[serde(rename = "@hash")]
    hash: Option<String>,
    #[serde(rename = "@hash_sha256")]
    hash_sha256: Option<String>,
    #[serde(rename = "@size")]
    size: Option<String>,
    #[serde(rename = "@version")]
    version: Option<String>,
}

impl UpdateCheck {
    fn into_record(self) -> UpdateResult<UpdateRecord> {
        let fields = [
            &self.status,
            &self.codebase,
            &self.fp,
            &self.hash,
            &self.hash_sha256,
            &self.size,
            &self.version,
        ];
        let missing: Vec<&'static str> = UPDATE_KEYS
            .iter()
            .zip(fields)
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| *key)
            .collect();

        match self {
            UpdateCheck {
                status: Some(status),
                codebase: Some(codebase),
                fp: Some(fp),
                hash: Some(hash),
                hash_sha256: Some(hash_sha256),
                size: Some(size),
                version: Some(version),
            } => Ok(UpdateRecord {
                status,
                codebase,
                fp,
                hash,
                hash_sha256,
                size,
                version,
            }),
            _ => Err(UpdateError::MissingKeys(missing)),
        }
    }
}

/// Reads the update-check response for `expected_app_id` and returns its
/// `updatecheck` attributes once they are complete and report `ok`.
pub fn parse_update_manifest(xml: &str, expected_app_id: &str) -> UpdateResult<UpdateRecord> {
    let document: Gupdate = from_str(xml)?;

    let mut found = None;
    let mut app = None;
    for candidate in document.apps {
        if candidate.appid.as_deref() == Some(expected_app_id) {
            app = Some(candidate);
            break;
        }
        found = found.or(candidate.appid);
    }

    let app = match (app, found) {
        (Some(app), _) => app,
        (None, Some(found)) => {
            return Err(UpdateError::AppMismatch {
                expected: expected_app_id.to_string(),
                found,
            })
        }
        (None, None) => return Err(UpdateError::AppNotFound),
    };

    let update_check = app
        .updatecheck
        .ok_or_else(|| UpdateError::NoUpdateCheck(expected_app_id.to_string()))?;
    let record = update_check.into_record()?;
    record.ensure_ok()?;

    debug!(
        version = %record.version,
        codebase = %record.codebase,
        size = %record.size,
        "parsed update check"
    );

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::constants::DEFAULT_APP_ID;

    fn manifest(app_attributes: &str, update_check: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<gupdate xmlns="http://www.google.com/update2/response" protocol="2.0" server="prod">
  <daystart elapsed_days="6500" elapsed_seconds="100"/>
  <app {app_attributes}>
    {update_check}
  </app>
</gupdate>"#
        )
    }

    const FULL_CHECK: &str = r#"<updatecheck codebase="http://example.com/crl-set-1.crx.data" fp="1.abcd" hash="" hash_sha256="abcd" size="755" status="ok" version="8123"/>"#;

    #[test]
    fn test_parse_update_manifest() {
        let xml = manifest(&format!(r#"appid="{DEFAULT_APP_ID}" status="ok""#), FULL_CHECK);

        let record = parse_update_manifest(&xml, DEFAULT_APP_ID).expect("Failed to parse");

        assert_eq!(
            record,
            UpdateRecord {
                status: "ok".to_string(),
                codebase: "http://example.com/crl-set-1.crx.data".to_string(),
                fp: "1.abcd".to_string(),
                hash: String::new(),
                hash_sha256: "abcd".to_string(),
                size: "755".to_string(),
                version: "8123".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_mock_manifest() {
        let xml = std::fs::read_to_string("./src/mock/update-check.xml").unwrap();

        let record = parse_update_manifest(&xml, DEFAULT_APP_ID).expect("Failed to parse");

        assert_eq!(record.version, "8123");
        assert_eq!(record.hash_sha256.len(), 64);
    }

    #[test]
    fn test_wrong_app() {
        let xml = manifest(r#"appid="someotherapp""#, FULL_CHECK);

        assert!(matches!(
            parse_update_manifest(&xml, DEFAULT_APP_ID),
            Err(UpdateError::AppMismatch { found, .. }) if found == "someotherapp"
        ));
    }

    #[test]
    fn test_no_app() {
        let xml = r#"<gupdate protocol="2.0"><daystart elapsed_days="1"/></gupdate>"#;

        assert!(matches!(
            parse_update_manifest(xml, DEFAULT_APP_ID),
            Err(UpdateError::AppNotFound)
        ));
    }

    #[test]
    fn test_no_update_check() {
        let xml = manifest(&format!(r#"appid="{DEFAULT_APP_ID}""#), "");

        assert!(matches!(
            parse_update_manifest(&xml, DEFAULT_APP_ID),
            Err(UpdateError::NoUpdateCheck(_))
        ));
    }

    #[test]
    fn test_missing_keys() {
        let xml = manifest(
            &format!(r#"appid="{DEFAULT_APP_ID}""#),
            r#"<updatecheck status="ok" codebase="http://example.com/x" version="1"/>"#,
        );

        match parse_update_manifest(&xml, DEFAULT_APP_ID) {
            Err(UpdateError::MissingKeys(keys)) => {
                assert_eq!(keys, vec!["fp", "hash", "hash_sha256", "size"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_status_not_ok() {
        let check = FULL_CHECK.replace(r#"status="ok""#, r#"status="noupdate""#);
        let xml = manifest(&format!(r#"appid="{DEFAULT_APP_ID}""#), &check);

        assert!(matches!(
            parse_update_manifest(&xml, DEFAULT_APP_ID),
            Err(UpdateError::Status(status)) if status == "noupdate"
        ));
    }

    #[test]
    fn test_invalid_xml() {
        assert!(matches!(
            parse_update_manifest("<gupdate><app", DEFAULT_APP_ID),
            Err(UpdateError::Xml(_))
        ));
    }
}
