use super::errors::CrlSetCliError;
use crate::Cli;
use clap::{error::ErrorKind, CommandFactory};
use crlset_rs::crlset::types::CrlSet;

pub fn exit_with_error(error: CrlSetCliError) -> ! {
    let mut cmd = Cli::command();
    cmd.error(ErrorKind::from(error.clone()), error.to_string()).exit()
}

pub fn is_supported_package(filename: &str) -> bool {
    filename.ends_with(".crx") || filename.ends_with(".crx.data")
}

/// Human-readable overview of a decoded package, one line per fact.
pub fn summary_lines(crx_version: u32, crl_set: &CrlSet) -> Vec<String> {
    let mut lines = vec![format!("CRX version: {}", crx_version)];

    if let Some(version) = crl_set.version() {
        lines.push(format!("CRLSet version: {}", version));
    }
    if let Some(content_type) = crl_set.content_type() {
        lines.push(format!("Content type: {}", content_type));
    }
    if let Some(sequence) = crl_set.sequence() {
        lines.push(format!("Sequence: {}", sequence));
    }
    if let Some(not_after) = crl_set.not_after() {
        lines.push(format!("Not after: {} (Unix time)", not_after));
    }

    lines.push(format!("Blocked SPKIs: {}", crl_set.blocked_spkis().len()));
    lines.push(format!("Issuers with revocations: {}", crl_set.certificates().len()));
    lines.push(format!("Revoked serials: {}", crl_set.certificates().serial_count()));

    lines
}
