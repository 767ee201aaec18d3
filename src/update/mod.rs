//! Collaborators around the decoder: the update-check manifest, the URL it
//! is requested from, and the integrity check of the downloaded package.

pub mod constants;
pub mod errors;
pub mod helpers;
pub mod manifest;
pub mod types;
