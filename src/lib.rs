pub mod crlset;
pub mod snapshot;
pub mod update;
