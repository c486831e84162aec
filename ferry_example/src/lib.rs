//! Support code for the `ndjson-to-appbase` binary

pub mod config;
pub mod input;
