//! Filesystem, download and extraction helpers.

pub mod archive;
pub mod fs;
pub mod http;
