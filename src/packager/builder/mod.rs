//! Pipeline orchestration and coordination.
//!
//! This module provides the [`Pipeline`] orchestrator that runs the
//! packaging stages in order:
//!
//! 1. Host check and UI bundle ([`precondition`](crate::packager::stages::precondition))
//! 2. Dependency strategy validation and provisioning
//! 3. Toolchain pin and native build
//! 4. CEF payload relocation and artifact staging
//! 5. Archive and installer generation
//! 6. Checksums and the release manifest
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum calculation for artifacts
//! - [`manifest`] - Release artifact description and JSON manifest
//! - [`orchestrator`] - Main [`Pipeline`] struct
//! - [`tool_detection`] - External tool lookup

pub mod checksum;
pub mod manifest;
mod orchestrator;
pub mod tool_detection;

pub use orchestrator::{MANIFEST_FILE, Pipeline};
