//! Windows release packaging pipeline.
//!
//! Turns a desktop project (Rust backend, web UI, embedded Chromium
//! runtime) into a self-contained archive and an installer. See
//! [`Pipeline`] for the stage order.

pub mod builder;
pub mod env;
pub mod error;
pub mod exec;
pub mod settings;
pub mod stages;
pub mod utils;

pub use builder::{MANIFEST_FILE, Pipeline};
pub use builder::manifest::{ArtifactKind, ReleaseArtifact, ReleaseManifest};
pub use env::{EnvironmentOverlay, EnvironmentSnapshot};
pub use error::{Context, Error, ErrorExt, Result};
pub use exec::{CommandExecutor, CommandStatus, Invocation, ProcessExecutor};
pub use settings::{DependencyStrategy, Settings, SettingsBuilder};
pub use stages::Stage;
pub use utils::http::{Downloader, HttpDownloader};
