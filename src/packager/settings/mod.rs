//! Configuration structures for the packaging pipeline.

mod builder;
mod core;
mod strategy;

pub use builder::SettingsBuilder;
pub use self::core::{SUPPORTED_OS, Settings};
pub use strategy::DependencyStrategy;
