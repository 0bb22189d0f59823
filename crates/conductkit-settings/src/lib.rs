//! # ConductKit Settings
//!
//! Configuration file handling for ConductKit runs.
//!
//! The engine itself takes a fully built
//! [`RewriteConfig`](conductkit_core::RewriteConfig); this crate turns JSON
//! or TOML files on disk into validated configs and writes them back, so the
//! CLI (or any other shell around the core) never touches serialization
//! directly.

pub mod error;
pub mod persistence;

pub use error::{SettingsError, SettingsResult};
pub use persistence::{load_config, save_config};
