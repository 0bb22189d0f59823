//! # ConductKit
//!
//! Rewrites the G-code produced by a dual-extrusion slice so that one tool
//! drives a conductive-material dispenser instead of a second plastic
//! extruder, and so discrete parts can be picked from bins and placed into
//! the print at configured heights.
//!
//! ## Architecture
//!
//! ConductKit is organized as a workspace:
//!
//! 1. **conductkit-core** - the line-oriented rewriting engine: tokenizer,
//!    pump state machine, coordinate transformer, pulse encoder,
//!    pick-and-place scheduler, block reassembler
//! 2. **conductkit-settings** - configuration files (JSON/TOML) and
//!    validation
//! 3. **conductkit** - this binary: file I/O, output naming, progress
//!    reporting

use std::path::{Path, PathBuf};

pub use conductkit_core::{rewrite, EngineError, RewriteConfig, RewriteOutput, RunReport};
pub use conductkit_settings::{load_config, save_config, SettingsError};

/// Build timestamp injected by build.rs.
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging for the application.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}

/// Derive the output path from the input path.
///
/// The terminal file-type suffix is replaced by `-updated` plus the same
/// suffix: `print.gcode` becomes `print-updated.gcode`. An input with no
/// suffix just gains `-updated`.
pub fn updated_path(input: &Path) -> PathBuf {
    match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("out");
            input.with_file_name(format!("{}-updated.{}", stem, ext))
        }
        None => {
            let name = input.file_name().and_then(|s| s.to_str()).unwrap_or("out");
            input.with_file_name(format!("{}-updated", name))
        }
    }
}
