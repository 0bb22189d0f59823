//! Loading and saving run configuration files.
//!
//! Supports JSON and TOML, chosen by file extension. Every load runs
//! [`RewriteConfig::validate`] so a bad file is rejected before the engine
//! sees any input.

use std::path::Path;

use conductkit_core::RewriteConfig;

use crate::error::{SettingsError, SettingsResult};

/// Load and validate a run configuration from a JSON or TOML file.
pub fn load_config(path: &Path) -> SettingsResult<RewriteConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

    let config: RewriteConfig = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)?
    } else if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&content)?
    } else {
        return Err(SettingsError::UnsupportedFormat(
            path.display().to_string(),
        ));
    };

    config.validate()?;
    Ok(config)
}

/// Save a run configuration to a JSON or TOML file.
pub fn save_config(config: &RewriteConfig, path: &Path) -> SettingsResult<()> {
    config.validate()?;

    let content = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::to_string_pretty(config)?
    } else if path.extension().is_some_and(|ext| ext == "toml") {
        toml::to_string_pretty(config)
            .map_err(|e| SettingsError::SaveError(e.to_string()))?
    } else {
        return Err(SettingsError::UnsupportedFormat(
            path.display().to_string(),
        ));
    };

    std::fs::write(path, content)
        .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductkit_core::PartSpec;

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");

        let mut config = RewriteConfig::default();
        config.offsets.x_offset = 5.5;
        config.placement.parts = vec![PartSpec {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        }];
        config.placement.bin_y = vec![4.0];
        save_config(&config, &path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.offsets.x_offset, 5.5);
        assert_eq!(loaded.placement.parts.len(), 1);
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");

        let config = RewriteConfig::default();
        save_config(&config, &path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.offsets.feed_rate, 300.0);
        assert_eq!(loaded.markers.secondary_select, "M135 T1");
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        std::fs::write(&path, "offsets: {}").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, SettingsError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_invalid_config_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        // One part, no bins.
        std::fs::write(
            &path,
            r#"{"placement": {"parts": [{"x": 0.0, "y": 0.0, "z": 1.0}]}}"#,
        )
        .unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Config(_)));
    }
}
