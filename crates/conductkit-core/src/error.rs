//! Error types for the rewriting engine.
//!
//! Fatal conditions abort the run before any output is handed back; the only
//! recoverable class is a per-token parse failure, which is surfaced as a
//! [`ParseWarning`](crate::line::ParseWarning) rather than an error.

use thiserror::Error;

/// Errors that can occur while rewriting a G-code program.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A configuration problem was detected before the run started.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A marked block was opened but never closed before end of input.
    #[error("Unterminated {kind} block starting at line {start_line}")]
    UnterminatedBlock { kind: &'static str, start_line: usize },

    /// A begin marker appeared while another block was still open.
    #[error("Nested {kind} block at line {line} (previous block still open)")]
    NestedBlock { kind: &'static str, line: usize },

    /// An end marker appeared with no matching begin marker.
    #[error("Stray {kind} end marker at line {line}")]
    StrayEndMarker { kind: &'static str, line: usize },

    /// Blocks were deferred for relocation but the program never ended.
    #[error("{count} deferred block(s) but no end-of-program marker '{marker}' in input")]
    MissingEndOfProgram { marker: String, count: usize },

    /// The input ended before every queued part was placed.
    #[error("End of input with {remaining} of {total} part(s) still unplaced")]
    PartsNotPlaced { remaining: usize, total: usize },

    /// A placement was requested after every queued part was placed.
    #[error("Placement requested but all {total} part(s) are already placed")]
    PlacementQueueExhausted { total: usize },
}

/// Errors related to run configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No dwell code is configured for an actuator action.
    #[error("Missing dwell code for actuator action '{0}'")]
    MissingActionCode(String),

    /// A configuration value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// Fewer bin coordinates than parts to place.
    #[error("{parts} part(s) to place but only {bins} bin coordinate(s) configured")]
    NotEnoughBins { parts: usize, bins: usize },

    /// A part has a non-finite coordinate.
    #[error("Part {index} has a non-finite coordinate ({x}, {y}, {z})")]
    NonFinitePart { index: usize, x: f64, y: f64, z: f64 },

    /// A required marker string is empty.
    #[error("Marker '{0}' must not be empty")]
    EmptyMarker(&'static str),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type alias for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::UnterminatedBlock {
            kind: "extrusion",
            start_line: 42,
        };
        assert_eq!(
            err.to_string(),
            "Unterminated extrusion block starting at line 42"
        );

        let err = EngineError::PartsNotPlaced {
            remaining: 2,
            total: 3,
        };
        assert_eq!(
            err.to_string(),
            "End of input with 2 of 3 part(s) still unplaced"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingActionCode("clamp-open".to_string());
        assert_eq!(
            err.to_string(),
            "Missing dwell code for actuator action 'clamp-open'"
        );

        let err = ConfigError::NotEnoughBins { parts: 4, bins: 2 };
        assert_eq!(
            err.to_string(),
            "4 part(s) to place but only 2 bin coordinate(s) configured"
        );
    }

    #[test]
    fn test_error_conversion() {
        let cfg_err = ConfigError::EmptyMarker("travel");
        let eng_err: EngineError = cfg_err.into();
        assert!(matches!(eng_err, EngineError::Config(_)));
    }
}
