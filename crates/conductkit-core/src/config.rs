//! Run configuration for the rewriting engine.
//!
//! Configuration is organized into logical sections:
//! - Dispenser offset and feed override settings
//! - Pulse protocol settings (action codes and framing widths)
//! - Pick-and-place settings (bins, claw offset, part list)
//! - Marker vocabulary (tool-change and travel markers, skip list)
//!
//! All values are fixed for the lifetime of a run. [`RewriteConfig::validate`]
//! rejects a bad configuration before any input is consumed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ConfigError, ConfigResult};
use crate::pulse::ActuatorAction;

/// Dispenser offset and feed override settings.
///
/// Applied to every motion command while the conductive dispenser is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetSettings {
    /// X distance from the plastic nozzle to the dispenser tip (mm)
    pub x_offset: f64,
    /// Y distance from the plastic nozzle to the dispenser tip (mm)
    pub y_offset: f64,
    /// Feed rate forced onto dispensing moves (mm/min)
    pub feed_rate: f64,
}

impl Default for OffsetSettings {
    fn default() -> Self {
        Self {
            x_offset: 18.8722,
            y_offset: 16.648,
            feed_rate: 300.0,
        }
    }
}

/// Pulse protocol settings.
///
/// Each discrete actuator command is identified by the width of a single
/// asserted dwell on the control line. The table is keyed by
/// [`ActuatorAction::key`] so a firmware revision with different codes is a
/// configuration change, not a code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseSettings {
    /// Dwell-duration code per actuator action (ms)
    pub codes: HashMap<String, u32>,
    /// Deasserted settle width between pulses (ms)
    pub settle_ms: u32,
    /// Asserted reset/sync width preceding every command pulse (ms)
    pub reset_ms: u32,
}

impl Default for PulseSettings {
    fn default() -> Self {
        let mut codes = HashMap::new();
        codes.insert(ActuatorAction::Extrude.key().to_string(), 160);
        codes.insert(ActuatorAction::ClampOpen.key().to_string(), 880);
        codes.insert(ActuatorAction::ClampClose.key().to_string(), 720);
        codes.insert(ActuatorAction::ArmLower.key().to_string(), 400);
        codes.insert(ActuatorAction::ArmRaise.key().to_string(), 560);
        Self {
            codes,
            settle_ms: 500,
            reset_ms: 2000,
        }
    }
}

impl PulseSettings {
    /// Look up the dwell code for an action.
    pub fn code_for(&self, action: ActuatorAction) -> ConfigResult<u32> {
        self.codes
            .get(action.key())
            .copied()
            .ok_or_else(|| ConfigError::MissingActionCode(action.key().to_string()))
    }
}

/// One part to be placed, in workspace coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartSpec {
    pub x: f64,
    pub y: f64,
    /// Print height at which the part is placed
    pub z: f64,
}

/// Pick-and-place settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSettings {
    /// X coordinate shared by all part bins
    pub bin_x: f64,
    /// Y coordinate of the bin for each placement index
    pub bin_y: Vec<f64>,
    /// X distance from the plastic nozzle to the claw (mm)
    pub claw_x_offset: f64,
    /// Y distance from the plastic nozzle to the claw (mm)
    pub claw_y_offset: f64,
    /// Layer height of the print; a part is placed one layer above its
    /// target z so the claw clears the deposited material
    pub layer_height: f64,
    /// Feed rate for bin and placement travel moves (mm/min)
    pub travel_feed_rate: f64,
    /// Parts to place, in any order; the scheduler sorts by ascending z
    pub parts: Vec<PartSpec>,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            bin_x: 1.0,
            bin_y: Vec::new(),
            claw_x_offset: 60.325,
            claw_y_offset: 53.975,
            layer_height: 0.2,
            travel_feed_rate: 300.0,
            parts: Vec::new(),
        }
    }
}

/// Marker vocabulary recognized in the input stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSettings {
    /// Tool change selecting the conductive dispenser
    pub secondary_select: String,
    /// Tool change selecting the plastic extruder
    pub primary_select: String,
    /// Substring marking a non-depositing travel move
    pub travel_move: String,
    /// Prefix of a motion command
    pub motion_prefix: String,
    /// Word letter carrying plastic extrusion amounts
    pub extrusion_axis: char,
    /// End-of-program marker targeted by block relocation
    pub end_of_program: String,
    /// Substring whose presence proves an extrusion block rewrote a move
    pub content_marker: String,
    /// Lines containing any of these markers are dropped entirely
    pub skip_markers: Vec<String>,
}

impl Default for MarkerSettings {
    fn default() -> Self {
        Self {
            secondary_select: "M135 T1".to_string(),
            primary_select: "M135 T0".to_string(),
            travel_move: "Travel move".to_string(),
            motion_prefix: "G1".to_string(),
            extrusion_axis: 'B',
            end_of_program: "M30".to_string(),
            content_marker: "(old line:".to_string(),
            // Carriage-edge guards plus long-retract lines the dispenser
            // firmware cannot honor.
            skip_markers: vec![
                "X105".to_string(),
                "X-112".to_string(),
                "Long Retract Extruder: A".to_string(),
            ],
        }
    }
}

/// Complete configuration for one rewriting run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Run the second pass that relocates action blocks to the
    /// end-of-program marker
    pub relocate_blocks: bool,
    pub offsets: OffsetSettings,
    pub pulses: PulseSettings,
    pub placement: PlacementSettings,
    pub markers: MarkerSettings,
}

impl RewriteConfig {
    /// Validate the configuration.
    ///
    /// Called by the engine before the first input line is read; a failure
    /// here means no output is produced at all.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("offsets.x_offset", self.offsets.x_offset),
            ("offsets.y_offset", self.offsets.y_offset),
            ("offsets.feed_rate", self.offsets.feed_rate),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    reason: format!("must be finite, got {}", value),
                });
            }
        }
        if self.offsets.feed_rate <= 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "offsets.feed_rate".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        for action in ActuatorAction::ALL {
            self.pulses.code_for(action)?;
        }
        if self.pulses.settle_ms == 0 || self.pulses.reset_ms == 0 {
            return Err(ConfigError::InvalidValue {
                name: "pulses".to_string(),
                reason: "settle_ms and reset_ms must be non-zero".to_string(),
            });
        }

        for (index, part) in self.placement.parts.iter().enumerate() {
            if !(part.x.is_finite() && part.y.is_finite() && part.z.is_finite()) {
                return Err(ConfigError::NonFinitePart {
                    index,
                    x: part.x,
                    y: part.y,
                    z: part.z,
                });
            }
        }
        if self.placement.bin_y.len() < self.placement.parts.len() {
            return Err(ConfigError::NotEnoughBins {
                parts: self.placement.parts.len(),
                bins: self.placement.bin_y.len(),
            });
        }
        if self.placement.layer_height < 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "placement.layer_height".to_string(),
                reason: "must not be negative".to_string(),
            });
        }

        for (name, marker) in [
            ("secondary_select", &self.markers.secondary_select),
            ("primary_select", &self.markers.primary_select),
            ("travel_move", &self.markers.travel_move),
            ("motion_prefix", &self.markers.motion_prefix),
            ("end_of_program", &self.markers.end_of_program),
            ("content_marker", &self.markers.content_marker),
        ] {
            if marker.is_empty() {
                return Err(ConfigError::EmptyMarker(name));
            }
        }

        Ok(())
    }
}
