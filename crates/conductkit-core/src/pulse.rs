//! Pulse-macro encoder.
//!
//! Discrete actuator commands are sent to the dispenser firmware over a
//! single two-state control line (asserted with `M126`, deasserted with
//! `M127`). A command is encoded as "assert, hold for a command-specific
//! dwell, deassert", where the dwell width is the command identifier itself.
//! A fixed-width reset/sync pulse precedes every command pulse so the
//! firmware can tell real commands from transients.

use crate::config::PulseSettings;
use crate::error::ConfigResult;

/// Logical actuator actions understood by the dispenser firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActuatorAction {
    /// Start/identify conductive extrusion
    Extrude,
    ClampOpen,
    ClampClose,
    ArmRaise,
    ArmLower,
}

impl ActuatorAction {
    pub const ALL: [ActuatorAction; 5] = [
        ActuatorAction::Extrude,
        ActuatorAction::ClampOpen,
        ActuatorAction::ClampClose,
        ActuatorAction::ArmRaise,
        ActuatorAction::ArmLower,
    ];

    /// Stable key used in the configuration table.
    pub fn key(&self) -> &'static str {
        match self {
            ActuatorAction::Extrude => "extrude",
            ActuatorAction::ClampOpen => "clamp-open",
            ActuatorAction::ClampClose => "clamp-close",
            ActuatorAction::ArmRaise => "arm-raise",
            ActuatorAction::ArmLower => "arm-lower",
        }
    }

    /// Human-readable label written into emitted G-code comments.
    pub fn label(&self) -> &'static str {
        match self {
            ActuatorAction::Extrude => "extrude conductor",
            ActuatorAction::ClampOpen => "open clamp",
            ActuatorAction::ClampClose => "close clamp",
            ActuatorAction::ArmRaise => "raise arm",
            ActuatorAction::ArmLower => "lower arm",
        }
    }
}

/// Control line level during one dwell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalLevel {
    Asserted,
    Deasserted,
}

/// One timed hold of the control line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseStep {
    pub level: SignalLevel,
    pub dwell_ms: u32,
}

/// An ordered pulse train encoding one discrete actuator command.
///
/// Built fresh per invocation from the configured code table; carries no
/// state of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroSequence {
    pub steps: Vec<PulseStep>,
    /// Leave the line asserted after the final step (extrude-on keeps the
    /// pump motor running)
    pub hold_asserted: bool,
    /// Comment attached to the final level change
    pub label: String,
}

impl MacroSequence {
    /// Render the sequence as G-code lines.
    ///
    /// The control line is assumed deasserted on entry; every level change
    /// becomes an `M126`/`M127` line and every dwell a `G4 P<ms>` line.
    pub fn to_gcode(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = SignalLevel::Deasserted;

        for step in &self.steps {
            if step.level != current {
                lines.push(match step.level {
                    SignalLevel::Asserted => "M126;".to_string(),
                    SignalLevel::Deasserted => "M127;".to_string(),
                });
                current = step.level;
            }
            lines.push(format!("G4 P{};", step.dwell_ms));
        }

        match (self.hold_asserted, current) {
            (true, SignalLevel::Deasserted) => {
                lines.push(format!("M126; ({})", self.label));
            }
            (false, SignalLevel::Asserted) => {
                lines.push(format!("M127; ({})", self.label));
            }
            (true, SignalLevel::Asserted) => {
                // Already asserted; re-label the last assert for readability.
            }
            (false, SignalLevel::Deasserted) if self.steps.is_empty() => {
                lines.push(format!("M127; ({})", self.label));
            }
            _ => {}
        }

        lines
    }
}

/// Encoder over a configured action-code table.
#[derive(Debug, Clone)]
pub struct PulseEncoder {
    settings: PulseSettings,
}

impl PulseEncoder {
    pub fn new(settings: PulseSettings) -> Self {
        Self { settings }
    }

    /// Encode one discrete actuator command.
    ///
    /// Frame: settle (deasserted), reset/sync pulse (asserted), settle,
    /// command pulse whose dwell is the action's code, deassert.
    pub fn encode(&self, action: ActuatorAction) -> ConfigResult<MacroSequence> {
        let code = self.settings.code_for(action)?;
        Ok(MacroSequence {
            steps: vec![
                PulseStep {
                    level: SignalLevel::Deasserted,
                    dwell_ms: self.settings.settle_ms,
                },
                PulseStep {
                    level: SignalLevel::Asserted,
                    dwell_ms: self.settings.reset_ms,
                },
                PulseStep {
                    level: SignalLevel::Deasserted,
                    dwell_ms: self.settings.settle_ms,
                },
                PulseStep {
                    level: SignalLevel::Asserted,
                    dwell_ms: code,
                },
            ],
            hold_asserted: false,
            label: format!("control signal to {}", action.label()),
        })
    }

    /// Encode the extrude command and leave the control line asserted so the
    /// pump motor keeps running.
    pub fn extrude_on(&self) -> ConfigResult<MacroSequence> {
        let mut sequence = self.encode(ActuatorAction::Extrude)?;
        sequence.steps.push(PulseStep {
            level: SignalLevel::Deasserted,
            dwell_ms: self.settings.settle_ms,
        });
        sequence.hold_asserted = true;
        sequence.label = "Turn on conductor extrusion".to_string();
        Ok(sequence)
    }

    /// Deassert the control line, stopping conductive extrusion.
    pub fn extrude_off(&self) -> MacroSequence {
        MacroSequence {
            steps: Vec::new(),
            hold_asserted: false,
            label: "turns off conductor extrusion".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> PulseEncoder {
        PulseEncoder::new(PulseSettings::default())
    }

    #[test]
    fn test_encode_frames_command_with_reset() {
        let seq = encoder().encode(ActuatorAction::ClampOpen).unwrap();
        let dwells: Vec<u32> = seq.steps.iter().map(|s| s.dwell_ms).collect();
        assert_eq!(dwells, vec![500, 2000, 500, 880]);
        assert_eq!(seq.steps[1].level, SignalLevel::Asserted);
        assert!(!seq.hold_asserted);
    }

    #[test]
    fn test_gcode_rendering() {
        let seq = encoder().encode(ActuatorAction::ArmLower).unwrap();
        let lines = seq.to_gcode();
        assert_eq!(
            lines,
            vec![
                "G4 P500;",
                "M126;",
                "G4 P2000;",
                "M127;",
                "G4 P500;",
                "M126;",
                "G4 P400;",
                "M127; (control signal to lower arm)",
            ]
        );
    }

    #[test]
    fn test_extrude_on_holds_asserted() {
        let lines = encoder().extrude_on().unwrap().to_gcode();
        assert_eq!(
            lines.last().unwrap(),
            "M126; (Turn on conductor extrusion)"
        );
        // The command code itself appears once.
        assert_eq!(lines.iter().filter(|l| l.contains("P160")).count(), 1);
    }

    #[test]
    fn test_extrude_off_is_bare_deassert() {
        let lines = encoder().extrude_off().to_gcode();
        assert_eq!(lines, vec!["M127; (turns off conductor extrusion)"]);
    }

    #[test]
    fn test_custom_code_table() {
        let mut settings = PulseSettings::default();
        settings.codes.insert("clamp-open".to_string(), 999);
        let seq = PulseEncoder::new(settings)
            .encode(ActuatorAction::ClampOpen)
            .unwrap();
        assert_eq!(seq.steps.last().unwrap().dwell_ms, 999);
    }
}
