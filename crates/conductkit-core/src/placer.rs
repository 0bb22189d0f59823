//! Pick-and-place scheduler.
//!
//! Holds the queue of parts to place, ordered by ascending target height,
//! and emits one full placement macro per part once the print reaches the
//! part's height while the dispenser is inactive. The `placed` flag is the
//! idempotence guard: no matter how many motion lines satisfy the height
//! trigger, each part's macro is emitted exactly once.

use crate::config::PlacementSettings;
use crate::error::{ConfigError, EngineError, EngineResult};
use crate::pulse::{ActuatorAction, PulseEncoder};
use crate::reassemble::{PICK_PLACE_END, PICK_PLACE_START};

/// One queued part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub placed: bool,
}

/// Scheduler over the sorted part queue.
#[derive(Debug)]
pub struct Scheduler {
    settings: PlacementSettings,
    parts: Vec<Part>,
    next: usize,
}

impl Scheduler {
    /// Build the scheduler, sorting parts ascending by `(z, x, y)` with the
    /// original list index as a final tie-break so the order is a strict
    /// total order even for coincident parts.
    pub fn new(settings: PlacementSettings) -> Self {
        let mut indexed: Vec<(usize, Part)> = settings
            .parts
            .iter()
            .enumerate()
            .map(|(i, p)| {
                (
                    i,
                    Part {
                        x: p.x,
                        y: p.y,
                        z: p.z,
                        placed: false,
                    },
                )
            })
            .collect();
        indexed.sort_by(|(ia, a), (ib, b)| {
            a.z.total_cmp(&b.z)
                .then(a.x.total_cmp(&b.x))
                .then(a.y.total_cmp(&b.y))
                .then(ia.cmp(ib))
        });
        let parts = indexed.into_iter().map(|(_, p)| p).collect();
        Self {
            settings,
            parts,
            next: 0,
        }
    }

    /// The sorted queue, in placement order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Number of parts already placed.
    pub fn placed_count(&self) -> usize {
        self.next
    }

    /// Number of parts still waiting.
    pub fn remaining(&self) -> usize {
        self.parts.len() - self.next
    }

    /// Whether the lowest unplaced part should be placed now.
    ///
    /// True when the tracked print height has reached one layer above the
    /// part's target height and the dispenser is inactive.
    pub fn ready(&self, print_z: f64, pump_active: bool) -> bool {
        if pump_active {
            return false;
        }
        match self.parts.get(self.next) {
            Some(part) if !part.placed => {
                print_z >= part.z + self.settings.layer_height
            }
            _ => false,
        }
    }

    /// Emit the placement macro for the lowest unplaced part and mark it
    /// placed.
    ///
    /// The macro travels to the bin for this placement index, picks the part
    /// (open clamp, lower arm, close clamp, raise arm), travels to the
    /// part's target offset by the claw position, and releases it with the
    /// mirrored sequence. The whole block is wrapped in pick-and-place
    /// markers for the reassembler.
    ///
    /// Errors when the queue is exhausted or no bin coordinate exists for
    /// this placement index.
    pub fn emit_placement(&mut self, encoder: &PulseEncoder) -> EngineResult<Vec<String>> {
        let index = self.next;
        let Some(part) = self.parts.get(index).copied() else {
            return Err(EngineError::PlacementQueueExhausted {
                total: self.parts.len(),
            });
        };
        let bin_y = self.settings.bin_y.get(index).copied().ok_or(
            ConfigError::NotEnoughBins {
                parts: self.parts.len(),
                bins: self.settings.bin_y.len(),
            },
        )?;
        let mut lines = vec![PICK_PLACE_START.to_string()];

        lines.push(format!(
            "G1 X{} Y{} F{} (move to bin)",
            self.settings.bin_x, bin_y, self.settings.travel_feed_rate
        ));
        for action in [
            ActuatorAction::ClampOpen,
            ActuatorAction::ArmLower,
            ActuatorAction::ClampClose,
            ActuatorAction::ArmRaise,
        ] {
            lines.extend(encoder.encode(action)?.to_gcode());
        }

        lines.push(format!(
            "G1 X{} Y{} F{} (move to placement target)",
            part.x + self.settings.claw_x_offset,
            part.y + self.settings.claw_y_offset,
            self.settings.travel_feed_rate
        ));
        for action in [
            ActuatorAction::ArmLower,
            ActuatorAction::ClampOpen,
            ActuatorAction::ArmRaise,
        ] {
            lines.extend(encoder.encode(action)?.to_gcode());
        }

        lines.push(PICK_PLACE_END.to_string());

        self.parts[index].placed = true;
        self.next += 1;
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PartSpec, PulseSettings};

    fn settings(parts: &[(f64, f64, f64)]) -> PlacementSettings {
        PlacementSettings {
            parts: parts
                .iter()
                .map(|&(x, y, z)| PartSpec { x, y, z })
                .collect(),
            bin_y: (0..parts.len()).map(|i| i as f64 * 10.0).collect(),
            ..PlacementSettings::default()
        }
    }

    fn encoder() -> PulseEncoder {
        PulseEncoder::new(PulseSettings::default())
    }

    #[test]
    fn test_queue_sorted_by_height() {
        let scheduler = Scheduler::new(settings(&[
            (0.0, 0.0, 3.0),
            (0.0, 0.0, 1.0),
            (0.0, 0.0, 2.0),
        ]));
        let heights: Vec<f64> = scheduler.parts().iter().map(|p| p.z).collect();
        assert_eq!(heights, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_coincident_parts_keep_list_order() {
        let scheduler = Scheduler::new(settings(&[
            (5.0, 8.0, 1.0),
            (5.0, 8.0, 1.0),
        ]));
        assert_eq!(scheduler.parts().len(), 2);
    }

    #[test]
    fn test_trigger_requires_height_and_inactive_pump() {
        let scheduler = Scheduler::new(settings(&[(0.0, 0.0, 1.0)]));
        assert!(!scheduler.ready(1.0, false)); // below z + layer height
        assert!(scheduler.ready(1.2, false));
        assert!(!scheduler.ready(1.2, true)); // pump active
    }

    #[test]
    fn test_each_part_placed_exactly_once() {
        let mut scheduler = Scheduler::new(settings(&[(0.0, 0.0, 1.0)]));
        let enc = encoder();

        assert!(scheduler.ready(5.0, false));
        scheduler.emit_placement(&enc).unwrap();
        assert_eq!(scheduler.placed_count(), 1);
        // Height still satisfied, but the part is spent.
        assert!(!scheduler.ready(5.0, false));
        assert_eq!(scheduler.remaining(), 0);
    }

    #[test]
    fn test_exhausted_queue_is_an_error_not_a_panic() {
        let mut scheduler = Scheduler::new(settings(&[(0.0, 0.0, 1.0)]));
        let enc = encoder();
        scheduler.emit_placement(&enc).unwrap();

        let err = scheduler.emit_placement(&enc).unwrap_err();
        assert!(matches!(
            err,
            EngineError::PlacementQueueExhausted { total: 1 }
        ));
    }

    #[test]
    fn test_placement_macro_shape() {
        let mut scheduler = Scheduler::new(settings(&[(10.0, 20.0, 1.0)]));
        let lines = scheduler.emit_placement(&encoder()).unwrap();

        assert_eq!(lines.first().unwrap(), PICK_PLACE_START);
        assert_eq!(lines.last().unwrap(), PICK_PLACE_END);
        assert!(lines[1].starts_with("G1 X1 Y0 F300"));
        // Claw offset applied to the placement travel.
        assert!(lines
            .iter()
            .any(|l| l.starts_with("G1 X70.325 Y73.975 F300")));
        // Pick then release: open, lower, close, raise, lower, open, raise.
        let signals: Vec<&String> = lines
            .iter()
            .filter(|l| l.contains("control signal"))
            .collect();
        assert_eq!(signals.len(), 7);
        assert!(signals[0].contains("open clamp"));
        assert!(signals[3].contains("raise arm"));
        assert!(signals[6].contains("raise arm"));
    }
}
