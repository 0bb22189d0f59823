//! Dispenser pump state machine.
//!
//! Tracks whether the conductive dispenser is logically active and whether
//! the first post-activation travel move has been seen. Purely in-memory
//! state for a single run.

/// Pump activation state.
///
/// ```text
/// Inactive --secondary select--> ActiveAwaitingTravel
/// ActiveAwaitingTravel --first travel move--> ActiveSteady
/// ActiveAwaitingTravel | ActiveSteady --primary select--> Inactive
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PumpState {
    /// Dispenser off; motion commands pass through untransformed
    #[default]
    Inactive,
    /// Dispenser selected, first travel move not yet seen
    ActiveAwaitingTravel,
    /// Dispenser selected and positioned
    ActiveSteady,
}

impl PumpState {
    /// The dispenser was selected.
    pub fn on_secondary_select(&mut self) {
        *self = PumpState::ActiveAwaitingTravel;
    }

    /// The plastic extruder was selected; also resets the travel latch.
    pub fn on_primary_select(&mut self) {
        *self = PumpState::Inactive;
    }

    /// A travel move was seen. Returns true when it is the first one since
    /// activation.
    pub fn on_travel_move(&mut self) -> bool {
        match self {
            PumpState::ActiveAwaitingTravel => {
                *self = PumpState::ActiveSteady;
                true
            }
            _ => false,
        }
    }

    /// Whether motion commands should be offset-transformed.
    pub fn is_active(&self) -> bool {
        !matches!(self, PumpState::Inactive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_cycle() {
        let mut pump = PumpState::default();
        assert!(!pump.is_active());

        pump.on_secondary_select();
        assert_eq!(pump, PumpState::ActiveAwaitingTravel);
        assert!(pump.is_active());

        assert!(pump.on_travel_move());
        assert_eq!(pump, PumpState::ActiveSteady);

        // Subsequent travel moves are not "first" anymore.
        assert!(!pump.on_travel_move());
        assert_eq!(pump, PumpState::ActiveSteady);

        pump.on_primary_select();
        assert_eq!(pump, PumpState::Inactive);
    }

    #[test]
    fn test_travel_latch_resets_on_reactivation() {
        let mut pump = PumpState::default();
        pump.on_secondary_select();
        assert!(pump.on_travel_move());
        pump.on_primary_select();

        pump.on_secondary_select();
        assert_eq!(pump, PumpState::ActiveAwaitingTravel);
        assert!(pump.on_travel_move());
    }

    #[test]
    fn test_travel_while_inactive_is_ignored() {
        let mut pump = PumpState::default();
        assert!(!pump.on_travel_move());
        assert_eq!(pump, PumpState::Inactive);
    }
}
