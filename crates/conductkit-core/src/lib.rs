//! # ConductKit Core
//!
//! The G-code rewriting engine behind ConductKit. Takes the output of a
//! dual-extrusion slice, replaces tool changes between the plastic extruder
//! and the conductive-material dispenser with timed actuator-pulse macros,
//! offsets dispensing moves for the physical separation between tool heads,
//! and optionally interleaves pick-and-place operations at configured print
//! heights.
//!
//! ## Components
//!
//! - **Tokenizer/Classifier** ([`line`]): raw text line to classified
//!   [`GcodeLine`] with parsed axis words
//! - **Pump state machine** ([`pump`]): tracks dispenser activation across
//!   tool changes and travel moves
//! - **Coordinate transformer** ([`transform`]): offsets and re-feeds
//!   dispensing moves, strips plastic extrusion
//! - **Pulse encoder** ([`pulse`]): discrete actuator commands as timed
//!   dwell pulses on a single control line
//! - **Pick-and-place scheduler** ([`placer`]): one placement macro per part,
//!   in ascending height order
//! - **Block reassembler** ([`reassemble`]): second pass relocating action
//!   blocks to the end-of-program marker
//! - **Engine** ([`engine`]): the single-pass driver threading all of the
//!   above over the input
//!
//! The engine only ever produces text; writing files and presenting results
//! belongs to the caller.

pub mod config;
pub mod engine;
pub mod error;
pub mod line;
pub mod placer;
pub mod pulse;
pub mod pump;
pub mod reassemble;
pub mod transform;

pub use config::{
    MarkerSettings, OffsetSettings, PartSpec, PlacementSettings, PulseSettings, RewriteConfig,
};
pub use engine::{rewrite, Engine, RewriteOutput, RunReport};
pub use error::{ConfigError, ConfigResult, EngineError, EngineResult};
pub use line::{Classifier, GcodeLine, LineKind, ParseWarning, Word};
pub use placer::{Part, Scheduler};
pub use pulse::{ActuatorAction, MacroSequence, PulseEncoder, PulseStep, SignalLevel};
pub use pump::PumpState;
pub use reassemble::{
    reassemble, EXTRUSION_END, EXTRUSION_START, PICK_PLACE_END, PICK_PLACE_START,
};
pub use transform::transform_motion;
