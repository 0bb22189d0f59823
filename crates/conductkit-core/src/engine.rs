//! The rewriting engine.
//!
//! A single synchronous pass over the input: each line is classified,
//! rewritten according to the pump state, and appended to the output buffer;
//! the pick-and-place scheduler is consulted after every line. When block
//! relocation is enabled the annotated text is then fed through the
//! second-pass reassembler.
//!
//! A run either completes and returns the full output text or fails with an
//! [`EngineError`]; no partial output is ever handed back.

use crate::config::RewriteConfig;
use crate::error::{EngineError, EngineResult};
use crate::line::{Classifier, LineKind, ParseWarning};
use crate::placer::Scheduler;
use crate::pulse::PulseEncoder;
use crate::pump::PumpState;
use crate::reassemble::{reassemble, EXTRUSION_END, EXTRUSION_START};
use crate::transform::transform_motion;

/// Comment left where the dispenser tool change used to be.
const TOOLCHANGE_COMMENT: &str = "(Used to be a toolchange here)";

/// Sentinel line separating vendor start-code from the sliced program.
const START_CODE_SENTINEL: &str = ";";

/// Statistics for one completed run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Input lines consumed
    pub lines_read: usize,
    /// Output lines produced
    pub lines_written: usize,
    /// Input lines dropped by the skip list
    pub lines_skipped: usize,
    /// Tokens that failed to parse and were passed through verbatim
    pub parse_warnings: Vec<ParseWarning>,
    /// Parts placed by the scheduler
    pub parts_placed: usize,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RewriteOutput {
    /// Final output text, newline-terminated
    pub text: String,
    pub report: RunReport,
}

/// Rewrite one G-code program.
///
/// `preamble`, when present, is prepended verbatim and the input's own
/// vendor start-code (everything up to and including the first bare `;`
/// line) is dropped so it appears only once.
pub fn rewrite(
    input: &str,
    preamble: Option<&str>,
    config: &RewriteConfig,
) -> EngineResult<RewriteOutput> {
    Engine::new(config.clone())?.run(input, preamble)
}

/// Line-oriented rewriting state machine.
///
/// Owns all run state exclusively for its lifetime; a fresh engine is built
/// per run.
pub struct Engine {
    config: RewriteConfig,
    classifier: Classifier,
    encoder: PulseEncoder,
    pump: PumpState,
    scheduler: Scheduler,
    /// Last Z seen on a motion or travel line
    current_z: Option<f64>,
}

impl Engine {
    /// Build an engine, rejecting a bad configuration before any input is
    /// read.
    pub fn new(config: RewriteConfig) -> EngineResult<Self> {
        config.validate()?;
        let classifier = Classifier::new(config.markers.clone());
        let encoder = PulseEncoder::new(config.pulses.clone());
        let scheduler = Scheduler::new(config.placement.clone());
        Ok(Self {
            config,
            classifier,
            encoder,
            pump: PumpState::default(),
            scheduler,
            current_z: None,
        })
    }

    /// Consume the input and produce the final output text.
    pub fn run(mut self, input: &str, preamble: Option<&str>) -> EngineResult<RewriteOutput> {
        let mut report = RunReport::default();
        let mut output: Vec<String> = Vec::new();

        let mut skipping_start_code = false;
        if let Some(preamble) = preamble {
            for line in preamble.lines() {
                output.push(line.to_string());
            }
            if input.lines().any(|l| l.trim() == START_CODE_SENTINEL) {
                skipping_start_code = true;
            } else {
                tracing::warn!(
                    "Preamble supplied but no '{}' sentinel in input; nothing skipped",
                    START_CODE_SENTINEL
                );
            }
        }

        for (index, raw) in input.lines().enumerate() {
            let line_number = index + 1;
            report.lines_read += 1;

            if skipping_start_code {
                if raw.trim() == START_CODE_SENTINEL {
                    skipping_start_code = false;
                }
                report.lines_skipped += 1;
                continue;
            }

            if self.classifier.should_skip(raw) {
                report.lines_skipped += 1;
                continue;
            }

            let line = self.classifier.classify(raw, line_number);

            match line.kind {
                LineKind::SecondarySelect => {
                    if !self.pump.is_active() && self.config.relocate_blocks {
                        output.push(EXTRUSION_START.to_string());
                    }
                    output.push(TOOLCHANGE_COMMENT.to_string());
                    self.pump.on_secondary_select();
                }
                LineKind::PrimarySelect => {
                    let was_active = self.pump.is_active();
                    output.extend(self.encoder.extrude_off().to_gcode());
                    if was_active && self.config.relocate_blocks {
                        output.push(EXTRUSION_END.to_string());
                    }
                    self.pump.on_primary_select();
                }
                LineKind::TravelMove => {
                    if let Some(z) = line.word('Z') {
                        self.current_z = Some(z);
                    }
                    for warning in &line.warnings {
                        tracing::warn!("{}", warning);
                    }
                    report.parse_warnings.extend(line.warnings.clone());

                    if self.pump.is_active() {
                        let first = self.pump.on_travel_move();
                        if first {
                            output.push(raw.to_string());
                        } else {
                            // Pause the pump across repositioning moves.
                            output.extend(self.encoder.extrude_off().to_gcode());
                            output.push(raw.to_string());
                        }
                        output.extend(self.encoder.extrude_on()?.to_gcode());
                    } else {
                        output.push(raw.to_string());
                    }
                }
                LineKind::Motion => {
                    if let Some(z) = line.word('Z') {
                        self.current_z = Some(z);
                    }
                    if self.pump.is_active() {
                        let (rewritten, warnings) = transform_motion(
                            raw,
                            line_number,
                            &self.config.offsets,
                            self.config.markers.extrusion_axis,
                        );
                        for warning in &warnings {
                            tracing::warn!("{}", warning);
                        }
                        report.parse_warnings.extend(warnings);
                        output.push(rewritten);
                    } else {
                        for warning in &line.warnings {
                            tracing::warn!("{}", warning);
                        }
                        report.parse_warnings.extend(line.warnings.clone());
                        output.push(raw.to_string());
                    }
                }
                LineKind::Other => {
                    output.push(raw.to_string());
                }
            }

            if let Some(z) = self.current_z {
                if self.scheduler.ready(z, self.pump.is_active()) {
                    output.extend(self.scheduler.emit_placement(&self.encoder)?);
                    report.parts_placed += 1;
                    tracing::info!(
                        "Placed part {} of {}",
                        self.scheduler.placed_count(),
                        self.scheduler.placed_count() + self.scheduler.remaining()
                    );
                }
            }
        }

        if self.scheduler.remaining() > 0 {
            return Err(EngineError::PartsNotPlaced {
                remaining: self.scheduler.remaining(),
                total: self.scheduler.remaining() + self.scheduler.placed_count(),
            });
        }

        let mut text = output.join("\n");
        text.push('\n');

        if self.config.relocate_blocks {
            text = reassemble(&text, &self.config.markers)?;
        }

        report.lines_written = text.lines().count();
        Ok(RewriteOutput { text, report })
    }
}
