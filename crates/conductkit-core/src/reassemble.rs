//! Second-pass block reassembler.
//!
//! The first pass wraps every dispenser-activation region and every
//! placement region in begin/end marker lines. This pass re-scans that
//! annotated text, buffers marked blocks, discards extrusion blocks that
//! never rewrote a move (no content marker), and re-emits the survivors
//! immediately after the end-of-program marker. Partial blocks would
//! corrupt actuator timing, so any structural mismatch is fatal.

use crate::config::MarkerSettings;
use crate::error::{EngineError, EngineResult};

/// Begin marker for a dispenser-activation region.
pub const EXTRUSION_START: &str = "(START OF CONDUCTIVE EXTRUSION)";
/// End marker for a dispenser-activation region.
pub const EXTRUSION_END: &str = "(END OF CONDUCTIVE EXTRUSION)";
/// Begin marker for a placement region.
pub const PICK_PLACE_START: &str = "(START OF PICK AND PLACE CODE)";
/// End marker for a placement region.
pub const PICK_PLACE_END: &str = "(END OF PICK AND PLACE CODE)";

#[derive(Debug)]
enum Mode {
    Passthrough,
    Buffering {
        kind: BlockKind,
        start_line: usize,
        lines: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Extrusion,
    PickPlace,
}

impl BlockKind {
    fn name(&self) -> &'static str {
        match self {
            BlockKind::Extrusion => "extrusion",
            BlockKind::PickPlace => "pick-and-place",
        }
    }
}

fn marker_kind(line: &str) -> Option<(BlockKind, bool)> {
    match line.trim() {
        EXTRUSION_START => Some((BlockKind::Extrusion, true)),
        EXTRUSION_END => Some((BlockKind::Extrusion, false)),
        PICK_PLACE_START => Some((BlockKind::PickPlace, true)),
        PICK_PLACE_END => Some((BlockKind::PickPlace, false)),
        _ => None,
    }
}

/// Relocate marked action blocks to the end-of-program marker.
///
/// Extrusion blocks must contain `markers.content_marker` to survive;
/// placement blocks always survive. Returns the final output text.
pub fn reassemble(annotated: &str, markers: &MarkerSettings) -> EngineResult<String> {
    let mut output: Vec<String> = Vec::new();
    let mut deferred: Vec<Vec<String>> = Vec::new();
    let mut mode = Mode::Passthrough;
    let mut end_seen = false;

    for (index, raw) in annotated.lines().enumerate() {
        let line_number = index + 1;

        mode = match (std::mem::replace(&mut mode, Mode::Passthrough), marker_kind(raw)) {
            (Mode::Passthrough, Some((kind, true))) => Mode::Buffering {
                kind,
                start_line: line_number,
                lines: vec![raw.to_string()],
            },
            (Mode::Passthrough, Some((kind, false))) => {
                return Err(EngineError::StrayEndMarker {
                    kind: kind.name(),
                    line: line_number,
                });
            }
            (Mode::Passthrough, None) => {
                output.push(raw.to_string());
                if raw.contains(&markers.end_of_program) && !end_seen {
                    end_seen = true;
                    for block in deferred.drain(..) {
                        output.extend(block);
                    }
                }
                Mode::Passthrough
            }
            (Mode::Buffering { kind, .. }, Some((_, true))) => {
                return Err(EngineError::NestedBlock {
                    kind: kind.name(),
                    line: line_number,
                });
            }
            (
                Mode::Buffering {
                    kind,
                    start_line,
                    mut lines,
                },
                Some((end_kind, false)),
            ) => {
                if end_kind != kind {
                    return Err(EngineError::StrayEndMarker {
                        kind: end_kind.name(),
                        line: line_number,
                    });
                }
                lines.push(raw.to_string());
                let keep = match kind {
                    BlockKind::PickPlace => true,
                    BlockKind::Extrusion => {
                        lines.iter().any(|l| l.contains(&markers.content_marker))
                    }
                };
                if keep {
                    deferred.push(lines);
                } else {
                    tracing::debug!(
                        "Discarding empty {} block at lines {}..{}",
                        kind.name(),
                        start_line,
                        line_number
                    );
                }
                Mode::Passthrough
            }
            (
                Mode::Buffering {
                    kind,
                    start_line,
                    mut lines,
                },
                None,
            ) => {
                lines.push(raw.to_string());
                Mode::Buffering {
                    kind,
                    start_line,
                    lines,
                }
            }
        };
    }

    if let Mode::Buffering {
        kind, start_line, ..
    } = mode
    {
        return Err(EngineError::UnterminatedBlock {
            kind: kind.name(),
            start_line,
        });
    }
    if !deferred.is_empty() {
        return Err(EngineError::MissingEndOfProgram {
            marker: markers.end_of_program.clone(),
            count: deferred.len(),
        });
    }

    let mut text = output.join("\n");
    text.push('\n');
    Ok(text)
}
