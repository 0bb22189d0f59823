//! G-code line tokenizer and classifier.
//!
//! Turns one raw text line into a [`GcodeLine`]: a classification tag plus
//! the ordered `<letter><number>` words found on the line. A word whose
//! numeric suffix does not parse is a recoverable failure: the token is left
//! opaque and a [`ParseWarning`] is recorded so the caller can report it
//! without aborting the run.

use crate::config::MarkerSettings;

/// Classification of one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Tool change selecting the conductive dispenser
    SecondarySelect,
    /// Tool change selecting the plastic extruder
    PrimarySelect,
    /// Non-depositing repositioning move
    TravelMove,
    /// Motion command
    Motion,
    /// Comment or any other line
    Other,
}

/// One parsed `<letter><number>` word.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Word {
    pub letter: char,
    pub value: f64,
}

/// A word-shaped token whose numeric suffix failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    pub token: String,
    pub line_number: usize,
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: token '{}' has a non-numeric suffix",
            self.line_number, self.token
        )
    }
}

/// One classified input line.
///
/// Immutable once built; rewrites produce new strings rather than mutating
/// the parsed form.
#[derive(Debug, Clone)]
pub struct GcodeLine {
    pub raw: String,
    pub kind: LineKind,
    pub words: Vec<Word>,
    pub warnings: Vec<ParseWarning>,
}

impl GcodeLine {
    /// Get the value of the first word with the given letter, if any.
    pub fn word(&self, letter: char) -> Option<f64> {
        self.words
            .iter()
            .find(|w| w.letter == letter)
            .map(|w| w.value)
    }
}

/// Letters recognized as word prefixes when tokenizing.
const WORD_LETTERS: &[char] = &['X', 'Y', 'Z', 'F', 'T', 'P', 'S'];

/// Tokenizer/classifier for one rewriting run.
///
/// Holds the marker vocabulary; classification itself is stateless.
#[derive(Debug)]
pub struct Classifier {
    markers: MarkerSettings,
}

impl Classifier {
    pub fn new(markers: MarkerSettings) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &MarkerSettings {
        &self.markers
    }

    /// Classify one raw line and parse its words.
    ///
    /// `line_number` is 1-based and only used for warning reports.
    pub fn classify(&self, raw: &str, line_number: usize) -> GcodeLine {
        let kind = if raw.contains(&self.markers.secondary_select) {
            LineKind::SecondarySelect
        } else if raw.contains(&self.markers.primary_select) {
            LineKind::PrimarySelect
        } else if raw.contains(&self.markers.travel_move) {
            LineKind::TravelMove
        } else if raw.trim_start().starts_with(&self.markers.motion_prefix) {
            LineKind::Motion
        } else {
            LineKind::Other
        };

        let mut words = Vec::new();
        let mut warnings = Vec::new();
        if matches!(kind, LineKind::Motion | LineKind::TravelMove) {
            for token in raw.split_whitespace() {
                let mut chars = token.chars();
                let Some(letter) = chars.next() else { continue };
                if !WORD_LETTERS.contains(&letter) && letter != self.markers.extrusion_axis {
                    continue;
                }
                let suffix = chars.as_str().trim_end_matches(';');
                if suffix.is_empty() {
                    continue;
                }
                match suffix.parse::<f64>() {
                    Ok(value) => words.push(Word { letter, value }),
                    Err(_) => warnings.push(ParseWarning {
                        token: token.to_string(),
                        line_number,
                    }),
                }
            }
        }

        GcodeLine {
            raw: raw.to_string(),
            kind,
            words,
            warnings,
        }
    }

    /// Whether the line matches any configured skip marker.
    pub fn should_skip(&self, raw: &str) -> bool {
        self.markers.skip_markers.iter().any(|m| raw.contains(m))
    }

    /// Whether the line carries the end-of-program marker.
    pub fn is_end_of_program(&self, raw: &str) -> bool {
        raw.contains(&self.markers.end_of_program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new(MarkerSettings::default())
    }

    #[test]
    fn test_classify_tool_changes() {
        let c = classifier();
        assert_eq!(
            c.classify("M135 T1; (select dispenser)", 1).kind,
            LineKind::SecondarySelect
        );
        assert_eq!(c.classify("M135 T0", 2).kind, LineKind::PrimarySelect);
    }

    #[test]
    fn test_classify_travel_before_motion() {
        let c = classifier();
        // Travel moves are also G1 lines; the travel marker wins.
        let line = c.classify("G1 X5 Y5 Z1.2 F9000 (Travel move)", 3);
        assert_eq!(line.kind, LineKind::TravelMove);
        assert_eq!(line.word('Z'), Some(1.2));
    }

    #[test]
    fn test_classify_motion_and_words() {
        let c = classifier();
        let line = c.classify("G1 X10.5 Y-2.25 F300 B5", 4);
        assert_eq!(line.kind, LineKind::Motion);
        assert_eq!(line.word('X'), Some(10.5));
        assert_eq!(line.word('Y'), Some(-2.25));
        assert_eq!(line.word('F'), Some(300.0));
        assert_eq!(line.word('B'), Some(5.0));
        assert!(line.warnings.is_empty());
    }

    #[test]
    fn test_classify_other() {
        let c = classifier();
        assert_eq!(c.classify("(some comment)", 5).kind, LineKind::Other);
        assert_eq!(c.classify("M73 P50", 6).kind, LineKind::Other);
    }

    #[test]
    fn test_bad_suffix_is_warning_not_error() {
        let c = classifier();
        let line = c.classify("G1 X10 Yabc F300", 7);
        assert_eq!(line.kind, LineKind::Motion);
        assert_eq!(line.word('X'), Some(10.0));
        assert_eq!(line.word('Y'), None);
        assert_eq!(line.warnings.len(), 1);
        assert_eq!(line.warnings[0].token, "Yabc");
        assert_eq!(line.warnings[0].line_number, 7);
    }

    #[test]
    fn test_skip_markers() {
        let c = classifier();
        assert!(c.should_skip("G1 X105 Y0"));
        assert!(c.should_skip("(Long Retract Extruder: A)"));
        assert!(!c.should_skip("G1 X10 Y0"));
    }
}
