//! Coordinate transformer for dispensing moves.
//!
//! Rewrites a motion command belonging to an active dispenser segment: the
//! configured X/Y offsets are added, the feed rate is overwritten, and the
//! plastic-extrusion word plus everything after it is removed so the
//! dispenser can never co-extrude plastic. The original line is kept as a
//! trailing comment for auditing.

use crate::config::OffsetSettings;
use crate::line::ParseWarning;

/// Rewrite one motion line for the dispenser.
///
/// Numeric output uses `f64`'s shortest round-trip formatting, so re-parsing
/// an offset coordinate yields exactly the written value. A trailing `;` on
/// a token is ignored when parsing and preserved on the rewritten token,
/// matching [`Classifier::classify`](crate::line::Classifier::classify).
/// Tokens whose numeric suffix does not parse are passed through unmodified
/// and reported as warnings.
pub fn transform_motion(
    raw: &str,
    line_number: usize,
    offsets: &OffsetSettings,
    extrusion_axis: char,
) -> (String, Vec<ParseWarning>) {
    let mut out = String::new();
    let mut warnings = Vec::new();

    for token in raw.split_whitespace() {
        let mut chars = token.chars();
        let letter = chars.next();
        let suffix = chars.as_str();
        let number = suffix.trim_end_matches(';');
        let tail = &suffix[number.len()..];

        let rewritten = match letter {
            Some('X') => match number.parse::<f64>() {
                Ok(x) => format!("X{}{}", x + offsets.x_offset, tail),
                Err(_) => {
                    warnings.push(ParseWarning {
                        token: token.to_string(),
                        line_number,
                    });
                    token.to_string()
                }
            },
            Some('Y') => match number.parse::<f64>() {
                Ok(y) => format!("Y{}{}", y + offsets.y_offset, tail),
                Err(_) => {
                    warnings.push(ParseWarning {
                        token: token.to_string(),
                        line_number,
                    });
                    token.to_string()
                }
            },
            Some('F') => format!("F{}{}", offsets.feed_rate, tail),
            Some(letter) if letter == extrusion_axis => {
                // No plastic while dispensing; drop the extrusion word and
                // everything after it, parseable or not.
                break;
            }
            _ => token.to_string(),
        };

        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&rewritten);
    }

    out.push_str(&format!(" (old line: {})", raw));
    (out, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets() -> OffsetSettings {
        OffsetSettings {
            x_offset: 1.0,
            y_offset: 2.0,
            feed_rate: 500.0,
        }
    }

    #[test]
    fn test_offsets_feed_and_extrusion_strip() {
        let (out, warnings) = transform_motion("G1 X10 Y20 F300 B5", 1, &offsets(), 'B');
        assert!(out.starts_with("G1 X11 Y22 F500"));
        let head = out.split("(old line:").next().unwrap();
        assert!(!head.contains('B'));
        assert!(out.contains("(old line: G1 X10 Y20 F300 B5)"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_everything_after_extrusion_word_is_dropped() {
        let (out, _) = transform_motion("G1 X0 B5 Y20 F300", 1, &offsets(), 'B');
        assert!(out.starts_with("G1 X1 (old line:"));
    }

    #[test]
    fn test_round_trip_formatting() {
        let offsets = OffsetSettings {
            x_offset: 18.8722,
            y_offset: 16.648,
            feed_rate: 300.0,
        };
        let (out, _) = transform_motion("G1 X10.3 Y-4.25", 1, &offsets, 'B');
        let x_token = out
            .split_whitespace()
            .find(|t| t.starts_with('X'))
            .unwrap();
        let reparsed: f64 = x_token[1..].parse().unwrap();
        assert_eq!(reparsed, 10.3 + 18.8722);
    }

    #[test]
    fn test_semicolon_suffixed_tokens_are_rewritten() {
        let (out, warnings) = transform_motion("G1 X10; Y20; F300; B5;", 1, &offsets(), 'B');
        assert!(out.starts_with("G1 X11; Y22; F500; (old line:"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unparseable_extrusion_token_still_stripped() {
        let (out, _) = transform_motion("G1 X10 Bjam Y20", 1, &offsets(), 'B');
        assert!(out.starts_with("G1 X11 (old line:"));
    }

    #[test]
    fn test_malformed_token_passes_through_with_warning() {
        let (out, warnings) = transform_motion("G1 X10 Yabc F300", 9, &offsets(), 'B');
        assert!(out.contains("Yabc"));
        assert!(out.contains("X11"));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line_number, 9);
    }

    #[test]
    fn test_zero_offsets_keep_values() {
        let zero = OffsetSettings {
            x_offset: 0.0,
            y_offset: 0.0,
            feed_rate: 300.0,
        };
        let (out, _) = transform_motion("G1 X10 Y20", 1, &zero, 'B');
        assert!(out.starts_with("G1 X10 Y20 (old line:"));
    }
}
