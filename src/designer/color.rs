use ratatui::style::Color;

use crate::error::DesignerError;

/// Accept `#RRGGBB` (any case) and hand the value back untouched.
pub fn validate_color(value: &str) -> Result<&str, DesignerError> {
    match parse_hex_color(value) {
        Some(_) => Ok(value),
        None => Err(DesignerError::InvalidColor(value.to_string())),
    }
}

/// Decode `#RRGGBB` into RGB components.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Terminal color for a template color, falling back to `fallback` when the
/// value cannot be decoded.
pub fn terminal_color(value: &str, fallback: Color) -> Color {
    parse_hex_color(value)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_six_digit_hex_in_any_case() {
        assert_eq!(parse_hex_color("#6366F1"), Some((0x63, 0x66, 0xF1)));
        assert_eq!(parse_hex_color("#ef4444"), Some((0xEF, 0x44, 0x44)));
        assert_eq!(validate_color("#aBcDeF").unwrap(), "#aBcDeF");
    }

    #[test]
    fn rejects_malformed_values() {
        for bad in ["", "#", "6366F1", "#6366F", "#6366F1F", "#GG0000", "#12 456"] {
            assert!(
                matches!(validate_color(bad), Err(DesignerError::InvalidColor(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn terminal_color_falls_back_for_garbage() {
        assert_eq!(terminal_color("#10B981", Color::Reset), Color::Rgb(16, 185, 129));
        assert_eq!(terminal_color("teal", Color::Gray), Color::Gray);
    }
}
