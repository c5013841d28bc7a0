use serde::{Deserialize, Serialize};

use crate::types::Color;

/// Semantic color tokens resolved by the backend's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,

    // Ruler
    RulerBackground,
    RulerPrimaryText,
    RulerSecondaryText,
    RulerTextOutline,
    RulerBorder,
    RulerWeekend,

    // Grid
    GridBoundary,
    GridPrimary,
    GridSecondary,

    // Axes
    AxisLine,

    // Events
    EventFill,
    EventSelectedFill,

    // Markers
    MarkerLabelText,
}

/// Either a theme token or a literal color supplied by the caller.
///
/// Deserializes from a token name (`"GridPrimary"`) or a hex string
/// (`"#ff8800"`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Paint {
    Token(ThemeToken),
    Color(Color),
}

impl From<ThemeToken> for Paint {
    fn from(token: ThemeToken) -> Self {
        Paint::Token(token)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Color(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_accepts_token_or_hex() {
        let token: Result<Paint, _> = serde_json::from_str("\"GridPrimary\"");
        assert_eq!(token.ok(), Some(Paint::Token(ThemeToken::GridPrimary)));

        let color: Result<Paint, _> = serde_json::from_str("\"#102030\"");
        assert_eq!(color.ok(), Some(Paint::Color(Color::rgb8(0x10, 0x20, 0x30))));

        let bad: Result<Paint, _> = serde_json::from_str("\"NotAToken\"");
        assert!(bad.is_err());
    }
}
