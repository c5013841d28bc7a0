use tracklane_protocol::{Color, Paint, ThemeToken};

/// Resolved RGBA color for egui rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ResolvedColor {
    const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }
}

impl From<Color> for ResolvedColor {
    fn from(color: Color) -> Self {
        let [r, g, b, a] = color.to_rgba8();
        Self::rgba(r, g, b, a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn from_visuals(visuals: &egui::Visuals) -> Self {
        if visuals.dark_mode {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }
}

pub fn resolve(token: ThemeToken, mode: ThemeMode) -> egui::Color32 {
    resolve_token(token, mode).to_color32()
}

/// Literal colors pass through; tokens go through the palette for `mode`.
pub fn resolve_paint(paint: Paint, mode: ThemeMode) -> egui::Color32 {
    match paint {
        Paint::Token(token) => resolve(token, mode),
        Paint::Color(color) => ResolvedColor::from(color).to_color32(),
    }
}

fn resolve_token(token: ThemeToken, mode: ThemeMode) -> ResolvedColor {
    match mode {
        ThemeMode::Dark => resolve_dark(token),
        ThemeMode::Light => resolve_light(token),
    }
}

fn resolve_dark(token: ThemeToken) -> ResolvedColor {
    // Catppuccin Mocha palette
    use ThemeToken::*;
    match token {
        Background => ResolvedColor::rgb(0x1e, 0x1e, 0x2e), // Base

        RulerBackground => ResolvedColor::rgb(0x18, 0x18, 0x25), // Mantle
        RulerPrimaryText => ResolvedColor::rgb(0xcd, 0xd6, 0xf4), // Text
        RulerSecondaryText => ResolvedColor::rgb(0xa6, 0xad, 0xc8), // Subtext0
        RulerTextOutline => ResolvedColor::rgb(0x18, 0x18, 0x25),
        RulerBorder => ResolvedColor::rgb(0x31, 0x32, 0x44), // Surface0
        RulerWeekend => ResolvedColor::rgb(0xf3, 0x8b, 0xa8), // Red

        GridBoundary => ResolvedColor::rgb(0x58, 0x5b, 0x70), // Surface2
        GridPrimary => ResolvedColor::rgb(0x45, 0x47, 0x5a),  // Surface1
        GridSecondary => ResolvedColor::rgb(0x31, 0x32, 0x44), // Surface0

        AxisLine => ResolvedColor::rgba(0x6c, 0x70, 0x86, 120), // Overlay0

        EventFill => ResolvedColor::rgb(0x89, 0xb4, 0xfa), // Blue
        EventSelectedFill => ResolvedColor::rgb(0xf9, 0xe2, 0xaf), // Yellow

        MarkerLabelText => ResolvedColor::rgb(0x11, 0x11, 0x1b), // Crust
    }
}

fn resolve_light(token: ThemeToken) -> ResolvedColor {
    use ThemeToken::*;
    match token {
        Background => ResolvedColor::rgb(250, 250, 252),

        RulerBackground => ResolvedColor::rgb(240, 240, 245),
        RulerPrimaryText => ResolvedColor::rgb(20, 20, 30),
        RulerSecondaryText => ResolvedColor::rgb(100, 100, 110),
        RulerTextOutline => ResolvedColor::rgb(240, 240, 245),
        RulerBorder => ResolvedColor::rgb(210, 210, 220),
        RulerWeekend => ResolvedColor::rgb(220, 60, 20),

        GridBoundary => ResolvedColor::rgb(170, 170, 185),
        GridPrimary => ResolvedColor::rgb(210, 210, 220),
        GridSecondary => ResolvedColor::rgb(232, 232, 238),

        AxisLine => ResolvedColor::rgba(120, 120, 140, 90),

        EventFill => ResolvedColor::rgb(40, 120, 200),
        EventSelectedFill => ResolvedColor::rgb(230, 150, 20),

        MarkerLabelText => ResolvedColor::rgb(255, 255, 255),
    }
}
