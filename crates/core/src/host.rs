//! Capabilities the engine needs from its embedding.
//!
//! The timeline never reaches for a window, a navigator or a real canvas.
//! Hosts provide a [`HostEnvironment`] for viewport metrics and a
//! [`Surface`] that receives finished frames.

use tracklane_protocol::{RenderCommand, Viewport};

use crate::model::Timestamp;

/// Modifier that means "command" on the host platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommandKey {
    Meta,
    #[default]
    Ctrl,
}

impl CommandKey {
    /// `Meta` on macOS user agents, `Ctrl` elsewhere.
    pub fn from_user_agent(user_agent: &str) -> Self {
        if user_agent.contains("Mac OS") {
            CommandKey::Meta
        } else {
            CommandKey::Ctrl
        }
    }
}

pub trait HostEnvironment {
    /// CSS size of the drawable area.
    fn viewport_size(&self) -> (f64, f64);

    fn device_pixel_ratio(&self) -> f64;

    fn platform_modifier_key(&self) -> CommandKey;

    /// Wall-clock time in milliseconds since the Unix epoch.
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp_millis() as f64
    }

    fn viewport(&self) -> Viewport {
        let (width, height) = self.viewport_size();
        let dpr = self.device_pixel_ratio();
        Viewport::new(width, height, if dpr > 0.0 { dpr } else { 1.0 })
    }
}

/// Fixed host metrics, for tests and headless rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticHost {
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
    pub command_key: CommandKey,
    pub now: Option<Timestamp>,
}

impl StaticHost {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            dpr: 1.0,
            command_key: CommandKey::Ctrl,
            now: None,
        }
    }

    pub fn with_dpr(mut self, dpr: f64) -> Self {
        self.dpr = dpr;
        self
    }

    pub fn with_command_key(mut self, key: CommandKey) -> Self {
        self.command_key = key;
        self
    }

    pub fn with_now(mut self, now: Timestamp) -> Self {
        self.now = Some(now);
        self
    }
}

impl HostEnvironment for StaticHost {
    fn viewport_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }

    fn platform_modifier_key(&self) -> CommandKey {
        self.command_key
    }

    fn now(&self) -> Timestamp {
        self.now
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() as f64)
    }
}

pub trait TextMeasure {
    /// Advance width of `text` in CSS pixels.
    ///
    /// The default is a monospace estimate for backends without font metrics.
    fn measure_text(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * 0.6
    }
}

/// A drawable target for finished frames.
pub trait Surface: TextMeasure {
    /// Whether the surface can currently be drawn to.
    fn is_drawable(&self) -> bool {
        true
    }

    /// Resize the backing store, in device pixels.
    fn set_backing_size(&mut self, width: u32, height: u32);

    fn present(&mut self, commands: &[RenderCommand]);
}

/// Surface that keeps the last presented frame, for tests and tooling.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub backing_size: (u32, u32),
    pub frames: usize,
    pub last_frame: Vec<RenderCommand>,
    pub drawable: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            drawable: true,
            ..Self::default()
        }
    }

    /// A surface that reports itself as not drawable.
    pub fn detached() -> Self {
        Self::default()
    }
}

impl TextMeasure for RecordingSurface {}

impl Surface for RecordingSurface {
    fn is_drawable(&self) -> bool {
        self.drawable
    }

    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.backing_size = (width, height);
    }

    fn present(&mut self, commands: &[RenderCommand]) {
        self.frames += 1;
        self.last_frame = commands.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_key_from_user_agent() {
        let mac = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15";
        let linux = "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/124.0";
        assert_eq!(CommandKey::from_user_agent(mac), CommandKey::Meta);
        assert_eq!(CommandKey::from_user_agent(linux), CommandKey::Ctrl);
    }

    #[test]
    fn viewport_falls_back_to_unit_ratio() {
        let host = StaticHost::new(300.0, 200.0).with_dpr(0.0);
        assert_eq!(host.viewport().dpr, 1.0);
        let host = StaticHost::new(300.0, 200.0).with_dpr(2.0);
        assert_eq!(host.viewport().backing_size(), (600, 400));
    }

    #[test]
    fn monospace_estimate() {
        let surface = RecordingSurface::new();
        assert_eq!(surface.measure_text("abcd", 10.0), 24.0);
    }
}
