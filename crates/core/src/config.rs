//! View configuration and timeline construction options.
//!
//! Every section has a complete default. Callers pass a partial JSON
//! document which is deep-merged onto the serialized defaults before
//! deserializing, so `{"ruler": {"height": 40}}` changes one field and
//! keeps the rest.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracklane_protocol::{Paint, ThemeToken};

use crate::error::Result;
use crate::model::{Axis, MONTH, Marker, SECOND, TimeRange, TimelineEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RulerColors {
    pub background: Paint,
    pub primary_level: Paint,
    pub secondary_level: Paint,
    pub text_outline: Paint,
    pub border: Paint,
    pub weekend: Paint,
}

impl Default for RulerColors {
    fn default() -> Self {
        Self {
            background: ThemeToken::RulerBackground.into(),
            primary_level: ThemeToken::RulerPrimaryText.into(),
            secondary_level: ThemeToken::RulerSecondaryText.into(),
            text_outline: ThemeToken::RulerTextOutline.into(),
            border: ThemeToken::RulerBorder.into(),
            weekend: ThemeToken::RulerWeekend.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RulerConfig {
    pub height: f64,
    /// Horizontal budget per label when choosing a level.
    pub spacing: f64,
    /// Baseline of the primary label row.
    pub position: f64,
    /// Baseline of the secondary label row.
    pub sub_position: f64,
    pub font_size: f64,
    pub color: RulerColors,
}

impl Default for RulerConfig {
    fn default() -> Self {
        Self {
            height: 36.0,
            spacing: 60.0,
            position: 30.0,
            sub_position: 14.0,
            font_size: 11.0,
            color: RulerColors::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    pub spacing: f64,
    pub line_width: f64,
    /// Extra width a level's marks may use beyond the canvas width.
    pub width_buffer: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spacing: 60.0,
            line_width: 1.0,
            width_buffer: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeMode {
    #[default]
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxesConfig {
    /// Vertical distance between track centers.
    pub track_height: f64,
    /// Height of an event box, shared by rendering and hit-testing.
    pub line_height: f64,
    pub line_width: f64,
    pub color: Paint,
    pub stroke_mode: StrokeMode,
    pub dashed_line_pattern: [f64; 2],
    pub solid_line_pattern: Option<[f64; 2]>,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            track_height: 20.0,
            line_height: 16.0,
            line_width: 1.0,
            color: ThemeToken::AxisLine.into(),
            stroke_mode: StrokeMode::Solid,
            dashed_line_pattern: [4.0, 4.0],
            solid_line_pattern: None,
        }
    }
}

impl AxesConfig {
    pub fn dash(&self) -> Option<[f64; 2]> {
        match self.stroke_mode {
            StrokeMode::Solid => self.solid_line_pattern,
            StrokeMode::Dashed => Some(self.dashed_line_pattern),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventsConfig {
    pub hitbox_padding: f64,
    /// Side of the square probed around the pointer.
    pub hit_size: f64,
    pub font_size: f64,
    pub default_color: Paint,
    pub default_selected_color: Paint,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            hitbox_padding: 1.0,
            hit_size: crate::spatial::HIT_SIZE,
            font_size: 12.0,
            default_color: ThemeToken::EventFill.into(),
            default_selected_color: ThemeToken::EventSelectedFill.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkersConfig {
    pub marker_width: f64,
    pub label_height: f64,
    /// Horizontal padding inside a label box, on each side.
    pub label_padding: f64,
    /// Baseline offset of the label text from the label box top.
    pub text_padding: f64,
    pub label_font_size: f64,
    pub text_color: Paint,
}

impl Default for MarkersConfig {
    fn default() -> Self {
        Self {
            marker_width: 1.0,
            label_height: 16.0,
            label_padding: 4.0,
            text_padding: 12.0,
            label_font_size: 11.0,
            text_color: ThemeToken::MarkerLabelText.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionConfig {
    /// Fraction of the visible duration shifted per wheel delta unit.
    pub wheel_pan_speed: f64,
    /// Narrowest visible duration reachable by zooming.
    pub zoom_min: f64,
    /// Widest visible duration reachable by zooming.
    pub zoom_max: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
    /// Vertical wheel deltas at or below this magnitude are ignored.
    pub wheel_dead_zone: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            wheel_pan_speed: 0.00025,
            zoom_min: 5.0 * SECOND,
            zoom_max: 2.0 * MONTH,
            zoom_in_factor: 0.9,
            zoom_out_factor: 1.15,
            wheel_dead_zone: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfiguration {
    pub ruler: RulerConfig,
    pub grid: GridConfig,
    pub axes: AxesConfig,
    pub events: EventsConfig,
    pub markers: MarkersConfig,
    pub interaction: InteractionConfig,
    pub hide_ruler: bool,
    pub hide_grid: bool,
    pub hide_axes: bool,
    pub hide_markers: bool,
    /// Calendar offset used to align grid lines and ruler labels.
    pub utc_offset_minutes: i32,
    pub background: Paint,
}

impl Default for ViewConfiguration {
    fn default() -> Self {
        Self {
            ruler: RulerConfig::default(),
            grid: GridConfig::default(),
            axes: AxesConfig::default(),
            events: EventsConfig::default(),
            markers: MarkersConfig::default(),
            interaction: InteractionConfig::default(),
            hide_ruler: false,
            hide_grid: false,
            hide_axes: false,
            hide_markers: false,
            utc_offset_minutes: 0,
            background: ThemeToken::Background.into(),
        }
    }
}

impl ViewConfiguration {
    /// Defaults with `overrides` deep-merged on top.
    pub fn with_overrides(overrides: Option<&Value>) -> Result<Self> {
        let Some(overrides) = overrides else {
            return Ok(Self::default());
        };
        if !overrides.is_object() && !overrides.is_null() {
            return Err(<serde_json::Error as serde::de::Error>::custom(
                "view configuration must be an object",
            )
            .into());
        }
        let mut merged = serde_json::to_value(Self::default())?;
        merge(&mut merged, overrides);
        Ok(serde_json::from_value(merged)?)
    }

    /// Height of the fixed header above the scrolling content.
    pub fn content_top(&self) -> f64 {
        if self.hide_ruler { 0.0 } else { self.ruler.height }
    }
}

/// Recursively merge `patch` into `base`. Objects merge key by key, any
/// other value (arrays included) replaces the base value.
fn merge(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, patch) => *base = patch.clone(),
    }
}

/// Everything needed to construct a timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineConfig {
    pub time_range: TimeRange,
    #[serde(default)]
    pub axes: Vec<Axis>,
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
    #[serde(default)]
    pub markers: Vec<Marker>,
    /// Partial override of [`ViewConfiguration`].
    #[serde(default)]
    pub view_configuration: Option<Value>,
}

impl TimelineConfig {
    pub fn new(time_range: TimeRange) -> Self {
        Self {
            time_range,
            axes: Vec::new(),
            events: Vec::new(),
            markers: Vec::new(),
            view_configuration: None,
        }
    }

    pub fn with_axes(mut self, axes: Vec<Axis>) -> Self {
        self.axes = axes;
        self
    }

    pub fn with_events(mut self, events: Vec<TimelineEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn with_markers(mut self, markers: Vec<Marker>) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_view_configuration(mut self, overrides: Value) -> Self {
        self.view_configuration = Some(overrides);
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tracklane_protocol::Color;

    use super::*;

    #[test]
    fn no_overrides_gives_defaults() {
        let config = ViewConfiguration::with_overrides(None).ok();
        assert_eq!(config, Some(ViewConfiguration::default()));
    }

    #[test]
    fn partial_override_keeps_siblings() {
        let overrides = json!({
            "ruler": { "height": 48, "color": { "border": "#ff0000" } },
            "axes": { "strokeMode": "dashed" },
            "hideGrid": true
        });
        let Ok(config) = ViewConfiguration::with_overrides(Some(&overrides)) else {
            panic!("override should merge");
        };
        assert_eq!(config.ruler.height, 48.0);
        assert_eq!(config.ruler.spacing, RulerConfig::default().spacing);
        assert_eq!(
            config.ruler.color.border,
            Paint::Color(Color::rgb8(0xff, 0, 0))
        );
        assert_eq!(
            config.ruler.color.background,
            Paint::Token(ThemeToken::RulerBackground)
        );
        assert_eq!(config.axes.dash(), Some([4.0, 4.0]));
        assert!(config.hide_grid);
        assert!(!config.hide_ruler);
    }

    #[test]
    fn malformed_override_is_rejected() {
        let wrong_type = json!({ "ruler": { "height": "tall" } });
        assert!(ViewConfiguration::with_overrides(Some(&wrong_type)).is_err());

        let not_object = json!([1, 2, 3]);
        assert!(ViewConfiguration::with_overrides(Some(&not_object)).is_err());
    }

    #[test]
    fn content_top_follows_ruler_visibility() {
        let mut config = ViewConfiguration::default();
        assert_eq!(config.content_top(), config.ruler.height);
        config.hide_ruler = true;
        assert_eq!(config.content_top(), 0.0);
    }

    #[test]
    fn timeline_config_from_json() {
        let json = r#"{
            "timeRange": {"start": 0, "end": 3000},
            "axes": [{"id": "1", "top": 0, "height": 40, "tracksCount": 2}],
            "events": [{"id": "e", "from": 1000, "to": 2000, "axisId": "1", "trackIndex": 0}],
            "viewConfiguration": {"hideRuler": true}
        }"#;
        let parsed: std::result::Result<TimelineConfig, _> = serde_json::from_str(json);
        let Ok(config) = parsed else {
            panic!("config should parse");
        };
        assert_eq!(config.axes.len(), 1);
        assert_eq!(config.events.len(), 1);
        assert!(config.markers.is_empty());
        assert!(config.view_configuration.is_some());
    }
}
