use serde::{Deserialize, Serialize};
use tracklane_protocol::Color;

use super::time::Timestamp;

/// A vertical line at a point in time, with optional top and bottom labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub time: Timestamp,
    pub color: Color,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub label_text_color: Option<Color>,
    #[serde(default)]
    pub label_background_color: Option<Color>,
    #[serde(default)]
    pub label_bottom: Option<String>,
    #[serde(default)]
    pub label_bottom_background_color: Option<Color>,
    #[serde(default)]
    pub label_bottom_text_color: Option<Color>,
}

impl Marker {
    pub fn new(time: Timestamp, color: Color) -> Self {
        Self {
            time,
            color,
            width: None,
            label: None,
            label_text_color: None,
            label_background_color: None,
            label_bottom: None,
            label_bottom_background_color: None,
            label_bottom_text_color: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_bottom_label(mut self, label: impl Into<String>) -> Self {
        self.label_bottom = Some(label.into());
        self
    }
}
