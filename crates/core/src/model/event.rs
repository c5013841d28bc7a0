use serde::{Deserialize, Serialize};
use tracklane_protocol::{AxisId, Color, EventId};

use super::time::Timestamp;

/// Which drawer renders an event.
///
/// Resolved by the events layer through the timeline's renderer registry;
/// the event itself is never mutated to cache a renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RendererRef {
    #[default]
    Default,
    Custom { id: String },
}

/// A time-ranged item placed on one track of one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: EventId,
    pub from: Timestamp,
    /// `None` means open-ended: the event runs to the end of the visible range.
    #[serde(default)]
    pub to: Option<Timestamp>,
    pub axis_id: AxisId,
    pub track_index: i64,
    #[serde(default)]
    pub renderer: RendererRef,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub selected_color: Option<Color>,
}

impl TimelineEvent {
    pub fn new(
        id: impl Into<EventId>,
        from: Timestamp,
        to: Option<Timestamp>,
        axis_id: impl Into<AxisId>,
        track_index: i64,
    ) -> Self {
        Self {
            id: id.into(),
            from,
            to,
            axis_id: axis_id.into(),
            track_index,
            renderer: RendererRef::Default,
            color: None,
            selected_color: None,
        }
    }

    pub fn with_renderer(mut self, id: impl Into<String>) -> Self {
        self.renderer = RendererRef::Custom { id: id.into() };
        self
    }

    pub fn with_colors(mut self, color: Option<Color>, selected_color: Option<Color>) -> Self {
        self.color = color;
        self.selected_color = selected_color;
        self
    }

    pub fn is_endless(&self) -> bool {
        self.to.is_none()
    }

    /// End time, substituting `domain_end` for open-ended events.
    pub fn end_or(&self, domain_end: Timestamp) -> Timestamp {
        self.to.unwrap_or(domain_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_event() {
        let json = r#"{"id":"e1","from":100,"axisId":"ax","trackIndex":0}"#;
        let event: Result<TimelineEvent, _> = serde_json::from_str(json);
        let Ok(event) = event else {
            panic!("minimal event should parse");
        };
        assert_eq!(event.id, "e1");
        assert!(event.is_endless());
        assert_eq!(event.renderer, RendererRef::Default);
        assert_eq!(event.end_or(900.0), 900.0);
    }

    #[test]
    fn deserializes_custom_renderer_and_colors() {
        let json = r##"{
            "id": "e2", "from": 1, "to": 2, "axisId": "ax", "trackIndex": 3,
            "renderer": {"kind": "custom", "id": "striped"},
            "color": "#333", "selectedColor": "#546"
        }"##;
        let event: Result<TimelineEvent, _> = serde_json::from_str(json);
        let Ok(event) = event else {
            panic!("full event should parse");
        };
        assert_eq!(
            event.renderer,
            RendererRef::Custom {
                id: "striped".into()
            }
        );
        assert!(event.color.is_some());
        assert_eq!(event.end_or(900.0), 2.0);
    }
}
