use serde::{Deserialize, Serialize};
use tracklane_protocol::AxisId;

/// A horizontal swimlane occupying `[top, top + height)` in content
/// coordinates, subdivided into `tracks_count` tracks.
///
/// Axes are caller-owned and immutable once handed to the registry; the
/// registry only changes which axes are members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub id: AxisId,
    pub top: f64,
    pub height: f64,
    /// Signed so that a malformed negative count survives deserialization
    /// and can be reported by the registry.
    pub tracks_count: i64,
}

impl Axis {
    pub fn new(id: impl Into<AxisId>, top: f64, height: f64, tracks_count: i64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
            tracks_count,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}
