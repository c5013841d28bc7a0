//! Drawable layers.
//!
//! Every layer reads the same [`FrameContext`] and draws into the shared
//! [`Canvas`], choosing the static or the scrolling transform itself.

pub mod axes;
pub mod events;
pub mod grid;
pub mod markers;
pub mod ruler;

use tracklane_protocol::Viewport;

use crate::axis_registry::AxisRegistry;
use crate::canvas::Canvas;
use crate::config::ViewConfiguration;
use crate::host::TextMeasure;
use crate::levels::Calendar;
use crate::model::{Marker, TimeRange, TimelineEvent};
use crate::renderer::RendererRegistry;
use crate::scale::TimeScale;
use crate::selection::Selection;

pub use axes::AxesLayer;
pub use events::EventsLayer;
pub use grid::GridLayer;
pub use markers::MarkersLayer;
pub use ruler::RulerLayer;

/// Read-only state for one frame.
pub struct FrameContext<'a> {
    pub config: &'a ViewConfiguration,
    pub range: TimeRange,
    pub viewport: Viewport,
    pub scroll_top: f64,
    pub axes: &'a AxisRegistry,
    pub events: &'a [TimelineEvent],
    pub markers: &'a [Marker],
    pub selection: &'a Selection,
    pub renderers: &'a RendererRegistry,
    pub calendar: Calendar,
    pub measure: &'a dyn TextMeasure,
}

impl FrameContext<'_> {
    pub fn scale(&self) -> TimeScale {
        TimeScale::new(self.range, self.viewport.width)
    }

    /// Height of the fixed header above the scrolling content.
    pub fn content_top(&self) -> f64 {
        self.config.content_top()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKey {
    Grid,
    Axes,
    Events,
    Ruler,
    Markers,
}

impl LayerKey {
    pub fn as_str(self) -> &'static str {
        match self {
            LayerKey::Grid => "grid",
            LayerKey::Axes => "axes",
            LayerKey::Events => "events",
            LayerKey::Ruler => "ruler",
            LayerKey::Markers => "markers",
        }
    }
}

pub enum Layer {
    Grid(GridLayer),
    Axes(AxesLayer),
    Events(EventsLayer),
    Ruler(RulerLayer),
    Markers(MarkersLayer),
}

impl Layer {
    pub fn key(&self) -> LayerKey {
        match self {
            Layer::Grid(_) => LayerKey::Grid,
            Layer::Axes(_) => LayerKey::Axes,
            Layer::Events(_) => LayerKey::Events,
            Layer::Ruler(_) => LayerKey::Ruler,
            Layer::Markers(_) => LayerKey::Markers,
        }
    }

    /// Draw this layer, wrapped in a group named after its key.
    pub fn render(&mut self, frame: &FrameContext<'_>, canvas: &mut Canvas) {
        canvas.begin_group(self.key().as_str());
        match self {
            Layer::Grid(layer) => layer.render(frame, canvas),
            Layer::Axes(layer) => layer.render(frame, canvas),
            Layer::Events(layer) => layer.render(frame, canvas),
            Layer::Ruler(layer) => layer.render(frame, canvas),
            Layer::Markers(layer) => layer.render(frame, canvas),
        }
        canvas.end_group();
    }

    /// Release per-layer caches.
    pub fn destroy(&mut self) {
        match self {
            Layer::Grid(layer) => layer.destroy(),
            Layer::Ruler(layer) => layer.destroy(),
            Layer::Markers(layer) => layer.destroy(),
            Layer::Axes(_) | Layer::Events(_) => {}
        }
    }
}
