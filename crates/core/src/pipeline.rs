use crate::canvas::Canvas;
use crate::config::ViewConfiguration;
use crate::views::{
    AxesLayer, EventsLayer, FrameContext, GridLayer, Layer, LayerKey, MarkersLayer, RulerLayer,
};

/// Layers in draw order, keyed by [`LayerKey`].
///
/// Every frame redraws every layer; there is no per-layer invalidation.
#[derive(Default)]
pub struct RenderPipeline {
    layers: Vec<Layer>,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid, axes, events, ruler, markers, minus whatever `config` hides.
    pub fn with_default_layers(config: &ViewConfiguration) -> Self {
        let mut pipeline = Self::new();
        if !config.hide_grid {
            pipeline.add_layer(Layer::Grid(GridLayer::new()));
        }
        if !config.hide_axes {
            pipeline.add_layer(Layer::Axes(AxesLayer::new()));
        }
        pipeline.add_layer(Layer::Events(EventsLayer::new()));
        if !config.hide_ruler {
            pipeline.add_layer(Layer::Ruler(RulerLayer::new()));
        }
        if !config.hide_markers {
            pipeline.add_layer(Layer::Markers(MarkersLayer::new()));
        }
        pipeline
    }

    /// Append `layer`, or replace the layer with the same key in place.
    pub fn add_layer(&mut self, layer: Layer) {
        let key = layer.key();
        match self.layers.iter_mut().find(|l| l.key() == key) {
            Some(slot) => {
                slot.destroy();
                *slot = layer;
            }
            None => self.layers.push(layer),
        }
    }

    pub fn remove_layer(&mut self, key: LayerKey) -> Option<Layer> {
        let index = self.layers.iter().position(|l| l.key() == key)?;
        let mut layer = self.layers.remove(index);
        layer.destroy();
        Some(layer)
    }

    pub fn layer(&self, key: LayerKey) -> Option<&Layer> {
        self.layers.iter().find(|l| l.key() == key)
    }

    pub fn keys(&self) -> Vec<LayerKey> {
        self.layers.iter().map(Layer::key).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Record one frame. With `clear`, the backing store is wiped first.
    pub fn render(&mut self, frame: &FrameContext<'_>, canvas: &mut Canvas, clear: bool) {
        if clear {
            canvas.clear();
        }
        if self.layers.is_empty() {
            return;
        }
        canvas.save();
        for layer in &mut self.layers {
            layer.render(frame, canvas);
        }
        canvas.restore();
        log::trace!("pipeline: {} layers, {} commands", self.layers.len(), canvas.commands().len());
    }

    /// Release every layer.
    pub fn destroy(&mut self) {
        for layer in &mut self.layers {
            layer.destroy();
        }
        self.layers.clear();
    }
}

#[cfg(test)]
mod tests {
    use tracklane_protocol::RenderCommand;

    use super::*;
    use crate::model::TimeRange;
    use crate::views::test_support::Fixture;

    fn groups(commands: &[RenderCommand]) -> Vec<&str> {
        commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::BeginGroup { id } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn frame_is_clear_save_layers_restore() {
        let fixture = Fixture::new(TimeRange::new(0.0, 1000.0), 300.0, 200.0);
        let mut pipeline = RenderPipeline::with_default_layers(&fixture.config);
        let mut canvas = fixture.canvas();
        pipeline.render(&fixture.frame(), &mut canvas, true);

        let commands = canvas.commands();
        assert!(matches!(commands[0], RenderCommand::Clear));
        assert!(matches!(commands[1], RenderCommand::Save));
        assert!(matches!(commands.last(), Some(RenderCommand::Restore)));
        assert_eq!(groups(commands), vec!["grid", "axes", "events", "ruler", "markers"]);
    }

    #[test]
    fn partial_render_still_draws_every_layer() {
        let fixture = Fixture::new(TimeRange::new(0.0, 1000.0), 300.0, 200.0);
        let mut pipeline = RenderPipeline::with_default_layers(&fixture.config);
        let mut canvas = fixture.canvas();
        pipeline.render(&fixture.frame(), &mut canvas, false);
        assert!(matches!(canvas.commands()[0], RenderCommand::Save));
        assert_eq!(groups(canvas.commands()).len(), 5);
    }

    #[test]
    fn hidden_layers_are_not_registered() {
        let mut fixture = Fixture::new(TimeRange::new(0.0, 1000.0), 300.0, 200.0);
        fixture.config.hide_ruler = true;
        fixture.config.hide_grid = true;
        let pipeline = RenderPipeline::with_default_layers(&fixture.config);
        assert_eq!(pipeline.keys(), vec![LayerKey::Axes, LayerKey::Events, LayerKey::Markers]);
    }

    #[test]
    fn replace_keeps_position_and_remove_drops() {
        let fixture = Fixture::new(TimeRange::new(0.0, 1000.0), 300.0, 200.0);
        let mut pipeline = RenderPipeline::with_default_layers(&fixture.config);
        pipeline.add_layer(Layer::Axes(AxesLayer::new()));
        assert_eq!(pipeline.keys()[1], LayerKey::Axes);

        assert!(pipeline.remove_layer(LayerKey::Ruler).is_some());
        assert!(pipeline.remove_layer(LayerKey::Ruler).is_none());
        assert!(pipeline.layer(LayerKey::Ruler).is_none());
        assert_eq!(pipeline.keys().len(), 4);

        pipeline.destroy();
        assert!(pipeline.is_empty());
    }
}
