use tracklane_protocol::Point;

use super::FrameContext;
use crate::canvas::Canvas;

/// One horizontal line per track, scrolling with the content.
#[derive(Default)]
pub struct AxesLayer;

impl AxesLayer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&mut self, frame: &FrameContext<'_>, canvas: &mut Canvas) {
        let axes = &frame.config.axes;
        canvas.use_scroll_transform(frame.scroll_top);
        canvas.translate(0.0, frame.content_top());

        let width = frame.viewport.width;
        let dash = axes.dash();
        for axis in frame.axes.sorted() {
            for track in 0..axis.tracks_count {
                let Ok(y) = frame.axes.track_position(axis, track, axes.track_height) else {
                    break;
                };
                canvas.stroke_line(
                    Point::new(0.0, y),
                    Point::new(width, y),
                    axes.color,
                    axes.line_width,
                    dash,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tracklane_protocol::RenderCommand;

    use super::*;
    use crate::config::StrokeMode;
    use crate::model::{Axis, TimeRange};
    use crate::views::test_support::Fixture;

    #[test]
    fn lines_at_track_centers_in_top_order() {
        let mut fixture = Fixture::new(TimeRange::new(0.0, 1000.0), 300.0, 200.0)
            .with_axes(vec![Axis::new("low", 100.0, 40.0, 1), Axis::new("high", 0.0, 40.0, 2)]);
        fixture.config.axes.stroke_mode = StrokeMode::Dashed;
        fixture.scroll_top = 5.0;

        let mut canvas = fixture.canvas();
        AxesLayer::new().render(&fixture.frame(), &mut canvas);

        let ys: Vec<f64> = canvas
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::StrokeLine { from, to, dash, .. } => {
                    assert_eq!(to.x, 300.0);
                    assert_eq!(*dash, Some([4.0, 4.0]));
                    Some(from.y)
                }
                _ => None,
            })
            .collect();
        assert_eq!(ys, vec![10.0, 30.0, 110.0]);

        let ruler = fixture.config.ruler.height;
        assert_eq!(canvas.transform().ty, ruler - 5.0);
    }
}
