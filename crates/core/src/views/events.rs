use super::FrameContext;
use crate::canvas::Canvas;
use crate::math::ranges_intersect;
use crate::renderer::EventSpan;

/// Events intersecting the visible range, drawn by their renderers.
#[derive(Default)]
pub struct EventsLayer;

impl EventsLayer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&mut self, frame: &FrameContext<'_>, canvas: &mut Canvas) {
        let axes = &frame.config.axes;
        let range = frame.range;
        let scale = frame.scale();

        canvas.use_scroll_transform(frame.scroll_top);
        canvas.translate(0.0, frame.content_top());

        let mut drawn = 0usize;
        for event in frame.events {
            let Some(axis) = frame.axes.get(event.axis_id.as_str()) else {
                continue;
            };
            let to = event.end_or(range.end);
            if !ranges_intersect(range.start, range.end, event.from, to) {
                continue;
            }
            let Ok(y) = frame.axes.track_position(axis, event.track_index, axes.track_height) else {
                continue;
            };
            let span = EventSpan {
                x0: scale.time_to_pixel(event.from),
                x1: scale.time_to_pixel(to),
                y,
                height: axes.line_height,
            };
            let selected = frame.selection.is_selected(event.id.as_str());
            frame
                .renderers
                .resolve(&event.renderer)
                .render(canvas, event, selected, span);
            drawn += 1;
        }
        log::trace!("events: drew {drawn} of {}", frame.events.len());
    }
}

#[cfg(test)]
mod tests {
    use tracklane_protocol::{Paint, Rect, RenderCommand, ThemeToken};

    use super::*;
    use crate::model::{Axis, TimeRange, TimelineEvent};
    use crate::views::test_support::Fixture;

    fn fill_rects(commands: &[RenderCommand]) -> Vec<(Rect, Paint)> {
        commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::FillRect { rect, paint } => Some((*rect, *paint)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn draws_visible_events_and_skips_the_rest() {
        let mut fixture = Fixture::new(TimeRange::new(0.0, 3000.0), 300.0, 200.0)
            .with_axes(vec![Axis::new("1", 0.0, 40.0, 2)]);
        fixture.events = vec![
            TimelineEvent::new("e", 1000.0, Some(2000.0), "1", 0),
            TimelineEvent::new("late", 5000.0, Some(6000.0), "1", 0),
            TimelineEvent::new("orphan", 1000.0, Some(2000.0), "nope", 0),
            TimelineEvent::new("open", 2500.0, None, "1", 1),
            TimelineEvent::new("edge", 3000.0, Some(3500.0), "1", 1),
        ];
        fixture.selection.set_selected(["open".into()]);

        let mut canvas = fixture.canvas();
        EventsLayer::new().render(&fixture.frame(), &mut canvas);
        let rects = fill_rects(canvas.commands());

        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0].0, Rect::new(100.0, 2.0, 100.0, 16.0));
        assert_eq!(rects[0].1, Paint::Token(ThemeToken::EventFill));
        // Open-ended runs to the end of the range, on track 1.
        assert_eq!(rects[1].0, Rect::new(250.0, 22.0, 50.0, 16.0));
        assert_eq!(rects[1].1, Paint::Token(ThemeToken::EventSelectedFill));
        // Touching the range end still counts as visible.
        assert_eq!(rects[2].0.x, 300.0);
    }
}
