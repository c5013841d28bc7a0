use chrono::{DateTime, FixedOffset};
use tracklane_protocol::{Paint, Point, Rect};

use super::FrameContext;
use crate::canvas::Canvas;
use crate::levels::ruler::{LabelRow, RULER_LEVELS, sup_row};
use crate::levels::{WidthCache, is_weekend, select_level, timestamp};
use crate::math::clamp;

/// Labels are only drawn right of this x; the edge label is pinned here.
const LEFT_GUTTER: f64 = 10.0;
/// Gap between the edge label and the first regular label.
const EDGE_GAP: f64 = 5.0;

/// Fixed header with a primary and a secondary row of time labels.
#[derive(Default)]
pub struct RulerLayer {
    widths: WidthCache,
}

impl RulerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, frame: &FrameContext<'_>, canvas: &mut Canvas) {
        let ruler = &frame.config.ruler;
        let width = frame.viewport.width;
        canvas.use_static_transform();

        canvas.fill_rect(Rect::new(0.0, 0.0, width, ruler.height), ruler.color.background);
        let border_y = ruler.height + 0.5;
        canvas.stroke_line(
            Point::new(0.0, border_y),
            Point::new(width, border_y),
            ruler.color.border,
            1.0,
            None,
        );

        let Some(index) = select_level(
            &RULER_LEVELS,
            &mut self.widths,
            &frame.calendar,
            frame.range.duration(),
            width,
            ruler.spacing,
            0.0,
        ) else {
            return;
        };

        let primary = &RULER_LEVELS[index].row;
        render_row(frame, canvas, primary, ruler.position, ruler.color.primary_level);
        if let Some(sup) = sup_row(&RULER_LEVELS, index) {
            render_row(frame, canvas, &sup, ruler.sub_position, ruler.color.secondary_level);
        }
    }

    pub fn destroy(&mut self) {
        self.widths = WidthCache::new();
    }
}

fn render_row(frame: &FrameContext<'_>, canvas: &mut Canvas, row: &LabelRow, y: f64, paint: Paint) {
    let ruler = &frame.config.ruler;
    let range = frame.range;
    let scale = frame.scale();
    let width = frame.viewport.width;
    let outline = Some(ruler.color.text_outline);
    let paint_for = |t: &DateTime<FixedOffset>| -> Paint {
        if row.weekend && is_weekend(t) {
            ruler.color.weekend
        } else {
            paint
        }
    };

    let mut first_rendered = None;
    let mut cursor = row.cadence.start(&frame.calendar, range.start);
    while let Some(t) = cursor {
        let ms = timestamp(&t);
        if ms >= range.end {
            break;
        }
        let x = scale.time_to_pixel(ms);
        if x > LEFT_GUTTER && x < width {
            if first_rendered.is_none() {
                first_rendered = Some(ms);
            }
            canvas.fill_text(
                Point::new(x, y),
                row.format.format(&t),
                paint_for(&t),
                ruler.font_size,
                outline,
            );
        }
        cursor = row.cadence.step(&t);
    }

    // The label whose mark scrolled off the left edge stays readable,
    // pushed left of the first regular label if they would collide.
    let Some(edge) = frame.calendar.at(scale.pixel_to_time(LEFT_GUTTER)) else {
        return;
    };
    let label = row.format.format(&edge);
    let limit = scale.time_to_pixel(first_rendered.unwrap_or(range.end))
        - frame.measure.measure_text(&label, ruler.font_size)
        - EDGE_GAP;
    let x = clamp(LEFT_GUTTER, f64::NEG_INFINITY, limit);
    canvas.fill_text(Point::new(x, y), label, paint_for(&edge), ruler.font_size, outline);
}

#[cfg(test)]
mod tests {
    use tracklane_protocol::RenderCommand;

    use super::*;
    use crate::model::{MINUTE, TimeRange};
    use crate::views::test_support::Fixture;

    fn texts(commands: &[RenderCommand]) -> Vec<(f64, f64, String)> {
        commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::FillText { position, text, .. } => {
                    Some((position.x, position.y, text.clone()))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn minute_labels_with_edge_label() {
        // 00:00:30 to 00:10:30 UTC over 1000px: five-minute labels.
        let range = TimeRange::new(0.5 * MINUTE, 10.5 * MINUTE);
        let fixture = Fixture::new(range, 1000.0, 200.0);
        let mut canvas = fixture.canvas();
        RulerLayer::new().render(&fixture.frame(), &mut canvas);

        let ruler = &fixture.config.ruler;
        let labels = texts(canvas.commands());
        let primary: Vec<&(f64, f64, String)> =
            labels.iter().filter(|(_, y, _)| *y == ruler.position).collect();
        let names: Vec<&str> = primary.iter().map(|(_, _, s)| s.as_str()).collect();
        // Regular labels at 5′ and 10′, then the edge label for 00′.
        assert_eq!(names, vec!["05′", "10′", "00′"]);
        assert_eq!(primary[0].0, 450.0);
        assert_eq!(primary[2].0, LEFT_GUTTER);

        // Background and border come first.
        assert!(matches!(canvas.commands()[1], RenderCommand::FillRect { .. }));
    }

    #[test]
    fn edge_label_yields_to_first_label() {
        // First regular label lands at x = 20, so the edge label moves left.
        let range = TimeRange::new(4.8 * MINUTE, 14.8 * MINUTE);
        let fixture = Fixture::new(range, 1000.0, 200.0);
        let mut canvas = fixture.canvas();
        RulerLayer::new().render(&fixture.frame(), &mut canvas);

        let ruler = &fixture.config.ruler;
        let labels = texts(canvas.commands());
        let primary: Vec<&(f64, f64, String)> =
            labels.iter().filter(|(_, y, _)| *y == ruler.position).collect();
        let Some(edge) = primary.last() else {
            panic!("edge label drawn");
        };
        assert_eq!(edge.2, "04′");
        let text_width = 3.0 * ruler.font_size * 0.6;
        let expected = 20.0 - text_width - EDGE_GAP;
        assert!((edge.0 - expected).abs() < 1e-9);
    }
}
