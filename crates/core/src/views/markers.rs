use std::collections::HashMap;

use tracklane_protocol::{Color, Paint, Point, Rect};

use super::FrameContext;
use crate::canvas::Canvas;
use crate::math::{clamp, point_in_range};
use crate::model::Marker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelRow {
    Top,
    Bottom,
}

/// Left edge of the last label placed in each row. Labels are placed right
/// to left, so this is the limit for the next one.
struct Placement {
    top: f64,
    bottom: f64,
}

impl Placement {
    fn slot(&mut self, row: LabelRow) -> &mut f64 {
        match row {
            LabelRow::Top => &mut self.top,
            LabelRow::Bottom => &mut self.bottom,
        }
    }
}

/// Vertical marker lines with top and bottom labels.
#[derive(Default)]
pub struct MarkersLayer {
    label_widths: HashMap<(String, u64), f64>,
}

impl MarkersLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, frame: &FrameContext<'_>, canvas: &mut Canvas) {
        canvas.use_static_transform();
        let cfg = &frame.config.markers;
        let scale = frame.scale();
        let range = frame.range;
        let mut placement = Placement {
            top: f64::INFINITY,
            bottom: f64::INFINITY,
        };

        // Latest first, so earlier labels yield to later ones.
        for marker in frame.markers.iter().rev() {
            let overscan = match &marker.label {
                Some(label) => {
                    let text = frame.measure.measure_text(label, cfg.label_font_size);
                    scale.width_to_duration(text + cfg.label_padding)
                }
                None => 0.0,
            };
            if point_in_range(marker.time, range.start - overscan, range.end + overscan) {
                self.render_marker(frame, canvas, marker, &mut placement);
            }
        }
    }

    fn render_marker(
        &mut self,
        frame: &FrameContext<'_>,
        canvas: &mut Canvas,
        marker: &Marker,
        placement: &mut Placement,
    ) {
        let cfg = &frame.config.markers;
        let x = frame.scale().time_to_pixel(marker.time);
        let top = if marker.label.is_some() { cfg.label_height } else { 0.0 };
        canvas.stroke_line(
            Point::new(x, top),
            Point::new(x, frame.viewport.height),
            marker.color,
            marker.width.unwrap_or(cfg.marker_width),
            None,
        );

        if let Some(label) = &marker.label {
            let background = marker.label_background_color.unwrap_or(marker.color);
            self.render_label(
                frame,
                canvas,
                x,
                label,
                (background, marker.label_text_color),
                LabelRow::Top,
                placement,
            );
        }
        if let Some(label) = &marker.label_bottom {
            let background = marker.label_bottom_background_color.unwrap_or(marker.color);
            self.render_label(
                frame,
                canvas,
                x,
                label,
                (background, marker.label_bottom_text_color),
                LabelRow::Bottom,
                placement,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_label(
        &mut self,
        frame: &FrameContext<'_>,
        canvas: &mut Canvas,
        x: f64,
        label: &str,
        (background, text_color): (Color, Option<Color>),
        row: LabelRow,
        placement: &mut Placement,
    ) {
        let cfg = &frame.config.markers;
        let width = self.label_width(frame, label);
        let last = placement.slot(row);
        if x >= *last {
            return;
        }

        let left = clamp(x - width / 2.0, 0.0, frame.viewport.width.min(*last) - width);
        *last = left;

        let y = match row {
            LabelRow::Top => 0.0,
            LabelRow::Bottom => frame.viewport.height - cfg.label_height,
        };
        canvas.fill_rect(Rect::new(left, y, width, cfg.label_height), background);
        let paint = text_color.map_or(cfg.text_color, Paint::Color);
        canvas.fill_text(
            Point::new(left + cfg.label_padding, y + cfg.text_padding),
            label,
            paint,
            cfg.label_font_size,
            None,
        );
    }

    /// Label box width: text plus padding on both sides. Cached per text and
    /// font size.
    fn label_width(&mut self, frame: &FrameContext<'_>, label: &str) -> f64 {
        let cfg = &frame.config.markers;
        let key = (label.to_string(), cfg.label_font_size.to_bits());
        *self.label_widths.entry(key).or_insert_with(|| {
            frame.measure.measure_text(label, cfg.label_font_size) + cfg.label_padding * 2.0
        })
    }

    pub fn destroy(&mut self) {
        self.label_widths.clear();
    }
}

#[cfg(test)]
mod tests {
    use tracklane_protocol::RenderCommand;

    use super::*;
    use crate::model::TimeRange;
    use crate::views::test_support::Fixture;

    fn label_rects(commands: &[RenderCommand]) -> Vec<Rect> {
        commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::FillRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    fn red() -> Color {
        Color::rgb8(255, 0, 0)
    }

    #[test]
    fn overlapping_earlier_label_is_dropped() {
        let mut fixture = Fixture::new(TimeRange::new(0.0, 1000.0), 1000.0, 200.0);
        // "abcd" at 11px is 26.4px of text, 34.4px with padding.
        fixture.markers = vec![
            Marker::new(500.0, red()).with_label("abcd"),
            Marker::new(510.0, red()).with_label("abcd"),
            Marker::new(900.0, red()).with_label("abcd"),
        ];
        let mut canvas = fixture.canvas();
        MarkersLayer::new().render(&fixture.frame(), &mut canvas);

        let rects = label_rects(canvas.commands());
        // 900 and 510 are placed; 500 is right of 510's label edge and skipped.
        assert_eq!(rects.len(), 2);
        assert!((rects[0].x - (900.0 - 17.2)).abs() < 1e-9);
        assert!((rects[1].x - (510.0 - 17.2)).abs() < 1e-9);

        // Every marker still draws its line, starting below the label.
        let lines: Vec<f64> = canvas
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::StrokeLine { from, .. } => Some(from.y),
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec![16.0, 16.0, 16.0]);
    }

    #[test]
    fn label_is_clamped_against_right_edge_and_overscan() {
        let mut fixture = Fixture::new(TimeRange::new(0.0, 1000.0), 1000.0, 200.0);
        fixture.markers = vec![
            // Just past the range, but its label reaches into view.
            Marker::new(1010.0, red()).with_label("abcd"),
            // Far past the range, not drawn at all.
            Marker::new(5000.0, red()).with_label("abcd"),
        ];
        let mut canvas = fixture.canvas();
        MarkersLayer::new().render(&fixture.frame(), &mut canvas);

        let rects = label_rects(canvas.commands());
        assert_eq!(rects.len(), 1);
        assert!((rects[0].right() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn bottom_row_is_independent() {
        let mut fixture = Fixture::new(TimeRange::new(0.0, 1000.0), 1000.0, 200.0);
        fixture.markers = vec![
            Marker::new(500.0, red()).with_bottom_label("early"),
            Marker::new(505.0, red()).with_label("late"),
        ];
        let mut canvas = fixture.canvas();
        MarkersLayer::new().render(&fixture.frame(), &mut canvas);

        let rects = label_rects(canvas.commands());
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].y, 0.0);
        assert_eq!(rects[1].y, 200.0 - 16.0);
    }
}
