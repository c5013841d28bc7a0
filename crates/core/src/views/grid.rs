use tracklane_protocol::Point;

use super::FrameContext;
use crate::canvas::Canvas;
use crate::levels::grid::GRID_LEVELS;
use crate::levels::{WidthCache, select_level, timestamp};

/// Vertical calendar lines below the ruler.
#[derive(Default)]
pub struct GridLayer {
    widths: WidthCache,
}

impl GridLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, frame: &FrameContext<'_>, canvas: &mut Canvas) {
        canvas.use_static_transform();

        let grid = &frame.config.grid;
        let range = frame.range;
        let width = frame.viewport.width;
        let Some(index) = select_level(
            &GRID_LEVELS,
            &mut self.widths,
            &frame.calendar,
            range.duration(),
            width,
            grid.spacing,
            grid.width_buffer,
        ) else {
            return;
        };
        let level = &GRID_LEVELS[index];

        let top = frame.content_top();
        let bottom = frame.viewport.height;
        let scale = frame.scale();

        let mut cursor = level.cadence.start(&frame.calendar, range.start);
        while let Some(t) = cursor {
            let ms = timestamp(&t);
            if ms >= range.end {
                break;
            }
            let x = scale.time_to_pixel(ms).floor();
            canvas.stroke_line(
                Point::new(x, top),
                Point::new(x, bottom),
                (level.style)(&t).token(),
                grid.line_width,
                None,
            );
            cursor = level.cadence.step(&t);
        }
        log::trace!("grid: level {index}");
    }

    pub fn destroy(&mut self) {
        self.widths = WidthCache::new();
    }
}
