use tracklane_protocol::{Paint, Point, Rect, RenderCommand, TextAlign, Viewport};

/// Current 2D transform: `device = css * scale + (tx, ty)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.tx, p.y * self.scale + self.ty)
    }
}

/// Records draw calls for one frame.
///
/// Mirrors the stateful parts of a 2D context that layers rely on (the
/// transform and its save stack) so callers can inspect where things land,
/// and emits a flat [`RenderCommand`] list for a surface to replay.
pub struct Canvas {
    viewport: Viewport,
    commands: Vec<RenderCommand>,
    transform: Transform,
    stack: Vec<Transform>,
}

impl Canvas {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            commands: Vec::with_capacity(256),
            transform: Transform::IDENTITY,
            stack: Vec::new(),
        }
    }

    /// CSS width.
    pub fn width(&self) -> f64 {
        self.viewport.width
    }

    /// CSS height.
    pub fn height(&self) -> f64 {
        self.viewport.height
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<RenderCommand> {
        self.commands
    }

    pub fn clear(&mut self) {
        self.commands.push(RenderCommand::Clear);
    }

    pub fn save(&mut self) {
        self.stack.push(self.transform);
        self.commands.push(RenderCommand::Save);
    }

    pub fn restore(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.transform = t;
            self.commands.push(RenderCommand::Restore);
        }
    }

    pub fn set_transform(&mut self, scale: f64, translate: Point) {
        self.transform = Transform {
            scale,
            tx: translate.x,
            ty: translate.y,
        };
        self.commands
            .push(RenderCommand::SetTransform { scale, translate });
    }

    /// Device-pixel-ratio scale only. For chrome pinned to the viewport.
    pub fn use_static_transform(&mut self) {
        self.set_transform(self.viewport.dpr, Point::new(0.0, 0.0));
    }

    /// Device-pixel-ratio scale shifted up by the scroll offset. For content
    /// that scrolls under the header.
    pub fn use_scroll_transform(&mut self, scroll_top: f64) {
        let dpr = self.viewport.dpr;
        self.set_transform(dpr, Point::new(0.0, -scroll_top * dpr));
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.transform.tx += dx * self.transform.scale;
        self.transform.ty += dy * self.transform.scale;
        self.commands.push(RenderCommand::Translate { dx, dy });
    }

    pub fn fill_rect(&mut self, rect: Rect, paint: impl Into<Paint>) {
        self.commands.push(RenderCommand::FillRect {
            rect,
            paint: paint.into(),
        });
    }

    pub fn stroke_line(
        &mut self,
        from: Point,
        to: Point,
        paint: impl Into<Paint>,
        width: f64,
        dash: Option<[f64; 2]>,
    ) {
        self.commands.push(RenderCommand::StrokeLine {
            from,
            to,
            paint: paint.into(),
            width,
            dash,
        });
    }

    pub fn fill_text(
        &mut self,
        position: Point,
        text: impl Into<String>,
        paint: impl Into<Paint>,
        font_size: f64,
        outline: Option<Paint>,
    ) {
        self.commands.push(RenderCommand::FillText {
            position,
            text: text.into(),
            paint: paint.into(),
            font_size,
            align: TextAlign::Left,
            outline,
        });
    }

    pub fn begin_group(&mut self, id: &str) {
        self.commands.push(RenderCommand::BeginGroup { id: id.to_string() });
    }

    pub fn end_group(&mut self) {
        self.commands.push(RenderCommand::EndGroup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_transform_offsets_by_device_pixels() {
        let mut canvas = Canvas::new(Viewport::new(100.0, 100.0, 2.0));
        canvas.use_scroll_transform(15.0);
        assert_eq!(
            canvas.transform(),
            Transform {
                scale: 2.0,
                tx: 0.0,
                ty: -30.0
            }
        );
        canvas.translate(0.0, 30.0);
        assert_eq!(canvas.transform().apply(Point::new(1.0, 0.0)), Point::new(2.0, 30.0));
    }

    #[test]
    fn restore_returns_saved_transform() {
        let mut canvas = Canvas::new(Viewport::new(100.0, 100.0, 1.0));
        canvas.save();
        canvas.use_scroll_transform(10.0);
        canvas.restore();
        assert_eq!(canvas.transform(), Transform::IDENTITY);

        // Unbalanced restore is ignored.
        canvas.restore();
        let restores = canvas
            .commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::Restore))
            .count();
        assert_eq!(restores, 1);
    }
}
