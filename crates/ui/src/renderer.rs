use egui::{Align2, CornerRadius, FontId, Pos2, Rect, Shape, Stroke};
use tracklane_protocol::{Point, RenderCommand, TextAlign};

use crate::theme::{self, ThemeMode};

/// Current 2D transform while replaying a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Transform {
    scale: f64,
    tx: f64,
    ty: f64,
}

impl Transform {
    fn identity() -> Self {
        Self {
            scale: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    fn apply(&self, p: Point, offset: Pos2) -> Pos2 {
        Pos2::new(
            (p.x * self.scale + self.tx) as f32 + offset.x,
            (p.y * self.scale + self.ty) as f32 + offset.y,
        )
    }

    fn scale_len(&self, v: f64) -> f32 {
        (v * self.scale) as f32
    }
}

/// Pixel offsets used to fake a text outline.
const OUTLINE_OFFSETS: [(f32, f32); 4] = [(-1.0, 0.0), (1.0, 0.0), (0.0, -1.0), (0.0, 1.0)];

/// Replay a frame of `RenderCommand`s into an egui `Painter`.
///
/// `offset` is the top-left of the drawing area in egui points; the frame is
/// expected to have been recorded at a device pixel ratio of 1.
pub fn render_commands(
    painter: &egui::Painter,
    commands: &[RenderCommand],
    offset: Pos2,
    mode: ThemeMode,
) {
    let mut tf = Transform::identity();
    let mut stack: Vec<Transform> = Vec::new();

    for cmd in commands {
        match cmd {
            RenderCommand::Clear => {
                painter.rect_filled(
                    painter.clip_rect(),
                    CornerRadius::ZERO,
                    theme::resolve(tracklane_protocol::ThemeToken::Background, mode),
                );
            }

            RenderCommand::Save => stack.push(tf),

            RenderCommand::Restore => {
                if let Some(saved) = stack.pop() {
                    tf = saved;
                }
            }

            RenderCommand::SetTransform { scale, translate } => {
                tf = Transform {
                    scale: *scale,
                    tx: translate.x,
                    ty: translate.y,
                };
            }

            RenderCommand::Translate { dx, dy } => {
                tf.tx += dx * tf.scale;
                tf.ty += dy * tf.scale;
            }

            RenderCommand::FillRect { rect, paint } => {
                let min = tf.apply(Point::new(rect.x, rect.y), offset);
                let size = egui::vec2(tf.scale_len(rect.w), tf.scale_len(rect.h));
                if size.x < 0.5 || size.y < 0.5 {
                    continue;
                }
                let egui_rect = Rect::from_min_size(min, size);
                // Cull off-screen
                if !painter.clip_rect().intersects(egui_rect) {
                    continue;
                }
                painter.rect_filled(
                    egui_rect,
                    CornerRadius::ZERO,
                    theme::resolve_paint(*paint, mode),
                );
            }

            RenderCommand::StrokeLine {
                from,
                to,
                paint,
                width,
                dash,
            } => {
                let p1 = tf.apply(*from, offset);
                let p2 = tf.apply(*to, offset);
                let stroke = Stroke::new(tf.scale_len(*width), theme::resolve_paint(*paint, mode));
                match dash {
                    Some([on, off]) if *on > 0.0 => {
                        painter.extend(Shape::dashed_line(
                            &[p1, p2],
                            stroke,
                            tf.scale_len(*on),
                            tf.scale_len(*off),
                        ));
                    }
                    _ => {
                        painter.line_segment([p1, p2], stroke);
                    }
                }
            }

            RenderCommand::FillText {
                position,
                text,
                paint,
                font_size,
                align,
                outline,
            } => {
                let size = tf.scale_len(*font_size);
                if size < 1.0 {
                    continue;
                }
                let pos = tf.apply(*position, offset);
                // Commands place text by its baseline.
                let anchor = match align {
                    TextAlign::Left => Align2::LEFT_BOTTOM,
                    TextAlign::Center => Align2::CENTER_BOTTOM,
                    TextAlign::Right => Align2::RIGHT_BOTTOM,
                };
                let font = FontId::proportional(size);
                if let Some(outline) = outline {
                    let color = theme::resolve_paint(*outline, mode);
                    for (dx, dy) in OUTLINE_OFFSETS {
                        painter.text(pos + egui::vec2(dx, dy), anchor, text, font.clone(), color);
                    }
                }
                painter.text(pos, anchor, text, font, theme::resolve_paint(*paint, mode));
            }

            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }
}

/// Advance width of `text` as egui would lay it out.
pub fn measure_text(painter: &egui::Painter, text: &str, font_size: f64) -> f64 {
    let galley = painter.layout_no_wrap(
        text.to_string(),
        FontId::proportional(font_size as f32),
        egui::Color32::WHITE,
    );
    f64::from(galley.size().x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_is_scaled_by_current_transform() {
        let mut tf = Transform {
            scale: 2.0,
            tx: 0.0,
            ty: -10.0,
        };
        tf.tx += 3.0 * tf.scale;
        tf.ty += 5.0 * tf.scale;
        let p = tf.apply(Point::new(1.0, 1.0), Pos2::new(100.0, 50.0));
        assert_eq!(p, Pos2::new(108.0, 52.0));
    }
}
