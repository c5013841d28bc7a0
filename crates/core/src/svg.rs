//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use std::fmt::Write as _;

use tracklane_protocol::{Paint, Point, RenderCommand, TextAlign, ThemeToken};

use crate::canvas::Transform;
use crate::host::{Surface, TextMeasure};

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` are the backing-store size in device pixels; all
/// coordinates are transformed into that space. `dark` selects the palette.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, dark: bool) -> String {
    let mut svg = String::with_capacity(commands.len() * 120);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif">"#,
    );

    let mut transform = Transform::IDENTITY;
    let mut stack = Vec::new();
    for cmd in commands {
        match cmd {
            RenderCommand::Clear => {
                let bg = resolve_paint(ThemeToken::Background.into(), dark);
                let _ = write!(svg, r#"<rect width="{width}" height="{height}" fill="{bg}"/>"#);
            }
            RenderCommand::Save => stack.push(transform),
            RenderCommand::Restore => {
                if let Some(saved) = stack.pop() {
                    transform = saved;
                }
            }
            RenderCommand::SetTransform { scale, translate } => {
                transform = Transform {
                    scale: *scale,
                    tx: translate.x,
                    ty: translate.y,
                };
            }
            RenderCommand::Translate { dx, dy } => {
                transform.tx += dx * transform.scale;
                transform.ty += dy * transform.scale;
            }
            RenderCommand::FillRect { rect, paint } => {
                let origin = transform.apply(Point::new(rect.x, rect.y));
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                    origin.x,
                    origin.y,
                    rect.w * transform.scale,
                    rect.h * transform.scale,
                    resolve_paint(*paint, dark),
                );
            }
            RenderCommand::StrokeLine {
                from,
                to,
                paint,
                width: line_width,
                dash,
            } => {
                let a = transform.apply(*from);
                let b = transform.apply(*to);
                let _ = write!(
                    svg,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}""#,
                    a.x,
                    a.y,
                    b.x,
                    b.y,
                    resolve_paint(*paint, dark),
                    line_width * transform.scale,
                );
                if let Some([on, off]) = dash {
                    let _ = write!(
                        svg,
                        r#" stroke-dasharray="{} {}""#,
                        on * transform.scale,
                        off * transform.scale
                    );
                }
                svg.push_str("/>");
            }
            RenderCommand::FillText {
                position,
                text,
                paint,
                font_size,
                align,
                outline,
            } => {
                let p = transform.apply(*position);
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" font-size="{}" text-anchor="{anchor}" fill="{}""#,
                    p.x,
                    p.y,
                    font_size * transform.scale,
                    resolve_paint(*paint, dark),
                );
                if let Some(outline) = outline {
                    let _ = write!(
                        svg,
                        r#" stroke="{}" stroke-width="{}" paint-order="stroke""#,
                        resolve_paint(*outline, dark),
                        2.0 * transform.scale
                    );
                }
                let _ = write!(svg, ">{}</text>", escape_xml(text));
            }
            RenderCommand::BeginGroup { id } => {
                let _ = write!(svg, r#"<g id="{}">"#, escape_xml(id));
            }
            RenderCommand::EndGroup => svg.push_str("</g>"),
        }
    }

    svg.push_str("</svg>");
    svg
}

pub fn resolve_paint(paint: Paint, dark: bool) -> String {
    match paint {
        Paint::Color(color) => color.to_hex(),
        Paint::Token(token) => resolve_token(token, dark).to_string(),
    }
}

fn resolve_token(token: ThemeToken, dark: bool) -> &'static str {
    if dark {
        match token {
            ThemeToken::Background => "#181818",
            ThemeToken::RulerBackground => "#202020",
            ThemeToken::RulerPrimaryText => "#ececec",
            ThemeToken::RulerSecondaryText => "#9e9e9e",
            ThemeToken::RulerTextOutline => "#202020",
            ThemeToken::RulerBorder => "#303030",
            ThemeToken::RulerWeekend => "#ef9a9a",
            ThemeToken::GridBoundary => "#5a5a5a",
            ThemeToken::GridPrimary => "#3a3a3a",
            ThemeToken::GridSecondary => "#2a2a2a",
            ThemeToken::AxisLine => "#333333",
            ThemeToken::EventFill => "#448aff",
            ThemeToken::EventSelectedFill => "#ffd600",
            ThemeToken::MarkerLabelText => "#ffffff",
        }
    } else {
        match token {
            ThemeToken::Background => "#ffffff",
            ThemeToken::RulerBackground => "#f8f9fa",
            ThemeToken::RulerPrimaryText => "#1a1a2e",
            ThemeToken::RulerSecondaryText => "#666677",
            ThemeToken::RulerTextOutline => "#f8f9fa",
            ThemeToken::RulerBorder => "#dee2e6",
            ThemeToken::RulerWeekend => "#e63946",
            ThemeToken::GridBoundary => "#adb5bd",
            ThemeToken::GridPrimary => "#dee2e6",
            ThemeToken::GridSecondary => "#eef0f2",
            ThemeToken::AxisLine => "#e0e0e0",
            ThemeToken::EventFill => "#457b9d",
            ThemeToken::EventSelectedFill => "#e67e22",
            ThemeToken::MarkerLabelText => "#ffffff",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Headless surface that keeps the last frame as an SVG document.
#[derive(Debug, Clone, Default)]
pub struct SvgSurface {
    width: u32,
    height: u32,
    dark: bool,
    document: String,
}

impl SvgSurface {
    pub fn new(dark: bool) -> Self {
        Self {
            dark,
            ..Self::default()
        }
    }

    /// The last presented frame, or an empty string before the first.
    pub fn document(&self) -> &str {
        &self.document
    }
}

impl TextMeasure for SvgSurface {}

impl Surface for SvgSurface {
    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn present(&mut self, commands: &[RenderCommand]) {
        self.document = render_svg(commands, f64::from(self.width), f64::from(self.height), self.dark);
    }
}

#[cfg(test)]
mod tests {
    use tracklane_protocol::{Color, Rect};

    use super::*;

    #[test]
    fn transforms_apply_to_coordinates() {
        let commands = vec![
            RenderCommand::Save,
            RenderCommand::SetTransform {
                scale: 2.0,
                translate: Point::new(0.0, -20.0),
            },
            RenderCommand::Translate { dx: 0.0, dy: 5.0 },
            RenderCommand::FillRect {
                rect: Rect::new(10.0, 20.0, 100.0, 18.0),
                paint: Color::rgb8(0xff, 0, 0).into(),
            },
            RenderCommand::Restore,
        ];
        let svg = render_svg(&commands, 800.0, 400.0, true);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r##"<rect x="20" y="30" width="200" height="36" fill="#ff0000"/>"##));
    }

    #[test]
    fn groups_dashes_and_escaping() {
        let commands = vec![
            RenderCommand::BeginGroup { id: "axes".into() },
            RenderCommand::StrokeLine {
                from: Point::new(0.0, 10.0),
                to: Point::new(50.0, 10.0),
                paint: ThemeToken::AxisLine.into(),
                width: 1.0,
                dash: Some([4.0, 4.0]),
            },
            RenderCommand::FillText {
                position: Point::new(1.0, 2.0),
                text: "a<b & c".into(),
                paint: ThemeToken::RulerPrimaryText.into(),
                font_size: 11.0,
                align: TextAlign::Left,
                outline: None,
            },
            RenderCommand::EndGroup,
        ];
        let svg = render_svg(&commands, 100.0, 100.0, false);
        assert!(svg.contains(r#"<g id="axes">"#));
        assert!(svg.contains(r#"stroke-dasharray="4 4""#));
        assert!(svg.contains("#e0e0e0"));
        assert!(svg.contains("a&lt;b &amp; c"));
    }

    #[test]
    fn surface_keeps_last_frame() {
        let mut surface = SvgSurface::new(false);
        surface.set_backing_size(200, 100);
        surface.present(&[RenderCommand::Clear]);
        assert!(surface.document().contains(r##"<rect width="200" height="100" fill="#ffffff"/>"##));
    }
}
