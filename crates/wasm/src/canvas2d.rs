//! Canvas2D backend: replays `RenderCommand`s on a browser canvas.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracklane_core::{Surface, TextMeasure};
use tracklane_protocol::{Color, Paint, RenderCommand, TextAlign, ThemeToken};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const FONT_FAMILY: &str = "system-ui, -apple-system, sans-serif";

/// Theme token colors, with caller overrides on top of the defaults.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    overrides: HashMap<ThemeToken, Color>,
}

impl Palette {
    pub fn set_overrides(&mut self, overrides: HashMap<ThemeToken, Color>) {
        self.overrides = overrides;
    }

    pub fn css(&self, paint: Paint) -> String {
        match paint {
            Paint::Color(color) => color.to_hex(),
            Paint::Token(token) => match self.overrides.get(&token) {
                Some(color) => color.to_hex(),
                None => default_color(token).to_string(),
            },
        }
    }
}

fn default_color(token: ThemeToken) -> &'static str {
    match token {
        ThemeToken::Background => "#ffffff",
        ThemeToken::RulerBackground => "#f5f5f7",
        ThemeToken::RulerPrimaryText => "#1a1a2e",
        ThemeToken::RulerSecondaryText => "#666677",
        ThemeToken::RulerTextOutline => "#f5f5f7",
        ThemeToken::RulerBorder => "#d2d2dc",
        ThemeToken::RulerWeekend => "#dc3c14",
        ThemeToken::GridBoundary => "#aaaab9",
        ThemeToken::GridPrimary => "#d2d2dc",
        ThemeToken::GridSecondary => "#e8e8ee",
        ThemeToken::AxisLine => "#78788c5a",
        ThemeToken::EventFill => "#2878c8",
        ThemeToken::EventSelectedFill => "#e69614",
        ThemeToken::MarkerLabelText => "#ffffff",
    }
}

fn font(size: f64) -> String {
    format!("{size}px {FONT_FAMILY}")
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    palette: Rc<RefCell<Palette>>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, palette: Rc<RefCell<Palette>>) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("No 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            canvas,
            ctx,
            palette,
        })
    }

    fn replay(&self, commands: &[RenderCommand]) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let palette = self.palette.borrow();
        for cmd in commands {
            match cmd {
                RenderCommand::Clear => {
                    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
                    ctx.clear_rect(
                        0.0,
                        0.0,
                        f64::from(self.canvas.width()),
                        f64::from(self.canvas.height()),
                    );
                }
                RenderCommand::Save => ctx.save(),
                RenderCommand::Restore => ctx.restore(),
                RenderCommand::SetTransform { scale, translate } => {
                    ctx.set_transform(*scale, 0.0, 0.0, *scale, translate.x, translate.y)?;
                }
                RenderCommand::Translate { dx, dy } => ctx.translate(*dx, *dy)?,
                RenderCommand::FillRect { rect, paint } => {
                    ctx.set_fill_style_str(&palette.css(*paint));
                    ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
                }
                RenderCommand::StrokeLine {
                    from,
                    to,
                    paint,
                    width,
                    dash,
                } => {
                    let pattern = match dash {
                        Some([on, off]) => js_sys::Array::of2(&(*on).into(), &(*off).into()),
                        None => js_sys::Array::new(),
                    };
                    ctx.set_line_dash(&pattern)?;
                    ctx.set_line_width(*width);
                    ctx.set_stroke_style_str(&palette.css(*paint));
                    ctx.begin_path();
                    ctx.move_to(from.x, from.y);
                    ctx.line_to(to.x, to.y);
                    ctx.stroke();
                }
                RenderCommand::FillText {
                    position,
                    text,
                    paint,
                    font_size,
                    align,
                    outline,
                } => {
                    ctx.set_font(&font(*font_size));
                    ctx.set_text_align(match align {
                        TextAlign::Left => "left",
                        TextAlign::Center => "center",
                        TextAlign::Right => "right",
                    });
                    if let Some(outline) = outline {
                        ctx.set_line_dash(&js_sys::Array::new())?;
                        ctx.set_line_width(3.0);
                        ctx.set_line_join("round");
                        ctx.set_stroke_style_str(&palette.css(*outline));
                        ctx.stroke_text(text, position.x, position.y)?;
                    }
                    ctx.set_fill_style_str(&palette.css(*paint));
                    ctx.fill_text(text, position.x, position.y)?;
                }
                RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
            }
        }
        Ok(())
    }
}

impl TextMeasure for CanvasSurface {
    fn measure_text(&self, text: &str, font_size: f64) -> f64 {
        self.ctx.set_font(&font(font_size));
        match self.ctx.measure_text(text) {
            Ok(metrics) => metrics.width(),
            Err(_) => text.chars().count() as f64 * font_size * 0.6,
        }
    }
}

impl Surface for CanvasSurface {
    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn present(&mut self, commands: &[RenderCommand]) {
        if let Err(err) = self.replay(commands) {
            log::error!("canvas2d: frame failed: {err:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_token_colors() {
        let mut palette = Palette::default();
        assert_eq!(palette.css(ThemeToken::EventFill.into()), "#2878c8");

        let overrides: HashMap<ThemeToken, Color> =
            serde_json::from_str(r##"{"EventFill": "#ff0000"}"##).unwrap_or_default();
        palette.set_overrides(overrides);
        assert_eq!(palette.css(ThemeToken::EventFill.into()), "#ff0000");
        assert_eq!(palette.css(Color::rgb8(0, 0, 255).into()), "#0000ff");
    }
}
