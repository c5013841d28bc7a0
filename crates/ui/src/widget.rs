use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Context as _;
use egui::{Pos2, Vec2};
use tracklane_core::{Modifiers, PointerInput, Timeline, TimelineConfig, WheelInput};

use crate::host::{EguiHost, EguiSurface, FrameStore};
use crate::renderer::render_commands;
use crate::theme::ThemeMode;

/// A timeline embedded in an egui layout.
///
/// Fills the space it is given, forwards wheel and pointer input to the
/// [`Timeline`] and paints the last frame it produced.
pub struct TimelineWidget {
    timeline: Timeline,
    store: Rc<RefCell<FrameStore>>,
    size: Rc<Cell<(f64, f64)>>,
    hovered: bool,
}

impl TimelineWidget {
    pub fn new(ctx: &egui::Context, config: TimelineConfig) -> anyhow::Result<Self> {
        let size = Rc::new(Cell::new((0.0, 0.0)));
        let host = EguiHost::new(Rc::clone(&size), ctx.os());
        let mut timeline =
            Timeline::create(config, Box::new(host)).context("invalid timeline configuration")?;

        let store = Rc::new(RefCell::new(FrameStore::default()));
        timeline
            .attach(Box::new(EguiSurface::new(Rc::clone(&store))))
            .context("failed to attach egui surface")?;

        Ok(Self {
            timeline,
            store,
            size,
            hovered: false,
        })
    }

    /// Build from a JSON `TimelineConfig` document.
    pub fn from_json(ctx: &egui::Context, json: &str) -> anyhow::Result<Self> {
        let config: TimelineConfig =
            serde_json::from_str(json).context("failed to parse timeline configuration")?;
        Self::new(ctx, config)
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> egui::Response {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click());
        let painter = ui.painter_at(rect);
        self.store.borrow_mut().painter = Some(painter.clone());

        let size = (f64::from(rect.width()), f64::from(rect.height()));
        if size != self.size.get() {
            log::debug!("timeline widget: resized to {}x{}", size.0, size.1);
            self.size.set(size);
            self.timeline.handle_resize();
        }

        let (scroll, modifiers, hover) =
            ui.input(|i| (i.raw_scroll_delta, i.modifiers, i.pointer.hover_pos()));
        let modifiers = to_modifiers(modifiers);

        match hover.filter(|_| response.hovered()) {
            Some(pos) => {
                let local = pos - rect.min;
                if scroll != Vec2::ZERO {
                    self.timeline.handle_wheel(&wheel_input(scroll, local, modifiers));
                }
                let input = pointer_input(pos, local, modifiers);
                self.timeline.handle_pointer_move(&input);
                if response.clicked() {
                    self.timeline.handle_pointer_up(&input);
                }
                if response.secondary_clicked() {
                    self.timeline.handle_context_menu(&input);
                }
                self.hovered = true;
            }
            None if self.hovered => {
                self.hovered = false;
                self.timeline.handle_pointer_leave();
            }
            None => {}
        }

        let mode = ThemeMode::from_visuals(ui.visuals());
        render_commands(&painter, &self.store.borrow().commands, rect.min, mode);
        response
    }
}

fn to_modifiers(m: egui::Modifiers) -> Modifiers {
    Modifiers {
        shift: m.shift,
        ctrl: m.ctrl,
        meta: m.mac_cmd,
        alt: m.alt,
    }
}

/// egui scrolls content down for positive y; wheel deltas grow the other way.
fn wheel_input(scroll: Vec2, local: Vec2, modifiers: Modifiers) -> WheelInput {
    WheelInput {
        delta_x: -f64::from(scroll.x),
        delta_y: -f64::from(scroll.y),
        offset_x: f64::from(local.x),
        offset_y: f64::from(local.y),
        modifiers,
    }
}

fn pointer_input(pos: Pos2, local: Vec2, modifiers: Modifiers) -> PointerInput {
    PointerInput {
        offset_x: f64::from(local.x),
        offset_y: f64::from(local.y),
        client_x: f64::from(pos.x),
        client_y: f64::from(pos.y),
        modifiers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_direction_matches_browser_convention() {
        let input = wheel_input(
            egui::vec2(0.0, 40.0),
            egui::vec2(12.0, 8.0),
            Modifiers::default(),
        );
        assert_eq!(input.delta_y, -40.0);
        assert_eq!(input.delta_x, 0.0);
        assert_eq!((input.offset_x, input.offset_y), (12.0, 8.0));
    }

    #[test]
    fn mac_command_maps_to_meta() {
        let m = to_modifiers(egui::Modifiers {
            mac_cmd: true,
            command: true,
            ..egui::Modifiers::default()
        });
        assert!(m.meta);
        assert!(!m.ctrl);
    }

    #[test]
    fn widget_builds_from_json() {
        let ctx = egui::Context::default();
        let json = r#"{"timeRange": {"start": 0, "end": 1000}}"#;
        let widget = TimelineWidget::from_json(&ctx, json);
        assert!(widget.is_ok());
        assert!(TimelineWidget::from_json(&ctx, "{}").is_err());
    }
}
