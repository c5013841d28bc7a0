//! Pluggable event drawers.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use tracklane_protocol::{Paint, Rect};

use crate::canvas::Canvas;
use crate::config::EventsConfig;
use crate::error::{Result, TimelineError};
use crate::model::{RendererRef, TimelineEvent};

/// Horizontal clickable extent of a drawn event, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub left: f64,
    pub right: f64,
}

/// Where an event lands on the canvas: `x0..x1` horizontally, centered on
/// `y` with the given box height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventSpan {
    pub x0: f64,
    pub x1: f64,
    pub y: f64,
    pub height: f64,
}

pub trait EventRenderer {
    fn render(&self, canvas: &mut Canvas, event: &TimelineEvent, selected: bool, span: EventSpan);

    fn hitbox(&self, _event: &TimelineEvent, x0: f64, x1: f64) -> Hitbox {
        Hitbox {
            left: x0,
            right: x1,
        }
    }
}

/// Filled box in the event's color, or its selected color when selected.
pub struct DefaultEventRenderer {
    fill: Paint,
    selected_fill: Paint,
}

impl DefaultEventRenderer {
    pub fn new(config: &EventsConfig) -> Self {
        Self {
            fill: config.default_color,
            selected_fill: config.default_selected_color,
        }
    }
}

impl EventRenderer for DefaultEventRenderer {
    fn render(&self, canvas: &mut Canvas, event: &TimelineEvent, selected: bool, span: EventSpan) {
        let paint = if selected {
            event.selected_color.map_or(self.selected_fill, Paint::Color)
        } else {
            event.color.map_or(self.fill, Paint::Color)
        };
        canvas.fill_rect(
            Rect::new(span.x0, span.y - span.height / 2.0, span.x1 - span.x0, span.height),
            paint,
        );
    }
}

/// Renderers addressable by [`RendererRef`].
pub struct RendererRegistry {
    default: Box<dyn EventRenderer>,
    custom: HashMap<String, Box<dyn EventRenderer>>,
    warned: RefCell<HashSet<String>>,
}

impl RendererRegistry {
    pub fn new(config: &EventsConfig) -> Self {
        Self {
            default: Box::new(DefaultEventRenderer::new(config)),
            custom: HashMap::new(),
            warned: RefCell::new(HashSet::new()),
        }
    }

    pub fn register(
        &mut self,
        id: impl Into<String>,
        renderer: Box<dyn EventRenderer>,
    ) -> Result<()> {
        let id = id.into();
        if self.custom.contains_key(&id) {
            return Err(TimelineError::DuplicateRenderer(id));
        }
        self.custom.insert(id, renderer);
        Ok(())
    }

    pub fn unregister(&mut self, id: &str) -> bool {
        self.custom.remove(id).is_some()
    }

    /// The renderer for `reference`. Unknown custom ids get the default
    /// renderer and a one-time warning.
    pub fn resolve(&self, reference: &RendererRef) -> &dyn EventRenderer {
        match reference {
            RendererRef::Default => self.default.as_ref(),
            RendererRef::Custom { id } => match self.custom.get(id) {
                Some(renderer) => renderer.as_ref(),
                None => {
                    if self.warned.borrow_mut().insert(id.clone()) {
                        log::warn!("unknown event renderer `{id}`, using default");
                    }
                    self.default.as_ref()
                }
            },
        }
    }
}
