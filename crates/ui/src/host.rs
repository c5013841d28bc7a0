use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracklane_core::{CommandKey, HostEnvironment, Surface, TextMeasure};
use tracklane_protocol::RenderCommand;

use crate::renderer;

/// Host metrics taken from the widget's allocated rect.
///
/// egui already works in logical points, so frames are recorded at a pixel
/// ratio of 1 and egui handles the physical scaling.
pub struct EguiHost {
    size: Rc<Cell<(f64, f64)>>,
    command_key: CommandKey,
}

impl EguiHost {
    pub fn new(size: Rc<Cell<(f64, f64)>>, os: egui::os::OperatingSystem) -> Self {
        let command_key = match os {
            egui::os::OperatingSystem::Mac | egui::os::OperatingSystem::IOS => CommandKey::Meta,
            _ => CommandKey::Ctrl,
        };
        Self { size, command_key }
    }
}

impl HostEnvironment for EguiHost {
    fn viewport_size(&self) -> (f64, f64) {
        self.size.get()
    }

    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }

    fn platform_modifier_key(&self) -> CommandKey {
        self.command_key
    }
}

/// Last presented frame plus the painter used to measure text.
#[derive(Default)]
pub struct FrameStore {
    pub commands: Vec<RenderCommand>,
    pub painter: Option<egui::Painter>,
    pub backing_size: (u32, u32),
}

/// Surface that parks frames in a [`FrameStore`] until the widget paints.
#[derive(Clone, Default)]
pub struct EguiSurface {
    store: Rc<RefCell<FrameStore>>,
}

impl EguiSurface {
    pub fn new(store: Rc<RefCell<FrameStore>>) -> Self {
        Self { store }
    }
}

impl TextMeasure for EguiSurface {
    fn measure_text(&self, text: &str, font_size: f64) -> f64 {
        match &self.store.borrow().painter {
            Some(painter) => renderer::measure_text(painter, text, font_size),
            None => text.chars().count() as f64 * font_size * 0.6,
        }
    }
}

impl Surface for EguiSurface {
    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.store.borrow_mut().backing_size = (width, height);
    }

    fn present(&mut self, commands: &[RenderCommand]) {
        let mut store = self.store.borrow_mut();
        store.commands.clear();
        store.commands.extend_from_slice(commands);
    }
}
