mod host;
mod renderer;
mod theme;
mod widget;

pub use host::{EguiHost, EguiSurface, FrameStore};
pub use renderer::{measure_text, render_commands};
pub use theme::{ResolvedColor, ThemeMode, resolve, resolve_paint};
pub use widget::TimelineWidget;
