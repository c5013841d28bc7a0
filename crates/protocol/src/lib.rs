pub mod commands;
pub mod ids;
pub mod theme;
pub mod types;

pub use commands::{RenderCommand, TextAlign};
pub use ids::{AxisId, EventId};
pub use theme::{Paint, ThemeToken};
pub use types::{Color, Point, Rect, Viewport};
