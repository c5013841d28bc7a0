use serde::{Deserialize, Serialize};

use crate::theme::Paint;
use crate::types::{Point, Rect};

/// A single, stateless render instruction.
///
/// Layers record a `Vec<RenderCommand>` per frame. Backends replay the list
/// sequentially, the same way a 2D canvas context would be driven: transform
/// commands affect every subsequent draw until the next `SetTransform` or
/// `Restore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Wipe the whole backing store (device pixels, ignores the transform).
    Clear,

    /// Push the current transform and line style.
    Save,

    /// Pop the state saved by the matching `Save`.
    Restore,

    /// Replace the current transform: `device = css * scale + translate`.
    SetTransform { scale: f64, translate: Point },

    /// Post-multiply a translation (in the current user space).
    Translate { dx: f64, dy: f64 },

    /// Fill an axis-aligned rectangle.
    FillRect { rect: Rect, paint: Paint },

    /// Stroke a straight segment. `dash` is `[on, off]` in user units.
    StrokeLine {
        from: Point,
        to: Point,
        paint: Paint,
        width: f64,
        dash: Option<[f64; 2]>,
    },

    /// Draw a text run with its baseline-left at `position`.
    FillText {
        position: Point,
        text: String,
        paint: Paint,
        font_size: f64,
        align: TextAlign,
        outline: Option<Paint>,
    },

    /// Begin a logical group (one per layer).
    BeginGroup { id: String },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
