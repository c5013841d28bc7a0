pub mod axis;
pub mod event;
pub mod marker;
pub mod time;

pub use axis::Axis;
pub use event::{RendererRef, TimelineEvent};
pub use marker::Marker;
pub use time::{DAY, HOUR, MINUTE, MONTH, SECOND, TimeRange, Timestamp, WEEK, YEAR};
