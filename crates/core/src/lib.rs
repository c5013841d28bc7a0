//! Canvas timeline engine: time/pixel mapping, event hit-testing, layered
//! rendering into [`RenderCommand`](tracklane_protocol::RenderCommand)
//! lists, and wheel/pointer interaction.
//!
//! The entry point is [`Timeline`]. It is driven by a host through
//! [`HostEnvironment`] for viewport metrics and a [`Surface`] that receives
//! finished frames.

pub mod axis_registry;
pub mod canvas;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod levels;
pub mod math;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod renderer;
pub mod scale;
pub mod selection;
pub mod spatial;
pub mod svg;
pub mod timeline;
pub mod views;

pub use config::{TimelineConfig, ViewConfiguration};
pub use controller::{InputResponse, Modifiers, PointerInput, WheelInput};
pub use error::{Result, TimelineError};
pub use host::{CommandKey, HostEnvironment, RecordingSurface, StaticHost, Surface, TextMeasure};
pub use model::{Axis, Marker, RendererRef, TimeRange, TimelineEvent, Timestamp};
pub use notify::{Notification, NotificationKind, PointerInfo, SubscriptionId};
pub use renderer::{EventRenderer, EventSpan, Hitbox};
pub use selection::SelectOptions;
pub use timeline::{Lifecycle, Timeline};
