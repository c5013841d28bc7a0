use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("surface is not drawable")]
    InvalidSurface,
    #[error("invalid axis: {reason}")]
    InvalidAxis { reason: String },
    #[error("axis has no identifier")]
    MissingAxisId,
    #[error("axis `{axis}` has negative track count {count}")]
    InvalidTrackCount { axis: String, count: i64 },
    #[error("invalid time range [{start}, {end}]")]
    InvalidRange { start: f64, end: f64 },
    #[error("invalid view configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
    #[error("event renderer `{0}` is already registered")]
    DuplicateRenderer(String),
    #[error("timeline has been destroyed")]
    Destroyed,
}

pub type Result<T> = std::result::Result<T, TimelineError>;
