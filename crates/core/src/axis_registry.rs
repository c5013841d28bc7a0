use std::cell::{Cell, OnceCell};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, TimelineError};
use crate::math::clamp;
use crate::model::Axis;

/// Reads the identity of an axis.
pub type AxisIdentity = fn(&Axis) -> &str;

fn axis_id_field(axis: &Axis) -> &str {
    axis.id.as_str()
}

/// The ordered, identity-keyed set of axes.
///
/// Membership is replaced wholesale by [`AxisRegistry::set_axes`]. The list
/// sorted by `top` and the id lookup table are built lazily on first access
/// and kept until the membership actually changes.
pub struct AxisRegistry {
    axes: Vec<Arc<Axis>>,
    identity: AxisIdentity,
    sorted: OnceCell<Vec<Arc<Axis>>>,
    by_id: OnceCell<HashMap<String, Arc<Axis>>>,
    sort_builds: Cell<u32>,
    lookup_builds: Cell<u32>,
}

impl Default for AxisRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AxisRegistry {
    pub fn new() -> Self {
        Self::with_identity(axis_id_field)
    }

    /// Registry whose axis identity comes from `identity` instead of `Axis::id`.
    pub fn with_identity(identity: AxisIdentity) -> Self {
        Self {
            axes: Vec::new(),
            identity,
            sorted: OnceCell::new(),
            by_id: OnceCell::new(),
            sort_builds: Cell::new(0),
            lookup_builds: Cell::new(0),
        }
    }

    /// Identity of `axis` under this registry's identity scheme.
    pub fn axis_id<'a>(&self, axis: &'a Axis) -> Result<&'a str> {
        let id = (self.identity)(axis);
        if id.is_empty() {
            return Err(TimelineError::MissingAxisId);
        }
        Ok(id)
    }

    /// Replace the member axes.
    ///
    /// The new list is validated in full before anything is committed. If it
    /// holds the same `Arc`s in the same order as the current list, nothing
    /// changes and the caches survive. Returns whether membership changed.
    pub fn set_axes(&mut self, axes: Vec<Arc<Axis>>) -> Result<bool> {
        for axis in &axes {
            self.validate(axis)?;
        }

        let unchanged = axes.len() == self.axes.len()
            && axes.iter().zip(&self.axes).all(|(a, b)| Arc::ptr_eq(a, b));
        if unchanged {
            return Ok(false);
        }

        self.axes = axes;
        self.sorted.take();
        self.by_id.take();
        log::debug!("axis registry: {} axes", self.axes.len());
        Ok(true)
    }

    fn validate(&self, axis: &Axis) -> Result<()> {
        let id = self.axis_id(axis)?;
        if axis.tracks_count < 0 {
            return Err(TimelineError::InvalidTrackCount {
                axis: id.to_string(),
                count: axis.tracks_count,
            });
        }
        if !axis.top.is_finite() || !axis.height.is_finite() {
            return Err(TimelineError::InvalidAxis {
                reason: format!("axis `{id}` has non-finite geometry"),
            });
        }
        Ok(())
    }

    /// Axes in input order.
    pub fn axes(&self) -> &[Arc<Axis>] {
        &self.axes
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Axes sorted by `top` ascending; ties keep input order.
    pub fn sorted(&self) -> &[Arc<Axis>] {
        self.sorted.get_or_init(|| {
            self.sort_builds.set(self.sort_builds.get() + 1);
            let mut sorted = self.axes.clone();
            sorted.sort_by(|a, b| a.top.total_cmp(&b.top));
            sorted
        })
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Axis>> {
        self.lookup().get(id)
    }

    fn lookup(&self) -> &HashMap<String, Arc<Axis>> {
        self.by_id.get_or_init(|| {
            self.lookup_builds.set(self.lookup_builds.get() + 1);
            // Validated on insert, so every identity here is non-empty.
            self.axes
                .iter()
                .map(|axis| ((self.identity)(axis).to_string(), Arc::clone(axis)))
                .collect()
        })
    }

    /// Vertical center of track `track_index` on `axis`, in content pixels.
    ///
    /// The index saturates into `[0, tracks_count - 1]`.
    pub fn track_position(&self, axis: &Axis, track_index: i64, track_height: f64) -> Result<f64> {
        if axis.tracks_count < 0 {
            return Err(TimelineError::InvalidTrackCount {
                axis: axis.id.to_string(),
                count: axis.tracks_count,
            });
        }
        let index = clamp(track_index as f64, 0.0, (axis.tracks_count - 1) as f64);
        Ok(axis.top + track_height * index + track_height / 2.0)
    }

    /// Lowest axis edge, or 0 without axes.
    pub fn content_bottom(&self) -> f64 {
        self.axes.iter().map(|a| a.bottom()).fold(0.0, f64::max)
    }

    /// How many times the sorted list and the id table have been built.
    pub fn cache_builds(&self) -> (u32, u32) {
        (self.sort_builds.get(), self.lookup_builds.get())
    }
}
