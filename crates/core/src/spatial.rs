//! Bulk-loaded R-tree over event boxes.
//!
//! Boxes live in mixed units: X is time, Y is content pixels. Queries arrive
//! in canvas pixels and are converted with the current [`TimeScale`] before
//! hitting the tree.

use tracklane_protocol::Rect;

use crate::axis_registry::AxisRegistry;
use crate::model::{TimelineEvent, Timestamp};
use crate::scale::TimeScale;

/// Maximum children per node.
const MAX_ENTRIES: usize = 16;

/// Side of the square probed around a pointer position.
pub const HIT_SIZE: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    const EMPTY: BBox = BBox {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    /// Closed-interval overlap on both axes, so touching boxes intersect.
    pub fn intersects(&self, other: &BBox) -> bool {
        other.min_x <= self.max_x
            && other.min_y <= self.max_y
            && other.max_x >= self.min_x
            && other.max_y >= self.min_y
    }

    fn extend(&mut self, other: &BBox) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    fn center_x(&self) -> f64 {
        (self.min_x + self.max_x) / 2.0
    }

    fn center_y(&self) -> f64 {
        (self.min_y + self.max_y) / 2.0
    }
}

enum Node<T> {
    Leaf {
        bbox: BBox,
        entries: Vec<(BBox, T)>,
    },
    Branch {
        bbox: BBox,
        children: Vec<Node<T>>,
    },
}

impl<T> Node<T> {
    fn bbox(&self) -> &BBox {
        match self {
            Node::Leaf { bbox, .. } | Node::Branch { bbox, .. } => bbox,
        }
    }
}

/// Static R-tree packed with Sort-Tile-Recursive.
pub struct RTree<T> {
    root: Option<Node<T>>,
    len: usize,
}

impl<T> Default for RTree<T> {
    fn default() -> Self {
        Self { root: None, len: 0 }
    }
}

impl<T> RTree<T> {
    /// Build a tree from all `entries` at once.
    pub fn bulk_load(entries: Vec<(BBox, T)>) -> Self {
        let len = entries.len();
        if entries.is_empty() {
            return Self::default();
        }

        let mut nodes: Vec<Node<T>> = str_pack(entries, |(bbox, _)| *bbox)
            .into_iter()
            .map(|entries| {
                let mut bbox = BBox::EMPTY;
                for (b, _) in &entries {
                    bbox.extend(b);
                }
                Node::Leaf { bbox, entries }
            })
            .collect();

        while nodes.len() > 1 {
            nodes = str_pack(nodes, |node| *node.bbox())
                .into_iter()
                .map(|children| {
                    let mut bbox = BBox::EMPTY;
                    for child in &children {
                        bbox.extend(child.bbox());
                    }
                    Node::Branch { bbox, children }
                })
                .collect();
        }

        Self {
            root: nodes.pop(),
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// All items whose box intersects `area`, in no particular order.
    pub fn search(&self, area: &BBox) -> Vec<&T> {
        let mut found = Vec::new();
        let Some(root) = &self.root else {
            return found;
        };
        if !area.intersects(root.bbox()) {
            return found;
        }

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf { entries, .. } => {
                    found.extend(
                        entries
                            .iter()
                            .filter(|(bbox, _)| area.intersects(bbox))
                            .map(|(_, item)| item),
                    );
                }
                Node::Branch { children, .. } => {
                    stack.extend(children.iter().filter(|c| area.intersects(c.bbox())));
                }
            }
        }
        found
    }

    /// Depth of the tree (0 when empty, 1 for a single leaf).
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut node = self.root.as_ref();
        while let Some(n) = node {
            height += 1;
            node = match n {
                Node::Leaf { .. } => None,
                Node::Branch { children, .. } => children.first(),
            };
        }
        height
    }
}

/// Group `items` into runs of at most `MAX_ENTRIES`: vertical slices by
/// center X, then tiles by center Y inside each slice.
fn str_pack<N>(mut items: Vec<N>, bbox_of: impl Fn(&N) -> BBox) -> Vec<Vec<N>> {
    let node_count = items.len().div_ceil(MAX_ENTRIES);
    let slice_count = (node_count as f64).sqrt().ceil().max(1.0) as usize;
    let slice_len = slice_count * MAX_ENTRIES;

    items.sort_by(|a, b| bbox_of(a).center_x().total_cmp(&bbox_of(b).center_x()));

    let mut groups = Vec::with_capacity(node_count);
    let mut rest = items;
    while !rest.is_empty() {
        let tail = rest.split_off(slice_len.min(rest.len()));
        let mut slice = std::mem::replace(&mut rest, tail);
        slice.sort_by(|a, b| bbox_of(a).center_y().total_cmp(&bbox_of(b).center_y()));
        while !slice.is_empty() {
            let tail = slice.split_off(MAX_ENTRIES.min(slice.len()));
            groups.push(std::mem::replace(&mut slice, tail));
        }
    }
    groups
}

/// Hit-test index over the current event list.
///
/// Items are positions in the event slice the index was last rebuilt from.
#[derive(Default)]
pub struct EventIndex {
    tree: RTree<usize>,
}

impl EventIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole index with boxes for `events`.
    ///
    /// Events whose axis is unknown, or whose axis has an invalid track
    /// count, are left out. Open-ended events extend to `domain_end`.
    pub fn rebuild(
        &mut self,
        events: &[TimelineEvent],
        axes: &AxisRegistry,
        track_height: f64,
        line_height: f64,
        domain_end: Timestamp,
    ) {
        let half = line_height / 2.0;
        let mut skipped = 0usize;
        let boxes: Vec<(BBox, usize)> = events
            .iter()
            .enumerate()
            .filter_map(|(i, event)| {
                let y = axes
                    .get(event.axis_id.as_str())
                    .and_then(|axis| axes.track_position(axis, event.track_index, track_height).ok());
                let Some(y) = y else {
                    skipped += 1;
                    return None;
                };
                let bbox = BBox::new(event.from, y - half, event.end_or(domain_end), y + half);
                Some((bbox, i))
            })
            .collect();

        if skipped > 0 {
            log::warn!("event index: skipped {skipped} events with unresolved axes");
        }
        log::debug!("event index: rebuilt with {} boxes", boxes.len());

        self.tree = RTree::bulk_load(boxes);
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Events under a canvas-pixel rectangle.
    ///
    /// `content_offset` is added to the rect's Y edges to move from canvas
    /// pixels to content pixels (scroll top minus the fixed header height).
    /// `padding` widens the rect on every side.
    pub fn query_rect(
        &self,
        rect: Rect,
        padding: f64,
        scale: &TimeScale,
        content_offset: f64,
    ) -> Vec<usize> {
        let area = BBox::new(
            scale.pixel_to_time(rect.left() - padding),
            rect.top() + content_offset - padding,
            scale.pixel_to_time(rect.right() + padding),
            rect.bottom() + content_offset + padding,
        );
        self.tree.search(&area).into_iter().copied().collect()
    }

    /// Events under a small square centered on `(x, y)`.
    pub fn query_point(
        &self,
        x: f64,
        y: f64,
        padding: f64,
        scale: &TimeScale,
        content_offset: f64,
    ) -> Vec<usize> {
        self.query_rect(Rect::around(x, y, HIT_SIZE), padding, scale, content_offset)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::{Axis, TimeRange};

    fn brute_force(boxes: &[(BBox, usize)], area: &BBox) -> Vec<usize> {
        let mut hits: Vec<usize> = boxes
            .iter()
            .filter(|(b, _)| area.intersects(b))
            .map(|(_, i)| *i)
            .collect();
        hits.sort_unstable();
        hits
    }

    #[test]
    fn empty_tree_finds_nothing() {
        let tree: RTree<usize> = RTree::bulk_load(Vec::new());
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert!(tree.search(&BBox::new(0.0, 0.0, 1.0, 1.0)).is_empty());
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&BBox::new(10.0, 10.0, 20.0, 20.0)));
        assert!(!a.intersects(&BBox::new(10.1, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn large_tree_matches_linear_scan() {
        let boxes: Vec<(BBox, usize)> = (0..1000)
            .map(|i| {
                let x = ((i * 37) % 500) as f64;
                let y = ((i * 11) % 300) as f64;
                (BBox::new(x, y, x + (i % 7) as f64, y + 4.0), i)
            })
            .collect();
        let tree = RTree::bulk_load(boxes.clone());
        assert_eq!(tree.len(), 1000);
        assert!(tree.height() >= 3);

        for area in [
            BBox::new(0.0, 0.0, 50.0, 50.0),
            BBox::new(200.0, 100.0, 210.0, 104.0),
            BBox::new(-10.0, -10.0, -1.0, -1.0),
            BBox::new(0.0, 0.0, 1000.0, 1000.0),
        ] {
            let mut hits: Vec<usize> = tree.search(&area).into_iter().copied().collect();
            hits.sort_unstable();
            assert_eq!(hits, brute_force(&boxes, &area));
        }
    }

    fn registry() -> AxisRegistry {
        let mut axes = AxisRegistry::new();
        let result = axes.set_axes(vec![Arc::new(Axis::new("ax", 0.0, 20.0, 1))]);
        assert!(result.is_ok());
        axes
    }

    #[test]
    fn point_query_hits_event_on_its_track() {
        let axes = registry();
        let events = vec![TimelineEvent::new("e1", 100.0, Some(200.0), "ax", 0)];
        let mut index = EventIndex::new();
        index.rebuild(&events, &axes, 20.0, 16.0, 1000.0);

        let scale = TimeScale::new(TimeRange::new(0.0, 1000.0), 1000.0);
        let center_y = 10.0;
        let hits = index.query_point(scale.time_to_pixel(150.0), center_y, 0.0, &scale, 0.0);
        assert_eq!(hits, vec![0]);

        let miss = index.query_point(900.0, 500.0, 0.0, &scale, 0.0);
        assert!(miss.is_empty());
    }

    #[test]
    fn zero_width_event_is_still_hittable() {
        let axes = registry();
        let events = vec![TimelineEvent::new("dot", 500.0, Some(500.0), "ax", 0)];
        let mut index = EventIndex::new();
        index.rebuild(&events, &axes, 20.0, 16.0, 1000.0);

        let scale = TimeScale::new(TimeRange::new(0.0, 1000.0), 1000.0);
        assert_eq!(index.query_point(502.0, 10.0, 0.0, &scale, 0.0), vec![0]);
    }

    #[test]
    fn content_offset_shifts_vertical_query() {
        let axes = registry();
        let events = vec![TimelineEvent::new("e1", 100.0, Some(200.0), "ax", 0)];
        let mut index = EventIndex::new();
        index.rebuild(&events, &axes, 20.0, 16.0, 1000.0);
        let scale = TimeScale::new(TimeRange::new(0.0, 1000.0), 1000.0);

        // A 30px header above the content: canvas y 40 is content y 10.
        assert_eq!(index.query_point(150.0, 40.0, 0.0, &scale, -30.0), vec![0]);
        assert!(index.query_point(150.0, 10.0, 0.0, &scale, -30.0).is_empty());
    }

    #[test]
    fn unknown_axis_and_endless_events() {
        let axes = registry();
        let events = vec![
            TimelineEvent::new("ghost", 0.0, Some(10.0), "nope", 0),
            TimelineEvent::new("open", 800.0, None, "ax", 0),
        ];
        let mut index = EventIndex::new();
        index.rebuild(&events, &axes, 20.0, 16.0, 1000.0);
        assert_eq!(index.len(), 1);

        let scale = TimeScale::new(TimeRange::new(0.0, 1000.0), 1000.0);
        assert_eq!(index.query_point(990.0, 10.0, 0.0, &scale, 0.0), vec![1]);
        assert!(index.query_point(5.0, 10.0, 0.0, &scale, 0.0).is_empty());
    }

    #[test]
    fn padding_widens_query() {
        let axes = registry();
        let events = vec![TimelineEvent::new("e1", 100.0, Some(200.0), "ax", 0)];
        let mut index = EventIndex::new();
        index.rebuild(&events, &axes, 20.0, 16.0, 1000.0);
        let scale = TimeScale::new(TimeRange::new(0.0, 1000.0), 1000.0);

        assert!(index.query_point(215.0, 10.0, 0.0, &scale, 0.0).is_empty());
        assert_eq!(index.query_point(215.0, 10.0, 15.0, &scale, 0.0), vec![0]);
    }
}
