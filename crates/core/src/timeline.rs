//! The timeline controller: owns all shared state and drives the pipeline.

use std::collections::HashSet;
use std::sync::Arc;

use tracklane_protocol::{EventId, Rect, Viewport};

use crate::axis_registry::AxisRegistry;
use crate::canvas::Canvas;
use crate::config::{TimelineConfig, ViewConfiguration};
use crate::controller::{HoverState, InputResponse, PointerInput, WheelInput, wheel_to_range};
use crate::error::{Result, TimelineError};
use crate::host::{HostEnvironment, Surface, TextMeasure};
use crate::levels::Calendar;
use crate::math::align_number;
use crate::model::{Axis, Marker, SECOND, TimeRange, TimelineEvent, Timestamp};
use crate::notify::{
    Emitter, Listener, Notification, NotificationKind, PointerInfo, SubscriptionId,
};
use crate::pipeline::RenderPipeline;
use crate::renderer::{EventRenderer, RendererRegistry};
use crate::scale::TimeScale;
use crate::selection::{SelectOptions, Selection};
use crate::spatial::EventIndex;
use crate::views::FrameContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created, no surface yet.
    Init,
    /// Attached and rendering.
    Ready,
    Destroyed,
}

/// Text measurement borrowed from the attached surface.
struct SurfaceMeasure<'a>(&'a dyn Surface);

impl TextMeasure for SurfaceMeasure<'_> {
    fn measure_text(&self, text: &str, font_size: f64) -> f64 {
        self.0.measure_text(text, font_size)
    }
}

/// An interactive timeline.
///
/// Every mutation commits synchronously and, once attached, redraws the
/// whole frame before returning.
pub struct Timeline {
    state: Lifecycle,
    host: Box<dyn HostEnvironment>,
    surface: Option<Box<dyn Surface>>,
    config: ViewConfiguration,
    calendar: Calendar,
    viewport: Viewport,
    range: TimeRange,
    scroll_top: f64,
    axes: AxisRegistry,
    events: Vec<TimelineEvent>,
    markers: Vec<Marker>,
    index: EventIndex,
    selection: Selection,
    renderers: RendererRegistry,
    pipeline: RenderPipeline,
    emitter: Emitter,
    hover: HoverState,
}

impl Timeline {
    /// Validate `config` and build a detached timeline.
    pub fn create(config: TimelineConfig, host: Box<dyn HostEnvironment>) -> Result<Self> {
        let view = ViewConfiguration::with_overrides(config.view_configuration.as_ref())?;
        config.time_range.validate()?;

        let mut axes = AxisRegistry::new();
        axes.set_axes(config.axes.into_iter().map(Arc::new).collect())?;

        let mut markers = config.markers;
        markers.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut timeline = Self {
            state: Lifecycle::Init,
            viewport: host.viewport(),
            host,
            surface: None,
            calendar: Calendar::with_offset_minutes(view.utc_offset_minutes),
            renderers: RendererRegistry::new(&view.events),
            pipeline: RenderPipeline::with_default_layers(&view),
            config: view,
            range: config.time_range,
            scroll_top: 0.0,
            axes,
            events: config.events,
            markers,
            index: EventIndex::new(),
            selection: Selection::new(),
            emitter: Emitter::new(),
            hover: HoverState::new(),
        };
        timeline.rebuild_index();
        Ok(timeline)
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn config(&self) -> &ViewConfiguration {
        &self.config
    }

    /// Bind to `surface` and draw the first frame.
    ///
    /// Only the first attach takes effect; later calls return `Ok` without
    /// touching the current surface.
    pub fn attach(&mut self, mut surface: Box<dyn Surface>) -> Result<()> {
        match self.state {
            Lifecycle::Destroyed => return Err(TimelineError::Destroyed),
            Lifecycle::Ready => {
                log::debug!("timeline: already attached, ignoring");
                return Ok(());
            }
            Lifecycle::Init => {}
        }
        if !surface.is_drawable() {
            return Err(TimelineError::InvalidSurface);
        }

        self.viewport = self.host.viewport();
        let (width, height) = self.viewport.backing_size();
        surface.set_backing_size(width, height);
        self.surface = Some(surface);
        self.state = Lifecycle::Ready;
        log::debug!(
            "timeline: attached at {}x{} css px, dpr {}",
            self.viewport.width,
            self.viewport.height,
            self.viewport.dpr
        );
        self.render(true);
        Ok(())
    }

    /// Redraw the whole frame. Returns whether anything was presented.
    pub fn rerender(&mut self) -> bool {
        self.render(true)
    }

    /// Redraw without clearing the backing store first.
    pub fn render_partial(&mut self) -> bool {
        self.render(false)
    }

    fn render(&mut self, clear: bool) -> bool {
        if self.state != Lifecycle::Ready {
            return false;
        }
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        if !surface.is_drawable() {
            return false;
        }

        let mut canvas = Canvas::new(self.viewport);
        {
            let measure = SurfaceMeasure(&**surface);
            let frame = FrameContext {
                config: &self.config,
                range: self.range,
                viewport: self.viewport,
                scroll_top: self.scroll_top,
                axes: &self.axes,
                events: &self.events,
                markers: &self.markers,
                selection: &self.selection,
                renderers: &self.renderers,
                calendar: self.calendar,
                measure: &measure,
            };
            self.pipeline.render(&frame, &mut canvas, clear);
        }
        surface.present(canvas.commands());
        true
    }

    fn rebuild_index(&mut self) {
        self.index.rebuild(
            &self.events,
            &self.axes,
            self.config.axes.track_height,
            self.config.axes.line_height,
            self.range.end,
        );
    }

    pub fn pipeline_mut(&mut self) -> &mut RenderPipeline {
        &mut self.pipeline
    }

    // Mutators

    pub fn set_visible_range(&mut self, start: Timestamp, end: Timestamp) -> Result<()> {
        let range = TimeRange::checked(start, end)?;
        self.commit_range(range);
        self.render(true);
        Ok(())
    }

    fn commit_range(&mut self, range: TimeRange) {
        log::debug!("timeline: visible range [{}, {}]", range.start, range.end);
        let end_moved = range.end != self.range.end;
        self.range = range;
        // Open-ended boxes reach the domain end they were built with.
        if end_moved && self.events.iter().any(TimelineEvent::is_endless) {
            self.rebuild_index();
        }
    }

    /// Replace the axes. Passing the same `Arc`s as before keeps the
    /// registry caches and skips the index rebuild.
    pub fn set_axes(&mut self, axes: Vec<Arc<Axis>>) -> Result<()> {
        if self.axes.set_axes(axes)? {
            self.rebuild_index();
        }
        self.render(true);
        Ok(())
    }

    pub fn set_events(&mut self, events: Vec<TimelineEvent>) {
        self.events = events;
        self.rebuild_index();
        let stale = self
            .hover
            .active()
            .is_some_and(|active| !self.events.iter().any(|e| e.id == *active));
        if stale {
            self.hover.reset();
        }
        self.render(true);
    }

    pub fn set_markers(&mut self, mut markers: Vec<Marker>) {
        markers.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.markers = markers;
        self.render(true);
    }

    /// Replace the selection without notifying subscribers.
    pub fn set_selected_events(&mut self, ids: Vec<EventId>) {
        self.selection.set_selected(ids);
        self.render(true);
    }

    /// Apply a selection as a pointer would, notifying on change.
    pub fn select_events(&mut self, ids: &[EventId], options: SelectOptions) {
        let before = self.selected_set();
        self.selection.select(ids, options);
        if self.selected_set() != before {
            self.emit_selection();
            self.render(true);
        }
    }

    pub fn set_allow_multiple_selection(&mut self, allow: bool) {
        self.selection.set_allow_multiple_selection(allow);
    }

    pub fn register_renderer(
        &mut self,
        id: impl Into<String>,
        renderer: Box<dyn EventRenderer>,
    ) -> Result<()> {
        self.renderers.register(id, renderer)?;
        self.render(true);
        Ok(())
    }

    pub fn unregister_renderer(&mut self, id: &str) -> bool {
        let removed = self.renderers.unregister(id);
        if removed {
            self.render(true);
        }
        removed
    }

    /// Vertical scroll of the content under the fixed ruler, in CSS pixels.
    pub fn set_scroll_top(&mut self, scroll_top: f64) {
        let scroll_top = if scroll_top.is_finite() { scroll_top.max(0.0) } else { 0.0 };
        if scroll_top != self.scroll_top {
            self.scroll_top = scroll_top;
            self.render(true);
        }
    }

    // Queries

    pub fn get_visible_range(&self) -> TimeRange {
        self.range
    }

    /// Selected ids, sorted.
    pub fn get_selected_events(&self) -> Vec<EventId> {
        let mut ids: Vec<EventId> = self.selection.ids().cloned().collect();
        ids.sort();
        ids
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn axes(&self) -> &AxisRegistry {
        &self.axes
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    /// Total height of ruler plus axes, for sizing a scroll container.
    pub fn content_height(&self) -> f64 {
        self.config.content_top() + self.axes.content_bottom()
    }

    /// Host wall-clock time, truncated to whole seconds.
    pub fn current_time(&self) -> Timestamp {
        align_number(self.host.now(), SECOND)
    }

    fn scale(&self) -> TimeScale {
        TimeScale::new(self.range, self.viewport.width)
    }

    pub fn time_to_pixel(&self, t: Timestamp) -> f64 {
        self.scale().time_to_pixel(t)
    }

    pub fn pixel_to_time(&self, px: f64) -> Timestamp {
        self.scale().pixel_to_time(px)
    }

    pub fn width_to_duration(&self, px: f64) -> f64 {
        self.scale().width_to_duration(px)
    }

    /// Events under canvas point `(x, y)`, in event-list order.
    pub fn events_at(&self, x: f64, y: f64) -> Vec<&TimelineEvent> {
        self.hit_test(x, y)
            .into_iter()
            .filter_map(|i| self.events.get(i))
            .collect()
    }

    fn hit_test(&self, x: f64, y: f64) -> Vec<usize> {
        let cfg = &self.config.events;
        let scale = self.scale();
        let offset = self.scroll_top - self.config.content_top();
        let mut hits = self.index.query_rect(
            Rect::around(x, y, cfg.hit_size),
            cfg.hitbox_padding,
            &scale,
            offset,
        );

        // Narrow the box candidates to what each renderer says is clickable.
        let half = cfg.hit_size / 2.0;
        let reach = half + cfg.hitbox_padding;
        hits.retain(|&i| {
            let Some(event) = self.events.get(i) else {
                return false;
            };
            let x0 = scale.time_to_pixel(event.from);
            let x1 = scale.time_to_pixel(event.end_or(self.range.end));
            let hitbox = self.renderers.resolve(&event.renderer).hitbox(event, x0, x1);
            x + reach >= hitbox.left && x - reach <= hitbox.right
        });
        hits.sort_unstable();
        hits
    }

    fn pointer_info(&self, input: &PointerInput) -> PointerInfo {
        PointerInfo {
            time: self.pixel_to_time(input.offset_x),
            relative_x: input.offset_x,
            relative_y: input.offset_y,
            client_x: input.client_x,
            client_y: input.client_y,
        }
    }

    fn selected_set(&self) -> HashSet<EventId> {
        self.selection.ids().cloned().collect()
    }

    fn emit_selection(&mut self) {
        let events = self
            .events
            .iter()
            .filter(|e| self.selection.is_selected(e.id.as_str()))
            .cloned()
            .collect();
        self.emitter.emit(&Notification::SelectChange { events });
    }

    fn find_event(&self, id: &EventId) -> Option<&TimelineEvent> {
        self.events.iter().find(|e| e.id == *id)
    }

    // Input

    /// Recompute the backing store from the host and redraw.
    pub fn handle_resize(&mut self) {
        if self.state == Lifecycle::Destroyed {
            return;
        }
        self.viewport = self.host.viewport();
        let (width, height) = self.viewport.backing_size();
        if let Some(surface) = self.surface.as_mut() {
            surface.set_backing_size(width, height);
        }
        log::debug!("timeline: resized to {width}x{height} device px");
        self.render(true);
    }

    /// Zoom or pan. The native event is always swallowed.
    pub fn handle_wheel(&mut self, input: &WheelInput) -> InputResponse {
        if self.state != Lifecycle::Ready {
            return InputResponse::ignored();
        }
        let next = wheel_to_range(
            self.range,
            input,
            self.viewport.width,
            self.viewport.height,
            &self.config.interaction,
        );
        let rerendered = match next {
            Some(range) => {
                self.commit_range(range);
                self.render(true)
            }
            None => false,
        };
        InputResponse::consumed(rerendered)
    }

    /// Click: notify with every candidate, then select them or clear.
    ///
    /// `select-change` and the redraw follow only when the selected set
    /// actually changed, so a click on empty space with nothing selected
    /// reports the click alone.
    pub fn handle_pointer_up(&mut self, input: &PointerInput) -> InputResponse {
        if self.state != Lifecycle::Ready {
            return InputResponse::ignored();
        }
        let hits = self.hit_test(input.offset_x, input.offset_y);
        let candidates: Vec<TimelineEvent> =
            hits.iter().filter_map(|&i| self.events.get(i)).cloned().collect();
        let pointer = self.pointer_info(input);
        let ids: Vec<EventId> = candidates.iter().map(|e| e.id.clone()).collect();
        self.emitter.emit(&Notification::Click {
            events: candidates,
            pointer,
        });

        let before = self.selected_set();
        if ids.is_empty() {
            self.selection.clear();
        } else {
            let multi = input.modifiers.is_command(self.host.platform_modifier_key());
            self.selection.select(
                &ids,
                SelectOptions {
                    append: multi,
                    toggle: true,
                },
            );
        }

        let mut response = InputResponse::ignored();
        if self.selected_set() != before {
            self.emit_selection();
            response.rerendered = self.render(true);
        }
        response
    }

    /// Context menu: notify with the first candidate, if any.
    pub fn handle_context_menu(&mut self, input: &PointerInput) -> InputResponse {
        if self.state != Lifecycle::Ready {
            return InputResponse::ignored();
        }
        let event = self
            .hit_test(input.offset_x, input.offset_y)
            .first()
            .and_then(|&i| self.events.get(i))
            .cloned();
        let pointer = self.pointer_info(input);
        self.emitter.emit(&Notification::ContextClick { event, pointer });
        InputResponse {
            prevent_default: true,
            ..InputResponse::default()
        }
    }

    /// Hover tracking: leave for the old event, then hover for the new one.
    pub fn handle_pointer_move(&mut self, input: &PointerInput) -> InputResponse {
        if self.state != Lifecycle::Ready {
            return InputResponse::ignored();
        }
        let candidate = self
            .hit_test(input.offset_x, input.offset_y)
            .first()
            .and_then(|&i| self.events.get(i))
            .cloned();
        let change = self.hover.update(candidate.as_ref().map(|e| e.id.clone()));
        if let Some(left) = change.left {
            self.emit_leave(&left);
        }
        if let Some(event) = candidate {
            let pointer = self.pointer_info(input);
            self.emitter.emit(&Notification::Hover { event, pointer });
        }
        InputResponse::ignored()
    }

    /// The pointer left the canvas.
    pub fn handle_pointer_leave(&mut self) {
        if let Some(left) = self.hover.update(None).left {
            self.emit_leave(&left);
        }
    }

    fn emit_leave(&mut self, id: &EventId) {
        if let Some(event) = self.find_event(id).cloned() {
            self.emitter.emit(&Notification::Leave { event });
        }
    }

    // Notifications

    pub fn subscribe(
        &mut self,
        kind: NotificationKind,
        listener: impl FnMut(&Notification) + 'static,
    ) -> SubscriptionId {
        self.emitter.subscribe(kind, listener)
    }

    pub fn subscribe_boxed(
        &mut self,
        kind: NotificationKind,
        listener: Listener,
    ) -> SubscriptionId {
        self.emitter.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.emitter.unsubscribe(id)
    }

    /// Drop the surface, every subscriber and all layer caches.
    pub fn destroy(&mut self) {
        if self.state == Lifecycle::Destroyed {
            return;
        }
        self.pipeline.destroy();
        self.emitter.clear();
        self.hover.reset();
        self.surface = None;
        self.state = Lifecycle::Destroyed;
        log::debug!("timeline: destroyed");
    }
}
