//! Browser bridge: a `Timeline` driven by a `<canvas>` element.
//!
//! Data crosses the boundary as JSON strings; notifications reach JS
//! subscribers as parsed objects once the triggering handler has returned.

mod canvas2d;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Once};

use tracklane_core::{
    Axis, CommandKey, HostEnvironment, InputResponse, Lifecycle, Marker, Modifiers, Notification,
    NotificationKind, PointerInput, SubscriptionId, Timeline, TimelineConfig, TimelineEvent,
    Timestamp, WheelInput,
};
use tracklane_protocol::{Color, EventId, ThemeToken};
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlCanvasElement, MouseEvent, WheelEvent};

use crate::canvas2d::{CanvasSurface, Palette};

static INIT: Once = Once::new();

fn init_runtime() {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        _ = console_log::init_with_level(log::Level::Info);
    });
}

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

fn js_value_err(e: JsValue) -> JsError {
    JsError::new(&e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// Host metrics read from the attached canvas and the window.
struct BrowserHost {
    canvas: Rc<RefCell<Option<HtmlCanvasElement>>>,
}

impl HostEnvironment for BrowserHost {
    fn viewport_size(&self) -> (f64, f64) {
        match self.canvas.borrow().as_ref() {
            Some(canvas) => (
                f64::from(canvas.client_width()),
                f64::from(canvas.client_height()),
            ),
            None => (0.0, 0.0),
        }
    }

    fn device_pixel_ratio(&self) -> f64 {
        web_sys::window().map_or(1.0, |w| w.device_pixel_ratio())
    }

    fn platform_modifier_key(&self) -> CommandKey {
        web_sys::window()
            .and_then(|w| w.navigator().user_agent().ok())
            .map_or(CommandKey::Ctrl, |ua| CommandKey::from_user_agent(&ua))
    }

    fn now(&self) -> Timestamp {
        js_sys::Date::now()
    }
}

struct JsSubscriber {
    id: u32,
    kind: NotificationKind,
    callback: js_sys::Function,
}

/// State shared between the exported handle and the DOM listeners.
struct Shared {
    timeline: RefCell<Timeline>,
    pending: Rc<RefCell<Vec<Notification>>>,
    subscribers: RefCell<Vec<JsSubscriber>>,
    next_id: Cell<u32>,
}

impl Shared {
    /// Deliver queued notifications. Runs with the timeline unborrowed so
    /// callbacks may call back into the handle.
    fn flush(&self) {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        for notification in pending {
            let kind = notification.kind();
            let callbacks: Vec<js_sys::Function> = self
                .subscribers
                .borrow()
                .iter()
                .filter(|s| s.kind == kind)
                .map(|s| s.callback.clone())
                .collect();
            if callbacks.is_empty() {
                continue;
            }
            let payload = match serde_json::to_string(&notification)
                .map_err(|e| JsValue::from_str(&e.to_string()))
                .and_then(|json| js_sys::JSON::parse(&json))
            {
                Ok(payload) => payload,
                Err(err) => {
                    log::error!("wasm: failed to encode {} notification: {err:?}", kind.as_str());
                    continue;
                }
            };
            for callback in callbacks {
                if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
                    log::warn!("wasm: {} subscriber threw: {err:?}", kind.as_str());
                }
            }
        }
    }
}

struct DomListener {
    target: EventTarget,
    name: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl DomListener {
    fn remove(&self) {
        _ = self
            .target
            .remove_event_listener_with_callback(self.name, self.closure.as_ref().unchecked_ref());
    }
}

type Handler = fn(&mut Timeline, &Event) -> InputResponse;

fn listen(
    target: &EventTarget,
    name: &'static str,
    shared: &Rc<Shared>,
    handler: Handler,
) -> Result<DomListener, JsValue> {
    let shared = Rc::clone(shared);
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let response = match shared.timeline.try_borrow_mut() {
            Ok(mut timeline) => handler(&mut timeline, &event),
            Err(_) => {
                log::warn!("wasm: dropped re-entrant {name} event");
                return;
            }
        };
        if response.prevent_default {
            event.prevent_default();
        }
        if response.stop_propagation {
            event.stop_propagation();
        }
        shared.flush();
    });
    target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    Ok(DomListener {
        target: target.clone(),
        name,
        closure,
    })
}

fn modifiers(event: &MouseEvent) -> Modifiers {
    Modifiers {
        shift: event.shift_key(),
        ctrl: event.ctrl_key(),
        meta: event.meta_key(),
        alt: event.alt_key(),
    }
}

fn pointer_input(event: &MouseEvent) -> PointerInput {
    PointerInput {
        offset_x: f64::from(event.offset_x()),
        offset_y: f64::from(event.offset_y()),
        client_x: f64::from(event.client_x()),
        client_y: f64::from(event.client_y()),
        modifiers: modifiers(event),
    }
}

fn on_wheel(timeline: &mut Timeline, event: &Event) -> InputResponse {
    let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
        return InputResponse::ignored();
    };
    timeline.handle_wheel(&WheelInput {
        delta_x: wheel.delta_x(),
        delta_y: wheel.delta_y(),
        offset_x: f64::from(wheel.offset_x()),
        offset_y: f64::from(wheel.offset_y()),
        modifiers: modifiers(wheel),
    })
}

fn on_mouse_up(timeline: &mut Timeline, event: &Event) -> InputResponse {
    match event.dyn_ref::<MouseEvent>() {
        Some(mouse) if mouse.button() == 0 => timeline.handle_pointer_up(&pointer_input(mouse)),
        _ => InputResponse::ignored(),
    }
}

fn on_context_menu(timeline: &mut Timeline, event: &Event) -> InputResponse {
    match event.dyn_ref::<MouseEvent>() {
        Some(mouse) => timeline.handle_context_menu(&pointer_input(mouse)),
        None => InputResponse::ignored(),
    }
}

fn on_mouse_move(timeline: &mut Timeline, event: &Event) -> InputResponse {
    match event.dyn_ref::<MouseEvent>() {
        Some(mouse) => timeline.handle_pointer_move(&pointer_input(mouse)),
        None => InputResponse::ignored(),
    }
}

fn on_mouse_leave(timeline: &mut Timeline, _event: &Event) -> InputResponse {
    timeline.handle_pointer_leave();
    InputResponse::ignored()
}

fn on_resize(timeline: &mut Timeline, _event: &Event) -> InputResponse {
    timeline.handle_resize();
    InputResponse::ignored()
}

/// A timeline handle exported to JS.
#[wasm_bindgen]
pub struct WasmTimeline {
    shared: Rc<Shared>,
    canvas: Rc<RefCell<Option<HtmlCanvasElement>>>,
    palette: Rc<RefCell<Palette>>,
    listeners: Vec<DomListener>,
    core_subscriptions: Vec<SubscriptionId>,
}

#[wasm_bindgen]
impl WasmTimeline {
    /// Create a timeline from a JSON `TimelineConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmTimeline, JsError> {
        init_runtime();
        let config: TimelineConfig = serde_json::from_str(config_json).map_err(js_err)?;
        let canvas = Rc::new(RefCell::new(None));
        let host = BrowserHost {
            canvas: Rc::clone(&canvas),
        };
        let timeline = Timeline::create(config, Box::new(host)).map_err(js_err)?;
        Ok(WasmTimeline::from_timeline(timeline, canvas))
    }

    /// Bind to the `<canvas>` with the given element id and draw the first frame.
    ///
    /// Once attached, later calls return `Ok` and keep the current canvas and
    /// listeners.
    pub fn attach(&mut self, canvas_id: &str) -> Result<(), JsError> {
        match self.shared.timeline.borrow().state() {
            Lifecycle::Ready => {
                log::debug!("wasm: already attached, ignoring #{canvas_id}");
                return Ok(());
            }
            Lifecycle::Destroyed => return Err(JsError::new("Timeline is destroyed")),
            Lifecycle::Init => {}
        }

        let window = web_sys::window().ok_or_else(|| JsError::new("No window"))?;
        let document = window.document().ok_or_else(|| JsError::new("No document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsError::new(&format!("No element with id {canvas_id:?}")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsError::new(&format!("Element {canvas_id:?} is not a canvas")))?;

        let surface =
            CanvasSurface::new(canvas.clone(), Rc::clone(&self.palette)).map_err(js_value_err)?;
        *self.canvas.borrow_mut() = Some(canvas.clone());
        self.shared
            .timeline
            .borrow_mut()
            .attach(Box::new(surface))
            .map_err(js_err)?;

        self.remove_listeners();
        let target: &EventTarget = canvas.as_ref();
        let bindings: [(&'static str, Handler); 5] = [
            ("wheel", on_wheel),
            ("mouseup", on_mouse_up),
            ("contextmenu", on_context_menu),
            ("mousemove", on_mouse_move),
            ("mouseleave", on_mouse_leave),
        ];
        for (name, handler) in bindings {
            self.listeners
                .push(listen(target, name, &self.shared, handler).map_err(js_value_err)?);
        }
        let resize = listen(window.as_ref(), "resize", &self.shared, on_resize);
        self.listeners.push(resize.map_err(js_value_err)?);
        log::info!("wasm: attached to #{canvas_id}");
        Ok(())
    }

    #[wasm_bindgen(js_name = setVisibleRange)]
    pub fn set_visible_range(&self, start: f64, end: f64) -> Result<(), JsError> {
        let result = self.shared.timeline.borrow_mut().set_visible_range(start, end);
        self.shared.flush();
        result.map_err(js_err)
    }

    /// `[start, end]` of the visible range.
    #[wasm_bindgen(js_name = getVisibleRange)]
    pub fn get_visible_range(&self) -> Vec<f64> {
        let range = self.shared.timeline.borrow().get_visible_range();
        vec![range.start, range.end]
    }

    #[wasm_bindgen(js_name = setAxes)]
    pub fn set_axes(&self, axes_json: &str) -> Result<(), JsError> {
        let axes: Vec<Axis> = serde_json::from_str(axes_json).map_err(js_err)?;
        self.shared
            .timeline
            .borrow_mut()
            .set_axes(axes.into_iter().map(Arc::new).collect())
            .map_err(js_err)
    }

    #[wasm_bindgen(js_name = setEvents)]
    pub fn set_events(&self, events_json: &str) -> Result<(), JsError> {
        let events: Vec<TimelineEvent> = serde_json::from_str(events_json).map_err(js_err)?;
        self.shared.timeline.borrow_mut().set_events(events);
        self.shared.flush();
        Ok(())
    }

    #[wasm_bindgen(js_name = setMarkers)]
    pub fn set_markers(&self, markers_json: &str) -> Result<(), JsError> {
        let markers: Vec<Marker> = serde_json::from_str(markers_json).map_err(js_err)?;
        self.shared.timeline.borrow_mut().set_markers(markers);
        Ok(())
    }

    /// Replace the selection from a JSON array of event ids.
    #[wasm_bindgen(js_name = setSelectedEvents)]
    pub fn set_selected_events(&self, ids_json: &str) -> Result<(), JsError> {
        let ids: Vec<EventId> = serde_json::from_str(ids_json).map_err(js_err)?;
        self.shared.timeline.borrow_mut().set_selected_events(ids);
        Ok(())
    }

    /// Selected event ids as a JSON array.
    #[wasm_bindgen(js_name = getSelectedEvents)]
    pub fn get_selected_events(&self) -> Result<String, JsError> {
        let ids = self.shared.timeline.borrow().get_selected_events();
        serde_json::to_string(&ids).map_err(js_err)
    }

    #[wasm_bindgen(js_name = setAllowMultipleSelection)]
    pub fn set_allow_multiple_selection(&self, allow: bool) {
        self.shared.timeline.borrow_mut().set_allow_multiple_selection(allow);
    }

    /// Override theme token colors from a JSON object of token name to hex color.
    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&self, theme_json: &str) -> Result<(), JsError> {
        let overrides: HashMap<ThemeToken, Color> =
            serde_json::from_str(theme_json).map_err(js_err)?;
        self.palette.borrow_mut().set_overrides(overrides);
        self.shared.timeline.borrow_mut().rerender();
        Ok(())
    }

    #[wasm_bindgen(js_name = setScrollTop)]
    pub fn set_scroll_top(&self, scroll_top: f64) {
        self.shared.timeline.borrow_mut().set_scroll_top(scroll_top);
    }

    #[wasm_bindgen(js_name = contentHeight)]
    pub fn content_height(&self) -> f64 {
        self.shared.timeline.borrow().content_height()
    }

    #[wasm_bindgen(js_name = timeToPixel)]
    pub fn time_to_pixel(&self, t: f64) -> f64 {
        self.shared.timeline.borrow().time_to_pixel(t)
    }

    #[wasm_bindgen(js_name = pixelToTime)]
    pub fn pixel_to_time(&self, px: f64) -> f64 {
        self.shared.timeline.borrow().pixel_to_time(px)
    }

    #[wasm_bindgen(js_name = widthToDuration)]
    pub fn width_to_duration(&self, px: f64) -> f64 {
        self.shared.timeline.borrow().width_to_duration(px)
    }

    pub fn rerender(&self) -> bool {
        self.shared.timeline.borrow_mut().rerender()
    }

    /// Register `callback` for a notification name (`click`, `context-click`,
    /// `select-change`, `hover`, `leave`). Returns the subscription id.
    pub fn subscribe(&self, name: &str, callback: js_sys::Function) -> Result<u32, JsError> {
        let kind = NotificationKind::parse(name)
            .ok_or_else(|| JsError::new(&format!("Unknown notification {name:?}")))?;
        let id = self.shared.next_id.get();
        self.shared.next_id.set(id + 1);
        self.shared
            .subscribers
            .borrow_mut()
            .push(JsSubscriber { id, kind, callback });
        Ok(id)
    }

    pub fn unsubscribe(&self, id: u32) -> bool {
        let mut subscribers = self.shared.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    /// Detach from the DOM and release the canvas. The handle is inert afterwards.
    pub fn destroy(&mut self) {
        self.remove_listeners();
        self.shared.subscribers.borrow_mut().clear();
        self.shared.pending.borrow_mut().clear();
        let mut timeline = self.shared.timeline.borrow_mut();
        for id in self.core_subscriptions.drain(..) {
            timeline.unsubscribe(id);
        }
        timeline.destroy();
        *self.canvas.borrow_mut() = None;
    }
}

impl WasmTimeline {
    /// Wrap a detached or attached timeline, queueing its notifications for
    /// JS delivery.
    fn from_timeline(
        mut timeline: Timeline,
        canvas: Rc<RefCell<Option<HtmlCanvasElement>>>,
    ) -> Self {
        let pending = Rc::new(RefCell::new(Vec::new()));
        let core_subscriptions = NotificationKind::ALL
            .iter()
            .map(|&kind| {
                let queue = Rc::clone(&pending);
                timeline.subscribe(kind, move |n: &Notification| queue.borrow_mut().push(n.clone()))
            })
            .collect();

        WasmTimeline {
            shared: Rc::new(Shared {
                timeline: RefCell::new(timeline),
                pending,
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
            }),
            canvas,
            palette: Rc::new(RefCell::new(Palette::default())),
            listeners: Vec::new(),
            core_subscriptions,
        }
    }

    fn remove_listeners(&mut self) {
        for listener in self.listeners.drain(..) {
            listener.remove();
        }
    }
}

impl Drop for WasmTimeline {
    fn drop(&mut self) {
        self.remove_listeners();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracklane_core::{RecordingSurface, StaticHost, TimeRange};

    #[test]
    fn second_attach_keeps_current_canvas_and_listeners() {
        let config = TimelineConfig::new(TimeRange::new(0.0, 1000.0));
        let host = StaticHost::new(100.0, 50.0);
        let Ok(mut timeline) = Timeline::create(config, Box::new(host)) else {
            panic!("create failed");
        };
        assert!(timeline.attach(Box::new(RecordingSurface::new())).is_ok());

        let mut bridge = WasmTimeline::from_timeline(timeline, Rc::new(RefCell::new(None)));
        // Returns before looking up the element, so no DOM is needed here.
        assert!(bridge.attach("other").is_ok());
        assert!(bridge.canvas.borrow().is_none());
        assert!(bridge.listeners.is_empty());
        assert_eq!(bridge.shared.timeline.borrow().state(), Lifecycle::Ready);
    }
}
