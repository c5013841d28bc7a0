//! Input types and the pure parts of pan, zoom and hover handling.

use tracklane_protocol::EventId;

use crate::config::InteractionConfig;
use crate::host::CommandKey;
use crate::math::{clamp, ratio};
use crate::model::TimeRange;
use crate::scale::TimeScale;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    /// Whether the platform "command" key is held.
    pub fn is_command(&self, key: CommandKey) -> bool {
        match key {
            CommandKey::Meta => self.meta,
            CommandKey::Ctrl => self.ctrl,
        }
    }
}

/// A wheel event, with offsets relative to the canvas in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelInput {
    pub delta_x: f64,
    pub delta_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub modifiers: Modifiers,
}

/// A pointer event. `offset_*` are canvas-relative, `client_*` are
/// passed through to notifications untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerInput {
    pub offset_x: f64,
    pub offset_y: f64,
    pub client_x: f64,
    pub client_y: f64,
    pub modifiers: Modifiers,
}

/// What the host should do with the native event after handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputResponse {
    pub prevent_default: bool,
    pub stop_propagation: bool,
    pub rerendered: bool,
}

impl InputResponse {
    pub fn ignored() -> Self {
        Self::default()
    }

    /// Swallow the native event.
    pub fn consumed(rerendered: bool) -> Self {
        Self {
            prevent_default: true,
            stop_propagation: true,
            rerendered,
        }
    }
}

/// The visible range after one wheel event, or `None` if it is unchanged.
///
/// Vertical motion past the dead zone zooms around the cursor, or pans with
/// shift held. A cursor outside the canvas does not zoom. Horizontal motion
/// pans, unless the vertical motion already did.
pub fn wheel_to_range(
    range: TimeRange,
    input: &WheelInput,
    css_width: f64,
    css_height: f64,
    config: &InteractionConfig,
) -> Option<TimeRange> {
    let mut start = range.start;
    let mut end = range.end;
    let mut panned = false;

    if input.delta_y.abs() > config.wheel_dead_zone {
        let domain = end - start;
        if input.modifiers.shift {
            let delta = domain * input.delta_y * config.wheel_pan_speed;
            start += delta;
            end += delta;
            panned = true;
        } else if (0.0..=css_width).contains(&input.offset_x)
            && (0.0..=css_height).contains(&input.offset_y)
        {
            let factor = if input.delta_y > 0.0 {
                config.zoom_out_factor
            } else {
                config.zoom_in_factor
            };
            let next = clamp(domain * factor, config.zoom_min, config.zoom_max);
            let anchor = TimeScale::new(range, css_width).pixel_to_time(input.offset_x);
            let share = ratio(anchor, start, end);
            let share = if share.is_finite() { share } else { 0.5 };
            start = (anchor - share * next).round();
            end = (anchor + (1.0 - share) * next).round();
        }
    }

    if input.delta_x != 0.0 && !panned {
        let delta = (end - start) * input.delta_x * config.wheel_pan_speed;
        start += delta;
        end += delta;
    }

    if start == range.start && end == range.end {
        None
    } else {
        Some(TimeRange::new(start, end))
    }
}

/// Change in the hovered event after a pointer move.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoverChange {
    pub left: Option<EventId>,
    pub entered: Option<EventId>,
}

/// Tracks the event under the pointer between moves.
#[derive(Debug, Clone, Default)]
pub struct HoverState {
    active: Option<EventId>,
}

impl HoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&EventId> {
        self.active.as_ref()
    }

    /// Adopt `candidate` as the hovered event.
    ///
    /// The previous event is reported as left only when it differs from
    /// `candidate`, including moves onto or off empty space.
    pub fn update(&mut self, candidate: Option<EventId>) -> HoverChange {
        if self.active == candidate {
            return HoverChange::default();
        }
        let left = std::mem::replace(&mut self.active, candidate.clone());
        HoverChange {
            left,
            entered: candidate,
        }
    }

    pub fn reset(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SECOND;

    fn loose() -> InteractionConfig {
        InteractionConfig {
            zoom_min: 1.0,
            zoom_max: 1.0e12,
            ..InteractionConfig::default()
        }
    }

    fn wheel(delta_x: f64, delta_y: f64, offset_x: f64) -> WheelInput {
        WheelInput {
            delta_x,
            delta_y,
            offset_x,
            offset_y: 10.0,
            modifiers: Modifiers::default(),
        }
    }

    #[test]
    fn zoom_out_keeps_cursor_ratio() {
        let range = TimeRange::new(0.0, 1000.0);
        let Some(next) = wheel_to_range(range, &wheel(0.0, 100.0, 500.0), 1000.0, 500.0, &loose())
        else {
            panic!("range changed");
        };
        assert_eq!(next, TimeRange::new(-75.0, 1075.0));
    }

    #[test]
    fn zoom_in_off_center_cursor() {
        let range = TimeRange::new(0.0, 1000.0);
        let Some(next) = wheel_to_range(range, &wheel(0.0, -100.0, 250.0), 1000.0, 500.0, &loose())
        else {
            panic!("range changed");
        };
        // 900 wide, 250 stays at a quarter.
        assert_eq!(next, TimeRange::new(25.0, 925.0));
    }

    #[test]
    fn zoom_is_clamped_to_bounds() {
        let range = TimeRange::new(0.0, 10.0 * SECOND);
        let config = InteractionConfig::default();
        let Some(next) = wheel_to_range(range, &wheel(0.0, -100.0, 500.0), 1000.0, 500.0, &config)
        else {
            panic!("range changed");
        };
        assert_eq!(next.duration(), 9.0 * SECOND);

        let at_min = TimeRange::new(0.0, config.zoom_min);
        assert!(wheel_to_range(at_min, &wheel(0.0, -100.0, 500.0), 1000.0, 500.0, &config).is_none());
    }

    #[test]
    fn cursor_outside_canvas_does_not_zoom() {
        let range = TimeRange::new(0.0, 1000.0);
        let outside = wheel(0.0, 100.0, 1200.0);
        assert!(wheel_to_range(range, &outside, 1000.0, 500.0, &loose()).is_none());

        // Horizontal motion still pans, over the unzoomed domain.
        let Some(next) = wheel_to_range(range, &wheel(40.0, 100.0, 1200.0), 1000.0, 500.0, &loose())
        else {
            panic!("range changed");
        };
        assert_eq!(next, TimeRange::new(10.0, 1010.0));
    }

    #[test]
    fn shift_pans_and_suppresses_horizontal() {
        let range = TimeRange::new(0.0, 1000.0);
        let mut input = wheel(40.0, 100.0, 500.0);
        input.modifiers.shift = true;
        let Some(next) = wheel_to_range(range, &input, 1000.0, 500.0, &loose()) else {
            panic!("range changed");
        };
        assert_eq!(next, TimeRange::new(25.0, 1025.0));
    }

    #[test]
    fn dead_zone_and_horizontal_pan() {
        let range = TimeRange::new(0.0, 1000.0);
        assert!(wheel_to_range(range, &wheel(0.0, 2.0, 500.0), 1000.0, 500.0, &loose()).is_none());

        let Some(next) = wheel_to_range(range, &wheel(-40.0, 1.0, 500.0), 1000.0, 500.0, &loose())
        else {
            panic!("range changed");
        };
        assert_eq!(next, TimeRange::new(-10.0, 990.0));
    }

    #[test]
    fn hover_reports_leave_before_enter() {
        let mut hover = HoverState::new();
        let first = hover.update(Some("a".into()));
        assert_eq!(first, HoverChange { left: None, entered: Some("a".into()) });
        assert_eq!(hover.update(Some("a".into())), HoverChange::default());

        let switch = hover.update(Some("b".into()));
        assert_eq!(switch.left, Some("a".into()));
        assert_eq!(switch.entered, Some("b".into()));

        let off = hover.update(None);
        assert_eq!(off.left, Some("b".into()));
        assert!(hover.active().is_none());
    }

    #[test]
    fn command_modifier_per_platform() {
        let mods = Modifiers { meta: true, ..Modifiers::default() };
        assert!(mods.is_command(CommandKey::Meta));
        assert!(!mods.is_command(CommandKey::Ctrl));
    }
}
