//! Named notifications and their subscribers.

use serde::Serialize;

use crate::model::{TimelineEvent, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Click,
    ContextClick,
    SelectChange,
    Hover,
    Leave,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 5] = [
        NotificationKind::Click,
        NotificationKind::ContextClick,
        NotificationKind::SelectChange,
        NotificationKind::Hover,
        NotificationKind::Leave,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Click => "click",
            NotificationKind::ContextClick => "context-click",
            NotificationKind::SelectChange => "select-change",
            NotificationKind::Hover => "hover",
            NotificationKind::Leave => "leave",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// Where the pointer was when a notification fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerInfo {
    /// Time under the pointer.
    pub time: Timestamp,
    /// Canvas-relative position in CSS pixels.
    pub relative_x: f64,
    pub relative_y: f64,
    pub client_x: f64,
    pub client_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Notification {
    /// Every candidate under the pointer, possibly none.
    Click {
        events: Vec<TimelineEvent>,
        #[serde(flatten)]
        pointer: PointerInfo,
    },
    ContextClick {
        event: Option<TimelineEvent>,
        #[serde(flatten)]
        pointer: PointerInfo,
    },
    SelectChange {
        events: Vec<TimelineEvent>,
    },
    Hover {
        event: TimelineEvent,
        #[serde(flatten)]
        pointer: PointerInfo,
    },
    Leave {
        event: TimelineEvent,
    },
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::Click { .. } => NotificationKind::Click,
            Notification::ContextClick { .. } => NotificationKind::ContextClick,
            Notification::SelectChange { .. } => NotificationKind::SelectChange,
            Notification::Hover { .. } => NotificationKind::Hover,
            Notification::Leave { .. } => NotificationKind::Leave,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(&Notification)>;

/// Subscribers by notification kind, called in subscription order.
#[derive(Default)]
pub struct Emitter {
    next_id: u64,
    listeners: Vec<(SubscriptionId, NotificationKind, Listener)>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        kind: NotificationKind,
        listener: impl FnMut(&Notification) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, kind, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _, _)| *sub != id);
        self.listeners.len() != before
    }

    pub fn has_listeners(&self, kind: NotificationKind) -> bool {
        self.listeners.iter().any(|(_, k, _)| *k == kind)
    }

    pub fn emit(&mut self, notification: &Notification) {
        let kind = notification.kind();
        for (_, _, listener) in self.listeners.iter_mut().filter(|(_, k, _)| *k == kind) {
            listener(notification);
        }
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;

    fn pointer() -> PointerInfo {
        PointerInfo {
            time: 1500.0,
            relative_x: 150.0,
            relative_y: 46.0,
            client_x: 158.0,
            client_y: 300.0,
        }
    }

    #[test]
    fn wire_names_round_trip() {
        for kind in NotificationKind::ALL {
            assert_eq!(NotificationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(NotificationKind::parse("dblclick"), None);
    }

    #[test]
    fn listeners_only_see_their_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut emitter = Emitter::new();
        let sink = Rc::clone(&seen);
        let id = emitter.subscribe(NotificationKind::Leave, move |n| {
            sink.borrow_mut().push(n.kind());
        });

        emitter.emit(&Notification::SelectChange { events: Vec::new() });
        let event = TimelineEvent::new("e", 0.0, None, "1", 0);
        emitter.emit(&Notification::Leave { event });
        assert_eq!(*seen.borrow(), vec![NotificationKind::Leave]);

        assert!(emitter.unsubscribe(id));
        assert!(!emitter.unsubscribe(id));
        assert!(!emitter.has_listeners(NotificationKind::Leave));
    }

    #[test]
    fn payload_serializes_flat() {
        let event = TimelineEvent::new("e", 1000.0, Some(2000.0), "1", 0);
        let value = serde_json::to_value(Notification::ContextClick {
            event: Some(event),
            pointer: pointer(),
        });
        let Ok(value) = value else {
            panic!("serializes");
        };
        assert_eq!(value["type"], json!("context-click"));
        assert_eq!(value["event"]["id"], json!("e"));
        assert_eq!(value["relativeX"], json!(150.0));
        assert_eq!(value["time"], json!(1500.0));
    }
}
