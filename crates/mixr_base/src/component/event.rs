//! Event tokens and per-class event handler tables

use crate::value::{Value, ValueKind};

/// Integer identifying a semantic event.
pub type EventToken = u32;

/// Tokens up to and including this value are key events. Unhandled key
/// events are forwarded to the container instead of being dropped.
pub const MAX_KEY_EVENT: EventToken = 511;

/// Reset to the initial configured state
pub const RESET_EVENT: EventToken = 512;
/// Toggle freeze (no argument) or set it (boolean argument)
pub const FREEZE_EVENT: EventToken = 513;
/// Select a child by name (string) or 1-based index (integer)
pub const SELECT: EventToken = 514;
/// Terminal shutdown request
pub const SHUTDOWN_EVENT: EventToken = 515;
/// Conventional token for `send()` value updates
pub const UPDATE_VALUE: EventToken = 520;
/// First token available for user-defined events
pub const USER_EVENTS: EventToken = 1000;

pub fn is_key_event(token: EventToken) -> bool {
    token <= MAX_KEY_EVENT
}

/// One locally declared event handler.
pub struct EventHandler<T> {
    pub token: EventToken,
    /// Required argument kind; `None` accepts any argument or none
    pub kind: Option<ValueKind>,
    pub handler: fn(&T, Option<&Value>) -> bool,
}

impl<T> EventHandler<T> {
    pub const fn new(token: EventToken, handler: fn(&T, Option<&Value>) -> bool) -> Self {
        Self {
            token,
            kind: None,
            handler,
        }
    }

    pub const fn with_arg(
        token: EventToken,
        kind: ValueKind,
        handler: fn(&T, Option<&Value>) -> bool,
    ) -> Self {
        Self {
            token,
            kind: Some(kind),
            handler,
        }
    }

    fn accepts(&self, token: EventToken, arg: Option<&Value>) -> bool {
        self.token == token
            && match self.kind {
                None => true,
                Some(kind) => arg.is_some_and(|value| kind.matches(value)),
            }
    }
}

/// Try each handler matching `token` and the argument's kind, in declaration
/// order, until one consumes the event.
pub fn dispatch_event<T>(
    handlers: &[EventHandler<T>],
    this: &T,
    token: EventToken,
    arg: Option<&Value>,
) -> bool {
    handlers
        .iter()
        .filter(|h| h.accepts(token, arg))
        .any(|h| (h.handler)(this, arg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    struct Dial {
        value: AtomicI64,
    }

    impl Dial {
        fn on_number(&self, arg: Option<&Value>) -> bool {
            arg.and_then(Value::as_i64)
                .map(|v| self.value.store(v, Ordering::SeqCst))
                .is_some()
        }

        fn on_text(&self, arg: Option<&Value>) -> bool {
            let len = arg.and_then(Value::as_str).map_or(0, str::len);
            self.value.store(-(len as i64), Ordering::SeqCst);
            true
        }

        fn on_zero(&self, _arg: Option<&Value>) -> bool {
            self.value.store(0, Ordering::SeqCst);
            true
        }
    }

    static DIAL_EVENTS: [EventHandler<Dial>; 3] = [
        EventHandler::with_arg(USER_EVENTS, ValueKind::Int, Dial::on_number),
        EventHandler::with_arg(USER_EVENTS, ValueKind::String, Dial::on_text),
        EventHandler::new(USER_EVENTS + 1, Dial::on_zero),
    ];

    #[test]
    fn test_key_range() {
        assert!(is_key_event(b'a' as EventToken));
        assert!(is_key_event(MAX_KEY_EVENT));
        assert!(!is_key_event(RESET_EVENT));
        assert!(!is_key_event(USER_EVENTS));
    }

    #[test]
    fn test_dispatch_by_argument_kind() {
        let dial = Dial {
            value: AtomicI64::new(7),
        };
        assert!(dispatch_event(&DIAL_EVENTS, &dial, USER_EVENTS, Some(&Value::Int(3))));
        assert_eq!(dial.value.load(Ordering::SeqCst), 3);

        assert!(dispatch_event(&DIAL_EVENTS, &dial, USER_EVENTS, Some(&Value::from("abcd"))));
        assert_eq!(dial.value.load(Ordering::SeqCst), -4);

        assert!(!dispatch_event(&DIAL_EVENTS, &dial, USER_EVENTS, Some(&Value::Bool(true))));
        assert!(!dispatch_event(&DIAL_EVENTS, &dial, USER_EVENTS, None));
        assert_eq!(dial.value.load(Ordering::SeqCst), -4);
    }

    #[test]
    fn test_untyped_handler_accepts_any_argument() {
        let dial = Dial {
            value: AtomicI64::new(7),
        };
        assert!(dispatch_event(&DIAL_EVENTS, &dial, USER_EVENTS + 1, Some(&Value::Bool(true))));
        assert_eq!(dial.value.load(Ordering::SeqCst), 0);
        assert!(!dispatch_event(&DIAL_EVENTS, &dial, USER_EVENTS + 2, None));
    }
}
