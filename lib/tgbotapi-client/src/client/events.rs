// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// The events a [`crate::Client`] raises for incoming updates.
///
/// Every update raises [`EventKind::Update`] with the whole envelope, followed by at most one
/// of the other kinds with the payload of the field that was recognized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Any update, carrying the whole envelope.
    Update,
    /// The `callback_query` of an update.
    InlineCallbackQuery,
    /// The `edited_message` of an update.
    EditedMessage,
    /// The `inline_query` of an update.
    InlineQuery,
    /// The `chosen_inline_result` of an update.
    InlineResult,
    /// The `message` of an update.
    Message,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        Self::Update,
        Self::InlineCallbackQuery,
        Self::EditedMessage,
        Self::InlineQuery,
        Self::InlineResult,
        Self::Message,
    ];

    /// The name under which the event is known, such as `"inline.callback.query"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::InlineCallbackQuery => "inline.callback.query",
            Self::EditedMessage => "edited.message",
            Self::InlineQuery => "inline.query",
            Self::InlineResult => "inline.result",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The given name does not belong to any [`EventKind`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownEvent(pub String);

impl std::error::Error for UnknownEvent {}

impl fmt::Display for UnknownEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event: {}", self.0)
    }
}

impl FromStr for EventKind {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

pub(crate) type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Listeners registered per event, kept in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    map: Mutex<HashMap<EventKind, Vec<Listener>>>,
}

impl Listeners {
    pub(crate) fn add(&self, kind: EventKind, listener: Listener) {
        self.map
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push(listener);
    }

    pub(crate) fn clear(&self, kind: EventKind) {
        self.map.lock().unwrap().remove(&kind);
    }

    pub(crate) fn count(&self, kind: EventKind) -> usize {
        self.map.lock().unwrap().get(&kind).map_or(0, Vec::len)
    }

    /// Calls every listener of `kind` with `payload`, returning how many were called.
    pub(crate) fn emit(&self, kind: EventKind, payload: &Value) -> usize {
        // Listeners run outside the lock so they can register more of them.
        let listeners = match self.map.lock().unwrap().get(&kind) {
            Some(listeners) => listeners.clone(),
            None => return 0,
        };
        for listener in listeners.iter() {
            listener(payload);
        }
        listeners.len()
    }
}
