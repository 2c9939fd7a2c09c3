// Copyright 2020 - developers of the `grammers` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use super::client::Client;
use super::events::EventKind;
use log::{trace, warn};
use serde_json::Value;

/// Update fields that raise their own event, in order of precedence.
const SPECIALIZED: [(&str, EventKind); 5] = [
    ("callback_query", EventKind::InlineCallbackQuery),
    ("edited_message", EventKind::EditedMessage),
    ("inline_query", EventKind::InlineQuery),
    ("chosen_inline_result", EventKind::InlineResult),
    ("message", EventKind::Message),
];

fn field<'u>(update: &'u Value, name: &str) -> Option<&'u Value> {
    update.get(name).filter(|value| !value.is_null())
}

/// Determines the specialized event an update raises, along with its payload.
pub(crate) fn classify(update: &Value) -> Option<(EventKind, &Value)> {
    let mut present = SPECIALIZED
        .iter()
        .filter_map(|&(name, kind)| field(update, name).map(|payload| (name, kind, payload)));

    let (name, kind, payload) = present.next()?;
    let others = present.map(|(name, ..)| name).collect::<Vec<_>>();
    if !others.is_empty() {
        warn!("update has {name} but also {others:?}; only {kind} is raised");
    }
    Some((kind, payload))
}

impl Client {
    /// Raises the events for an incoming update.
    ///
    /// [`EventKind::Update`] always fires first with the whole envelope.
    pub(crate) fn dispatch(&self, update: &Value) {
        trace!("dispatching update {update}");
        self.0.listeners.emit(EventKind::Update, update);
        if let Some((kind, payload)) = classify(update) {
            self.0.listeners.emit(kind, payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTransport, client_with};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Dispatches `update` and returns every event raised, with its payload.
    fn raised(update: Value) -> Vec<(EventKind, Value)> {
        let client = client_with(MockTransport::ok(Value::Null));
        let seen = Arc::new(Mutex::new(Vec::new()));
        for kind in EventKind::ALL {
            let seen = seen.clone();
            client.on(kind, move |payload| {
                seen.lock().unwrap().push((kind, payload.clone()))
            });
        }
        client.dispatch(&update);
        seen.lock().unwrap().clone()
    }

    #[test]
    fn message_raises_two_events() {
        let update = json!({"update_id": 1, "message": {"text": "hi"}});
        assert_eq!(
            raised(update.clone()),
            vec![
                (EventKind::Update, update),
                (EventKind::Message, json!({"text": "hi"})),
            ]
        );
    }

    #[test]
    fn each_field_raises_its_event() {
        for (name, kind) in SPECIALIZED {
            let mut update = json!({"update_id": 7});
            update[name] = json!({"id": "x"});
            assert_eq!(
                raised(update.clone()),
                vec![(EventKind::Update, update), (kind, json!({"id": "x"}))]
            );
        }
    }

    #[test]
    fn callback_query_wins_over_message() {
        let events = raised(json!({
            "update_id": 1,
            "message": {"text": "hi"},
            "callback_query": {"id": "q"},
        }));
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], (EventKind::InlineCallbackQuery, json!({"id": "q"})));
    }

    #[test]
    fn edited_message_wins_over_inline_query() {
        let events = raised(json!({
            "update_id": 1,
            "inline_query": {"id": "i"},
            "edited_message": {"text": "e"},
        }));
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].0, EventKind::EditedMessage);
    }

    #[test]
    fn unknown_update_only_raises_update() {
        let update = json!({"update_id": 1, "poll": {"id": "p"}});
        assert_eq!(raised(update.clone()), vec![(EventKind::Update, update)]);
    }

    #[test]
    fn null_fields_are_absent() {
        let events = raised(json!({"update_id": 1, "callback_query": null, "message": {}}));
        assert_eq!(events[1], (EventKind::Message, json!({})));
    }

    #[test]
    fn non_object_updates_only_raise_update() {
        assert_eq!(
            raised(json!([1, 2])),
            vec![(EventKind::Update, json!([1, 2]))]
        );
    }
}
