//! Argument scrubbing for platform-injected noise parameters.
//!
//! Some calling environments (n8n agents in particular) attach extra keys to
//! every tool call that are not part of any tool schema and would otherwise
//! fail argument binding. The scrub runs on every call, before validation and
//! before any network traffic, and removes exactly the known nuisance keys;
//! everything else passes through so that genuinely unknown arguments still
//! fail validation downstream.

use rmcp::model::JsonObject;

/// Keys injected by n8n that are not part of any tool schema.
pub const SCRUBBED_KEYS: [&str; 4] = ["sessionId", "action", "chatInput", "toolCallId"];

/// Removes the nuisance keys from a raw argument object, if present.
///
/// Pure function: an absent payload is returned unchanged, and argument
/// values are never logged.
pub fn scrub_arguments(arguments: Option<JsonObject>) -> Option<JsonObject> {
    let mut arguments = arguments?;
    let mut removed: Vec<&str> = Vec::new();
    for key in SCRUBBED_KEYS {
        if arguments.remove(key).is_some() {
            removed.push(key);
        }
    }
    if !removed.is_empty() {
        tracing::debug!(keys = ?removed, "stripped platform-injected tool arguments");
    }
    Some(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn object(value: Value) -> JsonObject {
        value
            .as_object()
            .expect("test payload should be an object")
            .clone()
    }

    #[test]
    fn strips_every_nuisance_key() {
        let args = object(json!({
            "sessionId": "abc",
            "action": "run",
            "chatInput": "hello",
            "toolCallId": "tc-1",
            "query": "auth flow"
        }));
        let scrubbed = scrub_arguments(Some(args)).expect("payload should survive");
        assert_eq!(scrubbed.len(), 1);
        assert_eq!(scrubbed["query"], "auth flow");
    }

    #[test]
    fn scrubbing_is_idempotent_and_order_independent() {
        let clean = object(json!({"query": "q", "workspace": "ws-1"}));
        let noisy = object(json!({"toolCallId": "x", "query": "q", "sessionId": "s", "workspace": "ws-1"}));

        let once = scrub_arguments(Some(noisy)).expect("payload should survive");
        assert_eq!(once, clean);
        let twice = scrub_arguments(Some(once)).expect("payload should survive");
        assert_eq!(twice, clean);
        assert_eq!(scrub_arguments(Some(clean.clone())), Some(clean));
    }

    #[test]
    fn unrecognized_keys_pass_through_for_downstream_validation() {
        let args = object(json!({"sessionId": "s", "definitely_not_a_param": 1}));
        let scrubbed = scrub_arguments(Some(args)).expect("payload should survive");
        assert!(scrubbed.contains_key("definitely_not_a_param"));
        assert!(!scrubbed.contains_key("sessionId"));
    }

    #[test]
    fn missing_payload_passes_through() {
        assert_eq!(scrub_arguments(None), None);
    }
}
