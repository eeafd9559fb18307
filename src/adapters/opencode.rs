use crate::admin::AdminCommand;
use crate::events::{EventStimulus, Stimulus};
use anyhow::Context;
use serde_json::Value;

use super::HostMessage;

/// Parses one line written by the host.
///
/// Accepted shapes: `{"hook":"event","event":{...}}`, a bare event
/// `{"type":...,"properties":{...}}`, `{"hook":"tool.execute.before"|"tool.execute.after","input":{"tool":...}}`
/// and `{"hook":"command","command":...,"arguments":...}`.
pub fn parse_message(payload: &str) -> anyhow::Result<Option<HostMessage>> {
    let value: Value = serde_json::from_str(payload).context("parse opencode payload")?;

    let hook = value.get("hook").and_then(|v| v.as_str());
    let message = match hook {
        Some("event") => value
            .get("event")
            .and_then(parse_event)
            .map(HostMessage::Stimulus),
        Some("tool.execute.before") => tool_name(&value)
            .map(|tool| HostMessage::Stimulus(Stimulus::tool_before(tool))),
        Some("tool.execute.after") => tool_name(&value)
            .map(|tool| HostMessage::Stimulus(Stimulus::tool_after(tool))),
        Some("command") => parse_command(&value).map(HostMessage::Command),
        Some(_) => None,
        None => parse_event(&value).map(HostMessage::Stimulus),
    };

    Ok(message)
}

/// Reduces a host event to a stimulus. Events without a `type` are dropped.
pub fn parse_event(event: &Value) -> Option<Stimulus> {
    let name = event.get("type").and_then(|v| v.as_str())?;
    let properties = event.get("properties");
    let info = properties.and_then(|p| p.get("info"));

    let role = info
        .and_then(|i| string_at(i, "/role").or_else(|| string_at(i, "/author/role")));

    let message_id = info
        .and_then(|i| string_at(i, "/id"))
        .or_else(|| properties.and_then(|p| string_at(p, "/message_id")))
        .or_else(|| properties.and_then(|p| string_at(p, "/id")))
        .or_else(|| string_at(event, "/id"));

    let permission_request_id = properties
        .and_then(|p| string_at(p, "/id"))
        .or_else(|| info.and_then(|i| string_at(i, "/id")))
        .or_else(|| string_at(event, "/id"));

    Some(Stimulus::Event(EventStimulus {
        name: name.to_string(),
        role,
        message_id,
        permission_request_id,
    }))
}

fn tool_name(value: &Value) -> Option<String> {
    string_at(value, "/input/tool").or_else(|| string_at(value, "/tool"))
}

fn parse_command(value: &Value) -> Option<AdminCommand> {
    let name = value.get("command").and_then(|v| v.as_str())?;
    let arguments = value
        .get("arguments")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    AdminCommand::parse(name, arguments)
}

// Identifiers may arrive as strings or numbers; both compare as text.
fn string_at(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
