//! Trigger matching.
//!
//! Matching is a pure function of the stimulus and the mapping list: it never
//! looks at dedup or debounce state, which the engine applies around it.

use crate::config::{Mapping, Trigger};
use crate::events::{EventStimulus, Stimulus, ToolPhase, MESSAGE_UPDATED};

/// Returns every mapping with at least one trigger matching `stimulus`, in
/// stored order. Mappings without triggers or without sounds are skipped.
pub fn matches<'a>(stimulus: &Stimulus, mappings: &'a [Mapping]) -> Vec<&'a Mapping> {
    mappings
        .iter()
        .filter(|mapping| {
            if mapping.triggers.is_empty() || mapping.sounds.is_empty() {
                tracing::debug!(mapping = %mapping.name, "skipping inert mapping");
                return false;
            }
            mapping
                .triggers
                .iter()
                .any(|trigger| trigger_matches(trigger, stimulus))
        })
        .collect()
}

pub fn trigger_matches(trigger: &Trigger, stimulus: &Stimulus) -> bool {
    match (trigger, stimulus) {
        (Trigger::Event { value, role }, Stimulus::Event(event)) => {
            value == &event.name && role_matches(role.as_deref(), event)
        }
        (Trigger::ToolBefore { value }, Stimulus::Tool { phase, tool }) => {
            *phase == ToolPhase::Before && value == tool
        }
        (Trigger::ToolAfter { value }, Stimulus::Tool { phase, tool }) => {
            *phase == ToolPhase::After && value == tool
        }
        _ => false,
    }
}

// A role constraint only applies to message updates; elsewhere it is ignored.
fn role_matches(expected: Option<&str>, event: &EventStimulus) -> bool {
    match expected {
        Some(expected) if event.name == MESSAGE_UPDATED => event.role.as_deref() == Some(expected),
        _ => true,
    }
}
