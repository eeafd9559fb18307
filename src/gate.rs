//! Dedup and debounce state for one engine.
//!
//! Two independent strategies, both driven by [`Suppression`]:
//! identity dedup for message updates and permission prompts, and a
//! timestamp debounce for acknowledgement-class events that carry no
//! stable identifier.

use crate::config::Suppression;
use crate::events::{Stimulus, MESSAGE_UPDATED, PERMISSION_ASKED};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub trait Clock: Send {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.origin + offset
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Accept,
    DuplicateMessage(String),
    DuplicatePermission(String),
    Debounced { since_last: Duration },
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accept)
    }
}

#[derive(Debug, Default)]
pub struct SuppressionGate {
    last_message_id: Option<String>,
    last_permission_request_id: Option<String>,
    last_command_at: Option<Instant>,
}

impl SuppressionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether `stimulus` may be dispatched. Never mutates state.
    pub fn admit(&self, stimulus: &Stimulus, policy: &Suppression, now: Instant) -> Admission {
        let Stimulus::Event(event) = stimulus else {
            return Admission::Accept;
        };

        if policy.dedup_messages && event.name == MESSAGE_UPDATED {
            if let Some(id) = &event.message_id {
                if self.last_message_id.as_ref() == Some(id) {
                    return Admission::DuplicateMessage(id.clone());
                }
            }
        }

        if policy.dedup_permissions && event.name == PERMISSION_ASKED {
            if let Some(id) = &event.permission_request_id {
                if self.last_permission_request_id.as_ref() == Some(id) {
                    return Admission::DuplicatePermission(id.clone());
                }
            }
        }

        if policy.debounces(&event.name) {
            if let Some(last) = self.last_command_at {
                let since_last = now.saturating_duration_since(last);
                if since_last < Duration::from_millis(policy.debounce_ms) {
                    return Admission::Debounced { since_last };
                }
            }
        }

        Admission::Accept
    }

    /// Records a dispatched stimulus so later duplicates are suppressed.
    pub fn record(&mut self, stimulus: &Stimulus, policy: &Suppression, now: Instant) {
        let Stimulus::Event(event) = stimulus else {
            return;
        };

        if event.name == MESSAGE_UPDATED {
            if let Some(id) = &event.message_id {
                self.last_message_id = Some(id.clone());
            }
        }

        if event.name == PERMISSION_ASKED {
            if let Some(id) = &event.permission_request_id {
                self.last_permission_request_id = Some(id.clone());
            }
        }

        if policy.debounces(&event.name) {
            self.last_command_at = Some(now);
        }
    }

    pub fn last_message_id(&self) -> Option<&str> {
        self.last_message_id.as_deref()
    }

    pub fn last_permission_request_id(&self) -> Option<&str> {
        self.last_permission_request_id.as_deref()
    }
}
