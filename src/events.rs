use serde::{Deserialize, Serialize};

pub const MESSAGE_UPDATED: &str = "message.updated";
pub const PERMISSION_ASKED: &str = "permission.asked";
pub const SESSION_IDLE: &str = "session.idle";
pub const STARTUP: &str = "openpeon.startup";

/// Trigger kinds understood by the matcher, as they appear in config documents.
pub const TRIGGER_TYPES: &[&str] = &["event", "tool.before", "tool.after"];

/// Host events that mappings commonly reference.
pub const KNOWN_EVENTS: &[&str] = &[
    "command.executed",
    "file.edited",
    "file.watcher.updated",
    "installation.updated",
    "lsp.client.diagnostics",
    "lsp.updated",
    "message.part.removed",
    "message.part.updated",
    "message.removed",
    MESSAGE_UPDATED,
    PERMISSION_ASKED,
    "permission.replied",
    "server.connected",
    "session.created",
    "session.compacted",
    "session.deleted",
    "session.diff",
    "session.error",
    SESSION_IDLE,
    "session.status",
    "session.updated",
    "todo.updated",
    "tui.prompt.append",
    "tui.command.execute",
    "tui.toast.show",
    STARTUP,
];

/// Tool names the host reports through its execute hooks.
pub const KNOWN_TOOLS: &[&str] = &[
    "question",
    "bash",
    "read",
    "write",
    "edit",
    "glob",
    "grep",
    "task",
    "webfetch",
    "todowrite",
    "todoread",
    "skill",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolPhase {
    #[serde(rename = "tool.before")]
    Before,
    #[serde(rename = "tool.after")]
    After,
}

impl ToolPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolPhase::Before => "tool.before",
            ToolPhase::After => "tool.after",
        }
    }
}

/// A host lifecycle event reduced to the fields triggers and the gate look at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStimulus {
    pub name: String,
    pub role: Option<String>,
    pub message_id: Option<String>,
    pub permission_request_id: Option<String>,
}

impl EventStimulus {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn with_permission_request_id(mut self, id: impl Into<String>) -> Self {
        self.permission_request_id = Some(id.into());
        self
    }
}

/// One incoming occurrence from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stimulus {
    Event(EventStimulus),
    Tool { phase: ToolPhase, tool: String },
}

impl Stimulus {
    pub fn event(name: impl Into<String>) -> Self {
        Stimulus::Event(EventStimulus::named(name))
    }

    pub fn tool_before(tool: impl Into<String>) -> Self {
        Stimulus::Tool {
            phase: ToolPhase::Before,
            tool: tool.into(),
        }
    }

    pub fn tool_after(tool: impl Into<String>) -> Self {
        Stimulus::Tool {
            phase: ToolPhase::After,
            tool: tool.into(),
        }
    }

    /// Short label used in log fields.
    pub fn label(&self) -> String {
        match self {
            Stimulus::Event(event) => event.name.clone(),
            Stimulus::Tool { phase, tool } => format!("{}:{}", phase.as_str(), tool),
        }
    }
}

impl From<EventStimulus> for Stimulus {
    fn from(event: EventStimulus) -> Self {
        Stimulus::Event(event)
    }
}
