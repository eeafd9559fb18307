use crate::admin::AdminCommand;
use crate::events::Stimulus;

pub mod opencode;

/// What a single host line asks the dispatcher to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMessage {
    Stimulus(Stimulus),
    Command(AdminCommand),
}

pub fn parse_message(payload: &str) -> anyhow::Result<Option<HostMessage>> {
    opencode::parse_message(payload)
}
