//! Typed parsing of `ansible-playbook` JSON-lines output.
//!
//! With `ANSIBLE_STDOUT_CALLBACK=ansible.posix.jsonl` every callback event
//! is written to stdout as one JSON object whose `_event` field names the
//! callback, e.g.
//!
//! ```text
//! {"_event": "v2_playbook_on_task_start", "task": {"name": "ping", ...}, ...}
//! {"_event": "v2_runner_on_ok", "hosts": {"web1": {"changed": false, ...}}, ...}
//! ```
//!
//! This module deserializes those lines into [`AnsibleMessage`]. Events the
//! runner does not care about map to [`AnsibleMessage::Other`].

use std::collections::BTreeMap;

use serde::Deserialize;

/// Name ansible gives the implicit fact-gathering task.
pub const GATHER_FACTS_TASK: &str = "Gathering Facts";

/// All JSON-lines events the engine reacts to.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "_event")]
pub enum AnsibleMessage {
    #[serde(rename = "v2_playbook_on_start")]
    PlaybookStart,

    #[serde(rename = "v2_playbook_on_play_start")]
    PlayStart { play: NamedItem },

    #[serde(rename = "v2_playbook_on_task_start")]
    TaskStart { task: NamedItem },

    /// A notified handler is about to run.
    #[serde(rename = "v2_playbook_on_handler_task_start")]
    HandlerTaskStart { task: NamedItem },

    #[serde(rename = "v2_runner_on_ok")]
    RunnerOk { hosts: BTreeMap<String, HostResult> },

    #[serde(rename = "v2_runner_on_failed")]
    RunnerFailed { hosts: BTreeMap<String, HostResult> },

    #[serde(rename = "v2_runner_on_unreachable")]
    RunnerUnreachable { hosts: BTreeMap<String, HostResult> },

    #[serde(rename = "v2_runner_on_skipped")]
    RunnerSkipped { hosts: BTreeMap<String, HostResult> },

    #[serde(rename = "v2_playbook_on_no_hosts_matched")]
    NoHostsMatched,

    #[serde(rename = "v2_playbook_on_no_hosts_remaining")]
    NoHostsRemaining,

    /// The playbook declares `vars_prompt` for `varname`.
    #[serde(rename = "v2_playbook_on_vars_prompt")]
    VarsPrompt {
        #[serde(default)]
        varname: String,
    },

    /// Final recap. Counters are taken from the engine's own bookkeeping,
    /// so the payload is not parsed.
    #[serde(rename = "v2_playbook_on_stats")]
    Stats,

    #[serde(other)]
    Other,
}

/// The `play` or `task` object of an event.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedItem {
    #[serde(default)]
    pub name: String,
}

/// One host's entry in a runner event's `hosts` map.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostResult {
    #[serde(default)]
    pub changed: bool,
    /// Loop item for looped tasks. Any JSON type.
    #[serde(default)]
    pub item: Option<serde_json::Value>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl HostResult {
    /// The loop item rendered for display. Strings are shown unquoted.
    pub fn item_label(&self) -> Option<String> {
        self.item.as_ref().map(|item| match item {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Parse one stdout line.
pub fn parse_message(line: &str) -> Result<AnsibleMessage, serde_json::Error> {
    serde_json::from_str(line)
}
