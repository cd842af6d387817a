//! `ansible-playbook` subprocess engine.
//!
//! Spawns the playbook command with the JSON-lines stdout callback enabled,
//! reads stdout line by line, and drives the hooks for every recognised
//! event while keeping its own per-host counters and result cache.
//!
//! stdin is closed: a playbook that needs interactive input fails instead
//! of hanging.

use std::collections::HashMap;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::engine::{EngineError, EngineFactory, EngineHooks, EngineSpec, PlaybookEngine};
use crate::messages::{parse_message, AnsibleMessage, HostResult, GATHER_FACTS_TASK};
use crate::stats::AggregateStats;

/// Environment variable selecting ansible's stdout callback plugin.
const STDOUT_CALLBACK_ENV: &str = "ANSIBLE_STDOUT_CALLBACK";

/// Callback plugin emitting one JSON object per event.
const JSONL_CALLBACK: &str = "ansible.posix.jsonl";

/// Exit codes meaning the run went through. 2 and 3 report failed and
/// unreachable hosts, which are surfaced through the hooks instead.
const COMPLETED_EXIT_CODES: [i32; 3] = [0, 2, 3];

/// Maximum stderr captured for error reporting (1 MiB).
const MAX_STDERR_BYTES: u64 = 1024 * 1024;

/// How to invoke `ansible-playbook`.
///
/// Parsed from a whitespace-separated command line so wrappers such as
/// `uv run ansible-playbook` work. The inventory and playbook arguments are
/// appended after `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsibleCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl AnsibleCommand {
    /// Parse a command line. Returns `None` when it is blank.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl Default for AnsibleCommand {
    fn default() -> Self {
        Self {
            program: "ansible-playbook".to_string(),
            args: Vec::new(),
        }
    }
}

/// Builds [`AnsiblePlaybook`] engines.
#[derive(Debug, Clone, Default)]
pub struct AnsiblePlaybookFactory {
    command: AnsibleCommand,
}

impl AnsiblePlaybookFactory {
    pub fn new(command: AnsibleCommand) -> Self {
        Self { command }
    }
}

impl EngineFactory for AnsiblePlaybookFactory {
    fn build(
        &self,
        spec: EngineSpec,
        hooks: EngineHooks,
    ) -> Result<Box<dyn PlaybookEngine>, EngineError> {
        Ok(Box::new(AnsiblePlaybook::new(
            self.command.clone(),
            spec,
            hooks,
        )))
    }
}

/// One `ansible-playbook` invocation.
pub struct AnsiblePlaybook {
    command: AnsibleCommand,
    spec: EngineSpec,
    hooks: EngineHooks,
    stats: AggregateStats,
    /// Last result seen per host.
    host_cache: HashMap<String, HostResult>,
    stats_reported: bool,
}

impl AnsiblePlaybook {
    pub fn new(command: AnsibleCommand, spec: EngineSpec, hooks: EngineHooks) -> Self {
        Self {
            command,
            spec,
            hooks,
            stats: AggregateStats::new(),
            host_cache: HashMap::new(),
            stats_reported: false,
        }
    }

    /// Number of hosts with a cached result.
    pub fn cached_hosts(&self) -> usize {
        self.host_cache.len()
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args)
            .arg("-i")
            .arg(&self.spec.inventory_path)
            .arg(&self.spec.playbook_path)
            .env(STDOUT_CALLBACK_ENV, JSONL_CALLBACK)
            .env("ANSIBLE_NOCOLOR", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Relative role and file lookups are resolved from the playbook's
        // own directory.
        if let Some(dir) = self
            .spec
            .playbook_path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
        {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Handle one stdout line.
    fn handle_line(&mut self, line: &str) -> Result<(), EngineError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        match parse_message(trimmed) {
            Ok(message) => self.dispatch(message),
            Err(e) => {
                tracing::debug!(error = %e, line = %trimmed, "Ignoring non-event output");
                Ok(())
            }
        }
    }

    fn dispatch(&mut self, message: AnsibleMessage) -> Result<(), EngineError> {
        match message {
            AnsibleMessage::PlaybookStart => self.hooks.playbook.on_start(),
            AnsibleMessage::PlayStart { play } => self.hooks.playbook.on_play_start(&play.name),
            AnsibleMessage::TaskStart { task } if task.name == GATHER_FACTS_TASK => {
                self.hooks.playbook.on_setup()
            }
            AnsibleMessage::TaskStart { task } => {
                self.hooks.playbook.on_task_start(&task.name, false)
            }
            AnsibleMessage::HandlerTaskStart { task } => {
                self.hooks.playbook.on_task_start(&task.name, true)
            }
            AnsibleMessage::RunnerOk { hosts } => {
                for (host, result) in hosts {
                    self.stats.record_ok(&host, result.changed);
                    self.hooks.runner.on_ok(&host, result.changed);
                    self.host_cache.insert(host, result);
                }
            }
            AnsibleMessage::RunnerFailed { hosts } => {
                for (host, result) in hosts {
                    self.stats.record_failure(&host);
                    self.hooks.runner.on_failed(&host);
                    self.host_cache.insert(host, result);
                }
            }
            AnsibleMessage::RunnerUnreachable { hosts } => {
                for (host, result) in hosts {
                    self.stats.record_unreachable(&host);
                    self.hooks.runner.on_unreachable(&host);
                    self.host_cache.insert(host, result);
                }
            }
            AnsibleMessage::RunnerSkipped { hosts } => {
                for (host, result) in hosts {
                    self.stats.record_skipped(&host);
                    let item = result.item_label();
                    self.hooks.runner.on_skipped(&host, item.as_deref());
                    self.host_cache.insert(host, result);
                }
            }
            AnsibleMessage::NoHostsMatched => self.hooks.playbook.on_no_hosts_matched(),
            AnsibleMessage::NoHostsRemaining => self.hooks.playbook.on_no_hosts_remaining(),
            AnsibleMessage::VarsPrompt { varname } => {
                // stdin is closed, so any answer the hooks give is unused.
                self.hooks.playbook.on_vars_prompt(&varname)?;
            }
            AnsibleMessage::Stats => self.report_stats(),
            AnsibleMessage::Other => {}
        }
        Ok(())
    }

    fn report_stats(&mut self) {
        self.stats_reported = true;
        self.hooks.playbook.on_stats(&self.stats);
    }
}

#[async_trait]
impl PlaybookEngine for AnsiblePlaybook {
    async fn run(&mut self) -> Result<AggregateStats, EngineError> {
        tracing::info!(
            program = %self.command.program,
            inventory = %self.spec.inventory_path.display(),
            playbook = %self.spec.playbook_path.display(),
            "Spawning ansible-playbook",
        );

        let mut child = self.build_command().spawn().map_err(EngineError::Spawn)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Io(std::io::Error::other("stdout was not captured")))?;
        let stderr = child.stderr.take();
        let stderr_task = tokio::spawn(async move { read_capped(stderr).await });

        // Lines are decoded lossily: hosts may print output in any encoding.
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            // An error here drops `child`, which kills the process.
            self.handle_line(&String::from_utf8_lossy(&buf))?;
        }

        let status = child.wait().await?;
        let stderr_bytes = stderr_task.await.unwrap_or_default();
        let code = status.code().unwrap_or(-1);

        if !COMPLETED_EXIT_CODES.contains(&code) {
            let stderr = String::from_utf8_lossy(&stderr_bytes).trim().to_string();
            tracing::warn!(code, stderr = %stderr, "ansible-playbook did not complete");
            return Err(EngineError::Exited { code, stderr });
        }

        if !self.stats_reported {
            self.report_stats();
        }
        tracing::info!(code, hosts = self.stats.host_count(), "ansible-playbook completed");
        Ok(self.stats.clone())
    }

    fn clear_host_cache(&mut self) {
        self.host_cache.clear();
    }
}

/// Read a stream to the end, keeping at most [`MAX_STDERR_BYTES`].
async fn read_capped<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h).take(MAX_STDERR_BYTES).read_to_end(&mut buf).await;
    }
    buf
}
