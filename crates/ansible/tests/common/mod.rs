#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Notify;

use runbook_ansible::engine::{
    EngineError, EngineFactory, EngineHooks, EngineSpec, PlaybookEngine,
};
use runbook_ansible::runner::{JobRunner, RunnerContext};
use runbook_ansible::stats::AggregateStats;
use runbook_core::paths::DirectoryResolver;
use runbook_core::run_status::is_terminal;
use runbook_events::RunStatus;

/// What a fake engine does when run.
#[derive(Clone)]
pub enum Script {
    /// One play with a gather-facts step, a changed task, and a skip.
    Succeed,
    /// A host fails and the engine reports an error.
    Fail,
    /// The engine panics mid-run.
    Panic,
    /// Emits "Starting", then blocks until notified, then succeeds.
    WaitFor(Arc<Notify>),
    /// The playbook asks for a variable interactively.
    Prompt,
}

/// Observations shared between a test and the engines it builds.
#[derive(Default)]
pub struct EngineTracker {
    pub builds: AtomicUsize,
    pub cache_cleared: AtomicBool,
    pub dropped: AtomicBool,
    pub last_spec: Mutex<Option<EngineSpec>>,
}

impl EngineTracker {
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn cache_cleared(&self) -> bool {
        self.cache_cleared.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }

    pub fn last_spec(&self) -> Option<EngineSpec> {
        self.last_spec.lock().unwrap().clone()
    }
}

/// Factory handing out scripted engines, one script per build.
///
/// Once the queue is empty every further build uses [`Script::Succeed`].
pub struct FakeFactory {
    scripts: Mutex<VecDeque<Script>>,
    pub tracker: Arc<EngineTracker>,
}

impl FakeFactory {
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
            tracker: Arc::new(EngineTracker::default()),
        }
    }
}

impl EngineFactory for FakeFactory {
    fn build(
        &self,
        spec: EngineSpec,
        hooks: EngineHooks,
    ) -> Result<Box<dyn PlaybookEngine>, EngineError> {
        self.tracker.builds.fetch_add(1, Ordering::SeqCst);
        *self.tracker.last_spec.lock().unwrap() = Some(spec);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Succeed);
        Ok(Box::new(FakeEngine {
            script,
            hooks,
            tracker: Arc::clone(&self.tracker),
        }))
    }
}

/// Factory whose builds always fail.
pub struct BrokenFactory;

impl EngineFactory for BrokenFactory {
    fn build(
        &self,
        _spec: EngineSpec,
        _hooks: EngineHooks,
    ) -> Result<Box<dyn PlaybookEngine>, EngineError> {
        Err(EngineError::Spawn(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "ansible-playbook not installed",
        )))
    }
}

pub struct FakeEngine {
    script: Script,
    hooks: EngineHooks,
    tracker: Arc<EngineTracker>,
}

impl FakeEngine {
    fn play_through(&mut self) -> AggregateStats {
        let mut stats = AggregateStats::new();
        let playbook = &mut self.hooks.playbook;
        let runner = &mut self.hooks.runner;

        playbook.on_play_start("Configure web");
        playbook.on_setup();
        runner.on_ok("web1", false);
        stats.record_ok("web1", false);
        playbook.on_task_start("Install nginx", false);
        runner.on_ok("web1", true);
        stats.record_ok("web1", true);
        runner.on_skipped("db1", Some("postgresql"));
        stats.record_skipped("db1");
        playbook.on_stats(&stats);
        stats
    }
}

#[async_trait]
impl PlaybookEngine for FakeEngine {
    async fn run(&mut self) -> Result<AggregateStats, EngineError> {
        self.hooks.playbook.on_start();
        match self.script.clone() {
            Script::Succeed => Ok(self.play_through()),
            Script::Fail => {
                self.hooks.playbook.on_task_start("Install nginx", false);
                self.hooks.runner.on_failed("web1");
                Err(EngineError::Exited {
                    code: 4,
                    stderr: "ERROR! unreachable".to_string(),
                })
            }
            Script::Panic => panic!("engine exploded"),
            Script::WaitFor(gate) => {
                gate.notified().await;
                Ok(self.play_through())
            }
            Script::Prompt => {
                self.hooks.playbook.on_vars_prompt("db_password")?;
                Ok(self.play_through())
            }
        }
    }

    fn clear_host_cache(&mut self) {
        self.tracker.cache_cleared.store(true, Ordering::SeqCst);
    }
}

impl Drop for FakeEngine {
    fn drop(&mut self) {
        self.tracker.dropped.store(true, Ordering::SeqCst);
    }
}

/// A playbook directory with one inventory and one playbook.
pub fn playbook_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "hosts.inv", "[web]\nweb1\n");
    write(dir.path(), "site.yml", "- hosts: web\n  tasks: []\n");
    dir
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

pub fn runner_with(dir: &TempDir, factory: Arc<dyn EngineFactory>) -> JobRunner {
    JobRunner::new(RunnerContext {
        resolver: DirectoryResolver::new(dir.path()).unwrap(),
        factory,
    })
}

/// Poll until the run reaches a terminal status.
pub async fn wait_for_terminal(runner: &JobRunner) -> RunStatus {
    for _ in 0..500 {
        let status = runner.status().await;
        if is_terminal(&status.status) {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("run did not finish: {:?}", runner.status().await);
}

/// Poll until the worker slot is free again.
pub async fn wait_until_idle(runner: &JobRunner) {
    for _ in 0..500 {
        if !runner.is_running().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("worker never exited");
}

pub fn messages(status: &RunStatus) -> Vec<&str> {
    status.log.iter().map(|entry| entry.message.as_str()).collect()
}
