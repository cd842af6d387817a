#![allow(dead_code)]

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tokio::sync::Notify;
use tower::ServiceExt;

use runbook_ansible::engine::{
    EngineError, EngineFactory, EngineHooks, EngineSpec, PlaybookEngine,
};
use runbook_ansible::runner::{JobRunner, RunnerContext};
use runbook_ansible::stats::AggregateStats;
use runbook_api::config::ServerConfig;
use runbook_api::router::build_app_router;
use runbook_api::state::AppState;
use runbook_core::paths::DirectoryResolver;

/// Build a test `ServerConfig` rooted at `dir`.
pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        playbook_dir: dir.path().to_path_buf(),
        debug: false,
        cors_origins: vec!["http://localhost:5000".to_string()],
        request_timeout_secs: 30,
        ansible_command: "ansible-playbook".to_string(),
    }
}

/// A playbook directory with two inventories, two playbooks and a role.
pub fn playbook_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    fs::write(base.join("staging.inv"), "[web]\nweb1\n").unwrap();
    fs::write(base.join("production.inv"), "[web]\nweb1\nweb2\n").unwrap();
    fs::write(base.join("site.yml"), "- hosts: web\n  tasks: []\n").unwrap();
    fs::write(base.join("deploy.yml"), "- hosts: web\n  roles: [app]\n").unwrap();
    fs::write(base.join("README.md"), "notes\n").unwrap();
    fs::create_dir_all(base.join("roles/app/tasks")).unwrap();
    fs::write(base.join("roles/app/tasks/main.yml"), "- name: noop\n").unwrap();
    dir
}

/// Engine that completes after its gate (if any) is opened.
pub struct GatedEngine {
    gate: Option<Arc<Notify>>,
    hooks: EngineHooks,
}

#[async_trait]
impl PlaybookEngine for GatedEngine {
    async fn run(&mut self) -> Result<AggregateStats, EngineError> {
        self.hooks.playbook.on_start();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let mut stats = AggregateStats::new();
        self.hooks.playbook.on_task_start("ping", false);
        self.hooks.runner.on_ok("web1", false);
        stats.record_ok("web1", false);
        self.hooks.playbook.on_stats(&stats);
        Ok(stats)
    }

    fn clear_host_cache(&mut self) {}
}

pub struct GatedFactory {
    gate: Option<Arc<Notify>>,
}

impl EngineFactory for GatedFactory {
    fn build(
        &self,
        _spec: EngineSpec,
        hooks: EngineHooks,
    ) -> Result<Box<dyn PlaybookEngine>, EngineError> {
        Ok(Box::new(GatedEngine {
            gate: self.gate.clone(),
            hooks,
        }))
    }
}

/// Build the application router over `dir` with a fake engine.
///
/// With a gate, runs block after "Starting" until the gate is notified.
pub fn build_test_app(dir: &TempDir, gate: Option<Arc<Notify>>) -> Router {
    let config = test_config(dir);
    let runner = JobRunner::new(RunnerContext {
        resolver: DirectoryResolver::new(dir.path()).unwrap(),
        factory: Arc::new(GatedFactory { gate }),
    });
    let state = AppState {
        config: Arc::new(config.clone()),
        runner: Arc::new(runner),
    };
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll `/api/v1/runs/status` until a terminal status is reported.
pub async fn wait_for_terminal(app: &Router) -> serde_json::Value {
    for _ in 0..500 {
        let json = body_json(get(app.clone(), "/api/v1/runs/status").await).await;
        let status = json["data"]["status"].as_str().unwrap_or_default().to_string();
        if status == "Finished" || status == "Finished - Error" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("run did not finish");
}
