use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Directory holding inventories and playbooks (default: `./playbooks`).
    pub playbook_dir: PathBuf,
    /// Verbose logging (default: `false`).
    pub debug: bool,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Command line used to invoke ansible-playbook, split on whitespace.
    pub ansible_command: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `5000`                     |
    /// | `PLAYBOOK_DIR`         | `./playbooks`              |
    /// | `DEBUG`                | `false`                    |
    /// | `CORS_ORIGINS`         | `http://localhost:5000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `ANSIBLE_PLAYBOOK_BIN` | `ansible-playbook`         |
    ///
    /// Panics on unparsable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let playbook_dir = std::env::var("PLAYBOOK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./playbooks"));

        let debug = std::env::var("DEBUG")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5000".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let ansible_command =
            std::env::var("ANSIBLE_PLAYBOOK_BIN").unwrap_or_else(|_| "ansible-playbook".into());

        Self {
            host,
            port,
            playbook_dir,
            debug,
            cors_origins,
            request_timeout_secs,
            ansible_command,
        }
    }

    /// Default tracing filter when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "runbook_api=debug,runbook_ansible=debug,runbook_events=debug,tower_http=debug"
        } else {
            "runbook_api=info,runbook_ansible=info,tower_http=info"
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
