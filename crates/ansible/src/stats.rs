//! Per-host result counters collected during a run.

use std::collections::BTreeMap;

use serde::Serialize;

/// Counters for one host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HostStats {
    /// Successful task results, changed or not.
    pub ok: u32,
    pub changed: u32,
    pub failures: u32,
    pub unreachable: u32,
    pub skipped: u32,
}

/// Counters for every host touched by a run, keyed by host name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    hosts: BTreeMap<String, HostStats>,
}

impl AggregateStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_ok(&mut self, host: &str, changed: bool) {
        let entry = self.entry(host);
        entry.ok += 1;
        if changed {
            entry.changed += 1;
        }
    }

    pub fn record_failure(&mut self, host: &str) {
        self.entry(host).failures += 1;
    }

    pub fn record_unreachable(&mut self, host: &str) {
        self.entry(host).unreachable += 1;
    }

    pub fn record_skipped(&mut self, host: &str) {
        self.entry(host).skipped += 1;
    }

    pub fn host(&self, host: &str) -> Option<&HostStats> {
        self.hosts.get(host)
    }

    /// Hosts in name order.
    pub fn hosts(&self) -> impl Iterator<Item = (&str, &HostStats)> {
        self.hosts.iter().map(|(name, stats)| (name.as_str(), stats))
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Whether any host failed or was unreachable.
    pub fn has_failures(&self) -> bool {
        self.hosts
            .values()
            .any(|s| s.failures > 0 || s.unreachable > 0)
    }

    fn entry(&mut self, host: &str) -> &mut HostStats {
        self.hosts.entry(host.to_string()).or_default()
    }
}
