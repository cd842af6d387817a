//! Domain types shared by the runbook crates.
//!
//! Holds the error taxonomy, the progress severity and log entry types,
//! the well-known run status labels, the path resolver that keeps file
//! access inside the playbook directory, and inventory/playbook discovery.

pub mod error;
pub mod listing;
pub mod paths;
pub mod run_status;
pub mod types;
