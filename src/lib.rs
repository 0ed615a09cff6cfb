//! Concurrent sensitive-path exposure scanner.
//!
//! Probes a target host for well-known sensitive locations (admin panels,
//! backups, VCS metadata, config files) and reports the reachable ones.

pub mod function;
