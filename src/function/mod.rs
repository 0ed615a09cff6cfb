pub mod advisor;
pub mod catalog;
pub mod config;
pub mod error;
pub mod listing;
pub mod probe;
pub mod render;
pub mod report;
pub mod scanner;

pub use self::config::{Config, ScanRequest};
pub use self::error::ScanError;
pub use self::probe::{HttpProber, ProbeOutcome, ProbeRequest, Prober};
pub use self::report::{Finding, FindingStatus, ScanResult};
pub use self::scanner::{ScanOptions, ScanStrategy, run_scan, scan};
