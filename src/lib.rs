//! Vigil - dynamic analysis review orchestrator
//!
//! Vigil reconciles an asynchronous remote dynamic security scan with the
//! CI build that triggered it: it polls the analysis service until the
//! submitted scan finishes and is linked to a build, parses the detailed
//! findings report, and computes trend-aware per-severity deltas against
//! the build history.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture
//! principles:
//!
//! - **Domain Layer** (`domain`): Pure data models, ports, and errors
//! - **Service Layer** (`services`): The polling state machine, report
//!   parser, and history reconciler
//! - **Infrastructure Layer** (`infrastructure`): REST client, history
//!   store, configuration, logging
//! - **CLI Layer** (`cli`): Command-line interface

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ReviewError, ReviewResult};
pub use domain::models::{
    Config, FindingCounts, Phase, RawFacts, ScanRecord, Severity, TrendWindow,
};
pub use domain::ports::{
    AnalysisServiceClient, BuildHistoryProvider, BuildRef, ServiceError, VersionInfoProvider,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ReviewOutcome, ReviewRequest, ReviewService};
