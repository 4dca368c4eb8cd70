//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the trait interfaces that infrastructure adapters
//! must implement:
//! - `AnalysisServiceClient`: remote dynamic analysis service calls
//! - `BuildHistoryProvider`: read access to prior builds' scan records
//! - `VersionInfoProvider`: tool version string for the User-Agent
//!
//! These traits define the contracts that allow the domain to be
//! independent of specific infrastructure implementations.

pub mod analysis_client;
pub mod build_history;
pub mod version_info;

pub use analysis_client::{AnalysisServiceClient, ServiceError};
pub use build_history::{BuildHistoryProvider, BuildRef, MemoryHistory};
pub use version_info::{CrateVersion, VersionInfoProvider};
