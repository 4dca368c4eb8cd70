//! REST adapter for the analysis service.

pub mod client;

pub use client::RestAnalysisClient;
