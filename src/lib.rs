//! # Claimflow
//!
//! A claim application flow engine plus an end-to-end claim generation and
//! submission harness.
//!
//! The workspace is organized into feature-gated modules:
//!
//! - Core flow-engine functionality is always included
//! - `harness`: synthetic claim generation, DOR file writers, and the
//!   backoff-controlled batch submitter used for E2E testing
//! - `full`: enables all features
//!
//! ## Usage
//!
//! Add the crate to your dependencies with the features you need:
//!
//! ```toml
//! [dependencies]
//! claimflow = { version = "0.3", features = ["harness"] }
//! ```

/// Initialize the framework with default settings.
///
/// This sets up tracing for better logging and performs any necessary
/// initialization for the enabled features.
pub fn init() {
    tracing_subscriber::fmt::init();
}

// Re-export the core module (always included)
pub use claimflow_core as core;

// Re-export the E2E harness module
#[cfg(feature = "harness")]
pub use claimflow_harness as harness;

// Convenience re-exports for common types
pub use claimflow_core::{
    FlowContext, FlowError, FlowGraph, FlowGraphBuilder, Route, Step, StepStatus, Transition,
};

#[cfg(feature = "harness")]
pub use claimflow_harness::{
    BackoffPolicy, ClaimStateTracker, HarnessError, SubmissionClient, Submitter,
};
