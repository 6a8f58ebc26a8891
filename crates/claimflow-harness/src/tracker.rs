//! Submission outcome tracking, keyed by claim id.
//!
//! The tracker is what makes harness runs idempotent: every submission
//! outcome (success or error) is recorded before anything else happens, and
//! a rerun skips claims already recorded as submitted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// One recorded submission outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimState {
    pub claim_id: String,
    /// Case id assigned by the case-management system, when submission
    /// succeeded.
    pub case_id: Option<String>,
    pub submitted: bool,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ClaimState {
    pub fn submitted(claim_id: &str, case_id: &str) -> Self {
        Self {
            claim_id: claim_id.to_string(),
            case_id: Some(case_id.to_string()),
            submitted: true,
            error: None,
            updated_at: Utc::now(),
        }
    }

    pub fn failed(claim_id: &str, error: &str) -> Self {
        Self {
            claim_id: claim_id.to_string(),
            case_id: None,
            submitted: false,
            error: Some(error.to_string()),
            updated_at: Utc::now(),
        }
    }
}

/// Interface the submitter uses to record and consult outcomes.
pub trait ClaimStateTracker: Send {
    fn has(&self, claim_id: &str) -> bool;
    fn get(&self, claim_id: &str) -> Option<&ClaimState>;
    fn set(&mut self, state: ClaimState) -> Result<(), HarnessError>;
}

/// In-memory tracker, mostly for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryTracker {
    states: HashMap<String, ClaimState>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl ClaimStateTracker for MemoryTracker {
    fn has(&self, claim_id: &str) -> bool {
        self.states.contains_key(claim_id)
    }

    fn get(&self, claim_id: &str) -> Option<&ClaimState> {
        self.states.get(claim_id)
    }

    fn set(&mut self, state: ClaimState) -> Result<(), HarnessError> {
        self.states.insert(state.claim_id.clone(), state);
        Ok(())
    }
}

/// Tracker persisted as a JSON object keyed by claim id.
///
/// State is flushed to disk on every `set` so an interrupted run loses at
/// most the in-flight claim.
#[derive(Debug)]
pub struct JsonFileTracker {
    path: PathBuf,
    states: HashMap<String, ClaimState>,
}

impl JsonFileTracker {
    /// Open the tracker file, loading prior state when the file exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let path = path.as_ref().to_path_buf();
        let states = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %path.display(), known = states.len(), "opened claim state tracker");
        Ok(Self { path, states })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn persist(&self) -> Result<(), HarnessError> {
        let bytes = serde_json::to_vec_pretty(&self.states)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl ClaimStateTracker for JsonFileTracker {
    fn has(&self, claim_id: &str) -> bool {
        self.states.contains_key(claim_id)
    }

    fn get(&self, claim_id: &str) -> Option<&ClaimState> {
        self.states.get(claim_id)
    }

    fn set(&mut self, state: ClaimState) -> Result<(), HarnessError> {
        self.states.insert(state.claim_id.clone(), state);
        self.persist()
    }
}
