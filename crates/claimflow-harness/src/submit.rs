//! Batch submission of generated claims through a portal client, with
//! bounded concurrency and the adaptive backoff of [`BackoffPolicy`].
//!
//! All bookkeeping (tracker writes, the failure streak, delays) happens on
//! the single driving task; the only concurrency is the bounded set of
//! in-flight client calls multiplexed on the event loop. Mid-stream
//! cancellation is not supported: a run ends when the claim stream is
//! exhausted or the consecutive-failure budget trips.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};

use crate::backoff::{BackoffPolicy, Outcome, DEFAULT_BASE_DELAY};
use crate::error::HarnessError;
use crate::records::ClaimRecord;
use crate::tracker::{ClaimState, ClaimStateTracker};

/// What the portal returns for an accepted claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Case id assigned by the case-management system.
    pub case_id: String,
}

/// The external portal submission client. Timeouts are its business, not
/// the submitter's.
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn submit(&self, claim: &ClaimRecord) -> Result<SubmissionReceipt, HarnessError>;
}

#[derive(Debug, Clone)]
pub struct SubmitterConfig {
    /// Maximum in-flight submissions.
    pub concurrency: usize,
    /// Base delay unit the backoff tiers multiply.
    pub base_delay: Duration,
    /// Consecutive failures tolerated before the run is aborted.
    pub failure_budget: usize,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            base_delay: DEFAULT_BASE_DELAY,
            failure_budget: 3,
        }
    }
}

/// Counts of what a completed run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitterReport {
    pub submitted: usize,
    pub failed: usize,
    pub skipped: usize,
}

pub struct Submitter<C> {
    client: Arc<C>,
    config: SubmitterConfig,
}

impl<C> Submitter<C>
where
    C: SubmissionClient + 'static,
{
    pub fn new(client: C, config: SubmitterConfig) -> Self {
        Self {
            client: Arc::new(client),
            config,
        }
    }

    /// Push every claim from `claims` through the client.
    ///
    /// Per-claim behavior, in order:
    /// - a claim the tracker already records as submitted is skipped without
    ///   a client call;
    /// - every outcome is recorded into the tracker before anything else;
    /// - the post-submission callback runs only on success, and a callback
    ///   error is recorded into the tracker rather than propagated;
    /// - a failed submission does not abort the stream, but once
    ///   `failure_budget` failures accumulate with no intervening success
    ///   the run stops with [`HarnessError::ConsecutiveFailures`].
    pub async fn run<S, T, F, Fut>(
        &self,
        claims: S,
        tracker: &mut T,
        mut on_submitted: F,
    ) -> Result<SubmitterReport, HarnessError>
    where
        S: Stream<Item = ClaimRecord> + Send,
        T: ClaimStateTracker,
        F: FnMut(ClaimRecord, SubmissionReceipt) -> Fut,
        Fut: Future<Output = Result<(), HarnessError>>,
    {
        let mut policy = BackoffPolicy::new(self.config.base_delay);
        let mut report = SubmitterReport::default();
        let mut in_flight = FuturesUnordered::new();
        let mut exhausted = false;

        futures::pin_mut!(claims);

        loop {
            while !exhausted && in_flight.len() < self.config.concurrency {
                match claims.next().await {
                    Some(claim) => {
                        if tracker.get(&claim.claim_id).is_some_and(|s| s.submitted) {
                            tracing::debug!(claim_id = %claim.claim_id, "already submitted; skipping");
                            report.skipped += 1;
                            continue;
                        }
                        let client = Arc::clone(&self.client);
                        in_flight.push(async move {
                            let result = client.submit(&claim).await;
                            (claim, result)
                        });
                    }
                    None => exhausted = true,
                }
            }

            let Some((claim, result)) = in_flight.next().await else {
                break;
            };

            match result {
                Ok(receipt) => {
                    policy.record(Outcome::Success);
                    let mut state = ClaimState::submitted(&claim.claim_id, &receipt.case_id);
                    tracker.set(state.clone())?;
                    report.submitted += 1;
                    tracing::info!(claim_id = %claim.claim_id, case_id = %receipt.case_id, "claim submitted");
                    if let Err(err) = on_submitted(claim.clone(), receipt).await {
                        tracing::warn!(claim_id = %claim.claim_id, error = %err, "post-submission callback failed");
                        state.error = Some(err.to_string());
                        tracker.set(state)?;
                    }
                }
                Err(err) => {
                    policy.record(Outcome::Failure);
                    let streak = policy.consecutive_failures();
                    tracing::warn!(claim_id = %claim.claim_id, error = %err, streak, "submission failed");
                    tracker.set(ClaimState::failed(&claim.claim_id, &err.to_string()))?;
                    report.failed += 1;
                    if streak >= self.config.failure_budget {
                        return Err(HarnessError::ConsecutiveFailures { count: streak });
                    }
                }
            }

            let delay = policy.delay();
            if !delay.is_zero() {
                tracing::debug!(?delay, "backing off before next submission");
                tokio::time::sleep(delay).await;
            }
        }

        tracing::info!(
            submitted = report.submitted,
            failed = report.failed,
            skipped = report.skipped,
            "submission run complete"
        );
        Ok(report)
    }
}
