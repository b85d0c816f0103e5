//! Read (OCR) job orchestration
//!
//! Submitting → Polling → Succeeded | Failed | TimedOut
//!
//! Polling is strictly sequential: wait `interval`, check status once, then
//! decide. `succeeded` and `failed` stop the loop immediately. Any other status
//! consumes one attempt. A failed status check aborts without retry.

use axum::body::Bytes;
use tracing::{debug, info, warn};
use vb_common::config::PollPolicy;

use super::vision_client::{OperationLocation, ProviderJson, VisionClient, VisionError};
use crate::models::{OperationStatus, ReadOperation};

/// Terminal success of a read job
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    /// Typed view of the final status document
    pub operation: ReadOperation,
    /// Final status document exactly as the provider sent it
    pub payload: ProviderJson,
    /// Status checks performed, including the successful one
    pub attempts: u32,
}

/// Runs one read job to a terminal state
pub struct ReadPoller<'a> {
    client: &'a VisionClient,
    policy: PollPolicy,
}

impl<'a> ReadPoller<'a> {
    pub fn new(client: &'a VisionClient, policy: PollPolicy) -> Self {
        Self { client, policy }
    }

    /// Submit `image` and poll until the job finishes or the budget runs out
    pub async fn run(&self, image: Bytes) -> Result<ReadOutcome, VisionError> {
        let location = self.client.submit_read(image).await?;
        info!(operation = %location, "Read operation submitted");
        self.poll(&location).await
    }

    /// Poll an already-submitted job
    pub async fn poll(&self, location: &OperationLocation) -> Result<ReadOutcome, VisionError> {
        for attempt in 1..=self.policy.max_attempts {
            tokio::time::sleep(self.policy.interval).await;

            let status = self.client.read_status(location).await?;
            if !status.operation.status.is_terminal() {
                debug!(attempt, status = ?status.operation.status, "Read operation pending");
                continue;
            }

            if status.operation.status == OperationStatus::Failed {
                warn!(attempts = attempt, error = ?status.operation.error, "Read operation failed");
                return Err(VisionError::OperationFailed {
                    detail: status.operation.error,
                });
            }

            info!(
                attempts = attempt,
                lines = status.operation.lines().len(),
                "Read operation succeeded"
            );
            return Ok(ReadOutcome {
                operation: status.operation,
                payload: status.payload,
                attempts: attempt,
            });
        }

        warn!(
            attempts = self.policy.max_attempts,
            interval_ms = self.policy.interval.as_millis() as u64,
            "Read operation timed out"
        );
        Err(VisionError::TimedOut {
            attempts: self.policy.max_attempts,
            interval: self.policy.interval,
        })
    }
}
