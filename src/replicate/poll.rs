//! Bounded polling of an asynchronous prediction.
//!
//! The job moves `Pending -> Succeeded | Failed | TimedOut`. Each attempt
//! sleeps for the policy interval, then runs one status query bounded by the
//! policy's query timeout. Query errors and timeouts are treated as transient
//! and only consume the attempt, so a job settles within
//! `max_attempts * (interval + query_timeout)`.
use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};

pub const MAX_ATTEMPTS: u32 = 30;
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
    /// Upper bound on a single status query.
    pub query_timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            max_attempts: MAX_ATTEMPTS,
            interval: POLL_INTERVAL,
            query_timeout: QUERY_TIMEOUT,
        }
    }
}

/// Prediction resource as returned by both the create and the status call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub output: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Succeeded(String),
    Failed,
    TimedOut,
}

impl JobState {
    /// Transition after attempt number `attempt` (1-based) observed
    /// `prediction`, or nothing usable when the query failed.
    pub fn observe(attempt: u32, policy: &PollPolicy, prediction: Option<&Prediction>) -> JobState {
        if let Some(p) = prediction {
            match p.status.as_str() {
                "succeeded" => {
                    if let Some(url) = p.output.as_ref().and_then(first_output_url) {
                        return JobState::Succeeded(url);
                    }
                }
                "failed" => return JobState::Failed,
                _ => {}
            }
        }
        if attempt >= policy.max_attempts {
            JobState::TimedOut
        } else {
            JobState::Pending
        }
    }
}

/// A single URL, or the first element of a list of URLs.
pub fn first_output_url(output: &Value) -> Option<String> {
    let candidate = match output {
        Value::String(s) => Some(s.as_str()),
        Value::Array(items) => items.first().and_then(Value::as_str),
        _ => None,
    };
    candidate
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Drive `query` until the job settles. `query` receives the 1-based attempt
/// number.
pub async fn poll_until_done<F, Fut>(policy: PollPolicy, mut query: F) -> AppResult<String>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AppResult<Prediction>>,
{
    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval).await;

        let observed = match tokio::time::timeout(policy.query_timeout, query(attempt)).await {
            Ok(Ok(prediction)) => {
                tracing::debug!(attempt, status = %prediction.status, "Polled prediction");
                Some(prediction)
            }
            Ok(Err(e)) => {
                tracing::warn!(attempt, "Status query failed, still pending: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!(attempt, "Status query timed out, still pending");
                None
            }
        };

        match JobState::observe(attempt, &policy, observed.as_ref()) {
            JobState::Pending => continue,
            JobState::Succeeded(url) => {
                tracing::info!(attempt, "Image generation succeeded");
                return Ok(url);
            }
            JobState::Failed => {
                tracing::error!(attempt, "Image generation failed");
                return Err(AppError::GenerationFailed);
            }
            JobState::TimedOut => break,
        }
    }
    tracing::error!(max_attempts = policy.max_attempts, "Image generation timed out");
    Err(AppError::Timeout)
}
