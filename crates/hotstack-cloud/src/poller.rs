//! Deadline-bound status polling
//!
//! A poll runs against the monotonic clock: the first query is always issued, later
//! queries only while the deadline has not passed, and sleeps are clamped so the loop
//! never oversleeps the deadline.

use crate::error::{CloudError, Result};
use crate::provider::StatusQuery;
use crate::resource::ResourceId;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Description of one polling operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRequest {
    resource: ResourceId,
    accepted_states: Vec<String>,
    timeout: Duration,
    poll_interval: Duration,
}

impl PollRequest {
    pub fn new<I, S>(
        resource: ResourceId,
        accepted_states: I,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let accepted_states: Vec<String> = accepted_states.into_iter().map(Into::into).collect();

        if accepted_states.is_empty() {
            return Err(CloudError::InvalidConfig(format!(
                "no accepted states given for {}",
                resource
            )));
        }
        if poll_interval.is_zero() {
            return Err(CloudError::InvalidConfig(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            resource,
            accepted_states,
            timeout,
            poll_interval,
        })
    }

    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    pub fn accepted_states(&self) -> &[String] {
        &self.accepted_states
    }

    /// Exact, case-sensitive membership test
    pub fn accepts(&self, state: &str) -> bool {
        self.accepted_states.iter().any(|s| s == state)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

/// How a poll ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Reached,
    TimedOut,
    QueryFailed,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Reached => write!(f, "reached"),
            Disposition::TimedOut => write!(f, "timed out"),
            Disposition::QueryFailed => write!(f, "query failed"),
        }
    }
}

/// Result of one polling operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    disposition: Disposition,
    state: Option<String>,
    elapsed: Duration,
    detail: Option<String>,
}

impl PollOutcome {
    fn reached(state: String, elapsed: Duration) -> Self {
        Self {
            disposition: Disposition::Reached,
            state: Some(state),
            elapsed,
            detail: None,
        }
    }

    fn timed_out(timeout: Duration, elapsed: Duration) -> Self {
        Self {
            disposition: Disposition::TimedOut,
            state: None,
            elapsed,
            detail: Some(format!("Timeout after {} seconds", timeout.as_secs())),
        }
    }

    fn query_failed(error: CloudError, elapsed: Duration) -> Self {
        Self {
            disposition: Disposition::QueryFailed,
            state: None,
            elapsed,
            detail: Some(error.to_string()),
        }
    }

    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    pub fn is_reached(&self) -> bool {
        self.disposition == Disposition::Reached
    }

    /// Matched state, present only when reached
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed wall-clock time in whole seconds
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.as_secs()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// One-line summary naming the resource, the disposition and the elapsed time
    pub fn summary(&self, resource: &ResourceId) -> String {
        match (&self.state, &self.detail) {
            (Some(state), _) => format!(
                "{} {} '{}' after {} seconds",
                resource,
                self.disposition,
                state,
                self.elapsed_secs()
            ),
            (None, Some(detail)) => format!(
                "{} {} after {} seconds: {}",
                resource,
                self.disposition,
                self.elapsed_secs(),
                detail
            ),
            (None, None) => format!(
                "{} {} after {} seconds",
                resource,
                self.disposition,
                self.elapsed_secs()
            ),
        }
    }

    /// Convert into the matched state, or the corresponding error
    pub fn into_result(self, resource: &ResourceId) -> Result<String> {
        let elapsed_secs = self.elapsed_secs();
        match self.disposition {
            Disposition::Reached => Ok(self.state.unwrap_or_default()),
            Disposition::TimedOut => Err(CloudError::TimedOut {
                resource: resource.to_string(),
                elapsed_secs,
                last_status: "unknown".to_string(),
            }),
            Disposition::QueryFailed => Err(CloudError::query_failed(
                resource,
                self.detail.unwrap_or_default(),
            )),
        }
    }
}

/// Deadline on the monotonic clock
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    timeout: Duration,
}

impl Deadline {
    pub fn start(timeout: Duration) -> Self {
        Self {
            start: Instant::now(),
            timeout,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed() >= self.timeout
    }

    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.elapsed())
    }

    /// Sleep for `interval`, clamped to the remaining time.
    ///
    /// Returns `false` without sleeping when no time remains.
    pub async fn pause(&self, interval: Duration) -> bool {
        let remaining = self.remaining();
        if remaining.is_zero() {
            return false;
        }
        sleep(interval.min(remaining)).await;
        true
    }
}

/// Result of a single probe inside [`poll_until`]
pub(crate) enum Attempt<T> {
    Done(T),
    /// Not there yet; carries the observed status for reporting
    Pending(String),
}

pub(crate) enum Polled<T> {
    Done {
        value: T,
        elapsed: Duration,
    },
    TimedOut {
        elapsed: Duration,
        last: Option<String>,
    },
    Failed {
        error: CloudError,
        elapsed: Duration,
    },
}

/// Drive `probe` until it finishes, fails, or the deadline passes.
///
/// The first probe is issued even for a zero timeout.
pub(crate) async fn poll_until<T, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Polled<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Attempt<T>>>,
{
    let deadline = Deadline::start(timeout);
    let mut attempts: u32 = 0;
    let mut last = None;

    loop {
        if attempts > 0 && deadline.is_expired() {
            return Polled::TimedOut {
                elapsed: deadline.elapsed(),
                last,
            };
        }
        attempts += 1;

        match probe().await {
            Ok(Attempt::Done(value)) => {
                return Polled::Done {
                    value,
                    elapsed: deadline.elapsed(),
                };
            }
            Ok(Attempt::Pending(observed)) => {
                tracing::debug!("Attempt {}: status is {}", attempts, observed);
                last = Some(observed);
            }
            Err(error) => {
                return Polled::Failed {
                    error,
                    elapsed: deadline.elapsed(),
                };
            }
        }

        if !deadline.pause(interval).await {
            return Polled::TimedOut {
                elapsed: deadline.elapsed(),
                last,
            };
        }
    }
}

/// Poll `query` until the resource reaches one of the accepted states.
///
/// Query errors end the poll immediately as [`Disposition::QueryFailed`].
pub async fn wait_for_state<Q>(query: &Q, request: &PollRequest) -> PollOutcome
where
    Q: StatusQuery + ?Sized,
{
    let resource = request.resource();
    tracing::info!(
        "Waiting up to {}s for {} to reach one of [{}]",
        request.timeout().as_secs(),
        resource,
        request.accepted_states().join(", ")
    );

    let polled = poll_until(request.timeout(), request.poll_interval(), move || async move {
        let state = query.query(resource).await?;
        if request.accepts(&state) {
            Ok(Attempt::Done(state))
        } else {
            Ok(Attempt::Pending(state))
        }
    })
    .await;

    let outcome = match polled {
        Polled::Done { value, elapsed } => PollOutcome::reached(value, elapsed),
        Polled::TimedOut { elapsed, .. } => PollOutcome::timed_out(request.timeout(), elapsed),
        Polled::Failed { error, elapsed } => PollOutcome::query_failed(error, elapsed),
    };

    tracing::info!("{}", outcome.summary(resource));
    outcome
}
