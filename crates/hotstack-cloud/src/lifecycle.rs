//! Stack lifecycle orchestration
//!
//! A run goes through create-or-replace, wait for completion, verification of every
//! constituent, output extraction, optional connectivity checks and finally cleanup.
//! Cleanup runs exactly once per run, whatever happened before it, unless the caller asked
//! to keep the stack.

use crate::error::{CloudError, Result};
use crate::poller::{Attempt, Polled, poll_until};
use crate::provider::{ConnectivityProbe, OrchestrationClient};
use crate::resource::{StackHandle, StackOutputs, StackSpec, SubResourceStatus, status};
use std::fmt;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Composite statuses that end a create wait as failed
pub const CREATE_FAILURE_STATUSES: &[&str] =
    &[status::CREATE_FAILED, "ROLLBACK_COMPLETE", "ROLLBACK_FAILED"];

/// Timing and behavior of a lifecycle run
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Budget for a stack to reach `CREATE_COMPLETE`
    pub create_timeout: Duration,

    /// Budget for a stack to disappear after a delete request
    pub delete_timeout: Duration,

    /// Interval between composite status queries
    pub poll_interval: Duration,

    /// Connectivity checks after verification; `None` skips them
    pub connectivity: Option<ConnectivityConfig>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            create_timeout: Duration::from_secs(600),
            delete_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(5),
            connectivity: Some(ConnectivityConfig::default()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectivityConfig {
    /// Delay before the first probe, to let instances boot
    pub boot_wait: Duration,

    /// Budget per probed address
    pub timeout: Duration,

    pub interval: Duration,

    /// Output keys holding the addresses to probe
    pub output_keys: Vec<String>,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            boot_wait: Duration::from_secs(30),
            timeout: Duration::from_secs(60),
            interval: Duration::from_secs(2),
            output_keys: vec![
                "instance1_floating_ip".to_string(),
                "instance2_floating_ip".to_string(),
            ],
        }
    }
}

/// What happened when tearing a stack down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// Caller asked to keep the stack
    Retained,
    Deleted { elapsed_secs: u64 },
    /// Nothing to delete
    AlreadyAbsent,
    Failed { detail: String },
    TimedOut { elapsed_secs: u64 },
}

impl CleanupOutcome {
    /// True when no stack was left behind unintentionally
    pub fn is_clean(&self) -> bool {
        matches!(
            self,
            CleanupOutcome::Retained | CleanupOutcome::Deleted { .. } | CleanupOutcome::AlreadyAbsent
        )
    }
}

impl fmt::Display for CleanupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupOutcome::Retained => write!(f, "kept"),
            CleanupOutcome::Deleted { elapsed_secs } => {
                write!(f, "deleted after {} seconds", elapsed_secs)
            }
            CleanupOutcome::AlreadyAbsent => write!(f, "not found"),
            CleanupOutcome::Failed { detail } => write!(f, "deletion failed: {}", detail),
            CleanupOutcome::TimedOut { elapsed_secs } => {
                write!(f, "deletion timed out after {} seconds", elapsed_secs)
            }
        }
    }
}

/// Snapshot of every constituent of a verified stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub stack: String,
    pub resources: Vec<SubResourceStatus>,
}

/// Result of probing one address from the stack outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub output: String,
    pub address: String,
    pub reachable: bool,
    pub elapsed_secs: u64,
    pub detail: Option<String>,
}

/// Everything learned about a stack that was created and verified
#[derive(Debug, Clone)]
pub struct Deployment {
    pub handle: StackHandle,
    pub verification: Verification,
    pub outputs: StackOutputs,
    pub connectivity: Vec<ProbeReport>,
}

/// Outcome of a full lifecycle run
///
/// The verdict lives in `outcome`; `cleanup` is secondary and never changes it.
#[derive(Debug)]
pub struct RunReport {
    pub stack: String,
    /// A stack was deleted or a create request was accepted
    pub changed: bool,
    pub outcome: Result<Deployment>,
    pub cleanup: CleanupOutcome,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_result(self) -> Result<Deployment> {
        self.outcome
    }

    pub fn summary(&self) -> String {
        let verdict = match &self.outcome {
            Ok(_) => "succeeded".to_string(),
            Err(e) => format!("failed: {}", e),
        };
        format!(
            "Stack '{}' {} after {} seconds (cleanup: {})",
            self.stack,
            verdict,
            self.elapsed.as_secs(),
            self.cleanup
        )
    }
}

/// Drives one stack through its lifecycle against an orchestration client
pub struct StackLifecycle<'a, C: ?Sized> {
    client: &'a C,
    config: LifecycleConfig,
    probe: Option<&'a dyn ConnectivityProbe>,
}

impl<'a, C> StackLifecycle<'a, C>
where
    C: OrchestrationClient + ?Sized,
{
    pub fn new(client: &'a C, config: LifecycleConfig) -> Self {
        Self {
            client,
            config,
            probe: None,
        }
    }

    pub fn with_probe(mut self, probe: &'a dyn ConnectivityProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Create the stack, deleting a same-named one first, and wait for completion.
    ///
    /// Replacement waits on the delete budget; creation waits on `timeout`. A failure
    /// status or an expired wait is returned as an error.
    pub async fn create_or_replace(
        &self,
        spec: &StackSpec,
        timeout: Duration,
    ) -> Result<StackHandle> {
        self.replace_and_create(spec, timeout, &mut false).await
    }

    async fn replace_and_create(
        &self,
        spec: &StackSpec,
        timeout: Duration,
        changed: &mut bool,
    ) -> Result<StackHandle> {
        if let Some(existing) = self.client.find(&spec.name).await? {
            tracing::info!(
                "Stack '{}' already exists ({}, {}), deleting first",
                spec.name,
                existing.id,
                existing.status
            );
            if let CleanupOutcome::Deleted { .. } = self.delete_and_wait(&spec.name).await? {
                *changed = true;
            }
        }

        tracing::info!("Creating stack '{}'", spec.name);
        let handle = self.client.create(spec).await?;
        *changed = true;
        tracing::debug!("Create accepted: {} ({})", handle.name, handle.id);

        let client = self.client;
        let submitted = &handle;
        let polled = poll_until(timeout, self.config.poll_interval, move || async move {
            let current = client.get_status(submitted).await?;
            if current.status == status::CREATE_COMPLETE {
                Ok(Attempt::Done(current))
            } else if CREATE_FAILURE_STATUSES.contains(&current.status.as_str()) {
                Err(CloudError::ResourceFailed {
                    resource: format!("stack '{}'", current.name),
                    reason: current.reason().to_string(),
                    status: current.status,
                })
            } else {
                Ok(Attempt::Pending(current.status))
            }
        })
        .await;

        match polled {
            Polled::Done { value, elapsed } => {
                tracing::info!(
                    "Stack '{}' created in {} seconds",
                    spec.name,
                    elapsed.as_secs()
                );
                Ok(value)
            }
            Polled::TimedOut { elapsed, last } => Err(CloudError::TimedOut {
                resource: format!("stack '{}'", spec.name),
                elapsed_secs: elapsed.as_secs(),
                last_status: last.unwrap_or_else(|| handle.status.clone()),
            }),
            Polled::Failed { error, .. } => Err(error),
        }
    }

    /// Check every constituent of the stack once.
    ///
    /// Fails with [`CloudError::VerificationFailed`] listing every constituent that is not
    /// `CREATE_COMPLETE`.
    pub async fn verify(&self, handle: &StackHandle) -> Result<Verification> {
        tracing::info!("Verifying resources of stack '{}'", handle.name);
        let resources = self.client.list_sub_resources(handle).await?;

        let failed: Vec<SubResourceStatus> = resources
            .iter()
            .filter(|r| !r.is_complete())
            .cloned()
            .collect();

        if !failed.is_empty() {
            for resource in &failed {
                tracing::error!("  - {}: {}", resource.name, resource.status);
            }
            return Err(CloudError::VerificationFailed {
                stack: handle.name.clone(),
                total: resources.len(),
                failed,
            });
        }

        tracing::info!(
            "All {} stack resources created successfully",
            resources.len()
        );
        Ok(Verification {
            stack: handle.name.clone(),
            resources,
        })
    }

    pub async fn outputs(&self, handle: &StackHandle) -> Result<StackOutputs> {
        self.client.get_outputs(handle).await
    }

    /// Probe each configured output address until reachable or its budget runs out.
    ///
    /// Unreachable addresses are reported, never raised.
    pub async fn check_connectivity(&self, outputs: &StackOutputs) -> Vec<ProbeReport> {
        let (Some(config), Some(probe)) = (&self.config.connectivity, self.probe) else {
            return Vec::new();
        };

        let targets: Vec<(&String, &str)> = config
            .output_keys
            .iter()
            .filter_map(|key| {
                outputs
                    .get(key)
                    .and_then(|v| v.as_str())
                    .map(|address| (key, address))
            })
            .collect();

        if targets.is_empty() {
            tracing::debug!("No probe targets found in stack outputs");
            return Vec::new();
        }

        tracing::info!(
            "Waiting {} seconds for instances to boot",
            config.boot_wait.as_secs()
        );
        sleep(config.boot_wait).await;

        let mut reports = Vec::with_capacity(targets.len());
        for (key, address) in targets {
            tracing::info!("Testing connectivity to {} ({})", address, key);

            let polled = poll_until(config.timeout, config.interval, move || async move {
                if probe.probe(address).await? {
                    Ok(Attempt::Done(()))
                } else {
                    Ok(Attempt::Pending("unreachable".to_string()))
                }
            })
            .await;

            let report = match polled {
                Polled::Done { elapsed, .. } => ProbeReport {
                    output: key.clone(),
                    address: address.to_string(),
                    reachable: true,
                    elapsed_secs: elapsed.as_secs(),
                    detail: None,
                },
                Polled::TimedOut { elapsed, .. } => ProbeReport {
                    output: key.clone(),
                    address: address.to_string(),
                    reachable: false,
                    elapsed_secs: elapsed.as_secs(),
                    detail: Some(format!(
                        "no response after {} seconds",
                        config.timeout.as_secs()
                    )),
                },
                Polled::Failed { error, elapsed } => ProbeReport {
                    output: key.clone(),
                    address: address.to_string(),
                    reachable: false,
                    elapsed_secs: elapsed.as_secs(),
                    detail: Some(error.to_string()),
                },
            };

            if !report.reachable {
                tracing::warn!(
                    "Failed to reach {}: {}",
                    report.address,
                    report.detail.as_deref().unwrap_or("unreachable")
                );
            }
            reports.push(report);
        }

        reports
    }

    /// Delete the named stack and wait until it is gone.
    ///
    /// Returns [`CleanupOutcome::Deleted`] or [`CleanupOutcome::AlreadyAbsent`]; a
    /// `DELETE_FAILED` status or an expired budget is an error.
    pub async fn delete_and_wait(&self, name: &str) -> Result<CleanupOutcome> {
        tracing::info!("Deleting stack '{}'", name);
        match self.client.delete(name).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::info!("Stack '{}' not found", name);
                return Ok(CleanupOutcome::AlreadyAbsent);
            }
            Err(e) => return Err(e),
        }

        let client = self.client;
        let polled = poll_until(
            self.config.delete_timeout,
            self.config.poll_interval,
            move || async move {
                match client.find(name).await {
                    Ok(None) => Ok(Attempt::Done(())),
                    Err(e) if e.is_not_found() => Ok(Attempt::Done(())),
                    Err(e) => Err(e),
                    Ok(Some(stack)) if stack.status == status::DELETE_COMPLETE => {
                        Ok(Attempt::Done(()))
                    }
                    Ok(Some(stack)) if stack.status == status::DELETE_FAILED => {
                        Err(CloudError::ResourceFailed {
                            resource: format!("stack '{}'", name),
                            reason: stack.reason().to_string(),
                            status: stack.status,
                        })
                    }
                    Ok(Some(stack)) => Ok(Attempt::Pending(stack.status)),
                }
            },
        )
        .await;

        match polled {
            Polled::Done { elapsed, .. } => {
                tracing::info!("Stack '{}' deleted successfully", name);
                Ok(CleanupOutcome::Deleted {
                    elapsed_secs: elapsed.as_secs(),
                })
            }
            Polled::TimedOut { elapsed, last } => Err(CloudError::TimedOut {
                resource: format!("stack '{}'", name),
                elapsed_secs: elapsed.as_secs(),
                last_status: last.unwrap_or_else(|| "unknown".to_string()),
            }),
            Polled::Failed { error, .. } => Err(error),
        }
    }

    /// Tear the stack down unless `keep` is set.
    ///
    /// Problems are logged and reported in the returned outcome, never raised.
    pub async fn cleanup(&self, name: &str, keep: bool) -> CleanupOutcome {
        if keep {
            tracing::info!("Stack '{}' kept", name);
            return CleanupOutcome::Retained;
        }

        match self.delete_and_wait(name).await {
            Ok(outcome) => outcome,
            Err(CloudError::TimedOut { elapsed_secs, .. }) => {
                tracing::warn!(
                    "Stack '{}' deletion timed out after {} seconds",
                    name,
                    elapsed_secs
                );
                CleanupOutcome::TimedOut { elapsed_secs }
            }
            Err(e) => {
                tracing::warn!("Stack '{}' deletion failed: {}", name, e);
                CleanupOutcome::Failed {
                    detail: e.to_string(),
                }
            }
        }
    }

    /// Create, verify, read outputs, probe connectivity, then clean up.
    pub async fn run(&self, spec: &StackSpec, keep: bool) -> RunReport {
        let started = Instant::now();

        let mut changed = false;
        let outcome = self.deploy(spec, &mut changed).await;
        if let Err(e) = &outcome {
            tracing::error!("Stack '{}' failed: {}", spec.name, e);
        }

        let cleanup = self.cleanup(&spec.name, keep).await;
        if let CleanupOutcome::Deleted { .. } = cleanup {
            changed = true;
        }

        RunReport {
            stack: spec.name.clone(),
            changed,
            outcome,
            cleanup,
            elapsed: started.elapsed(),
        }
    }

    async fn deploy(&self, spec: &StackSpec, changed: &mut bool) -> Result<Deployment> {
        let handle = self
            .replace_and_create(spec, self.config.create_timeout, changed)
            .await?;
        let verification = self.verify(&handle).await?;
        let outputs = self.outputs(&handle).await?;
        let connectivity = self.check_connectivity(&outputs).await;

        Ok(Deployment {
            handle,
            verification,
            outputs,
            connectivity,
        })
    }
}
