//! Collaborator traits for status sources and orchestration services

use crate::error::Result;
use crate::resource::{ResourceId, StackHandle, StackOutputs, StackSpec, SubResourceStatus};
use async_trait::async_trait;

/// Source of the current discrete state of a single resource
///
/// Implementations wrap whatever transport reaches the resource (a CLI, an API client).
/// An `Err` means the state could not be determined at all; the poller does not retry it.
#[async_trait]
pub trait StatusQuery: Send + Sync {
    async fn query(&self, resource: &ResourceId) -> Result<String>;
}

/// Orchestration service able to manage named stacks
///
/// Every call is a single synchronous request; none of them wait for completion.
#[async_trait]
pub trait OrchestrationClient: Send + Sync {
    /// Look up a live stack by name
    async fn find(&self, name: &str) -> Result<Option<StackHandle>>;

    /// Submit a create request; returns once the service has accepted it
    async fn create(&self, spec: &StackSpec) -> Result<StackHandle>;

    /// Submit a delete request for the named stack
    async fn delete(&self, name: &str) -> Result<()>;

    /// Re-read the composite status of a stack
    async fn get_status(&self, handle: &StackHandle) -> Result<StackHandle>;

    async fn list_sub_resources(&self, handle: &StackHandle) -> Result<Vec<SubResourceStatus>>;

    async fn get_outputs(&self, handle: &StackHandle) -> Result<StackOutputs>;
}

/// Network reachability check against an address taken from stack outputs
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Single attempt; `Ok(false)` means unreachable for now
    async fn probe(&self, address: &str) -> Result<bool>;
}
