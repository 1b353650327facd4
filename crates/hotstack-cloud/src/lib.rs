//! HotStack cloud resource orchestration
//!
//! This crate drives external infrastructure toward a terminal condition under a deadline:
//!
//! - **Status poller**: queries a single resource's state until it is one of an accepted
//!   set, the query fails, or the deadline passes ([`wait_for_state`]).
//! - **Stack lifecycle**: idempotent create-or-replace of an orchestration stack, wait for
//!   completion, verification of every constituent, output extraction and guaranteed
//!   cleanup ([`StackLifecycle`]).
//!
//! The transports are abstracted behind [`StatusQuery`] and [`OrchestrationClient`]; see
//! `hotstack-openstack` for the CLI-backed implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                hotstack CLI                   │
//! │   (wait-bmh / smoke-test / cleanup)           │
//! └───────────────┬──────────────────────────────┘
//!                 │
//! ┌───────────────▼──────────────────────────────┐
//! │              hotstack-cloud                   │
//! │  ┌────────────┐        ┌──────────────────┐  │
//! │  │  Poller    │◄───────│  StackLifecycle  │  │
//! │  └─────┬──────┘        └────────┬─────────┘  │
//! │        │ StatusQuery            │ OrchestrationClient
//! └────────┼────────────────────────┼────────────┘
//!          │                        │
//! ┌────────▼────────────────────────▼────────────┐
//! │            hotstack-openstack                 │
//! │   oc (BareMetalHost)   openstack (Heat)       │
//! └──────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod lifecycle;
pub mod poller;
pub mod provider;
pub mod resource;

// Re-exports
pub use error::{CloudError, Result};
pub use lifecycle::{
    CREATE_FAILURE_STATUSES, CleanupOutcome, ConnectivityConfig, Deployment, LifecycleConfig,
    ProbeReport, RunReport, StackLifecycle, Verification,
};
pub use poller::{Deadline, Disposition, PollOutcome, PollRequest, wait_for_state};
pub use provider::{ConnectivityProbe, OrchestrationClient, StatusQuery};
pub use resource::{
    ResourceId, StackHandle, StackOutputs, StackSpec, SubResourceStatus, status,
};
