//! OpenStack collaborators for HotStack
//!
//! Implements the `hotstack-cloud` collaborator traits on top of the
//! command-line clients an OpenStack/OpenShift operator already has configured.
//!
//! | Trait                 | Implementation        | Backend                         |
//! |-----------------------|-----------------------|---------------------------------|
//! | `OrchestrationClient` | [`HeatClient`]        | `openstack --os-cloud <cloud>`  |
//! | `StatusQuery`         | [`BareMetalHostQuery`]| `oc get baremetalhosts.metal3.io` |
//! | `ConnectivityProbe`   | [`PingProbe`]         | `ping -c 1 -W 2`                |
//!
//! # Requirements
//!
//! - `openstack` CLI with a `clouds.yaml` entry for the target cloud
//! - `oc` logged in to the cluster that owns the BareMetalHosts
//!
//! # Example
//!
//! ```ignore
//! use hotstack_cloud::{LifecycleConfig, StackLifecycle, StackSpec};
//! use hotstack_openstack::{HeatClient, PingProbe};
//!
//! let client = HeatClient::new("hotstack-os");
//! let probe = PingProbe::new();
//! let lifecycle = StackLifecycle::new(&client, LifecycleConfig::default()).with_probe(&probe);
//!
//! let report = lifecycle.run(&spec, false).await;
//! ```

pub mod bmh;
pub mod cli;
pub mod error;
pub mod heat;
pub mod ping;

pub use bmh::BareMetalHostQuery;
pub use cli::{OpenStackCli, StackInfo, StackResourceInfo};
pub use error::{OpenStackError, Result};
pub use heat::HeatClient;
pub use ping::PingProbe;
