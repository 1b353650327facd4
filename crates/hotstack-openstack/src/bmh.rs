//! BareMetalHost provisioning state via the `oc` client

use crate::cli::run_command;
use async_trait::async_trait;
use hotstack_cloud::{CloudError, ResourceId, StatusQuery};
use std::time::Duration;

/// Default limit for a single `oc get` invocation
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

const BMH_RESOURCE: &str = "baremetalhosts.metal3.io";
const STATE_JSONPATH: &str = "jsonpath={.status.provisioning.state}";

/// Reads `.status.provisioning.state` of a metal3 BareMetalHost
pub struct BareMetalHostQuery {
    program: String,
    command_timeout: Duration,
}

impl BareMetalHostQuery {
    pub fn new() -> Self {
        Self {
            program: "oc".to_string(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Use a different kube client binary (e.g. `kubectl`)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for BareMetalHostQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip whitespace and the quotes jsonpath output may carry
pub fn parse_state(output: &str) -> String {
    output.trim().trim_matches(|c| c == '\'' || c == '"').to_string()
}

#[async_trait]
impl StatusQuery for BareMetalHostQuery {
    async fn query(&self, resource: &ResourceId) -> hotstack_cloud::Result<String> {
        let namespace = resource.namespace.as_deref().ok_or_else(|| {
            CloudError::InvalidConfig(format!(
                "BareMetalHost {} requires a namespace",
                resource.name
            ))
        })?;

        let output = run_command(
            &self.program,
            &[
                "get",
                "-n",
                namespace,
                BMH_RESOURCE,
                &resource.name,
                "-o",
                STATE_JSONPATH,
            ],
            self.command_timeout,
        )
        .await?;

        let state = parse_state(&output);
        tracing::debug!("BareMetalHost {} state: '{}'", resource, state);
        Ok(state)
    }
}
