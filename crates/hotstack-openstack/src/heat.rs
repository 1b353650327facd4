//! Heat orchestration client backed by the openstack CLI

use crate::cli::{CreateStackConfig, OpenStackCli, StackInfo, StackResourceInfo};
use async_trait::async_trait;
use hotstack_cloud::{
    CloudError, OrchestrationClient, StackHandle, StackOutputs, StackSpec, SubResourceStatus,
};
use std::io::Write;
use std::time::Duration;

impl From<StackInfo> for StackHandle {
    fn from(info: StackInfo) -> Self {
        let handle = StackHandle::new(info.id, info.stack_name, info.stack_status);
        match info.stack_status_reason {
            Some(reason) if !reason.is_empty() => handle.with_reason(reason),
            _ => handle,
        }
    }
}

impl From<StackResourceInfo> for SubResourceStatus {
    fn from(info: StackResourceInfo) -> Self {
        SubResourceStatus::new(info.resource_name, info.resource_status)
    }
}

/// OpenStack Heat client
pub struct HeatClient {
    cli: OpenStackCli,
}

impl HeatClient {
    pub fn new(cloud: impl Into<String>) -> Self {
        Self {
            cli: OpenStackCli::new(cloud),
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.cli = self.cli.with_command_timeout(timeout);
        self
    }

    /// Use a different `openstack` executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.cli = self.cli.with_program(program);
        self
    }

    pub fn cloud(&self) -> &str {
        self.cli.cloud()
    }

    async fn show(&self, handle: &StackHandle) -> hotstack_cloud::Result<StackInfo> {
        self.cli
            .show_stack(&handle.id)
            .await?
            .ok_or_else(|| CloudError::ResourceNotFound(format!("Stack '{}'", handle.name)))
    }
}

#[async_trait]
impl OrchestrationClient for HeatClient {
    async fn find(&self, name: &str) -> hotstack_cloud::Result<Option<StackHandle>> {
        let stack = self.cli.show_stack(name).await?;
        Ok(stack.map(StackHandle::from))
    }

    async fn create(&self, spec: &StackSpec) -> hotstack_cloud::Result<StackHandle> {
        // The CLI only accepts templates from disk
        let mut template = tempfile::Builder::new()
            .prefix("hotstack-")
            .suffix(".yaml")
            .tempfile()?;
        template.write_all(spec.template.as_bytes())?;
        template.flush()?;

        tracing::info!("Creating stack: {}", spec.name);

        let stack = self
            .cli
            .create_stack(&CreateStackConfig {
                name: &spec.name,
                template_path: template.path(),
                parameters: &spec.parameters,
            })
            .await?;

        Ok(stack.into())
    }

    async fn delete(&self, name: &str) -> hotstack_cloud::Result<()> {
        tracing::info!("Deleting stack: {}", name);
        self.cli.delete_stack(name).await?;
        Ok(())
    }

    async fn get_status(&self, handle: &StackHandle) -> hotstack_cloud::Result<StackHandle> {
        Ok(self.show(handle).await?.into())
    }

    async fn list_sub_resources(
        &self,
        handle: &StackHandle,
    ) -> hotstack_cloud::Result<Vec<SubResourceStatus>> {
        let resources = self.cli.list_stack_resources(&handle.id).await?;
        Ok(resources.into_iter().map(SubResourceStatus::from).collect())
    }

    async fn get_outputs(&self, handle: &StackHandle) -> hotstack_cloud::Result<StackOutputs> {
        Ok(self.show(handle).await?.output_map())
    }
}
