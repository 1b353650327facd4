//! openstack CLI wrapper
//!
//! Wraps the `openstack` client commands used to drive Heat stacks.
//! All commands run with `-f json` and are killed when they exceed the command timeout.

use crate::error::{OpenStackError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Default limit for a single `openstack` invocation
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Run an external program and return its stdout
///
/// Non-zero exit becomes `CommandFailed` carrying stderr. The child is killed
/// if it is still running when `timeout` expires.
pub async fn run_command(program: &str, args: &[&str], timeout: Duration) -> Result<String> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    tracing::debug!("Running: {} {}", program, args.join(" "));

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(OpenStackError::ProgramNotFound(program.to_string()));
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(OpenStackError::CommandTimedOut {
                program: program.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(OpenStackError::CommandFailed {
            program: program.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Whether a failed command reported that Heat has no stack called `name_or_id`
///
/// Only Heat's own messages count. A missing `clouds.yaml` entry or an endpoint
/// answering `404 Not Found` is a real failure, not a missing stack.
pub fn is_stack_missing(stderr: &str, name_or_id: &str) -> bool {
    let stderr = stderr.to_lowercase();
    let name = name_or_id.to_lowercase();
    stderr.contains(&format!("stack not found: {}", name))
        || stderr.contains(&format!("the stack ({}) could not be found", name))
}

/// openstack CLI wrapper bound to one `clouds.yaml` entry
pub struct OpenStackCli {
    program: String,
    cloud: String,
    command_timeout: Duration,
}

impl OpenStackCli {
    pub fn new(cloud: impl Into<String>) -> Self {
        Self {
            program: "openstack".to_string(),
            cloud: cloud.into(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn cloud(&self) -> &str {
        &self.cloud
    }

    /// Run an openstack command and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut full = vec!["--os-cloud", self.cloud.as_str()];
        full.extend_from_slice(args);
        run_command(&self.program, &full, self.command_timeout).await
    }

    /// Show a stack by name or ID; `None` when Heat does not know it
    pub async fn show_stack(&self, name_or_id: &str) -> Result<Option<StackInfo>> {
        match self
            .run_command(&["stack", "show", name_or_id, "-f", "json"])
            .await
        {
            Ok(output) => Ok(Some(serde_json::from_str(&output)?)),
            Err(OpenStackError::CommandFailed { stderr, .. })
                if is_stack_missing(&stderr, name_or_id) =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Submit a stack create request; does not wait for completion
    pub async fn create_stack(&self, config: &CreateStackConfig<'_>) -> Result<StackInfo> {
        let template = config.template_path.to_string_lossy().into_owned();
        let parameters: Vec<String> = config
            .parameters
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();

        let mut args = vec!["stack", "create", "-f", "json", "-t", template.as_str()];
        for parameter in &parameters {
            args.push("--parameter");
            args.push(parameter.as_str());
        }
        args.push(config.name);

        let output = self.run_command(&args).await?;
        let stack: StackInfo = serde_json::from_str(&output)?;
        Ok(stack)
    }

    /// Submit a stack delete request; does not wait for completion
    pub async fn delete_stack(&self, name_or_id: &str) -> Result<()> {
        match self
            .run_command(&["stack", "delete", "--yes", name_or_id])
            .await
        {
            Ok(_) => Ok(()),
            Err(OpenStackError::CommandFailed { stderr, .. })
                if is_stack_missing(&stderr, name_or_id) =>
            {
                Err(OpenStackError::StackNotFound(name_or_id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// List the resources that make up a stack
    pub async fn list_stack_resources(&self, name_or_id: &str) -> Result<Vec<StackResourceInfo>> {
        let output = self
            .run_command(&["stack", "resource", "list", "-f", "json", name_or_id])
            .await?;

        if output.trim().is_empty() || output.trim() == "[]" {
            return Ok(Vec::new());
        }

        let resources: Vec<StackResourceInfo> = serde_json::from_str(&output)?;
        Ok(resources)
    }
}

/// Stack information from `openstack stack show|create -f json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackInfo {
    pub id: String,

    pub stack_name: String,

    pub stack_status: String,

    #[serde(default)]
    pub stack_status_reason: Option<String>,

    #[serde(default)]
    pub outputs: Option<Vec<StackOutputEntry>>,
}

impl StackInfo {
    /// Outputs keyed by output name
    pub fn output_map(&self) -> BTreeMap<String, serde_json::Value> {
        self.outputs
            .iter()
            .flatten()
            .map(|o| (o.output_key.clone(), o.output_value.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackOutputEntry {
    pub output_key: String,

    #[serde(default)]
    pub output_value: serde_json::Value,

    #[serde(default)]
    pub description: Option<String>,
}

/// Row from `openstack stack resource list -f json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackResourceInfo {
    pub resource_name: String,

    pub resource_status: String,

    #[serde(default)]
    pub resource_type: Option<String>,

    #[serde(default)]
    pub physical_resource_id: Option<String>,
}

/// Arguments for `openstack stack create`
#[derive(Debug, Clone)]
pub struct CreateStackConfig<'a> {
    pub name: &'a str,
    pub template_path: &'a Path,
    pub parameters: &'a BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stack_show() {
        let json = r#"{
            "id": "0f3a2c6e-5d1b-4e8f-9a7c-2b4d6e8f0a1c",
            "stack_name": "hotstack-smoke-test",
            "description": "HotStack smoke test",
            "stack_status": "CREATE_COMPLETE",
            "stack_status_reason": "Stack CREATE completed successfully",
            "outputs": [
                {"output_key": "instance1_floating_ip", "output_value": "192.168.122.201", "description": "FIP"},
                {"output_key": "ports", "output_value": {"vlan": 101, "mac": "fa:16:3e:00:00:01"}}
            ]
        }"#;

        let stack: StackInfo = serde_json::from_str(json).unwrap();
        assert_eq!(stack.stack_name, "hotstack-smoke-test");
        assert_eq!(stack.stack_status, "CREATE_COMPLETE");

        let outputs = stack.output_map();
        assert_eq!(outputs["instance1_floating_ip"], "192.168.122.201");
        assert_eq!(outputs["ports"]["vlan"], 101);
    }

    #[test]
    fn test_parse_stack_without_outputs() {
        let json = r#"{
            "id": "abc",
            "stack_name": "smoke",
            "stack_status": "CREATE_IN_PROGRESS",
            "stack_status_reason": null
        }"#;

        let stack: StackInfo = serde_json::from_str(json).unwrap();
        assert!(stack.stack_status_reason.is_none());
        assert!(stack.output_map().is_empty());
    }

    #[test]
    fn test_parse_resource_list() {
        let json = r#"[
            {"resource_name": "instance1", "physical_resource_id": "1", "resource_type": "OS::Nova::Server", "resource_status": "CREATE_COMPLETE", "updated_time": "2024-01-01T00:00:00Z"},
            {"resource_name": "instance2", "physical_resource_id": "2", "resource_type": "OS::Nova::Server", "resource_status": "CREATE_FAILED", "updated_time": "2024-01-01T00:00:00Z"}
        ]"#;

        let resources: Vec<StackResourceInfo> = serde_json::from_str(json).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[1].resource_status, "CREATE_FAILED");
    }

    #[test]
    fn test_stack_missing_messages() {
        assert!(is_stack_missing("Stack not found: smoke", "smoke"));
        assert!(is_stack_missing(
            "ERROR: The Stack (smoke) could not be found.",
            "smoke"
        ));
        assert!(!is_stack_missing("Stack not found: other", "smoke"));
        assert!(!is_stack_missing(
            "Failed to discover available identity versions",
            "smoke"
        ));
    }

    #[test]
    fn test_unrelated_not_found_is_not_a_missing_stack() {
        assert!(!is_stack_missing(
            "Cloud hotstack-os was not found.",
            "hotstack-smoke-test"
        ));
        assert!(!is_stack_missing("Not Found (HTTP 404)", "hotstack-smoke-test"));
        assert!(!is_stack_missing("404 Not Found", "hotstack-smoke-test"));
    }

    /// Shell script standing in for the openstack client
    #[cfg(unix)]
    fn fake_openstack(dir: &Path, stderr: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("openstack");
        std::fs::write(
            &path,
            format!("#!/bin/sh\necho '{}' >&2\nexit 1\n", stderr),
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_cloud_entry_is_a_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cli = OpenStackCli::new("hotstack-os").with_program(fake_openstack(
            temp_dir.path(),
            "Cloud hotstack-os was not found.",
        ));

        let err = cli.show_stack("hotstack-smoke-test").await.unwrap_err();
        assert!(matches!(err, OpenStackError::CommandFailed { .. }));

        let err = cli.delete_stack("hotstack-smoke-test").await.unwrap_err();
        assert!(matches!(err, OpenStackError::CommandFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_heat_missing_stack_is_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cli = OpenStackCli::new("hotstack-os").with_program(fake_openstack(
            temp_dir.path(),
            "Stack not found: hotstack-smoke-test",
        ));

        assert!(cli.show_stack("hotstack-smoke-test").await.unwrap().is_none());

        let err = cli.delete_stack("hotstack-smoke-test").await.unwrap_err();
        assert!(matches!(err, OpenStackError::StackNotFound(_)));
    }

    #[tokio::test]
    async fn test_run_command_returns_stdout() {
        let out = run_command("sh", &["-c", "echo available"], Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out.trim(), "available");
    }

    #[tokio::test]
    async fn test_run_command_failure_carries_stderr() {
        let err = run_command("sh", &["-c", "echo boom >&2; exit 3"], Duration::from_secs(5))
            .await
            .unwrap_err();

        match err {
            OpenStackError::CommandFailed { program, stderr } => {
                assert_eq!(program, "sh");
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_command_times_out() {
        let err = run_command("sh", &["-c", "sleep 5"], Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, OpenStackError::CommandTimedOut { .. }));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = run_command("hotstack-no-such-program", &[], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, OpenStackError::ProgramNotFound(_)));
    }
}
