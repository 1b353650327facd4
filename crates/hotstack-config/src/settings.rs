//! Settings file schema
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration for the standard HotStack lab layout.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CLOUD: &str = "hotstack-os";
pub const DEFAULT_STACK_NAME: &str = "hotstack-smoke-test";
pub const DEFAULT_TEMPLATE: &str = "smoke-test.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `clouds.yaml` entry used for every openstack command
    pub cloud: String,
    pub smoke_test: SmokeTestSettings,
    pub bmh: BmhSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cloud: DEFAULT_CLOUD.to_string(),
            smoke_test: SmokeTestSettings::default(),
            bmh: BmhSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document parses as null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cloud.is_empty() {
            return Err(ConfigError::invalid("cloud", "must not be empty"));
        }
        if self.smoke_test.stack_name.is_empty() {
            return Err(ConfigError::invalid(
                "smoke_test.stack_name",
                "must not be empty",
            ));
        }
        if self.smoke_test.poll_interval == 0 {
            return Err(ConfigError::invalid(
                "smoke_test.poll_interval",
                "must be at least 1 second",
            ));
        }
        if self.smoke_test.connectivity.interval == 0 {
            return Err(ConfigError::invalid(
                "smoke_test.connectivity.interval",
                "must be at least 1 second",
            ));
        }
        if self.bmh.poll_interval == 0 {
            return Err(ConfigError::invalid(
                "bmh.poll_interval",
                "must be at least 1 second",
            ));
        }
        if self.bmh.target_states.is_empty() {
            return Err(ConfigError::invalid(
                "bmh.target_states",
                "at least one state is required",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmokeTestSettings {
    pub stack_name: String,

    /// Heat template path, relative to the working directory
    pub template: PathBuf,

    pub parameters: BTreeMap<String, String>,

    /// Seconds
    pub create_timeout: u64,
    pub delete_timeout: u64,
    pub poll_interval: u64,

    /// Per `openstack` invocation, seconds
    pub command_timeout: u64,

    /// Leave the stack in place after the run
    pub keep_stack: bool,

    pub connectivity: ConnectivitySettings,
}

impl Default for SmokeTestSettings {
    fn default() -> Self {
        Self {
            stack_name: DEFAULT_STACK_NAME.to_string(),
            template: PathBuf::from(DEFAULT_TEMPLATE),
            parameters: BTreeMap::new(),
            create_timeout: 600,
            delete_timeout: 300,
            poll_interval: 5,
            command_timeout: 120,
            keep_stack: false,
            connectivity: ConnectivitySettings::default(),
        }
    }
}

impl SmokeTestSettings {
    pub fn create_timeout(&self) -> Duration {
        Duration::from_secs(self.create_timeout)
    }

    pub fn delete_timeout(&self) -> Duration {
        Duration::from_secs(self.delete_timeout)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivitySettings {
    pub enabled: bool,
    pub boot_wait: u64,
    pub timeout: u64,
    pub interval: u64,
    pub output_keys: Vec<String>,
}

impl Default for ConnectivitySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            boot_wait: 30,
            timeout: 60,
            interval: 2,
            output_keys: vec![
                "instance1_floating_ip".to_string(),
                "instance2_floating_ip".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BmhSettings {
    /// Namespace used when none is given on the command line
    pub namespace: Option<String>,
    pub timeout: u64,
    pub poll_interval: u64,
    pub target_states: Vec<String>,
    pub command_timeout: u64,
}

impl Default for BmhSettings {
    fn default() -> Self {
        Self {
            namespace: None,
            timeout: 300,
            poll_interval: 10,
            target_states: vec![
                "available".to_string(),
                "provisioned".to_string(),
                "provisioning".to_string(),
            ],
            command_timeout: 30,
        }
    }
}
