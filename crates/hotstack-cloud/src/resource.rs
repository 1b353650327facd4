//! Resource identities, stack specifications and status snapshots

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Composite and per-resource status values reported by the orchestration service
pub mod status {
    pub const CREATE_COMPLETE: &str = "CREATE_COMPLETE";
    pub const CREATE_FAILED: &str = "CREATE_FAILED";
    pub const DELETE_FAILED: &str = "DELETE_FAILED";
    pub const DELETE_COMPLETE: &str = "DELETE_COMPLETE";
}

/// Identity of a single polled resource (`namespace/name`, or a bare name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub namespace: Option<String>,
    pub name: String,
}

impl ResourceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Description of a stack to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSpec {
    /// Stack name, unique among live stacks
    pub name: String,

    /// Template body
    pub template: String,

    /// Template parameters
    pub parameters: BTreeMap<String, String>,
}

impl StackSpec {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Read the template body from a file
    pub fn from_template_file(name: impl Into<String>, path: &Path) -> std::io::Result<Self> {
        let template = std::fs::read_to_string(path)?;
        Ok(Self::new(name, template))
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_parameters<I, K, V>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.parameters
            .extend(parameters.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Handle to a live stack as last reported by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackHandle {
    pub id: String,
    pub name: String,
    pub status: String,
    pub status_reason: Option<String>,
}

impl StackHandle {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: status.into(),
            status_reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.status_reason = Some(reason.into());
        self
    }

    pub fn reason(&self) -> &str {
        self.status_reason.as_deref().unwrap_or("no reason reported")
    }
}

/// Status of one constituent of a stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubResourceStatus {
    pub name: String,
    pub status: String,
}

impl SubResourceStatus {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == status::CREATE_COMPLETE
    }
}

/// Declared stack outputs, as returned by the orchestration service
pub type StackOutputs = BTreeMap<String, serde_json::Value>;
