#![allow(dead_code)]

use async_trait::async_trait;
use hotstack_cloud::{
    CloudError, ConnectivityProbe, OrchestrationClient, ResourceId, Result, StackHandle,
    StackOutputs, StackSpec, StatusQuery, SubResourceStatus, status,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Status query answering from a script; the last answer repeats
pub struct ScriptedQuery {
    answers: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: AtomicUsize,
}

impl ScriptedQuery {
    pub fn new(answers: Vec<std::result::Result<&str, &str>>) -> Self {
        let answers = answers
            .into_iter()
            .map(|a| a.map(str::to_string).map_err(str::to_string))
            .collect();
        Self {
            answers: Mutex::new(answers),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn states(states: &[&str]) -> Self {
        Self::new(states.iter().map(|s| Ok(*s)).collect())
    }

    pub fn always(state: &str) -> Self {
        Self::states(&[state])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusQuery for ScriptedQuery {
    async fn query(&self, _resource: &ResourceId) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut answers = self.answers.lock().unwrap();
        let answer = if answers.len() > 1 {
            answers.pop_front().unwrap()
        } else {
            answers.front().cloned().expect("script must not be empty")
        };
        answer.map_err(CloudError::CommandFailed)
    }
}

/// Client call, recorded in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Find(String),
    Create(String),
    Delete(String),
    GetStatus(String),
    ListSubResources(String),
    GetOutputs(String),
}

struct MockStack {
    handle: StackHandle,
    create_script: VecDeque<String>,
    deleting: Option<VecDeque<String>>,
}

#[derive(Default)]
struct MockState {
    calls: Vec<Call>,
    stacks: HashMap<String, MockStack>,
    next_id: u32,
    create_script: Vec<String>,
    delete_script: Vec<String>,
    delete_sticks: bool,
    create_rejection: Option<String>,
    sub_resources: Vec<SubResourceStatus>,
    outputs: StackOutputs,
}

/// In-memory orchestration service
pub struct MockClient {
    state: Mutex<MockState>,
}

impl MockClient {
    pub fn new() -> Self {
        let state = MockState {
            create_script: vec![status::CREATE_COMPLETE.to_string()],
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// A live stack that exists before the test starts
    pub fn with_existing(self, name: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let handle = StackHandle::new(
                format!("stack-{}", state.next_id),
                name,
                status::CREATE_COMPLETE,
            );
            state.stacks.insert(
                name.to_string(),
                MockStack {
                    handle,
                    create_script: VecDeque::new(),
                    deleting: None,
                },
            );
        }
        self
    }

    /// Statuses reported by `get_status` after create; the last one repeats
    pub fn with_create_statuses(self, statuses: &[&str]) -> Self {
        self.state.lock().unwrap().create_script =
            statuses.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Statuses reported by `find` after delete, before the stack disappears
    pub fn with_delete_statuses(self, statuses: &[&str]) -> Self {
        self.state.lock().unwrap().delete_script =
            statuses.iter().map(|s| s.to_string()).collect();
        self
    }

    /// After delete, `find` keeps reporting `status` forever
    pub fn with_stuck_delete(self, status: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.delete_script = vec![status.to_string()];
            state.delete_sticks = true;
        }
        self
    }

    /// `create` fails with an API error before anything is created
    pub fn with_rejected_create(self, reason: &str) -> Self {
        self.state.lock().unwrap().create_rejection = Some(reason.to_string());
        self
    }

    pub fn with_sub_resources(self, resources: &[(&str, &str)]) -> Self {
        self.state.lock().unwrap().sub_resources = resources
            .iter()
            .map(|(name, status)| SubResourceStatus::new(*name, *status))
            .collect();
        self
    }

    pub fn with_outputs(self, outputs: serde_json::Value) -> Self {
        let outputs: StackOutputs = serde_json::from_value(outputs).unwrap();
        self.state.lock().unwrap().outputs = outputs;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }

    pub fn deletes(&self) -> usize {
        self.count(|c| matches!(c, Call::Delete(_)))
    }

    pub fn creates(&self) -> usize {
        self.count(|c| matches!(c, Call::Create(_)))
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.calls().iter().position(|c| c == call)
    }

    /// Names of stacks that exist and are not being deleted
    pub fn live_stacks(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut names: Vec<String> = state
            .stacks
            .iter()
            .filter(|(_, s)| s.deleting.is_none())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl OrchestrationClient for MockClient {
    async fn find(&self, name: &str) -> Result<Option<StackHandle>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Find(name.to_string()));
        let sticks = state.delete_sticks;
        let state = &mut *state;

        let Some(stack) = state.stacks.get_mut(name) else {
            return Ok(None);
        };

        let found = match stack.deleting.as_mut() {
            None => Some(stack.handle.clone()),
            Some(queue) if queue.is_empty() => None,
            Some(queue) => {
                let status = if sticks && queue.len() == 1 {
                    queue[0].clone()
                } else {
                    queue.pop_front().unwrap()
                };
                let mut handle = stack.handle.clone();
                handle.status = status;
                Some(handle)
            }
        };

        if found.is_none() {
            state.stacks.remove(name);
        }
        Ok(found)
    }

    async fn create(&self, spec: &StackSpec) -> Result<StackHandle> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create(spec.name.clone()));

        if let Some(reason) = &state.create_rejection {
            return Err(CloudError::ApiError(reason.clone()));
        }

        if state.stacks.contains_key(&spec.name) {
            return Err(CloudError::ApiError(format!(
                "Stack '{}' already exists",
                spec.name
            )));
        }

        state.next_id += 1;
        let handle = StackHandle::new(
            format!("stack-{}", state.next_id),
            &spec.name,
            "CREATE_IN_PROGRESS",
        );
        let create_script = state.create_script.iter().cloned().collect();
        state.stacks.insert(
            spec.name.clone(),
            MockStack {
                handle: handle.clone(),
                create_script,
                deleting: None,
            },
        );
        Ok(handle)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete(name.to_string()));
        let script: VecDeque<String> = state.delete_script.iter().cloned().collect();

        match state.stacks.get_mut(name) {
            Some(stack) => {
                stack.deleting = Some(script);
                Ok(())
            }
            None => Err(CloudError::ResourceNotFound(format!("Stack '{}'", name))),
        }
    }

    async fn get_status(&self, handle: &StackHandle) -> Result<StackHandle> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetStatus(handle.name.clone()));

        let stack = state
            .stacks
            .get_mut(&handle.name)
            .filter(|s| s.handle.id == handle.id)
            .ok_or_else(|| CloudError::ResourceNotFound(handle.id.clone()))?;

        if stack.create_script.len() > 1 {
            stack.handle.status = stack.create_script.pop_front().unwrap();
        } else if let Some(last) = stack.create_script.front() {
            stack.handle.status = last.clone();
        }
        if stack.handle.status == status::CREATE_FAILED {
            stack.handle.status_reason = Some("Resource CREATE failed: quota exceeded".into());
        }
        Ok(stack.handle.clone())
    }

    async fn list_sub_resources(&self, handle: &StackHandle) -> Result<Vec<SubResourceStatus>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListSubResources(handle.name.clone()));
        Ok(state.sub_resources.clone())
    }

    async fn get_outputs(&self, handle: &StackHandle) -> Result<StackOutputs> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetOutputs(handle.name.clone()));
        Ok(state.outputs.clone())
    }
}

/// Connectivity probe answering from a script; the last answer repeats
pub struct ScriptedProbe {
    answers: Mutex<VecDeque<bool>>,
    probed: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConnectivityProbe for ScriptedProbe {
    async fn probe(&self, address: &str) -> Result<bool> {
        self.probed.lock().unwrap().push(address.to_string());
        let mut answers = self.answers.lock().unwrap();
        let answer = if answers.len() > 1 {
            answers.pop_front().unwrap()
        } else {
            answers.front().copied().unwrap_or(false)
        };
        Ok(answer)
    }
}

pub fn spec(name: &str) -> StackSpec {
    StackSpec::new(name, "heat_template_version: 2021-04-16\nresources: {}\n")
        .with_parameter("image_name", "cirros")
}
