//! ICMP reachability probe using the system `ping`

use crate::cli::run_command;
use crate::error::OpenStackError;
use async_trait::async_trait;
use hotstack_cloud::ConnectivityProbe;
use std::time::Duration;

/// One `ping -c 1 -W 2` per probe, bounded by a 5 second command timeout
pub struct PingProbe {
    program: String,
    wait_secs: u64,
    command_timeout: Duration,
}

impl PingProbe {
    pub fn new() -> Self {
        Self {
            program: "ping".to_string(),
            wait_secs: 2,
            command_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for PingProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectivityProbe for PingProbe {
    async fn probe(&self, address: &str) -> hotstack_cloud::Result<bool> {
        let wait = self.wait_secs.to_string();
        match run_command(
            &self.program,
            &["-c", "1", "-W", wait.as_str(), address],
            self.command_timeout,
        )
        .await
        {
            Ok(_) => Ok(true),
            Err(OpenStackError::CommandFailed { .. }) | Err(OpenStackError::CommandTimedOut { .. }) => {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
