use crate::WaitBmhArgs;
use crate::output;
use colored::Colorize;
use hotstack_cloud::{Disposition, PollOutcome, PollRequest, ResourceId, wait_for_state};
use hotstack_config::{BmhSettings, Settings};
use hotstack_openstack::BareMetalHostQuery;
use serde::Serialize;

/// Machine-readable result printed with `--json`
#[derive(Debug, Serialize)]
pub struct BmhReport {
    pub changed: bool,
    pub state: Option<String>,
    pub elapsed: u64,
    pub msg: String,
}

impl BmhReport {
    pub fn new(bmh: &str, request: &PollRequest, outcome: &PollOutcome) -> Self {
        let msg = match outcome.disposition() {
            Disposition::Reached => format!(
                "BaremetalHost {} reached target state '{}' after {} seconds",
                bmh,
                outcome.state().unwrap_or_default(),
                outcome.elapsed_secs()
            ),
            Disposition::TimedOut => format!(
                "Failed to wait for BaremetalHost {}: Timeout after {} seconds",
                bmh,
                request.timeout().as_secs()
            ),
            Disposition::QueryFailed => format!(
                "Failed to wait for BaremetalHost {}: Failed to get BMH state: {}",
                bmh,
                outcome.detail().unwrap_or("unknown error")
            ),
        };

        Self {
            changed: false,
            state: outcome.state().map(str::to_string),
            elapsed: outcome.elapsed_secs(),
            msg,
        }
    }
}

/// Merge flags over settings into a poll request
pub fn build_request(args: &WaitBmhArgs, settings: &BmhSettings) -> anyhow::Result<PollRequest> {
    let namespace = args
        .namespace
        .clone()
        .or_else(|| settings.namespace.clone())
        .ok_or_else(|| anyhow::anyhow!("--namespace is required (or set bmh.namespace)"))?;

    let states = if args.states.is_empty() {
        settings.target_states.clone()
    } else {
        args.states.clone()
    };

    let request = PollRequest::new(
        ResourceId::namespaced(namespace, &args.bmh),
        states,
        super::seconds(args.timeout, settings.timeout),
        super::interval("--poll-interval", args.poll_interval, settings.poll_interval)?,
    )?;
    Ok(request)
}

pub async fn handle(args: WaitBmhArgs, settings: &Settings) -> anyhow::Result<()> {
    let request = build_request(&args, &settings.bmh)?;
    let query = BareMetalHostQuery::new().with_command_timeout(super::seconds(
        args.command_timeout,
        settings.bmh.command_timeout,
    ));

    if !args.json {
        println!(
            "{}",
            format!(
                "Waiting for BaremetalHost {} to reach [{}] (timeout {}s)",
                request.resource(),
                request.accepted_states().join(", "),
                request.timeout().as_secs()
            )
            .blue()
        );
    }

    let outcome = wait_for_state(&query, &request).await;
    let report = BmhReport::new(&args.bmh, &request, &outcome);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if outcome.is_reached() {
        output::success(&report.msg);
    } else {
        output::failure(&report.msg);
    }

    if outcome.is_reached() {
        Ok(())
    } else {
        anyhow::bail!(report.msg)
    }
}
