use crate::CleanupArgs;
use crate::output;
use colored::Colorize;
use hotstack_cloud::{LifecycleConfig, StackLifecycle};
use hotstack_config::Settings;
use hotstack_openstack::HeatClient;

fn lifecycle_config(args: &CleanupArgs, settings: &Settings) -> anyhow::Result<LifecycleConfig> {
    let smoke = &settings.smoke_test;
    Ok(LifecycleConfig {
        delete_timeout: super::seconds(args.delete_timeout, smoke.delete_timeout),
        poll_interval: super::interval("--poll-interval", args.poll_interval, smoke.poll_interval)?,
        connectivity: None,
        ..Default::default()
    })
}

/// Delete the stack and wait for it; unlike a smoke test run, a failed deletion is the verdict
pub async fn handle(args: CleanupArgs, settings: &Settings) -> anyhow::Result<()> {
    let cloud = args.cloud.clone().unwrap_or_else(|| settings.cloud.clone());
    let stack_name = args
        .stack_name
        .clone()
        .unwrap_or_else(|| settings.smoke_test.stack_name.clone());

    let client = HeatClient::new(&cloud).with_command_timeout(settings.smoke_test.command_timeout());
    let lifecycle = StackLifecycle::new(&client, lifecycle_config(&args, settings)?);

    println!(
        "{}",
        format!("Cleaning up stack '{}' on cloud '{}'", stack_name, cloud).yellow()
    );

    match lifecycle.delete_and_wait(&stack_name).await {
        Ok(outcome) => {
            output::cleanup(&outcome);
            Ok(())
        }
        Err(e) => {
            output::failure(&format!("Failed to delete stack '{}': {}", stack_name, e));
            Err(e.into())
        }
    }
}
