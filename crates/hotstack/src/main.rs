mod commands;
mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hotstack")]
#[command(
    about = "Wait for BareMetalHosts and smoke-test HotStack OpenStack clouds",
    long_about = None
)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file; skips the usual search
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for a BareMetalHost to reach a provisioning state
    WaitBmh(WaitBmhArgs),
    /// Create a Heat stack, verify it, then delete it
    SmokeTest(SmokeTestArgs),
    /// Delete the smoke test stack and wait until it is gone
    Cleanup(CleanupArgs),
    /// Show version information
    Version,
}

#[derive(Args, Debug, Default)]
pub struct WaitBmhArgs {
    /// BareMetalHost name
    pub bmh: String,

    /// Namespace of the BareMetalHost
    #[arg(short, long, env = "HOTSTACK_BMH_NAMESPACE")]
    pub namespace: Option<String>,

    /// Accepted provisioning states (comma separated or repeated)
    #[arg(short, long = "state", value_delimiter = ',')]
    pub states: Vec<String>,

    /// Seconds to wait before giving up
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Seconds between state queries
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Seconds a single `oc get` may take
    #[arg(long)]
    pub command_timeout: Option<u64>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Default)]
pub struct SmokeTestArgs {
    /// clouds.yaml entry to use
    #[arg(long, env = "OS_CLOUD")]
    pub cloud: Option<String>,

    /// Stack name
    #[arg(short, long)]
    pub stack_name: Option<String>,

    /// Heat template file
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Template parameter (KEY=VALUE, repeatable)
    #[arg(short, long = "parameter", value_parser = commands::parse_key_val)]
    pub parameters: Vec<(String, String)>,

    /// Seconds to wait for CREATE_COMPLETE
    #[arg(long)]
    pub create_timeout: Option<u64>,

    /// Seconds to wait for the stack to disappear
    #[arg(long)]
    pub delete_timeout: Option<u64>,

    /// Seconds between stack status queries
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Leave the stack in place after the test
    #[arg(short, long)]
    pub keep_stack: bool,

    /// Skip the ping checks against instance floating IPs
    #[arg(long)]
    pub skip_connectivity: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Default)]
pub struct CleanupArgs {
    /// clouds.yaml entry to use
    #[arg(long, env = "OS_CLOUD")]
    pub cloud: Option<String>,

    /// Stack name
    #[arg(short, long)]
    pub stack_name: Option<String>,

    /// Seconds to wait for the stack to disappear
    #[arg(long)]
    pub delete_timeout: Option<u64>,

    /// Seconds between stack status queries
    #[arg(long)]
    pub poll_interval: Option<u64>,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Version does not need settings
    if matches!(cli.command, Commands::Version) {
        println!("hotstack {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_tracing(cli.verbose);

    let settings = match &cli.config {
        Some(path) => {
            tracing::debug!("Loading settings from {}", path.display());
            hotstack_config::load_from(path)?
        }
        None => hotstack_config::load()?,
    };
    tracing::debug!("Using cloud '{}'", settings.cloud);

    match cli.command {
        Commands::WaitBmh(args) => commands::wait_bmh::handle(args, &settings).await,
        Commands::SmokeTest(args) => commands::smoke_test::handle(args, &settings).await,
        Commands::Cleanup(args) => commands::cleanup::handle(args, &settings).await,
        Commands::Version => Ok(()),
    }
}
