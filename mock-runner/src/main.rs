//! Stand-in for the wrk-based gateway runner.
//!
//! Accepts the same flags, writes synthetic metrics and prints the results marker, so the driver
//! can be exercised without a gateway or load generator:
//!
//! ```text
//! $ stepload --interpreter '' --runner target/debug/mock-runner --connections 512,8192
//! ```
use clap::Parser;
use mock_runner::{marker_line, synthetic_metrics, write_results};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(version)]
struct MockRunnerCli {
    #[arg(long)]
    label: String,

    #[arg(long)]
    conf: PathBuf,

    #[arg(long)]
    url: String,

    #[arg(long, default_value_t = 8)]
    threads: u32,

    #[arg(long)]
    connections: NonZeroU32,

    #[arg(long, default_value_t = 15)]
    duration: u64,

    #[arg(long, default_value_t = 3)]
    warmup: u64,

    #[arg(long)]
    kill_existing: bool,

    /// Directory results are written under; defaults to `<tmp>/mock-runner`.
    #[arg(long)]
    results_root: Option<PathBuf>,

    /// Connection count the simulated gateway saturates at.
    #[arg(long, default_value = "4096")]
    saturation: NonZeroU32,

    /// Exit non-zero when asked for more connections than this.
    #[arg(long)]
    fail_above: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter("mock_runner=info")
        .with_writer(std::io::stderr)
        .init();

    let args = MockRunnerCli::parse();
    info!(
        label = %args.label,
        conf = %args.conf.display(),
        threads = args.threads,
        warmup = args.warmup,
        kill_existing = args.kill_existing,
        "Mock run"
    );
    println!(
        "Running {}s test @ {}\n  {} threads and {} connections",
        args.duration, args.url, args.threads, args.connections
    );

    if let Some(limit) = args.fail_above {
        if args.connections.get() > limit {
            eprintln!("socket: too many open files ({} > {limit})", args.connections);
            std::process::exit(1);
        }
    }

    let root = args
        .results_root
        .unwrap_or_else(|| std::env::temp_dir().join("mock-runner"));
    let metrics = synthetic_metrics(
        args.connections,
        Duration::from_secs(args.duration),
        args.saturation,
    );
    let dir = write_results(&root, &args.label, &metrics)?;
    println!("{}", marker_line(&dir));

    Ok(())
}
