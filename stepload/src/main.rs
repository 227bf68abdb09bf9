use clap::Parser;
use stepload::{cli::StepLoadCli, run_step_load, StepLoad};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stepload=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let setup = StepLoadCli::parse().into_setup();
    let mut step_load = StepLoad::new(setup.config, setup.runner);
    run_step_load(&mut step_load, &setup.repo_root).await?;

    Ok(())
}
