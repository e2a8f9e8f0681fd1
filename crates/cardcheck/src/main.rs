use anyhow::{Result, bail};
use catalog_harness::config::HarnessConfig;
use env_logger::{Builder as LogBuilder, Env as EnvLoggerEnv};
use tokio::runtime::Runtime;

use cardcheck::runner::run_suite;

fn main() -> Result<()> {
    LogBuilder::from_env(EnvLoggerEnv::default().filter_or("RUST_LOG", "info")).init();

    let config = HarnessConfig::from_env();
    log::info!(
        "cardcheck: catalog {} -> artifacts {}",
        config.catalog_root.display(),
        config.artifact_root.display()
    );

    let runtime = Runtime::new()?;
    let report = runtime.block_on(run_suite(&config))?;

    let failed = report.failed_count();
    if failed > 0 {
        bail!("{failed} case(s) failed");
    }
    Ok(())
}
