//! Handler for the `run` command.

use tokio::signal;
use tracing::info;

use crate::cli::RunArgs;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::Config;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;

    if let Some(ref strategy) = args.strategy {
        config.strategy.name = strategy.clone();
    }
    config.logging = config
        .logging
        .with_overrides(args.log_level.as_deref(), args.json_logs);
    config.logging.init();

    info!(
        config = %args.config.display(),
        strategy = %config.strategy.name,
        symbol = %config.strategy.settings.symbol,
        exchange = config.exchange.name(),
        "strategist starting"
    );

    tokio::select! {
        result = bootstrap::run(config) => result?,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("strategist stopped");
    Ok(())
}
