//! Configuration validation command.

use std::path::Path;

use crate::adapter::strategy::build_strategy;
use crate::error::Result;
use crate::infrastructure::config::Config;

/// Validate configuration file without starting the engine.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    println!("Checking configuration: {}", path.display());
    println!();

    let config = Config::load(path)?;
    let product = config.product()?;
    build_strategy(&config.strategy)?;

    let settings = &config.strategy.settings;
    println!("✓ Configuration file is valid");
    println!();
    println!("Summary:");
    println!("  Strategy: {}", config.strategy.name);
    println!("  Symbol: {} ({})", settings.symbol, product.pair());
    println!(
        "  Tick / min size: {} / {}",
        product.tick_size(),
        product.min_size()
    );
    if settings.interval == 0 {
        println!("  Cadence: on every trade batch");
    } else {
        println!("  Cadence: every {}s", settings.interval);
    }
    println!("  Minimum entry interval: {}s", settings.minimum_interval);
    println!("  Order book: {:?}", settings.book);
    println!("  Exchange: {}", config.exchange.name());
    println!("  Feed: {}", config.feed.ws_url);
    println!();

    if config.credentials.is_some() {
        println!("✓ API credentials found (from STRATEGIST_API_KEY / STRATEGIST_API_SECRET)");
    } else {
        println!("  No API credentials set (not needed for the paper exchange)");
    }

    println!();
    println!("Configuration is ready to use.");
    Ok(())
}
