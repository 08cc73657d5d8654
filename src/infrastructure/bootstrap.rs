//! Composition root: builds the engine from a loaded [`Config`].

use std::sync::Arc;

use tracing::info;

use crate::adapter::strategy::build_strategy;
use crate::error::Result;
use crate::infrastructure::config::{Config, ExchangeConfig};
use crate::infrastructure::feed::WsTradeSource;
use crate::infrastructure::paper::{PaperExchange, PaperTap};
use crate::infrastructure::supervisor::{Supervisor, SupervisorParts};
use crate::port::{ExchangeClient, SystemClock};

/// Build every collaborator from `config` and run the engine.
pub async fn run(config: Config) -> Result<()> {
    let product = config.product()?;
    let strategy = build_strategy(&config.strategy)?;
    let source = WsTradeSource::new(config.feed.ws_url.clone());

    match &config.exchange {
        ExchangeConfig::Paper(paper) => {
            if config.credentials.is_some() {
                info!("API credentials present but unused by the paper exchange");
            }
            let exchange = Arc::new(PaperExchange::new(product.clone(), paper));
            let source = PaperTap::new(source, Arc::clone(&exchange));
            let exchange: Arc<dyn ExchangeClient> = exchange;

            Supervisor::new(SupervisorParts {
                settings: config.strategy.settings.clone(),
                engine: config.engine.clone(),
                product,
                exchange,
                source,
                reconnection: config.feed.reconnection.clone(),
                strategy,
                clock: Arc::new(SystemClock),
            })
            .start()
            .await
        }
    }
}
