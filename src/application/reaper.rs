//! Periodic sweep for orders the exchange holds but the ledger has retired.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::guard::guarded;
use super::reconciler::OrderReconciler;
use crate::domain::ExchangeOrderId;
use crate::error::Result;
use crate::port::ExchangeClient;

pub struct StaleOrderReaper {
    exchange: Arc<dyn ExchangeClient>,
    reconciler: OrderReconciler,
    period: Duration,
}

impl StaleOrderReaper {
    pub fn new(
        exchange: Arc<dyn ExchangeClient>,
        reconciler: OrderReconciler,
        period: Duration,
    ) -> Self {
        Self {
            exchange,
            reconciler,
            period,
        }
    }

    /// Sweep every period, forever.
    pub async fn run(&self) {
        info!(period_secs = self.period.as_secs(), "Stale-order reaper started");
        loop {
            tokio::time::sleep(self.period).await;
            guarded("reaper", async { self.sweep().await.map(|_| ()) }).await;
        }
    }

    /// One sweep. Returns how many orders were force-cancelled.
    pub async fn sweep(&self) -> Result<usize> {
        let nonactive = self.reconciler.account().nonactive_orders();
        if nonactive.is_empty() {
            return Ok(0);
        }

        let pair = self.reconciler.product().pair();
        let open = self.exchange.open_orders(pair).await?;
        for order in &open {
            info!(
                exchange_id = %order.id,
                side = %order.side,
                kind = %order.kind,
                price = ?order.price,
                pending = %order.pending_size,
                "Open order on exchange"
            );
        }

        let open_ids: HashSet<&ExchangeOrderId> = open.iter().map(|o| &o.id).collect();
        let mut cancelled = HashSet::new();
        for record in nonactive {
            if !open_ids.contains(&record.exchange_id) || cancelled.contains(&record.exchange_id) {
                continue;
            }
            self.reconciler.force_cancel(&record).await;
            cancelled.insert(record.exchange_id);
        }

        debug!(forced = cancelled.len(), "Reaper sweep done");
        Ok(cancelled.len())
    }
}
