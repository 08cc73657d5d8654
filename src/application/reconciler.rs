//! Idempotent order reconciliation against the exchange.
//!
//! For each client id the reconciler converges the exchange's open order to
//! the caller's latest desired price and size: an equivalent open order is
//! left alone, anything else is cancelled and replaced.
//!
//! A failed cancel does not block the replacement submit, so for a short
//! window two orders can be open under one client id. The stale-order reaper
//! cleans up whatever survives.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::guard::log_failure;
use super::state::AccountState;
use crate::domain::{
    ClientOrderId, DomainError, OrderRecord, OrderRequest, OrderSide, OrderStatus, Price,
    ProductSpec, Volume,
};
use crate::error::Result;
use crate::port::{Clock, ExchangeClient};

/// Order lifecycle events as they appear in the order log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    New,
    Cancel,
    CancelLater,
    ForcedCancel,
}

impl OrderEvent {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Cancel => "CANCEL",
            Self::CancelLater => "CANCEL LATER",
            Self::ForcedCancel => "FORCED CANCEL",
        }
    }
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emit the one-line order log entry for `record`.
pub fn log_order(event: OrderEvent, record: &OrderRecord) {
    let price = record
        .price
        .map_or_else(|| "market".to_string(), |p| p.to_string());
    info!(
        event = %event,
        client_id = %record.client_id,
        status = %record.status,
        kind = %record.kind,
        side = %record.side,
        price = %price,
        executed = %record.executed,
        size = %record.size,
        exchange_id = %record.exchange_id,
        "Order"
    );
}

/// Desired state for one client id.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    pub client_id: ClientOrderId,
    pub side: OrderSide,
    pub size: Volume,
    /// `None` for a market order.
    pub price: Option<Price>,
    /// Cancel the placed order after this long if it is still open.
    pub cancel_after: Option<Duration>,
    /// Price tolerance under which an open order is kept as is.
    pub limit_mask: Decimal,
}

impl OrderIntent {
    pub fn limit(
        client_id: impl Into<ClientOrderId>,
        side: OrderSide,
        size: Volume,
        price: Price,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            side,
            size,
            price: Some(price),
            cancel_after: None,
            limit_mask: Decimal::ZERO,
        }
    }

    pub fn market(client_id: impl Into<ClientOrderId>, side: OrderSide, size: Volume) -> Self {
        Self {
            client_id: client_id.into(),
            side,
            size,
            price: None,
            cancel_after: None,
            limit_mask: Decimal::ZERO,
        }
    }

    #[must_use]
    pub const fn cancel_after(mut self, after: Duration) -> Self {
        self.cancel_after = Some(after);
        self
    }

    #[must_use]
    pub const fn limit_mask(mut self, mask: Decimal) -> Self {
        self.limit_mask = mask;
        self
    }

    /// True when `record` already expresses this intent.
    fn matches(&self, record: &OrderRecord) -> bool {
        if record.size != self.size || record.side != self.side {
            return false;
        }
        match (record.price, self.price) {
            (Some(existing), Some(wanted)) => (existing - wanted).abs() <= self.limit_mask,
            (None, None) => true,
            _ => false,
        }
    }
}

/// What `order` did.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderOutcome {
    /// An equivalent order is already open; nothing was sent.
    Unchanged,
    /// A new order was placed and recorded.
    Submitted(OrderRecord),
    /// The exchange rejected the submit. Logged; the next tick retries.
    Failed,
}

/// Submits and cancels orders, keeping [`AccountState`] in step.
#[derive(Clone)]
pub struct OrderReconciler {
    exchange: Arc<dyn ExchangeClient>,
    account: Arc<AccountState>,
    product: ProductSpec,
    clock: Arc<dyn Clock>,
}

impl OrderReconciler {
    pub fn new(
        exchange: Arc<dyn ExchangeClient>,
        account: Arc<AccountState>,
        product: ProductSpec,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            exchange,
            account,
            product,
            clock,
        }
    }

    #[must_use]
    pub const fn product(&self) -> &ProductSpec {
        &self.product
    }

    #[must_use]
    pub fn account(&self) -> &AccountState {
        &self.account
    }

    /// Converge the open order for `intent.client_id` to `intent`.
    ///
    /// Exchange rejections on submit are logged and reported as
    /// [`OrderOutcome::Failed`]; unclassified errors propagate.
    pub async fn order(&self, intent: OrderIntent) -> Result<OrderOutcome> {
        let mut intent = intent;
        intent.size = self.product.round_size(intent.size);
        intent.price = intent.price.map(|p| self.product.round_price(p));
        if intent.size <= Decimal::ZERO {
            return Err(DomainError::NonPositiveSize { size: intent.size }.into());
        }

        if let Some(existing) = self.account.order(&intent.client_id) {
            if existing.is_open() {
                if intent.matches(&existing) {
                    debug!(
                        client_id = %existing.client_id,
                        exchange_id = %existing.exchange_id,
                        "Open order already matches"
                    );
                    return Ok(OrderOutcome::Unchanged);
                }
                cancel_record(
                    self.exchange.as_ref(),
                    &self.account,
                    &self.product,
                    &existing,
                    OrderEvent::Cancel,
                )
                .await;
            }
        }

        let request = OrderRequest {
            pair: self.product.pair().clone(),
            side: intent.side,
            size: intent.size,
            price: intent.price,
        };
        let ack = match self.exchange.submit_order(&request).await {
            Ok(ack) => ack,
            Err(e) if e.is_exchange_rejection() => {
                log_failure("order", &e);
                return Ok(OrderOutcome::Failed);
            }
            Err(e) => return Err(e),
        };

        let record = self
            .account
            .record_submission(intent.client_id.clone(), ack, self.clock.now());
        log_order(OrderEvent::New, &record);

        if let Some(after) = intent.cancel_after {
            self.cancel_later(record.clone(), after);
        }
        Ok(OrderOutcome::Submitted(record))
    }

    /// Cancel the open order for `client_id`, if any. Failures are logged only.
    pub async fn cancel(&self, client_id: &ClientOrderId) {
        match self.account.order(client_id) {
            Some(record) if record.is_open() => {
                cancel_record(
                    self.exchange.as_ref(),
                    &self.account,
                    &self.product,
                    &record,
                    OrderEvent::Cancel,
                )
                .await;
            }
            _ => debug!(client_id = %client_id, "No open order to cancel"),
        }
    }

    /// Reserved hook; cancels nothing.
    pub async fn cancel_order_all(&self) {
        debug!("cancel_order_all is not implemented for this engine");
    }

    /// Force-cancel an order the local ledger no longer tracks.
    pub async fn force_cancel(&self, record: &OrderRecord) -> bool {
        cancel_record(
            self.exchange.as_ref(),
            &self.account,
            &self.product,
            record,
            OrderEvent::ForcedCancel,
        )
        .await
    }

    fn cancel_later(&self, record: OrderRecord, after: Duration) {
        let exchange = Arc::clone(&self.exchange);
        let account = Arc::clone(&self.account);
        let product = self.product.clone();

        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            match account.find_by_exchange_id(&record.exchange_id) {
                Some(current) if current.is_open() => {
                    cancel_record(
                        exchange.as_ref(),
                        &account,
                        &product,
                        &current,
                        OrderEvent::CancelLater,
                    )
                    .await;
                }
                _ => debug!(
                    client_id = %record.client_id,
                    exchange_id = %record.exchange_id,
                    "Deferred cancel skipped, order closed"
                ),
            }
        });
    }
}

/// Request cancellation of `record`. Returns true when the exchange accepted.
async fn cancel_record(
    exchange: &dyn ExchangeClient,
    account: &AccountState,
    product: &ProductSpec,
    record: &OrderRecord,
    event: OrderEvent,
) -> bool {
    match exchange
        .cancel_order(product.pair(), &record.exchange_id)
        .await
    {
        Ok(()) => {
            account.mark_cancelled(&record.exchange_id);
            let mut logged = record.clone();
            logged.status = OrderStatus::Cancelled;
            log_order(event, &logged);
            true
        }
        Err(e) => {
            warn!(
                event = %event,
                client_id = %record.client_id,
                exchange_id = %record.exchange_id,
                "Cancel failed"
            );
            log_failure("cancel", &e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExchangeOrderId, OrderKind, OrderStatus};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn record(price: Option<Decimal>, size: Decimal) -> OrderRecord {
        OrderRecord {
            client_id: ClientOrderId::new("bid"),
            exchange_id: ExchangeOrderId::new("x1"),
            status: OrderStatus::Submitted,
            side: OrderSide::Buy,
            kind: OrderKind::Limit,
            price,
            size,
            executed: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn intent_within_mask_matches() {
        let intent = OrderIntent::limit("bid", OrderSide::Buy, dec!(1), dec!(100)).limit_mask(dec!(1));
        assert!(intent.matches(&record(Some(dec!(100.5)), dec!(1))));
        assert!(intent.matches(&record(Some(dec!(101)), dec!(1))));
        assert!(!intent.matches(&record(Some(dec!(101.5)), dec!(1))));
    }

    #[test]
    fn size_or_side_change_never_matches() {
        let intent = OrderIntent::limit("bid", OrderSide::Buy, dec!(1), dec!(100)).limit_mask(dec!(5));
        assert!(!intent.matches(&record(Some(dec!(100)), dec!(2))));

        let sell = OrderIntent::limit("bid", OrderSide::Sell, dec!(1), dec!(100));
        assert!(!sell.matches(&record(Some(dec!(100)), dec!(1))));
    }

    #[test]
    fn market_and_limit_never_match() {
        let market = OrderIntent::market("bid", OrderSide::Buy, dec!(1));
        assert!(!market.matches(&record(Some(dec!(100)), dec!(1))));
        assert!(market.matches(&record(None, dec!(1))));
    }

    #[test]
    fn event_labels() {
        assert_eq!(OrderEvent::CancelLater.to_string(), "CANCEL LATER");
        assert_eq!(OrderEvent::ForcedCancel.as_str(), "FORCED CANCEL");
    }
}
