mod support;

use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use rust_decimal_macros::dec;
use strategist::application::{BookMode, BookTracker, OrderIntent};
use strategist::domain::{ClientOrderId, OrderSide};
use strategist::error::ExchangeError;
use strategist::infrastructure::feed::TradeEndpoint;
use strategist::testkit::domain::{at, book, execution, own_trade};
use strategist::testkit::exchange::ExchangeCall;
use strategist::testkit::strategy::RecordingStrategy;
use support::engine::{event_settings, rig};

// 2023-11-14T22:14:00Z, on a minute boundary.
const MINUTE_START: i64 = 1_700_000_000 - 1_700_000_000 % 60 + 60;

fn endpoint() -> Arc<TradeEndpoint> {
    Arc::new(TradeEndpoint::new(100))
}

#[tokio::test]
async fn event_mode_hands_each_batch_to_the_strategy() {
    let rig = rig(at(MINUTE_START));
    let feed = endpoint();
    let strategy = RecordingStrategy::new();
    let ticks = strategy.ticks();
    let mut main = rig.main_loop(event_settings(0), Arc::clone(&feed), None, Box::new(strategy));

    feed.push_trades(vec![
        execution(1, dec!(100), dec!(1)),
        execution(2, dec!(104), dec!(2)),
        execution(3, dec!(102), dec!(1)),
    ]);
    main.tick().await.unwrap();

    let ticks = ticks.lock();
    assert_eq!(ticks.len(), 1);
    assert_eq!(ticks[0].executions, 3);
    let candle = ticks[0].candle.as_ref().unwrap();
    assert_eq!(
        (candle.open, candle.high, candle.low, candle.close),
        (dec!(100), dec!(104), dec!(100), dec!(102))
    );
    assert_eq!(candle.volume, dec!(4));
    assert!(ticks[0].book.is_none());
    assert_eq!(feed.pending(), 0);
}

#[tokio::test]
async fn own_fills_update_position_before_the_callback() {
    let rig = rig(at(MINUTE_START));
    let feed = endpoint();
    let strategy = RecordingStrategy::new();
    let ticks = strategy.ticks();
    let mut main = rig.main_loop(event_settings(0), Arc::clone(&feed), None, Box::new(strategy));

    rig.exchange.push_trades([
        own_trade(10, "x9", OrderSide::Buy, dec!(100), dec!(2)),
        own_trade(11, "x9", OrderSide::Sell, dec!(110), dec!(0.5)),
    ]);
    feed.push_trades(vec![execution(1, dec!(100), dec!(1))]);
    main.tick().await.unwrap();

    feed.push_trades(vec![execution(2, dec!(101), dec!(1))]);
    main.tick().await.unwrap();

    assert_eq!(ticks.lock()[0].position.position_size, dec!(1.5));
    assert_eq!(rig.engine.position().position_size, dec!(1.5));

    let since: Vec<_> = rig
        .exchange
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            ExchangeCall::MyTrades(since) => Some(since.map(|t| t.value())),
            _ => None,
        })
        .collect();
    assert_eq!(since, vec![None, Some(11)]);
}

#[tokio::test]
async fn startup_bucket_gets_no_entry() {
    let rig = rig(at(MINUTE_START + 5));
    let feed = endpoint();
    let strategy = RecordingStrategy::new();
    let ticks = strategy.ticks();
    let mut main = rig.main_loop(event_settings(60), Arc::clone(&feed), None, Box::new(strategy));

    feed.push_trades(vec![execution(1, dec!(100), dec!(1))]);
    main.prime().await;
    main.tick().await.unwrap();

    assert!(ticks.lock().is_empty());
    assert_eq!(rig.engine.last_entry(), None);
    // Startup still values the account.
    assert!(rig.engine.valuation().is_some());
}

#[tokio::test]
async fn throttled_ticks_still_build_candles() {
    let rig = rig(at(MINUTE_START + 5));
    let feed = endpoint();
    let strategy = RecordingStrategy::new();
    let ticks = strategy.ticks();
    let mut main = rig.main_loop(event_settings(60), Arc::clone(&feed), None, Box::new(strategy));

    feed.push_trades(vec![execution(1, dec!(100), dec!(1))]);
    main.prime().await;
    main.tick().await.unwrap();

    rig.clock.advance(ChronoDuration::seconds(30));
    feed.push_trades(vec![execution(2, dec!(101), dec!(1))]);
    main.tick().await.unwrap();
    assert!(ticks.lock().is_empty());

    rig.clock.advance(ChronoDuration::seconds(30));
    feed.push_trades(vec![execution(3, dec!(102), dec!(1))]);
    main.tick().await.unwrap();
    assert_eq!(rig.engine.last_entry(), Some(at(MINUTE_START + 65)));

    rig.clock.advance(ChronoDuration::seconds(10));
    feed.push_trades(vec![execution(4, dec!(103), dec!(1))]);
    main.tick().await.unwrap();

    let ticks = ticks.lock();
    assert_eq!(ticks.len(), 1);
    assert_eq!(ticks[0].history_len, 3);
    assert_eq!(ticks[0].executions, 1);
    // Own trades are only pulled on permitted ticks.
    let pulls = rig
        .exchange
        .calls()
        .iter()
        .filter(|c| matches!(c, ExchangeCall::MyTrades(_)))
        .count();
    assert_eq!(pulls, 1);
}

#[tokio::test]
async fn strategy_orders_go_through_the_reconciler() {
    let rig = rig(at(MINUTE_START));
    let feed = endpoint();
    let strategy = RecordingStrategy::new().with_intent(OrderIntent::limit(
        "bid",
        OrderSide::Buy,
        dec!(0.1),
        dec!(99),
    ));
    let mut main = rig.main_loop(event_settings(0), Arc::clone(&feed), None, Box::new(strategy));

    for id in 1..=3 {
        feed.push_trades(vec![execution(id, dec!(100), dec!(1))]);
        main.tick().await.unwrap();
    }

    assert_eq!(rig.exchange.submits().len(), 1);
    assert!(rig.account.order(&ClientOrderId::new("bid")).is_some());
}

#[tokio::test]
async fn api_book_mode_resyncs_from_the_exchange() {
    let rig = rig(at(MINUTE_START));
    rig.exchange.set_book(book(dec!(99), dec!(101)));
    let feed = endpoint();
    let strategy = RecordingStrategy::new();
    let ticks = strategy.ticks();
    let settings = strategist::application::Settings {
        book: BookMode::Api,
        ..event_settings(0)
    };
    let tracker = Arc::new(BookTracker::new());
    let mut main = rig.main_loop(settings, Arc::clone(&feed), Some(tracker), Box::new(strategy));

    feed.push_trades(vec![execution(1, dec!(100), dec!(1))]);
    main.tick().await.unwrap();

    let ticks = ticks.lock();
    assert_eq!(ticks[0].book.as_ref().and_then(|b| b.mid()), Some(dec!(100)));
}

#[tokio::test]
async fn empty_tracked_book_is_resynced_before_the_callback() {
    let rig = rig(at(MINUTE_START));
    rig.exchange.set_book(book(dec!(98), dec!(102)));
    let feed = endpoint();
    let strategy = RecordingStrategy::new();
    let ticks = strategy.ticks();
    let settings = strategist::application::Settings {
        book: BookMode::Stream,
        ..event_settings(0)
    };
    let tracker = Arc::new(BookTracker::new());
    let mut main = rig.main_loop(
        settings,
        Arc::clone(&feed),
        Some(Arc::clone(&tracker)),
        Box::new(strategy),
    );

    feed.push_trades(vec![execution(1, dec!(100), dec!(1))]);
    main.tick().await.unwrap();

    assert!(rig.exchange.calls().contains(&ExchangeCall::OrderBook));
    assert_eq!(ticks.lock()[0].book.as_ref().and_then(|b| b.spread()), Some(dec!(4)));
    assert!(!tracker.is_stale(dec!(0)));
}

#[tokio::test]
async fn failing_and_panicking_ticks_do_not_stop_the_loop() {
    use strategist::application::guard::guarded;

    let rig = rig(at(MINUTE_START));
    let feed = endpoint();
    let strategy = RecordingStrategy::new().failing_on(1).panicking_on(2);
    let ticks = strategy.ticks();
    let mut main = rig.main_loop(event_settings(0), Arc::clone(&feed), None, Box::new(strategy));

    let mut completed = Vec::new();
    for id in 1..=3 {
        feed.push_trades(vec![execution(id, dec!(100), dec!(1))]);
        completed.push(guarded("main", main.tick()).await);
    }

    assert_eq!(completed, vec![false, false, true]);
    assert_eq!(ticks.lock().len(), 3);
}

#[tokio::test]
async fn rejected_trade_history_still_runs_the_callback() {
    let rig = rig(at(MINUTE_START));
    let feed = endpoint();
    let strategy = RecordingStrategy::new();
    let ticks = strategy.ticks();
    let mut main = rig.main_loop(event_settings(0), Arc::clone(&feed), None, Box::new(strategy));
    rig.exchange.push_trades([own_trade(10, "x9", OrderSide::Buy, dec!(100), dec!(1))]);
    rig.exchange
        .fail_next_my_trades(ExchangeError::rate_limited("slow down"));

    feed.push_trades(vec![execution(1, dec!(100), dec!(1))]);
    main.tick().await.unwrap();

    {
        let ticks = ticks.lock();
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].executions, 1);
        assert_eq!(ticks[0].position.position_size, dec!(0));
    }
    assert_eq!(feed.pending(), 0);

    // The next permitted tick catches up from the same watermark.
    feed.push_trades(vec![execution(2, dec!(101), dec!(1))]);
    main.tick().await.unwrap();
    assert_eq!(ticks.lock()[1].position.position_size, dec!(1));
}

#[tokio::test]
async fn rejected_book_sync_keeps_the_previous_book() {
    let rig = rig(at(MINUTE_START));
    let feed = endpoint();
    let strategy = RecordingStrategy::new();
    let ticks = strategy.ticks();
    let settings = strategist::application::Settings {
        book: BookMode::Api,
        ..event_settings(0)
    };
    let tracker = Arc::new(BookTracker::new());
    tracker.sync(&book(dec!(99), dec!(101)));
    let mut main = rig.main_loop(settings, Arc::clone(&feed), Some(tracker), Box::new(strategy));
    rig.exchange
        .fail_next_order_book(ExchangeError::network("timeout"));

    feed.push_trades(vec![execution(1, dec!(100), dec!(1))]);
    main.tick().await.unwrap();

    let ticks = ticks.lock();
    assert_eq!(ticks[0].book.as_ref().and_then(|b| b.mid()), Some(dec!(100)));
}

#[tokio::test]
async fn unclassified_refresh_failure_skips_the_iteration() {
    use strategist::application::guard::guarded;
    use strategist::error::Error;

    let rig = rig(at(MINUTE_START));
    let feed = endpoint();
    let strategy = RecordingStrategy::new();
    let ticks = strategy.ticks();
    let mut main = rig.main_loop(event_settings(0), Arc::clone(&feed), None, Box::new(strategy));
    rig.exchange
        .fail_next_my_trades(Error::Internal("corrupt response".into()));

    feed.push_trades(vec![execution(1, dec!(100), dec!(1))]);
    assert!(!guarded("main", main.tick()).await);
    assert!(ticks.lock().is_empty());
    // The batch stays buffered for the next iteration.
    assert_eq!(feed.pending(), 1);

    feed.push_trades(vec![execution(2, dec!(101), dec!(1))]);
    assert!(guarded("main", main.tick()).await);
    assert_eq!(ticks.lock()[0].executions, 2);
}
