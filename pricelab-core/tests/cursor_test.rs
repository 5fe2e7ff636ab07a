//! Two-phase incremental cursor through `MarketData`.

use pricelab_core::{MarketData, Regime, RegimeAssignment};

fn market(days: usize, seed: u64) -> MarketData {
    MarketData::new(
        100.0,
        99.0,
        vec![RegimeAssignment::new(Regime::gbm(0.0005, 0.02).unwrap(), 0, days)],
        Some(seed),
    )
    .unwrap()
}

#[test]
fn first_pair_is_start_quote() {
    let m = market(10, 42);
    assert_eq!(m.next_buy_price(), Some(100.0));
    assert_eq!(m.next_sell_price(), Some(99.0));
}

#[test]
fn repeated_buy_is_idempotent() {
    let m = market(10, 42);
    m.next_buy_price();
    m.next_sell_price();
    let first = m.next_buy_price();
    let second = m.next_buy_price();
    assert_eq!(first, second);
    assert_eq!(first, Some(m.buy_prices(..).unwrap()[1]));
}

#[test]
fn repeated_sell_is_idempotent() {
    let m = market(10, 42);
    let a = m.next_sell_price();
    let b = m.next_sell_price();
    assert_eq!(a, b);
    assert_eq!(m.next_buy_price(), Some(100.0));
    // the pair is complete: the next read is day 1
    assert_eq!(m.next_sell_price(), Some(m.sell_prices(..).unwrap()[1]));
}

#[test]
fn incremental_matches_batch() {
    let batch = market(50, 7);
    let inc = market(50, 7);
    let buy = batch.buy_prices(..).unwrap();
    let sell = batch.sell_prices(..).unwrap();
    for day in 0..=50 {
        assert_eq!(inc.next_buy_price(), Some(buy[day]), "buy day {day}");
        assert_eq!(inc.next_sell_price(), Some(sell[day]), "sell day {day}");
    }
}

#[test]
fn interleaved_batch_reads_do_not_disturb_cursor() {
    let reference = market(30, 9).buy_prices(..).unwrap();
    let m = market(30, 9);
    for day in 0..=30 {
        if day % 7 == 0 {
            // batch reads in the middle of iteration see the same path
            assert_eq!(m.buy_prices(..day + 1).unwrap(), reference[..=day].to_vec());
        }
        assert_eq!(m.next_buy_price(), Some(reference[day]));
        m.next_sell_price();
    }
}

#[test]
fn cursor_reads_after_indicator_freeze() {
    let m = market(20, 3);
    let buy = m.buy_prices(..).unwrap();
    m.buy_sma(5, ..).unwrap();
    assert_eq!(m.next_buy_price(), Some(buy[0]));
    m.next_sell_price();
    assert_eq!(m.next_buy_price(), Some(buy[1]));
}

#[test]
fn exhausted_cursor_returns_none() {
    let m = market(3, 1);
    for _ in 0..=3 {
        assert!(m.next_buy_price().is_some());
        assert!(m.next_sell_price().is_some());
    }
    assert_eq!(m.next_buy_price(), None);
    assert_eq!(m.next_sell_price(), None);
    assert_eq!(m.next_buy_price(), None);
}
