//! Concurrent access to one market shared through `Arc`.

use std::sync::{Arc, Barrier};
use std::thread;

use pricelab_core::{BollingerParams, MacdParams, MarketData, Quote, Regime, RegimeAssignment};

const THREADS: usize = 8;

fn market(seed: u64) -> MarketData {
    MarketData::new(
        100.0,
        99.0,
        vec![
            RegimeAssignment::new(Regime::gbm(0.0005, 0.02).unwrap(), 0, 300),
            RegimeAssignment::new(Regime::jump_diffusion(0.0, 0.02, 0.1, 0.05).unwrap(), 150, 250),
        ],
        Some(seed),
    )
    .unwrap()
}

fn same(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

#[test]
fn concurrent_batch_reads_see_one_path() {
    let reference = market(42).buy_prices(..).unwrap();
    let shared = Arc::new(market(42));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let m = Arc::clone(&shared);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                // each thread forces generation to a different depth first
                let end = 30 * (i + 1);
                let head = m.buy_prices(..end).unwrap();
                let full = m.buy_prices(..).unwrap();
                (head, full)
            })
        })
        .collect();

    for (i, h) in handles.into_iter().enumerate() {
        let (head, full) = h.join().unwrap();
        assert_eq!(head, reference[..30 * (i + 1)].to_vec());
        assert_eq!(full, reference);
    }
}

#[test]
fn concurrent_indicator_requests_compute_once() {
    let shared = Arc::new(market(7));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let m = Arc::clone(&shared);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let sma = m.buy_sma(20, ..).unwrap();
                let macd = m.sell_macd(MacdParams::default(), ..).unwrap();
                let boll = m.buy_bollinger(BollingerParams::default(), ..).unwrap();
                let atr = m.atr(14, ..).unwrap();
                (sma, macd, boll, atr)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let (sma0, macd0, boll0, atr0) = &results[0];
    for (sma, macd, boll, atr) in &results[1..] {
        assert!(same(sma, sma0));
        assert!(same(&macd.histogram, &macd0.histogram));
        assert!(same(&boll.upper, &boll0.upper));
        assert!(same(atr, atr0));
    }
    assert_eq!(shared.cached_indicators(), 4);
}

#[test]
fn indicator_arcs_are_shared() {
    use pricelab_core::indicators::{IndicatorKey, IndicatorKind};
    use pricelab_core::Side;

    let shared = Arc::new(market(11));
    let key = IndicatorKey::new(Side::Buy, IndicatorKind::Rsi { period: 14 });
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let m = Arc::clone(&shared);
            thread::spawn(move || m.indicator(key).unwrap())
        })
        .collect();
    let outputs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for out in &outputs[1..] {
        assert!(Arc::ptr_eq(out, &outputs[0]));
    }
}

#[test]
fn concurrent_cursor_reads_are_serialized() {
    let m = market(5);
    let buy = m.buy_prices(..).unwrap();
    let sell = m.sell_prices(..).unwrap();
    let shared = Arc::new(market(5));
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let m = Arc::clone(&shared);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut seen = Vec::new();
                while let Some(quote) = m.next_quote() {
                    seen.push(quote);
                }
                seen
            })
        })
        .collect();
    let per_thread: Vec<Vec<Quote>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // map every read back to its day; GBM prices on distinct days differ
    let day_of = |q: &Quote| {
        (0..buy.len())
            .find(|&d| buy[d].to_bits() == q.buy.to_bits() && sell[d].to_bits() == q.sell.to_bits())
            .unwrap_or_else(|| panic!("quote {q:?} is not on the path"))
    };

    let mut days = Vec::new();
    for seen in &per_thread {
        let mine: Vec<usize> = seen.iter().map(day_of).collect();
        assert!(mine.windows(2).all(|w| w[0] < w[1]), "out of order: {mine:?}");
        days.extend(mine);
    }
    days.sort_unstable();
    assert_eq!(days, (0..buy.len()).collect::<Vec<_>>(), "missing or repeated days");
    assert_eq!(shared.next_quote(), None);
}
