//! PriceLab CLI: generate, sweep, and summarize synthetic price scenarios.
//!
//! Commands:
//! - `generate` writes one scenario's prices and configured indicators as CSV
//! - `sweep` runs a scenario across a seed range in parallel
//! - `summary` prints the schedule and per-side price statistics

use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pricelab_core::indicators::{IndicatorKey, IndicatorKind};
use pricelab_core::path::PriceSeries;
use pricelab_core::{IndicatorSelection, MarketData, Scenario, Side};
use rayon::prelude::*;
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "pricelab",
    about = "PriceLab CLI: regime-driven synthetic bid/ask price paths"
)]
struct Cli {
    /// Raise the default log level (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a price path and write it, with indicators, as CSV.
    Generate {
        /// Path to a TOML scenario file.
        #[arg(long)]
        config: PathBuf,

        /// Override the scenario's seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Output CSV file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run a scenario once per seed and summarize each run.
    Sweep {
        /// Path to a TOML scenario file.
        #[arg(long)]
        config: PathBuf,

        /// Half-open seed range, e.g. `0..100`.
        #[arg(long, value_parser = parse_seed_range)]
        seeds: Range<u64>,

        /// Also write the summary rows as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Print the regime schedule and start/end/min/max per side.
    Summary {
        /// Path to a TOML scenario file.
        #[arg(long)]
        config: PathBuf,

        /// Override the scenario's seed.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            config,
            seed,
            output,
        } => run_generate(&config, seed, output.as_deref()),
        Commands::Sweep {
            config,
            seeds,
            json,
        } => run_sweep(&config, seeds, json.as_deref()),
        Commands::Summary { config, seed } => run_summary(&config, seed),
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    Scenario::from_file(path).with_context(|| format!("loading {}", path.display()))
}

fn run_generate(config: &Path, seed: Option<u64>, output: Option<&Path>) -> Result<()> {
    let scenario = load_scenario(config)?;
    let market = scenario.build_with_seed(seed.or(scenario.seed))?;
    tracing::info!(seed = market.seed(), days = market.total_days(), "generating");

    let columns = collect_columns(&market, &scenario.indicators)?;
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_csv(file, &columns)?;
            eprintln!("Wrote {} rows to {}", market.len(), path.display());
        }
        None => write_csv(std::io::stdout().lock(), &columns)?,
    }
    Ok(())
}

/// A named CSV column. The first column is the day index.
struct Column {
    name: String,
    values: Vec<f64>,
}

impl Column {
    fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

fn collect_columns(market: &MarketData, selection: &IndicatorSelection) -> Result<Vec<Column>> {
    let series = market.series();
    let mut columns = vec![
        Column::new("buy", series.buy().to_vec()),
        Column::new("sell", series.sell().to_vec()),
    ];

    let line_kinds: Vec<IndicatorKind> = selection
        .sma
        .iter()
        .map(|&period| IndicatorKind::Sma { period })
        .chain(selection.ema.iter().map(|&period| IndicatorKind::Ema { period }))
        .chain(selection.rsi.iter().map(|&period| IndicatorKind::Rsi { period }))
        .collect();

    for side in [Side::Buy, Side::Sell] {
        for &kind in &line_kinds {
            let Some(indicator) = kind.line_indicator()? else {
                continue;
            };
            let output = market.indicator(IndicatorKey::new(side, kind))?;
            let values = output
                .as_line()
                .with_context(|| format!("{} is not a single line", indicator.name()))?;
            columns.push(Column::new(format!("{side}_{}", indicator.name()), values.to_vec()));
        }
        if selection.macd {
            let m = market.macd(side, selection.macd_params, ..)?;
            columns.push(Column::new(format!("{side}_macd"), m.macd));
            columns.push(Column::new(format!("{side}_macd_signal"), m.signal));
            columns.push(Column::new(format!("{side}_macd_hist"), m.histogram));
        }
        if selection.bollinger {
            let b = market.bollinger(side, selection.bollinger_params, ..)?;
            columns.push(Column::new(format!("{side}_boll_upper"), b.upper));
            columns.push(Column::new(format!("{side}_boll_middle"), b.middle));
            columns.push(Column::new(format!("{side}_boll_lower"), b.lower));
        }
    }
    if selection.atr {
        let period = selection.atr_period();
        columns.push(Column::new(format!("atr_{period}"), market.atr(period, ..)?));
    }
    Ok(columns)
}

/// Write `day` plus every column; NaN warmup cells become empty fields.
fn write_csv<W: Write>(out: W, columns: &[Column]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["day".to_string()];
    header.extend(columns.iter().map(|c| c.name.clone()));
    writer.write_record(&header)?;

    let rows = columns.first().map_or(0, |c| c.values.len());
    for day in 0..rows {
        let mut record = vec![day.to_string()];
        for column in columns {
            let value = column.values[day];
            record.push(if value.is_nan() {
                String::new()
            } else {
                value.to_string()
            });
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// One sweep result: a single seed's buy-side outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct SeedSummary {
    seed: u64,
    final_buy: f64,
    final_sell: f64,
    min_buy: f64,
    max_buy: f64,
    max_drawdown: f64,
}

fn summarize_seed(scenario: &Scenario, seed: u64) -> Result<SeedSummary> {
    let market = scenario.build_with_seed(Some(seed))?;
    let series = market.series();
    let (min_buy, max_buy) = min_max(series.buy());
    let last = series.last().context("empty price series")?;
    Ok(SeedSummary {
        seed,
        final_buy: last.buy,
        final_sell: last.sell,
        min_buy,
        max_buy,
        max_drawdown: max_drawdown(series.buy()),
    })
}

fn run_sweep(config: &Path, seeds: Range<u64>, json: Option<&Path>) -> Result<()> {
    if seeds.is_empty() {
        bail!("seed range {}..{} is empty", seeds.start, seeds.end);
    }
    let scenario = load_scenario(config)?;
    // Fail on a bad schedule once instead of once per seed.
    scenario.assignments()?;

    tracing::info!(runs = seeds.end - seeds.start, "sweeping");
    let rows: Vec<SeedSummary> = seeds
        .into_par_iter()
        .map(|seed| summarize_seed(&scenario, seed))
        .collect::<Result<_>>()?;

    println!(
        "{:>8} {:>12} {:>12} {:>12} {:>12} {:>9}",
        "Seed", "Final buy", "Final sell", "Min buy", "Max buy", "Max DD"
    );
    println!("{}", "-".repeat(70));
    for row in &rows {
        println!(
            "{:>8} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>8.2}%",
            row.seed,
            row.final_buy,
            row.final_sell,
            row.min_buy,
            row.max_buy,
            row.max_drawdown * 100.0
        );
    }

    if let Some(path) = json {
        let file =
            std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &rows)?;
        println!("Summary saved to: {}", path.display());
    }
    Ok(())
}

fn run_summary(config: &Path, seed: Option<u64>) -> Result<()> {
    let scenario = load_scenario(config)?;
    let market = scenario.build_with_seed(seed.or(scenario.seed))?;
    let series = market.series();

    println!("Seed: {}", market.seed());
    println!("Total days: {}", market.total_days());
    println!("Quotes: {}", market.len());
    println!();
    println!("{:<4} {:<26} {:>8} {:>8}", "#", "Regime", "Start", "End");
    println!("{}", "-".repeat(49));
    for (i, a) in market.assignments().iter().enumerate() {
        println!(
            "{:<4} {:<26} {:>8} {:>8}",
            i,
            a.regime.name(),
            a.start_day,
            a.end_day
        );
    }

    println!();
    println!("{:<6} {:>12} {:>12} {:>12} {:>12}", "Side", "Start", "End", "Min", "Max");
    println!("{}", "-".repeat(58));
    for side in [Side::Buy, Side::Sell] {
        let prices = series.side(side);
        let (min, max) = min_max(prices);
        let start = prices.first().copied().unwrap_or(f64::NAN);
        let end = prices.last().copied().unwrap_or(f64::NAN);
        println!("{side:<6} {start:>12.4} {end:>12.4} {min:>12.4} {max:>12.4}");
    }

    let first = series.quote(0).context("empty price series")?;
    let last = series.last().context("empty price series")?;
    let (min_spread, max_spread) = min_max(&spreads(&series));
    println!("{:<6} {:>12.4} {:>12.4}", "Mid", first.mid(), last.mid());
    println!(
        "{:<6} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
        "Spread",
        first.spread(),
        last.spread(),
        min_spread,
        max_spread
    );
    Ok(())
}

/// Buy minus sell for every quote in the series.
fn spreads(series: &PriceSeries) -> Vec<f64> {
    (0..series.len())
        .filter_map(|day| series.quote(day))
        .map(|quote| quote.spread())
        .collect()
}

fn parse_seed_range(s: &str) -> Result<Range<u64>, String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{s}'"))?;
    let start: u64 = start
        .trim()
        .parse()
        .map_err(|e| format!("invalid start '{start}': {e}"))?;
    let end: u64 = end
        .trim()
        .parse()
        .map_err(|e| format!("invalid end '{end}': {e}"))?;
    if start > end {
        return Err(format!("start ({start}) must be <= end ({end})"));
    }
    Ok(start..end)
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Largest peak-to-trough decline as a fraction of the peak.
fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &v in values {
        peak = peak.max(v);
        if peak > 0.0 {
            worst = worst.max((peak - v) / peak);
        }
    }
    worst
}
