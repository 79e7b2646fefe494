//! Coinsheets - Kraken and bitcoincharts market data CLI
//!
//! Sequential fetch-parse-format-output commands against two fixed REST APIs.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use coinsheets::adapters::bitcoincharts::{ChartsClient, ChartsConfig};
use coinsheets::adapters::cli::{
    BalanceCmd, CliApp, Command, DepthCmd, ExportCmd, OhlcCmd, OpenOrdersCmd, PairsCmd, SpreadCmd,
    TickerCmd, TimeCmd, TradeBalanceCmd, TradesCmd,
};
use coinsheets::adapters::kraken::{KrakenClient, KrakenConfig};
use coinsheets::config::{Config, Credentials};
use coinsheets::domain::ChartInterval;
use coinsheets::export::write_sheet;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present (credentials can live there instead of a file)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    init_logging(app.verbose, app.debug);

    match app.command {
        Command::Time(cmd) => time_command(cmd).await,
        Command::Pairs(cmd) => pairs_command(cmd).await,
        Command::Ticker(cmd) => ticker_command(cmd).await,
        Command::Ohlc(cmd) => ohlc_command(cmd).await,
        Command::Depth(cmd) => depth_command(cmd).await,
        Command::Trades(cmd) => trades_command(cmd).await,
        Command::Spread(cmd) => spread_command(cmd).await,
        Command::Balance(cmd) => balance_command(cmd).await,
        Command::TradeBalance(cmd) => trade_balance_command(cmd).await,
        Command::OpenOrders(cmd) => open_orders_command(cmd).await,
        Command::Export(cmd) => export_command(cmd).await,
    }
}

fn init_logging(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn kraken_client(config: &Config) -> Result<KrakenClient> {
    KrakenClient::with_config(KrakenConfig {
        api_base_url: config.kraken.api_url.clone(),
        ..KrakenConfig::default()
    })
    .context("Failed to create Kraken client")
}

/// Credentials from the `--credentials` override, or the environment, or
/// the configured two-line file.
fn resolve_credentials(override_path: Option<&Path>, config: &Config) -> Result<Credentials> {
    match override_path {
        Some(path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy().into_owned()).to_string();
            Credentials::from_file(&expanded)
                .with_context(|| format!("Failed to load credentials from {expanded}"))
        }
        None => Credentials::resolve(&config.kraken.credentials_path)
            .context("Failed to load Kraken credentials"),
    }
}

async fn time_command(cmd: TimeCmd) -> Result<()> {
    let config = Config::load_or_default(&cmd.config)?;
    let client = kraken_client(&config)?;

    let time = client
        .server_time()
        .await
        .context("Failed to fetch server time")?;

    println!("unixtime: {}", time.unixtime);
    println!("rfc1123:  {}", time.rfc1123);
    if let Some(datetime) = time.datetime() {
        println!("utc:      {}", datetime.format("%Y-%m-%d %H:%M:%S"));
    }
    Ok(())
}

async fn pairs_command(cmd: PairsCmd) -> Result<()> {
    let config = Config::load_or_default(&cmd.config)?;
    let client = kraken_client(&config)?;

    if cmd.check {
        let exists = client
            .pair_exists(&cmd.pair)
            .await
            .context("Failed to check asset pair")?;
        println!("{}: {}", cmd.pair, if exists { "exists" } else { "unknown" });
        return Ok(());
    }

    let pairs = client
        .asset_pairs(&cmd.pair)
        .await
        .context("Failed to fetch asset pairs")?;

    for (name, pair) in &pairs {
        println!("{name}");
        if let Some(ref altname) = pair.altname {
            println!("  altname:        {altname}");
        }
        if let (Some(base), Some(quote)) = (&pair.base, &pair.quote) {
            println!("  base/quote:     {base}/{quote}");
        }
        if let Some(decimals) = pair.pair_decimals {
            println!("  pair decimals:  {decimals}");
        }
        if let Some(decimals) = pair.lot_decimals {
            println!("  lot decimals:   {decimals}");
        }
        if !pair.leverage_buy.is_empty() {
            println!("  leverage (buy): {:?}", pair.leverage_buy);
        }
        if let Some(first) = pair.fees.first() {
            println!("  taker fee:      {:?}", first);
        }
        if let Some(call) = pair.margin_call {
            println!("  margin call:    {call}");
        }
    }
    Ok(())
}

async fn ticker_command(cmd: TickerCmd) -> Result<()> {
    let config = Config::load_or_default(&cmd.config)?;
    let client = kraken_client(&config)?;

    if cmd.json {
        let renamed = client
            .ticker_renamed(&cmd.pair)
            .await
            .context("Failed to fetch ticker")?;
        println!("{}", serde_json::to_string_pretty(&renamed)?);
        return Ok(());
    }

    let tickers = client
        .ticker(&cmd.pair)
        .await
        .context("Failed to fetch ticker")?;

    for (name, ticker) in &tickers {
        println!("{name}");
        println!("  ask:             {} ({})", ticker.ask[0], ticker.ask[2]);
        println!("  bid:             {} ({})", ticker.bid[0], ticker.bid[2]);
        println!("  last trade:      {} ({})", ticker.last_trade[0], ticker.last_trade[1]);
        println!("  volume (24h):    {}", ticker.volume[1]);
        println!("  vwap (24h):      {}", ticker.weighted_volume[1]);
        println!("  trades (24h):    {}", ticker.trade_nb[1]);
        println!("  low/high (24h):  {}/{}", ticker.low[1], ticker.high[1]);
        println!("  open:            {}", ticker.open);
    }
    Ok(())
}

async fn ohlc_command(cmd: OhlcCmd) -> Result<()> {
    let config = Config::load_or_default(&cmd.config)?;
    let client = kraken_client(&config)?;

    let result = client
        .ohlc(&cmd.pair, cmd.interval, cmd.since)
        .await
        .context("Failed to fetch OHLC data")?;

    for (name, candles) in &result.pairs {
        println!("{name} ({} candles, {}m interval)", candles.len(), cmd.interval);
        println!("time,open,high,low,close,vwap,volume,count");
        for candle in candles {
            println!(
                "{},{},{},{},{},{},{},{}",
                candle.time,
                candle.open,
                candle.high,
                candle.low,
                candle.close,
                candle.vwap,
                candle.volume,
                candle.count
            );
        }
    }
    if let Some(last) = result.last {
        println!("last: {last}");
    }
    Ok(())
}

async fn depth_command(cmd: DepthCmd) -> Result<()> {
    let config = Config::load_or_default(&cmd.config)?;
    let client = kraken_client(&config)?;

    let book = client
        .order_book(&cmd.pair, cmd.count)
        .await
        .context("Failed to fetch order book")?;

    println!("{} asks (price, volume, time):", cmd.pair);
    for entry in &book.asks {
        println!("  {}, {}, {}", entry.price, entry.volume, entry.timestamp);
    }
    println!("{} bids (price, volume, time):", cmd.pair);
    for entry in &book.bids {
        println!("  {}, {}, {}", entry.price, entry.volume, entry.timestamp);
    }
    Ok(())
}

async fn trades_command(cmd: TradesCmd) -> Result<()> {
    let config = Config::load_or_default(&cmd.config)?;
    let client = kraken_client(&config)?;

    let result = client
        .recent_trades(&cmd.pair, cmd.since.as_deref())
        .await
        .context("Failed to fetch recent trades")?;

    println!("{} ({} trades)", cmd.pair, result.trades.len());
    println!("price,volume,time,side,type,misc");
    for trade in &result.trades {
        println!(
            "{},{},{},{},{},{}",
            trade.price,
            trade.volume,
            trade.time,
            trade.side.as_deref().unwrap_or("-"),
            trade.order_kind.as_deref().unwrap_or("-"),
            trade.misc
        );
    }
    if let Some(ref last) = result.last {
        println!("last: {last}");
    }
    Ok(())
}

async fn spread_command(cmd: SpreadCmd) -> Result<()> {
    let config = Config::load_or_default(&cmd.config)?;
    let client = kraken_client(&config)?;

    let result = client
        .recent_spread(&cmd.pair, cmd.since)
        .await
        .context("Failed to fetch recent spread")?;

    println!("{} ({} samples)", cmd.pair, result.spreads.len());
    println!("time,bid,ask");
    for spread in &result.spreads {
        println!("{},{},{}", spread.time, spread.bid, spread.ask);
    }
    if let Some(last) = result.last {
        println!("last: {last}");
    }
    Ok(())
}

async fn balance_command(cmd: BalanceCmd) -> Result<()> {
    let config = Config::load_or_default(&cmd.config)?;
    let credentials = resolve_credentials(cmd.credentials.as_deref(), &config)?;
    let client = kraken_client(&config)?.with_credentials(credentials);

    let balances = client
        .account_balance()
        .await
        .context("Failed to fetch account balance")?;

    if balances.is_empty() {
        println!("No balances");
        return Ok(());
    }

    let mut assets: Vec<_> = balances.iter().collect();
    assets.sort_by_key(|(asset, _)| asset.as_str());
    for (asset, amount) in assets {
        println!("{asset}: {amount}");
    }
    Ok(())
}

async fn trade_balance_command(cmd: TradeBalanceCmd) -> Result<()> {
    let config = Config::load_or_default(&cmd.config)?;
    let credentials = resolve_credentials(cmd.credentials.as_deref(), &config)?;
    let client = kraken_client(&config)?.with_credentials(credentials);

    let balance = client
        .trade_balance(cmd.asset.as_deref())
        .await
        .context("Failed to fetch trade balance")?;

    println!("equivalent balance: {}", balance.equivalent_balance);
    println!("trade balance:      {}", balance.trade_balance);
    if let Some(ref margin) = balance.margin {
        println!("margin:             {margin}");
    }
    if let Some(ref pnl) = balance.unrealized_pnl {
        println!("unrealized p/l:     {pnl}");
    }
    if let Some(ref equity) = balance.equity {
        println!("equity:             {equity}");
    }
    if let Some(ref free) = balance.free_margin {
        println!("free margin:        {free}");
    }
    if let Some(ref level) = balance.margin_level {
        println!("margin level:       {level}");
    }
    Ok(())
}

async fn open_orders_command(cmd: OpenOrdersCmd) -> Result<()> {
    let config = Config::load_or_default(&cmd.config)?;
    let credentials = resolve_credentials(cmd.credentials.as_deref(), &config)?;
    let client = kraken_client(&config)?.with_credentials(credentials);

    let orders = client
        .open_orders()
        .await
        .context("Failed to fetch open orders")?;

    if orders.open.is_empty() {
        println!("No open orders");
        return Ok(());
    }

    for (txid, order) in &orders.open {
        println!("{txid}: {}", serde_json::to_string(order)?);
    }
    Ok(())
}

async fn export_command(cmd: ExportCmd) -> Result<()> {
    let config = Config::load_or_default(&cmd.config)?;

    let markets = if cmd.markets.is_empty() {
        config.charts.markets.clone()
    } else {
        cmd.markets.clone()
    };

    let interval_name = cmd
        .interval
        .clone()
        .unwrap_or_else(|| config.charts.interval.clone());
    let Some(interval) = ChartInterval::from_name(&interval_name) else {
        bail!(
            "'{}' is not a documented interval name (expected one of: {})",
            interval_name,
            ChartInterval::ALL
                .iter()
                .map(|i| i.as_param())
                .collect::<Vec<_>>()
                .join(", ")
        );
    };

    let days = cmd.days.or(config.charts.days);
    let out_dir: PathBuf = match cmd.out_dir {
        Some(dir) => dir,
        None => PathBuf::from(shellexpand::tilde(&config.export.output_dir).into_owned()),
    };

    let client = ChartsClient::with_config(ChartsConfig {
        api_url: config.charts.api_url.clone(),
        ..ChartsConfig::default()
    })
    .context("Failed to create charts client")?;

    // One sequential fetch per market; a failed symbol is logged and the
    // loop moves on to the next one.
    let mut written = 0usize;
    for market in &markets {
        tracing::info!(market = %market, interval = %interval, "fetching chart history");
        let rows = match client.fetch_history(market, interval, days).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(market = %market, error = %e, "skipping market");
                continue;
            }
        };

        let path = write_sheet(&out_dir, market, &rows)
            .with_context(|| format!("Failed to write spreadsheet for {market}"))?;
        println!("{market}: {} rows -> {}", rows.len(), path.display());
        written += 1;
    }

    if written == 0 {
        bail!("no spreadsheets written ({} markets attempted)", markets.len());
    }
    Ok(())
}
