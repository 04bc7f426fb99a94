//! Command line quoter: loads a pool snapshot and prints the best trades.
//!
//! Run with: `cargo run -p quoter -- --snapshot crates/quoter/snapshot.example.toml
//! --token-in USDC --token-out WBTC --amount 2500`

use amm::{
    Amount, ConstantProduct, Percent, Rounding, Router, RouterConfig, SwapCurve, Trade,
    WeightedProduct,
};
use clap::{Parser, ValueEnum};
use quoter::{DecimalsCache, DecimalsResolver, PoolLoader, Snapshot};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Sell exactly `amount` of the input token.
    ExactIn,
    /// Buy exactly `amount` of the output token.
    ExactOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Curve {
    ConstantProduct,
    Weighted,
}

#[derive(Debug, Parser)]
#[clap(about = "Quote multi-hop swaps over a pool snapshot")]
struct Cli {
    /// TOML snapshot with tokens, pools and reserves.
    #[clap(long, env = "QUOTER_SNAPSHOT")]
    snapshot: PathBuf,

    /// Input token, by symbol or address.
    #[clap(long)]
    token_in: String,

    /// Output token, by symbol or address.
    #[clap(long)]
    token_out: String,

    /// Human readable amount, e.g. `1.5`.
    #[clap(long)]
    amount: String,

    #[clap(long, value_enum, default_value = "exact-in")]
    mode: Mode,

    /// Force one swap invariant for every pool instead of picking it from
    /// each pool's weight.
    #[clap(long, value_enum, env = "QUOTER_CURVE")]
    curve: Option<Curve>,

    /// Maximum number of pools in a route.
    #[clap(long, env = "QUOTER_MAX_HOPS", default_value = "3")]
    max_hops: usize,

    /// Maximum number of trades printed.
    #[clap(long, env = "QUOTER_MAX_RESULTS", default_value = "3")]
    max_results: usize,

    /// Slippage tolerance in basis points.
    #[clap(long, env = "QUOTER_SLIPPAGE_BPS", default_value = "50")]
    slippage_bps: u32,
}

fn main() -> eyre::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let snapshot = Snapshot::load(&cli.snapshot)?;
    info!(
        path = %cli.snapshot.display(),
        chain_id = snapshot.chain_id,
        tokens = snapshot.tokens.len(),
        pools = snapshot.pools.len(),
        "loaded snapshot"
    );

    let tokens = snapshot.tokens()?;
    let source = snapshot.source()?;
    let decimals = tokens.iter().fold(
        DecimalsResolver::new(source.clone(), Arc::new(DecimalsCache::new())),
        |resolver, token| resolver.with_override(token.chain_id, token.address, token.decimals),
    );
    let mut loader = PoolLoader::new(snapshot.chain_id, snapshot.deriver()?, decimals, source);
    if let Some(curve) = cli.curve {
        let curve: Arc<dyn SwapCurve> = match curve {
            Curve::ConstantProduct => Arc::new(ConstantProduct),
            Curve::Weighted => Arc::new(WeightedProduct),
        };
        loader = loader.with_curve(curve);
    }
    for token in tokens {
        loader.register(token);
    }

    let config = RouterConfig::default()
        .with_max_hops(cli.max_hops)
        .with_max_num_results(cli.max_results);
    let mut router = Router::with_config(config);
    for entry in &snapshot.pools {
        let loaded = entry
            .token_addresses()
            .and_then(|(a, b)| loader.load(a, b, entry.weight, entry.fee_bps));
        match loaded {
            Ok(pool) => {
                router.add_pool(pool);
            }
            Err(err) => {
                warn!(token_a = %entry.token_a, token_b = %entry.token_b, %err, "skipping pool");
            }
        }
    }
    info!(pools = router.len(), "router ready");

    let token_in = snapshot.find_token(&cli.token_in)?;
    let token_out = snapshot.find_token(&cli.token_out)?;
    let trades = match cli.mode {
        Mode::ExactIn => {
            let amount_in = Amount::parse(token_in, &cli.amount)?;
            router.best_trade_exact_in(&amount_in, &token_out)?
        }
        Mode::ExactOut => {
            let amount_out = Amount::parse(token_out, &cli.amount)?;
            router.best_trade_exact_out(&token_in, &amount_out)?
        }
    };

    if trades.is_empty() {
        warn!("no route found");
        return Ok(());
    }

    let slippage = Percent::from_bps(cli.slippage_bps);
    for (rank, trade) in trades.iter().enumerate() {
        print_trade(rank + 1, trade, &slippage)?;
    }
    Ok(())
}

fn print_trade(rank: usize, trade: &Trade, slippage: &Percent) -> eyre::Result<()> {
    println!("#{rank} {} ({} hops)", trade.route(), trade.hops());
    println!("    in:        {}", trade.input_amount());
    println!("    out:       {}", trade.output_amount());
    println!("    price:     {}", trade.execution_price());
    println!(
        "    impact:    {}%",
        trade.price_impact().to_fixed(2, Rounding::HalfUp)
    );
    println!(
        "    min out:   {} ({slippage} slippage)",
        trade.minimum_amount_out(slippage)?
    );
    println!("    max in:    {}", trade.maximum_amount_in(slippage)?);
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quoter=info,amm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
