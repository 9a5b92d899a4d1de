// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pair Sniper Bot - buys freshly listed PancakeSwap pairs and sells them at a profit.

mod config;
mod error;
mod executor;
mod listeners;
mod market;
mod position;
mod rpc;
mod strategies;
mod trade_history;
mod validators;

use alloy::primitives::utils::format_ether;
use alloy::primitives::Address;
use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use config::Config;
use executor::TradeExecutor;
use listeners::{spawn_listener, PairCreatedListener, ProcessedSet};
use market::MarketReader;
use position::{spawn_monitor, PositionMonitor, PositionTracker, SellPolicy};
use rpc::{create_provider, AlloyChain, Chain, RpcConfig};
use strategies::Sniper;
use trade_history::TradeJournal;
use validators::SafetyChecker;

use std::sync::Arc;
use tokio::signal;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pair-sniper", about = "Snipes new PancakeSwap pairs")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the safety checks and a price quote against one token without trading.
    Check { token: Address },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load config")?;

    let (provider, wallet) = create_provider(&RpcConfig::from(&config))?;
    let chain = Arc::new(
        AlloyChain::new(provider, wallet, config.router_address, config.factory_address).await?,
    );
    info!("✅ Connected to BSC RPC");

    match cli.command {
        Some(Command::Check { token }) => check_token(chain, &config, token).await,
        None => run(chain, config).await,
    }
}

async fn run<C: Chain + 'static>(chain: Arc<C>, config: Config) -> anyhow::Result<()> {
    info!("🚀 Pair Sniper Bot starting...");
    info!("📡 RPC: {}", config.rpc_url);
    info!("📡 WS:  {}", config.ws_url);
    info!("👛 Wallet: {:?}", chain.wallet_address());
    info!("💰 Buy amount: {} BNB", format_ether(config.buy_amount));
    info!(
        "📈 Profit target: {:.2}x, slippage: {}%",
        config.profit_threshold,
        config.slippage * 100.0
    );

    let market = Arc::new(MarketReader::new(chain.clone(), config.wbnb_address));
    market.log_gas_price().await;

    let journal = Arc::new(TradeJournal::new());
    let executor = Arc::new(TradeExecutor::new(
        chain.clone(),
        market,
        journal.clone(),
        &config,
    ));
    let policy = SellPolicy::from_config(&config);
    let positions = Arc::new(Mutex::new(PositionTracker::new(policy.schedule())));

    let monitor = Arc::new(PositionMonitor::new(
        executor.clone(),
        positions.clone(),
        policy,
    ));
    let _monitor_handle = spawn_monitor(monitor);

    let safety = SafetyChecker::new(chain.clone(), config.wbnb_address, config.min_liquidity);
    let sniper = Arc::new(Sniper::new(safety, executor, positions.clone()));

    let processed = Arc::new(ProcessedSet::new());
    let (pair_tx, mut pair_rx) = mpsc::channel(100);
    let _listener_handle = spawn_listener(PairCreatedListener::new(
        config.ws_url.clone(),
        config.factory_address,
        config.wbnb_address,
        processed.clone(),
        pair_tx,
    ));

    info!("👂 Listening for new pairs on {:?}", config.factory_address);

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("🛑 Shutdown signal received ({} token(s) processed)", processed.len());
                let open = positions.lock().await.len();
                if open > 0 {
                    warn!("{} open position(s) will not be tracked after exit", open);
                }
                journal.log_summary();
                break;
            }

            new_pair = pair_rx.recv() => {
                let Some(new_pair) = new_pair else {
                    error!("❌ Pair event stream ended");
                    journal.log_summary();
                    return Err(anyhow!("pair event stream ended"));
                };

                let sniper = sniper.clone();
                tokio::spawn(async move {
                    sniper.snipe(new_pair).await;
                });
            }
        }
    }

    info!("👋 Goodbye!");
    Ok(())
}

async fn check_token<C: Chain>(chain: Arc<C>, config: &Config, token: Address) -> anyhow::Result<()> {
    info!("🧪 Checking {:?}", token);

    let safety = SafetyChecker::new(chain.clone(), config.wbnb_address, config.min_liquidity);
    let market = MarketReader::new(chain.clone(), config.wbnb_address);

    match safety.is_sellable(token).await {
        Ok(true) => info!("✅ Sell simulation passed"),
        Ok(false) => warn!("❌ Sell simulation failed: likely honeypot"),
        Err(e) => error!("❓ Could not run sell simulation: {}", e),
    }

    let pair = chain.pair_for(token, config.wbnb_address).await?;
    if pair == Address::ZERO {
        warn!("❌ No WBNB pair for {:?}", token);
        return Ok(());
    }
    info!("🔗 Pair: {:?}", pair);

    match safety.check_liquidity(token, pair).await {
        Ok(true) => info!("✅ Liquidity above minimum"),
        Ok(false) => warn!("❌ Liquidity below minimum"),
        Err(e) => error!("❓ Could not read reserves: {}", e),
    }

    match market.token_price(token).await {
        Ok(price) => info!("📊 Price: {} WBNB per token", price),
        Err(e) => error!("❓ Could not quote price: {}", e),
    }

    match market.check_balance(token).await {
        Ok(balance) => info!("👛 Wallet holds {}", balance.as_f64()),
        Err(e) => warn!("Could not read balance: {}", e),
    }

    Ok(())
}
