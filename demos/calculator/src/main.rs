//! Offerdesk pricing calculator.
//!
//! Adjusts the persisted pricing scenario through the dotted-path adapter and
//! prints the resulting discount breakdown.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin offerdesk-calculator -- --order-value 75000 --lead-time 30 --pickup true
//! ```
//!
//! The scenario is stored under `$OFFERDESK_STATE_DIR` (default `.offerdesk`),
//! so later runs start from the last values. Pass `--reset` to start over.

mod config;

use clap::Parser;
use config::DemoConfig;
use offerdesk_core::environment::SystemClock;
use offerdesk_core::event_bus::STATE_CHANGED;
use offerdesk_legacy::LegacyAdapter;
use offerdesk_runtime::bus::InProcessEventBus;
use offerdesk_runtime::metrics::register_metrics;
use offerdesk_runtime::StoreConfig;
use offerdesk_store::{
    open_store, selectors, AppAction, AppEnvironment, CalculationUpdate, CalculatorAction,
    FileStorage,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "offerdesk-calculator", about = "Calculate offer discounts")]
struct Args {
    /// Order value in euros
    #[arg(long)]
    order_value: Option<f64>,
    /// Days between order and delivery
    #[arg(long)]
    lead_time: Option<f64>,
    /// Customer collects the goods
    #[arg(long)]
    pickup: Option<bool>,
    /// Customer is part of a chain
    #[arg(long)]
    chain: Option<bool>,
    /// Discard the persisted scenario first
    #[arg(long)]
    reset: bool,
}

fn main() -> anyhow::Result<()> {
    let config = DemoConfig::from_env()?;
    init_tracing(&config.log_filter);
    register_metrics();
    let args = Args::parse();

    info!(state_dir = %config.state_dir.display(), mode = ?config.mode, "Starting calculator");

    let storage = Arc::new(FileStorage::new(&config.state_dir));
    let environment = AppEnvironment::new(Arc::new(SystemClock)).with_mode(config.mode);
    let store = open_store(environment, storage, &StoreConfig::default());

    let bus = Arc::new(InProcessEventBus::default());
    let mut changes = bus.subscribe(&[STATE_CHANGED]);
    let adapter = LegacyAdapter::new(store.clone(), bus.clone());
    adapter.init(None)?;

    if args.reset {
        adapter.clear()?;
    }

    let inputs = [
        ("calculator.orderValue", args.order_value.map(|v| json!(v))),
        ("calculator.leadTime", args.lead_time.map(|v| json!(v))),
        ("calculator.pickup", args.pickup.map(|v| json!(v))),
        ("calculator.chain", args.chain.map(|v| json!(v))),
    ];
    for (path, value) in inputs {
        if let Some(value) = value {
            adapter.set(path, value)?;
        }
    }

    // A restored scenario has no breakdown until something recomputes it.
    store.send(AppAction::Calculator(CalculatorAction::UpdateCalculation(
        CalculationUpdate::Recompute,
    )))?;

    for event in changes.drain() {
        debug!(path = %event.payload["path"], value = %event.payload["newValue"], "State changed");
    }

    store.state(print_breakdown);
    store.shutdown()?;
    Ok(())
}

fn print_breakdown(state: &offerdesk_store::AppState) {
    let Some(result) = selectors::calculation(state) else {
        println!("No calculation available");
        return;
    };

    println!("Order value:     {:>12.2} EUR", result.order_value);
    println!("Lead time:       {:>12} days", result.lead_time);
    println!("Base discount:   {:>11} %", result.base_discount);
    println!("Early booking:   {:>11} %", result.early_discount);
    println!("Pickup:          {:>11} %", result.pickup_discount);
    println!("Chain:           {:>11} %", result.chain_discount);
    println!("Total discount:  {:>11} %", result.total_discount);
    println!("Discount amount: {:>12.2} EUR", result.discount_amount);
    println!("Final price:     {:>12.2} EUR", result.final_price);

    let computed = selectors::computed_values(state);
    println!("Savings / year:  {:>12.2} EUR", computed.savings_per_year);
}

fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
