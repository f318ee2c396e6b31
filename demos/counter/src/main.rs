//! Counter demo binary
//!
//! Walks through dispatch, batched notification, action sequences, derived
//! views and reducer composition.

use aredux_core::action::Dispatch;
use aredux_core::reducer::reducer_fn;
use aredux_runtime::{create_store, metrics::describe_metrics};
use counter_demo::{CounterAction, CounterReducer, dashboard_reducer};
use serde_json::{Value, json};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "counter=debug,aredux_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    describe_metrics();

    println!("=== Counter Demo: aredux ===\n");

    let store = create_store(CounterReducer)?;
    let subscription = store.subscribe(|state| {
        tracing::info!(count = state.count, "Observer notified");
    });
    println!("Initial count: {}", store.state(|s| s.count));

    // Plain actions apply immediately; the observer hears about them once
    println!("\n>>> Dispatching: Increment x3");
    for _ in 0..3 {
        store.dispatch(CounterAction::Increment).await?;
    }
    println!("Count right after dispatch: {}", store.state(|s| s.count));
    tokio::time::sleep(Duration::from_millis(1)).await;

    // Sequences apply element by element, with notifications in between
    println!("\n>>> Dispatching: countdown sequence");
    let countdown = async_stream::stream! {
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            yield CounterAction::Decrement;
        }
    };
    store.dispatch(Dispatch::sequence(countdown)).await?;
    println!("Count after countdown: {}", store.state(|s| s.count));

    // Reducer errors reach the dispatcher; state stays put
    println!("\n>>> Dispatching: Add(i64::MAX) then Add(1)");
    store.dispatch(CounterAction::Add(i64::MAX)).await?;
    if let Err(error) = store.dispatch(CounterAction::Add(1)).await {
        println!("Rejected: {error}");
    }
    store.dispatch(CounterAction::Reset).await?;

    subscription.unsubscribe()?;
    if let Err(error) = subscription.unsubscribe() {
        println!("Second unsubscribe: {error}");
    }

    // Derived view: renders only when the parity changes
    println!("\n>>> Connecting a parity view");
    let parity = store.connect(
        |state| state.count % 2 == 0,
        |even: &bool| println!("render: count is {}", if *even { "even" } else { "odd" }),
    );
    for _ in 0..4 {
        parity.dispatch(CounterAction::Add(2)).await?;
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    parity.dispatch(CounterAction::Increment).await?;
    tokio::time::sleep(Duration::from_millis(1)).await;
    drop(parity);

    // Dynamic actions: objects apply, anything else is rejected
    println!("\n>>> Dispatching JSON actions");
    let json_store = create_store(reducer_fn(|state: Option<&Value>, action: &Value| {
        let mut next = state.cloned().unwrap_or_else(|| json!({}));
        if action["type"] == "SET_FOO" {
            next["foo"] = action["foo"].clone();
        }
        Ok(next)
    }))?;
    json_store.dispatch(json!({"type": "SET_FOO", "foo": 2})).await?;
    println!("JSON state: {}", json_store.get_state());
    if let Err(error) = json_store.dispatch(json!(42)).await {
        println!("Rejected: {error}");
    }

    // Composition: one store, two independent counters
    println!("\n>>> Combining counters");
    let dashboard = create_store(dashboard_reducer()?)?;
    dashboard.dispatch(CounterAction::Add(5)).await?;
    println!("Dashboard: {:?}", dashboard.get_state());

    println!("\n=== Demo Complete ===");
    Ok(())
}
