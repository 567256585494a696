//! Counter example binary
//!
//! Reads JSON actions, one per argument or one per stdin line, and dispatches
//! them through a store:
//!
//! ```text
//! counter '{"type":"counter/increment","payload":5}' '{"type":"counter/reset"}'
//! echo '{"type":"counter/decrement","payload":2}' | counter
//! ```

use casefold_runtime::Store;
use counter::{counter_reducer, decode_action};
use std::io::BufRead;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "counter=debug,casefold_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = Store::new(counter_reducer());
    println!("Initial count: {}", store.select(|s| s.count));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let lines: Box<dyn Iterator<Item = std::io::Result<String>>> = if args.is_empty() {
        Box::new(std::io::stdin().lock().lines())
    } else {
        Box::new(args.into_iter().map(Ok))
    };

    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let action = match decode_action(&line) {
            Ok(action) => action,
            Err(error) => {
                tracing::warn!(%line, error = %format!("{error:#}"), "Skipping undecodable action");
                continue;
            },
        };

        println!("\n>>> Dispatching: {line}");
        match store.dispatch(action) {
            Ok(state) => println!("Count: {} (history: {:?})", state.count, state.history),
            Err(error) => tracing::error!(%error, "Dispatch failed"),
        }
    }

    println!(
        "\nFinal count: {} after {} dispatches",
        store.select(|s| s.count),
        store.dispatch_count()
    );
    Ok(())
}
