//! Traffic Light
//!
//! This example drives a cyclic graph through a few full cycles.
//!
//! Key concepts:
//! - One shared definition, two independent instances
//! - Async transition actions and enter/leave hooks
//! - Pre/post transition hooks observing every transit
//! - Per-call payload threaded through all hooks
//! - Rejection of a second transit while one is in flight
//!
//! Run with: RUST_LOG=transit_fsm=debug cargo run --example traffic_light

use futures::FutureExt;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use stillwater::validation::Validation;
use tracing_subscriber::EnvFilter;
use transit_fsm::{Definition, Hook, Node, Payload, TransitError};

fn cycles(payload: &Payload) -> u64 {
    payload.get("cycles").and_then(|c| c.as_u64()).unwrap_or(0)
}

fn switch_lamp(after: Duration) -> Hook<Payload> {
    Hook::new(move |node, transition, _payload: &mut Payload| {
        let label = format!("{} -> {}", node.name(), transition.target());
        async move {
            tokio::time::sleep(after).await;
            println!("  switching {label}");
            Ok(())
        }
        .boxed()
    })
}

fn build() -> anyhow::Result<Arc<Definition<Payload>>> {
    let definition = Arc::new(Definition::new());

    definition
        .node("Red")?
        .transition("go", "Green", switch_lamp(Duration::from_millis(30)))?
        .on_enter(Hook::from_fn(|_, _, payload: &mut Payload| {
            let next = cycles(payload) + 1;
            payload.insert("cycles".to_string(), json!(next));
            Ok(())
        }));
    definition
        .node("Green")?
        .transition("caution", "Yellow", switch_lamp(Duration::from_millis(10)))?;
    definition
        .node("Yellow")?
        .transition("stop", "Red", switch_lamp(Duration::from_millis(10)))?
        .on_leave(Hook::from_fn(|node: &Node<Payload>, _, _| {
            let passes = node
                .property("passes")
                .and_then(|p| p.as_u64())
                .unwrap_or(0);
            node.set_property("passes", passes + 1);
            Ok(())
        }));

    definition.set_pre_transition(Hook::from_fn(|node: &Node<Payload>, _, _| {
        tracing::info!(from = %node.name(), "transit requested");
        Ok(())
    }));
    definition.set_post_transition(Hook::from_fn(|node: &Node<Payload>, _, _| {
        tracing::info!(now = %node.name(), "transit finished");
        Ok(())
    }));

    definition.set_initial_node("Red")?;
    Ok(definition)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Traffic Light ===\n");

    let definition = build()?;
    if let Validation::Failure(errors) = definition.validate() {
        for error in errors.iter() {
            eprintln!("invalid graph: {error}");
        }
        anyhow::bail!("traffic light graph is not closed");
    }

    let light = definition.instance();
    let spare = definition.instance();
    println!("Initial node: {:?}\n", light.current_node());

    let mut payload = Payload::new();
    for round in 1..=2 {
        println!("Cycle {round}:");
        for transition in ["go", "caution", "stop"] {
            light.transit_with(transition, &mut payload).await?;
        }
    }
    println!();
    println!("Cycles counted by Red's enter hook: {}", cycles(&payload));

    let yellow = definition
        .get_node("Yellow")
        .ok_or_else(|| anyhow::anyhow!("Yellow node vanished"))?;
    println!("Passes through Yellow (shared node state): {:?}", yellow.property("passes"));
    println!("Path: {:?}\n", light.history().path());

    println!("Double transit on one instance:");
    let (first, second) = tokio::join!(light.transit("go"), light.transit("go"));
    println!("  first:  {:?}", first.map(|t| t.next_node));
    match second {
        Err(TransitError::TransitionRunning { transition, node }) => {
            println!("  second: rejected, '{transition}' already running from '{node}'")
        }
        other => println!("  second: unexpected {:?}", other.map(|t| t.next_node)),
    }

    println!();
    println!("Unknown transition:");
    if let Err(err) = light.transit("blink").await {
        println!("  {err} (stayed at {:?})", err.stayed_at());
    }

    println!();
    println!("Light instance: {:?}", light.current_node());
    println!("Spare instance: {:?}", spare.current_node());

    println!("\n=== Example Complete ===");
    Ok(())
}
