//! Example: build a grid world, edit it and print it
//!
//! Run with `RUST_LOG=debug` to see every mutation.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use markov_env::{GridWorld, Move};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Either a definition file given on the command line or the classic board
    let mut mdp = match std::env::args().nth(1) {
        Some(path) => markov_env::load_mdp(path)?,
        None => GridWorld::classic_3x3().discount_rate(0.9).build()?,
    };
    println!("{mdp}\n");

    if let Some(start) = mdp.initial_state().cloned() {
        for step in Move::ALL {
            if let Some(t) = mdp.t(start.name(), step.name()) {
                println!(
                    "{} --{}--> {} (p = {:.2}, reward there {})",
                    start.name(),
                    step.name(),
                    t.next_state().name(),
                    t.probability(),
                    mdp.r(t.next_state().name())
                );
            }
        }
    }

    // Random boards are reproducible from their seed
    let random = GridWorld::random(4, 4, 3, 7)?;
    info!(holes = ?random.holes, "random board");
    let random = random.build()?;
    println!("\nRandom 4x4 board: {} states, {} actions", random.len(), random.actions().count());

    // Removing a state leaves transitions into it behind
    if mdp.contains_state("MC") {
        mdp.remove_state_by_name("MC")?;
        let report = mdp.health();
        println!("\nAfter removing MC: {} dangling transitions", report.dangling.len());
        for d in &report.dangling {
            println!("  {} --{}--> {}", d.origin.name(), d.action, d.destination.name());
        }
    }

    Ok(())
}
