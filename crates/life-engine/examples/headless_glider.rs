//! Headless playback of a glider on a 10x10 grid.
//!
//! Drives the simulation with a virtual-time [`ManualTimer`], prints every
//! frame as ASCII and stops when the glider settles into a still life in the
//! corner.
//!
//! ```sh
//! cargo run -p life-engine --example headless_glider
//! RUST_LOG=life_engine=info cargo run -p life-engine --example headless_glider
//! ```

use std::time::Duration;

use life_engine::prelude::*;

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = SimulationConfig {
        dimension: 10,
        speed: 4.0,
        ..Default::default()
    };
    let mut sim = Simulation::new(config, ManualTimer::new())?;

    sim.set_renderer(Box::new(|frame: &Frame<'_>| {
        println!("{}", frame.status_line());
        print!("{}", frame.to_ascii());
        println!();
    }));
    sim.set_notifier(Box::new(|event: SteadyStateReached| {
        println!(
            "steady state at generation {} (was running: {})",
            event.generation, event.was_running
        );
    }));

    // Glider heading down and to the right.
    let glider = [
        sim.grid().id_at(0, 1)?,
        sim.grid().id_at(1, 2)?,
        sim.grid().id_at(2, 0)?,
        sim.grid().id_at(2, 1)?,
        sim.grid().id_at(2, 2)?,
    ];
    sim.seed(&glider)?;

    let snapshot = sim.capture_snapshot();
    sim.play();

    // Quarter-second ticks; one virtual minute is far more than needed.
    let reports = sim.advance(Duration::from_secs(60));
    let last = reports
        .last()
        .ok_or_else(|| anyhow::anyhow!("simulation never stepped"))?;
    println!(
        "{} generations, final population {}, auto-paused: {}",
        reports.len(),
        sim.grid().population(),
        last.auto_paused
    );

    sim.restore_from_snapshot(&snapshot)?;
    println!("restored to generation {}", sim.generation());

    Ok(())
}
