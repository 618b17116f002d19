mod blackboard; // world snapshot shared between tasks
mod bus; // broadcast topic for tick reports
mod config;
mod input;
mod simulation;

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use blackboard::{Blackboard, raise_fault, snapshot};
use bus::Topic;
use config::Settings;
use simulation::{Simulation, TickReport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Pursuit simulation starting.");

    let path = std::env::args().nth(1);
    let settings = Settings::load(path.as_deref()).context("failed to load configuration")?;

    if let Err(e) = run(settings).await {
        error!("Simulation failed: {:?}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    let scenario = settings.scenario().context("invalid configuration")?;
    let sim = Simulation::new(scenario, &settings.simulation);
    info!(
        width = sim.grid().width(),
        height = sim.grid().height(),
        blocked = sim.grid().blocked_count(),
        behavior = settings.behavior.enabled,
        "Level loaded."
    );
    debug!("\n{}", sim.grid());

    let bb: Blackboard = Arc::default();
    let reports: Topic<TickReport> = Topic::new(64);
    let reporter_rx = reports.subscribe();
    let watchdog_rx = reports.subscribe();
    let sim_settings = settings.simulation.clone();

    let (summary, (), ()) = tokio::try_join!(
        simulation::sim_task(sim, bb.clone(), reports, sim_settings),
        reporter(reporter_rx, settings.simulation.report_every),
        watchdog(bb.clone(), watchdog_rx, settings.simulation.stall_ticks),
    )?;

    let state = snapshot(&bb);
    info!(
        ticks = summary.ticks,
        caught = summary.caught,
        repaths = summary.repaths,
        gap = summary.gap,
        "Simulation finished."
    );
    info!(
        tick = state.tick,
        controlled = ?state.controlled,
        seeker = ?state.seeker,
        waypoints = state.route.len(),
        mode = ?state.mode,
        repaths = state.repaths,
        caught = state.caught,
        faults = ?state.faults,
        "Final world state."
    );
    Ok(())
}

/// Logs a progress line every `every` ticks.
async fn reporter(mut rx: broadcast::Receiver<Arc<TickReport>>, every: u64) -> anyhow::Result<()> {
    info!("Reporter task started.");
    loop {
        match rx.recv().await {
            Ok(report) if report.tick % every == 0 => {
                info!(
                    tick = report.tick,
                    gap = report.gap,
                    waypoints = report.waypoints,
                    controlled = ?report.controlled,
                    seeker = ?report.seeker,
                    mode = ?report.mode,
                    "Progress"
                );
            }
            Ok(_) => {}
            Err(RecvError::Lagged(missed)) => warn!(missed, "Reporter fell behind."),
            Err(RecvError::Closed) => break,
        }
    }
    Ok(())
}

/// Raises a fault once the seeker has been without a route for `stall_ticks` ticks in a row.
async fn watchdog(bb: Blackboard, mut rx: broadcast::Receiver<Arc<TickReport>>, stall_ticks: u64) -> anyhow::Result<()> {
    info!("Watchdog task started.");
    let mut stalled_for = 0u64;
    loop {
        match rx.recv().await {
            Ok(report) => {
                if !report.is_stalled() {
                    stalled_for = 0;
                    continue;
                }
                stalled_for += 1;
                if stalled_for == stall_ticks {
                    warn!(tick = report.tick, stalled_for, "Seeker has no route to the controlled entity.");
                    raise_fault(&bb, "seeker stalled");
                }
            }
            Err(RecvError::Lagged(missed)) => warn!(missed, "Watchdog fell behind."),
            Err(RecvError::Closed) => break,
        }
    }
    Ok(())
}
