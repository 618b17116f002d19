use pursuit_motion::{MotionController, MotionError, Pursuer, SeekerMode, SeekerStep, TickOutcome};
use pursuit_navigation::{Cell, GridModel, WorldPoint};
use tokio::time;
use tracing::{debug, info};

use crate::blackboard::Blackboard;
use crate::bus::Topic;
use crate::config::{Scenario, SimulationSettings};
use crate::input::ScriptedInput;

/// Published once per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub outcome: TickOutcome,
    pub mode: Option<SeekerMode>,
    pub controlled: WorldPoint,
    pub seeker: WorldPoint,
    /// Distance between the seeker and the controlled entity.
    pub gap: f32,
    /// Waypoints left on the seeker's route.
    pub waypoints: usize,
}

impl TickReport {
    /// Whether the seeker had nowhere to go this tick.
    pub fn is_stalled(&self) -> bool {
        self.outcome.seeker == SeekerStep::Holding && self.waypoints == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub ticks: u64,
    pub caught: bool,
    pub repaths: u64,
    pub gap: f32,
}

/// Pure chase, or the patrol/chase/attack behaviour.
#[derive(Debug, Clone)]
enum Driver {
    Chase(MotionController),
    Behavior(Pursuer),
}

impl Driver {
    fn controller(&self) -> &MotionController {
        match self {
            Driver::Chase(controller) => controller,
            Driver::Behavior(pursuer) => pursuer.controller(),
        }
    }
}

/// Deterministic tick-by-tick world: two entities on one grid.
pub struct Simulation {
    grid: GridModel,
    driver: Driver,
    input: ScriptedInput,
    controlled: WorldPoint,
    seeker: WorldPoint,
    dt: f32,
    catch_distance: f32,
    tick: u64,
}

impl Simulation {
    pub fn new(scenario: Scenario, settings: &SimulationSettings) -> Self {
        let controller = MotionController::new(scenario.motion, scenario.finder);
        let driver = match scenario.behavior {
            Some(params) => Driver::Behavior(Pursuer::new(controller, params)),
            None => Driver::Chase(controller),
        };
        Simulation {
            grid: scenario.grid,
            driver,
            input: ScriptedInput::new(settings.input_seed, settings.input_hold_ticks),
            controlled: scenario.controlled,
            seeker: scenario.seeker,
            dt: settings.dt(),
            catch_distance: settings.catch_distance,
            tick: 0,
        }
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn gap(&self) -> f32 {
        self.seeker.distance_to(self.controlled)
    }

    pub fn is_caught(&self) -> bool {
        self.gap() <= self.catch_distance
    }

    pub fn route(&self) -> &[Cell] {
        self.driver.controller().path()
    }

    pub fn repath_count(&self) -> u64 {
        self.driver.controller().repath_count()
    }

    /// Advance one tick with the next scripted input.
    pub fn step(&mut self) -> Result<TickReport, MotionError> {
        let input = self.input.next_input();
        let (outcome, mode) = match &mut self.driver {
            Driver::Chase(controller) => {
                let outcome = controller.tick(self.dt, input, &mut self.controlled, &mut self.seeker, &self.grid)?;
                (outcome, None)
            }
            Driver::Behavior(pursuer) => {
                let outcome = pursuer.tick(self.dt, input, &mut self.controlled, &mut self.seeker, &self.grid)?;
                (outcome.motion, Some(outcome.mode))
            }
        };
        self.tick += 1;

        Ok(TickReport {
            tick: self.tick,
            outcome,
            mode,
            controlled: self.controlled,
            seeker: self.seeker,
            gap: self.gap(),
            waypoints: self.route().len(),
        })
    }

    fn publish_state(&self, bb: &Blackboard) {
        let mut state = bb.write();
        state.tick = self.tick;
        state.controlled = self.controlled;
        state.seeker = self.seeker;
        state.route.clear();
        state.route.extend_from_slice(self.route());
        state.mode = match &self.driver {
            Driver::Chase(_) => None,
            Driver::Behavior(pursuer) => Some(pursuer.mode()),
        };
        state.repaths = self.repath_count();
        state.caught = self.is_caught();
    }

    fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            ticks: self.tick,
            caught: self.is_caught(),
            repaths: self.repath_count(),
            gap: self.gap(),
        }
    }
}

/// Runs the simulation until the seeker catches up or the tick budget is spent.
pub async fn sim_task(
    mut sim: Simulation,
    bb: Blackboard,
    reports: Topic<TickReport>,
    settings: SimulationSettings,
) -> anyhow::Result<SimulationSummary> {
    info!(ticks = settings.ticks, realtime = settings.realtime, "Simulation task started.");
    let mut ticker = if settings.realtime {
        Some(time::interval(settings.tick_period()?))
    } else {
        None
    };
    sim.publish_state(&bb);

    while sim.tick_count() < settings.ticks && !sim.is_caught() {
        match ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            // Let the monitors drain the topic between ticks
            None => tokio::task::yield_now().await,
        }

        let report = sim.step()?;
        debug!(
            tick = report.tick,
            controlled = %report.outcome.controlled,
            seeker = %report.outcome.seeker,
            repathed = report.outcome.repathed,
            gap = report.gap,
            "Tick"
        );
        sim.publish_state(&bb);
        reports.publish(report);
    }

    let summary = sim.summary();
    if summary.caught {
        info!(tick = summary.ticks, "Seeker caught the controlled entity.");
    } else {
        info!(tick = summary.ticks, gap = summary.gap, "Tick budget spent.");
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::snapshot;
    use crate::config::Settings;
    use pursuit_navigation::Obstacle;
    use std::sync::Arc;

    fn settings(toml: &str) -> Settings {
        Settings::from_toml_str(toml).unwrap()
    }

    #[test]
    fn test_runs_are_reproducible() {
        let settings = Settings::default();
        let mut a = Simulation::new(settings.scenario().unwrap(), &settings.simulation);
        let mut b = Simulation::new(settings.scenario().unwrap(), &settings.simulation);
        for _ in 0..300 {
            assert_eq!(a.step().unwrap(), b.step().unwrap());
        }
    }

    #[test]
    fn test_seeker_closes_in_on_idle_target() {
        // The controlled entity crawls, so its cell never changes
        let mut settings = settings("[simulation]\ncatch_distance = 15.0\n");
        settings.level.obstacles = vec![Obstacle::new(10, 0, 1, 20)];
        settings.motion.controlled_speed = 0.001;
        let mut sim = Simulation::new(settings.scenario().unwrap(), &settings.simulation);
        let start_gap = sim.gap();
        for _ in 0..2_000 {
            if sim.is_caught() {
                break;
            }
            sim.step().unwrap();
        }
        assert!(sim.is_caught(), "gap still {}", sim.gap());
        assert!(sim.gap() < start_gap);
        assert_eq!(sim.repath_count(), 1);
    }

    #[test]
    fn test_stalled_when_target_unreachable() {
        let mut settings = Settings::default();
        // Box the seeker into cell (5, 5)
        settings.level.obstacles = vec![
            Obstacle::new(4, 4, 3, 1),
            Obstacle::new(4, 6, 3, 1),
            Obstacle::cell(4, 5),
            Obstacle::cell(6, 5),
        ];
        let mut sim = Simulation::new(settings.scenario().unwrap(), &settings.simulation);
        let seeker = sim.seeker;
        for _ in 0..5 {
            let report = sim.step().unwrap();
            assert!(report.is_stalled());
            assert_eq!(report.seeker, seeker);
        }
        assert_eq!(sim.repath_count(), 5);
    }

    #[test]
    fn test_behavior_reports_mode() {
        let settings = settings("[behavior]\nenabled = true\n");
        let mut sim = Simulation::new(settings.scenario().unwrap(), &settings.simulation);
        let report = sim.step().unwrap();
        assert_eq!(report.mode, Some(SeekerMode::Patrolling));
    }

    #[tokio::test]
    async fn test_sim_task_rejects_zero_tick_period() {
        let scenario = Settings::default().scenario().unwrap();
        let settings = settings("[simulation]\ntick_rate_hz = 1e12\nrealtime = true\nticks = 3\n");
        let sim = Simulation::new(scenario, &settings.simulation);
        let bb: Blackboard = Arc::default();
        let result = sim_task(sim, bb.clone(), Topic::new(4), settings.simulation.clone()).await;
        assert!(result.is_err());
        assert_eq!(snapshot(&bb).tick, 0);
    }

    #[tokio::test]
    async fn test_sim_task_respects_tick_budget() {
        let settings = settings("[simulation]\nticks = 25\ncatch_distance = 0.0\n");
        let sim = Simulation::new(settings.scenario().unwrap(), &settings.simulation);
        let bb: Blackboard = Arc::default();
        let reports: Topic<TickReport> = Topic::new(64);
        let mut rx = reports.subscribe();

        let summary = sim_task(sim, bb.clone(), reports, settings.simulation.clone())
            .await
            .unwrap();
        assert_eq!(summary.ticks, 25);
        assert_eq!(snapshot(&bb).tick, 25);

        let mut last = 0;
        while let Ok(report) = rx.recv().await {
            last = report.tick;
        }
        assert_eq!(last, 25);
    }
}
