//! Runner configuration.
//!
//! Settings come from an optional TOML file layered under `PURSUIT__*`
//! environment variables, for example `PURSUIT__SIMULATION__TICKS=1200`.
//! Every key has a built-in default, so an empty configuration reproduces the
//! stock level.

use std::time::Duration;

use anyhow::{Context, ensure};
use config::{Config, Environment, File, FileFormat};
use pursuit_motion::{BehaviorParams, MotionParams};
use pursuit_navigation::{GridModel, Heuristic, Obstacle, OpenSetKind, PathFinder, WorldPoint};
use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid: GridSettings,
    pub motion: MotionSettings,
    pub search: SearchSettings,
    pub spawn: SpawnSettings,
    pub level: LevelSettings,
    pub simulation: SimulationSettings,
    pub behavior: BehaviorSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub cell_size: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        GridSettings {
            viewport_width: 800,
            viewport_height: 480,
            cell_size: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    pub controlled_speed: f32,
    pub seeker_speed: f32,
    pub arrival_epsilon: f32,
}

impl Default for MotionSettings {
    fn default() -> Self {
        let params = MotionParams::default();
        MotionSettings {
            controlled_speed: params.controlled_speed(),
            seeker_speed: params.seeker_speed(),
            arrival_epsilon: params.arrival_epsilon(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub heuristic: Heuristic,
    pub open_set: OpenSetKind,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Top-left corner of the controlled entity.
    pub controlled: WorldPoint,
    pub seeker: WorldPoint,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        SpawnSettings {
            controlled: WorldPoint::new(400.0, 240.0),
            seeker: WorldPoint::new(110.0, 110.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    pub obstacles: Vec<Obstacle>,
}

impl Default for LevelSettings {
    fn default() -> Self {
        LevelSettings {
            obstacles: default_level(),
        }
    }
}

/// Two crossing walls plus a handful of pillars.
pub fn default_level() -> Vec<Obstacle> {
    let mut obstacles: Vec<Obstacle> = (5..15)
        .flat_map(|i| [Obstacle::cell(i, 10), Obstacle::cell(10, i)])
        .collect();
    obstacles.extend([
        Obstacle::new(3, 3, 1, 10),
        Obstacle::cell(7, 7),
        Obstacle::cell(12, 5),
        Obstacle::new(15, 15, 1, 3),
    ]);
    obstacles
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub tick_rate_hz: f32,
    /// Upper bound on the run length.
    pub ticks: u64,
    /// Pace ticks with a wall-clock interval instead of running flat out.
    pub realtime: bool,
    pub input_seed: u64,
    /// Ticks each scripted input direction is held for.
    pub input_hold_ticks: u32,
    /// The run ends once the seeker is this close to the controlled entity.
    pub catch_distance: f32,
    /// Consecutive ticks without a route before the watchdog raises a fault.
    pub stall_ticks: u64,
    pub report_every: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            tick_rate_hz: 60.0,
            ticks: 3_600,
            realtime: false,
            input_seed: 7,
            input_hold_ticks: 45,
            catch_distance: 10.0,
            stall_ticks: 120,
            report_every: 60,
        }
    }
}

impl SimulationSettings {
    /// Seconds per tick.
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate_hz
    }

    /// Wall-clock period of one tick for realtime pacing.
    ///
    /// Fails when the rate is so high that the period rounds to zero.
    pub fn tick_period(&self) -> anyhow::Result<Duration> {
        let period = Duration::try_from_secs_f32(self.dt())
            .with_context(|| format!("tick_rate_hz {} has no valid tick period", self.tick_rate_hz))?;
        ensure!(
            !period.is_zero(),
            "tick_rate_hz {} is too high, the tick period rounds to zero",
            self.tick_rate_hz
        );
        Ok(period)
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0,
            "tick_rate_hz must be positive, got {}",
            self.tick_rate_hz
        );
        self.tick_period()?;
        ensure!(self.stall_ticks > 0, "stall_ticks must be at least 1");
        ensure!(self.input_hold_ticks > 0, "input_hold_ticks must be at least 1");
        ensure!(self.report_every > 0, "report_every must be at least 1");
        ensure!(
            self.catch_distance.is_finite() && self.catch_distance >= 0.0,
            "catch_distance must be non-negative, got {}",
            self.catch_distance
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BehaviorSettings {
    /// Patrol, chase and attack instead of chasing from the first tick.
    pub enabled: bool,
    pub sight_range: f32,
    pub attack_range: f32,
    pub patrol_start: WorldPoint,
    pub patrol_end: WorldPoint,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        let params = BehaviorParams::default();
        let (patrol_start, patrol_end) = params.patrol_points();
        BehaviorSettings {
            enabled: false,
            sight_range: params.sight_range(),
            attack_range: params.attack_range(),
            patrol_start,
            patrol_end,
        }
    }
}

/// Validated core types built from [`Settings`].
#[derive(Debug, Clone)]
pub struct Scenario {
    pub grid: GridModel,
    pub motion: MotionParams,
    pub finder: PathFinder,
    pub behavior: Option<BehaviorParams>,
    pub controlled: WorldPoint,
    pub seeker: WorldPoint,
}

impl Settings {
    /// Load settings from `path` (or [`DEFAULT_CONFIG_PATH`]) plus the environment.
    /// A missing file is not an error.
    pub fn load(path: Option<&str>) -> anyhow::Result<Settings> {
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        info!("Attempting to load configuration from {}", path);

        let settings = Config::builder()
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("PURSUIT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {path}"))?
            .try_deserialize::<Settings>()
            .context("failed to parse configuration")?;

        info!("Successfully loaded configuration");
        Ok(settings)
    }

    /// Parse settings from TOML text, without the environment layer.
    pub fn from_toml_str(toml: &str) -> anyhow::Result<Settings> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()
            .context("failed to parse configuration")
    }

    /// Validate every section and build the core types.
    pub fn scenario(&self) -> anyhow::Result<Scenario> {
        self.simulation.validate().context("invalid [simulation] settings")?;

        let grid = GridModel::build(
            self.grid.viewport_width,
            self.grid.viewport_height,
            self.grid.cell_size,
            &self.level.obstacles,
        )
        .context("invalid [grid] settings")?;

        let motion = MotionParams::new(
            self.motion.controlled_speed,
            self.motion.seeker_speed,
            self.motion.arrival_epsilon,
        )
        .context("invalid [motion] settings")?;

        let behavior = if self.behavior.enabled {
            let params = BehaviorParams::new(
                self.behavior.sight_range,
                self.behavior.attack_range,
                self.behavior.patrol_start,
                self.behavior.patrol_end,
            )
            .context("invalid [behavior] settings")?;
            Some(params)
        } else {
            None
        };

        for (name, point) in [("controlled", self.spawn.controlled), ("seeker", self.spawn.seeker)] {
            let cell = grid.world_to_cell(point);
            if !grid.is_walkable(cell) {
                warn!(entity = name, %cell, "Spawn cell is blocked or outside the grid");
            }
        }

        Ok(Scenario {
            grid,
            motion,
            finder: PathFinder::new(self.search.heuristic, self.search.open_set),
            behavior,
            controlled: self.spawn.controlled,
            seeker: self.spawn.seeker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pursuit_navigation::Cell;

    #[test]
    fn test_defaults_build_stock_level() {
        let scenario = Settings::default().scenario().unwrap();
        assert_eq!(scenario.grid.width(), 40);
        assert_eq!(scenario.grid.height(), 24);
        assert_eq!(scenario.grid.obstacles().len(), 24);
        // The crossing walls share cell (10, 10)
        assert_eq!(scenario.grid.blocked_count(), 19 + 10 + 1 + 1 + 3);
        assert!(scenario.grid.is_blocked(Cell::new(10, 10)));
        assert!(scenario.behavior.is_none());
        assert_eq!(scenario.finder, PathFinder::default());

        let seeker = scenario.grid.world_to_cell(scenario.seeker);
        let controlled = scenario.grid.world_to_cell(scenario.controlled);
        assert!(scenario.grid.is_walkable(seeker));
        assert!(scenario.grid.is_walkable(controlled));
    }

    #[test]
    fn test_empty_toml_matches_defaults() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let settings = Settings::from_toml_str(
            r#"
            [grid]
            cell_size = 40

            [search]
            heuristic = "octile"
            open_set = "binary_heap"

            [simulation]
            ticks = 10
            realtime = true

            [[level.obstacles]]
            x = 1
            y = 2
            width = 3
            height = 1
            "#,
        )
        .unwrap();

        assert_eq!(settings.grid.cell_size, 40);
        assert_eq!(settings.grid.viewport_width, 800);
        assert_eq!(settings.search.heuristic, Heuristic::Octile);
        assert_eq!(settings.search.open_set, OpenSetKind::BinaryHeap);
        assert_eq!(settings.simulation.ticks, 10);
        assert!(settings.simulation.realtime);
        assert_eq!(settings.simulation.tick_rate_hz, 60.0);
        assert_eq!(settings.level.obstacles, vec![Obstacle::new(1, 2, 3, 1)]);

        let scenario = settings.scenario().unwrap();
        assert_eq!(scenario.grid.width(), 20);
        assert_eq!(scenario.grid.blocked_count(), 3);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut settings = Settings::default();
        settings.grid.cell_size = 0;
        assert!(settings.scenario().is_err());

        let mut settings = Settings::default();
        settings.motion.seeker_speed = -5.0;
        assert!(settings.scenario().is_err());

        let mut settings = Settings::default();
        settings.simulation.tick_rate_hz = 0.0;
        assert!(settings.scenario().is_err());

        // A period that rounds to zero cannot drive an interval
        let settings =
            Settings::from_toml_str("[simulation]\ntick_rate_hz = 1e12\nrealtime = true\nticks = 3\n").unwrap();
        assert!(settings.simulation.tick_period().is_err());
        assert!(settings.scenario().is_err());

        // The stall watchdog counts up from 1
        let mut settings = Settings::default();
        settings.simulation.stall_ticks = 0;
        assert!(settings.scenario().is_err());

        // Behaviour ranges are only checked when the behaviour is on
        let mut settings = Settings::default();
        settings.behavior.attack_range = 0.0;
        assert!(settings.scenario().is_ok());
        settings.behavior.enabled = true;
        assert!(settings.scenario().is_err());
    }

    #[test]
    fn test_tick_period_matches_rate() {
        let settings = SimulationSettings::default();
        let period = settings.tick_period().unwrap();
        assert!((period.as_secs_f64() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_environment_overrides_file() {
        // Only this test reads PURSUIT__* variables
        unsafe {
            std::env::set_var("PURSUIT__SIMULATION__TICKS", "1234");
            std::env::set_var("PURSUIT__SEARCH__HEURISTIC", "octile");
        }
        let loaded = Settings::load(Some("config/does-not-exist.toml"));
        unsafe {
            std::env::remove_var("PURSUIT__SIMULATION__TICKS");
            std::env::remove_var("PURSUIT__SEARCH__HEURISTIC");
        }

        let settings = loaded.unwrap();
        assert_eq!(settings.simulation.ticks, 1234);
        assert_eq!(settings.search.heuristic, Heuristic::Octile);
        assert_eq!(settings.grid, GridSettings::default());
    }

    #[test]
    fn test_motion_params_deserialize_through_validation() {
        let parse = |toml: &str| {
            Config::builder()
                .add_source(File::from_str(toml, FileFormat::Toml))
                .build()
                .unwrap()
                .try_deserialize::<MotionParams>()
        };
        let params = parse("controlled_speed = 150.0\nseeker_speed = 75.0\narrival_epsilon = 0.5\n").unwrap();
        assert_eq!(params, MotionParams::new(150.0, 75.0, 0.5).unwrap());
        assert!(parse("controlled_speed = -1.0\nseeker_speed = 75.0\narrival_epsilon = 0.5\n").is_err());
        assert!(parse("controlled_speed = 150.0\nseeker_speed = 75.0\narrival_epsilon = 0.0\n").is_err());
    }

    #[test]
    fn test_unknown_heuristic_is_a_parse_error() {
        let result = Settings::from_toml_str("[search]\nheuristic = \"euclid\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_shipped_config_parses() {
        let text = include_str!("../config/default.toml");
        let settings = Settings::from_toml_str(text).unwrap();
        assert_eq!(settings.level.obstacles, default_level());
        assert!(settings.scenario().is_ok());
    }
}
