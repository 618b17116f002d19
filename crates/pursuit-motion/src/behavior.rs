//! Seeker behaviour modes layered over the [`MotionController`].
//!
//! The seeker patrols between two points until the controlled entity comes
//! within sight, chases it along A* routes, and stops to attack once it is
//! close enough. Leaving attack range resumes the chase.

use std::fmt;

use pursuit_navigation::{GridModel, WorldPoint};
use tracing::info;

use crate::controller::{SeekerReport, TickOutcome};
use crate::error::validate_dt;
use crate::{InputDirection, MotionController, MotionError, SeekerStep};

/// Current behaviour of the seeker.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekerMode {
    /// Walking back and forth between the patrol points.
    #[default]
    Patrolling,
    /// Following routes toward the controlled entity.
    Chasing,
    /// Holding position next to the controlled entity.
    Attacking,
}

impl fmt::Display for SeekerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeekerMode::Patrolling => "patrolling",
            SeekerMode::Chasing => "chasing",
            SeekerMode::Attacking => "attacking",
        };
        f.write_str(name)
    }
}

/// Ranges and patrol points for a [`Pursuer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorParams {
    sight_range: f32,
    attack_range: f32,
    patrol_start: WorldPoint,
    patrol_end: WorldPoint,
}

impl BehaviorParams {
    /// Construct validated behaviour parameters.
    ///
    /// # Arguments
    ///
    /// * `sight_range`: Distance at which a patrolling seeker starts chasing.
    /// * `attack_range`: Distance at which a chasing seeker starts attacking.
    /// * `patrol_start`: First patrol point.
    /// * `patrol_end`: Second patrol point, visited first.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::InvalidRange`] if a range is not a positive
    /// finite number.
    pub fn new(
        sight_range: f32,
        attack_range: f32,
        patrol_start: WorldPoint,
        patrol_end: WorldPoint,
    ) -> Result<Self, MotionError> {
        if !(sight_range.is_finite() && sight_range > 0.0) {
            return Err(MotionError::InvalidRange("sight range must be positive and finite"));
        }
        if !(attack_range.is_finite() && attack_range > 0.0) {
            return Err(MotionError::InvalidRange("attack range must be positive and finite"));
        }
        Ok(BehaviorParams {
            sight_range,
            attack_range,
            patrol_start,
            patrol_end,
        })
    }

    /// Distance at which a patrolling seeker starts chasing.
    pub fn sight_range(&self) -> f32 {
        self.sight_range
    }

    /// Distance at which a chasing seeker starts attacking.
    pub fn attack_range(&self) -> f32 {
        self.attack_range
    }

    /// The two patrol points.
    pub fn patrol_points(&self) -> (WorldPoint, WorldPoint) {
        (self.patrol_start, self.patrol_end)
    }
}

impl Default for BehaviorParams {
    fn default() -> Self {
        BehaviorParams {
            sight_range: 200.0,
            attack_range: 50.0,
            patrol_start: WorldPoint::new(110.0, 50.0),
            patrol_end: WorldPoint::new(310.0, 50.0),
        }
    }
}

/// Result of a [`Pursuer`] tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PursuitOutcome {
    /// Movement taken by both entities.
    pub motion: TickOutcome,
    /// Mode at the start of the tick.
    pub previous: SeekerMode,
    /// Mode at the end of the tick.
    pub mode: SeekerMode,
}

impl PursuitOutcome {
    /// Whether the seeker changed mode during the tick.
    pub fn changed_mode(&self) -> bool {
        self.previous != self.mode
    }
}

/// A seeker driven by the patrol, chase and attack modes.
#[derive(Debug, Clone)]
pub struct Pursuer {
    controller: MotionController,
    params: BehaviorParams,
    mode: SeekerMode,
    patrol_target: WorldPoint,
}

impl Pursuer {
    /// Construct a patrolling pursuer heading for the second patrol point.
    pub fn new(controller: MotionController, params: BehaviorParams) -> Self {
        Pursuer {
            controller,
            params,
            mode: SeekerMode::Patrolling,
            patrol_target: params.patrol_end,
        }
    }

    /// Current mode.
    pub fn mode(&self) -> SeekerMode {
        self.mode
    }

    /// Behaviour parameters in use.
    pub fn params(&self) -> &BehaviorParams {
        &self.params
    }

    /// Patrol point the seeker is currently walking toward.
    pub fn patrol_target(&self) -> WorldPoint {
        self.patrol_target
    }

    /// The motion controller carrying the seeker's route.
    pub fn controller(&self) -> &MotionController {
        &self.controller
    }

    /// Advance both entities by one tick and update the seeker's mode.
    ///
    /// The controlled entity moves first. Distances are measured between the
    /// seeker and the controlled entity's updated position.
    ///
    /// # Errors
    ///
    /// Returns an error if `dt` is negative or not finite.
    pub fn tick(
        &mut self,
        dt: f32,
        input: InputDirection,
        controlled: &mut WorldPoint,
        seeker: &mut WorldPoint,
        grid: &GridModel,
    ) -> Result<PursuitOutcome, MotionError> {
        validate_dt(dt)?;
        let previous = self.mode;
        let controlled_step = self.controller.step_controlled(dt, input, controlled, grid)?;

        let report = match self.mode {
            SeekerMode::Patrolling => {
                let report = self.patrol(dt, seeker, grid)?;
                if seeker.distance_to(*controlled) < self.params.sight_range {
                    self.enter(SeekerMode::Chasing);
                }
                report
            }
            SeekerMode::Chasing => {
                if seeker.distance_to(*controlled) < self.params.attack_range {
                    self.enter(SeekerMode::Attacking);
                    HOLD
                } else {
                    self.controller.step_seeker(dt, seeker, *controlled, grid)?
                }
            }
            SeekerMode::Attacking => {
                if seeker.distance_to(*controlled) > self.params.attack_range {
                    self.enter(SeekerMode::Chasing);
                }
                HOLD
            }
        };

        Ok(PursuitOutcome {
            motion: TickOutcome {
                controlled: controlled_step,
                seeker: report.step,
                repathed: report.repathed,
            },
            previous,
            mode: self.mode,
        })
    }

    /// Follow a route to the patrol target, turning around once it is reached.
    fn patrol(&mut self, dt: f32, seeker: &mut WorldPoint, grid: &GridModel) -> Result<SeekerReport, MotionError> {
        let report = self.controller.step_seeker(dt, seeker, self.patrol_target, grid)?;
        let arrived = grid.world_to_cell(*seeker) == grid.world_to_cell(self.patrol_target);
        if report.step == SeekerStep::Holding && arrived {
            let (start, end) = self.params.patrol_points();
            self.patrol_target = if self.patrol_target == end { start } else { end };
            self.controller.clear_route();
        }
        Ok(report)
    }

    fn enter(&mut self, mode: SeekerMode) {
        info!(from = %self.mode, to = %mode, "Seeker mode changed");
        self.mode = mode;
        // Any route was planned toward a different goal
        self.controller.clear_route();
    }
}

const HOLD: SeekerReport = SeekerReport {
    step: SeekerStep::Holding,
    repathed: false,
};
