//! Per-tick movement for the controlled entity and the seeker.
//!
//! A tick runs two steps in a fixed order:
//!
//! 1. The controlled entity moves along its input direction. The move is
//!    rejected in full if its one-cell bounding box would overlap an obstacle.
//! 2. The seeker follows its current route one waypoint at a time, asking the
//!    [`PathFinder`] for a new route only once the current one is used up.
//!
//! Routes are not refreshed while the target moves. The seeker finishes the
//! route it has before planning again.

use std::fmt;

use pursuit_navigation::{Cell, GridModel, PathFinder, SearchStats, WorldPoint, WorldRect};
use tracing::{debug, trace};

use crate::error::validate_dt;
use crate::{InputDirection, MotionError, MotionParams, Vec2};

/// What the controlled entity did during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlledStep {
    /// No input, or a zero time step.
    Idle,
    /// The tentative position was committed.
    Moved,
    /// The tentative position overlapped an obstacle and was discarded.
    Blocked,
}

/// What the seeker did during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekerStep {
    /// No waypoint pending, so the seeker stayed put.
    Holding,
    /// The seeker moved toward its next waypoint.
    Moving,
    /// The seeker stood on its waypoint and consumed it without moving.
    Advanced,
}

impl fmt::Display for ControlledStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlledStep::Idle => "idle",
            ControlledStep::Moved => "moved",
            ControlledStep::Blocked => "blocked",
        };
        f.write_str(name)
    }
}

impl fmt::Display for SeekerStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeekerStep::Holding => "holding",
            SeekerStep::Moving => "moving",
            SeekerStep::Advanced => "advanced",
        };
        f.write_str(name)
    }
}

/// Result of a single seeker step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekerReport {
    /// Movement taken.
    pub step: SeekerStep,
    /// Whether a new route was requested this step.
    pub repathed: bool,
}

/// Result of a full tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Movement of the controlled entity.
    pub controlled: ControlledStep,
    /// Movement of the seeker.
    pub seeker: SeekerStep,
    /// Whether the seeker requested a new route this tick.
    pub repathed: bool,
}

/// Moves the controlled entity and steers the seeker, one tick at a time.
///
/// Entity positions belong to the caller and are passed in on every tick.
/// The controller only owns the seeker's route.
#[derive(Debug, Clone, Default)]
pub struct MotionController {
    params: MotionParams,
    finder: PathFinder,
    /// Route with the seeker's starting cell removed.
    route: Vec<Cell>,
    /// Index of the next waypoint in `route`.
    cursor: usize,
    repaths: u64,
    last_search: Option<SearchStats>,
}

impl MotionController {
    /// Construct a controller with no route.
    ///
    /// # Arguments
    ///
    /// * `params`: Speeds and arrival tolerance.
    /// * `finder`: Path finder used whenever the seeker needs a new route.
    pub fn new(params: MotionParams, finder: PathFinder) -> Self {
        MotionController {
            params,
            finder,
            route: Vec::new(),
            cursor: 0,
            repaths: 0,
            last_search: None,
        }
    }

    /// Motion parameters in use.
    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    /// Path finder in use.
    pub fn finder(&self) -> &PathFinder {
        &self.finder
    }

    /// Waypoints the seeker has not reached yet, for drawing overlays.
    pub fn path(&self) -> &[Cell] {
        self.route.get(self.cursor..).unwrap_or_default()
    }

    /// The whole route adopted at the last repath, consumed waypoints included.
    pub fn route(&self) -> &[Cell] {
        &self.route
    }

    /// Index of the next waypoint within [`MotionController::route`].
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// How many routes have been requested since construction.
    pub fn repath_count(&self) -> u64 {
        self.repaths
    }

    /// Counters from the most recent search, if any.
    pub fn last_search(&self) -> Option<&SearchStats> {
        self.last_search.as_ref()
    }

    /// Whether every waypoint of the current route has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.route.len()
    }

    /// Drops the current route so the next seeker step plans a fresh one.
    pub fn clear_route(&mut self) {
        self.route.clear();
        self.cursor = 0;
    }

    /// Advance both entities by one tick.
    ///
    /// The controlled step runs first, so the seeker plans toward the
    /// controlled entity's updated position.
    ///
    /// # Arguments
    ///
    /// * `dt`: Time step in seconds.
    /// * `input`: Keys held for the controlled entity.
    /// * `controlled`: Top-left corner of the controlled entity's bounding box.
    /// * `seeker`: Position of the seeker.
    /// * `grid`: Level the entities move in.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::NegativeTimeDelta`] or
    /// [`MotionError::NonFiniteTimeDelta`] before touching any state if `dt`
    /// cannot be integrated.
    pub fn tick(
        &mut self,
        dt: f32,
        input: InputDirection,
        controlled: &mut WorldPoint,
        seeker: &mut WorldPoint,
        grid: &GridModel,
    ) -> Result<TickOutcome, MotionError> {
        validate_dt(dt)?;
        let controlled_step = self.step_controlled(dt, input, controlled, grid)?;
        let report = self.step_seeker(dt, seeker, *controlled, grid)?;
        Ok(TickOutcome {
            controlled: controlled_step,
            seeker: report.step,
            repathed: report.repathed,
        })
    }

    /// Move the controlled entity along `input`, rejecting moves into obstacles.
    ///
    /// The tentative position is `pos + direction * controlled_speed * dt`.
    /// If a one-cell square at that position overlaps any obstacle, `pos` is
    /// left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if `dt` is negative or not finite.
    pub fn step_controlled(
        &self,
        dt: f32,
        input: InputDirection,
        pos: &mut WorldPoint,
        grid: &GridModel,
    ) -> Result<ControlledStep, MotionError> {
        validate_dt(dt)?;
        let direction = input.to_vector();
        if direction.is_zero() || dt == 0.0 {
            return Ok(ControlledStep::Idle);
        }

        let tentative = *pos + direction * (self.params.controlled_speed() * dt);
        let bounds = WorldRect::square(tentative, grid.cell_size() as f32);
        if collides(grid, &bounds) {
            trace!(x = tentative.x, y = tentative.y, "Controlled move rejected");
            return Ok(ControlledStep::Blocked);
        }
        *pos = tentative;
        Ok(ControlledStep::Moved)
    }

    /// Move the seeker one step along its route toward `target`.
    ///
    /// A new route is requested when the current one is absent or used up.
    /// While a waypoint is pending the seeker heads for the waypoint's cell
    /// center at `seeker_speed`, stopping on the center rather than passing
    /// it. Once within `arrival_epsilon` the waypoint is consumed and the
    /// seeker does not move for the rest of that step.
    ///
    /// # Errors
    ///
    /// Returns an error if `dt` is negative or not finite.
    pub fn step_seeker(
        &mut self,
        dt: f32,
        seeker: &mut WorldPoint,
        target: WorldPoint,
        grid: &GridModel,
    ) -> Result<SeekerReport, MotionError> {
        validate_dt(dt)?;

        let mut repathed = false;
        if self.is_exhausted() {
            self.repath(grid.world_to_cell(*seeker), grid.world_to_cell(target), grid);
            repathed = true;
        }

        let Some(&waypoint) = self.route.get(self.cursor) else {
            return Ok(SeekerReport {
                step: SeekerStep::Holding,
                repathed,
            });
        };

        let center = grid.cell_center(waypoint);
        let offset = Vec2::between(*seeker, center);
        let distance = offset.length();
        if distance <= self.params.arrival_epsilon() {
            self.cursor += 1;
            trace!(%waypoint, remaining = self.path().len(), "Waypoint reached");
            return Ok(SeekerReport {
                step: SeekerStep::Advanced,
                repathed,
            });
        }

        let travel = self.params.seeker_speed() * dt;
        if travel >= distance {
            *seeker = center;
        } else {
            *seeker = *seeker + offset.normalized() * travel;
        }
        Ok(SeekerReport {
            step: SeekerStep::Moving,
            repathed,
        })
    }

    /// Replace the route wholesale with a fresh search result.
    fn repath(&mut self, from: Cell, to: Cell, grid: &GridModel) {
        let (path, stats) = self.finder.find_path_with_stats(from, to, grid);
        self.route.clear();
        // The seeker already stands in the first cell
        self.route.extend(path.into_iter().skip(1));
        self.cursor = 0;
        self.repaths += 1;
        self.last_search = Some(stats);
        debug!(
            %from,
            %to,
            waypoints = self.route.len(),
            expanded = stats.expanded,
            "Seeker route planned"
        );
    }
}

/// Whether `bounds` overlaps any obstacle in `grid`.
pub fn collides(grid: &GridModel, bounds: &WorldRect) -> bool {
    grid.obstacle_rects().any(|rect| rect.intersects(bounds))
}
