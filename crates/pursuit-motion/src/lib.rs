#![warn(missing_docs)]
#![doc = "Per-tick motion for a grid pursuit simulation."]
#![doc = ""]
#![doc = "This crate provides the input and velocity types, the tunable motion parameters,"]
#![doc = "the [`MotionController`] that moves a controlled entity and steers a seeker along"]
#![doc = "A* routes, and the [`Pursuer`] behaviour state machine built on top of it."]

use std::fmt;
use std::ops::{Add, Mul, Sub};

use pursuit_navigation::WorldPoint;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod behavior;
pub mod controller;
pub mod error;

pub use behavior::{BehaviorParams, Pursuer, PursuitOutcome, SeekerMode};
pub use controller::{ControlledStep, MotionController, SeekerReport, SeekerStep, TickOutcome};
pub use error::MotionError;

/// Controlled-entity speed in world units per second.
pub const DEFAULT_CONTROLLED_SPEED: f32 = 200.0;
/// Seeker speed in world units per second.
pub const DEFAULT_SEEKER_SPEED: f32 = 100.0;
/// Distance below which the seeker counts as standing on a waypoint.
pub const DEFAULT_ARRIVAL_EPSILON: f32 = 1.0;

/// A 2‑D displacement or direction in world units.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    /// Component along x (right is positive).
    pub x: f32,
    /// Component along y (down is positive, as in screen space).
    pub y: f32,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);

    /// Construct a new vector.
    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// Vector pointing from `from` to `to`.
    pub fn between(from: WorldPoint, to: WorldPoint) -> Self {
        Vec2::new(to.x - from.x, to.y - from.y)
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Whether both components are exactly zero.
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Unit vector with the same direction.
    ///
    /// # Returns
    ///
    /// The normalized vector, or [`Vec2::ZERO`] when the length is zero.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Vec2::new(self.x / len, self.y / len)
        } else {
            Vec2::ZERO
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Add<Vec2> for WorldPoint {
    type Output = WorldPoint;

    fn add(self, rhs: Vec2) -> WorldPoint {
        WorldPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{:.2}, {:.2}>", self.x, self.y)
    }
}

/// Discrete directional input for the controlled entity, one flag per key.
///
/// Opposite flags cancel out, so holding both `left` and `right` yields no
/// horizontal motion.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InputDirection {
    /// Move toward negative y.
    pub up: bool,
    /// Move toward positive y.
    pub down: bool,
    /// Move toward negative x.
    pub left: bool,
    /// Move toward positive x.
    pub right: bool,
}

impl InputDirection {
    /// No key held.
    pub const NONE: InputDirection = InputDirection::new(false, false, false, false);

    /// Construct a new input from individual flags.
    pub const fn new(up: bool, down: bool, left: bool, right: bool) -> Self {
        InputDirection { up, down, left, right }
    }

    /// Build an input from signed axis values.
    ///
    /// # Arguments
    ///
    /// * `horizontal`: Negative for left, positive for right, zero for neither.
    /// * `vertical`: Negative for up, positive for down, zero for neither.
    pub const fn from_axes(horizontal: i8, vertical: i8) -> Self {
        InputDirection {
            up: vertical < 0,
            down: vertical > 0,
            left: horizontal < 0,
            right: horizontal > 0,
        }
    }

    /// Whether the flags produce no motion.
    pub fn is_idle(self) -> bool {
        self.to_vector().is_zero()
    }

    /// Unit direction for the held keys, or [`Vec2::ZERO`] when they cancel.
    ///
    /// Diagonal input is normalized, so it moves no faster than a single axis.
    pub fn to_vector(self) -> Vec2 {
        let axis = |neg: bool, pos: bool| f32::from(u8::from(pos)) - f32::from(u8::from(neg));
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down)).normalized()
    }
}

impl fmt::Display for InputDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |on: bool, c: char| if on { c } else { '-' };
        write!(
            f,
            "[{}{}{}{}]",
            flag(self.up, 'U'),
            flag(self.down, 'D'),
            flag(self.left, 'L'),
            flag(self.right, 'R')
        )
    }
}

/// Speeds and tolerances shared by the controlled entity and the seeker.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawMotionParams"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    controlled_speed: f32,
    seeker_speed: f32,
    arrival_epsilon: f32,
}

/// Unchecked wire form of [`MotionParams`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawMotionParams {
    controlled_speed: f32,
    seeker_speed: f32,
    arrival_epsilon: f32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawMotionParams> for MotionParams {
    type Error = MotionError;

    fn try_from(raw: RawMotionParams) -> Result<Self, Self::Error> {
        MotionParams::new(raw.controlled_speed, raw.seeker_speed, raw.arrival_epsilon)
    }
}

impl MotionParams {
    /// Construct validated motion parameters.
    ///
    /// # Arguments
    ///
    /// * `controlled_speed`: Controlled-entity speed in world units per second.
    /// * `seeker_speed`: Seeker speed in world units per second.
    /// * `arrival_epsilon`: Waypoint arrival distance in world units.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::InvalidSpeed`] if either speed is not a positive
    /// finite number, and [`MotionError::InvalidEpsilon`] if the epsilon is not.
    pub fn new(controlled_speed: f32, seeker_speed: f32, arrival_epsilon: f32) -> Result<Self, MotionError> {
        if !(controlled_speed.is_finite() && controlled_speed > 0.0) {
            return Err(MotionError::InvalidSpeed("controlled speed must be positive and finite"));
        }
        if !(seeker_speed.is_finite() && seeker_speed > 0.0) {
            return Err(MotionError::InvalidSpeed("seeker speed must be positive and finite"));
        }
        if !(arrival_epsilon.is_finite() && arrival_epsilon > 0.0) {
            return Err(MotionError::InvalidEpsilon("must be positive and finite"));
        }
        Ok(MotionParams {
            controlled_speed,
            seeker_speed,
            arrival_epsilon,
        })
    }

    /// Controlled-entity speed in world units per second.
    pub fn controlled_speed(&self) -> f32 {
        self.controlled_speed
    }

    /// Seeker speed in world units per second.
    pub fn seeker_speed(&self) -> f32 {
        self.seeker_speed
    }

    /// Waypoint arrival distance in world units.
    pub fn arrival_epsilon(&self) -> f32 {
        self.arrival_epsilon
    }
}

impl Default for MotionParams {
    fn default() -> Self {
        MotionParams {
            controlled_speed: DEFAULT_CONTROLLED_SPEED,
            seeker_speed: DEFAULT_SEEKER_SPEED,
            arrival_epsilon: DEFAULT_ARRIVAL_EPSILON,
        }
    }
}

impl fmt::Display for MotionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(controlled: {:.1} u/s, seeker: {:.1} u/s, epsilon: {:.2} u)",
            self.controlled_speed, self.seeker_speed, self.arrival_epsilon
        )
    }
}
