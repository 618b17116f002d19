use pursuit_motion::InputDirection;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded stand-in for a keyboard: picks a random direction and holds it
/// for a fixed number of ticks.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    rng: StdRng,
    hold_ticks: u32,
    remaining: u32,
    current: InputDirection,
}

impl ScriptedInput {
    pub fn new(seed: u64, hold_ticks: u32) -> Self {
        ScriptedInput {
            rng: StdRng::seed_from_u64(seed),
            hold_ticks: hold_ticks.max(1),
            remaining: 0,
            current: InputDirection::NONE,
        }
    }

    /// Input for the next tick.
    pub fn next_input(&mut self) -> InputDirection {
        if self.remaining == 0 {
            let horizontal = self.rng.random_range(-1..=1);
            let vertical = self.rng.random_range(-1..=1);
            self.current = InputDirection::from_axes(horizontal, vertical);
            self.remaining = self.hold_ticks;
        }
        self.remaining -= 1;
        self.current
    }
}
