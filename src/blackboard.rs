use parking_lot::RwLock;
use std::sync::Arc;

use pursuit_motion::SeekerMode;
use pursuit_navigation::{Cell, WorldPoint};

/// Latest world state, written by the simulation task and read by monitors.
#[derive(Clone, Debug, Default)]
pub struct WorldState {
    pub tick: u64,
    pub controlled: WorldPoint,
    pub seeker: WorldPoint,
    /// Waypoints the seeker has not reached yet.
    pub route: Vec<Cell>,
    pub mode: Option<SeekerMode>,
    pub repaths: u64,
    pub caught: bool,
    pub faults: Vec<String>,
}

pub type Blackboard = Arc<RwLock<WorldState>>;

pub fn snapshot(bb: &Blackboard) -> WorldState {
    (*bb.read()).clone()
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}
