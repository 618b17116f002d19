/*

A* = f(n) = g(n) + h(n)

Where:
    n = a cell on the grid
    g(n) = cost of the best known route from the start to n
    h(n) = estimated cost from n to the goal (heuristic)
    f(n) = estimated cost of the cheapest route through n

Initialize:
    - open set holding the start node, g(start) = 0, f(start) = h(start)
    - empty closed set

Loop:
    - pop the open node with the lowest f(n)
    - if n is the goal, walk the parent links back to the start
    - close n
    - for each walkable neighbor of n (8-connected):
        - skip it if it is closed
        - g' = g(n) + cost(n, neighbor), 1 orthogonal or sqrt(2) diagonal
        - unseen: open it with g'
        - open with a higher g: re-parent it to n and lower its score

The open set running dry means there is no route.

*/

use std::f64::consts::SQRT_2;

use crate::map::{Cell, GridModel};
use crate::open_set::{BinaryHeapOpenSet, LinearScanOpenSet, NodeId, OpenSet, OpenSetKind};

/// Cost of a horizontal or vertical step.
pub const ORTHOGONAL_COST: f64 = 1.0;
/// Cost of a diagonal step.
pub const DIAGONAL_COST: f64 = SQRT_2;

// Right, Left, Down, Up, then the four diagonals
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
];

/// Distance estimate used to order the open set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Heuristic {
    /// `|dx| + |dy|`. Overestimates diagonal routes, so with obstacles the
    /// returned route can be slightly longer than the optimum.
    #[default]
    Manhattan,
    /// `max(dx, dy) + (sqrt(2) - 1) * min(dx, dy)`, the exact obstacle-free
    /// distance for 8-connected movement.
    Octile,
}

impl Heuristic {
    /// Estimated cost from `a` to `b`.
    pub fn estimate(self, a: Cell, b: Cell) -> f64 {
        let dx = f64::from((a.x - b.x).abs());
        let dy = f64::from((a.y - b.y).abs());
        match self {
            Heuristic::Manhattan => dx + dy,
            Heuristic::Octile => dx.max(dy) + (SQRT_2 - 1.0) * dx.min(dy),
        }
    }
}

/// Cost of moving between two adjacent cells.
pub fn step_cost(from: Cell, to: Cell) -> f64 {
    if from.is_diagonal_to(to) {
        DIAGONAL_COST
    } else {
        ORTHOGONAL_COST
    }
}

/// Total cost of a route, summing each step.
pub fn path_cost(path: &[Cell]) -> f64 {
    path.windows(2).map(|w| step_cost(w[0], w[1])).sum()
}

/// Counters collected during a single search.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SearchStats {
    /// Nodes popped from the open set and closed.
    pub expanded: usize,
    /// Nodes created, including the start node.
    pub generated: usize,
    /// Cost of the returned route, `None` when no route was found.
    pub cost: Option<f64>,
}

/// A search frontier record. Parents are arena indices, so the whole chain
/// is dropped with the arena when the search returns.
#[derive(Debug, Clone, Copy)]
struct PathNode {
    cell: Cell,
    parent: Option<NodeId>,
    g: f64,
    h: f64,
    f: f64,
    closed: bool,
}

/// A* path finder over a [`GridModel`].
///
/// The finder itself is stateless configuration; every call builds its own
/// node arena, so one finder can serve any number of searches.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PathFinder {
    heuristic: Heuristic,
    open_set: OpenSetKind,
}

impl PathFinder {
    /// Creates a path finder with the given heuristic and open-set strategy.
    pub const fn new(heuristic: Heuristic, open_set: OpenSetKind) -> Self {
        PathFinder { heuristic, open_set }
    }

    /// Returns the heuristic.
    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Returns the open-set strategy.
    pub fn open_set(&self) -> OpenSetKind {
        self.open_set
    }

    /// Finds a route from `start` to `goal`.
    ///
    /// # Returns
    /// * `Vec<Cell>` - Cells from `start` to `goal`, both included. `[start]`
    ///   when they are equal, empty when either is blocked or out of bounds or
    ///   no route exists.
    pub fn find_path(&self, start: Cell, goal: Cell, grid: &GridModel) -> Vec<Cell> {
        self.find_path_with_stats(start, goal, grid).0
    }

    /// Same as [`PathFinder::find_path`], also returning search counters.
    pub fn find_path_with_stats(
        &self,
        start: Cell,
        goal: Cell,
        grid: &GridModel,
    ) -> (Vec<Cell>, SearchStats) {
        match self.open_set {
            OpenSetKind::LinearScan => self.find_path_using(LinearScanOpenSet::new(), start, goal, grid),
            OpenSetKind::BinaryHeap => {
                self.find_path_using(BinaryHeapOpenSet::with_capacity(grid.cell_count()), start, goal, grid)
            }
        }
    }

    /// Runs the search with a caller-supplied open set.
    pub fn find_path_using<O: OpenSet>(
        &self,
        mut open: O,
        start: Cell,
        goal: Cell,
        grid: &GridModel,
    ) -> (Vec<Cell>, SearchStats) {
        let mut stats = SearchStats::default();

        let (Some(start_slot), Some(_)) = (grid.walkable_index(start), grid.walkable_index(goal)) else {
            tracing::debug!(%start, %goal, "Start or goal is blocked or out of bounds");
            return (Vec::new(), stats);
        };

        let mut nodes: Vec<PathNode> = Vec::new();
        // Arena id per grid cell, `None` until the cell is discovered
        let mut lookup: Vec<Option<NodeId>> = vec![None; grid.cell_count()];

        let h = self.heuristic.estimate(start, goal);
        nodes.push(PathNode { cell: start, parent: None, g: 0.0, h, f: h, closed: false });
        lookup[start_slot] = Some(0);
        open.insert(0, h);
        stats.generated = 1;

        while let Some(current) = open.pop_min() {
            let PathNode { cell, g, .. } = nodes[current];

            if cell == goal {
                let path = reconstruct_path(&nodes, current);
                stats.cost = Some(g);
                tracing::debug!(
                    %start,
                    %goal,
                    len = path.len(),
                    cost = g,
                    expanded = stats.expanded,
                    generated = stats.generated,
                    "Path found"
                );
                return (path, stats);
            }

            nodes[current].closed = true;
            stats.expanded += 1;
            tracing::trace!(%cell, g, f = nodes[current].f, "Expanding node");

            for (dx, dy) in NEIGHBOR_OFFSETS {
                let neighbor = cell.offset(dx, dy);
                let Some(slot) = grid.walkable_index(neighbor) else {
                    continue;
                };
                let tentative_g = g + step_cost(cell, neighbor);

                match lookup[slot] {
                    Some(id) if nodes[id].closed => {}
                    Some(id) => {
                        let node = &mut nodes[id];
                        if tentative_g < node.g {
                            node.parent = Some(current);
                            node.g = tentative_g;
                            node.f = tentative_g + node.h;
                            open.decrease(id, node.f);
                        }
                    }
                    None => {
                        let id = nodes.len();
                        let h = self.heuristic.estimate(neighbor, goal);
                        nodes.push(PathNode {
                            cell: neighbor,
                            parent: Some(current),
                            g: tentative_g,
                            h,
                            f: tentative_g + h,
                            closed: false,
                        });
                        lookup[slot] = Some(id);
                        open.insert(id, tentative_g + h);
                        stats.generated += 1;
                    }
                }
            }
        }

        tracing::debug!(%start, %goal, expanded = stats.expanded, "No path found");
        (Vec::new(), stats)
    }
}

fn reconstruct_path(nodes: &[PathNode], goal: NodeId) -> Vec<Cell> {
    let mut path = Vec::new();
    let mut next = Some(goal);
    while let Some(id) = next {
        path.push(nodes[id].cell);
        next = nodes[id].parent;
    }
    path.reverse();
    path
}

/// Finds a route with the default finder (Manhattan heuristic, linear scan).
pub fn astar_search(grid: &GridModel, start: Cell, goal: Cell) -> Vec<Cell> {
    PathFinder::default().find_path(start, goal, grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Obstacle;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::cmp::Reverse;
    use std::collections::{BinaryHeap, HashSet};

    const EPSILON: f64 = 1e-9;

    fn grid(cols: u32, rows: u32, obstacles: &[Obstacle]) -> GridModel {
        GridModel::build(cols * 20, rows * 20, 20, obstacles).unwrap()
    }

    fn octile(a: Cell, b: Cell) -> f64 {
        Heuristic::Octile.estimate(a, b)
    }

    fn assert_valid_route(path: &[Cell], start: Cell, goal: Cell, grid: &GridModel) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        for w in path.windows(2) {
            let (dx, dy) = ((w[0].x - w[1].x).abs(), (w[0].y - w[1].y).abs());
            assert!(dx <= 1 && dy <= 1 && (dx, dy) != (0, 0), "{} -> {} is not a step", w[0], w[1]);
        }
        for c in path {
            assert!(grid.is_walkable(*c), "route enters {}", c);
        }
        let unique: HashSet<Cell> = path.iter().copied().collect();
        assert_eq!(unique.len(), path.len(), "route revisits a cell");
    }

    // Uniform-cost reference search, costs kept as integer millionths so the
    // heap ordering is total.
    fn dijkstra_cost(grid: &GridModel, start: Cell, goal: Cell) -> Option<f64> {
        let mut best = vec![f64::INFINITY; grid.cell_count()];
        let mut heap = BinaryHeap::new();
        best[grid.index(start)?] = 0.0;
        heap.push(Reverse((0u64, start.x, start.y)));
        while let Some(Reverse((_, x, y))) = heap.pop() {
            let cell = Cell::new(x, y);
            let g = best[grid.index(cell)?];
            if cell == goal {
                return Some(g);
            }
            for (dx, dy) in NEIGHBOR_OFFSETS {
                let n = cell.offset(dx, dy);
                if let Some(slot) = grid.walkable_index(n) {
                    let ng = g + step_cost(cell, n);
                    if ng + EPSILON < best[slot] {
                        best[slot] = ng;
                        heap.push(Reverse(((ng * 1e6) as u64, n.x, n.y)));
                    }
                }
            }
        }
        None
    }

    fn random_level(rng: &mut StdRng, cols: i32, rows: i32) -> Vec<Obstacle> {
        (0..12)
            .map(|_| {
                Obstacle::new(
                    rng.random_range(0..cols),
                    rng.random_range(0..rows),
                    rng.random_range(1..4),
                    rng.random_range(1..4),
                )
            })
            .collect()
    }

    #[test]
    fn test_astar_simple_path() {
        // Corridor forcing a detour around a horizontal wall
        let g = grid(5, 5, &[Obstacle::new(0, 1, 4, 1), Obstacle::new(1, 3, 4, 1)]);
        let start = Cell::new(0, 0);
        let goal = Cell::new(4, 4);

        let path = astar_search(&g, start, goal);
        assert_valid_route(&path, start, goal, &g);
        assert!((path_cost(&path) - dijkstra_cost(&g, start, goal).unwrap()).abs() < EPSILON);
    }

    #[test]
    fn test_astar_no_path() {
        let g = grid(3, 3, &[Obstacle::new(1, 0, 1, 3)]);
        let path = astar_search(&g, Cell::new(0, 0), Cell::new(2, 2));
        assert!(path.is_empty());
    }

    #[test]
    fn test_astar_start_or_goal_blocked() {
        let g = grid(3, 3, &[Obstacle::cell(1, 1)]);
        assert!(astar_search(&g, Cell::new(1, 1), Cell::new(2, 2)).is_empty());
        assert!(astar_search(&g, Cell::new(0, 0), Cell::new(1, 1)).is_empty());
    }

    #[test]
    fn test_astar_out_of_bounds() {
        let g = grid(3, 3, &[]);
        assert!(astar_search(&g, Cell::new(-1, 0), Cell::new(2, 2)).is_empty());
        assert!(astar_search(&g, Cell::new(0, 0), Cell::new(3, 1)).is_empty());
    }

    #[test]
    fn test_astar_start_equals_goal() {
        let g = grid(3, 3, &[]);
        let (path, stats) = PathFinder::default().find_path_with_stats(Cell::new(1, 1), Cell::new(1, 1), &g);
        assert_eq!(path, vec![Cell::new(1, 1)]);
        assert_eq!(stats.cost, Some(0.0));
        assert_eq!(stats.expanded, 0);
    }

    #[test]
    fn test_empty_grid_routes_are_optimal() {
        let g = grid(20, 20, &[]);
        let starts = [Cell::new(0, 0), Cell::new(19, 19), Cell::new(7, 3), Cell::new(10, 10), Cell::new(0, 19)];
        for kind in [OpenSetKind::LinearScan, OpenSetKind::BinaryHeap] {
            for heuristic in [Heuristic::Manhattan, Heuristic::Octile] {
                let finder = PathFinder::new(heuristic, kind);
                for start in starts {
                    for y in 0..20 {
                        for x in 0..20 {
                            let goal = Cell::new(x, y);
                            let path = finder.find_path(start, goal, &g);
                            assert_valid_route(&path, start, goal, &g);
                            let cost = path_cost(&path);
                            assert!(
                                (cost - octile(start, goal)).abs() < EPSILON,
                                "{:?} {} -> {}: cost {} vs {}",
                                finder,
                                start,
                                goal,
                                cost,
                                octile(start, goal)
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_obstacle_on_the_diagonal() {
        // The only 10-step route from (0,0) to (10,10) runs through (5,5), so
        // the shortest detour is 9 diagonals and 2 straight steps.
        let g = grid(20, 20, &[Obstacle::cell(5, 5)]);
        let start = Cell::new(0, 0);
        let goal = Cell::new(10, 10);
        let expected = 9.0 * SQRT_2 + 2.0;

        for kind in [OpenSetKind::LinearScan, OpenSetKind::BinaryHeap] {
            let (path, stats) = PathFinder::new(Heuristic::Manhattan, kind).find_path_with_stats(start, goal, &g);
            assert_valid_route(&path, start, goal, &g);
            assert!(!path.contains(&Cell::new(5, 5)));
            assert_eq!(path.len(), 12);
            assert!((path_cost(&path) - expected).abs() < EPSILON);
            assert!((stats.cost.unwrap() - expected).abs() < EPSILON);
        }
    }

    #[test]
    fn test_wall_separates_halves() {
        let g = grid(10, 10, &[Obstacle::new(5, 0, 1, 10)]);
        assert!(astar_search(&g, Cell::new(1, 1), Cell::new(8, 8)).is_empty());
        assert!(astar_search(&g, Cell::new(8, 1), Cell::new(8, 8)).len() > 1);
    }

    #[test]
    fn test_enclosed_goal() {
        let g = grid(9, 9, &[
            Obstacle::new(3, 3, 3, 1),
            Obstacle::new(3, 5, 3, 1),
            Obstacle::new(3, 4, 1, 1),
            Obstacle::new(5, 4, 1, 1),
        ]);
        let (path, stats) = PathFinder::default().find_path_with_stats(Cell::new(0, 0), Cell::new(4, 4), &g);
        assert!(path.is_empty());
        assert_eq!(stats.cost, None);
        // Every reachable cell was expanded before giving up
        assert_eq!(stats.expanded, 81 - 9);
    }

    #[test]
    fn test_diagonal_moves_may_cut_corners() {
        // Two blocked cells touching only at a corner leave a diagonal gap
        let g = grid(2, 2, &[Obstacle::cell(1, 0), Obstacle::cell(0, 1)]);
        let path = astar_search(&g, Cell::new(0, 0), Cell::new(1, 1));
        assert_eq!(path, vec![Cell::new(0, 0), Cell::new(1, 1)]);
    }

    #[test]
    fn test_repeated_searches_are_identical() {
        let mut rng = StdRng::seed_from_u64(11);
        let g = grid(20, 20, &random_level(&mut rng, 20, 20));
        let finder = PathFinder::default();
        let first = finder.find_path(Cell::new(0, 0), Cell::new(19, 19), &g);
        for _ in 0..5 {
            assert_eq!(finder.find_path(Cell::new(0, 0), Cell::new(19, 19), &g), first);
        }
    }

    #[test]
    fn test_open_set_strategies_agree() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let g = grid(20, 20, &random_level(&mut rng, 20, 20));
            let start = Cell::new(rng.random_range(0..20), rng.random_range(0..20));
            let goal = Cell::new(rng.random_range(0..20), rng.random_range(0..20));
            for heuristic in [Heuristic::Manhattan, Heuristic::Octile] {
                let linear = PathFinder::new(heuristic, OpenSetKind::LinearScan).find_path(start, goal, &g);
                let heap = PathFinder::new(heuristic, OpenSetKind::BinaryHeap).find_path(start, goal, &g);
                assert_eq!(linear, heap, "{:?} {} -> {}", heuristic, start, goal);
            }
        }
    }

    #[test]
    fn test_random_levels_routes_are_valid() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let g = grid(20, 20, &random_level(&mut rng, 20, 20));
            let start = Cell::new(rng.random_range(0..20), rng.random_range(0..20));
            let goal = Cell::new(rng.random_range(0..20), rng.random_range(0..20));
            let reference = if g.is_walkable(start) && g.is_walkable(goal) {
                dijkstra_cost(&g, start, goal)
            } else {
                None
            };

            let manhattan = astar_search(&g, start, goal);
            let octile_path = PathFinder::new(Heuristic::Octile, OpenSetKind::BinaryHeap).find_path(start, goal, &g);

            match reference {
                None => {
                    assert!(manhattan.is_empty());
                    assert!(octile_path.is_empty());
                }
                Some(best) => {
                    assert_valid_route(&manhattan, start, goal, &g);
                    assert_valid_route(&octile_path, start, goal, &g);
                    // Octile never overestimates, so its routes are optimal
                    assert!((path_cost(&octile_path) - best).abs() < 1e-6);
                    assert!(path_cost(&manhattan) + 1e-6 >= best);
                }
            }
        }
    }

    #[test]
    fn test_heuristics() {
        let a = Cell::new(0, 0);
        let b = Cell::new(3, 1);
        assert!((Heuristic::Manhattan.estimate(a, b) - 4.0).abs() < EPSILON);
        assert!((Heuristic::Octile.estimate(a, b) - (3.0 + (SQRT_2 - 1.0))).abs() < EPSILON);
        assert!((path_cost(&[a]) - 0.0).abs() < EPSILON);
        assert!((path_cost(&[a, Cell::new(1, 1), Cell::new(2, 1)]) - (SQRT_2 + 1.0)).abs() < EPSILON);
    }
}
