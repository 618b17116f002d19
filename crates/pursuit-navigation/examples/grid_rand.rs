use pursuit_navigation::{path_cost, Cell, GridModel, Heuristic, Obstacle, OpenSetKind, PathFinder};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn main() {
    // 40x24 grid (the default 800x480 viewport) with 25 random rectangles
    // of up to 3x3 cells. Fixed seed so runs are comparable.
    let mut rng = StdRng::seed_from_u64(2024);
    let obstacles: Vec<Obstacle> = (0..25)
        .map(|_| {
            Obstacle::new(
                rng.random_range(0..40),
                rng.random_range(0..24),
                rng.random_range(1..=3),
                rng.random_range(1..=3),
            )
        })
        .collect();

    let grid = GridModel::build(800, 480, 20, &obstacles).expect("valid grid parameters");
    println!("{}", grid);

    let start = Cell::new(0, 0);
    let goal = Cell::new(39, 23);

    // Compare every heuristic and open-set combination on the same query
    for heuristic in [Heuristic::Manhattan, Heuristic::Octile] {
        for open_set in [OpenSetKind::LinearScan, OpenSetKind::BinaryHeap] {
            let finder = PathFinder::new(heuristic, open_set);
            let (path, stats) = finder.find_path_with_stats(start, goal, &grid);
            if path.is_empty() {
                println!("{:?}/{:?}: no path ({} nodes expanded)", heuristic, open_set, stats.expanded);
            } else {
                println!(
                    "{:?}/{:?}: {} cells, cost {:.3}, expanded {}, generated {}",
                    heuristic,
                    open_set,
                    path.len(),
                    path_cost(&path),
                    stats.expanded,
                    stats.generated
                );
            }
        }
    }
}
