use pursuit_navigation::{astar_search, path_cost, Cell, GridModel, Obstacle};
use std::collections::HashSet;

fn main() {
    // 10x10 grid with 20-unit cells
    let obstacles = [
        Obstacle::new(1, 1, 2, 1),
        Obstacle::new(7, 1, 2, 1),
        Obstacle::new(4, 2, 1, 1),
        Obstacle::new(2, 3, 4, 1),
        Obstacle::new(7, 3, 1, 3),
        Obstacle::new(5, 4, 1, 2),
        Obstacle::new(1, 5, 3, 1),
        Obstacle::new(3, 6, 1, 2),
        Obstacle::new(5, 7, 3, 1),
        Obstacle::new(3, 9, 3, 1),
    ];
    let grid = match GridModel::build(200, 200, 20, &obstacles) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("Failed to build grid: {}", e);
            return;
        }
    };

    let start = Cell::new(0, 0);
    let goal = Cell::new(9, 9);

    println!("{}", grid);
    println!("Start: {}, Goal: {}", start, goal);

    let path = astar_search(&grid, start, goal);
    if path.is_empty() {
        println!("\nNo path found.");
        return;
    }

    println!("\nPath found ({} cells, cost {:.3}):", path.len(), path_cost(&path));
    let on_path: HashSet<Cell> = path.iter().copied().collect();
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let cell = Cell::new(x, y);
            if cell == start {
                print!("S ");
            } else if cell == goal {
                print!("G ");
            } else if on_path.contains(&cell) {
                print!("* ");
            } else if grid.is_blocked(cell) {
                print!("X ");
            } else {
                print!(". ");
            }
        }
        println!();
    }
}
