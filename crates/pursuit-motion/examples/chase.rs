use pursuit_motion::*;
use pursuit_navigation::{GridModel, Obstacle, PathFinder, WorldPoint};

fn main() {
    let walls = [Obstacle::new(8, 2, 1, 10), Obstacle::new(3, 6, 5, 1)];
    let grid = match GridModel::build(400, 280, 20, &walls) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("Failed to build grid: {}", e);
            return;
        }
    };

    let params = MotionParams::default();
    let mut controller = MotionController::new(params, PathFinder::default());

    let mut controlled = WorldPoint::new(300.0, 120.0);
    let mut seeker = WorldPoint::new(50.0, 170.0);
    let up = InputDirection::from_axes(0, -1);
    let dt = 1.0 / 30.0;
    let num_ticks = 150;

    println!("Initializing chase...");
    println!("  Motion Parameters: {}", params);
    println!("  Grid:");
    println!("{}", grid);
    println!("  Controlled start: ({:.1}, {:.1})", controlled.x, controlled.y);
    println!("  Seeker start:     ({:.1}, {:.1})", seeker.x, seeker.y);
    println!("\nSimulating...");

    for i in 0..num_ticks {
        // Hold "up" briefly, then stand still
        let input = if i < 10 { up } else { InputDirection::NONE };
        match controller.tick(dt, input, &mut controlled, &mut seeker, &grid) {
            Ok(outcome) => {
                if outcome.repathed || i % 15 == 0 {
                    println!(
                        "Tick {:>3}: controlled {} ({:.1}, {:.1}), seeker {} ({:.1}, {:.1}), {} waypoints left{}",
                        i + 1,
                        outcome.controlled,
                        controlled.x,
                        controlled.y,
                        outcome.seeker,
                        seeker.x,
                        seeker.y,
                        controller.path().len(),
                        if outcome.repathed { " [repath]" } else { "" }
                    );
                }
            }
            Err(e) => {
                eprintln!("Error during tick {}: {}", i + 1, e);
                break;
            }
        }
    }

    println!("\nChase complete.");
    println!("Routes planned: {}", controller.repath_count());
    println!("Final gap: {:.1}", seeker.distance_to(controlled));
}
