#![warn(missing_docs)]

use crate::error::NavigationError;
use super::{Cell, WorldPoint, WorldRect};

/// An obstacle rectangle given in cell units.
///
/// The rectangle covers `[x, x + width) × [y, y + height)`. Rectangles may
/// overlap each other or stick out of the grid; only the in-bounds part is
/// blocked. A rectangle with a non-positive width or height blocks nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Obstacle {
    /// Left column.
    pub x: i32,
    /// Top row.
    pub y: i32,
    /// Width in cells.
    pub width: i32,
    /// Height in cells.
    pub height: i32,
}

impl Obstacle {
    /// Creates a new obstacle rectangle in cell units.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// A single blocked cell.
    #[must_use]
    pub const fn cell(x: i32, y: i32) -> Self {
        Self::new(x, y, 1, 1)
    }

    /// True when the rectangle covers no cells.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// The obstacle scaled into world units.
    pub fn world_rect(&self, cell_size: f32) -> WorldRect {
        WorldRect::new(
            self.x as f32 * cell_size,
            self.y as f32 * cell_size,
            self.width as f32 * cell_size,
            self.height as f32 * cell_size,
        )
    }
}

/// A static grid of blocked and walkable cells.
///
/// The grid is derived once from a list of obstacles and never changes
/// afterwards, so it can be shared freely between readers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridModel {
    /// Width of the grid in cells
    width: usize,
    /// Height of the grid in cells
    height: usize,
    /// Edge length of one cell in world units
    cell_size: u32,
    /// Row-major blocked flags, `width * height` entries
    blocked: Vec<bool>,
    /// Obstacles the grid was built from, kept for world-space collision
    obstacles: Vec<Obstacle>,
}

impl GridModel {
    /// Builds a grid covering a viewport and marks every obstacle cell as blocked.
    ///
    /// # Arguments
    /// * `viewport_width` - Width of the play area in world units
    /// * `viewport_height` - Height of the play area in world units
    /// * `cell_size` - Edge length of a cell in world units
    /// * `obstacles` - Obstacle rectangles in cell units
    ///
    /// # Returns
    /// * `Result<Self, NavigationError>` - The grid, or an error if the parameters
    ///   cannot describe a grid with at least one cell
    pub fn build(
        viewport_width: u32,
        viewport_height: u32,
        cell_size: u32,
        obstacles: &[Obstacle],
    ) -> Result<Self, NavigationError> {
        if cell_size == 0 {
            return Err(NavigationError::InvalidCellSize("Cell size must be positive"));
        }

        let width = (viewport_width / cell_size) as usize;
        let height = (viewport_height / cell_size) as usize;
        if width == 0 || height == 0 {
            return Err(NavigationError::InvalidDimensions("Viewport must hold at least one cell"));
        }
        // Cell coordinates are i32, so both axes have to fit
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(NavigationError::InvalidDimensions("Grid too large for cell coordinates"));
        }
        let cell_count = width
            .checked_mul(height)
            .ok_or(NavigationError::InvalidDimensions("Grid dimensions too large, would cause overflow"))?;

        let mut grid = GridModel {
            width,
            height,
            cell_size,
            blocked: vec![false; cell_count],
            obstacles: obstacles.to_vec(),
        };
        for obstacle in obstacles {
            grid.mark(obstacle);
        }

        tracing::debug!(
            width,
            height,
            cell_size,
            obstacles = obstacles.len(),
            blocked = grid.blocked_count(),
            "Built grid model"
        );
        Ok(grid)
    }

    /// Blocks the in-bounds part of an obstacle rectangle.
    fn mark(&mut self, obstacle: &Obstacle) {
        if obstacle.is_degenerate() {
            tracing::debug!(?obstacle, "Ignoring obstacle with no area");
            return;
        }
        // Work in i64 so that huge rectangles cannot overflow the bounds math
        let x0 = i64::from(obstacle.x).max(0);
        let y0 = i64::from(obstacle.y).max(0);
        let x1 = (i64::from(obstacle.x) + i64::from(obstacle.width)).min(self.width as i64);
        let y1 = (i64::from(obstacle.y) + i64::from(obstacle.height)).min(self.height as i64);

        for y in y0..y1 {
            for x in x0..x1 {
                let index = y as usize * self.width + x as usize;
                self.blocked[index] = true;
            }
        }
    }

    /// Calculates the index in the blocked vector, or `None` outside the grid.
    pub(crate) fn index(&self, cell: Cell) -> Option<usize> {
        if self.contains(cell) {
            Some(cell.y as usize * self.width + cell.x as usize)
        } else {
            None
        }
    }

    /// Index of a walkable cell, `None` for blocked or out-of-bounds cells.
    pub(crate) fn walkable_index(&self, cell: Cell) -> Option<usize> {
        self.index(cell).filter(|&i| !self.blocked[i])
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.blocked.len()
    }

    /// True when the cell lies inside `[0, width) × [0, height)`.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    /// True when the cell is inside the grid and not blocked.
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.walkable_index(cell).is_some()
    }

    /// True when the cell is inside the grid and covered by an obstacle.
    /// Out-of-bounds cells are not blocked, they are simply not walkable.
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|i| self.blocked[i])
    }

    /// Width of the grid in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the grid in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Edge length of one cell in world units.
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Number of blocked cells.
    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|&&b| b).count()
    }

    /// The obstacles the grid was built from, in their original order.
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// World-space rectangles of all obstacles that cover at least one cell.
    pub fn obstacle_rects(&self) -> impl Iterator<Item = WorldRect> + '_ {
        let cell_size = self.cell_size as f32;
        self.obstacles
            .iter()
            .filter(|o| !o.is_degenerate())
            .map(move |o| o.world_rect(cell_size))
    }

    /// Converts a world position to the cell containing it.
    ///
    /// The division truncates toward zero, so small negative coordinates map
    /// to column or row 0 rather than -1. The result may lie outside the grid.
    pub fn world_to_cell(&self, p: WorldPoint) -> Cell {
        let cell_size = self.cell_size as f32;
        Cell::new((p.x / cell_size) as i32, (p.y / cell_size) as i32)
    }

    /// World coordinates of the top-left corner of a cell.
    pub fn cell_origin(&self, cell: Cell) -> WorldPoint {
        let cell_size = self.cell_size as f32;
        WorldPoint::new(cell.x as f32 * cell_size, cell.y as f32 * cell_size)
    }

    /// World coordinates of the center of a cell.
    pub fn cell_center(&self, cell: Cell) -> WorldPoint {
        let cell_size = self.cell_size as f32;
        WorldPoint::new(
            (cell.x as f32 + 0.5) * cell_size,
            (cell.y as f32 + 0.5) * cell_size,
        )
    }
}

impl std::fmt::Display for GridModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "GridModel ({}x{}, cell size: {}, blocked: {})",
            self.width,
            self.height,
            self.cell_size,
            self.blocked_count()
        )?;
        for row in self.blocked.chunks(self.width) {
            for &b in row {
                write!(f, "{}", if b { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
