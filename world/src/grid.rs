//! Static cell classification for the warehouse floor.

use rand::Rng;
use stackbots_core::{CellCoord, CellKind, ConfigurationError, Direction, SimulationConfig};

/// Dense classification matrix describing the initial floor layout.
///
/// The perimeter ring is always [`CellKind::Wall`]. Interior cells record
/// where items and robots were seeded; the matrix is not updated as entities
/// move afterwards, so it only answers "is this cell a wall" once the
/// simulation is running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldGrid {
    width: u32,
    height: u32,
    cells: Vec<CellKind>,
}

impl WorldGrid {
    /// Creates a grid with a wall perimeter and empty floor inside it.
    #[must_use]
    pub fn walled(width: u32, height: u32) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        let mut grid = Self {
            width,
            height,
            cells: vec![CellKind::Empty; capacity],
        };

        for row in 0..height {
            for column in 0..width {
                let cell = CellCoord::new(column, row);
                if !grid.is_border(cell) {
                    continue;
                }
                if let Some(slot) = grid.index(cell).and_then(|index| grid.cells.get_mut(index)) {
                    *slot = CellKind::Wall;
                }
            }
        }

        grid
    }

    /// Seeds items and then robot origins onto random free floor cells.
    ///
    /// The configuration is validated first so the rejection sampling below
    /// always has enough free cells to finish.
    pub fn seeded<R>(config: &SimulationConfig, rng: &mut R) -> Result<Self, ConfigurationError>
    where
        R: Rng + ?Sized,
    {
        config.validate()?;

        let mut grid = Self::walled(config.width, config.height);
        grid.scatter(CellKind::Item, config.items, rng);
        grid.scatter(CellKind::RobotStart, config.robots, rng);
        Ok(grid)
    }

    fn scatter<R>(&mut self, kind: CellKind, count: u32, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let mut remaining = count;
        while remaining > 0 {
            let cell = CellCoord::new(
                rng.gen_range(1..self.width - 1),
                rng.gen_range(1..self.height - 1),
            );
            if self.place(cell, kind) {
                remaining -= 1;
            }
        }
    }

    /// Marks a free floor cell as an item or robot seed.
    ///
    /// Returns `false` without changing anything when the cell lies on the
    /// perimeter, outside the grid, is already taken, or `kind` is not a seed
    /// kind.
    #[must_use]
    pub fn place(&mut self, cell: CellCoord, kind: CellKind) -> bool {
        if !matches!(kind, CellKind::Item | CellKind::RobotStart) || self.is_border(cell) {
            return false;
        }

        match self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            Some(slot) if *slot == CellKind::Empty => {
                *slot = kind;
                true
            }
            _ => false,
        }
    }

    /// Number of columns, perimeter included.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows, perimeter included.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the cell lies within the grid bounds.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Reports whether the cell belongs to the perimeter ring.
    #[must_use]
    pub fn is_border(&self, cell: CellCoord) -> bool {
        self.contains(cell)
            && (cell.column() == 0
                || cell.row() == 0
                || cell.column() + 1 == self.width
                || cell.row() + 1 == self.height)
    }

    /// Classification of the cell. Cells outside the grid read as walls.
    #[must_use]
    pub fn classify(&self, cell: CellCoord) -> CellKind {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(CellKind::Wall)
    }

    /// In-bounds cardinal neighbours in north, east, south, west order.
    pub fn neighbors4(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| cell.step(direction))
            .filter(move |neighbor| self.contains(*neighbor))
    }

    /// In-bounds cells within Manhattan distance `radius`, centre excluded.
    ///
    /// Cells are returned in row-major order.
    #[must_use]
    pub fn neighbors_within_radius(&self, cell: CellCoord, radius: u32) -> Vec<CellCoord> {
        if !self.contains(cell) {
            return Vec::new();
        }

        let first_row = cell.row().saturating_sub(radius);
        let last_row = cell.row().saturating_add(radius).min(self.height - 1);
        let first_column = cell.column().saturating_sub(radius);
        let last_column = cell.column().saturating_add(radius).min(self.width - 1);

        let mut cells = Vec::new();
        for row in first_row..=last_row {
            for column in first_column..=last_column {
                let candidate = CellCoord::new(column, row);
                if candidate != cell && candidate.manhattan_distance(cell) <= radius {
                    cells.push(candidate);
                }
            }
        }
        cells
    }

    /// Every cell paired with its classification in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellKind)> + '_ {
        let width = self.width.max(1);
        self.cells.iter().enumerate().map(move |(index, kind)| {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            (CellCoord::new(index % width, index / width), *kind)
        })
    }

    /// Cells carrying the requested classification in row-major order.
    #[must_use]
    pub fn cells_of(&self, kind: CellKind) -> Vec<CellCoord> {
        self.iter()
            .filter(|(_, candidate)| *candidate == kind)
            .map(|(cell, _)| cell)
            .collect()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn walled_grid_surrounds_empty_floor() {
        let grid = WorldGrid::walled(5, 4);

        for (cell, kind) in grid.iter() {
            if grid.is_border(cell) {
                assert_eq!(kind, CellKind::Wall, "{cell} should be wall");
            } else {
                assert_eq!(kind, CellKind::Empty, "{cell} should be floor");
            }
        }
        assert_eq!(grid.cells_of(CellKind::Empty).len(), 3 * 2);
    }

    #[test]
    fn classify_treats_outside_cells_as_wall() {
        let grid = WorldGrid::walled(4, 4);
        assert_eq!(grid.classify(CellCoord::new(9, 1)), CellKind::Wall);
        assert_eq!(grid.classify(CellCoord::new(1, 1)), CellKind::Empty);
    }

    #[test]
    fn place_rejects_perimeter_and_taken_cells() {
        let mut grid = WorldGrid::walled(5, 5);

        assert!(!grid.place(CellCoord::new(0, 2), CellKind::Item));
        assert!(grid.place(CellCoord::new(2, 2), CellKind::Item));
        assert!(!grid.place(CellCoord::new(2, 2), CellKind::RobotStart));
        assert!(!grid.place(CellCoord::new(3, 3), CellKind::Wall));
        assert!(!grid.place(CellCoord::new(7, 7), CellKind::Item));
        assert_eq!(grid.classify(CellCoord::new(2, 2)), CellKind::Item);
    }

    #[test]
    fn seeded_grid_places_every_entity_on_distinct_floor_cells() {
        let config = SimulationConfig {
            width: 8,
            height: 7,
            robots: 4,
            items: 12,
            ..SimulationConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let grid = WorldGrid::seeded(&config, &mut rng).expect("layout fits");

        let items = grid.cells_of(CellKind::Item);
        let robots = grid.cells_of(CellKind::RobotStart);
        assert_eq!(items.len(), 12);
        assert_eq!(robots.len(), 4);
        assert!(items.iter().chain(&robots).all(|cell| !grid.is_border(*cell)));
    }

    #[test]
    fn seeded_grid_can_fill_the_whole_floor() {
        let config = SimulationConfig {
            width: 4,
            height: 4,
            robots: 1,
            items: 3,
            ..SimulationConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let grid = WorldGrid::seeded(&config, &mut rng).expect("layout fits");

        assert!(grid.cells_of(CellKind::Empty).is_empty());
    }

    #[test]
    fn seeded_grid_rejects_overcrowded_floor() {
        let config = SimulationConfig {
            width: 4,
            height: 4,
            robots: 1,
            items: 5,
            ..SimulationConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let error = WorldGrid::seeded(&config, &mut rng).expect_err("floor too small");

        assert_eq!(
            error,
            ConfigurationError::TooManyEntities {
                requested: 6,
                available: 4
            }
        );
    }

    #[test]
    fn neighbors4_skips_cells_outside_grid() {
        let grid = WorldGrid::walled(3, 3);
        let corner: Vec<_> = grid.neighbors4(CellCoord::new(0, 0)).collect();
        assert_eq!(corner, vec![CellCoord::new(1, 0), CellCoord::new(0, 1)]);

        let centre: Vec<_> = grid.neighbors4(CellCoord::new(1, 1)).collect();
        assert_eq!(
            centre,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(2, 1),
                CellCoord::new(1, 2),
                CellCoord::new(0, 1),
            ]
        );
    }

    #[test]
    fn neighbors_within_radius_is_row_major_diamond() {
        let grid = WorldGrid::walled(5, 5);
        let cells = grid.neighbors_within_radius(CellCoord::new(2, 2), 1);
        assert_eq!(
            cells,
            vec![
                CellCoord::new(2, 1),
                CellCoord::new(1, 2),
                CellCoord::new(3, 2),
                CellCoord::new(2, 3),
            ]
        );

        let wide = grid.neighbors_within_radius(CellCoord::new(1, 1), 8);
        assert_eq!(wide.len(), 24);
        assert!(wide.windows(2).all(|pair| (pair[0].row(), pair[0].column())
            < (pair[1].row(), pair[1].column())));
    }
}
