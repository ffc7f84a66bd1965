//! Shortest-path planner used to route laden robots to a stack.

use std::{cmp::Reverse, collections::BinaryHeap};

use stackbots_core::{CellCoord, Direction, PlanningError};

/// Reusable A* workspace over a four-connected, uniform-cost grid.
///
/// The Manhattan heuristic is admissible on such a grid, so returned paths
/// are always shortest. Buffers are kept between searches to avoid
/// reallocating for every robot.
#[derive(Clone, Debug, Default)]
pub struct PathPlanner {
    costs: Vec<u32>,
    came_from: Vec<Option<usize>>,
    closed: Vec<bool>,
    open: BinaryHeap<Reverse<OpenNode>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    estimate: u32,
    remaining: u32,
    sequence: u64,
    index: usize,
}

impl PathPlanner {
    /// Creates a planner with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a shortest route between two cells of a `width` x `height` grid.
    ///
    /// The returned path starts with `from` and ends with `to`; callers that
    /// treat it as a movement queue drop the first element. `is_passable`
    /// decides which cells may be entered, including both endpoints.
    pub fn find_path<F>(
        &mut self,
        width: u32,
        height: u32,
        from: CellCoord,
        to: CellCoord,
        mut is_passable: F,
    ) -> Result<Vec<CellCoord>, PlanningError>
    where
        F: FnMut(CellCoord) -> bool,
    {
        let not_found = PlanningError::NotFound { from, to };
        let (Some(start), Some(goal)) = (index(width, height, from), index(width, height, to))
        else {
            return Err(not_found);
        };
        if !is_passable(from) || !is_passable(to) {
            return Err(not_found);
        }

        self.prepare(width, height);
        self.costs[start] = 0;

        let mut sequence = 0_u64;
        let remaining = from.manhattan_distance(to);
        self.open.push(Reverse(OpenNode {
            estimate: remaining,
            remaining,
            sequence,
            index: start,
        }));

        while let Some(Reverse(node)) = self.open.pop() {
            if self.closed[node.index] {
                continue;
            }
            self.closed[node.index] = true;

            if node.index == goal {
                return Ok(self.reconstruct(width, goal));
            }

            let cell = coord(width, node.index);
            let next_cost = self.costs[node.index].saturating_add(1);

            for direction in Direction::ALL {
                let Some(neighbor) = cell.step(direction) else {
                    continue;
                };
                let Some(neighbor_index) = index(width, height, neighbor) else {
                    continue;
                };
                if self.closed[neighbor_index] || next_cost >= self.costs[neighbor_index] {
                    continue;
                }
                if !is_passable(neighbor) {
                    continue;
                }

                self.costs[neighbor_index] = next_cost;
                self.came_from[neighbor_index] = Some(node.index);
                sequence += 1;
                let remaining = neighbor.manhattan_distance(to);
                self.open.push(Reverse(OpenNode {
                    estimate: next_cost.saturating_add(remaining),
                    remaining,
                    sequence,
                    index: neighbor_index,
                }));
            }
        }

        Err(not_found)
    }

    fn prepare(&mut self, width: u32, height: u32) {
        let cell_count = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);

        self.costs.clear();
        self.costs.resize(cell_count, u32::MAX);
        self.came_from.clear();
        self.came_from.resize(cell_count, None);
        self.closed.clear();
        self.closed.resize(cell_count, false);
        self.open.clear();
    }

    fn reconstruct(&self, width: u32, goal: usize) -> Vec<CellCoord> {
        let mut path = vec![coord(width, goal)];
        let mut current = goal;
        while let Some(previous) = self.came_from[current] {
            path.push(coord(width, previous));
            current = previous;
        }
        path.reverse();
        path
    }
}

fn index(width: u32, height: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() >= width || cell.row() >= height {
        return None;
    }
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    let width = usize::try_from(width).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

fn coord(width: u32, index: usize) -> CellCoord {
    let index = u32::try_from(index).unwrap_or(u32::MAX);
    CellCoord::new(index % width, index / width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous(path: &[CellCoord]) {
        for pair in path.windows(2) {
            assert!(
                Direction::between(pair[0], pair[1]).is_some(),
                "{} and {} are not neighbours",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn open_grid_path_is_manhattan_shortest() {
        let mut planner = PathPlanner::new();
        let from = CellCoord::new(1, 1);
        let to = CellCoord::new(6, 4);

        let path = planner
            .find_path(8, 8, from, to, |_| true)
            .expect("open grid is connected");

        assert_eq!(path.first(), Some(&from));
        assert_eq!(path.last(), Some(&to));
        assert_eq!(path.len(), from.manhattan_distance(to) as usize + 1);
        assert_contiguous(&path);
    }

    #[test]
    fn path_to_own_cell_is_just_the_start() {
        let mut planner = PathPlanner::new();
        let cell = CellCoord::new(2, 2);

        let path = planner
            .find_path(5, 5, cell, cell, |_| true)
            .expect("trivial route");

        assert_eq!(path, vec![cell]);
    }

    #[test]
    fn path_detours_around_blocked_cells() {
        let mut planner = PathPlanner::new();
        let from = CellCoord::new(0, 2);
        let to = CellCoord::new(4, 2);
        let blocked = |cell: CellCoord| cell.column() == 2 && cell.row() > 0;

        let path = planner
            .find_path(5, 5, from, to, |cell| !blocked(cell))
            .expect("gap at the top row");

        assert!(path.iter().all(|cell| !blocked(*cell)));
        assert!(path.contains(&CellCoord::new(2, 0)));
        assert_eq!(path.len(), 9);
        assert_contiguous(&path);
    }

    #[test]
    fn sealed_target_is_not_found() {
        let mut planner = PathPlanner::new();
        let from = CellCoord::new(0, 0);
        let to = CellCoord::new(3, 3);
        let wall = |cell: CellCoord| cell.column() == 2 || cell.row() == 2;

        let error = planner
            .find_path(5, 5, from, to, |cell| !wall(cell))
            .expect_err("target is fenced off");

        assert_eq!(error, PlanningError::NotFound { from, to });
    }

    #[test]
    fn out_of_bounds_endpoints_are_not_found() {
        let mut planner = PathPlanner::new();
        let from = CellCoord::new(0, 0);
        let to = CellCoord::new(9, 0);

        assert!(planner.find_path(4, 4, from, to, |_| true).is_err());
    }

    #[test]
    fn planner_reuses_buffers_between_grids() {
        let mut planner = PathPlanner::new();
        let first = planner
            .find_path(10, 10, CellCoord::new(1, 1), CellCoord::new(8, 8), |_| true)
            .expect("route");
        let second = planner
            .find_path(3, 3, CellCoord::new(0, 0), CellCoord::new(2, 2), |_| true)
            .expect("route");

        assert_eq!(first.len(), 15);
        assert_eq!(second.len(), 5);
    }
}
