#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the stackbots warehouse simulation.
//!
//! This crate defines the message surface that connects the authoritative
//! world, the pure systems, and the adapters. Systems inspect immutable
//! snapshots and respond with [`Command`] values, the world executes those
//! commands through its `apply` entry point, and reports the outcome as
//! [`Event`] values. Adapters only ever see the wire-level
//! [`SimulationState`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of items a single stack may hold.
pub const STACK_CAPACITY: usize = 5;

/// Manhattan radius scanned by a laden robot when looking for a stack.
pub const SEARCH_RADIUS: u32 = 8;

/// Seed applied when a configuration does not name one.
pub const DEFAULT_SEED: u64 = 0x5a17_c0de_9b3e_4471;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that a robot lift the lone item lying on its current cell.
    PickUpItem {
        /// Robot performing the pickup.
        robot: EntityId,
        /// Item that should be lifted.
        item: EntityId,
    },
    /// Replaces a robot's route with the provided sequence of cells.
    ///
    /// The route must not include the robot's current cell and every hop
    /// must be a cardinal neighbour of the previous one.
    AssignRoute {
        /// Robot receiving the route.
        robot: EntityId,
        /// Remaining cells to visit, nearest first.
        route: Vec<CellCoord>,
    },
    /// Moves a robot onto the next cell of its route.
    AdvanceRobot {
        /// Robot following its route.
        robot: EntityId,
    },
    /// Requests a single idle step in the provided direction.
    WalkRobot {
        /// Robot wandering the floor.
        robot: EntityId,
        /// Direction of the attempted step.
        direction: Direction,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a robot lifted a loose item.
    ItemPickedUp {
        /// Robot that lifted the item.
        robot: EntityId,
        /// Item that was deactivated.
        item: EntityId,
        /// Cell the item was lifted from.
        cell: CellCoord,
    },
    /// Confirms that a robot accepted a new route.
    RouteAssigned {
        /// Robot that received the route.
        robot: EntityId,
        /// Final cell of the route.
        destination: CellCoord,
        /// Number of hops in the route.
        length: usize,
    },
    /// Confirms that a robot moved between two cells.
    RobotMoved {
        /// Robot that moved.
        robot: EntityId,
        /// Cell occupied before the move.
        from: CellCoord,
        /// Cell occupied after the move.
        to: CellCoord,
    },
    /// Confirms that a robot set its load down onto a stack.
    ItemDelivered {
        /// Robot that completed the delivery.
        robot: EntityId,
        /// Item spawned onto the stack.
        item: EntityId,
        /// Cell that holds the stack.
        cell: CellCoord,
        /// Number of items on the stack after the delivery.
        stack_size: usize,
    },
    /// Reports that the destination stack filled up before the robot arrived.
    DeliveryRefused {
        /// Robot still carrying its item.
        robot: EntityId,
        /// Cell of the full stack.
        cell: CellCoord,
        /// Number of items found on the stack.
        stack_size: usize,
    },
    /// Reports that an idle step was rejected because the target is a wall.
    WalkBlocked {
        /// Robot that stayed in place.
        robot: EntityId,
        /// Direction of the rejected step.
        direction: Direction,
    },
}

/// Unique identifier assigned to every entity in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell reached by a single step in `direction`, if it does not underflow.
    ///
    /// Upper bounds are not checked; callers compare against their grid.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
            Direction::South => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Cardinal movement directions available to robots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction that leads from `from` to the adjacent cell `to`.
    ///
    /// Returns `None` when the cells are not cardinal neighbours.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Direction> {
        let column_diff = from.column().abs_diff(to.column());
        let row_diff = from.row().abs_diff(to.row());

        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.column() > from.column() {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if to.row() > from.row() {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }
}

/// Static classification of a grid cell captured when the world is seeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CellKind {
    /// Free floor.
    #[default]
    Empty,
    /// Floor that received an item during seeding.
    Item,
    /// Floor that received a robot during seeding.
    RobotStart,
    /// Impassable perimeter.
    Wall,
}

/// Immutable representation of a single robot used for decisions and queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RobotSnapshot {
    /// Unique identifier assigned to the robot.
    pub id: EntityId,
    /// Grid cell currently occupied by the robot.
    pub cell: CellCoord,
    /// Indicates whether the robot holds an item.
    pub carrying: bool,
    /// Head of the remaining route, if any.
    pub next_hop: Option<CellCoord>,
    /// Number of cells left on the route.
    pub route_len: usize,
}

impl RobotSnapshot {
    /// Reports whether the robot still has cells left to visit.
    #[must_use]
    pub const fn has_route(&self) -> bool {
        self.route_len > 0
    }
}

/// Read-only snapshot describing all robots in the world.
#[derive(Clone, Debug, Default)]
pub struct RobotView {
    snapshots: Vec<RobotSnapshot>,
}

impl RobotView {
    /// Creates a new robot view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<RobotSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured robot snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &RobotSnapshot> {
        self.snapshots.iter()
    }

    /// Number of robots that currently hold an item.
    #[must_use]
    pub fn carrying_count(&self) -> usize {
        self.snapshots.iter().filter(|robot| robot.carrying).count()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<RobotSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemSnapshot {
    /// Unique identifier assigned to the item.
    pub id: EntityId,
    /// Cell the item lies on.
    pub cell: CellCoord,
    /// False once a robot has lifted the item.
    pub active: bool,
}

/// Read-only snapshot describing all items in the world.
#[derive(Clone, Debug, Default)]
pub struct ItemView {
    snapshots: Vec<ItemSnapshot>,
}

impl ItemView {
    /// Creates a new item view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ItemSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured item snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemSnapshot> {
        self.snapshots.iter()
    }

    /// Number of items that have not been lifted.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.snapshots.iter().filter(|item| item.active).count()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ItemSnapshot> {
        self.snapshots
    }
}

/// Number of active items found on a census cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StackCount {
    /// Cell that was inspected.
    pub cell: CellCoord,
    /// Active items lying on the cell.
    pub item_count: usize,
}

/// Tunable parameters for a single simulation run.
///
/// Missing fields fall back to [`SimulationConfig::default`] when the
/// configuration is deserialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of grid columns, perimeter included.
    pub width: u32,
    /// Number of grid rows, perimeter included.
    pub height: u32,
    /// Robots placed on the floor.
    pub robots: u32,
    /// Items scattered across the floor.
    pub items: u32,
    /// Step budget after which the run times out.
    pub max_steps: u64,
    /// Seed for every random choice made during the run.
    pub seed: u64,
}

impl SimulationConfig {
    /// Number of floor cells enclosed by the perimeter wall.
    #[must_use]
    pub fn interior_cells(&self) -> u64 {
        u64::from(self.width.saturating_sub(2)) * u64::from(self.height.saturating_sub(2))
    }

    /// Checks that the requested robots and items fit on the floor.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.width < 3 || self.height < 3 {
            return Err(ConfigurationError::GridTooSmall {
                width: self.width,
                height: self.height,
            });
        }

        let requested = u64::from(self.robots) + u64::from(self.items);
        let available = self.interior_cells();
        if requested > available {
            return Err(ConfigurationError::TooManyEntities {
                requested,
                available,
            });
        }

        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            robots: 5,
            items: 30,
            max_steps: 300,
            seed: DEFAULT_SEED,
        }
    }
}

/// Reasons a simulation configuration may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The grid is too small to enclose any floor.
    #[error("a {width}x{height} grid has no floor inside its perimeter wall")]
    GridTooSmall {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// More robots and items were requested than there are floor cells.
    #[error("{requested} robots and items requested but only {available} floor cells exist")]
    TooManyEntities {
        /// Robots plus items requested.
        requested: u64,
        /// Floor cells inside the perimeter.
        available: u64,
    },
}

/// Reasons the path planner may fail to produce a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PlanningError {
    /// No traversable route connects the two cells.
    #[error("no route from {from} to {to}")]
    NotFound {
        /// Cell the search started from.
        from: CellCoord,
        /// Cell the search tried to reach.
        to: CellCoord,
    },
}

/// Lifecycle of a simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The run still accepts steps.
    Running,
    /// Every item ended up in a stack of two or more.
    Succeeded,
    /// The step budget ran out first.
    TimedOut,
}

impl RunStatus {
    /// Reports whether the run still accepts steps.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Wire-level robot entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RobotState {
    /// Robot identifier.
    pub id: u32,
    /// Column of the robot.
    pub x: u32,
    /// Row of the robot.
    pub y: u32,
    /// Whether the robot holds an item.
    pub carrying: bool,
}

/// Wire-level item entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemState {
    /// Item identifier.
    pub id: u32,
    /// Column of the item.
    pub x: u32,
    /// Row of the item.
    pub y: u32,
    /// False once a robot lifted the item.
    pub active: bool,
}

/// Wire-level census entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackState {
    /// Column of the census cell.
    pub x: u32,
    /// Row of the census cell.
    pub y: u32,
    /// Active items on the cell.
    pub item_count: usize,
}

impl From<StackCount> for StackState {
    fn from(count: StackCount) -> Self {
        Self {
            x: count.cell.column(),
            y: count.cell.row(),
            item_count: count.item_count,
        }
    }
}

/// Observable state of a run returned to external callers after each step.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimulationState {
    /// Steps completed so far.
    pub step: u64,
    /// Whether the run is still going and how it ended.
    pub status: RunStatus,
    /// Robot activations performed so far (steps times robots).
    pub robot_moves: u64,
    /// Every robot in identifier order.
    pub robots: Vec<RobotState>,
    /// Every item in identifier order, lifted ones included.
    pub items: Vec<ItemState>,
    /// Latest census over the seed cells in row-major order.
    pub stacks: Vec<StackState>,
}

impl SimulationState {
    /// Sum of items across census cells.
    #[must_use]
    pub fn stacked_items(&self) -> usize {
        self.stacks.iter().map(|stack| stack.item_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn step_refuses_to_underflow() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.step(Direction::North), None);
        assert_eq!(corner.step(Direction::West), None);
        assert_eq!(corner.step(Direction::East), Some(CellCoord::new(1, 0)));
        assert_eq!(corner.step(Direction::South), Some(CellCoord::new(0, 1)));
    }

    #[test]
    fn direction_between_neighbors() {
        let origin = CellCoord::new(3, 3);
        for direction in Direction::ALL {
            let neighbor = origin.step(direction).expect("interior cell");
            assert_eq!(Direction::between(origin, neighbor), Some(direction));
        }
        assert_eq!(Direction::between(origin, origin), None);
        assert_eq!(Direction::between(origin, CellCoord::new(4, 4)), None);
    }

    #[test]
    fn default_config_matches_warehouse_layout() {
        let config = SimulationConfig::default();
        assert_eq!((config.width, config.height), (10, 10));
        assert_eq!(config.robots, 5);
        assert_eq!(config.items, 30);
        assert_eq!(config.max_steps, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_overcrowded_floor() {
        let config = SimulationConfig {
            width: 4,
            height: 4,
            robots: 1,
            items: 5,
            ..SimulationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::TooManyEntities {
                requested: 6,
                available: 4,
            })
        );
    }

    #[test]
    fn validate_rejects_grid_without_floor() {
        let config = SimulationConfig {
            width: 2,
            height: 8,
            robots: 0,
            items: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::GridTooSmall {
                width: 2,
                height: 8
            })
        ));
    }

    #[test]
    fn simulation_state_round_trips_through_bincode() {
        let state = SimulationState {
            step: 7,
            status: RunStatus::Running,
            robot_moves: 14,
            robots: vec![RobotState {
                id: 3,
                x: 2,
                y: 4,
                carrying: true,
            }],
            items: vec![ItemState {
                id: 1,
                x: 5,
                y: 5,
                active: false,
            }],
            stacks: vec![StackState {
                x: 5,
                y: 5,
                item_count: 0,
            }],
        };

        let bytes = bincode::serialize(&state).expect("serialize");
        let restored: SimulationState = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, state);
    }
}
