#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the stackbots warehouse.
//!
//! The world owns the static [`WorldGrid`], every entity on the floor, and a
//! cell to entity index kept in step with every move. Systems never mutate it
//! directly: they submit [`Command`] values to [`apply`] and read the
//! resulting [`Event`] values, or inspect the world through [`query`].

mod entity;
mod grid;
mod navigation;
mod occupancy;

use rand::Rng;
use stackbots_core::{
    CellCoord, CellKind, Command, ConfigurationError, Direction, EntityId, Event,
    SimulationConfig, STACK_CAPACITY,
};
use tracing::{debug, trace};

use self::{
    entity::{Entity, Item, Robot, Wall},
    occupancy::OccupancyIndex,
};

pub use self::{grid::WorldGrid, navigation::PathPlanner};

/// Represents the authoritative warehouse world.
#[derive(Clone, Debug)]
pub struct World {
    grid: WorldGrid,
    entities: Vec<Entity>,
    occupancy: OccupancyIndex,
    seed_cells: Vec<CellCoord>,
}

impl World {
    /// Seeds a fresh world from the provided configuration.
    pub fn generate<R>(config: &SimulationConfig, rng: &mut R) -> Result<Self, ConfigurationError>
    where
        R: Rng + ?Sized,
    {
        let grid = WorldGrid::seeded(config, rng)?;
        Ok(Self::from_grid(grid))
    }

    /// Populates a world from an already classified grid.
    ///
    /// Entities are created in row-major order: one item per item seed, one
    /// robot per robot origin, and one wall per perimeter cell.
    #[must_use]
    pub fn from_grid(grid: WorldGrid) -> Self {
        let mut world = Self {
            occupancy: OccupancyIndex::new(grid.width(), grid.height()),
            entities: Vec::new(),
            seed_cells: Vec::new(),
            grid,
        };

        let layout: Vec<(CellCoord, CellKind)> = world.grid.iter().collect();
        for (cell, kind) in layout {
            match kind {
                CellKind::Item => {
                    let _ = world.spawn(|id| Entity::Item(Item::new(id, cell)));
                    world.seed_cells.push(cell);
                }
                CellKind::RobotStart => {
                    let _ = world.spawn(|id| Entity::Robot(Robot::new(id, cell)));
                }
                CellKind::Wall => {
                    let _ = world.spawn(|id| Entity::Wall(Wall { id, cell }));
                }
                CellKind::Empty => {}
            }
        }

        world
    }

    fn spawn<F>(&mut self, make: F) -> EntityId
    where
        F: FnOnce(EntityId) -> Entity,
    {
        let id = EntityId::new(u32::try_from(self.entities.len()).unwrap_or(u32::MAX));
        let entity = make(id);
        self.occupancy.place(id, entity.cell());
        self.entities.push(entity);
        id
    }

    fn entity(&self, id: EntityId) -> Option<&Entity> {
        let index = usize::try_from(id.get()).ok()?;
        self.entities.get(index)
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let index = usize::try_from(id.get()).ok()?;
        self.entities.get_mut(index)
    }

    fn robot(&self, id: EntityId) -> Option<&Robot> {
        self.entity(id).and_then(Entity::as_robot)
    }

    fn robot_mut(&mut self, id: EntityId) -> Option<&mut Robot> {
        self.entity_mut(id).and_then(Entity::as_robot_mut)
    }

    fn stack_size(&self, cell: CellCoord) -> usize {
        self.occupancy
            .occupants(cell)
            .iter()
            .filter(|id| self.entity(**id).is_some_and(Entity::is_active_item))
            .count()
    }

    fn lone_item(&self, cell: CellCoord) -> Option<EntityId> {
        let mut active = self
            .occupancy
            .occupants(cell)
            .iter()
            .copied()
            .filter(|id| self.entity(*id).is_some_and(Entity::is_active_item));
        match (active.next(), active.next()) {
            (Some(item), None) => Some(item),
            _ => None,
        }
    }

    fn pick_up(&mut self, robot_id: EntityId, item_id: EntityId, out_events: &mut Vec<Event>) {
        let Some(robot) = self.robot(robot_id) else {
            return;
        };
        if robot.carrying || !robot.route.is_empty() {
            return;
        }

        let cell = robot.cell;
        if self.lone_item(cell) != Some(item_id) {
            return;
        }

        if let Some(item) = self.entity_mut(item_id).and_then(Entity::as_item_mut) {
            item.active = false;
        }
        if let Some(robot) = self.robot_mut(robot_id) {
            robot.carrying = true;
        }

        debug!(robot = %robot_id, item = %item_id, %cell, "item picked up");
        out_events.push(Event::ItemPickedUp {
            robot: robot_id,
            item: item_id,
            cell,
        });
    }

    fn assign_route(
        &mut self,
        robot_id: EntityId,
        route: Vec<CellCoord>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(start) = self.robot(robot_id).map(|robot| robot.cell) else {
            return;
        };
        let Some(destination) = route.last().copied() else {
            return;
        };
        if !self.route_is_walkable(start, &route) {
            trace!(robot = %robot_id, "rejected disconnected route");
            return;
        }

        let length = route.len();
        if let Some(robot) = self.robot_mut(robot_id) {
            robot.route = route.into();
        }

        out_events.push(Event::RouteAssigned {
            robot: robot_id,
            destination,
            length,
        });
    }

    fn route_is_walkable(&self, start: CellCoord, route: &[CellCoord]) -> bool {
        let mut previous = start;
        route.iter().all(|cell| {
            let connected = self.grid.contains(*cell) && Direction::between(previous, *cell).is_some();
            previous = *cell;
            connected
        })
    }

    fn advance_robot(&mut self, robot_id: EntityId, out_events: &mut Vec<Event>) {
        let Some(robot) = self.robot_mut(robot_id) else {
            return;
        };
        let Some(next) = robot.route.pop_front() else {
            return;
        };

        let from = robot.cell;
        robot.cell = next;
        let delivering = robot.carrying && robot.route.is_empty();

        self.occupancy.relocate(robot_id, from, next);
        out_events.push(Event::RobotMoved {
            robot: robot_id,
            from,
            to: next,
        });

        if !delivering {
            return;
        }

        let stack_size = self.stack_size(next);
        if stack_size >= STACK_CAPACITY {
            debug!(robot = %robot_id, cell = %next, stack_size, "destination stack already full");
            out_events.push(Event::DeliveryRefused {
                robot: robot_id,
                cell: next,
                stack_size,
            });
            return;
        }

        if let Some(robot) = self.robot_mut(robot_id) {
            robot.carrying = false;
        }
        let item = self.spawn(|id| Entity::Item(Item::new(id, next)));

        debug!(robot = %robot_id, %item, cell = %next, stack_size = stack_size + 1, "item delivered");
        out_events.push(Event::ItemDelivered {
            robot: robot_id,
            item,
            cell: next,
            stack_size: stack_size + 1,
        });
    }

    fn walk_robot(&mut self, robot_id: EntityId, direction: Direction, out_events: &mut Vec<Event>) {
        let Some(robot) = self.robot(robot_id) else {
            return;
        };
        if !robot.route.is_empty() {
            return;
        }

        let from = robot.cell;
        let destination = from
            .step(direction)
            .filter(|cell| self.grid.classify(*cell) != CellKind::Wall);

        let Some(to) = destination else {
            out_events.push(Event::WalkBlocked {
                robot: robot_id,
                direction,
            });
            return;
        };

        if let Some(robot) = self.robot_mut(robot_id) {
            robot.cell = to;
        }
        self.occupancy.relocate(robot_id, from, to);
        out_events.push(Event::RobotMoved {
            robot: robot_id,
            from,
            to,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands naming unknown entities, or that are not legal for the robot's
/// current state, are ignored and produce no events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PickUpItem { robot, item } => world.pick_up(robot, item, out_events),
        Command::AssignRoute { robot, route } => world.assign_route(robot, route, out_events),
        Command::AdvanceRobot { robot } => world.advance_robot(robot, out_events),
        Command::WalkRobot { robot, direction } => world.walk_robot(robot, direction, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Entity, World, WorldGrid};
    use stackbots_core::{
        CellCoord, EntityId, ItemSnapshot, ItemView, RobotSnapshot, RobotView,
    };

    /// Provides read-only access to the static floor classification.
    #[must_use]
    pub fn grid(world: &World) -> &WorldGrid {
        &world.grid
    }

    /// Identifiers of every entity in creation order.
    #[must_use]
    pub fn entity_ids(world: &World) -> Vec<EntityId> {
        world.entities.iter().map(Entity::id).collect()
    }

    /// Captures a read-only view of every robot.
    #[must_use]
    pub fn robot_view(world: &World) -> RobotView {
        let snapshots: Vec<RobotSnapshot> = world
            .entities
            .iter()
            .filter_map(Entity::as_robot)
            .map(|robot| robot.snapshot())
            .collect();
        RobotView::from_snapshots(snapshots)
    }

    /// Captures a snapshot of a single robot, if the identifier names one.
    #[must_use]
    pub fn robot(world: &World, id: EntityId) -> Option<RobotSnapshot> {
        world.robot(id).map(|robot| robot.snapshot())
    }

    /// Captures a read-only view of every item, lifted ones included.
    #[must_use]
    pub fn item_view(world: &World) -> ItemView {
        let snapshots: Vec<ItemSnapshot> = world
            .entities
            .iter()
            .filter_map(Entity::as_item)
            .map(|item| item.snapshot())
            .collect();
        ItemView::from_snapshots(snapshots)
    }

    /// Number of active items lying on the cell.
    #[must_use]
    pub fn stack_size(world: &World, cell: CellCoord) -> usize {
        world.stack_size(cell)
    }

    /// The item on the cell when it is the only active one there.
    #[must_use]
    pub fn lone_item(world: &World, cell: CellCoord) -> Option<EntityId> {
        world.lone_item(cell)
    }

    /// Every entity currently present on the cell.
    #[must_use]
    pub fn occupants(world: &World, cell: CellCoord) -> &[EntityId] {
        world.occupancy.occupants(cell)
    }

    /// Cells that received an item during seeding, in row-major order.
    #[must_use]
    pub fn seed_cells(world: &World) -> &[CellCoord] {
        &world.seed_cells
    }

    /// Number of items the world was seeded with.
    ///
    /// Deliveries replace the lifted item with a new one, so this total holds
    /// for the whole run.
    #[must_use]
    pub fn total_items(world: &World) -> usize {
        world.seed_cells.len()
    }
}
