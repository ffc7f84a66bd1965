#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Robot decision system that turns one activation into world commands.
//!
//! Each activation evaluates the robot's situation in strict priority order:
//! lift a lone item it is standing on, keep following an existing route,
//! look for a stack again when it still carries an item, and otherwise
//! wander one random step.

use rand::{seq::SliceRandom, Rng};
use stackbots_core::{
    CellCoord, CellKind, Command, Direction, RobotSnapshot, SEARCH_RADIUS, STACK_CAPACITY,
};
use stackbots_world::{query, PathPlanner, World};
use tracing::{debug, warn};

/// Pure system that decides what a robot does when it is activated.
#[derive(Debug)]
pub struct Robots {
    search_radius: u32,
    planner: PathPlanner,
}

impl Robots {
    /// Creates a system that looks for stacks within `search_radius` cells.
    #[must_use]
    pub fn new(search_radius: u32) -> Self {
        Self {
            search_radius,
            planner: PathPlanner::new(),
        }
    }

    /// Emits the commands for a single robot activation.
    ///
    /// At most two commands are produced: a pickup followed by the route to
    /// the chosen stack. They should be applied before any other entity is
    /// activated.
    pub fn activate<R>(
        &mut self,
        robot: &RobotSnapshot,
        world: &World,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        if !robot.carrying && !robot.has_route() {
            if let Some(item) = query::lone_item(world, robot.cell) {
                out.push(Command::PickUpItem {
                    robot: robot.id,
                    item,
                });
                self.plan_delivery(robot, world, out);
                return;
            }
        }

        if robot.has_route() {
            out.push(Command::AdvanceRobot { robot: robot.id });
            return;
        }

        if robot.carrying {
            self.plan_delivery(robot, world, out);
            return;
        }

        wander(robot, world, rng, out);
    }

    fn plan_delivery(&mut self, robot: &RobotSnapshot, world: &World, out: &mut Vec<Command>) {
        let Some(destination) = self.find_destination(robot.cell, world) else {
            debug!(robot = %robot.id, cell = %robot.cell, "no stack within reach");
            return;
        };

        let grid = query::grid(world);
        match self
            .planner
            .find_path(grid.width(), grid.height(), robot.cell, destination, |_| true)
        {
            Ok(path) => {
                let route: Vec<CellCoord> = path.into_iter().skip(1).collect();
                if !route.is_empty() {
                    out.push(Command::AssignRoute {
                        robot: robot.id,
                        route,
                    });
                }
            }
            Err(error) => {
                warn!(robot = %robot.id, %error, "route planning failed");
            }
        }
    }

    /// First cell around `origin`, in row-major order, holding a stack that
    /// still has room.
    fn find_destination(&self, origin: CellCoord, world: &World) -> Option<CellCoord> {
        query::grid(world)
            .neighbors_within_radius(origin, self.search_radius)
            .into_iter()
            .find(|cell| {
                let size = query::stack_size(world, *cell);
                size > 0 && size < STACK_CAPACITY
            })
    }
}

impl Default for Robots {
    fn default() -> Self {
        Self::new(SEARCH_RADIUS)
    }
}

fn wander<R>(robot: &RobotSnapshot, world: &World, rng: &mut R, out: &mut Vec<Command>)
where
    R: Rng + ?Sized,
{
    let grid = query::grid(world);
    let candidates: Vec<CellCoord> = grid.neighbors4(robot.cell).collect();
    let Some(&next) = candidates.choose(rng) else {
        return;
    };

    if grid.classify(next) == CellKind::Wall {
        return;
    }

    if let Some(direction) = Direction::between(robot.cell, next) {
        out.push(Command::WalkRobot {
            robot: robot.id,
            direction,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use stackbots_world::WorldGrid;

    fn world_with(items: &[CellCoord], robot: CellCoord) -> World {
        let mut grid = WorldGrid::walled(12, 12);
        for cell in items {
            assert!(grid.place(*cell, CellKind::Item));
        }
        assert!(grid.place(robot, CellKind::RobotStart));
        World::from_grid(grid)
    }

    #[test]
    fn destination_search_follows_row_major_order() {
        let robot = CellCoord::new(5, 5);
        let world = world_with(
            &[CellCoord::new(5, 7), CellCoord::new(3, 4), CellCoord::new(6, 4)],
            robot,
        );
        let robots = Robots::default();

        assert_eq!(
            robots.find_destination(robot, &world),
            Some(CellCoord::new(3, 4))
        );
    }

    #[test]
    fn destination_search_ignores_cells_beyond_radius() {
        let robot = CellCoord::new(1, 1);
        let world = world_with(&[CellCoord::new(10, 10)], robot);

        assert_eq!(Robots::new(8).find_destination(robot, &world), None);
        assert_eq!(
            Robots::new(18).find_destination(robot, &world),
            Some(CellCoord::new(10, 10))
        );
    }

    #[test]
    fn wander_never_targets_walls() {
        let robot_cell = CellCoord::new(1, 1);
        let world = world_with(&[], robot_cell);
        let robot = query::robot_view(&world)
            .into_vec()
            .pop()
            .expect("robot present");
        let mut rng = ChaCha8Rng::seed_from_u64(17);

        for _ in 0..64 {
            let mut commands = Vec::new();
            wander(&robot, &world, &mut rng, &mut commands);
            for command in commands {
                match command {
                    Command::WalkRobot { direction, .. } => {
                        assert!(matches!(direction, Direction::East | Direction::South));
                    }
                    other => panic!("unexpected command {other:?}"),
                }
            }
        }
    }
}
