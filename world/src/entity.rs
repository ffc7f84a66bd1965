//! Entities that live on the warehouse floor.

use std::collections::VecDeque;

use stackbots_core::{CellCoord, EntityId, ItemSnapshot, RobotSnapshot};

#[derive(Clone, Debug)]
pub(crate) enum Entity {
    Robot(Robot),
    Item(Item),
    Wall(Wall),
}

impl Entity {
    pub(crate) fn id(&self) -> EntityId {
        match self {
            Self::Robot(robot) => robot.id,
            Self::Item(item) => item.id,
            Self::Wall(wall) => wall.id,
        }
    }

    pub(crate) fn cell(&self) -> CellCoord {
        match self {
            Self::Robot(robot) => robot.cell,
            Self::Item(item) => item.cell,
            Self::Wall(wall) => wall.cell,
        }
    }

    /// Items count toward a stack only until a robot lifts them.
    pub(crate) fn is_active_item(&self) -> bool {
        matches!(self, Self::Item(item) if item.active)
    }

    pub(crate) fn as_robot(&self) -> Option<&Robot> {
        match self {
            Self::Robot(robot) => Some(robot),
            _ => None,
        }
    }

    pub(crate) fn as_robot_mut(&mut self) -> Option<&mut Robot> {
        match self {
            Self::Robot(robot) => Some(robot),
            _ => None,
        }
    }

    pub(crate) fn as_item(&self) -> Option<&Item> {
        match self {
            Self::Item(item) => Some(item),
            _ => None,
        }
    }

    pub(crate) fn as_item_mut(&mut self) -> Option<&mut Item> {
        match self {
            Self::Item(item) => Some(item),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Robot {
    pub(crate) id: EntityId,
    pub(crate) cell: CellCoord,
    pub(crate) carrying: bool,
    pub(crate) route: VecDeque<CellCoord>,
}

impl Robot {
    pub(crate) fn new(id: EntityId, cell: CellCoord) -> Self {
        Self {
            id,
            cell,
            carrying: false,
            route: VecDeque::new(),
        }
    }

    pub(crate) fn snapshot(&self) -> RobotSnapshot {
        RobotSnapshot {
            id: self.id,
            cell: self.cell,
            carrying: self.carrying,
            next_hop: self.route.front().copied(),
            route_len: self.route.len(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Item {
    pub(crate) id: EntityId,
    pub(crate) cell: CellCoord,
    pub(crate) active: bool,
}

impl Item {
    pub(crate) fn new(id: EntityId, cell: CellCoord) -> Self {
        Self {
            id,
            cell,
            active: true,
        }
    }

    pub(crate) fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            id: self.id,
            cell: self.cell,
            active: self.active,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Wall {
    pub(crate) id: EntityId,
    pub(crate) cell: CellCoord,
}
