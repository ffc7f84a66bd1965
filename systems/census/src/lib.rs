#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stack census over the cells where items were originally seeded.
//!
//! Robots only ever deliver onto cells that already hold items, so every
//! active item lies on one of the seed cells. Counting those cells is enough
//! to see every stack on the floor.

use stackbots_core::{CellCoord, StackCount};

/// Result of counting the active items on every seed cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackCensus {
    stacks: Vec<StackCount>,
    total_items: usize,
}

impl StackCensus {
    /// Counts the items on each seed cell, preserving the order of `seed_cells`.
    pub fn take<F>(seed_cells: &[CellCoord], total_items: usize, mut stack_size: F) -> Self
    where
        F: FnMut(CellCoord) -> usize,
    {
        let stacks = seed_cells
            .iter()
            .map(|cell| StackCount {
                cell: *cell,
                item_count: stack_size(*cell),
            })
            .collect();

        Self {
            stacks,
            total_items,
        }
    }

    /// Per-cell counts in seed order.
    #[must_use]
    pub fn stacks(&self) -> &[StackCount] {
        &self.stacks
    }

    /// Items lying on a cell of their own.
    #[must_use]
    pub fn lone_items(&self) -> usize {
        self.stacks
            .iter()
            .filter(|stack| stack.item_count == 1)
            .count()
    }

    /// Items that share their cell with at least one other item.
    #[must_use]
    pub fn stacked_items(&self) -> usize {
        self.stacks
            .iter()
            .map(|stack| stack.item_count)
            .filter(|count| *count > 1)
            .sum()
    }

    /// Reports whether every item sits in a stack of two or more.
    ///
    /// Lifted items are not on the floor, so a robot still carrying one keeps
    /// the run unfinished. A floor seeded without items never consolidates.
    #[must_use]
    pub fn is_consolidated(&self) -> bool {
        self.total_items > 0 && self.stacked_items() == self.total_items
    }
}
