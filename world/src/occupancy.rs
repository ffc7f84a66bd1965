//! Cell to entity index for the multi-occupancy floor.

use stackbots_core::{CellCoord, EntityId};

/// Dense row-major index listing the entities present on every cell.
///
/// A cell may hold any number of entities: stacked items, a robot passing
/// over them, and the lifted items that remain where they were picked up.
#[derive(Clone, Debug)]
pub(crate) struct OccupancyIndex {
    columns: u32,
    rows: u32,
    cells: Vec<Vec<EntityId>>,
}

impl OccupancyIndex {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![Vec::new(); capacity],
        }
    }

    pub(crate) fn place(&mut self, entity: EntityId, cell: CellCoord) {
        if let Some(slot) = self.slot_mut(cell) {
            slot.push(entity);
        }
    }

    pub(crate) fn relocate(&mut self, entity: EntityId, from: CellCoord, to: CellCoord) {
        if let Some(slot) = self.slot_mut(from) {
            if let Some(position) = slot.iter().position(|candidate| *candidate == entity) {
                let _ = slot.remove(position);
            }
        }
        self.place(entity, to);
    }

    pub(crate) fn occupants(&self, cell: CellCoord) -> &[EntityId] {
        self.index(cell)
            .and_then(|index| self.cells.get(index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn slot_mut(&mut self, cell: CellCoord) -> Option<&mut Vec<EntityId>> {
        let index = self.index(cell)?;
        self.cells.get_mut(index)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
