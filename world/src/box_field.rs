//! Dense per-cell box counts.

use warehouse_core::{CellCoord, LogicError, WarehouseError, TOWER_CAPACITY};

/// Width×height matrix of box counts, stored column-major.
///
/// Counts never exceed [`TOWER_CAPACITY`]; a cell at capacity is a complete
/// tower and refuses further increments.
#[derive(Clone, Debug)]
pub(crate) struct BoxField {
    width: u32,
    height: u32,
    counts: Vec<u8>,
}

impl BoxField {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            height,
            counts: vec![0; capacity],
        }
    }

    /// Box count of the cell, zero outside the floor.
    pub(crate) fn count(&self, cell: CellCoord) -> u8 {
        self.index(cell)
            .and_then(|index| self.counts.get(index).copied())
            .unwrap_or(0)
    }

    /// Checks that one more box fits on the cell.
    pub(crate) fn ensure_room(&self, cell: CellCoord) -> Result<(), WarehouseError> {
        let index = self.checked_index(cell)?;
        if self.counts[index] >= TOWER_CAPACITY {
            return Err(LogicError::TowerOverflow { cell }.into());
        }
        Ok(())
    }

    /// Adds a box to the cell, returning the new count.
    pub(crate) fn increment(&mut self, cell: CellCoord) -> Result<u8, WarehouseError> {
        self.ensure_room(cell)?;
        let index = self.checked_index(cell)?;
        self.counts[index] += 1;
        Ok(self.counts[index])
    }

    /// Removes a box from the cell, returning the new count.
    pub(crate) fn decrement(&mut self, cell: CellCoord) -> Result<u8, WarehouseError> {
        let index = self.checked_index(cell)?;
        let count = &mut self.counts[index];
        if *count == 0 {
            return Err(LogicError::EmptyCell { cell }.into());
        }
        *count -= 1;
        Ok(*count)
    }

    /// Sum of all counts.
    pub(crate) fn total(&self) -> u64 {
        self.counts.iter().map(|count| u64::from(*count)).sum()
    }

    /// Whether every cell is either empty or a complete tower.
    pub(crate) fn is_settled(&self) -> bool {
        self.counts
            .iter()
            .all(|count| *count == 0 || *count == TOWER_CAPACITY)
    }

    /// Counts in column-major order.
    pub(crate) fn counts(&self) -> &[u8] {
        &self.counts
    }

    fn checked_index(&self, cell: CellCoord) -> Result<usize, WarehouseError> {
        self.index(cell).ok_or(WarehouseError::OutOfBounds {
            cell,
            width: self.width,
            height: self.height,
        })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let height = usize::try_from(self.height).ok()?;
        column.checked_mul(height)?.checked_add(row)
    }
}
