//! Multi-occupant spatial index over the warehouse floor.

use std::collections::BTreeMap;

use warehouse_core::{CellCoord, Neighborhood, Occupant, WarehouseError};

/// Bounded, non-wrapping grid recording which agents stand on which cell.
///
/// Any number of agents may share a cell. Each cell keeps its occupants in
/// arrival order, and a reverse index maps every agent back to its cell so
/// removal and movement do not scan the floor.
#[derive(Clone, Debug)]
pub(crate) struct SpatialGrid {
    width: u32,
    height: u32,
    cells: Vec<Vec<Occupant>>,
    positions: BTreeMap<Occupant, CellCoord>,
}

impl SpatialGrid {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![Vec::new(); capacity],
            positions: BTreeMap::new(),
        }
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Cells around `cell`, clipped to the floor, in ascending `(x, y)` order.
    pub(crate) fn neighborhood(
        &self,
        cell: CellCoord,
        shape: Neighborhood,
        include_center: bool,
    ) -> Vec<CellCoord> {
        let mut cells = Vec::with_capacity(9);
        let column = i64::from(cell.column());
        let row = i64::from(cell.row());

        for dx in -1_i64..=1 {
            for dy in -1_i64..=1 {
                let is_center = dx == 0 && dy == 0;
                if is_center && !include_center {
                    continue;
                }
                if shape == Neighborhood::Orthogonal && dx != 0 && dy != 0 {
                    continue;
                }

                let (Ok(x), Ok(y)) = (u32::try_from(column + dx), u32::try_from(row + dy)) else {
                    continue;
                };
                let candidate = CellCoord::new(x, y);
                if self.contains(candidate) {
                    cells.push(candidate);
                }
            }
        }

        cells
    }

    pub(crate) fn occupants(&self, cell: CellCoord) -> &[Occupant] {
        self.index(cell)
            .and_then(|index| self.cells.get(index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn is_empty(&self, cell: CellCoord) -> bool {
        self.occupants(cell).is_empty()
    }

    pub(crate) fn position(&self, occupant: Occupant) -> Option<CellCoord> {
        self.positions.get(&occupant).copied()
    }

    pub(crate) fn place(
        &mut self,
        occupant: Occupant,
        cell: CellCoord,
    ) -> Result<(), WarehouseError> {
        let index = self.checked_index(cell)?;
        self.cells[index].push(occupant);
        let _ = self.positions.insert(occupant, cell);
        Ok(())
    }

    /// Takes the agent off the floor, reporting the cell it stood on.
    pub(crate) fn remove(&mut self, occupant: Occupant) -> Option<CellCoord> {
        let cell = self.positions.remove(&occupant)?;
        if let Some(index) = self.index(cell) {
            let slot = &mut self.cells[index];
            if let Some(offset) = slot.iter().position(|entry| *entry == occupant) {
                let _ = slot.remove(offset);
            }
        }
        Some(cell)
    }

    /// Relocates an agent that is already on the floor.
    pub(crate) fn move_to(
        &mut self,
        occupant: Occupant,
        cell: CellCoord,
    ) -> Result<Option<CellCoord>, WarehouseError> {
        let _ = self.checked_index(cell)?;
        let from = self.remove(occupant);
        self.place(occupant, cell)?;
        Ok(from)
    }

    fn checked_index(&self, cell: CellCoord) -> Result<usize, WarehouseError> {
        self.index(cell).ok_or(WarehouseError::OutOfBounds {
            cell,
            width: self.width,
            height: self.height,
        })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let height = usize::try_from(self.height).ok()?;
        column.checked_mul(height)?.checked_add(row)
    }
}
