//! Registry of cells claimed as tower targets.

use std::collections::BTreeSet;

use warehouse_core::CellCoord;

/// Set of nominated tower cells.
///
/// Entries are never removed, including after a tower completes, so a tower
/// cell is never mistaken for a source of loose boxes.
#[derive(Clone, Debug, Default)]
pub(crate) struct TowerRegistry {
    cells: BTreeSet<CellCoord>,
}

impl TowerRegistry {
    /// Creates an empty tower registry.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers the cell, returning `true` when it was not yet a tower.
    pub(crate) fn insert(&mut self, cell: CellCoord) -> bool {
        self.cells.insert(cell)
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Registered cells in ascending `(x, y)` order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }
}
