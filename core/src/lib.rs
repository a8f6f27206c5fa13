#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the warehouse simulation.
//!
//! This crate defines the message surface that connects the outer driver, the
//! authoritative world, and the robot decision system. The robot system reads
//! immutable views of the floor and responds with [`Command`] values; the
//! world executes those commands one at a time via its `apply` entry point and
//! broadcasts [`Event`] values describing what changed. Commands applied for
//! one robot are visible to every robot activated after it.

mod error;

pub use error::{LogicError, WarehouseError};

use serde::{Deserialize, Serialize};

/// Number of boxes that make a tower complete.
pub const TOWER_CAPACITY: u8 = 5;

/// Maximum number of boxes stacked on a single cell while scattering the
/// initial population.
pub const INITIAL_STACK_LIMIT: u8 = 3;

/// Snapshot code reported for a cell that currently hosts a robot.
pub const ROBOT_CODE: u8 = 10;

/// Seed used when the caller does not provide one.
pub const DEFAULT_SEED: u64 = 67_890;

/// Unique identifier assigned to a robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RobotId(u32);

impl RobotId {
    /// Creates a new robot identifier with the provided numeric value.
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

/// Unique identifier assigned to a box.
///
/// A box keeps its identifier while it is carried, so the box a robot drops
/// on a tower is the same box it picked up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoxId(u32);

impl BoxId {
    /// Creates a new box identifier with the provided numeric value.
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

/// Location of a single floor cell expressed as column (`x`) and row (`y`).
///
/// Ordering is lexicographic on `(column, row)`, which is also the tie-break
/// used when several tower candidates hold the same number of boxes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new floor cell coordinate.
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

/// Shape of a neighbourhood query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Neighborhood {
    /// The four cells sharing an edge with the centre.
    Orthogonal,
    /// The eight cells sharing an edge or a corner with the centre.
    Full,
}

/// Kind tag carried by every floor occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// A passive box.
    Box,
    /// A box-moving robot.
    Robot,
}

/// Entity standing on a floor cell. Several occupants may share one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Occupant {
    /// A box resting on the floor.
    Box(BoxId),
    /// A robot standing on the cell.
    Robot(RobotId),
}

impl Occupant {
    /// Reports which kind of agent the occupant is.
    #[must_use]
    pub const fn kind(&self) -> AgentKind {
        match self {
            Self::Box(_) => AgentKind::Box,
            Self::Robot(_) => AgentKind::Robot,
        }
    }
}

/// Behavioural state of a robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RobotState {
    /// Searching for a box cluster to nominate as a tower.
    Scouting,
    /// Searching for a loose box near the current position.
    Foraging,
    /// Carrying a box toward the tower target.
    Transporting,
}

/// Task a robot is pursuing, including everything it remembers about it.
///
/// Carrying a box without a tower target cannot be expressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RobotTask {
    /// No target and nothing carried.
    Scouting,
    /// Tower nominated, hands free.
    Foraging {
        /// Cell the robot is building on.
        tower: CellCoord,
    },
    /// Tower nominated and a box in hand.
    Transporting {
        /// Cell the robot is building on.
        tower: CellCoord,
        /// Box being carried.
        box_id: BoxId,
    },
}

impl RobotTask {
    /// Behavioural state associated with the task.
    #[must_use]
    pub const fn state(&self) -> RobotState {
        match self {
            Self::Scouting => RobotState::Scouting,
            Self::Foraging { .. } => RobotState::Foraging,
            Self::Transporting { .. } => RobotState::Transporting,
        }
    }

    /// Whether the robot currently holds a box.
    #[must_use]
    pub const fn carrying_box(&self) -> bool {
        matches!(self, Self::Transporting { .. })
    }

    /// Whether the robot has a tower target.
    #[must_use]
    pub const fn has_tower_target(&self) -> bool {
        !matches!(self, Self::Scouting)
    }

    /// Tower the robot is building on, if any.
    #[must_use]
    pub const fn tower_target(&self) -> Option<CellCoord> {
        match self {
            Self::Scouting => None,
            Self::Foraging { tower } | Self::Transporting { tower, .. } => Some(*tower),
        }
    }

    /// Box the robot is carrying, if any.
    #[must_use]
    pub const fn carried_box(&self) -> Option<BoxId> {
        match self {
            Self::Transporting { box_id, .. } => Some(*box_id),
            _ => None,
        }
    }
}

/// Immutable representation of a single robot's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RobotSnapshot {
    /// Unique identifier assigned to the robot.
    pub id: RobotId,
    /// Floor cell currently occupied by the robot.
    pub cell: CellCoord,
    /// Task the robot is pursuing.
    pub task: RobotTask,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Opens a new activation pass over every robot.
    Tick,
    /// Places a new robot on the provided cell.
    SpawnRobot {
        /// Cell the robot starts on.
        cell: CellCoord,
    },
    /// Places a new box on the provided cell.
    SpawnBox {
        /// Cell receiving the box.
        cell: CellCoord,
    },
    /// Registers a tower cell without any robot claiming it.
    RegisterTower {
        /// Cell added to the tower registry.
        cell: CellCoord,
    },
    /// Moves a robot onto an orthogonally adjacent cell.
    MoveRobot {
        /// Robot being moved.
        robot_id: RobotId,
        /// Destination cell.
        to: CellCoord,
    },
    /// Registers a tower cell and makes it the robot's target.
    NominateTower {
        /// Robot claiming the tower.
        robot_id: RobotId,
        /// Cell nominated as the tower.
        cell: CellCoord,
    },
    /// Lifts a specific box off the floor into the robot's hands.
    PickBox {
        /// Robot picking the box up.
        robot_id: RobotId,
        /// Box being lifted.
        box_id: BoxId,
        /// Cell the box is resting on.
        cell: CellCoord,
    },
    /// Drops the carried box on the robot's current cell.
    DepositBox {
        /// Robot depositing its box.
        robot_id: RobotId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that a new simulation tick started.
    TickAdvanced {
        /// Zero-based index of the tick that started.
        tick: u64,
    },
    /// Confirms that a robot was placed on the floor.
    RobotSpawned {
        /// Identifier assigned to the robot.
        robot_id: RobotId,
        /// Cell the robot occupies.
        cell: CellCoord,
    },
    /// Confirms that a box was placed on the floor.
    BoxSpawned {
        /// Identifier assigned to the box.
        box_id: BoxId,
        /// Cell the box occupies.
        cell: CellCoord,
    },
    /// Confirms that a robot moved between two adjacent cells.
    RobotMoved {
        /// Robot that moved.
        robot_id: RobotId,
        /// Cell the robot left.
        from: CellCoord,
        /// Cell the robot entered.
        to: CellCoord,
        /// Direction of travel.
        direction: Direction,
    },
    /// Announces that a cell joined the tower registry.
    TowerNominated {
        /// Robot that claimed the tower, `None` for manual registration.
        robot_id: Option<RobotId>,
        /// Cell that became a tower.
        cell: CellCoord,
    },
    /// Confirms that a robot lifted a box.
    BoxPicked {
        /// Robot now carrying the box.
        robot_id: RobotId,
        /// Box that was lifted.
        box_id: BoxId,
        /// Cell the box was taken from.
        cell: CellCoord,
    },
    /// Confirms that a robot dropped its box.
    BoxDeposited {
        /// Robot that dropped the box.
        robot_id: RobotId,
        /// Box that was dropped.
        box_id: BoxId,
        /// Cell the box landed on.
        cell: CellCoord,
        /// Box count of the cell after the drop.
        height: u8,
    },
    /// Announces that a tower reached capacity and its builder released it.
    TowerCompleted {
        /// Robot that placed the final box.
        robot_id: RobotId,
        /// Completed tower cell.
        cell: CellCoord,
    },
}

/// Construction parameters for a warehouse floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    /// Number of columns on the floor.
    pub width: u32,
    /// Number of rows on the floor.
    pub height: u32,
    /// Number of robots placed at start-up.
    pub robots: u32,
    /// Number of boxes scattered at start-up.
    pub boxes: u32,
}

impl WarehouseConfig {
    /// Creates a configuration from the four simulation parameters.
    #[must_use]
    pub const fn new(width: u32, height: u32, robots: u32, boxes: u32) -> Self {
        Self {
            width,
            height,
            robots,
            boxes,
        }
    }

    /// Number of cells on the floor.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Checks that the population fits on the floor.
    pub fn validate(&self) -> Result<(), WarehouseError> {
        if self.width == 0 || self.height == 0 {
            return Err(WarehouseError::InvalidConfig(
                "floor dimensions must be non-zero",
            ));
        }

        if u64::from(self.robots) > self.cell_count() {
            return Err(WarehouseError::InvalidConfig(
                "every robot needs a cell of its own",
            ));
        }

        let box_capacity = self.cell_count() * u64::from(INITIAL_STACK_LIMIT);
        if u64::from(self.boxes) > box_capacity {
            return Err(WarehouseError::InvalidConfig(
                "boxes exceed the initial stacking capacity of the floor",
            ));
        }

        Ok(())
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self::new(20, 20, 1, 200)
    }
}

/// Per-cell presentation codes captured before a tick runs.
///
/// Codes are stored column-major: every row of column `0`, then column `1`.
/// A cell reports [`ROBOT_CODE`] when a robot stands on it and its box count
/// otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloorSnapshot {
    width: u32,
    height: u32,
    codes: Vec<u8>,
}

impl FloorSnapshot {
    /// Wraps column-major codes captured for a `width`×`height` floor.
    #[must_use]
    pub fn new(width: u32, height: u32, codes: Vec<u8>) -> Self {
        debug_assert_eq!(codes.len() as u64, u64::from(width) * u64::from(height));
        Self {
            width,
            height,
            codes,
        }
    }

    /// Provides the dimensions of the captured floor.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Code captured for the provided cell, if it lies on the floor.
    #[must_use]
    pub fn code(&self, cell: CellCoord) -> Option<u8> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let height = usize::try_from(self.height).ok()?;
        self.codes.get(column * height + row).copied()
    }

    /// All captured codes in column-major order.
    #[must_use]
    pub fn codes(&self) -> &[u8] {
        &self.codes
    }
}
