//! Failure taxonomy shared by every warehouse crate.

use thiserror::Error;

use crate::{AgentKind, BoxId, CellCoord, RobotId, RobotState};

/// Errors surfaced by world construction and command application.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WarehouseError {
    /// A placement or movement target lies outside the floor.
    #[error("cell ({}, {}) lies outside the {width}x{height} floor", .cell.column(), .cell.row())]
    OutOfBounds {
        /// Offending cell.
        cell: CellCoord,
        /// Floor width in cells.
        width: u32,
        /// Floor height in cells.
        height: u32,
    },
    /// Initial placement found no cell able to host the agent.
    #[error("no eligible cell left to place a {0:?}")]
    NoEligibleTarget(AgentKind),
    /// The configuration cannot produce a valid floor.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// A command referenced a robot the world does not know.
    #[error("robot {} does not exist", .0.get())]
    UnknownRobot(RobotId),
    /// An internal invariant would have been broken.
    #[error(transparent)]
    Logic(#[from] LogicError),
}

/// Broken invariants. Reaching one of these indicates a decision bug rather
/// than a recoverable condition.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LogicError {
    /// A box was taken from a cell whose box count is zero.
    #[error("cell ({}, {}) holds no boxes", .cell.column(), .cell.row())]
    EmptyCell {
        /// Cell that was expected to hold a box.
        cell: CellCoord,
    },
    /// The named box is not resting on the named cell.
    #[error("box {} is not on cell ({}, {})", .box_id.get(), .cell.column(), .cell.row())]
    BoxNotAtCell {
        /// Box that was expected on the cell.
        box_id: BoxId,
        /// Cell that was inspected.
        cell: CellCoord,
    },
    /// The box is already resting somewhere on the floor.
    #[error("box {} is already on the floor", .0.get())]
    BoxAlreadyPlaced(BoxId),
    /// A drop would push a tower past capacity.
    #[error("tower at ({}, {}) is already complete", .cell.column(), .cell.row())]
    TowerOverflow {
        /// Tower that is already full.
        cell: CellCoord,
    },
    /// A robot tried to move further than one orthogonal step.
    #[error(
        "cells ({}, {}) and ({}, {}) are not orthogonal neighbours",
        .from.column(), .from.row(), .to.column(), .to.row()
    )]
    NotAdjacent {
        /// Cell the robot stands on.
        from: CellCoord,
        /// Requested destination.
        to: CellCoord,
    },
    /// A command does not apply to the robot's current state.
    #[error("robot {} cannot {action} while {state:?}", .robot_id.get())]
    InvalidTransition {
        /// Robot the command targeted.
        robot_id: RobotId,
        /// Action that was requested.
        action: &'static str,
        /// State the robot was in.
        state: RobotState,
    },
}
