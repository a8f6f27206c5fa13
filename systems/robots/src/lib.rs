#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Robot decision system that locates clusters, claims towers and ferries
//! boxes onto them.
//!
//! Each activation reads one robot's snapshot together with a read-only view
//! of the floor and emits the commands for exactly one state-machine
//! transition. The system keeps no state of its own; everything a robot
//! remembers lives in its [`RobotTask`] inside the world.

use std::cmp::Ordering;

use rand::{seq::SliceRandom, Rng};
use tracing::trace;
use warehouse_core::{BoxId, CellCoord, Command, Neighborhood, RobotSnapshot, RobotTask};
use warehouse_world::query::FloorView;

/// Pure system that turns robot snapshots into world commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct RobotControl;

impl RobotControl {
    /// Creates a new robot control system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decides one tick of behaviour for the robot.
    ///
    /// Commands must be applied in order before the next robot is handled so
    /// later robots observe the outcome.
    pub fn handle<R>(
        &mut self,
        robot: &RobotSnapshot,
        floor: FloorView<'_>,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng,
    {
        match robot.task {
            RobotTask::Scouting => scout(robot, floor, rng, out),
            RobotTask::Foraging { .. } => forage(robot, floor, rng, out),
            RobotTask::Transporting { tower, .. } => transport(robot, tower, floor, rng, out),
        }
    }
}

/// Picks the cell to nominate among `neighbors`.
///
/// Registered towers and empty cells never qualify. The cell with the most
/// boxes wins; equal counts resolve to the smallest `(x, y)` coordinate.
#[must_use]
pub fn select_tower_candidate(
    floor: &FloorView<'_>,
    neighbors: &[CellCoord],
) -> Option<CellCoord> {
    neighbors
        .iter()
        .copied()
        .filter(|cell| !floor.is_tower(*cell))
        .map(|cell| (cell, floor.box_count(cell)))
        .filter(|(_, count)| *count > 0)
        .max_by(|(left_cell, left_count), (right_cell, right_count)| {
            match left_count.cmp(right_count) {
                Ordering::Equal => right_cell.cmp(left_cell),
                other => other,
            }
        })
        .map(|(cell, _)| cell)
}

/// Next cell on the way from `from` to `to`, closing the column gap before
/// the row gap. Returns `None` once the robot has arrived.
#[must_use]
pub fn step_toward(from: CellCoord, to: CellCoord) -> Option<CellCoord> {
    match (from.column().cmp(&to.column()), from.row().cmp(&to.row())) {
        (Ordering::Less, _) => Some(CellCoord::new(from.column() + 1, from.row())),
        (Ordering::Greater, _) => Some(CellCoord::new(from.column() - 1, from.row())),
        (Ordering::Equal, Ordering::Less) => Some(CellCoord::new(from.column(), from.row() + 1)),
        (Ordering::Equal, Ordering::Greater) => Some(CellCoord::new(from.column(), from.row() - 1)),
        (Ordering::Equal, Ordering::Equal) => None,
    }
}

fn scout<R: Rng>(
    robot: &RobotSnapshot,
    floor: FloorView<'_>,
    rng: &mut R,
    out: &mut Vec<Command>,
) {
    let neighbors = floor.neighborhood(robot.cell, Neighborhood::Full, false);
    let sees_box = neighbors
        .iter()
        .any(|cell| floor.boxes_at(*cell).next().is_some());
    if !sees_box {
        wander(robot, floor, rng, out);
        return;
    }

    // Boxes in sight but all of them on registered towers: hold position.
    let Some(cell) = select_tower_candidate(&floor, &neighbors) else {
        trace!(robot = robot.id.get(), "no tower candidate in sight");
        return;
    };
    trace!(
        robot = robot.id.get(),
        column = cell.column(),
        row = cell.row(),
        "claiming tower"
    );
    out.push(Command::NominateTower {
        robot_id: robot.id,
        cell,
    });
}

fn forage<R: Rng>(
    robot: &RobotSnapshot,
    floor: FloorView<'_>,
    rng: &mut R,
    out: &mut Vec<Command>,
) {
    let mut loose: Vec<(CellCoord, BoxId)> = Vec::new();
    for cell in floor.neighborhood(robot.cell, Neighborhood::Full, false) {
        if floor.is_tower(cell) {
            continue;
        }
        for box_id in floor.boxes_at(cell) {
            loose.push((cell, box_id));
        }
    }

    let Some(&(cell, box_id)) = loose.choose(rng) else {
        wander(robot, floor, rng, out);
        return;
    };

    trace!(robot = robot.id.get(), box_id = box_id.get(), "lifting box");
    out.push(Command::PickBox {
        robot_id: robot.id,
        box_id,
        cell,
    });
}

fn transport<R: Rng>(
    robot: &RobotSnapshot,
    tower: CellCoord,
    floor: FloorView<'_>,
    rng: &mut R,
    out: &mut Vec<Command>,
) {
    if let Some(next) = step_toward(robot.cell, tower) {
        out.push(Command::MoveRobot {
            robot_id: robot.id,
            to: next,
        });
        return;
    }

    out.push(Command::DepositBox { robot_id: robot.id });

    // Step off the tower so the next delivery finds it free.
    let vacant: Vec<CellCoord> = floor
        .neighborhood(robot.cell, Neighborhood::Orthogonal, false)
        .into_iter()
        .filter(|cell| floor.is_empty(*cell))
        .collect();
    if let Some(&to) = vacant.choose(rng) {
        out.push(Command::MoveRobot {
            robot_id: robot.id,
            to,
        });
    }
}

fn wander<R: Rng>(
    robot: &RobotSnapshot,
    floor: FloorView<'_>,
    rng: &mut R,
    out: &mut Vec<Command>,
) {
    let steps = floor.neighborhood(robot.cell, Neighborhood::Orthogonal, false);
    if let Some(&to) = steps.choose(rng) {
        out.push(Command::MoveRobot {
            robot_id: robot.id,
            to,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warehouse_world::{query, World};

    #[test]
    fn step_toward_closes_columns_first() {
        let target = CellCoord::new(3, 0);
        assert_eq!(
            step_toward(CellCoord::new(1, 2), target),
            Some(CellCoord::new(2, 2))
        );
        assert_eq!(
            step_toward(CellCoord::new(3, 2), target),
            Some(CellCoord::new(3, 1))
        );
        assert_eq!(
            step_toward(CellCoord::new(4, 0), target),
            Some(CellCoord::new(3, 0))
        );
        assert_eq!(step_toward(target, target), None);
    }

    #[test]
    fn tallest_neighbor_wins_nomination() {
        let mut world = World::new(4, 4).expect("world");
        for cell in [
            CellCoord::new(0, 0),
            CellCoord::new(2, 2),
            CellCoord::new(2, 2),
        ] {
            let _ = world.spawn_box(cell).expect("box");
        }
        let view = query::floor_view(&world);
        let neighbors = view.neighborhood(CellCoord::new(1, 1), Neighborhood::Full, false);
        assert_eq!(
            select_tower_candidate(&view, &neighbors),
            Some(CellCoord::new(2, 2))
        );
    }

    #[test]
    fn equal_heights_resolve_to_smallest_coordinate() {
        let mut world = World::new(4, 4).expect("world");
        for cell in [
            CellCoord::new(2, 0),
            CellCoord::new(0, 2),
            CellCoord::new(2, 1),
        ] {
            let _ = world.spawn_box(cell).expect("box");
        }
        let view = query::floor_view(&world);
        let neighbors = view.neighborhood(CellCoord::new(1, 1), Neighborhood::Full, false);
        assert_eq!(
            select_tower_candidate(&view, &neighbors),
            Some(CellCoord::new(0, 2))
        );
    }

    #[test]
    fn registered_towers_are_not_candidates() {
        let mut world = World::new(3, 3).expect("world");
        let tower = CellCoord::new(0, 0);
        let _ = world.spawn_box(tower).expect("box");
        let _ = world.spawn_box(tower).expect("box");
        let _ = world.spawn_box(CellCoord::new(2, 2)).expect("box");
        assert_eq!(world.nominate_tower(tower), Ok(true));

        let view = query::floor_view(&world);
        let neighbors = view.neighborhood(CellCoord::new(1, 1), Neighborhood::Full, false);
        assert_eq!(
            select_tower_candidate(&view, &neighbors),
            Some(CellCoord::new(2, 2))
        );
    }
}
