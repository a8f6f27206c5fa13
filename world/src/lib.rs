#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative floor state for the warehouse simulation.
//!
//! The [`World`] owns the spatial grid, the per-cell box counts, the tower
//! registry and every robot's task. It changes only through the primitives on
//! [`World`] and through [`apply`], which validates each [`Command`] before
//! touching any state so a rejected command leaves the floor as it was.

mod box_field;
mod grid;
mod towers;

use std::collections::BTreeMap;

use rand::{seq::SliceRandom, Rng};
use tracing::{debug, info};
use warehouse_core::{
    AgentKind, BoxId, CellCoord, Command, Direction, Event, LogicError, Occupant, RobotId,
    RobotTask, WarehouseConfig, WarehouseError, INITIAL_STACK_LIMIT, TOWER_CAPACITY,
};

use crate::{box_field::BoxField, grid::SpatialGrid, towers::TowerRegistry};

/// Represents the authoritative warehouse floor.
#[derive(Clone, Debug)]
pub struct World {
    grid: SpatialGrid,
    boxes: BoxField,
    towers: TowerRegistry,
    robots: BTreeMap<RobotId, RobotTask>,
    next_robot_id: u32,
    next_box_id: u32,
    tick_index: u64,
}

impl World {
    /// Creates an empty floor with the provided dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self, WarehouseError> {
        WarehouseConfig::new(width, height, 0, 0).validate()?;
        Ok(Self {
            grid: SpatialGrid::new(width, height),
            boxes: BoxField::new(width, height),
            towers: TowerRegistry::new(),
            robots: BTreeMap::new(),
            next_robot_id: 0,
            next_box_id: 0,
            tick_index: 0,
        })
    }

    /// Places a new robot on the cell and returns its identifier.
    pub fn spawn_robot(&mut self, cell: CellCoord) -> Result<RobotId, WarehouseError> {
        let robot_id = RobotId::new(self.next_robot_id);
        self.grid.place(Occupant::Robot(robot_id), cell)?;
        let _ = self.robots.insert(robot_id, RobotTask::Scouting);
        self.next_robot_id += 1;
        Ok(robot_id)
    }

    /// Places a brand-new box on the cell and returns its identifier.
    pub fn spawn_box(&mut self, cell: CellCoord) -> Result<BoxId, WarehouseError> {
        let box_id = BoxId::new(self.next_box_id);
        let _ = self.drop_box(cell, box_id)?;
        self.next_box_id += 1;
        Ok(box_id)
    }

    /// Lifts the named box off the cell, decrementing the cell's count.
    pub fn pick_box(&mut self, cell: CellCoord, box_id: BoxId) -> Result<(), WarehouseError> {
        if self.boxes.count(cell) == 0 {
            if !self.grid.contains(cell) {
                return Err(self.out_of_bounds(cell));
            }
            return Err(LogicError::EmptyCell { cell }.into());
        }
        let occupant = Occupant::Box(box_id);
        if self.grid.position(occupant) != Some(cell) {
            return Err(LogicError::BoxNotAtCell { box_id, cell }.into());
        }

        let _ = self.boxes.decrement(cell)?;
        let _ = self.grid.remove(occupant);
        Ok(())
    }

    /// Lays the box on the cell, returning the cell's new count.
    ///
    /// The box keeps `box_id`, so a box picked up earlier reappears under the
    /// same identity.
    pub fn drop_box(&mut self, cell: CellCoord, box_id: BoxId) -> Result<u8, WarehouseError> {
        self.boxes.ensure_room(cell)?;
        let occupant = Occupant::Box(box_id);
        if self.grid.position(occupant).is_some() {
            return Err(LogicError::BoxAlreadyPlaced(box_id).into());
        }

        self.grid.place(occupant, cell)?;
        self.boxes.increment(cell)
    }

    /// Adds the cell to the tower registry. Nominating a registered cell is a
    /// no-op that returns `false`.
    pub fn nominate_tower(&mut self, cell: CellCoord) -> Result<bool, WarehouseError> {
        if !self.grid.contains(cell) {
            return Err(self.out_of_bounds(cell));
        }
        Ok(self.towers.insert(cell))
    }

    /// Whether the cell holds a full tower.
    #[must_use]
    pub fn is_tower_complete(&self, cell: CellCoord) -> bool {
        self.boxes.count(cell) == TOWER_CAPACITY
    }

    fn out_of_bounds(&self, cell: CellCoord) -> WarehouseError {
        let (width, height) = self.grid.dimensions();
        WarehouseError::OutOfBounds {
            cell,
            width,
            height,
        }
    }

    fn robot_task(&self, robot_id: RobotId) -> Result<RobotTask, WarehouseError> {
        self.robots
            .get(&robot_id)
            .copied()
            .ok_or(WarehouseError::UnknownRobot(robot_id))
    }

    fn robot_cell(&self, robot_id: RobotId) -> Result<CellCoord, WarehouseError> {
        self.grid
            .position(Occupant::Robot(robot_id))
            .ok_or(WarehouseError::UnknownRobot(robot_id))
    }

    fn set_task(&mut self, robot_id: RobotId, task: RobotTask) {
        if let Some(slot) = self.robots.get_mut(&robot_id) {
            *slot = task;
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), WarehouseError> {
    match command {
        Command::Tick => {
            out_events.push(Event::TickAdvanced {
                tick: world.tick_index,
            });
            world.tick_index = world.tick_index.saturating_add(1);
        }
        Command::SpawnRobot { cell } => {
            let robot_id = world.spawn_robot(cell)?;
            out_events.push(Event::RobotSpawned { robot_id, cell });
        }
        Command::SpawnBox { cell } => {
            let box_id = world.spawn_box(cell)?;
            out_events.push(Event::BoxSpawned { box_id, cell });
        }
        Command::RegisterTower { cell } => {
            if world.nominate_tower(cell)? {
                debug!(column = cell.column(), row = cell.row(), "tower registered");
                out_events.push(Event::TowerNominated {
                    robot_id: None,
                    cell,
                });
            }
        }
        Command::MoveRobot { robot_id, to } => {
            let from = world.robot_cell(robot_id)?;
            if !world.grid.contains(to) {
                return Err(world.out_of_bounds(to));
            }
            let direction =
                direction_between(from, to).ok_or(LogicError::NotAdjacent { from, to })?;
            let _ = world.grid.move_to(Occupant::Robot(robot_id), to)?;
            out_events.push(Event::RobotMoved {
                robot_id,
                from,
                to,
                direction,
            });
        }
        Command::NominateTower { robot_id, cell } => {
            let task = world.robot_task(robot_id)?;
            if task.has_tower_target() {
                return Err(invalid_transition(robot_id, "nominate a tower", task));
            }
            let _ = world.nominate_tower(cell)?;
            world.set_task(robot_id, RobotTask::Foraging { tower: cell });
            debug!(
                robot = robot_id.get(),
                column = cell.column(),
                row = cell.row(),
                height = world.boxes.count(cell),
                "tower nominated"
            );
            out_events.push(Event::TowerNominated {
                robot_id: Some(robot_id),
                cell,
            });
        }
        Command::PickBox {
            robot_id,
            box_id,
            cell,
        } => {
            let task = world.robot_task(robot_id)?;
            let RobotTask::Foraging { tower } = task else {
                return Err(invalid_transition(robot_id, "pick a box", task));
            };
            world.pick_box(cell, box_id)?;
            world.set_task(robot_id, RobotTask::Transporting { tower, box_id });
            debug!(
                robot = robot_id.get(),
                box_id = box_id.get(),
                column = cell.column(),
                row = cell.row(),
                "box picked"
            );
            out_events.push(Event::BoxPicked {
                robot_id,
                box_id,
                cell,
            });
        }
        Command::DepositBox { robot_id } => {
            let task = world.robot_task(robot_id)?;
            let (Some(tower), Some(box_id)) = (task.tower_target(), task.carried_box()) else {
                return Err(invalid_transition(robot_id, "deposit a box", task));
            };
            let cell = world.robot_cell(robot_id)?;
            let height = world.drop_box(cell, box_id)?;
            debug!(
                robot = robot_id.get(),
                box_id = box_id.get(),
                column = cell.column(),
                row = cell.row(),
                height,
                "box deposited"
            );
            out_events.push(Event::BoxDeposited {
                robot_id,
                box_id,
                cell,
                height,
            });

            if world.is_tower_complete(cell) {
                world.set_task(robot_id, RobotTask::Scouting);
                info!(
                    robot = robot_id.get(),
                    column = cell.column(),
                    row = cell.row(),
                    "tower completed"
                );
                out_events.push(Event::TowerCompleted { robot_id, cell });
            } else {
                world.set_task(robot_id, RobotTask::Foraging { tower });
            }
        }
    }

    Ok(())
}

/// Scatters the initial robot and box population across the floor.
///
/// Robots go first, each on a uniformly chosen cell with no agent and no box.
/// Boxes follow, each on a uniformly random cell, resampled while the cell
/// already holds [`INITIAL_STACK_LIMIT`] boxes.
pub fn populate<R>(
    world: &mut World,
    robots: u32,
    boxes: u32,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) -> Result<(), WarehouseError>
where
    R: Rng,
{
    let (width, height) = world.grid.dimensions();
    let cells: Vec<CellCoord> = (0..width)
        .flat_map(|column| (0..height).map(move |row| CellCoord::new(column, row)))
        .collect();

    for _ in 0..robots {
        let free: Vec<CellCoord> = cells
            .iter()
            .copied()
            .filter(|cell| world.grid.is_empty(*cell) && world.boxes.count(*cell) == 0)
            .collect();
        let cell = *free
            .choose(rng)
            .ok_or(WarehouseError::NoEligibleTarget(AgentKind::Robot))?;
        apply(world, Command::SpawnRobot { cell }, out_events)?;
    }

    for _ in 0..boxes {
        if cells
            .iter()
            .all(|cell| world.boxes.count(*cell) >= INITIAL_STACK_LIMIT)
        {
            return Err(WarehouseError::NoEligibleTarget(AgentKind::Box));
        }
        let cell = loop {
            let candidate = CellCoord::new(rng.gen_range(0..width), rng.gen_range(0..height));
            if world.boxes.count(candidate) < INITIAL_STACK_LIMIT {
                break candidate;
            }
        };
        apply(world, Command::SpawnBox { cell }, out_events)?;
    }

    Ok(())
}

fn invalid_transition(robot_id: RobotId, action: &'static str, task: RobotTask) -> WarehouseError {
    LogicError::InvalidTransition {
        robot_id,
        action,
        state: task.state(),
    }
    .into()
}

fn direction_between(from: CellCoord, to: CellCoord) -> Option<Direction> {
    if from.manhattan_distance(to) != 1 {
        return None;
    }

    if from.column() != to.column() {
        if to.column() > from.column() {
            Some(Direction::East)
        } else {
            Some(Direction::West)
        }
    } else if to.row() > from.row() {
        Some(Direction::South)
    } else {
        Some(Direction::North)
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use warehouse_core::{
        AgentKind, BoxId, CellCoord, FloorSnapshot, Neighborhood, Occupant, RobotId,
        RobotSnapshot, ROBOT_CODE,
    };

    /// Provides the floor dimensions as `(width, height)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Number of activation passes started so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Identifiers of every robot in ascending order.
    #[must_use]
    pub fn robot_ids(world: &World) -> Vec<RobotId> {
        world.robots.keys().copied().collect()
    }

    /// Captures the state of a single robot.
    #[must_use]
    pub fn robot(world: &World, robot_id: RobotId) -> Option<RobotSnapshot> {
        let task = world.robots.get(&robot_id).copied()?;
        let cell = world.grid.position(Occupant::Robot(robot_id))?;
        Some(RobotSnapshot {
            id: robot_id,
            cell,
            task,
        })
    }

    /// Captures every robot in ascending identifier order.
    #[must_use]
    pub fn robots(world: &World) -> Vec<RobotSnapshot> {
        world
            .robots
            .keys()
            .filter_map(|robot_id| robot(world, *robot_id))
            .collect()
    }

    /// Box count recorded for the cell.
    #[must_use]
    pub fn box_count(world: &World, cell: CellCoord) -> u8 {
        world.boxes.count(cell)
    }

    /// Sum of the box counts over the whole floor.
    #[must_use]
    pub fn box_total(world: &World) -> u64 {
        world.boxes.total()
    }

    /// Number of box agents currently resting on the floor.
    #[must_use]
    pub fn floor_box_agents(world: &World) -> usize {
        let (width, height) = world.grid.dimensions();
        (0..width)
            .flat_map(|column| (0..height).map(move |row| CellCoord::new(column, row)))
            .map(|cell| {
                world
                    .grid
                    .occupants(cell)
                    .iter()
                    .filter(|occupant| occupant.kind() == AgentKind::Box)
                    .count()
            })
            .sum()
    }

    /// Cell the box rests on, `None` while it is carried or unknown.
    #[must_use]
    pub fn box_position(world: &World, box_id: BoxId) -> Option<CellCoord> {
        world.grid.position(Occupant::Box(box_id))
    }

    /// Registered tower cells in ascending order.
    #[must_use]
    pub fn towers(world: &World) -> Vec<CellCoord> {
        world.towers.iter().collect()
    }

    /// Whether the cell is in the tower registry.
    #[must_use]
    pub fn is_tower(world: &World, cell: CellCoord) -> bool {
        world.towers.contains(cell)
    }

    /// Number of robots currently holding a box.
    #[must_use]
    pub fn count_carried_boxes(world: &World) -> usize {
        world
            .robots
            .values()
            .filter(|task| task.carrying_box())
            .count()
    }

    /// Whether no partially built stack remains: every cell is empty or a
    /// complete tower.
    #[must_use]
    pub fn is_simulation_done(world: &World) -> bool {
        world.boxes.is_settled()
    }

    /// Captures one presentation code per cell.
    #[must_use]
    pub fn floor_snapshot(world: &World) -> FloorSnapshot {
        let (width, height) = world.grid.dimensions();
        let mut codes = world.boxes.counts().to_vec();
        for robot_id in world.robots.keys() {
            let Some(cell) = world.grid.position(Occupant::Robot(*robot_id)) else {
                continue;
            };
            let (Ok(column), Ok(row), Ok(rows)) = (
                usize::try_from(cell.column()),
                usize::try_from(cell.row()),
                usize::try_from(height),
            ) else {
                continue;
            };
            if let Some(code) = codes.get_mut(column * rows + row) {
                *code = ROBOT_CODE;
            }
        }
        FloorSnapshot::new(width, height, codes)
    }

    /// Exposes a read-only view of the floor for decision making.
    #[must_use]
    pub fn floor_view(world: &World) -> FloorView<'_> {
        FloorView { world }
    }

    /// Read-only view over the grid, box counts and tower registry.
    #[derive(Clone, Copy, Debug)]
    pub struct FloorView<'a> {
        world: &'a World,
    }

    impl<'a> FloorView<'a> {
        /// Provides the floor dimensions as `(width, height)`.
        #[must_use]
        pub fn dimensions(&self) -> (u32, u32) {
            self.world.grid.dimensions()
        }

        /// Cells around `cell`, clipped to the floor, in ascending order.
        #[must_use]
        pub fn neighborhood(
            &self,
            cell: CellCoord,
            shape: Neighborhood,
            include_center: bool,
        ) -> Vec<CellCoord> {
            self.world.grid.neighborhood(cell, shape, include_center)
        }

        /// Agents standing on the cell in arrival order.
        #[must_use]
        pub fn occupants(&self, cell: CellCoord) -> &'a [Occupant] {
            self.world.grid.occupants(cell)
        }

        /// Boxes resting on the cell in arrival order.
        pub fn boxes_at(&self, cell: CellCoord) -> impl Iterator<Item = BoxId> + 'a {
            self.occupants(cell).iter().filter_map(|occupant| match occupant {
                Occupant::Box(box_id) => Some(*box_id),
                Occupant::Robot(_) => None,
            })
        }

        /// Box count recorded for the cell.
        #[must_use]
        pub fn box_count(&self, cell: CellCoord) -> u8 {
            self.world.boxes.count(cell)
        }

        /// Whether the cell is in the tower registry.
        #[must_use]
        pub fn is_tower(&self, cell: CellCoord) -> bool {
            self.world.towers.contains(cell)
        }

        /// Whether no agent stands on the cell.
        #[must_use]
        pub fn is_empty(&self, cell: CellCoord) -> bool {
            self.world.grid.is_empty(cell)
        }
    }
}
