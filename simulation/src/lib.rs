#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick-driven orchestration of the warehouse floor.
//!
//! [`WarehouseModel`] owns the authoritative [`World`], the robot decision
//! system and the only random source of the run. Every tick it records a
//! [`FloorSnapshot`], shuffles the robots into a fresh activation order and
//! lets each robot act on the state left behind by the robots before it.

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use warehouse_core::{Command, Event, FloorSnapshot, WarehouseConfig, WarehouseError};
use warehouse_system_robots::RobotControl;
use warehouse_world::{self as world, query, World};

/// Result of running the model until it settles or gives up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every cell is empty or a complete tower.
    Completed {
        /// Ticks executed by the model in total.
        ticks: u64,
    },
    /// The tick budget ran out first.
    TickLimit {
        /// Ticks executed by the model in total.
        ticks: u64,
    },
}

/// Warehouse floor together with its scheduler and random source.
#[derive(Debug)]
pub struct WarehouseModel<R = ChaCha8Rng> {
    world: World,
    control: RobotControl,
    rng: R,
    history: Vec<FloorSnapshot>,
    recording: bool,
    events: Vec<Event>,
}

impl WarehouseModel<ChaCha8Rng> {
    /// Builds and populates a floor driven by a ChaCha generator seeded with
    /// `seed`.
    pub fn seeded(config: WarehouseConfig, seed: u64) -> Result<Self, WarehouseError> {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> WarehouseModel<R> {
    /// Builds a floor from the configuration and scatters robots and boxes on
    /// it using `rng`.
    pub fn new(config: WarehouseConfig, mut rng: R) -> Result<Self, WarehouseError> {
        config.validate()?;
        let mut world = World::new(config.width, config.height)?;
        let mut events = Vec::new();
        world::populate(&mut world, config.robots, config.boxes, &mut rng, &mut events)?;
        debug!(
            width = config.width,
            height = config.height,
            robots = config.robots,
            boxes = config.boxes,
            "warehouse populated"
        );

        Ok(Self {
            world,
            control: RobotControl::new(),
            rng,
            history: Vec::new(),
            recording: true,
            events,
        })
    }

    /// Wraps an already arranged floor.
    #[must_use]
    pub fn from_world(world: World, rng: R) -> Self {
        Self {
            world,
            control: RobotControl::new(),
            rng,
            history: Vec::new(),
            recording: true,
            events: Vec::new(),
        }
    }

    /// Read-only access to the floor.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the floor for arranging scenarios between ticks.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Snapshots captured at the start of every recorded tick, oldest first.
    #[must_use]
    pub fn history(&self) -> &[FloorSnapshot] {
        &self.history
    }

    /// Turns per-tick snapshot capture on or off. Recording starts enabled;
    /// switching it off keeps the snapshots captured so far.
    pub fn record_history(&mut self, enabled: bool) {
        self.recording = enabled;
    }

    /// Events produced by the most recent tick, or by population before the
    /// first tick.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.events
    }

    /// Number of ticks executed so far.
    #[must_use]
    pub fn tick_index(&self) -> u64 {
        query::tick_index(&self.world)
    }

    /// Whether every cell is empty or holds a complete tower.
    #[must_use]
    pub fn is_simulation_done(&self) -> bool {
        query::is_simulation_done(&self.world)
    }

    /// Advances the model by one tick.
    ///
    /// Each robot is activated exactly once, in an order reshuffled every
    /// tick, and its commands are applied before the next robot decides.
    pub fn step(&mut self) -> Result<(), WarehouseError> {
        if self.recording {
            self.history.push(query::floor_snapshot(&self.world));
        }
        self.events.clear();
        world::apply(&mut self.world, Command::Tick, &mut self.events)?;

        let mut order = query::robot_ids(&self.world);
        order.shuffle(&mut self.rng);

        let mut commands = Vec::new();
        for robot_id in order {
            let Some(robot) = query::robot(&self.world, robot_id) else {
                continue;
            };
            self.control.handle(
                &robot,
                query::floor_view(&self.world),
                &mut self.rng,
                &mut commands,
            );
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut self.events)?;
            }
        }

        Ok(())
    }

    /// Steps until the floor settles or `max_ticks` ticks have run in total.
    pub fn run_until_done(&mut self, max_ticks: u64) -> Result<RunOutcome, WarehouseError> {
        loop {
            let ticks = self.tick_index();
            if self.is_simulation_done() {
                info!(ticks, towers = query::towers(&self.world).len(), "warehouse settled");
                return Ok(RunOutcome::Completed { ticks });
            }
            if ticks >= max_ticks {
                return Ok(RunOutcome::TickLimit { ticks });
            }
            self.step()?;
        }
    }
}
