use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use warehouse_core::{
    CellCoord, Event, RobotState, RobotTask, WarehouseConfig, WarehouseError, TOWER_CAPACITY,
};
use warehouse_simulation::{RunOutcome, WarehouseModel};
use warehouse_world::{query, World};

fn all_cells(world: &World) -> Vec<CellCoord> {
    let (width, height) = query::dimensions(world);
    (0..width)
        .flat_map(|column| (0..height).map(move |row| CellCoord::new(column, row)))
        .collect()
}

#[test]
fn floor_invariants_hold_every_tick() {
    let config = WarehouseConfig::new(10, 10, 4, 40);
    let mut model = WarehouseModel::seeded(config, 0x5eed).expect("model");
    let mut tower_count = 0;

    for _ in 0..300 {
        model.step().expect("tick");
        let world = model.world();

        for cell in all_cells(world) {
            assert!(query::box_count(world, cell) <= TOWER_CAPACITY);
        }

        let on_floor = query::box_total(world);
        assert_eq!(on_floor, query::floor_box_agents(world) as u64);
        assert_eq!(
            on_floor + query::count_carried_boxes(world) as u64,
            u64::from(config.boxes)
        );

        for robot in query::robots(world) {
            if let RobotTask::Transporting { box_id, .. } = robot.task {
                assert_eq!(query::box_position(world, box_id), None);
            }
        }

        let towers = query::towers(world).len();
        assert!(towers >= tower_count, "tower registry shrank");
        tower_count = towers;
    }
}

#[test]
fn single_robot_finishes_a_five_box_cluster() {
    let mut world = World::new(6, 6).expect("world");
    for cell in [
        CellCoord::new(3, 3),
        CellCoord::new(3, 3),
        CellCoord::new(3, 4),
        CellCoord::new(3, 4),
        CellCoord::new(4, 3),
    ] {
        let _ = world.spawn_box(cell).expect("box");
    }
    let _ = world.spawn_robot(CellCoord::new(0, 0)).expect("robot");
    let mut model = WarehouseModel::from_world(world, ChaCha8Rng::seed_from_u64(67_890));
    assert!(!model.is_simulation_done());

    let outcome = model.run_until_done(50_000).expect("run");
    assert!(
        matches!(outcome, RunOutcome::Completed { .. }),
        "cluster never settled: {outcome:?}"
    );

    let world = model.world();
    let complete: Vec<CellCoord> = all_cells(world)
        .into_iter()
        .filter(|cell| world.is_tower_complete(*cell))
        .collect();
    assert_eq!(complete.len(), 1);
    assert!(query::is_tower(world, complete[0]));
}

#[test]
fn completed_tower_is_never_touched() {
    let mut world = World::new(4, 4).expect("world");
    let tower = CellCoord::new(1, 1);
    for _ in 0..TOWER_CAPACITY {
        let _ = world.spawn_box(tower).expect("box");
    }
    assert_eq!(world.nominate_tower(tower), Ok(true));
    let robot_id = world.spawn_robot(CellCoord::new(0, 0)).expect("robot");
    let mut model = WarehouseModel::from_world(world, ChaCha8Rng::seed_from_u64(9));
    assert!(model.is_simulation_done());

    for _ in 0..200 {
        model.step().expect("tick");
        assert!(!model.last_events().iter().any(|event| matches!(
            event,
            Event::BoxPicked { .. } | Event::BoxDeposited { .. } | Event::TowerNominated { .. }
        )));
        let robot = query::robot(model.world(), robot_id).expect("robot");
        assert_eq!(robot.task, RobotTask::Scouting);
        assert_eq!(query::box_count(model.world(), tower), TOWER_CAPACITY);
    }
}

#[test]
fn partial_tower_keeps_simulation_running_until_filled() {
    let mut world = World::new(5, 5).expect("world");
    let tower = CellCoord::new(2, 2);
    for _ in 0..3 {
        let _ = world.spawn_box(tower).expect("box");
    }
    let robot_id = world.spawn_robot(CellCoord::new(2, 1)).expect("robot");
    let mut model = WarehouseModel::from_world(world, ChaCha8Rng::seed_from_u64(21));

    model.step().expect("tick");
    let robot = query::robot(model.world(), robot_id).expect("robot");
    assert_eq!(robot.task, RobotTask::Foraging { tower });

    for _ in 0..100 {
        model.step().expect("tick");
        assert!(!model.is_simulation_done());
    }
    assert_eq!(
        model.run_until_done(150).expect("run"),
        RunOutcome::TickLimit { ticks: 150 }
    );

    let _ = model.world_mut().spawn_box(tower).expect("box");
    let _ = model.world_mut().spawn_box(tower).expect("box");
    assert!(model.is_simulation_done());
    let robot = query::robot(model.world(), robot_id).expect("robot");
    assert_eq!(robot.task.state(), RobotState::Foraging);
}

#[test]
fn later_robot_sees_tower_claimed_earlier_in_the_same_tick() {
    let mut world = World::new(5, 5).expect("world");
    let stack = CellCoord::new(2, 2);
    let _ = world.spawn_box(stack).expect("box");
    let _ = world.spawn_box(stack).expect("box");
    let _ = world.spawn_robot(CellCoord::new(1, 2)).expect("robot");
    let _ = world.spawn_robot(CellCoord::new(3, 2)).expect("robot");

    for seed in 0..6 {
        let mut model = WarehouseModel::from_world(world.clone(), ChaCha8Rng::seed_from_u64(seed));
        model.step().expect("tick");

        let tasks: Vec<RobotTask> = query::robots(model.world())
            .into_iter()
            .map(|robot| robot.task)
            .collect();
        let claimants = tasks
            .iter()
            .filter(|task| **task == RobotTask::Foraging { tower: stack })
            .count();
        assert_eq!(claimants, 1, "exactly one robot may claim the stack");
        assert!(tasks.contains(&RobotTask::Scouting));
        assert_eq!(query::towers(model.world()), vec![stack]);
    }
}

#[test]
fn snapshots_are_taken_before_each_tick() {
    let config = WarehouseConfig::new(6, 6, 2, 10);
    let mut model = WarehouseModel::seeded(config, 3).expect("model");
    let initial = query::floor_snapshot(model.world());

    for _ in 0..5 {
        model.step().expect("tick");
    }

    assert_eq!(model.tick_index(), 5);
    assert_eq!(model.history().len(), 5);
    assert_eq!(model.history()[0], initial);
    for snapshot in model.history() {
        assert_eq!(snapshot.dimensions(), (6, 6));
        assert_eq!(snapshot.codes().len(), 36);
    }
}

#[test]
fn history_capture_can_be_switched_off() {
    let config = WarehouseConfig::new(6, 6, 2, 10);
    let mut model = WarehouseModel::seeded(config, 3).expect("model");
    model.step().expect("tick");
    model.record_history(false);

    for _ in 0..10 {
        model.step().expect("tick");
    }

    assert_eq!(model.tick_index(), 11);
    assert_eq!(model.history().len(), 1);
}

#[test]
fn identical_seeds_replay_identically() {
    let config = WarehouseConfig::new(8, 8, 3, 30);
    let mut first = WarehouseModel::seeded(config, 0xabcdef).expect("model");
    let mut second = WarehouseModel::seeded(config, 0xabcdef).expect("model");

    for _ in 0..200 {
        first.step().expect("tick");
        second.step().expect("tick");
        assert_eq!(first.last_events(), second.last_events());
    }

    assert_eq!(first.history(), second.history());
    assert_eq!(query::robots(first.world()), query::robots(second.world()));
    assert_eq!(query::towers(first.world()), query::towers(second.world()));
}

#[test]
fn invalid_configuration_is_rejected() {
    let result = WarehouseModel::seeded(WarehouseConfig::new(2, 2, 1, 13), 1);
    assert!(matches!(result, Err(WarehouseError::InvalidConfig(_))));
}
