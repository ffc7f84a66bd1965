use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use stackbots_core::{CellCoord, CellKind, Event, RunStatus, SimulationConfig};
use stackbots_simulation::{SessionStore, Simulation};
use stackbots_world::{World, WorldGrid};

fn config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        width: 14,
        height: 11,
        robots: 7,
        items: 28,
        max_steps: 250,
        seed,
    }
}

fn adjacent_pair(seed: u64) -> Simulation {
    let mut grid = WorldGrid::walled(10, 10);
    assert!(grid.place(CellCoord::new(4, 4), CellKind::Item));
    assert!(grid.place(CellCoord::new(5, 4), CellKind::Item));
    assert!(grid.place(CellCoord::new(4, 5), CellKind::RobotStart));
    let config = SimulationConfig {
        max_steps: 50,
        seed,
        ..SimulationConfig::default()
    };
    Simulation::with_world(config, World::from_grid(grid))
}

fn replay(mut simulation: Simulation) -> (u64, RunStatus, u64) {
    let mut hasher = DefaultHasher::new();
    let mut log: Vec<Event> = Vec::new();

    while simulation.is_running() {
        log.extend_from_slice(simulation.advance());
    }

    for event in &log {
        format!("{event:?}").hash(&mut hasher);
    }
    let state = simulation.state();
    for robot in &state.robots {
        (robot.id, robot.x, robot.y, robot.carrying).hash(&mut hasher);
    }
    for stack in &state.stacks {
        (stack.x, stack.y, stack.item_count).hash(&mut hasher);
    }

    (hasher.finish(), simulation.status(), simulation.steps())
}

#[test]
fn same_seed_replays_identically() {
    let first = replay(Simulation::new(config(0x00c0_ffee)).expect("valid config"));
    let second = replay(Simulation::new(config(0x00c0_ffee)).expect("valid config"));

    assert_eq!(first, second);
}

#[test]
fn adjacent_pair_replay_matches_recorded_fingerprint() {
    let first = replay(adjacent_pair(19));
    let second = replay(adjacent_pair(19));

    assert_eq!(first, second, "adjacent pair replay diverged");
    let (fingerprint, status, steps) = first;
    assert_eq!(status, RunStatus::Succeeded);
    assert_eq!(steps, 19);
    assert_eq!(
        fingerprint, 0x79a8_c536_e0cc_60a2,
        "fingerprint mismatch: {fingerprint:#x}"
    );
}

#[test]
fn different_seeds_lay_out_different_floors() {
    let left = Simulation::new(config(1)).expect("valid config").state();
    let right = Simulation::new(config(2)).expect("valid config").state();

    assert_ne!(left, right);
}

#[test]
fn stepping_through_a_session_matches_a_direct_run() {
    let mut store = SessionStore::new();
    let id = store.create(config(11)).expect("valid config");
    let mut direct = Simulation::new(config(11)).expect("valid config");

    for _ in 0..40 {
        let via_store = store.step(id).expect("session exists");
        assert_eq!(via_store, direct.step());
    }
}
