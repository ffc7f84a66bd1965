#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn-based orchestration of a stackbots run.
//!
//! A [`Simulation`] owns the world, the seeded random source, and the robot
//! system. Every step activates each entity once in a fresh random order,
//! recounts the stacks on the seed cells, and decides whether the run has
//! succeeded or exhausted its step budget.

mod session;

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stackbots_core::{
    ConfigurationError, Event, ItemState, RobotState, RunStatus, SimulationConfig,
    SimulationState, StackState,
};
use stackbots_system_census::StackCensus;
use stackbots_system_robots::Robots;
use stackbots_world::{self as world, query, World};
use thiserror::Error;
use tracing::info;

pub use self::session::{SessionError, SessionId, SessionStore};

/// Errors raised while creating a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The requested layout does not fit on the grid.
    #[error("invalid simulation configuration: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// A single warehouse run.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    robots: Robots,
    rng: ChaCha8Rng,
    robot_count: u64,
    step: u64,
    status: RunStatus,
    census: StackCensus,
    events: Vec<Event>,
}

impl Simulation {
    /// Seeds a new run from the configuration.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let world = World::generate(&config, &mut rng)?;
        Ok(Self::assemble(config, world, rng))
    }

    /// Runs a prepared world instead of a randomly seeded one.
    ///
    /// Only `max_steps` and `seed` are read from the configuration; the
    /// layout comes from `world`.
    #[must_use]
    pub fn with_world(config: SimulationConfig, world: World) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::assemble(config, world, rng)
    }

    fn assemble(config: SimulationConfig, world: World, rng: ChaCha8Rng) -> Self {
        let robot_count = u64::try_from(query::robot_view(&world).into_vec().len()).unwrap_or(0);
        let census = take_census(&world);
        let status = if config.max_steps == 0 {
            RunStatus::TimedOut
        } else {
            RunStatus::Running
        };

        info!(
            width = query::grid(&world).width(),
            height = query::grid(&world).height(),
            robots = robot_count,
            items = query::total_items(&world),
            max_steps = config.max_steps,
            seed = config.seed,
            "simulation created"
        );

        Self {
            config,
            world,
            robots: Robots::default(),
            rng,
            robot_count,
            step: 0,
            status,
            census,
            events: Vec::new(),
        }
    }

    /// Advances one step and returns the resulting state.
    ///
    /// A finished run is not advanced; its final state is returned as is.
    pub fn step(&mut self) -> SimulationState {
        let _ = self.advance();
        self.state()
    }

    /// Advances one step and returns the events it produced.
    pub fn advance(&mut self) -> &[Event] {
        self.events.clear();
        if !self.status.is_running() {
            return &self.events;
        }

        let mut order = query::entity_ids(&self.world);
        order.shuffle(&mut self.rng);

        let mut commands = Vec::new();
        for id in order {
            let Some(robot) = query::robot(&self.world, id) else {
                continue;
            };
            self.robots
                .activate(&robot, &self.world, &mut self.rng, &mut commands);
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut self.events);
            }
        }

        self.step += 1;
        self.census = take_census(&self.world);

        if self.census.is_consolidated() {
            self.status = RunStatus::Succeeded;
            info!(step = self.step, "every item stacked");
        } else if self.step >= self.config.max_steps {
            self.status = RunStatus::TimedOut;
            info!(
                step = self.step,
                lone_items = self.census.lone_items(),
                stacked_items = self.census.stacked_items(),
                "step budget exhausted"
            );
        }

        &self.events
    }

    /// Steps until the run stops and reports how it ended.
    pub fn run_to_completion(&mut self) -> RunStatus {
        while self.status.is_running() {
            let _ = self.advance();
        }
        self.status
    }

    /// Captures the observable state without advancing.
    #[must_use]
    pub fn state(&self) -> SimulationState {
        let robots = query::robot_view(&self.world)
            .iter()
            .map(|robot| RobotState {
                id: robot.id.get(),
                x: robot.cell.column(),
                y: robot.cell.row(),
                carrying: robot.carrying,
            })
            .collect();
        let items = query::item_view(&self.world)
            .iter()
            .map(|item| ItemState {
                id: item.id.get(),
                x: item.cell.column(),
                y: item.cell.row(),
                active: item.active,
            })
            .collect();
        let stacks = self
            .census
            .stacks()
            .iter()
            .copied()
            .map(StackState::from)
            .collect();

        SimulationState {
            step: self.step,
            status: self.status,
            robot_moves: self.step.saturating_mul(self.robot_count),
            robots,
            items,
            stacks,
        }
    }

    /// Reports whether the run still accepts steps.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Steps completed so far.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.step
    }

    /// Configuration the run was created with.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Census taken at the end of the latest step.
    #[must_use]
    pub fn census(&self) -> &StackCensus {
        &self.census
    }
}

fn take_census(world: &World) -> StackCensus {
    StackCensus::take(query::seed_cells(world), query::total_items(world), |cell| {
        query::stack_size(world, cell)
    })
}
