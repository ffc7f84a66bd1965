//! Explicit registry of running simulations keyed by session identifier.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use stackbots_core::{SimulationConfig, SimulationState};
use thiserror::Error;
use tracing::debug;

use crate::{Simulation, SimulationError};

/// Identifier handed out for every simulation stored in a [`SessionStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Creates a session identifier from its numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised when addressing a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No simulation is stored under the identifier.
    #[error("unknown simulation session {0}")]
    UnknownSession(SessionId),
}

/// Owns every simulation created on behalf of external callers.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: BTreeMap<SessionId, Simulation>,
    next_id: u64,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a new simulation and stores it.
    pub fn create(&mut self, config: SimulationConfig) -> Result<SessionId, SimulationError> {
        let simulation = Simulation::new(config)?;
        Ok(self.insert(simulation))
    }

    /// Stores an existing simulation under a fresh identifier.
    pub fn insert(&mut self, simulation: Simulation) -> SessionId {
        let id = SessionId::new(self.next_id);
        self.next_id += 1;
        let _ = self.sessions.insert(id, simulation);
        debug!(session = %id, "session created");
        id
    }

    /// Advances the session by one step and returns its new state.
    pub fn step(&mut self, id: SessionId) -> Result<SimulationState, SessionError> {
        self.sessions
            .get_mut(&id)
            .map(Simulation::step)
            .ok_or(SessionError::UnknownSession(id))
    }

    /// Reads the session's state without advancing it.
    pub fn state(&self, id: SessionId) -> Result<SimulationState, SessionError> {
        self.get(id).map(Simulation::state)
    }

    /// Reports whether the session is still running.
    pub fn is_running(&self, id: SessionId) -> Result<bool, SessionError> {
        self.get(id).map(Simulation::is_running)
    }

    /// Borrows the stored simulation.
    pub fn get(&self, id: SessionId) -> Result<&Simulation, SessionError> {
        self.sessions
            .get(&id)
            .ok_or(SessionError::UnknownSession(id))
    }

    /// Removes the session, handing back its simulation.
    pub fn remove(&mut self, id: SessionId) -> Result<Simulation, SessionError> {
        self.sessions
            .remove(&id)
            .ok_or(SessionError::UnknownSession(id))
    }

    /// Identifiers of every stored session in creation order.
    pub fn ids(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.sessions.keys().copied()
    }

    /// Number of stored sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Reports whether no sessions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
