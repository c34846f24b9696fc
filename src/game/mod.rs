//! Game instance tracking

pub mod protocol;
pub mod reaper;
pub mod registry;

pub use registry::{GameRegistry, RegistryError};

use serde::Serialize;

/// How a game instance ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
    /// The engine went silent without reporting a result
    Abandoned,
}

/// Lifecycle tag of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Active,
    Finished(Outcome),
}

impl GameStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, GameStatus::Active)
    }
}
