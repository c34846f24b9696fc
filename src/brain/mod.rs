//! Decision collaborators
//!
//! A [`Brain`] is a factory shared by the whole server. Every game gets its
//! own [`Pilot`] from it, so per-game memory lives inside the pilot and is
//! only ever touched by one `/brain` call at a time.

pub mod explorer;
pub mod fixed;
pub mod random;

pub use explorer::ExplorerBrain;
pub use fixed::FixedBrain;
pub use random::RandomBrain;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{BrainKind, Config};
use crate::game::protocol::{Action, BrainRequest, Position, VisionReading};
use crate::game::Outcome;

/// Everything the engine tells us about our tank for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub game_id: String,
    pub position: Position,
    pub hull_rotation: f32,
    pub turret_rotation: f32,
    pub turret_vision: Vec<VisionReading>,
    pub hull_vision: Vec<VisionReading>,
}

impl From<BrainRequest> for Observation {
    fn from(req: BrainRequest) -> Self {
        Self {
            game_id: req.game_id,
            position: req.pos,
            hull_rotation: req.rot,
            turret_rotation: req.turret_rot,
            turret_vision: req.turret_vision,
            hull_vision: req.hull_vision,
        }
    }
}

/// Failure inside a collaborator
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("observation rejected: {0}")]
    InvalidObservation(String),

    #[error("decision timed out after {0} ms")]
    Timeout(u64),

    #[error("{0}")]
    Internal(String),
}

/// Creates one pilot per game instance
pub trait Brain: Send + Sync {
    fn name(&self) -> &'static str;

    fn new_pilot(&self, game_id: &str) -> Box<dyn Pilot>;
}

/// Per-game decision maker
#[async_trait]
pub trait Pilot: Send {
    async fn decide(&mut self, obs: &Observation) -> Result<Action, DecisionError>;

    /// Called once when the game ends, whichever way it ended
    fn finish(&mut self, _outcome: Outcome) {}
}

/// Build the collaborator selected in the configuration
pub fn build_brain(config: &Config) -> Arc<dyn Brain> {
    match config.brain {
        BrainKind::Idle => Arc::new(FixedBrain::idle()),
        BrainKind::Spinner => Arc::new(FixedBrain::spinner()),
        BrainKind::Random => Arc::new(RandomBrain::new(config.random_seed)),
        BrainKind::Explorer => Arc::new(ExplorerBrain::default()),
    }
}
