//! Uniformly random actions, reproducible per game

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{Brain, DecisionError, Observation, Pilot};
use crate::game::protocol::Action;

pub struct RandomBrain {
    seed: u64,
}

impl RandomBrain {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Same base seed and game id always yield the same action sequence
    fn game_seed(&self, game_id: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        game_id.hash(&mut hasher);
        self.seed ^ hasher.finish()
    }
}

impl Brain for RandomBrain {
    fn name(&self) -> &'static str {
        "random"
    }

    fn new_pilot(&self, game_id: &str) -> Box<dyn Pilot> {
        Box::new(RandomPilot {
            rng: ChaCha8Rng::seed_from_u64(self.game_seed(game_id)),
        })
    }
}

struct RandomPilot {
    rng: ChaCha8Rng,
}

#[async_trait]
impl Pilot for RandomPilot {
    async fn decide(&mut self, _obs: &Observation) -> Result<Action, DecisionError> {
        Action::ALL
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| DecisionError::Internal("empty action table".to_string()))
    }
}
