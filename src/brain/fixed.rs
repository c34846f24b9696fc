//! Brains that answer every tick with the same action

use async_trait::async_trait;

use super::{Brain, DecisionError, Observation, Pilot};
use crate::game::protocol::Action;

pub struct FixedBrain {
    name: &'static str,
    action: Action,
}

impl FixedBrain {
    /// Never does anything
    pub fn idle() -> Self {
        Self {
            name: "idle",
            action: Action::Wait,
        }
    }

    /// Sits still and sweeps the turret
    pub fn spinner() -> Self {
        Self {
            name: "spinner",
            action: Action::SpinLeft,
        }
    }
}

impl Brain for FixedBrain {
    fn name(&self) -> &'static str {
        self.name
    }

    fn new_pilot(&self, _game_id: &str) -> Box<dyn Pilot> {
        Box::new(FixedPilot(self.action))
    }
}

struct FixedPilot(Action);

#[async_trait]
impl Pilot for FixedPilot {
    async fn decide(&mut self, _obs: &Observation) -> Result<Action, DecisionError> {
        Ok(self.0)
    }
}
