//! Wall-avoiding explorer
//!
//! Drives forward until the hull rays report a wall close ahead, then turns
//! away from the nearer side. If the tank barely moves for several ticks it
//! backs off and rotates toward open space. Shoots on every second tick while
//! an enemy is in turret range.

use async_trait::async_trait;
use tracing::debug;

use super::{Brain, DecisionError, Observation, Pilot};
use crate::game::protocol::{Action, Position, VisionReading};
use crate::game::Outcome;

/// Hull ray indices, clockwise from the nose
const HULL_FRONT: usize = 0;
const HULL_FRONT_RIGHT: usize = 1;
const HULL_FRONT_LEFT: usize = 7;

/// Tunables for [`ExplorerBrain`]
#[derive(Debug, Clone, Copy)]
pub struct ExplorerTuning {
    /// Walls closer than this count as blocking
    pub wall_threshold: f32,
    /// Movement below this between ticks counts as not moving
    pub stuck_distance: f32,
    /// Ticks without movement before the unstuck manoeuvre kicks in
    pub stuck_ticks: u32,
    /// Length of the unstuck manoeuvre
    pub unstuck_ticks: u32,
    /// Enemies further than this are ignored
    pub fire_range: f32,
}

impl Default for ExplorerTuning {
    fn default() -> Self {
        Self {
            wall_threshold: 40.0,
            stuck_distance: 5.0,
            stuck_ticks: 5,
            unstuck_ticks: 3,
            fire_range: 100.0,
        }
    }
}

#[derive(Default)]
pub struct ExplorerBrain {
    tuning: ExplorerTuning,
}

impl ExplorerBrain {
    pub fn with_tuning(tuning: ExplorerTuning) -> Self {
        Self { tuning }
    }
}

impl Brain for ExplorerBrain {
    fn name(&self) -> &'static str {
        "explorer"
    }

    fn new_pilot(&self, _game_id: &str) -> Box<dyn Pilot> {
        Box::new(ExplorerPilot::new(self.tuning))
    }
}

struct ExplorerPilot {
    tuning: ExplorerTuning,
    last_pos: Option<Position>,
    stuck_counter: u32,
    unstuck_remaining: u32,
    tick: u64,
}

impl ExplorerPilot {
    fn new(tuning: ExplorerTuning) -> Self {
        Self {
            tuning,
            last_pos: None,
            stuck_counter: 0,
            unstuck_remaining: 0,
            tick: 0,
        }
    }

    fn is_blocked(&self, wall: Option<f32>) -> bool {
        wall.is_some_and(|d| d < self.tuning.wall_threshold)
    }

    fn track_movement(&mut self, pos: Position) {
        if let Some(last) = self.last_pos {
            if last.distance(&pos) < self.tuning.stuck_distance {
                self.stuck_counter += 1;
            } else {
                self.stuck_counter = 0;
            }
        }
        self.last_pos = Some(pos);

        if self.stuck_counter > self.tuning.stuck_ticks {
            self.stuck_counter = 0;
            self.unstuck_remaining = self.tuning.unstuck_ticks;
        }
    }

    /// Alternates reversing with turning toward whichever front corner is open
    fn unstuck(&mut self, left: Option<f32>, right: Option<f32>) -> Action {
        let action = if self.unstuck_remaining % 2 == 0 {
            Action::MoveBackward
        } else if !self.is_blocked(left) {
            Action::RotateLeft
        } else if !self.is_blocked(right) {
            Action::RotateRight
        } else {
            Action::MoveBackward
        };
        self.unstuck_remaining -= 1;
        action
    }

    fn steer(&self, front: Option<f32>, left: Option<f32>, right: Option<f32>) -> Action {
        if !self.is_blocked(front) {
            return Action::MoveForward;
        }

        match (self.is_blocked(left), self.is_blocked(right)) {
            (true, true) => {
                // both set when both blocked
                if left.unwrap_or(f32::MAX) < right.unwrap_or(f32::MAX) {
                    Action::RotateRight
                } else {
                    Action::RotateLeft
                }
            }
            (true, false) => Action::RotateRight,
            (false, true) => Action::RotateLeft,
            (false, false) => Action::MoveForward,
        }
    }

    fn enemy_in_range(&self, turret_vision: &[VisionReading]) -> bool {
        turret_vision
            .iter()
            .filter_map(|r| r.enemy)
            .any(|d| d < self.tuning.fire_range)
    }
}

fn wall_at(vision: &[VisionReading], index: usize) -> Option<f32> {
    vision.get(index).and_then(|r| r.wall)
}

#[async_trait]
impl Pilot for ExplorerPilot {
    async fn decide(&mut self, obs: &Observation) -> Result<Action, DecisionError> {
        if !obs.position.x.is_finite() || !obs.position.y.is_finite() {
            return Err(DecisionError::InvalidObservation(format!(
                "non-finite position ({}, {})",
                obs.position.x, obs.position.y
            )));
        }

        self.track_movement(obs.position);

        let front = wall_at(&obs.hull_vision, HULL_FRONT);
        let left = wall_at(&obs.hull_vision, HULL_FRONT_LEFT);
        let right = wall_at(&obs.hull_vision, HULL_FRONT_RIGHT);

        if self.unstuck_remaining > 0 {
            let action = self.unstuck(left, right);
            debug!(
                game_id = %obs.game_id,
                action = %action,
                remaining = self.unstuck_remaining,
                "Unstuck manoeuvre"
            );
            return Ok(action);
        }

        let mut action = self.steer(front, left, right);

        self.tick += 1;
        if self.tick % 2 == 0 && self.enemy_in_range(&obs.turret_vision) {
            action = Action::Shoot;
        }

        Ok(action)
    }

    fn finish(&mut self, outcome: Outcome) {
        debug!(ticks = self.tick, outcome = ?outcome, "Explorer retired");
    }
}
