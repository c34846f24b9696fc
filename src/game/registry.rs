//! Registry of live game instances keyed by game id

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::protocol::Action;
use super::{GameStatus, Outcome};
use crate::brain::{DecisionError, Observation, Pilot};

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Game {0} is already active")]
    AlreadyActive(String),

    #[error("Game {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Decision(#[from] DecisionError),
}

/// One game instance and the pilot playing it
pub struct GameSession {
    pub id: String,
    pub started_at: DateTime<Utc>,
    status: RwLock<GameStatus>,
    last_seen: Mutex<Instant>,
    decisions: AtomicU64,
    /// Held across `decide`, so calls for the same game are serialized
    pilot: AsyncMutex<Box<dyn Pilot>>,
}

impl GameSession {
    fn new(id: String, pilot: Box<dyn Pilot>) -> Self {
        Self {
            id,
            started_at: Utc::now(),
            status: RwLock::new(GameStatus::Active),
            last_seen: Mutex::new(Instant::now()),
            decisions: AtomicU64::new(0),
            pilot: AsyncMutex::new(pilot),
        }
    }

    pub fn status(&self) -> GameStatus {
        *self.status.read()
    }

    pub fn decisions(&self) -> u64 {
        self.decisions.load(Ordering::Relaxed)
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }

    fn touch(&self) {
        *self.last_seen.lock() = Instant::now();
    }

    /// Ask this game's pilot for the next action, bounded by `deadline`
    pub async fn decide(&self, obs: &Observation, deadline: Duration) -> Result<Action, RegistryError> {
        let mut pilot = self.pilot.lock().await;

        // The game may have ended while we waited for the pilot
        if !self.status().is_active() {
            return Err(RegistryError::NotFound(self.id.clone()));
        }
        self.touch();

        let action = tokio::time::timeout(deadline, pilot.decide(obs))
            .await
            .map_err(|_| DecisionError::Timeout(deadline.as_millis() as u64))??;

        self.decisions.fetch_add(1, Ordering::Relaxed);
        Ok(action)
    }

    /// Tag the session terminal. The pilot's finish hook runs on its own task once any
    /// in-flight decision is done, so it still runs if the caller is dropped.
    fn close(self: &Arc<Self>, outcome: Outcome) -> JoinHandle<()> {
        *self.status.write() = GameStatus::Finished(outcome);

        let session = Arc::clone(self);
        tokio::spawn(async move {
            session.pilot.lock().await.finish(outcome);
        })
    }
}

/// Snapshot of registry counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub active_games: usize,
    pub games_started: u64,
    pub games_won: u64,
    pub games_lost: u64,
    pub games_abandoned: u64,
}

/// Concurrent map of active games
pub struct GameRegistry {
    games: DashMap<String, Arc<GameSession>>,
    started: AtomicU64,
    won: AtomicU64,
    lost: AtomicU64,
    abandoned: AtomicU64,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self {
            games: DashMap::new(),
            started: AtomicU64::new(0),
            won: AtomicU64::new(0),
            lost: AtomicU64::new(0),
            abandoned: AtomicU64::new(0),
        }
    }

    /// Register a new active game. Fails if the id is already in play.
    pub fn start(&self, game_id: &str, pilot: Box<dyn Pilot>) -> Result<Arc<GameSession>, RegistryError> {
        match self.games.entry(game_id.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyActive(game_id.to_string())),
            Entry::Vacant(slot) => {
                let session = Arc::new(GameSession::new(game_id.to_string(), pilot));
                slot.insert(session.clone());
                self.started.fetch_add(1, Ordering::Relaxed);
                info!(game_id = %game_id, "Game started");
                Ok(session)
            }
        }
    }

    pub fn get_active(&self, game_id: &str) -> Result<Arc<GameSession>, RegistryError> {
        self.games
            .get(game_id)
            .map(|s| s.value().clone())
            .filter(|s| s.status().is_active())
            .ok_or_else(|| RegistryError::NotFound(game_id.to_string()))
    }

    /// End a game. New decisions for it fail from this point on.
    pub async fn finish(&self, game_id: &str, outcome: Outcome) -> Result<Arc<GameSession>, RegistryError> {
        let (_, session) = self
            .games
            .remove(game_id)
            .ok_or_else(|| RegistryError::NotFound(game_id.to_string()))?;

        let hook = session.close(outcome);
        self.count(outcome);
        if let Err(err) = hook.await {
            warn!(game_id = %game_id, error = %err, "Pilot finish hook failed");
        }

        info!(
            game_id = %game_id,
            outcome = ?outcome,
            decisions = session.decisions(),
            duration_secs = (Utc::now() - session.started_at).num_seconds(),
            "Game finished"
        );
        Ok(session)
    }

    /// Drop games that have been silent for at least `max_idle`
    pub async fn reap_idle(&self, max_idle: Duration) -> Vec<String> {
        let stale: Vec<String> = self
            .games
            .iter()
            .filter(|entry| entry.value().idle_for() >= max_idle)
            .map(|entry| entry.key().clone())
            .collect();

        let mut reaped = Vec::with_capacity(stale.len());
        for game_id in stale {
            // Re-check under the shard lock in case the game saw traffic meanwhile
            let Some((_, session)) = self
                .games
                .remove_if(&game_id, |_, s| s.idle_for() >= max_idle)
            else {
                continue;
            };

            let hook = session.close(Outcome::Abandoned);
            self.count(Outcome::Abandoned);
            if let Err(err) = hook.await {
                warn!(game_id = %game_id, error = %err, "Pilot finish hook failed");
            }
            debug!(game_id = %game_id, "Reaped idle game");
            reaped.push(game_id);
        }
        reaped
    }

    fn count(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Win => &self.won,
            Outcome::Loss => &self.lost,
            Outcome::Abandoned => &self.abandoned,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn active_games(&self) -> usize {
        self.games.len()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            active_games: self.active_games(),
            games_started: self.started.load(Ordering::Relaxed),
            games_won: self.won.load(Ordering::Relaxed),
            games_lost: self.lost.load(Ordering::Relaxed),
            games_abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}
