//! Application state shared across routes

use std::sync::Arc;

use crate::brain::{build_brain, Brain};
use crate::config::Config;
use crate::game::GameRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<GameRegistry>,
    pub brain: Arc<dyn Brain>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let brain = build_brain(&config);
        Self::with_brain(config, brain)
    }

    /// Build state around an explicit collaborator
    pub fn with_brain(config: Config, brain: Arc<dyn Brain>) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(GameRegistry::new()),
            brain,
        }
    }
}
