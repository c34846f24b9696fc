//! HTTP route definitions

use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use tower::{timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::app::AppState;
use crate::brain::Observation;
use crate::game::protocol::{
    ActionResponse, BrainRequest, GameStatusRequest, MessageResponse, StartGameRequest,
};
use crate::game::registry::RegistryStats;
use crate::game::Outcome;
use crate::http::error::AppError;
use crate::util::time::uptime_secs;

/// JSON body extractor whose failures become `AppError::Decode`
type JsonBody<T> = WithRejection<Json<T>, AppError>;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout;

    Router::new()
        .route("/health", get(health_handler))
        .route("/start_game", post(start_game_handler))
        .route("/brain", post(brain_handler))
        .route("/win", post(win_handler))
        .route("/loss", post(loss_handler))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                    request_failed(err, request_timeout)
                }))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Requests cut off by the outer deadline still answer with the JSON error body
fn request_failed(err: BoxError, deadline: Duration) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::Decision(format!(
            "request timed out after {} ms",
            deadline.as_millis()
        ))
    } else {
        AppError::Decision(format!("unhandled middleware error: {}", err))
    }
}

fn require_game_id(game_id: Option<String>) -> Result<String, AppError> {
    match game_id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(AppError::Validation("Game ID is required".to_string())),
    }
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    brain: &'static str,
    #[serde(flatten)]
    games: RegistryStats,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        brain: state.brain.name(),
        games: state.registry.stats(),
    })
}

// ============================================================================
// Game lifecycle endpoints
// ============================================================================

async fn start_game_handler(
    State(state): State<AppState>,
    WithRejection(Json(req), _): JsonBody<StartGameRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let game_id = require_game_id(req.game_id)?;

    let pilot = state.brain.new_pilot(&game_id);
    state.registry.start(&game_id, pilot)?;

    Ok(Json(MessageResponse {
        message: format!("Game {} started successfully", game_id),
        game_id: Some(game_id),
    }))
}

async fn brain_handler(
    State(state): State<AppState>,
    WithRejection(Json(req), _): JsonBody<BrainRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    let game_id = require_game_id(Some(req.game_id.clone()))?;
    let session = state.registry.get_active(&game_id)?;

    let obs = Observation::from(req);
    let action = session.decide(&obs, state.config.decision_timeout).await?;

    debug!(game_id = %game_id, action = %action, "Decision");
    Ok(Json(ActionResponse { action }))
}

async fn win_handler(
    State(state): State<AppState>,
    WithRejection(Json(req), _): JsonBody<GameStatusRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    finish_game(&state, req, Outcome::Win).await
}

async fn loss_handler(
    State(state): State<AppState>,
    WithRejection(Json(req), _): JsonBody<GameStatusRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    finish_game(&state, req, Outcome::Loss).await
}

async fn finish_game(
    state: &AppState,
    req: GameStatusRequest,
    outcome: Outcome,
) -> Result<Json<MessageResponse>, AppError> {
    let game_id = require_game_id(req.game_id)?;
    state.registry.finish(&game_id, outcome).await?;

    match outcome {
        Outcome::Win => info!(game_id = %game_id, "Winner winner"),
        _ => info!(game_id = %game_id, "Lost this one"),
    }

    Ok(Json(MessageResponse {
        message: format!("Game {} ended successfully", game_id),
        game_id: Some(game_id),
    }))
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
