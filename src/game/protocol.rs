//! HTTP wire types exchanged with the arena engine
//!
//! Field names are snake_case on the wire, which is what the engine sends.
//! camelCase spellings are accepted as aliases on every multi-word field.

use serde::{Deserialize, Deserializer, Serialize};

/// Tank position in arena coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "PositionRepr")]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// The engine serializes positions as `[x, y]`; hand-written clients tend to use `{x, y}`
#[derive(Deserialize)]
#[serde(untagged)]
enum PositionRepr {
    Pair([f32; 2]),
    Named { x: f32, y: f32 },
}

impl From<PositionRepr> for Position {
    fn from(repr: PositionRepr) -> Self {
        match repr {
            PositionRepr::Pair([x, y]) => Self { x, y },
            PositionRepr::Named { x, y } => Self { x, y },
        }
    }
}

impl Position {
    pub fn distance(&self, other: &Position) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// One sensor ray. Both distances absent means nothing was hit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VisionReading {
    #[serde(
        default,
        alias = "wallDistance",
        alias = "Wall",
        skip_serializing_if = "Option::is_none"
    )]
    pub wall: Option<f32>,

    #[serde(
        default,
        alias = "enemyDistance",
        alias = "Enemy",
        skip_serializing_if = "Option::is_none"
    )]
    pub enemy: Option<f32>,
}

impl VisionReading {
    pub fn is_empty(&self) -> bool {
        self.wall.is_none() && self.enemy.is_none()
    }
}

/// Rays with no hit arrive as `null`; treat them as empty readings
fn nullable_readings<'de, D>(deserializer: D) -> Result<Vec<VisionReading>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Option<VisionReading>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

// ============================================================================
// Requests
// ============================================================================

/// `POST /start_game`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartGameRequest {
    #[serde(default, alias = "gameId")]
    pub game_id: Option<String>,
}

/// `POST /brain`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainRequest {
    #[serde(alias = "gameId")]
    pub game_id: String,

    #[serde(alias = "position")]
    pub pos: Position,

    /// Hull heading in radians. The engine does not send it, so it defaults to zero.
    #[serde(default, alias = "hull_rot", alias = "hullRotation")]
    pub rot: f32,

    #[serde(alias = "turretRot", alias = "turretRotation")]
    pub turret_rot: f32,

    #[serde(default, alias = "turretVision", deserialize_with = "nullable_readings")]
    pub turret_vision: Vec<VisionReading>,

    #[serde(default, alias = "hullVision", deserialize_with = "nullable_readings")]
    pub hull_vision: Vec<VisionReading>,
}

/// `POST /win` and `POST /loss`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStatusRequest {
    #[serde(default, alias = "gameId")]
    pub game_id: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

/// Action labels the engine maps onto tank instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MoveForward,
    MoveBackward,
    RotateLeft,
    RotateRight,
    /// Turret counter-clockwise
    SpinLeft,
    /// Turret clockwise
    SpinRight,
    Shoot,
    Wait,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::MoveForward,
        Action::MoveBackward,
        Action::RotateLeft,
        Action::RotateRight,
        Action::SpinLeft,
        Action::SpinRight,
        Action::Shoot,
        Action::Wait,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::MoveForward => "move_forward",
            Action::MoveBackward => "move_backward",
            Action::RotateLeft => "rotate_left",
            Action::RotateRight => "rotate_right",
            Action::SpinLeft => "spin_left",
            Action::SpinRight => "spin_right",
            Action::Shoot => "shoot",
            Action::Wait => "wait",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply to start/win/loss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
}

/// Reply to `/brain`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub action: Action,
}

/// Body of every error reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
