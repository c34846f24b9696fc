//! Configuration module - command-line flags with environment fallbacks

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Available decision collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BrainKind {
    /// Always waits (template placeholder)
    Idle,
    /// Spins the turret left forever
    Spinner,
    /// Uniformly random actions from a seeded RNG
    Random,
    /// Wall avoidance, unstuck manoeuvres and opportunistic shooting
    Explorer,
}

/// Raw command-line arguments
#[derive(Debug, Clone, Parser)]
#[command(name = "tank_brain_server")]
#[command(about = "Decision server for the tank arena engine")]
#[command(version)]
pub struct Args {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    /// Decision collaborator driving every game
    #[arg(long, env = "BRAIN", value_enum, default_value_t = BrainKind::Explorer)]
    pub brain: BrainKind,

    /// Upper bound on a single decision, in milliseconds
    #[arg(long, env = "DECISION_TIMEOUT_MS", default_value_t = 250)]
    pub decision_timeout_ms: u64,

    /// Upper bound on a whole HTTP request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Games with no traffic for this many seconds are dropped (0 disables)
    #[arg(long, env = "GAME_IDLE_TIMEOUT_SECS", default_value_t = 300)]
    pub game_idle_timeout_secs: u64,

    /// How often the idle-game reaper runs, in seconds
    #[arg(long, env = "REAP_INTERVAL_SECS", default_value_t = 30)]
    pub reap_interval_secs: u64,

    /// Base seed for the random brain
    #[arg(long, env = "RANDOM_SEED", default_value_t = 0)]
    pub random_seed: u64,
}

/// Validated application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// JSON formatted logs
    pub log_json: bool,

    /// Which collaborator answers `/brain`
    pub brain: BrainKind,
    /// Deadline for one `decide` call
    pub decision_timeout: Duration,
    /// Deadline for one HTTP request
    pub request_timeout: Duration,

    /// Idle timeout before a game is considered abandoned
    pub game_idle_timeout: Option<Duration>,
    /// Reaper tick period
    pub reap_interval: Duration,

    /// Base seed for the random brain
    pub random_seed: u64,
}

impl Config {
    /// Parse process arguments (and environment) into a configuration
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        if args.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if args.decision_timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration("DECISION_TIMEOUT_MS"));
        }
        if args.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration("REQUEST_TIMEOUT_SECS"));
        }
        if args.reap_interval_secs == 0 {
            return Err(ConfigError::ZeroDuration("REAP_INTERVAL_SECS"));
        }

        let decision_timeout = Duration::from_millis(args.decision_timeout_ms);
        let request_timeout = Duration::from_secs(args.request_timeout_secs);
        if request_timeout <= decision_timeout {
            return Err(ConfigError::RequestTimeoutTooShort {
                request_ms: request_timeout.as_millis() as u64,
                decision_ms: decision_timeout.as_millis() as u64,
            });
        }

        Ok(Self {
            server_addr: SocketAddr::new(args.host, args.port),
            log_level: args.log_level,
            log_json: args.log_json,
            brain: args.brain,
            decision_timeout,
            request_timeout,
            game_idle_timeout: (args.game_idle_timeout_secs > 0)
                .then(|| Duration::from_secs(args.game_idle_timeout_secs)),
            reap_interval: Duration::from_secs(args.reap_interval_secs),
            random_seed: args.random_seed,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            log_level: "info".to_string(),
            log_json: false,
            brain: BrainKind::Explorer,
            decision_timeout: Duration::from_millis(250),
            request_timeout: Duration::from_secs(10),
            game_idle_timeout: Some(Duration::from_secs(300)),
            reap_interval: Duration::from_secs(30),
            random_seed: 0,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Port must be non-zero")]
    InvalidPort,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("Request timeout ({request_ms} ms) must exceed the decision timeout ({decision_ms} ms)")]
    RequestTimeoutTooShort { request_ms: u64, decision_ms: u64 },
}
