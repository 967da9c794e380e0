// All tunable episode constants in one place.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// World
pub const WORLD_WIDTH: f32 = 500.0;
pub const WORLD_HEIGHT: f32 = 800.0;
pub const GROUND_Y: f32 = 730.0;
pub const TICKS_PER_SECOND: u32 = 30;

// Agent
pub const AGENT_START_X: f32 = 230.0;
pub const AGENT_START_Y: f32 = 350.0;
pub const AGENT_WIDTH: u32 = 68;
pub const AGENT_HEIGHT: u32 = 48;
pub const JUMP_VELOCITY: f32 = -10.5;
pub const GRAVITY: f32 = 3.0;
pub const TERMINAL_DISPLACEMENT: f32 = 16.0;
pub const RISE_PENALTY: f32 = 2.0;
pub const TILT_MAX: f32 = 25.0;
pub const TILT_STEP: f32 = 20.0;
pub const TILT_FLOOR: f32 = -90.0;
pub const TILT_HOLD_BAND: f32 = 50.0;

// Obstacles
pub const OBSTACLE_GAP: f32 = 200.0;
pub const OBSTACLE_WIDTH: u32 = 104;
pub const OBSTACLE_HEIGHT: u32 = 640;
pub const OBSTACLE_SPAWN_X: f32 = 600.0;
pub const GAP_TOP_MIN: u32 = 50;
pub const GAP_TOP_MAX: u32 = 450;
pub const SCROLL_VELOCITY: f32 = 5.0;

// Ground
pub const GROUND_TILE_WIDTH: f32 = 672.0;

// Fitness
pub const SURVIVAL_BONUS: f32 = 0.1;
pub const PASS_BONUS: f32 = 5.0;
pub const SCORE_CEILING: u32 = 50;
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Errors raised while loading or validating an [`EpisodeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Episode-level knobs. Every field falls back to the matching constant above.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    /// Seed for obstacle gap sampling.
    pub seed: u64,
    /// Horizontal pixels per tick shared by obstacles and ground.
    pub scroll_velocity: f32,
    /// Vertical opening between the two barriers.
    pub gap: f32,
    /// Inclusive lower bound of the sampled gap top.
    pub gap_top_min: u32,
    /// Exclusive upper bound of the sampled gap top.
    pub gap_top_max: u32,
    /// Horizontal position new obstacles appear at.
    pub spawn_x: f32,
    /// Fitness every live agent earns per tick.
    pub survival_bonus: f32,
    /// Fitness every live agent earns when an obstacle is cleared.
    pub pass_bonus: f32,
    /// Episode ends as solved once the score exceeds this.
    pub score_ceiling: u32,
    /// Controller outputs above this trigger a jump.
    pub decision_threshold: f32,
    /// Place one obstacle before the first tick.
    pub seed_obstacle: bool,
    /// Optional hard stop, in ticks.
    pub max_ticks: Option<u64>,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            scroll_velocity: SCROLL_VELOCITY,
            gap: OBSTACLE_GAP,
            gap_top_min: GAP_TOP_MIN,
            gap_top_max: GAP_TOP_MAX,
            spawn_x: OBSTACLE_SPAWN_X,
            survival_bonus: SURVIVAL_BONUS,
            pass_bonus: PASS_BONUS,
            score_ceiling: SCORE_CEILING,
            decision_threshold: DECISION_THRESHOLD,
            seed_obstacle: true,
            max_ticks: None,
        }
    }
}

impl EpisodeConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scroll_velocity.is_finite() && self.scroll_velocity > 0.0) {
            return Err(ConfigError::Invalid("scroll_velocity must be positive"));
        }
        if !(self.gap.is_finite() && self.gap > 0.0) {
            return Err(ConfigError::Invalid("gap must be positive"));
        }
        if self.gap_top_min >= self.gap_top_max {
            return Err(ConfigError::Invalid(
                "gap_top_min must be below gap_top_max",
            ));
        }
        if self.gap_top_max as f32 + self.gap > GROUND_Y {
            return Err(ConfigError::Invalid(
                "gap range must leave the opening above the ground",
            ));
        }
        if !self.spawn_x.is_finite() {
            return Err(ConfigError::Invalid("spawn_x must be finite"));
        }
        if self.survival_bonus < 0.0 || self.pass_bonus < 0.0 {
            return Err(ConfigError::Invalid("fitness bonuses must not be negative"));
        }
        if !self.decision_threshold.is_finite() {
            return Err(ConfigError::Invalid("decision_threshold must be finite"));
        }
        if self.max_ticks == Some(0) {
            return Err(ConfigError::Invalid("max_ticks must be positive when set"));
        }
        Ok(())
    }

    /// Midpoint of the sampling range, used when no obstacle is on screen.
    pub fn sentinel_gap_top(&self) -> f32 {
        (self.gap_top_min + self.gap_top_max) as f32 * 0.5
    }
}
