use crate::maze::Pos;
use thiserror::Error;

pub const DEFAULT_GRID_W: usize = 20;
pub const DEFAULT_GRID_H: usize = 20;
pub const MIN_GRID_SIDE: usize = 5;
const CELL_SIZE: f32 = 20.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("grid {width}x{height} is too small, need at least {min}x{min}")]
    GridTooSmall { width: usize, height: usize, min: usize },

    #[error("{name} must be a positive finite number, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("{name} cell ({x}, {z}) is not inside the maze interior")]
    OutsideInterior { name: &'static str, x: usize, z: usize },

    #[error("beast spawn must differ from the player start")]
    SpawnOnStart,

    #[error("agent half-extent {half_extent} does not fit in a {cell_size} cell")]
    AgentTooWide { half_extent: f32, cell_size: f32 },
}

/// Fixed constants of a session. `Default` gives the canonical tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// World units per grid cell; walls are as tall as a cell is wide.
    pub cell_size: f32,
    pub eye_height: f32,
    pub agent_height: f32,
    pub agent_half_extent: f32,
    /// Units per second.
    pub player_speed: f32,
    /// Units per second.
    pub beast_speed: f32,
    pub capture_distance: f32,
    pub max_audible_distance: f32,
    /// Radians per second.
    pub bob_speed: f32,
    pub bob_amount: f32,
    pub waypoint_epsilon: f32,
    pub legacy_margin: f32,
    pub start: Pos,
    pub beast_spawn: Pos,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_W,
            height: DEFAULT_GRID_H,
            cell_size: CELL_SIZE,
            eye_height: CELL_SIZE / 2.0,
            agent_height: CELL_SIZE / 2.0,
            agent_half_extent: 2.0,
            player_speed: 6.0,
            beast_speed: 3.0,
            capture_distance: CELL_SIZE / 2.0,
            max_audible_distance: 230.0,
            bob_speed: 6.0,
            bob_amount: 0.25,
            waypoint_epsilon: 0.1,
            legacy_margin: 0.1,
            start: Pos { x: 1, z: 1 },
            beast_spawn: Pos {
                x: DEFAULT_GRID_W - 2,
                z: DEFAULT_GRID_H - 2,
            },
            seed: None,
        }
    }
}

impl GameConfig {
    /// Canonical constants for a grid of another size; the beast spawns in the far corner.
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            beast_spawn: Pos {
                x: width.saturating_sub(2),
                z: height.saturating_sub(2),
            },
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// World height of wall volumes.
    pub fn wall_height(&self) -> f32 {
        self.cell_size
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_GRID_SIDE || self.height < MIN_GRID_SIDE {
            return Err(ConfigError::GridTooSmall {
                width: self.width,
                height: self.height,
                min: MIN_GRID_SIDE,
            });
        }

        let positive = [
            ("cell_size", self.cell_size),
            ("eye_height", self.eye_height),
            ("agent_height", self.agent_height),
            ("agent_half_extent", self.agent_half_extent),
            ("player_speed", self.player_speed),
            ("beast_speed", self.beast_speed),
            ("capture_distance", self.capture_distance),
            ("max_audible_distance", self.max_audible_distance),
            ("bob_speed", self.bob_speed),
            ("waypoint_epsilon", self.waypoint_epsilon),
            ("legacy_margin", self.legacy_margin),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        if !(self.bob_amount.is_finite() && self.bob_amount >= 0.0) {
            return Err(ConfigError::NotPositive {
                name: "bob_amount",
                value: self.bob_amount,
            });
        }

        for (name, pos) in [("start", self.start), ("beast_spawn", self.beast_spawn)] {
            if !self.is_interior(pos) {
                return Err(ConfigError::OutsideInterior {
                    name,
                    x: pos.x,
                    z: pos.z,
                });
            }
        }
        if self.start == self.beast_spawn {
            return Err(ConfigError::SpawnOnStart);
        }

        if self.agent_half_extent * 2.0 >= self.cell_size {
            return Err(ConfigError::AgentTooWide {
                half_extent: self.agent_half_extent,
                cell_size: self.cell_size,
            });
        }
        Ok(())
    }

    fn is_interior(&self, pos: Pos) -> bool {
        pos.x > 0 && pos.z > 0 && pos.x < self.width - 1 && pos.z < self.height - 1
    }
}
