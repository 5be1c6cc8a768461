use crate::beast::{Beast, PursuitReport, PursuitWorld};
use crate::collision::{cell_center, CollisionModel};
use crate::config::{ConfigError, GameConfig};
use crate::geom::Vec2;
use crate::maze::{self, Grid};
use crate::player::{Intent, Player};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Receives the beast's loudness once per tick.
pub trait AudioSink {
    fn set_gain(&mut self, gain: f32);
}

impl AudioSink for () {
    fn set_gain(&mut self, _gain: f32) {}
}

/// Everything the collaborators hand the core for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    pub intent: Intent,
    /// Horizontal camera facing; need not be normalized.
    pub facing: Vec2,
    /// Seconds since the previous tick.
    pub dt: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// The beast reached the player this tick. Raised once per session.
    Captured,
    /// The session already ended; the tick did nothing.
    Over,
}

/// One session: the maze, its wall volumes and both agents.
pub struct Game {
    config: GameConfig,
    rng: ChaCha8Rng,
    grid: Grid,
    collision: CollisionModel,
    player: Player,
    beast: Beast,
    caught: bool,
    last_report: Option<PursuitReport>,
    ticks: u64,
    elapsed: f32,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self::build(config, rng))
    }

    fn build(config: GameConfig, mut rng: ChaCha8Rng) -> Self {
        let mut grid = maze::generate(config.width, config.height, &mut rng);
        grid.open_spawn(config.beast_spawn, config.start);

        let collision = CollisionModel::new(
            &grid,
            config.cell_size,
            config.wall_height(),
            config.agent_half_extent,
        );
        let player = Player::new(cell_center(config.cell_size, config.start), &config);
        let beast = Beast::spawn(
            cell_center(config.cell_size, config.beast_spawn),
            &collision,
            &config,
        );
        info!(
            "session ready: player at ({}, {}), beast at ({}, {}), {} wall volumes",
            config.start.x,
            config.start.z,
            config.beast_spawn.x,
            config.beast_spawn.z,
            collision.walls().len()
        );

        Self {
            config,
            rng,
            grid,
            collision,
            player,
            beast,
            caught: false,
            last_report: None,
            ticks: 0,
            elapsed: 0.0,
        }
    }

    /// Starts a fresh session with a new maze drawn from the same random stream.
    pub fn restart(&mut self) {
        let config = self.config.clone();
        let rng = self.rng.clone();
        *self = Self::build(config, rng);
    }

    pub fn tick(&mut self, input: TickInput, audio: &mut dyn AudioSink) -> TickOutcome {
        if self.caught {
            return TickOutcome::Over;
        }
        let dt = input.dt.max(0.0);
        self.ticks += 1;
        self.elapsed += dt;

        self.player
            .advance(&self.collision, input.intent, input.facing, dt, &self.config);

        let world = PursuitWorld {
            grid: &self.grid,
            collision: &self.collision,
            config: &self.config,
        };
        let report = self.beast.update(&world, self.player.position(), dt);
        audio.set_gain(report.gain);
        self.last_report = Some(report);

        if report.captured {
            self.caught = true;
            info!(
                "player caught after {:.1}s ({} ticks)",
                self.elapsed, self.ticks
            );
            return TickOutcome::Captured;
        }
        TickOutcome::Running
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn collision(&self) -> &CollisionModel {
        &self.collision
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn beast(&self) -> &Beast {
        &self.beast
    }

    pub fn is_over(&self) -> bool {
        self.caught
    }

    pub fn last_report(&self) -> Option<&PursuitReport> {
        self.last_report.as_ref()
    }

    /// Simulated seconds this session.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}
