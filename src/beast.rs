use crate::collision::{slide_move, CollisionModel};
use crate::config::GameConfig;
use crate::geom::Vec2;
use crate::maze::Grid;
use crate::pathfinding::find_path;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaseMode {
    /// Heading for the next cell of a BFS route to the player.
    ViaPath,
    /// No usable route; heading straight for the player.
    Direct,
}

/// Read-only world the beast moves through.
#[derive(Clone, Copy)]
pub struct PursuitWorld<'a> {
    pub grid: &'a Grid,
    pub collision: &'a CollisionModel,
    pub config: &'a GameConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PursuitReport {
    pub mode: ChaseMode,
    /// Horizontal distance to the player after this tick's move.
    pub distance: f32,
    /// Gain for the beast's sound, 0.0 to 1.0.
    pub gain: f32,
    pub captured: bool,
    /// Cell count of this tick's route, when there was one.
    pub path_len: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Beast {
    position: Vec2,
    collisions_enabled: bool,
    mode: ChaseMode,
}

impl Beast {
    /// A beast spawned overlapping a wall ignores walls until it first stands clear.
    pub fn spawn(position: Vec2, collision: &CollisionModel, config: &GameConfig) -> Self {
        let collisions_enabled =
            !collision.blocked_by_walls(position.x, position.z, config.agent_height);
        if !collisions_enabled {
            debug!(
                "beast spawned inside a wall at ({:.1}, {:.1}), walls ignored until clear",
                position.x, position.z
            );
        }
        Self {
            position,
            collisions_enabled,
            mode: ChaseMode::Direct,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn collisions_enabled(&self) -> bool {
        self.collisions_enabled
    }

    pub fn mode(&self) -> ChaseMode {
        self.mode
    }

    pub fn update(&mut self, world: &PursuitWorld<'_>, player: Vec2, dt: f32) -> PursuitReport {
        let config = world.config;
        let dt = dt.max(0.0);

        if !self.collisions_enabled
            && !world
                .collision
                .blocked_by_walls(self.position.x, self.position.z, config.agent_height)
        {
            self.collisions_enabled = true;
            debug!(
                "beast clear of walls at ({:.1}, {:.1}), collisions enabled",
                self.position.x, self.position.z
            );
        }

        let route = match (
            world.collision.cell_at(world.grid, self.position),
            world.collision.cell_at(world.grid, player),
        ) {
            (Some(from), Some(to)) => find_path(world.grid, from, to),
            _ => None,
        };
        let path_len = route.as_ref().map(Vec::len);

        let mode = match route.as_deref() {
            Some([_, next, ..]) => {
                let target = world.collision.cell_center(*next);
                if self.position.distance(target) >= config.waypoint_epsilon {
                    self.step_toward(world, target, dt);
                }
                ChaseMode::ViaPath
            }
            _ => {
                self.step_toward(world, player, dt);
                ChaseMode::Direct
            }
        };
        if mode != self.mode {
            debug!("beast chase mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }

        let distance = self.position.distance(player);
        PursuitReport {
            mode,
            distance,
            gain: audible_gain(distance, config.max_audible_distance),
            captured: is_capture(distance, config.capture_distance),
            path_len,
        }
    }

    /// Moves at beast speed toward `target` without passing it.
    fn step_toward(&mut self, world: &PursuitWorld<'_>, target: Vec2, dt: f32) {
        let offset = target - self.position;
        let Some(dir) = offset.normalized() else {
            return;
        };
        let step = (world.config.beast_speed * dt).min(offset.length());
        self.position = slide_move(
            world.collision,
            self.position,
            dir * step,
            world.config.agent_height,
            self.collisions_enabled,
        );
    }
}

/// Linear falloff from 1 at the beast to 0 at `max_distance` and beyond.
pub fn audible_gain(distance: f32, max_distance: f32) -> f32 {
    if !distance.is_finite() || max_distance <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / max_distance).clamp(0.0, 1.0)
}

/// Strictly closer than `threshold`.
pub fn is_capture(distance: f32, threshold: f32) -> bool {
    distance < threshold
}
