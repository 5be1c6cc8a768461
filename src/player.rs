use crate::collision::{slide_move, CollisionModel};
use crate::config::GameConfig;
use crate::geom::Vec2;

/// Below this horizontal speed (units / s) the view stops bobbing.
const BOB_SPEED_THRESHOLD: f32 = 0.01;

/// Movement keys held this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl Intent {
    pub fn is_idle(&self) -> bool {
        !(self.forward || self.backward || self.left || self.right)
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    f32::from(u8::from(positive)) - f32::from(u8::from(negative))
}

/// Horizontal movement direction for `intent` relative to `facing`, at most unit length.
pub fn movement_vector(intent: Intent, facing: Vec2) -> Vec2 {
    let Some(forward) = facing.normalized() else {
        return Vec2::ZERO;
    };
    let right = forward.right_of();
    let combined = forward * axis(intent.forward, intent.backward)
        + right * axis(intent.right, intent.left);
    if combined.length() > 1.0 {
        combined.normalized().unwrap_or(Vec2::ZERO)
    } else {
        combined
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    position: Vec2,
    height: f32,
    bob_phase: f32,
}

impl Player {
    pub fn new(position: Vec2, config: &GameConfig) -> Self {
        Self {
            position,
            height: config.eye_height,
            bob_phase: 0.0,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Eye height, including view bob.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Moves by `intent` for `dt` seconds, sliding along walls. Returns the distance moved.
    pub fn advance(
        &mut self,
        collision: &CollisionModel,
        intent: Intent,
        facing: Vec2,
        dt: f32,
        config: &GameConfig,
    ) -> f32 {
        let dt = dt.max(0.0);
        let delta = movement_vector(intent, facing) * (config.player_speed * dt);
        let before = self.position;
        self.position = slide_move(collision, before, delta, config.agent_height, true);
        let moved = before.distance(self.position);

        if dt > 0.0 && moved / dt > BOB_SPEED_THRESHOLD {
            self.bob_phase = (self.bob_phase + config.bob_speed * dt) % std::f32::consts::TAU;
            self.height = config.eye_height + self.bob_phase.sin() * config.bob_amount;
        } else {
            self.height = config.eye_height;
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::cell_center;
    use crate::maze::{Grid, Pos};

    const EAST: Vec2 = Vec2 { x: 1.0, z: 0.0 };

    fn fixture() -> (CollisionModel, GameConfig) {
        let grid = Grid::from_rows(&["#####", "#...#", "#...#", "#...#", "#####"]);
        let config = GameConfig::with_size(5, 5);
        let collision = CollisionModel::new(
            &grid,
            config.cell_size,
            config.wall_height(),
            config.agent_half_extent,
        );
        (collision, config)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn diagonal_is_not_faster() {
        let intent = Intent {
            forward: true,
            right: true,
            ..Intent::default()
        };
        let v = movement_vector(intent, EAST);
        assert!(close(v.length(), 1.0));
        // Facing east, right is south.
        assert!(v.x > 0.0 && v.z > 0.0);
    }

    #[test]
    fn opposite_keys_cancel() {
        let intent = Intent {
            forward: true,
            backward: true,
            ..Intent::default()
        };
        assert_eq!(movement_vector(intent, EAST), Vec2::ZERO);
        assert_eq!(movement_vector(Intent::default(), EAST), Vec2::ZERO);
    }

    #[test]
    fn zero_facing_means_no_motion() {
        let intent = Intent {
            forward: true,
            ..Intent::default()
        };
        assert_eq!(movement_vector(intent, Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn moves_at_speed_scaled_by_dt() {
        let (collision, config) = fixture();
        let start = cell_center(config.cell_size, Pos::new(2, 2));
        let mut player = Player::new(start, &config);
        let intent = Intent {
            forward: true,
            ..Intent::default()
        };
        let moved = player.advance(&collision, intent, EAST, 0.5, &config);
        assert!(close(moved, config.player_speed * 0.5));
        assert!(close(player.position().x, start.x + 3.0));
        assert!(close(player.position().z, start.z));
    }

    #[test]
    fn same_distance_at_any_frame_rate() {
        let (collision, config) = fixture();
        let start = Vec2::new(25.0, 50.0);
        let forward = Intent {
            forward: true,
            ..Intent::default()
        };

        let mut stepped = Player::new(start, &config);
        let mut total = 0.0;
        for _ in 0..60 {
            total += stepped.advance(&collision, forward, EAST, 1.0 / 60.0, &config);
        }
        let mut single = Player::new(start, &config);
        let once = single.advance(&collision, forward, EAST, 1.0, &config);

        assert!((total - once).abs() < 1e-3);
        assert!((stepped.position().x - single.position().x).abs() < 1e-3);
        assert!(close(once, config.player_speed));
    }

    #[test]
    fn long_frame_does_not_tunnel() {
        let grid = Grid::from_rows(&["#####", "#.#.#", "#####"]);
        let config = GameConfig::with_size(5, 3);
        let collision = CollisionModel::new(
            &grid,
            config.cell_size,
            config.wall_height(),
            config.agent_half_extent,
        );
        let start = cell_center(config.cell_size, Pos::new(1, 1));
        let mut player = Player::new(start, &config);
        let forward = Intent {
            forward: true,
            ..Intent::default()
        };
        player.advance(&collision, forward, EAST, 6.0, &config);
        assert_eq!(
            collision.cell_at(&grid, player.position()),
            Some(Pos::new(1, 1))
        );
        assert!(collision.can_occupy(player.position().x, player.position().z, config.agent_height));
    }

    #[test]
    fn slides_along_wall() {
        let (collision, config) = fixture();
        // Hug the north wall of the room, then push north-east.
        let start = Vec2::new(50.0, 22.0);
        let mut player = Player::new(start, &config);
        let intent = Intent {
            forward: true,
            right: true,
            ..Intent::default()
        };
        let north = Vec2::new(0.0, -1.0);
        player.advance(&collision, intent, north, 1.0, &config);
        assert!(player.position().x > start.x);
        assert_eq!(player.position().z, start.z);
    }

    #[test]
    fn bobs_only_while_moving() {
        let (collision, config) = fixture();
        let mut player = Player::new(Vec2::new(50.0, 50.0), &config);
        let forward = Intent {
            forward: true,
            ..Intent::default()
        };
        player.advance(&collision, forward, EAST, 0.1, &config);
        assert!(player.height() != config.eye_height);
        assert!((player.height() - config.eye_height).abs() <= config.bob_amount);

        player.advance(&collision, Intent::default(), EAST, 0.1, &config);
        assert_eq!(player.height(), config.eye_height);
    }

    #[test]
    fn blocked_push_pins_height() {
        let (collision, config) = fixture();
        // Flush against the west wall, pushing west.
        let mut player = Player::new(Vec2::new(22.0, 50.0), &config);
        let west = Vec2::new(-1.0, 0.0);
        let forward = Intent {
            forward: true,
            ..Intent::default()
        };
        let moved = player.advance(&collision, forward, west, 0.1, &config);
        assert_eq!(moved, 0.0);
        assert_eq!(player.height(), config.eye_height);
    }
}
