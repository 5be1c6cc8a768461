//! Static wall volumes and agent occupancy tests.
//!
//! Every `Wall` cell becomes one axis-aligned box covering its full footprint and the
//! full wall height. Agents are tested as a small box around their (x, z) position;
//! queries scan the wall list linearly, which is fine for the grid sizes in use but is
//! the first thing to replace with a spatial index for much larger mazes.

use crate::geom::Vec2;
use crate::maze::{Dir, Grid, Pos, Tile};

/// Axis-aligned bounding box, `[x, y, z]` corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Box of horizontal half-extent `half` around `center`, spanning `[0, height]`.
    pub fn around(center: Vec2, half: f32, height: f32) -> Self {
        Self::new(
            [center.x - half, 0.0, center.z - half],
            [center.x + half, height, center.z + half],
        )
    }

    /// Overlap on all three axes. Boxes that only share a face do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.min[i] < other.max[i] && self.max[i] > other.min[i])
    }

    fn contains_xz(&self, other: &Aabb) -> bool {
        [0, 2]
            .iter()
            .all(|&i| other.min[i] >= self.min[i] && other.max[i] <= self.max[i])
    }
}

#[derive(Debug, Clone)]
pub struct CollisionModel {
    walls: Vec<Aabb>,
    bounds: Aabb,
    cell_size: f32,
    half_extent: f32,
}

impl CollisionModel {
    pub fn new(grid: &Grid, cell_size: f32, wall_height: f32, half_extent: f32) -> Self {
        let walls = grid
            .wall_cells()
            .map(|pos| {
                let x0 = pos.x as f32 * cell_size;
                let z0 = pos.z as f32 * cell_size;
                Aabb::new([x0, 0.0, z0], [x0 + cell_size, wall_height, z0 + cell_size])
            })
            .collect();
        let bounds = Aabb::new(
            [0.0, 0.0, 0.0],
            [
                grid.width() as f32 * cell_size,
                wall_height,
                grid.height() as f32 * cell_size,
            ],
        );
        Self {
            walls,
            bounds,
            cell_size,
            half_extent,
        }
    }

    pub fn walls(&self) -> &[Aabb] {
        &self.walls
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    fn world_diagonal(&self) -> f32 {
        let w = self.bounds.max[0] - self.bounds.min[0];
        let d = self.bounds.max[2] - self.bounds.min[2];
        (w * w + d * d).sqrt()
    }

    /// Whether an agent standing at (x, z) with vertical extent `[0, height]` is clear of
    /// the world edge and of every wall.
    pub fn can_occupy(&self, x: f32, z: f32, height: f32) -> bool {
        if !x.is_finite() || !z.is_finite() {
            return false;
        }
        let probe = Aabb::around(Vec2::new(x, z), self.half_extent, height);
        if !self.bounds.contains_xz(&probe) {
            return false;
        }
        !self.hits_wall(&probe)
    }

    /// Wall-only overlap test, ignoring the world edge.
    pub fn blocked_by_walls(&self, x: f32, z: f32, height: f32) -> bool {
        if !x.is_finite() || !z.is_finite() {
            return true;
        }
        self.hits_wall(&Aabb::around(Vec2::new(x, z), self.half_extent, height))
    }

    fn hits_wall(&self, probe: &Aabb) -> bool {
        self.walls.iter().any(|wall| wall.intersects(probe))
    }

    /// Grid cell containing a world position, if any.
    pub fn cell_at(&self, grid: &Grid, point: Vec2) -> Option<Pos> {
        world_to_cell(grid, self.cell_size, point)
    }

    pub fn cell_center(&self, pos: Pos) -> Vec2 {
        cell_center(self.cell_size, pos)
    }
}

pub fn world_to_cell(grid: &Grid, cell_size: f32, point: Vec2) -> Option<Pos> {
    if !point.x.is_finite() || !point.z.is_finite() {
        return None;
    }
    let x = (point.x / cell_size).floor();
    let z = (point.z / cell_size).floor();
    if x < 0.0 || z < 0.0 || x >= grid.width() as f32 || z >= grid.height() as f32 {
        return None;
    }
    Some(Pos::new(x as usize, z as usize))
}

pub fn cell_center(cell_size: f32, pos: Pos) -> Vec2 {
    Vec2::new(
        (pos.x as f32 + 0.5) * cell_size,
        (pos.z as f32 + 0.5) * cell_size,
    )
}

/// Applies the x component then the z component of `delta`, each checked on its own
/// when `gated`, so a blocked axis does not stop motion along the other.
///
/// Gated moves longer than the probe half-extent are split into sub-steps no longer
/// than it, so a long frame cannot carry the probe across a wall. Moves are clamped to
/// the world diagonal first.
pub fn slide_move(
    model: &CollisionModel,
    from: Vec2,
    delta: Vec2,
    height: f32,
    gated: bool,
) -> Vec2 {
    if !gated {
        return from + delta;
    }
    let len = delta.length();
    if !len.is_finite() {
        return from;
    }

    let reach = model.world_diagonal();
    let delta = if len > reach { delta * (reach / len) } else { delta };
    let max_step = if model.half_extent > 0.0 {
        model.half_extent
    } else {
        model.cell_size * 0.5
    };
    let steps = if max_step > 0.0 {
        (len.min(reach) / max_step).ceil().max(1.0) as usize
    } else {
        1
    };
    let sub = Vec2::new(delta.x / steps as f32, delta.z / steps as f32);

    let mut pos = from;
    for _ in 0..steps {
        let next_x = pos.x + sub.x;
        if model.can_occupy(next_x, pos.z, height) {
            pos.x = next_x;
        }
        let next_z = pos.z + sub.z;
        if model.can_occupy(pos.x, next_z, height) {
            pos.z = next_z;
        }
    }
    pos
}

/// Legacy margin-based point check, kept for comparison against [`CollisionModel`];
/// movement never goes through it. A wall cell is solid, and a passage cell is solid
/// within `margin` of any edge it shares with a wall. Outside the grid is solid.
pub fn would_collide_at(grid: &Grid, cell_size: f32, margin: f32, x: f32, z: f32) -> bool {
    let Some(cell) = world_to_cell(grid, cell_size, Vec2::new(x, z)) else {
        return true;
    };
    if grid.tile(cell) != Some(Tile::Passage) {
        return true;
    }

    let local_x = x - cell.x as f32 * cell_size;
    let local_z = z - cell.z as f32 * cell_size;
    let near = [
        (Dir::West, local_x < margin),
        (Dir::East, local_x > cell_size - margin),
        (Dir::North, local_z < margin),
        (Dir::South, local_z > cell_size - margin),
    ];
    near.iter().any(|&(dir, close)| {
        close
            && grid
                .neighbor(cell, dir)
                .map_or(true, |n| grid.tile(n) == Some(Tile::Wall))
    })
}
