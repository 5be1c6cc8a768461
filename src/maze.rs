use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Passage,
}

/// Integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub z: usize,
}

impl Pos {
    pub fn new(x: usize, z: usize) -> Self {
        Self { x, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    North,
    East,
    South,
    West,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::North, Dir::East, Dir::South, Dir::West];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::North => (0, -1),
            Dir::East => (1, 0),
            Dir::South => (0, 1),
            Dir::West => (-1, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<Tile>>,
}

impl Grid {
    /// A grid where every cell is a wall.
    pub fn filled(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![Tile::Wall; width]; height],
        }
    }

    /// Builds a grid from text rows, one row per z: `#` is a wall, anything else a passage.
    /// Short rows are padded with walls.
    pub fn from_rows(rows: &[&str]) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = Self::filled(width, rows.len());
        for (z, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch != '#' {
                    grid.cells[z][x] = Tile::Passage;
                }
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Range-checked lookup with signed coordinates.
    pub fn get(&self, x: isize, z: isize) -> Option<Tile> {
        if x < 0 || z < 0 {
            return None;
        }
        self.tile(Pos::new(x as usize, z as usize))
    }

    pub fn tile(&self, pos: Pos) -> Option<Tile> {
        self.cells.get(pos.z).and_then(|row| row.get(pos.x)).copied()
    }

    pub fn is_passage(&self, pos: Pos) -> bool {
        self.tile(pos) == Some(Tile::Passage)
    }

    pub fn is_wall(&self, pos: Pos) -> bool {
        self.tile(pos) == Some(Tile::Wall)
    }

    pub fn is_border(&self, pos: Pos) -> bool {
        pos.x == 0 || pos.z == 0 || pos.x + 1 >= self.width || pos.z + 1 >= self.height
    }

    fn is_interior(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.z < self.height && !self.is_border(pos)
    }

    /// The adjacent cell in `dir`, if it lies on the grid.
    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dz) = dir.delta();
        let nx = pos.x as isize + dx;
        let nz = pos.z as isize + dz;
        self.get(nx, nz)?;
        Some(Pos::new(nx as usize, nz as usize))
    }

    fn set(&mut self, pos: Pos, tile: Tile) {
        if let Some(cell) = self.cells.get_mut(pos.z).and_then(|row| row.get_mut(pos.x)) {
            *cell = tile;
        }
    }

    pub fn wall_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        self.cells.iter().enumerate().flat_map(|(z, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, tile)| **tile == Tile::Wall)
                .map(move |(x, _)| Pos::new(x, z))
        })
    }

    pub fn passage_count(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&tile| tile == Tile::Passage)
            .count()
    }

    /// Flood fill over 4-connected passages. Indexed `[z][x]`.
    pub fn reachable_from(&self, start: Pos) -> Vec<Vec<bool>> {
        let mut seen = vec![vec![false; self.width]; self.height];
        if !self.is_passage(start) {
            return seen;
        }
        let mut q = VecDeque::new();
        seen[start.z][start.x] = true;
        q.push_back(start);
        while let Some(pos) = q.pop_front() {
            for dir in Dir::ALL {
                let Some(next) = self.neighbor(pos, dir) else {
                    continue;
                };
                if seen[next.z][next.x] || !self.is_passage(next) {
                    continue;
                }
                seen[next.z][next.x] = true;
                q.push_back(next);
            }
        }
        seen
    }

    fn first_unreachable(&self, reachable: &[Vec<bool>]) -> Option<Pos> {
        for z in 0..self.height {
            for x in 0..self.width {
                if self.cells[z][x] == Tile::Passage && !reachable[z][x] {
                    return Some(Pos::new(x, z));
                }
            }
        }
        None
    }

    /// Forces an interior cell open and bridges it back to `start`.
    /// Returns the number of cells carved.
    pub fn open_spawn(&mut self, spawn: Pos, start: Pos) -> usize {
        if !self.is_interior(spawn) {
            warn!("spawn ({}, {}) is not an interior cell, leaving grid untouched", spawn.x, spawn.z);
            return 0;
        }
        let mut carved = 0;
        if self.is_wall(spawn) {
            self.set(spawn, Tile::Passage);
            carved += 1;
        }
        carved + self.ensure_connected(start)
    }

    /// Tunnels every passage region not reachable from `start` into the start region,
    /// carving the shortest run of interior walls. Returns the number of cells carved.
    pub fn ensure_connected(&mut self, start: Pos) -> usize {
        if !self.is_passage(start) {
            return 0;
        }
        let mut reachable = self.reachable_from(start);
        let mut carved = 0;
        let mut iterations = 0;
        while let Some(isolated) = self.first_unreachable(&reachable) {
            if iterations >= self.width * self.height {
                break;
            }
            iterations += 1;
            let tunnel = self.tunnel_to_reachable(isolated, &reachable);
            if tunnel.is_empty() {
                warn!("passage ({}, {}) cannot be bridged to the start", isolated.x, isolated.z);
                break;
            }
            for pos in tunnel {
                if self.is_wall(pos) {
                    self.set(pos, Tile::Passage);
                    carved += 1;
                }
            }
            reachable = self.reachable_from(start);
        }
        if carved > 0 {
            debug!("bridged isolated passages by carving {carved} cells");
        }
        carved
    }

    /// Shortest route through interior cells from `from` to the first reachable cell.
    fn tunnel_to_reachable(&self, from: Pos, reachable: &[Vec<bool>]) -> Vec<Pos> {
        let mut prev: Vec<Vec<Option<Pos>>> = vec![vec![None; self.width]; self.height];
        let mut q = VecDeque::new();
        prev[from.z][from.x] = Some(from);
        q.push_back(from);
        while let Some(pos) = q.pop_front() {
            if reachable[pos.z][pos.x] {
                let mut route = vec![pos];
                let mut cur = pos;
                while cur != from {
                    match prev[cur.z][cur.x] {
                        Some(p) => cur = p,
                        None => break,
                    }
                    route.push(cur);
                }
                return route;
            }
            for dir in Dir::ALL {
                let Some(next) = self.neighbor(pos, dir) else {
                    continue;
                };
                if !self.is_interior(next) || prev[next.z][next.x].is_some() {
                    continue;
                }
                prev[next.z][next.x] = Some(pos);
                q.push_back(next);
            }
        }
        Vec::new()
    }
}

struct Frame {
    pos: Pos,
    dirs: [Dir; 4],
    next: usize,
}

impl Frame {
    fn new<R: Rng + ?Sized>(pos: Pos, rng: &mut R) -> Self {
        let mut dirs = Dir::ALL;
        dirs.shuffle(rng);
        Self { pos, dirs, next: 0 }
    }
}

/// Randomized depth-first carving in steps of two from (1, 1).
///
/// Odd coordinates are rooms, even coordinates separate them; the outer ring is never
/// carved. An explicit stack of frames replaces recursion.
pub fn generate<R: Rng + ?Sized>(width: usize, height: usize, rng: &mut R) -> Grid {
    let mut grid = Grid::filled(width, height);
    if width < 3 || height < 3 {
        warn!("{width}x{height} grid has no interior to carve");
        return grid;
    }

    let start = Pos::new(1, 1);
    grid.set(start, Tile::Passage);
    let mut stack = vec![Frame::new(start, rng)];

    while let Some(frame) = stack.last_mut() {
        if frame.next >= frame.dirs.len() {
            stack.pop();
            continue;
        }
        let dir = frame.dirs[frame.next];
        frame.next += 1;
        let pos = frame.pos;

        let (dx, dz) = dir.delta();
        let nx = pos.x as isize + dx * 2;
        let nz = pos.z as isize + dz * 2;
        if nx <= 0 || nz <= 0 || nx >= width as isize - 1 || nz >= height as isize - 1 {
            continue;
        }
        let next = Pos::new(nx as usize, nz as usize);
        if !grid.is_wall(next) {
            continue;
        }
        let between = Pos::new((pos.x + next.x) / 2, (pos.z + next.z) / 2);
        grid.set(between, Tile::Passage);
        grid.set(next, Tile::Passage);
        stack.push(Frame::new(next, rng));
    }

    info!(
        "generated {width}x{height} maze with {} passage cells",
        grid.passage_count()
    );
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn all_reachable(grid: &Grid, start: Pos) -> bool {
        let reachable = grid.reachable_from(start);
        grid.first_unreachable(&reachable).is_none()
    }

    #[test]
    fn start_is_open_and_border_is_closed() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let grid = generate(20, 20, &mut rng);
        assert!(grid.is_passage(Pos::new(1, 1)));
        for x in 0..20 {
            assert!(grid.is_wall(Pos::new(x, 0)));
            assert!(grid.is_wall(Pos::new(x, 19)));
        }
        for z in 0..20 {
            assert!(grid.is_wall(Pos::new(0, z)));
            assert!(grid.is_wall(Pos::new(19, z)));
        }
    }

    #[test]
    fn every_room_is_carved_and_connected() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let grid = generate(21, 15, &mut rng);
        for z in (1..14).step_by(2) {
            for x in (1..20).step_by(2) {
                assert!(grid.is_passage(Pos::new(x, z)), "room ({x}, {z}) left solid");
            }
        }
        assert!(all_reachable(&grid, Pos::new(1, 1)));
        // A perfect maze over r rooms carves r - 1 connecting cells.
        let rooms = 10 * 7;
        assert_eq!(grid.passage_count(), rooms * 2 - 1);
    }

    #[test]
    fn same_seed_same_maze() {
        let a = generate(20, 20, &mut ChaCha8Rng::seed_from_u64(42));
        let b = generate(20, 20, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn tiny_grid_stays_solid() {
        let grid = generate(2, 2, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(grid.passage_count(), 0);
    }

    #[test]
    fn get_is_range_checked() {
        let grid = Grid::from_rows(&["###", "#.#", "###"]);
        assert_eq!(grid.get(-1, 0), None);
        assert_eq!(grid.get(3, 1), None);
        assert_eq!(grid.get(1, 1), Some(Tile::Passage));
        assert_eq!(grid.get(0, 1), Some(Tile::Wall));
    }

    #[test]
    fn open_spawn_bridges_sealed_corner() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut grid = generate(20, 20, &mut rng);
        let spawn = Pos::new(18, 18);
        assert!(grid.is_wall(spawn));

        let carved = grid.open_spawn(spawn, Pos::new(1, 1));
        assert!(carved >= 2);
        assert!(grid.is_passage(spawn));
        assert!(all_reachable(&grid, Pos::new(1, 1)));
        assert!(grid.is_wall(Pos::new(19, 18)));
        assert!(grid.is_wall(Pos::new(18, 19)));
    }

    #[test]
    fn open_spawn_ignores_border() {
        let mut grid = Grid::from_rows(&["#####", "#...#", "#####"]);
        assert_eq!(grid.open_spawn(Pos::new(4, 1), Pos::new(1, 1)), 0);
        assert!(grid.is_wall(Pos::new(4, 1)));
    }

    #[test]
    fn ensure_connected_tunnels_through_thick_walls() {
        let mut grid = Grid::from_rows(&[
            "#######",
            "#.#####",
            "#######",
            "#######",
            "#####.#",
            "#######",
        ]);
        let carved = grid.ensure_connected(Pos::new(1, 1));
        assert_eq!(carved, 6);
        assert!(all_reachable(&grid, Pos::new(1, 1)));
    }

    #[test]
    fn wall_cells_match_tiles() {
        let grid = Grid::from_rows(&["###", "#.#", "###"]);
        let walls: Vec<Pos> = grid.wall_cells().collect();
        assert_eq!(walls.len(), 8);
        assert!(!walls.contains(&Pos::new(1, 1)));
    }
}
