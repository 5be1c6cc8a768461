use beast_maze::maze::{generate, Grid};
use beast_maze::Pos;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn all_passages_reachable(grid: &Grid, start: Pos) -> bool {
    let reachable = grid.reachable_from(start);
    (0..grid.height()).all(|z| {
        (0..grid.width()).all(|x| !grid.is_passage(Pos::new(x, z)) || reachable[z][x])
    })
}

fn border_is_solid(grid: &Grid) -> bool {
    (0..grid.height()).all(|z| {
        (0..grid.width()).all(|x| {
            let pos = Pos::new(x, z);
            !grid.is_border(pos) || grid.is_wall(pos)
        })
    })
}

proptest! {
    #[test]
    fn generated_mazes_are_connected(seed in any::<u64>(), w in 5usize..40, h in 5usize..40) {
        let grid = generate(w, h, &mut ChaCha8Rng::seed_from_u64(seed));
        prop_assert!(grid.is_passage(Pos::new(1, 1)));
        prop_assert!(border_is_solid(&grid));
        prop_assert!(all_passages_reachable(&grid, Pos::new(1, 1)));
    }

    #[test]
    fn opened_spawn_stays_connected(seed in any::<u64>(), w in 5usize..40, h in 5usize..40) {
        let mut grid = generate(w, h, &mut ChaCha8Rng::seed_from_u64(seed));
        let spawn = Pos::new(w - 2, h - 2);
        grid.open_spawn(spawn, Pos::new(1, 1));
        prop_assert!(grid.is_passage(spawn));
        prop_assert!(border_is_solid(&grid));
        prop_assert!(all_passages_reachable(&grid, Pos::new(1, 1)));
    }
}
