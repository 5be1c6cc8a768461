use beast_maze::maze::generate;
use beast_maze::{
    find_path, AudioSink, ChaseMode, Game, GameConfig, Intent, Pos, TickInput, TickOutcome, Vec2,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const DT: f32 = 1.0 / 60.0;

#[derive(Default)]
struct GainLog {
    gains: Vec<f32>,
}

impl AudioSink for GainLog {
    fn set_gain(&mut self, gain: f32) {
        self.gains.push(gain);
    }
}

#[test]
fn spawn_corner_routes_back_to_start() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut grid = generate(20, 20, &mut rng);
    let start = Pos::new(1, 1);
    let spawn = Pos::new(18, 18);
    grid.open_spawn(spawn, start);

    let path = find_path(&grid, spawn, start).expect("spawn must reach the start");
    assert_eq!(path.first(), Some(&spawn));
    assert_eq!(path.last(), Some(&start));
    assert!(path.iter().all(|p| grid.is_passage(*p)));
}

#[test]
fn beast_catches_an_idle_player() {
    let mut game = Game::new(GameConfig::default().with_seed(7)).unwrap();
    let mut audio = GainLog::default();
    let idle = TickInput {
        intent: Intent::default(),
        facing: Vec2::new(1.0, 0.0),
        dt: DT,
    };

    let mut outcome = TickOutcome::Running;
    let mut saw_path = false;
    for _ in 0..(60 * 60 * 30) {
        outcome = game.tick(idle, &mut audio);
        if game.last_report().map(|r| r.mode) == Some(ChaseMode::ViaPath) {
            saw_path = true;
        }
        if outcome != TickOutcome::Running {
            break;
        }
        let beast = game.beast().position();
        assert!(game
            .collision()
            .can_occupy(beast.x, beast.z, game.config().agent_height));
    }

    assert_eq!(outcome, TickOutcome::Captured);
    assert!(saw_path);
    let report = game.last_report().unwrap();
    assert!(report.distance < game.config().capture_distance);
    // The beast gets louder as it closes in.
    let first = audio.gains.first().copied().unwrap();
    let last = audio.gains.last().copied().unwrap();
    assert!(last > first);
    assert_eq!(game.tick(idle, &mut audio), TickOutcome::Over);
}

#[test]
fn player_never_enters_walls() {
    let mut game = Game::new(GameConfig::default().with_seed(31)).unwrap();
    let mut yaw: f32 = 0.0;
    for step in 0..2000 {
        if step % 90 == 0 {
            yaw += 1.3;
        }
        let input = TickInput {
            intent: Intent {
                forward: true,
                right: step % 3 == 0,
                ..Intent::default()
            },
            facing: Vec2::from_yaw(yaw),
            dt: DT,
        };
        if game.tick(input, &mut ()) != TickOutcome::Running {
            break;
        }
        let p = game.player().position();
        assert!(game
            .collision()
            .can_occupy(p.x, p.z, game.config().agent_height));
    }
}
