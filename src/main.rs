use anyhow::Context;
use beast_maze::config::{DEFAULT_GRID_H, DEFAULT_GRID_W};
use beast_maze::maze::Dir;
use beast_maze::{AudioSink, ChaseMode, Game, GameConfig, Grid, Intent, Pos, TickInput, TickOutcome, Vec2};
use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use log::info;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};
use std::fs::File;
use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

const CELL_W: usize = 2;
const DEFAULT_FPS: u64 = 60;
/// Terminals only report presses and repeats, so a key counts as held this long after
/// its last event.
const INPUT_HOLD_MS: u64 = 300;
const TURN_STEP: f32 = PI / 12.0;
const GROWL_BAR: usize = 10;

#[derive(Parser, Debug)]
#[command(author, version, about = "Outrun the beast through a freshly carved maze", long_about = None)]
struct Args {
    /// Seed for the maze; random when omitted
    #[arg(long, env = "BEAST_MAZE_SEED")]
    seed: Option<u64>,

    /// Maze width in cells
    #[arg(short = 'W', long, default_value_t = DEFAULT_GRID_W)]
    width: usize,

    /// Maze height in cells
    #[arg(short = 'H', long, default_value_t = DEFAULT_GRID_H)]
    height: usize,

    /// Frames per second
    #[arg(long, env = "BEAST_MAZE_FPS", default_value_t = DEFAULT_FPS)]
    fps: u64,

    /// Write logs here (RUST_LOG filters, default info)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player(usize),
    Beast,
    Wall,
    Empty,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![
                Cell {
                    glyph: Glyph::Empty,
                    color: Color::Reset,
                };
                width * height
            ],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

/// Stands in for the camera: only its yaw matters to the core.
struct Camera {
    yaw: f32,
}

impl Camera {
    /// Faces the first open neighbor of the start cell.
    fn facing_open(grid: &Grid, start: Pos) -> Self {
        let yaw = [
            (Dir::East, FRAC_PI_2),
            (Dir::South, PI),
            (Dir::West, -FRAC_PI_2),
            (Dir::North, 0.0),
        ]
        .into_iter()
        .find(|(dir, _)| grid.neighbor(start, *dir).is_some_and(|n| grid.is_passage(n)))
        .map_or(PI, |(_, yaw)| yaw);
        Self { yaw }
    }

    fn turn(&mut self, by: f32) {
        self.yaw = (self.yaw + by).rem_euclid(TAU);
    }

    fn facing(&self) -> Vec2 {
        Vec2::from_yaw(self.yaw)
    }

    /// One of eight compass arrows, 0 = up.
    fn octant(&self) -> usize {
        ((self.yaw.rem_euclid(TAU) / FRAC_PI_4).round() as usize) % 8
    }
}

#[derive(Default)]
struct HeldKeys {
    last_seen: [Option<Instant>; 4],
}

impl HeldKeys {
    const FORWARD: usize = 0;
    const BACKWARD: usize = 1;
    const LEFT: usize = 2;
    const RIGHT: usize = 3;

    fn press(&mut self, idx: usize, at: Instant) {
        self.last_seen[idx] = Some(at);
    }

    fn intent(&self, now: Instant) -> Intent {
        let held = |idx: usize| {
            self.last_seen[idx].is_some_and(|t| {
                now.duration_since(t) <= Duration::from_millis(INPUT_HOLD_MS)
            })
        };
        Intent {
            forward: held(Self::FORWARD),
            backward: held(Self::BACKWARD),
            left: held(Self::LEFT),
            right: held(Self::RIGHT),
        }
    }

    fn clear(&mut self) {
        self.last_seen = [None; 4];
    }
}

/// The beast's sound, shown as a meter.
#[derive(Default)]
struct Growl {
    gain: f32,
}

impl AudioSink for Growl {
    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let mut config = GameConfig::with_size(args.width, args.height);
    config.seed = args.seed;
    let game = Game::new(config).context("invalid game configuration")?;
    info!("starting with {args:?}");

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, game, args.fps);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

/// Logging goes to a file only; stderr would scribble over the alternate screen.
fn init_logging(path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, mut game: Game, fps: u64) -> anyhow::Result<()> {
    let (width, height) = (game.grid().width(), game.grid().height());
    let mut renderer = Renderer::new(width, height);
    let mut camera = Camera::facing_open(game.grid(), game.config().start);
    let mut keys = HeldKeys::default();
    let mut growl = Growl::default();
    let frame_time = Duration::from_micros(1_000_000 / fps.max(1));
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) => match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        KeyCode::Char('r') if game.is_over() => {
                            game.restart();
                            camera = Camera::facing_open(game.grid(), game.config().start);
                            keys.clear();
                            growl = Growl::default();
                            renderer.needs_full = true;
                            stdout.queue(Clear(ClearType::All))?;
                        }
                        KeyCode::Char('w') | KeyCode::Up => keys.press(HeldKeys::FORWARD, frame_start),
                        KeyCode::Char('s') | KeyCode::Down => {
                            keys.press(HeldKeys::BACKWARD, frame_start)
                        }
                        KeyCode::Char('a') => keys.press(HeldKeys::LEFT, frame_start),
                        KeyCode::Char('d') => keys.press(HeldKeys::RIGHT, frame_start),
                        KeyCode::Left | KeyCode::Char('j') => camera.turn(-TURN_STEP),
                        KeyCode::Right | KeyCode::Char('l') => camera.turn(TURN_STEP),
                        _ => {}
                    },
                    _ => {}
                },
                Event::Resize(..) => {
                    renderer.needs_full = true;
                    stdout.queue(Clear(ClearType::All))?;
                }
                _ => {}
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        if !game.is_over() {
            let input = TickInput {
                intent: keys.intent(now),
                facing: camera.facing(),
                dt,
            };
            if game.tick(input, &mut growl) == TickOutcome::Captured {
                renderer.needs_full = true;
            }
        }

        let drawn = render(stdout, &game, &camera, &growl, &mut renderer)?;
        if drawn && game.is_over() {
            render_caught(stdout, &game, &renderer)?;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

/// Returns `false` when the terminal is too small and only the size warning was drawn.
fn render(
    stdout: &mut Stdout,
    game: &Game,
    camera: &Camera,
    growl: &Growl,
    renderer: &mut Renderer,
) -> io::Result<bool> {
    let grid = game.grid();
    let needed_h = (grid.height() + 3) as u16;
    let needed_w = (grid.width() * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(false);
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }

    let hud = hud_line(game, growl);
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    let cs = game.config().cell_size;
    let player_cell = game.collision().cell_at(grid, game.player().position());
    let beast_cell = game.collision().cell_at(grid, game.beast().position());
    for z in 0..grid.height() {
        for x in 0..grid.width() {
            let pos = Pos::new(x, z);
            let cell = cell_for(game, camera, pos, player_cell, beast_cell);
            let idx = z * grid.width() + x;
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(stdout, renderer, x, z, cell)?;
            }
        }
    }
    renderer.needs_full = false;

    stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y + grid.height() as u16))?;
    stdout.queue(Clear(ClearType::CurrentLine))?;
    stdout.queue(Print(format!(
        "x {:>6.1}  z {:>6.1}  eye {:>5.2}   (WASD move, \u{2190}/\u{2192} turn, q quit)",
        game.player().position().x / cs,
        game.player().position().z / cs,
        game.player().height(),
    )))?;

    stdout.flush()?;
    Ok(true)
}

fn hud_line(game: &Game, growl: &Growl) -> String {
    let filled = ((growl.gain * GROWL_BAR as f32).round() as usize).min(GROWL_BAR);
    let meter = format!("{}{}", "#".repeat(filled), ".".repeat(GROWL_BAR - filled));
    let (mode, distance) = match game.last_report() {
        Some(report) => (
            match report.mode {
                ChaseMode::ViaPath => "tracking",
                ChaseMode::Direct => "charging",
            },
            report.distance,
        ),
        None => ("waking", game.beast().position().distance(game.player().position())),
    };
    format!(
        "Beast: {:<8}  Distance: {:>6.1}  Growl: [{}]  Time: {:>5.1}s",
        mode,
        distance,
        meter,
        game.elapsed()
    )
}

fn cell_for(
    game: &Game,
    camera: &Camera,
    pos: Pos,
    player_cell: Option<Pos>,
    beast_cell: Option<Pos>,
) -> Cell {
    if beast_cell == Some(pos) {
        let color = if game.beast().collisions_enabled() {
            Color::Red
        } else {
            Color::Magenta
        };
        return Cell {
            glyph: Glyph::Beast,
            color,
        };
    }
    if player_cell == Some(pos) {
        return Cell {
            glyph: Glyph::Player(camera.octant()),
            color: Color::Yellow,
        };
    }
    if game.grid().is_wall(pos) {
        Cell {
            glyph: Glyph::Wall,
            color: Color::DarkGrey,
        }
    } else {
        Cell {
            glyph: Glyph::Empty,
            color: Color::Reset,
        }
    }
}

fn draw_cell(stdout: &mut Stdout, renderer: &Renderer, x: usize, z: usize, cell: Cell) -> io::Result<()> {
    const ARROWS: [&str; 8] = [
        "\u{2191}", "\u{2197}", "\u{2192}", "\u{2198}", "\u{2193}", "\u{2199}", "\u{2190}", "\u{2196}",
    ];
    let text = match cell.glyph {
        Glyph::Player(octant) => ARROWS[octant % 8],
        Glyph::Beast => "\u{1f479}",
        Glyph::Wall => "\u{2588}\u{2588}",
        Glyph::Empty => "  ",
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let z_pos = renderer.origin_y + z as u16;
    stdout.queue(MoveTo(x_pos, z_pos))?;
    stdout.queue(SetForegroundColor(cell.color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

fn render_caught(stdout: &mut Stdout, game: &Game, renderer: &Renderer) -> io::Result<()> {
    stdout.queue(MoveTo(
        renderer.origin_x,
        renderer.origin_y + game.grid().height() as u16 + 1,
    ))?;
    stdout.queue(SetForegroundColor(Color::Red))?;
    stdout.queue(Print(format!(
        "The beast caught you after {:.1}s! (r to restart, q to quit)",
        game.elapsed()
    )))?;
    stdout.queue(ResetColor)?;
    stdout.flush()
}
