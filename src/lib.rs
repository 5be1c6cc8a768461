//! Core of a first-person maze chase: maze carving, wall collision, BFS routing and the
//! beast's pursuit loop. Rendering, sound and input live with the caller; see `main.rs`
//! for a terminal front-end.

pub mod beast;
pub mod collision;
pub mod config;
pub mod game;
pub mod geom;
pub mod maze;
pub mod pathfinding;
pub mod player;

pub use beast::{Beast, ChaseMode, PursuitReport};
pub use collision::CollisionModel;
pub use config::{ConfigError, GameConfig};
pub use game::{AudioSink, Game, TickInput, TickOutcome};
pub use geom::Vec2;
pub use maze::{Grid, Pos, Tile};
pub use pathfinding::find_path;
pub use player::{Intent, Player};
