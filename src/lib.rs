pub mod behavior;
pub mod camera;
pub mod config;
pub mod constants;
pub mod driver;
pub mod engine;
pub mod entity;
pub mod grid;
pub mod input;
pub mod maze;
pub mod pathfinding;
pub mod registry;
pub mod render;
pub mod rng;
pub mod session;
pub mod systems;
pub mod types;

pub use config::{ConfigError, WorldConfig};
pub use driver::{DriverOutcome, GameDriver, StopHandle};
pub use engine::{Projectile, World};
pub use session::{GameSession, SessionStats};
