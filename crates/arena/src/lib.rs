//! Blob arena simulation core.

pub mod actions;
pub mod ai;
pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod motion;
pub mod schedule;
pub mod session;
pub mod spawner;
pub mod world;

// Re-export commonly used types
pub use collision::{Absorption, AbsorptionKind, CollisionReport};
pub use config::Config;
pub use error::ConfigError;
pub use schedule::{ScheduledEvent, Scheduler};
pub use session::{Phase, Session, TickSummary};
pub use world::World;
