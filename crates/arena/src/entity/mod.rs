//! Game entities (cells).
//!
//! This module defines all cell types in the game.

mod cell;
mod ejected_mass;
mod enemy;
mod food;
mod player_piece;

pub use cell::{Cell, CellData, CellType, MIN_MASS, RADIUS_SCALE, mass_speed, mass_to_radius};
pub use ejected_mass::EjectedMass;
pub use enemy::{Enemy, SPECIAL_STROKE};
pub use food::Food;
pub use player_piece::PlayerPiece;
