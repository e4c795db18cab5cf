//! AI-controlled enemy cell.

use super::cell::{Cell, CellData, CellType};
use contract::Color;
use glam::Vec2;

/// Stroke drawn around special enemies.
pub const SPECIAL_STROKE: Color = Color::RED;

/// An enemy cell driven by the decision engine.
#[derive(Debug, Clone)]
pub struct Enemy {
    data: CellData,
    /// Display name drawn from the name pool.
    pub name: String,
    /// Timer-spawned player hunter.
    pub is_special: bool,
}

impl Enemy {
    /// Create a new enemy.
    pub fn new(node_id: u32, name: String, position: Vec2, mass: f32, now_ms: u64) -> Self {
        Self {
            data: CellData::new(node_id, CellType::Enemy, position, mass, now_ms),
            name,
            is_special: false,
        }
    }

    /// Create a special enemy: white fill, red stroke.
    pub fn special(node_id: u32, name: String, position: Vec2, mass: f32, now_ms: u64) -> Self {
        let mut enemy = Self::new(node_id, name, position, mass, now_ms);
        enemy.data.color = Color::WHITE;
        enemy.is_special = true;
        enemy
    }

    /// Set the fill color.
    pub fn set_color(&mut self, color: Color) {
        self.data.color = color;
    }

    pub fn stroke(&self) -> Option<Color> {
        self.is_special.then_some(SPECIAL_STROKE)
    }
}

impl Cell for Enemy {
    fn data(&self) -> &CellData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut CellData {
        &mut self.data
    }
}
