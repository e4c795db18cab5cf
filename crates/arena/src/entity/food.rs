//! Food particle.

use super::cell::{Cell, CellData, CellType};
use contract::Color;
use glam::Vec2;

/// Nominal mass of a food particle; gives the drawn radius of 5.
pub const FOOD_DRAW_MASS: f32 = 25.0 / 16.0;

/// A static food particle. Eating one grants a flat mass bonus regardless of its own mass.
#[derive(Debug, Clone)]
pub struct Food {
    data: CellData,
}

impl Food {
    /// Create a new food particle.
    pub fn new(node_id: u32, position: Vec2, now_ms: u64) -> Self {
        let mut data = CellData::new(node_id, CellType::Food, position, FOOD_DRAW_MASS, now_ms);
        data.color = Color::GREEN;
        Self { data }
    }
}

impl Cell for Food {
    fn data(&self) -> &CellData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut CellData {
        &mut self.data
    }
}
