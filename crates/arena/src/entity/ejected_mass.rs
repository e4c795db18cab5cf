//! Ejected mass pellet.

use super::cell::{Cell, CellData, CellType};
use contract::Color;
use glam::Vec2;

/// Mass thrown out by a player piece (W key) or an enemy.
#[derive(Debug, Clone)]
pub struct EjectedMass {
    data: CellData,
    /// Node that ejected this pellet; it can never absorb it back.
    pub origin: Option<u32>,
}

impl EjectedMass {
    /// Create new ejected mass.
    pub fn new(node_id: u32, origin: u32, position: Vec2, mass: f32, now_ms: u64) -> Self {
        Self {
            data: CellData::new(node_id, CellType::EjectedMass, position, mass, now_ms),
            origin: Some(origin),
        }
    }

    /// Set the color (inherits from the ejecting cell).
    pub fn set_color(&mut self, color: Color) {
        self.data.color = color;
    }

    /// Whether `node_id` is allowed to absorb this pellet.
    #[inline]
    pub fn absorbable_by(&self, node_id: u32) -> bool {
        self.origin != Some(node_id)
    }
}

impl Cell for EjectedMass {
    fn data(&self) -> &CellData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut CellData {
        &mut self.data
    }
}
