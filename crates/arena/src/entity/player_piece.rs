//! Player piece.

use super::cell::{Cell, CellData, CellType};
use contract::Color;
use glam::Vec2;

/// One fragment of the player's cell.
#[derive(Debug, Clone)]
pub struct PlayerPiece {
    /// Cell data (public for direct access).
    pub cell_data: CellData,
    /// Time (ms) after which this piece may merge back into its sibling.
    /// `None` for pieces that were never split off.
    pub merge_cooldown_deadline: Option<u64>,
    /// Heading of an active split impulse; input steering leaves the piece alone while set.
    pub boost_heading: Option<Vec2>,
}

impl PlayerPiece {
    /// Create a new player piece.
    pub fn new(node_id: u32, position: Vec2, mass: f32, now_ms: u64) -> Self {
        let mut data = CellData::new(node_id, CellType::Player, position, mass, now_ms);
        data.color = Color::RED;
        Self {
            cell_data: data,
            merge_cooldown_deadline: None,
            boost_heading: None,
        }
    }

    /// Whether the merge cooldown has elapsed at `now_ms`.
    pub fn can_merge(&self, now_ms: u64) -> bool {
        self.merge_cooldown_deadline
            .is_some_and(|deadline| now_ms >= deadline)
    }

    #[inline]
    pub fn is_boosting(&self) -> bool {
        self.boost_heading.is_some()
    }
}

impl Cell for PlayerPiece {
    fn data(&self) -> &CellData {
        &self.cell_data
    }

    fn data_mut(&mut self) -> &mut CellData {
        &mut self.cell_data
    }
}
