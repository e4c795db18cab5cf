//! World state management.
//!
//! Owns every live cell of a round plus the clock and RNG. Subsystems borrow the
//! world mutably for the duration of their step; nothing lives in globals.

use crate::config::Config;
use crate::entity::{Cell, CellData, CellType, EjectedMass, Enemy, Food, PlayerPiece};
use crate::spawner::NamePool;
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// The game world containing all cells.
#[derive(Debug)]
pub struct World {
    /// Next node ID to assign.
    next_node_id: u32,

    /// All cells by ID.
    pub(crate) cells: HashMap<u32, CellEntry>,

    /// Player pieces in creation order; the first is the primary piece.
    pub player_cells: Vec<u32>,
    /// Enemies in spawn order.
    pub enemy_cells: Vec<u32>,
    /// Food in spawn order.
    pub food_cells: Vec<u32>,
    /// Ejected pellets in spawn order.
    pub eject_cells: Vec<u32>,

    /// World border.
    pub border: WorldBorder,

    /// Simulation clock in milliseconds.
    pub(crate) now_ms: u64,

    pub(crate) rng: SmallRng,
    pub(crate) names: NamePool,
}

/// A cell entry in the world.
#[derive(Debug)]
pub enum CellEntry {
    Player(PlayerPiece),
    Enemy(Enemy),
    Food(Food),
    Eject(EjectedMass),
}

impl CellEntry {
    /// Get the common cell data.
    pub fn data(&self) -> &CellData {
        match self {
            CellEntry::Player(c) => c.data(),
            CellEntry::Enemy(c) => c.data(),
            CellEntry::Food(c) => c.data(),
            CellEntry::Eject(c) => c.data(),
        }
    }

    /// Get mutable cell data.
    pub fn data_mut(&mut self) -> &mut CellData {
        match self {
            CellEntry::Player(c) => c.data_mut(),
            CellEntry::Enemy(c) => c.data_mut(),
            CellEntry::Food(c) => c.data_mut(),
            CellEntry::Eject(c) => c.data_mut(),
        }
    }
}

/// Square world bounds `[0, size]` on both axes.
#[derive(Debug, Clone, Copy)]
pub struct WorldBorder {
    pub size: f32,
}

impl WorldBorder {
    pub fn new(size: f32) -> Self {
        Self { size }
    }

    /// Get a random position at least `margin` away from every edge.
    #[inline]
    pub fn random_position(&self, rng: &mut impl Rng, margin: f32) -> Vec2 {
        Vec2::new(
            rng.random_range(margin..=self.size - margin),
            rng.random_range(margin..=self.size - margin),
        )
    }

    /// Clamp a point into `[margin, size - margin]`.
    #[inline]
    pub fn clamp_point(&self, point: Vec2, margin: f32) -> Vec2 {
        point.clamp(Vec2::splat(margin), Vec2::splat(self.size - margin))
    }

    /// Clamp a circle center so the whole circle stays inside the world.
    #[inline]
    pub fn clamp_circle(&self, center: Vec2, radius: f32) -> Vec2 {
        let r = radius.min(self.size / 2.0);
        self.clamp_point(center, r)
    }

    /// Within `margin` of a vertical and a horizontal edge at once.
    pub fn is_cornered(&self, p: Vec2, margin: f32) -> bool {
        let near_x = p.x < margin || p.x > self.size - margin;
        let near_y = p.y < margin || p.y > self.size - margin;
        near_x && near_y
    }

    /// Unit axis direction pointing away from the nearest edge.
    /// Ties resolve left, right, top, bottom.
    pub fn away_from_nearest_edge(&self, p: Vec2) -> Vec2 {
        let candidates = [
            (p.x, Vec2::X),
            (self.size - p.x, Vec2::NEG_X),
            (p.y, Vec2::Y),
            (self.size - p.y, Vec2::NEG_Y),
        ];
        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.0 < best.0 {
                best = *candidate;
            }
        }
        best.1
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::splat(self.size / 2.0)
    }
}

impl World {
    /// Create an empty world from the config. Populations are filled by the spawner.
    pub fn new(config: &Config) -> Self {
        let rng = match config.world.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::seed_from_u64(rand::random()),
        };
        Self {
            next_node_id: 1,
            cells: HashMap::with_capacity(128),
            player_cells: Vec::with_capacity(16),
            enemy_cells: Vec::with_capacity(config.world.enemy_count + 8),
            food_cells: Vec::with_capacity(config.world.food_count),
            eject_cells: Vec::with_capacity(32),
            border: WorldBorder::new(config.world.size),
            now_ms: 0,
            rng,
            names: NamePool::new(config.enemy.names.clone()),
        }
    }

    /// Get the next node ID.
    pub fn next_id(&mut self) -> u32 {
        let id = self.next_node_id;
        self.next_node_id = self.next_node_id.wrapping_add(1);
        if self.next_node_id == 0 {
            self.next_node_id = 1; // Skip 0
        }
        id
    }

    /// Current simulation time.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Advance the clock.
    #[inline]
    pub fn advance_clock(&mut self, dt_ms: u64) {
        self.now_ms += dt_ms;
    }

    /// Get a cell by ID.
    #[inline]
    pub fn get_cell(&self, id: u32) -> Option<&CellEntry> {
        self.cells.get(&id)
    }

    /// Get a mutable cell by ID.
    #[inline]
    pub fn get_cell_mut(&mut self, id: u32) -> Option<&mut CellEntry> {
        self.cells.get_mut(&id)
    }

    #[inline]
    pub fn piece(&self, id: u32) -> Option<&PlayerPiece> {
        match self.cells.get(&id) {
            Some(CellEntry::Player(p)) => Some(p),
            _ => None,
        }
    }

    #[inline]
    pub fn piece_mut(&mut self, id: u32) -> Option<&mut PlayerPiece> {
        match self.cells.get_mut(&id) {
            Some(CellEntry::Player(p)) => Some(p),
            _ => None,
        }
    }

    #[inline]
    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        match self.cells.get(&id) {
            Some(CellEntry::Enemy(e)) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn enemy_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        match self.cells.get_mut(&id) {
            Some(CellEntry::Enemy(e)) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn food(&self, id: u32) -> Option<&Food> {
        match self.cells.get(&id) {
            Some(CellEntry::Food(f)) => Some(f),
            _ => None,
        }
    }

    #[inline]
    pub fn eject(&self, id: u32) -> Option<&EjectedMass> {
        match self.cells.get(&id) {
            Some(CellEntry::Eject(e)) => Some(e),
            _ => None,
        }
    }

    /// Primary piece: the oldest surviving one.
    pub fn primary_piece(&self) -> Option<&PlayerPiece> {
        self.player_cells.first().and_then(|&id| self.piece(id))
    }

    /// Player pieces in creation order.
    pub fn pieces(&self) -> impl Iterator<Item = &PlayerPiece> {
        self.player_cells.iter().filter_map(|&id| self.piece(id))
    }

    /// Enemies in spawn order.
    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemy_cells.iter().filter_map(|&id| self.enemy(id))
    }

    /// Food in spawn order.
    pub fn foods(&self) -> impl Iterator<Item = &Food> {
        self.food_cells.iter().filter_map(|&id| self.food(id))
    }

    /// Ejected pellets in spawn order.
    pub fn ejects(&self) -> impl Iterator<Item = &EjectedMass> {
        self.eject_cells.iter().filter_map(|&id| self.eject(id))
    }

    /// Total mass over all player pieces.
    pub fn player_mass(&self) -> f32 {
        self.pieces().map(|p| p.mass()).sum()
    }

    /// Add a player piece to the world.
    pub fn add_piece(&mut self, piece: PlayerPiece) -> u32 {
        let id = piece.data().node_id;
        self.player_cells.push(id);
        self.cells.insert(id, CellEntry::Player(piece));
        id
    }

    /// Add an enemy to the world.
    pub fn add_enemy(&mut self, enemy: Enemy) -> u32 {
        let id = enemy.data().node_id;
        self.enemy_cells.push(id);
        self.cells.insert(id, CellEntry::Enemy(enemy));
        id
    }

    /// Add a food particle to the world.
    pub fn add_food(&mut self, food: Food) -> u32 {
        let id = food.data().node_id;
        self.food_cells.push(id);
        self.cells.insert(id, CellEntry::Food(food));
        id
    }

    /// Add ejected mass to the world.
    pub fn add_eject(&mut self, eject: EjectedMass) -> u32 {
        let id = eject.data().node_id;
        self.eject_cells.push(id);
        self.cells.insert(id, CellEntry::Eject(eject));
        id
    }

    /// Remove a cell from the world. Type lists keep their relative order.
    pub fn remove_cell(&mut self, id: u32) -> Option<CellEntry> {
        let entry = self.cells.remove(&id)?;
        let list = match entry.data().cell_type {
            CellType::Player => &mut self.player_cells,
            CellType::Enemy => &mut self.enemy_cells,
            CellType::Food => &mut self.food_cells,
            CellType::EjectedMass => &mut self.eject_cells,
        };
        if let Some(pos) = list.iter().position(|&x| x == id) {
            list.remove(pos);
        }
        Some(entry)
    }

    /// Get the count of each cell type.
    #[inline]
    pub fn cell_counts(&self) -> CellCounts {
        CellCounts {
            pieces: self.player_cells.len(),
            enemies: self.enemy_cells.len(),
            specials: self.enemies().filter(|e| e.is_special).count(),
            food: self.food_cells.len(),
            ejected: self.eject_cells.len(),
            total: self.cells.len(),
        }
    }

    /// Iterate over all cells.
    #[inline]
    pub fn iter_cells(&self) -> impl Iterator<Item = (&u32, &CellEntry)> {
        self.cells.iter()
    }
}

/// Cell count statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellCounts {
    pub pieces: usize,
    pub enemies: usize,
    pub specials: usize,
    pub food: usize,
    pub ejected: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        let mut config = Config::default();
        config.world.seed = Some(1);
        World::new(&config)
    }

    #[test]
    fn remove_keeps_order_and_type_lists_in_sync() {
        let mut w = world();
        let ids: Vec<u32> = (0..4)
            .map(|i| {
                let id = w.next_id();
                w.add_food(Food::new(id, Vec2::splat(100.0 + i as f32), 0))
            })
            .collect();
        let removed = w.remove_cell(ids[1]).unwrap();
        assert_eq!(removed.data().cell_type, CellType::Food);
        assert_eq!(w.food_cells, vec![ids[0], ids[2], ids[3]]);
        assert!(w.remove_cell(ids[1]).is_none());
        assert_eq!(w.cell_counts().food, 3);
    }

    #[test]
    fn corner_detection_needs_two_edges() {
        let border = WorldBorder::new(2000.0);
        assert!(border.is_cornered(Vec2::new(50.0, 60.0), 100.0));
        assert!(border.is_cornered(Vec2::new(1950.0, 1990.0), 100.0));
        assert!(!border.is_cornered(Vec2::new(50.0, 1000.0), 100.0));
        assert!(!border.is_cornered(Vec2::new(1000.0, 1000.0), 100.0));
    }

    #[test]
    fn escape_direction_points_away_from_nearest_edge() {
        let border = WorldBorder::new(2000.0);
        assert_eq!(border.away_from_nearest_edge(Vec2::new(40.0, 80.0)), Vec2::X);
        assert_eq!(border.away_from_nearest_edge(Vec2::new(80.0, 40.0)), Vec2::Y);
        assert_eq!(border.away_from_nearest_edge(Vec2::new(1990.0, 1950.0)), Vec2::NEG_X);
        assert_eq!(border.away_from_nearest_edge(Vec2::new(1950.0, 1990.0)), Vec2::NEG_Y);
    }

    #[test]
    fn circles_are_clamped_inside() {
        let border = WorldBorder::new(2000.0);
        let p = border.clamp_circle(Vec2::new(-50.0, 2100.0), 20.0);
        assert_eq!(p, Vec2::new(20.0, 1980.0));
    }
}
