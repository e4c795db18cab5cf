//! Entity spawning and enemy naming.

use crate::config::Config;
use crate::entity::{Enemy, Food, PlayerPiece};
use crate::world::World;
use contract::Color;
use glam::Vec2;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// Enemy display names drawn without replacement.
///
/// No name repeats until every name has been handed out once; then the pool resets.
#[derive(Debug, Clone)]
pub struct NamePool {
    names: Vec<String>,
    used: HashSet<usize>,
}

impl NamePool {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            used: HashSet::new(),
        }
    }

    /// Draw a name not handed out since the last reset.
    pub fn draw(&mut self, rng: &mut impl Rng) -> String {
        if self.names.is_empty() {
            return String::from("Enemy");
        }
        if self.used.len() >= self.names.len() {
            debug!("Name pool exhausted after {} names, resetting", self.names.len());
            self.used.clear();
        }
        let available: Vec<usize> = (0..self.names.len())
            .filter(|i| !self.used.contains(i))
            .collect();
        let pick = available[rng.random_range(0..available.len())];
        self.used.insert(pick);
        self.names[pick].clone()
    }

    /// Names still available before the next reset.
    pub fn remaining(&self) -> usize {
        self.names.len() - self.used.len()
    }
}

/// Generate a random 24-bit color.
#[inline]
pub fn random_color(rng: &mut impl Rng) -> Color {
    Color::from_rgb24(rng.random_range(0..=0xff_ffff))
}

impl World {
    /// Uniform position inside the spawn margin.
    pub fn random_spawn_position(&mut self, config: &Config) -> Vec2 {
        let border = self.border;
        border.random_position(&mut self.rng, config.world.spawn_margin)
    }

    /// Spawn one food particle at a random position.
    pub fn spawn_food(&mut self, config: &Config) -> u32 {
        let pos = self.random_spawn_position(config);
        let id = self.next_id();
        self.add_food(Food::new(id, pos, self.now_ms))
    }

    /// Spawn one normal enemy at a random position.
    pub fn spawn_enemy(&mut self, config: &Config) -> u32 {
        let pos = self.random_spawn_position(config);
        self.spawn_enemy_at(config, pos)
    }

    /// Spawn one normal enemy at `pos`.
    pub fn spawn_enemy_at(&mut self, config: &Config, pos: Vec2) -> u32 {
        let id = self.next_id();
        let name = self.names.draw(&mut self.rng);
        let mut enemy = Enemy::new(id, name, pos, config.enemy.start_mass, self.now_ms);
        enemy.set_color(random_color(&mut self.rng));
        self.add_enemy(enemy)
    }

    /// Spawn a special enemy at a random bearing, a fixed distance from `near`.
    pub fn spawn_special_enemy(&mut self, config: &Config, near: Vec2) -> u32 {
        let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
        let offset = Vec2::new(angle.cos(), angle.sin()) * config.enemy.special_spawn_distance;
        let pos = self
            .border
            .clamp_point(near + offset, config.world.spawn_margin);
        let id = self.next_id();
        let name = self.names.draw(&mut self.rng);
        let enemy = Enemy::special(id, name, pos, config.enemy.start_mass, self.now_ms);
        debug!("Special enemy {} '{}' spawned at ({:.0}, {:.0})", id, enemy.name, pos.x, pos.y);
        self.add_enemy(enemy)
    }

    /// Spawn the root player piece at the world center.
    pub fn spawn_player(&mut self, config: &Config) -> u32 {
        let id = self.next_id();
        let piece = PlayerPiece::new(id, self.border.center(), config.player.start_mass, self.now_ms);
        self.add_piece(piece)
    }

    /// Fill an empty world: the player, the enemy population and the food population.
    pub fn populate(&mut self, config: &Config) {
        self.spawn_player(config);
        for _ in 0..config.world.enemy_count {
            self.spawn_enemy(config);
        }
        for _ in 0..config.world.food_count {
            self.spawn_food(config);
        }
        let counts = self.cell_counts();
        debug!(
            "World populated: {} enemies, {} food, {} pieces",
            counts.enemies, counts.food, counts.pieces
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Cell;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn seeded_config() -> Config {
        let mut config = Config::default();
        config.world.seed = Some(42);
        config
    }

    #[test]
    fn names_do_not_repeat_until_exhausted() {
        let mut rng = SmallRng::seed_from_u64(3);
        let names: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let mut pool = NamePool::new(names);

        let mut first_cycle: Vec<String> = (0..4).map(|_| pool.draw(&mut rng)).collect();
        first_cycle.sort();
        assert_eq!(first_cycle, vec!["a", "b", "c", "d"]);
        assert_eq!(pool.remaining(), 0);

        // Pool resets on the next draw.
        pool.draw(&mut rng);
        assert_eq!(pool.remaining(), 3);
    }

    #[test]
    fn spawns_stay_inside_margin() {
        let config = seeded_config();
        let mut world = World::new(&config);
        for _ in 0..500 {
            let p = world.random_spawn_position(&config);
            assert!(p.x >= 50.0 && p.x <= 1950.0);
            assert!(p.y >= 50.0 && p.y <= 1950.0);
        }
    }

    #[test]
    fn populate_creates_initial_populations() {
        let config = seeded_config();
        let mut world = World::new(&config);
        world.populate(&config);

        let counts = world.cell_counts();
        assert_eq!(counts.pieces, 1);
        assert_eq!(counts.enemies, 20);
        assert_eq!(counts.food, 50);
        assert_eq!(counts.specials, 0);

        let piece = world.primary_piece().unwrap();
        assert_eq!(piece.cell_data.mass(), 10.0);
        assert_eq!(piece.cell_data.position, Vec2::splat(1000.0));

        let names: HashSet<&str> = world.enemies().map(|e| e.name.as_str()).collect();
        assert_eq!(names.len(), 20, "live enemies must have distinct names");
    }

    #[test]
    fn special_enemy_spawns_near_and_in_bounds() {
        let config = seeded_config();
        let mut world = World::new(&config);
        let id = world.spawn_special_enemy(&config, Vec2::new(60.0, 60.0));
        let enemy = world.enemy(id).unwrap();
        assert!(enemy.is_special);
        assert_eq!(enemy.stroke(), Some(Color::RED));
        let p = enemy.position();
        assert!(p.x >= 50.0 && p.y >= 50.0);
        assert!(p.distance(Vec2::new(60.0, 60.0)) <= 300.0 + 1e-3);
    }
}
