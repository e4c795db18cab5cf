//! Enemy AI.

pub mod brain;

pub use brain::{Decision, Steer, decide, enemy_speed, shortest_angle, smooth_turn};

use crate::config::Config;
use crate::entity::Cell;
use crate::spawner::random_color;
use crate::world::World;
use rand::Rng;

/// How many enemies took each branch this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AiSummary {
    pub pursuing: usize,
    pub fleeing: usize,
    pub hunting: usize,
    pub escorting: usize,
    pub wandering: usize,
}

impl AiSummary {
    fn record(&mut self, decision: &Decision) {
        match decision {
            Decision::Pursue { .. } => self.pursuing += 1,
            Decision::Flee { .. } => self.fleeing += 1,
            Decision::Hunt { .. } => self.hunting += 1,
            Decision::Escort { .. } => self.escorting += 1,
            Decision::Wander => self.wandering += 1,
        }
    }
}

/// Recompute every enemy's velocity for this tick.
///
/// Positions and masses do not change during this step, so each decision reads
/// the same world state regardless of evaluation order.
pub fn update_enemies(world: &mut World, config: &Config) -> AiSummary {
    let mut summary = AiSummary::default();

    for i in 0..world.enemy_cells.len() {
        let id = world.enemy_cells[i];
        let wander_angle = world.rng.random_range(0.0..std::f32::consts::TAU);

        let (steer, is_special) = match world.enemy(id) {
            Some(enemy) => (decide(enemy, world, config, wander_angle), enemy.is_special),
            None => continue,
        };
        summary.record(&steer.decision);

        // Specials flash a new color every tick.
        let recolor = is_special.then(|| random_color(&mut world.rng));
        if let Some(enemy) = world.enemy_mut(id) {
            enemy.data_mut().velocity = steer.velocity;
            if let Some(color) = recolor {
                enemy.set_color(color);
            }
        }
    }

    summary
}
