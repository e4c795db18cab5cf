//! Player actions (split, eject) and the delayed effects they schedule.

use crate::config::{Config, EjectConfig};
use crate::entity::{Cell, EjectedMass, PlayerPiece, mass_speed};
use crate::schedule::{ScheduledEvent, Scheduler};
use crate::world::World;
use glam::Vec2;
use rand::Rng;
use tracing::debug;

/// Unit direction from `from` toward `aim` and the distance to it.
///
/// An aim point missing or closer than one unit gives `+X` and zero distance.
pub fn aim_direction(from: Vec2, aim: Option<Vec2>) -> (Vec2, f32) {
    let Some(aim) = aim else {
        return (Vec2::X, 0.0);
    };
    let delta = aim - from;
    let dist_sq = delta.length_squared();
    if dist_sq < 1.0 {
        return (Vec2::X, 0.0);
    }
    let dist = dist_sq.sqrt();
    (delta / dist, dist)
}

/// Split every piece above the split threshold. Returns the IDs of the new pieces.
///
/// Pieces created by this call are not split again in the same call.
pub fn split_pieces(world: &mut World, scheduler: &mut Scheduler, config: &Config, aim: Option<Vec2>) -> Vec<u32> {
    let min_mass = config.split.min_mass;
    let candidates: Vec<u32> = world
        .pieces()
        .filter(|p| p.mass() > min_mass)
        .map(|p| p.cell_data.node_id)
        .collect();

    let created: Vec<u32> = candidates
        .into_iter()
        .filter_map(|id| split_piece(world, scheduler, config, id, aim))
        .collect();

    if !created.is_empty() {
        debug!("Split {} pieces, {} pieces alive", created.len(), world.player_cells.len());
    }
    created
}

/// Split one piece in two halves of `floor(mass / 2)`.
///
/// The new piece is flung toward `aim` and merges back into `id` once its
/// cooldown elapses.
pub fn split_piece(
    world: &mut World,
    scheduler: &mut Scheduler,
    config: &Config,
    id: u32,
    aim: Option<Vec2>,
) -> Option<u32> {
    let split = &config.split;
    let (position, mass) = {
        let piece = world.piece(id)?;
        (piece.position(), piece.mass())
    };
    if mass < split.commit_min_mass {
        return None;
    }
    let half = (mass / 2.0).floor();
    if half <= 0.0 {
        return None;
    }

    let (direction, distance) = aim_direction(position, aim);
    let impulse_secs = split.impulse_ms as f32 / 1000.0;
    let impulse = direction * (distance * split.impulse_factor / impulse_secs);
    let cooldown_ms = split.cooldown_base_ms + (mass * split.cooldown_per_mass_ms) as u64;
    let now = world.now_ms();

    world.piece_mut(id)?.cell_data.set_mass(half);

    let new_id = world.next_id();
    let mut piece = PlayerPiece::new(new_id, position, half, now);
    piece.cell_data.velocity = impulse;
    piece.boost_heading = Some(direction);
    piece.merge_cooldown_deadline = Some(now + cooldown_ms);
    world.add_piece(piece);

    scheduler.schedule(
        now + split.impulse_ms,
        ScheduledEvent::SettleSplit {
            piece: new_id,
            heading: direction,
        },
    );
    scheduler.schedule(
        now + cooldown_ms,
        ScheduledEvent::Merge {
            piece: new_id,
            sibling: id,
        },
    );

    debug!(
        "Piece {} (mass {}) split off {} at {:.0},{:.0}; merge in {}ms",
        id, mass, new_id, position.x, position.y, cooldown_ms
    );
    Some(new_id)
}

/// End a split sling: the piece slows to its steady speed along `heading`.
pub fn settle_split(world: &mut World, config: &Config, id: u32, heading: Vec2) -> bool {
    let Some(piece) = world.piece_mut(id) else {
        return false;
    };
    let speed = mass_speed(config.player.pointer_speed, piece.mass()) * config.split.settle_speed_factor;
    piece.cell_data.velocity = heading * speed;
    piece.boost_heading = None;
    true
}

/// Fold `piece` back into `sibling` if both are still alive.
pub fn merge_pieces(world: &mut World, piece: u32, sibling: u32) -> bool {
    let Some(mass) = world.piece(piece).map(|p| p.mass()) else {
        return false;
    };
    let Some(target) = world.piece_mut(sibling) else {
        return false;
    };
    target.cell_data.add_mass(mass);
    let merged = target.mass();
    world.remove_cell(piece);
    debug!("Piece {} merged into {} (mass {:.1})", piece, sibling, merged);
    true
}

/// Remove a pellet that was never absorbed.
pub fn expire_pellet(world: &mut World, pellet: u32) -> bool {
    if world.eject(pellet).is_none() {
        return false;
    }
    world.remove_cell(pellet);
    true
}

#[inline]
fn can_eject(mass: f32, eject: &EjectConfig) -> bool {
    mass > eject.min_mass && mass - eject.pellet_mass >= eject.mass_floor
}

/// Eject one pellet from the primary piece toward `aim`.
pub fn eject_mass(world: &mut World, scheduler: &mut Scheduler, config: &Config, aim: Option<Vec2>) -> Option<u32> {
    let primary = world.primary_piece()?;
    let origin = primary.cell_data.node_id;
    let (direction, _) = aim_direction(primary.position(), aim);
    launch_pellet(world, scheduler, config, origin, direction)
}

/// Eject one pellet from an enemy in a random direction.
pub fn eject_enemy_mass(world: &mut World, scheduler: &mut Scheduler, config: &Config, enemy: u32) -> Option<u32> {
    world.enemy(enemy)?;
    let angle = world.rng.random_range(0.0..std::f32::consts::TAU);
    launch_pellet(world, scheduler, config, enemy, Vec2::from_angle(angle))
}

/// Give every normal enemy one chance to eject this tick. Returns the new pellet IDs.
pub fn enemy_ejections(world: &mut World, scheduler: &mut Scheduler, config: &Config) -> Vec<u32> {
    let chance = config.enemy.eject_chance;
    if chance <= 0.0 {
        return Vec::new();
    }
    let candidates: Vec<u32> = world
        .enemies()
        .filter(|e| !e.is_special)
        .map(|e| e.data().node_id)
        .collect();

    let mut pellets = Vec::new();
    for id in candidates {
        if world.rng.random_bool(chance) {
            pellets.extend(eject_enemy_mass(world, scheduler, config, id));
        }
    }
    pellets
}

fn launch_pellet(
    world: &mut World,
    scheduler: &mut Scheduler,
    config: &Config,
    origin: u32,
    direction: Vec2,
) -> Option<u32> {
    let eject = &config.eject;
    let (position, color) = {
        let data = world.get_cell_mut(origin)?.data_mut();
        if !can_eject(data.mass(), eject) {
            return None;
        }
        data.add_mass(-eject.pellet_mass);
        (data.position, data.color)
    };

    let now = world.now_ms();
    let id = world.next_id();
    let mut pellet = EjectedMass::new(id, origin, position, eject.pellet_mass, now);
    pellet.set_color(color);
    pellet.data_mut().velocity = direction * eject.speed;
    world.add_eject(pellet);
    scheduler.schedule(now + eject.lifetime_ms, ScheduledEvent::ExpirePellet { pellet: id });

    debug!("Cell {} ejected pellet {}", origin, id);
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Enemy;

    fn setup(mass: f32) -> (World, Scheduler, Config, u32) {
        let mut config = Config::default();
        config.world.seed = Some(3);
        let mut world = World::new(&config);
        let id = world.next_id();
        world.add_piece(PlayerPiece::new(id, Vec2::new(1000.0, 1000.0), mass, 0));
        (world, Scheduler::new(), config, id)
    }

    #[test]
    fn split_halves_with_floor() {
        let (mut world, mut scheduler, config, id) = setup(151.0);
        let created = split_pieces(&mut world, &mut scheduler, &config, Some(Vec2::new(1100.0, 1000.0)));
        assert_eq!(created.len(), 1);

        let original = world.piece(id).unwrap();
        let new = world.piece(created[0]).unwrap();
        assert_eq!(original.mass(), 75.0);
        assert_eq!(new.mass(), 75.0);
        assert!(original.mass() + new.mass() <= 151.0);
        assert_eq!(new.position(), original.position());
        // 100 units away, 10x distance over 0.1s.
        assert!((new.cell_data.velocity.x - 10_000.0).abs() < 1e-2);
        assert_eq!(new.boost_heading, Some(Vec2::X));
        assert_eq!(new.merge_cooldown_deadline, Some(30_000 + 1_510));
        assert_eq!(scheduler.len(), 2);
    }

    #[test]
    fn split_threshold_is_strict() {
        let (mut world, mut scheduler, config, _) = setup(100.0);
        assert!(split_pieces(&mut world, &mut scheduler, &config, None).is_empty());
        assert_eq!(world.player_cells.len(), 1);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn commit_check_blocks_light_pieces() {
        let (mut world, mut scheduler, config, id) = setup(30.0);
        assert_eq!(split_piece(&mut world, &mut scheduler, &config, id, None), None);
        assert_eq!(world.piece(id).unwrap().mass(), 30.0);
    }

    #[test]
    fn fresh_pieces_are_not_split_twice() {
        let (mut world, mut scheduler, config, _) = setup(800.0);
        let created = split_pieces(&mut world, &mut scheduler, &config, None);
        assert_eq!(created.len(), 1);
        assert_eq!(world.player_cells.len(), 2);
        let created = split_pieces(&mut world, &mut scheduler, &config, None);
        assert_eq!(created.len(), 2);
        assert!(world.pieces().all(|p| p.mass() == 200.0));
    }

    #[test]
    fn settle_and_merge() {
        let (mut world, mut scheduler, config, id) = setup(200.0);
        let new_id = split_pieces(&mut world, &mut scheduler, &config, Some(Vec2::new(1000.0, 1200.0)))[0];

        assert!(settle_split(&mut world, &config, new_id, Vec2::Y));
        let piece = world.piece(new_id).unwrap();
        assert!(!piece.is_boosting());
        assert!((piece.cell_data.velocity.y - 400.0 / 10.0 * 0.8).abs() < 1e-4);

        assert!(merge_pieces(&mut world, new_id, id));
        assert_eq!(world.piece(id).unwrap().mass(), 200.0);
        assert!(world.piece(new_id).is_none());
        assert!(!merge_pieces(&mut world, new_id, id));
    }

    #[test]
    fn merge_needs_a_live_sibling() {
        let (mut world, mut scheduler, config, id) = setup(200.0);
        let new_id = split_pieces(&mut world, &mut scheduler, &config, None)[0];
        world.remove_cell(id);
        assert!(!merge_pieces(&mut world, new_id, id));
        assert_eq!(world.piece(new_id).unwrap().mass(), 100.0);
    }

    #[test]
    fn eject_removes_exactly_one() {
        let (mut world, mut scheduler, config, id) = setup(20.0);
        let pellet = eject_mass(&mut world, &mut scheduler, &config, Some(Vec2::new(1000.0, 900.0))).unwrap();

        assert_eq!(world.piece(id).unwrap().mass(), 19.0);
        let p = world.eject(pellet).unwrap();
        assert_eq!(p.mass(), 1.0);
        assert_eq!(p.origin, Some(id));
        assert_eq!(p.data().velocity, Vec2::new(0.0, -400.0));
        assert_eq!(p.data().color, world.piece(id).unwrap().cell_data.color);
        assert_eq!(scheduler.next_due(), Some(3000));
    }

    #[test]
    fn eject_respects_floor() {
        let (mut world, mut scheduler, config, id) = setup(10.5);
        assert_eq!(eject_mass(&mut world, &mut scheduler, &config, None), None);
        assert_eq!(world.piece(id).unwrap().mass(), 10.5);

        world.piece_mut(id).unwrap().cell_data.set_mass(13.0);
        let mut ejected = 0;
        while eject_mass(&mut world, &mut scheduler, &config, None).is_some() {
            ejected += 1;
        }
        assert_eq!(ejected, 3);
        assert_eq!(world.piece(id).unwrap().mass(), 10.0);
    }

    #[test]
    fn pellet_expiry_is_idempotent() {
        let (mut world, mut scheduler, config, _) = setup(20.0);
        let pellet = eject_mass(&mut world, &mut scheduler, &config, None).unwrap();
        assert!(expire_pellet(&mut world, pellet));
        assert!(!expire_pellet(&mut world, pellet));
        assert!(world.eject_cells.is_empty());
    }

    #[test]
    fn enemy_ejections_follow_the_chance() {
        let (mut world, mut scheduler, mut config, _) = setup(20.0);
        let heavy = world.next_id();
        world.add_enemy(Enemy::new(heavy, "heavy".into(), Vec2::splat(500.0), 30.0, 0));
        let light = world.next_id();
        world.add_enemy(Enemy::new(light, "light".into(), Vec2::splat(900.0), 10.0, 0));
        let special = world.next_id();
        world.add_enemy(Enemy::special(special, "s".into(), Vec2::splat(1500.0), 30.0, 0));

        config.enemy.eject_chance = 0.0;
        assert!(enemy_ejections(&mut world, &mut scheduler, &config).is_empty());

        config.enemy.eject_chance = 1.0;
        let pellets = enemy_ejections(&mut world, &mut scheduler, &config);
        assert_eq!(pellets.len(), 1);
        assert_eq!(world.eject(pellets[0]).unwrap().origin, Some(heavy));
        assert_eq!(world.enemy(heavy).unwrap().mass(), 29.0);
        assert_eq!(world.enemy(light).unwrap().mass(), 10.0);
        assert_eq!(world.enemy(special).unwrap().mass(), 30.0);
    }

    #[test]
    fn enemy_eject_uses_enemy_color() {
        let (mut world, mut scheduler, config, _) = setup(20.0);
        let enemy_id = world.next_id();
        let mut enemy = Enemy::new(enemy_id, "e".into(), Vec2::splat(500.0), 25.0, 0);
        enemy.set_color(contract::Color::new(1, 2, 3));
        world.add_enemy(enemy);

        let pellet = eject_enemy_mass(&mut world, &mut scheduler, &config, enemy_id).unwrap();
        let p = world.eject(pellet).unwrap();
        assert_eq!(p.origin, Some(enemy_id));
        assert_eq!(p.data().color, contract::Color::new(1, 2, 3));
        assert!((p.data().velocity.length() - 400.0).abs() < 1e-3);
        assert_eq!(world.enemy(enemy_id).unwrap().mass(), 24.0);
    }
}
