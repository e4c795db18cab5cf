//! Collision detection and resolution.
//!
//! This module handles absorption between every pair of entity kinds:
//! - Enemies eating enemies
//! - Enemies and player pieces eating food
//! - Player pieces and enemies eating each other
//! - Ejected pellets being picked up
//!
//! Each pass scans a snapshot of the world taken when the pass starts, records
//! its decisions, then applies removals, mass gains and respawns in one go.
//! Contact is a center-to-center distance below the *eater's* radius.

use crate::config::Config;
use crate::entity::Cell;
use crate::world::World;
use fixedbitset::FixedBitSet;
use glam::Vec2;
use tracing::{debug, info};

/// Which pass produced an absorption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsorptionKind {
    EnemyEatsEnemy,
    EnemyEatsFood,
    PlayerEatsFood,
    PlayerEatsEnemy,
    EnemyEatsPlayer,
    PelletAbsorbed,
}

/// One absorption event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Absorption {
    pub kind: AbsorptionKind,
    pub eater: u32,
    pub prey: u32,
    /// Mass the prey held when it was absorbed (zero-mass food counts as zero).
    pub prey_mass: f32,
    /// Mass the eater gained.
    pub gain: f32,
}

/// Outcome of one resolver run.
#[derive(Debug, Clone, Default)]
pub struct CollisionReport {
    pub absorptions: Vec<Absorption>,
    /// Points earned by the player this tick.
    pub score: u64,
    pub enemies_respawned: usize,
    pub food_respawned: usize,
    /// The last player piece was eaten this tick.
    pub player_eliminated: bool,
}

impl CollisionReport {
    pub fn count(&self, kind: AbsorptionKind) -> usize {
        self.absorptions.iter().filter(|a| a.kind == kind).count()
    }
}

/// Read-only view of a cell at the start of a pass.
#[derive(Debug, Clone, Copy)]
struct Body {
    id: u32,
    position: Vec2,
    mass: f32,
    radius: f32,
    special: bool,
    origin: Option<u32>,
}

impl Body {
    fn of(cell: &impl Cell) -> Self {
        let data = cell.data();
        Self {
            id: data.node_id,
            position: data.position,
            mass: data.mass(),
            radius: data.radius(),
            special: false,
            origin: None,
        }
    }

    /// `point` lies strictly inside this body's reach.
    #[inline]
    fn reaches(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) < self.radius * self.radius
    }

    /// Heavier than `prey * ratio` and touching its center.
    #[inline]
    fn can_eat(&self, prey: &Body, ratio: f32) -> bool {
        self.mass > prey.mass * ratio && self.reaches(prey.position)
    }
}

fn snapshot_pieces(world: &World) -> Vec<Body> {
    world.pieces().map(Body::of).collect()
}

fn snapshot_enemies(world: &World) -> Vec<Body> {
    world
        .enemies()
        .map(|e| Body {
            special: e.is_special,
            ..Body::of(e)
        })
        .collect()
}

fn snapshot_food(world: &World) -> Vec<Body> {
    world.foods().map(Body::of).collect()
}

fn snapshot_pellets(world: &World) -> Vec<Body> {
    world
        .ejects()
        .map(|p| Body {
            origin: p.origin,
            ..Body::of(p)
        })
        .collect()
}

/// First eater, in order, that satisfies `rule` for `prey`.
#[inline]
fn first_eater(eaters: &[Body], prey: &Body, rule: impl Fn(&Body, &Body) -> bool) -> Option<usize> {
    eaters.iter().position(|eater| rule(eater, prey))
}

#[inline]
fn grow(world: &mut World, id: u32, amount: f32) {
    if let Some(cell) = world.get_cell_mut(id) {
        cell.data_mut().add_mass(amount);
    }
}

/// Run all absorption passes in their fixed order.
pub fn resolve(world: &mut World, config: &Config) -> CollisionReport {
    let mut report = CollisionReport::default();
    enemy_eats_enemy(world, config, &mut report);
    enemy_eats_food(world, config, &mut report);
    player_eats_food(world, config, &mut report);
    player_eats_enemy(world, config, &mut report);
    enemy_eats_player(world, config, &mut report);
    pellets_absorbed(world, &mut report);
    report
}

/// Remove eaten enemies and keep the normal population constant.
fn replace_enemies(world: &mut World, config: &Config, eaten: &[Body], report: &mut CollisionReport) {
    for prey in eaten {
        world.remove_cell(prey.id);
        if !prey.special {
            world.spawn_enemy(config);
            report.enemies_respawned += 1;
        }
    }
}

/// Remove eaten food and keep the food population constant.
fn replace_food(world: &mut World, config: &Config, eaten: &[u32], report: &mut CollisionReport) {
    for &id in eaten {
        world.remove_cell(id);
        world.spawn_food(config);
        report.food_respawned += 1;
    }
}

/// Pass 1: every ordered pair of enemies.
///
/// An enemy removed earlier in the pass neither eats nor is eaten again. If a
/// predator is itself eaten later in the pass, what it gained so far goes along.
pub fn enemy_eats_enemy(world: &mut World, config: &Config, report: &mut CollisionReport) {
    let ratio = config.predation.eat_ratio;
    let transfer = config.predation.transfer_ratio;
    let bodies = snapshot_enemies(world);
    let n = bodies.len();

    let mut eaten = FixedBitSet::with_capacity(n);
    let mut gained = vec![0.0f32; n];

    for a in 0..n {
        if eaten.contains(a) {
            continue;
        }
        for b in 0..n {
            if a == b || eaten.contains(b) {
                continue;
            }
            if bodies[a].can_eat(&bodies[b], ratio) {
                let prey_mass = bodies[b].mass + gained[b];
                let gain = prey_mass * transfer;
                gained[a] += gain;
                eaten.insert(b);
                report.absorptions.push(Absorption {
                    kind: AbsorptionKind::EnemyEatsEnemy,
                    eater: bodies[a].id,
                    prey: bodies[b].id,
                    prey_mass,
                    gain,
                });
            }
        }
    }

    if eaten.is_clear() {
        return;
    }
    for a in 0..n {
        if !eaten.contains(a) && gained[a] > 0.0 {
            grow(world, bodies[a].id, gained[a]);
        }
    }
    let victims: Vec<Body> = eaten.ones().map(|i| bodies[i]).collect();
    debug!("{} enemies eaten by other enemies", victims.len());
    replace_enemies(world, config, &victims, report);
}

/// Pass 2: enemies pick up food for a flat mass bonus.
pub fn enemy_eats_food(world: &mut World, config: &Config, report: &mut CollisionReport) {
    let enemies = snapshot_enemies(world);
    let food = snapshot_food(world);
    let bonus = config.predation.food_mass;

    let mut eaten = Vec::new();
    for f in &food {
        if let Some(e) = first_eater(&enemies, f, |eater, prey| eater.reaches(prey.position)) {
            eaten.push(f.id);
            report.absorptions.push(Absorption {
                kind: AbsorptionKind::EnemyEatsFood,
                eater: enemies[e].id,
                prey: f.id,
                prey_mass: 0.0,
                gain: bonus,
            });
            grow(world, enemies[e].id, bonus);
        }
    }
    replace_food(world, config, &eaten, report);
}

/// Pass 3: player pieces pick up food for mass and score.
pub fn player_eats_food(world: &mut World, config: &Config, report: &mut CollisionReport) {
    let pieces = snapshot_pieces(world);
    let food = snapshot_food(world);
    let bonus = config.predation.food_mass;

    let mut eaten = Vec::new();
    for f in &food {
        if let Some(p) = first_eater(&pieces, f, |eater, prey| eater.reaches(prey.position)) {
            eaten.push(f.id);
            report.score += config.predation.food_score;
            report.absorptions.push(Absorption {
                kind: AbsorptionKind::PlayerEatsFood,
                eater: pieces[p].id,
                prey: f.id,
                prey_mass: 0.0,
                gain: bonus,
            });
            grow(world, pieces[p].id, bonus);
        }
    }
    replace_food(world, config, &eaten, report);
}

/// Pass 4: player pieces absorb lighter enemies.
pub fn player_eats_enemy(world: &mut World, config: &Config, report: &mut CollisionReport) {
    let ratio = config.predation.eat_ratio;
    let transfer = config.predation.transfer_ratio;
    let pieces = snapshot_pieces(world);
    let enemies = snapshot_enemies(world);

    let mut eaten = Vec::new();
    for e in &enemies {
        if let Some(p) = first_eater(&pieces, e, |eater, prey| eater.can_eat(prey, ratio)) {
            let gain = e.mass * transfer;
            eaten.push(*e);
            report.score += config.predation.enemy_score;
            report.absorptions.push(Absorption {
                kind: AbsorptionKind::PlayerEatsEnemy,
                eater: pieces[p].id,
                prey: e.id,
                prey_mass: e.mass,
                gain,
            });
            grow(world, pieces[p].id, gain);
        }
    }
    if !eaten.is_empty() {
        debug!("Player absorbed {} enemies", eaten.len());
    }
    replace_enemies(world, config, &eaten, report);
}

/// Pass 5: enemies absorb lighter player pieces. Pieces are never replaced.
pub fn enemy_eats_player(world: &mut World, config: &Config, report: &mut CollisionReport) {
    let ratio = config.predation.eat_ratio;
    let transfer = config.predation.transfer_ratio;
    let enemies = snapshot_enemies(world);
    let pieces = snapshot_pieces(world);
    if pieces.is_empty() {
        return;
    }

    for p in &pieces {
        if let Some(e) = first_eater(&enemies, p, |eater, prey| eater.can_eat(prey, ratio)) {
            let gain = p.mass * transfer;
            report.absorptions.push(Absorption {
                kind: AbsorptionKind::EnemyEatsPlayer,
                eater: enemies[e].id,
                prey: p.id,
                prey_mass: p.mass,
                gain,
            });
            grow(world, enemies[e].id, gain);
            world.remove_cell(p.id);
            debug!("Piece {} (mass {:.1}) absorbed by enemy {}", p.id, p.mass, enemies[e].id);
        }
    }

    if world.player_cells.is_empty() {
        info!("Player eliminated: no pieces left");
        report.player_eliminated = true;
    }
}

/// Pass 6: pellets are picked up by any piece but their origin, then by any enemy but their origin.
pub fn pellets_absorbed(world: &mut World, report: &mut CollisionReport) {
    let pellets = snapshot_pellets(world);
    if pellets.is_empty() {
        return;
    }
    let pieces = snapshot_pieces(world);
    let enemies = snapshot_enemies(world);
    let rule = |eater: &Body, pellet: &Body| pellet.origin != Some(eater.id) && eater.reaches(pellet.position);

    for pellet in &pellets {
        let eater = first_eater(&pieces, pellet, rule)
            .map(|i| pieces[i].id)
            .or_else(|| first_eater(&enemies, pellet, rule).map(|i| enemies[i].id));
        if let Some(eater) = eater {
            report.absorptions.push(Absorption {
                kind: AbsorptionKind::PelletAbsorbed,
                eater,
                prey: pellet.id,
                prey_mass: pellet.mass,
                gain: pellet.mass,
            });
            grow(world, eater, pellet.mass);
            world.remove_cell(pellet.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EjectedMass, Enemy, Food, PlayerPiece};

    fn world() -> (World, Config) {
        let mut config = Config::default();
        config.world.seed = Some(21);
        (World::new(&config), config)
    }

    fn add_enemy(world: &mut World, pos: Vec2, mass: f32) -> u32 {
        let id = world.next_id();
        world.add_enemy(Enemy::new(id, format!("e{id}"), pos, mass, 0))
    }

    fn add_piece(world: &mut World, pos: Vec2, mass: f32) -> u32 {
        let id = world.next_id();
        world.add_piece(PlayerPiece::new(id, pos, mass, 0))
    }

    fn add_food(world: &mut World, pos: Vec2) -> u32 {
        let id = world.next_id();
        world.add_food(Food::new(id, pos, 0))
    }

    #[test]
    fn enemy_chain_respects_pass_order() {
        let (mut w, config) = world();
        let a = add_enemy(&mut w, Vec2::new(1000.0, 1000.0), 30.0);
        let b = add_enemy(&mut w, Vec2::new(1005.0, 1000.0), 10.0);
        let c = add_enemy(&mut w, Vec2::new(1000.0, 1005.0), 10.0);

        let mut report = CollisionReport::default();
        enemy_eats_enemy(&mut w, &config, &mut report);

        assert_eq!(report.count(AbsorptionKind::EnemyEatsEnemy), 2);
        assert_eq!(report.absorptions[0].prey, b, "A vs B is evaluated first");
        assert_eq!(report.absorptions[1].prey, c);
        assert!(w.enemy(b).is_none() && w.enemy(c).is_none());
        assert!((w.enemy(a).unwrap().mass() - 46.0).abs() < 1e-4);
        assert_eq!(w.enemy_cells.len(), 3, "population is conserved");
        assert_eq!(report.enemies_respawned, 2);
    }

    #[test]
    fn equal_enemies_do_not_eat_each_other() {
        let (mut w, config) = world();
        add_enemy(&mut w, Vec2::new(1000.0, 1000.0), 10.0);
        add_enemy(&mut w, Vec2::new(1001.0, 1000.0), 10.5);
        let mut report = CollisionReport::default();
        enemy_eats_enemy(&mut w, &config, &mut report);
        assert!(report.absorptions.is_empty());
    }

    #[test]
    fn predator_eaten_later_passes_on_its_gains() {
        let (mut w, config) = world();
        let mid = add_enemy(&mut w, Vec2::new(1000.0, 1000.0), 30.0);
        let small = add_enemy(&mut w, Vec2::new(1004.0, 1000.0), 10.0);
        let big = add_enemy(&mut w, Vec2::new(1002.0, 1000.0), 100.0);

        let mut report = CollisionReport::default();
        enemy_eats_enemy(&mut w, &config, &mut report);

        // mid eats small first (pass order), then big eats mid including its gain.
        assert_eq!(report.absorptions[0].eater, mid);
        assert_eq!(report.absorptions[0].prey, small);
        assert_eq!(report.absorptions[1].eater, big);
        assert_eq!(report.absorptions[1].prey, mid);
        assert!((report.absorptions[1].prey_mass - 38.0).abs() < 1e-4);
        assert!((w.enemy(big).unwrap().mass() - (100.0 + 38.0 * 0.8)).abs() < 1e-3);
        assert_eq!(w.enemy_cells.len(), 3);
    }

    #[test]
    fn predation_always_loses_mass() {
        let (mut w, config) = world();
        w.populate(&config);
        // Crowd everything together so passes fire.
        let center = Vec2::splat(1000.0);
        add_enemy(&mut w, center, 200.0);
        add_piece(&mut w, center + Vec2::new(3.0, 0.0), 80.0);
        add_enemy(&mut w, center + Vec2::new(0.0, 3.0), 12.0);

        let report = resolve(&mut w, &config);
        assert!(!report.absorptions.is_empty());
        for a in &report.absorptions {
            match a.kind {
                AbsorptionKind::EnemyEatsEnemy
                | AbsorptionKind::PlayerEatsEnemy
                | AbsorptionKind::EnemyEatsPlayer => assert!(a.gain < a.prey_mass),
                AbsorptionKind::EnemyEatsFood | AbsorptionKind::PlayerEatsFood => assert_eq!(a.gain, 2.0),
                AbsorptionKind::PelletAbsorbed => assert_eq!(a.gain, a.prey_mass),
            }
        }
        for (_, cell) in w.iter_cells() {
            let d = cell.data();
            assert!((d.radius() - d.mass().sqrt() * 4.0).abs() < 1e-3);
        }
    }

    #[test]
    fn food_is_eaten_and_replaced() {
        let (mut w, config) = world();
        let piece = add_piece(&mut w, Vec2::new(500.0, 500.0), 10.0);
        let enemy = add_enemy(&mut w, Vec2::new(1500.0, 1500.0), 10.0);
        add_food(&mut w, Vec2::new(505.0, 500.0));
        add_food(&mut w, Vec2::new(1500.0, 1505.0));
        add_food(&mut w, Vec2::new(100.0, 100.0));

        let report = resolve(&mut w, &config);
        assert_eq!(report.count(AbsorptionKind::PlayerEatsFood), 1);
        assert_eq!(report.count(AbsorptionKind::EnemyEatsFood), 1);
        assert_eq!(report.score, 10);
        assert_eq!(w.piece(piece).unwrap().mass(), 12.0);
        assert_eq!(w.enemy(enemy).unwrap().mass(), 12.0);
        assert_eq!(w.food_cells.len(), 3);
    }

    #[test]
    fn player_absorbs_enemy_for_score() {
        let (mut w, config) = world();
        let piece = add_piece(&mut w, Vec2::new(500.0, 500.0), 50.0);
        let enemy = add_enemy(&mut w, Vec2::new(510.0, 500.0), 20.0);

        let report = resolve(&mut w, &config);
        assert_eq!(report.count(AbsorptionKind::PlayerEatsEnemy), 1);
        assert_eq!(report.score, 50);
        assert!(w.enemy(enemy).is_none());
        assert_eq!(w.enemy_cells.len(), 1);
        assert!((w.piece(piece).unwrap().mass() - 66.0).abs() < 1e-4);
    }

    #[test]
    fn absorption_range_is_the_eaters_radius() {
        let (mut w, config) = world();
        // Radius of a 100-mass piece is 40; an enemy 45 away overlaps by sum of radii but not by reach.
        add_piece(&mut w, Vec2::new(500.0, 500.0), 100.0);
        add_enemy(&mut w, Vec2::new(545.0, 500.0), 20.0);
        let report = resolve(&mut w, &config);
        assert_eq!(report.count(AbsorptionKind::PlayerEatsEnemy), 0);
    }

    #[test]
    fn last_piece_eaten_ends_the_game() {
        let (mut w, config) = world();
        let piece = add_piece(&mut w, Vec2::new(500.0, 500.0), 10.0);
        let enemy = add_enemy(&mut w, Vec2::new(505.0, 500.0), 40.0);

        let report = resolve(&mut w, &config);
        assert!(report.player_eliminated);
        assert!(w.piece(piece).is_none());
        assert!((w.enemy(enemy).unwrap().mass() - 48.0).abs() < 1e-4);
        assert_eq!(report.enemies_respawned, 0);
    }

    #[test]
    fn special_enemies_are_not_replaced() {
        let (mut w, config) = world();
        add_piece(&mut w, Vec2::new(500.0, 500.0), 50.0);
        let id = w.next_id();
        w.add_enemy(Enemy::special(id, "s".into(), Vec2::new(505.0, 500.0), 10.0, 0));

        let report = resolve(&mut w, &config);
        assert_eq!(report.count(AbsorptionKind::PlayerEatsEnemy), 1);
        assert_eq!(report.enemies_respawned, 0);
        assert!(w.enemy_cells.is_empty());
    }

    #[test]
    fn pellets_skip_their_origin() {
        let (mut w, config) = world();
        let origin = add_piece(&mut w, Vec2::new(500.0, 500.0), 50.0);
        let pellet_id = w.next_id();
        w.add_eject(EjectedMass::new(pellet_id, origin, Vec2::new(502.0, 500.0), 1.0, 0));

        let report = resolve(&mut w, &config);
        assert_eq!(report.count(AbsorptionKind::PelletAbsorbed), 0);

        let sibling = add_piece(&mut w, Vec2::new(505.0, 500.0), 20.0);
        let report = resolve(&mut w, &config);
        assert_eq!(report.count(AbsorptionKind::PelletAbsorbed), 1);
        assert_eq!(report.absorptions[0].eater, sibling);
        assert_eq!(w.piece(sibling).unwrap().mass(), 21.0);
        assert!(w.eject(pellet_id).is_none());
    }

    #[test]
    fn enemies_pick_up_pellets_when_no_piece_does() {
        let (mut w, config) = world();
        let origin = add_piece(&mut w, Vec2::new(500.0, 500.0), 50.0);
        let enemy = add_enemy(&mut w, Vec2::new(900.0, 900.0), 10.0);
        let pellet_id = w.next_id();
        w.add_eject(EjectedMass::new(pellet_id, origin, Vec2::new(902.0, 900.0), 1.0, 0));

        resolve(&mut w, &config);
        assert_eq!(w.enemy(enemy).unwrap().mass(), 11.0);
    }
}
