//! Per-enemy decision logic.
//!
//! Rules are evaluated in priority order and the first match wins:
//! special pursuit, flee, hunt (pieces, then enemies, then food),
//! escort a peer, wander.

use crate::config::{AiConfig, Config};
use crate::entity::{Cell, CellType, Enemy, mass_speed};
use crate::world::World;
use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Which rule produced an enemy's velocity this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Special enemy chasing the nearest piece (`None` when the player is gone).
    Pursue { target: Option<u32> },
    /// Running from a heavier piece.
    Flee { threat: u32, cornered: bool },
    /// Chasing something lighter.
    Hunt { target: u32, prey: CellType },
    /// Keeping pack spacing with a similar-sized enemy.
    Escort { ally: u32 },
    /// Nothing to do; random heading.
    Wander,
}

/// Desired velocity plus the rule that chose it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steer {
    pub velocity: Vec2,
    pub decision: Decision,
}

/// Regular enemy speed: `base / sqrt(mass) * factor`.
#[inline]
pub fn enemy_speed(config: &Config, mass: f32) -> f32 {
    mass_speed(config.enemy.base_speed, mass) * config.enemy.speed_factor
}

/// Signed shortest rotation from `from` to `to`, in `[-PI, PI)`.
#[inline]
pub fn shortest_angle(from: f32, to: f32) -> f32 {
    (to - from + PI).rem_euclid(TAU) - PI
}

#[inline]
fn from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Turn `heading` part of the way toward `target_heading` and apply `speed`.
///
/// A resting cell has heading zero. Gaps below the turn threshold keep the
/// current heading.
pub fn smooth_turn(heading: f32, target_heading: f32, speed: f32, ai: &AiConfig) -> Vec2 {
    let diff = shortest_angle(heading, target_heading);
    let next = if diff.abs() > ai.turn_threshold {
        heading + diff * ai.turn_rate
    } else {
        heading
    };
    from_angle(next) * speed
}

fn toward(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    (to - from).normalize_or_zero() * speed
}

/// Nearest item by center distance; earlier items win ties.
fn nearest<'a, T: Cell + 'a>(
    from: Vec2,
    items: impl Iterator<Item = &'a T>,
) -> Option<(&'a T, f32)> {
    let mut best: Option<(&T, f32)> = None;
    for item in items {
        let d = from.distance(item.position());
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((item, d));
        }
    }
    best
}

/// Choose a velocity for `me`.
///
/// `wander_angle` is the random heading used if no other rule applies; callers
/// draw it up front so the decision itself stays a pure read of the world.
pub fn decide(me: &Enemy, world: &World, config: &Config, wander_angle: f32) -> Steer {
    let ai = &config.ai;
    let my_id = me.data().node_id;
    let my_pos = me.position();
    let my_mass = me.mass();
    let speed = enemy_speed(config, my_mass);

    if me.is_special {
        let target = nearest(my_pos, world.pieces());
        let velocity = target
            .map(|(piece, _)| toward(my_pos, piece.position(), speed * config.enemy.special_speed_factor))
            .unwrap_or(Vec2::ZERO);
        return Steer {
            velocity,
            decision: Decision::Pursue {
                target: target.map(|(p, _)| p.data().node_id),
            },
        };
    }

    // Flee from the closest heavier piece in alert range.
    let threat = nearest(
        my_pos,
        world.pieces().filter(|p| {
            p.mass() > my_mass * ai.threat_ratio && my_pos.distance(p.position()) < ai.alert_radius
        }),
    );
    if let Some((threat, _)) = threat {
        let cornered = world.border.is_cornered(my_pos, ai.corner_margin);
        let (escape, factor) = if cornered {
            (world.border.away_from_nearest_edge(my_pos), ai.cornered_flee_factor)
        } else {
            (my_pos - threat.position(), ai.open_flee_factor)
        };
        let target_heading = escape.y.atan2(escape.x);
        return Steer {
            velocity: smooth_turn(me.data().heading(), target_heading, speed * factor, ai),
            decision: Decision::Flee {
                threat: threat.data().node_id,
                cornered,
            },
        };
    }

    // Hunt, strictly by category: pieces, then other enemies, then food.
    let prey_limit = my_mass * ai.prey_ratio;
    let others = || world.enemies().filter(move |e| e.data().node_id != my_id);

    let hunt = nearest(my_pos, world.pieces().filter(|p| p.mass() < prey_limit))
        .map(|(p, _)| (p.data().node_id, p.position(), CellType::Player))
        .or_else(|| {
            nearest(my_pos, others().filter(|e| e.mass() < prey_limit))
                .map(|(e, _)| (e.data().node_id, e.position(), CellType::Enemy))
        })
        .or_else(|| {
            nearest(my_pos, world.foods()).map(|(f, _)| (f.data().node_id, f.position(), CellType::Food))
        });
    if let Some((target, target_pos, prey)) = hunt {
        return Steer {
            velocity: toward(my_pos, target_pos, speed),
            decision: Decision::Hunt { target, prey },
        };
    }

    // Keep loose spacing with the nearest similar-sized enemy.
    let low = my_mass * (1.0 - ai.peer_tolerance);
    let high = my_mass * (1.0 + ai.peer_tolerance);
    if let Some((ally, dist)) = nearest(my_pos, others().filter(|e| e.mass() > low && e.mass() < high)) {
        let velocity = if dist > ai.ally_far {
            toward(my_pos, ally.position(), speed)
        } else if dist < ai.ally_near {
            toward(ally.position(), my_pos, speed)
        } else {
            Vec2::ZERO
        };
        return Steer {
            velocity,
            decision: Decision::Escort {
                ally: ally.data().node_id,
            },
        };
    }

    Steer {
        velocity: from_angle(wander_angle) * speed,
        decision: Decision::Wander,
    }
}
