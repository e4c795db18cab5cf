//! Motion: input steering and velocity integration with border clamping.

use crate::config::Config;
use crate::entity::mass_speed;
use crate::world::{CellEntry, World};
use contract::Steering;
use glam::Vec2;

/// Pointers closer than this to a piece leave it at rest.
const POINTER_DEADZONE: f32 = 1.0;

/// Set player piece velocities from the steering input.
///
/// Pieces still riding a split impulse keep their velocity.
pub fn steer_pieces(world: &mut World, steering: Steering, config: &Config) {
    let pointer_speed = config.player.pointer_speed;
    let key_speed = config.player.key_speed;

    for i in 0..world.player_cells.len() {
        let id = world.player_cells[i];
        let Some(piece) = world.piece_mut(id) else {
            continue;
        };
        if piece.is_boosting() {
            continue;
        }
        let data = &mut piece.cell_data;
        data.velocity = match steering {
            Steering::Idle => Vec2::ZERO,
            Steering::Pointer(pointer) => {
                let delta = pointer - data.position;
                let dist = delta.length();
                if dist < POINTER_DEADZONE {
                    Vec2::ZERO
                } else {
                    delta / dist * mass_speed(pointer_speed, data.mass())
                }
            }
            Steering::Keys { up, down, left, right } => {
                let speed = mass_speed(key_speed, data.mass());
                let x = if left {
                    -speed
                } else if right {
                    speed
                } else {
                    0.0
                };
                let y = if up {
                    -speed
                } else if down {
                    speed
                } else {
                    0.0
                };
                Vec2::new(x, y)
            }
        };
    }
}

/// Apply every moving cell's velocity for `dt` seconds and clamp it inside the world.
///
/// Food never moves.
pub fn integrate(world: &mut World, dt: f32) {
    let border = world.border;
    for cell in world.cells.values_mut() {
        if matches!(cell, CellEntry::Food(_)) {
            continue;
        }
        let data = cell.data_mut();
        if data.velocity == Vec2::ZERO {
            continue;
        }
        let next = data.position + data.velocity * dt;
        data.position = border.clamp_circle(next, data.radius());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Cell, Enemy, PlayerPiece};

    fn setup() -> (World, Config, u32) {
        let mut config = Config::default();
        config.world.seed = Some(5);
        let mut world = World::new(&config);
        let id = world.next_id();
        world.add_piece(PlayerPiece::new(id, Vec2::new(1000.0, 1000.0), 100.0, 0));
        (world, config, id)
    }

    #[test]
    fn pointer_steering_uses_mass_scaled_speed() {
        let (mut world, config, id) = setup();
        steer_pieces(&mut world, Steering::Pointer(Vec2::new(1500.0, 1000.0)), &config);
        let v = world.piece(id).unwrap().cell_data.velocity;
        assert!((v.x - 40.0).abs() < 1e-4);
        assert_eq!(v.y, 0.0);

        steer_pieces(&mut world, Steering::Pointer(Vec2::new(1000.5, 1000.0)), &config);
        assert_eq!(world.piece(id).unwrap().cell_data.velocity, Vec2::ZERO);
    }

    #[test]
    fn key_steering_moves_each_axis() {
        let (mut world, config, id) = setup();
        let keys = Steering::Keys { up: true, down: false, left: true, right: false };
        steer_pieces(&mut world, keys, &config);
        assert_eq!(world.piece(id).unwrap().cell_data.velocity, Vec2::new(-20.0, -20.0));
    }

    #[test]
    fn boosting_pieces_are_not_steered() {
        let (mut world, config, id) = setup();
        {
            let piece = world.piece_mut(id).unwrap();
            piece.boost_heading = Some(Vec2::X);
            piece.cell_data.velocity = Vec2::new(5000.0, 0.0);
        }
        steer_pieces(&mut world, Steering::Idle, &config);
        assert_eq!(world.piece(id).unwrap().cell_data.velocity, Vec2::new(5000.0, 0.0));
    }

    #[test]
    fn integration_clamps_to_world() {
        let (mut world, _config, id) = setup();
        world.piece_mut(id).unwrap().cell_data.velocity = Vec2::new(-3000.0, 0.0);
        let enemy_id = world.next_id();
        let mut enemy = Enemy::new(enemy_id, "e".into(), Vec2::new(500.0, 500.0), 10.0, 0);
        enemy.data_mut().velocity = Vec2::new(0.0, 100.0);
        world.add_enemy(enemy);

        integrate(&mut world, 0.5);

        let piece = world.piece(id).unwrap();
        assert_eq!(piece.position(), Vec2::new(40.0, 1000.0));
        assert_eq!(world.enemy(enemy_id).unwrap().position(), Vec2::new(500.0, 550.0));
    }
}
