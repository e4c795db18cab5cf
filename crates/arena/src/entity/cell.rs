//! Base cell type and common functionality.

use contract::Color;
use glam::Vec2;

/// Radius grows with the square root of mass: `radius = sqrt(mass) * RADIUS_SCALE`.
pub const RADIUS_SCALE: f32 = 4.0;

/// Smallest mass a live cell can hold. Keeps radius and speed finite.
pub const MIN_MASS: f32 = 0.01;

/// Cell variant tag.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellType {
    /// A piece of the player's cell.
    #[default]
    Player = 0,
    /// AI-controlled cell.
    Enemy = 1,
    /// Static food particle.
    Food = 2,
    /// Pellet thrown out by an eject action.
    EjectedMass = 3,
}

/// Compute the radius of a cell with the given mass.
#[inline]
pub fn mass_to_radius(mass: f32) -> f32 {
    mass.max(MIN_MASS).sqrt() * RADIUS_SCALE
}

/// Speed of a cell of `mass` given a speed numerator: `base / sqrt(mass)`.
#[inline]
pub fn mass_speed(base: f32, mass: f32) -> f32 {
    base / mass.max(MIN_MASS).sqrt()
}

/// Common cell data shared by all cell types.
#[derive(Debug, Clone)]
pub struct CellData {
    /// Unique node ID, never reused within a round.
    pub node_id: u32,
    /// Cell type.
    pub cell_type: CellType,
    /// Position in world coordinates.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Cell color.
    pub color: Color,
    /// Simulation time (ms) when the cell was created.
    pub born_at_ms: u64,
    mass: f32,
    radius: f32,
}

impl CellData {
    /// Create new cell data.
    pub fn new(node_id: u32, cell_type: CellType, position: Vec2, mass: f32, now_ms: u64) -> Self {
        let mass = mass.max(MIN_MASS);
        Self {
            node_id,
            cell_type,
            position,
            velocity: Vec2::ZERO,
            color: Color::default(),
            born_at_ms: now_ms,
            mass,
            radius: mass_to_radius(mass),
        }
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Absorption reach; always `sqrt(mass) * 4`.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Set the cell mass and update radius.
    #[inline]
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass.max(MIN_MASS);
        self.radius = mass_to_radius(self.mass);
    }

    /// Add (or with a negative amount, remove) mass.
    #[inline]
    pub fn add_mass(&mut self, amount: f32) {
        self.set_mass(self.mass + amount);
    }

    /// Whether `point` lies strictly inside this cell's absorption radius.
    #[inline]
    pub fn reaches(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) < self.radius * self.radius
    }

    /// Heading of the current velocity in radians; zero when at rest.
    #[inline]
    pub fn heading(&self) -> f32 {
        self.velocity.y.atan2(self.velocity.x)
    }
}

/// Trait for all cell types.
pub trait Cell {
    /// Get the common cell data.
    fn data(&self) -> &CellData;

    /// Get mutable cell data.
    fn data_mut(&mut self) -> &mut CellData;

    #[inline]
    fn position(&self) -> Vec2 {
        self.data().position
    }

    #[inline]
    fn mass(&self) -> f32 {
        self.data().mass()
    }

    #[inline]
    fn radius(&self) -> f32 {
        self.data().radius()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_tracks_every_mass_change() {
        let mut data = CellData::new(1, CellType::Enemy, Vec2::ZERO, 10.0, 0);
        assert!((data.radius() - 10f32.sqrt() * 4.0).abs() < 1e-5);

        data.add_mass(2.0);
        assert!((data.radius() - 12f32.sqrt() * 4.0).abs() < 1e-5);

        data.set_mass(100.0);
        assert_eq!(data.radius(), 40.0);
    }

    #[test]
    fn mass_never_reaches_zero() {
        let mut data = CellData::new(1, CellType::Player, Vec2::ZERO, 1.0, 0);
        data.add_mass(-5.0);
        assert!(data.mass() > 0.0);
        assert!(mass_speed(400.0, data.mass()).is_finite());
    }

    #[test]
    fn reach_is_strict_and_uses_own_radius() {
        let data = CellData::new(1, CellType::Player, Vec2::ZERO, 100.0, 0);
        assert!(data.reaches(Vec2::new(39.9, 0.0)));
        assert!(!data.reaches(Vec2::new(40.0, 0.0)));
    }

    #[test]
    fn speed_falls_with_mass() {
        assert_eq!(mass_speed(400.0, 100.0), 40.0);
        assert!(mass_speed(400.0, 400.0) < mass_speed(400.0, 100.0));
    }
}
