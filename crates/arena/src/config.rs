//! Arena configuration.
//!
//! Every balance constant of the simulation lives here. Defaults reproduce the
//! reference tuning; a `arena.toml` file can override any of them.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "arena.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub enemy: EnemyConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub predation: PredationConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub eject: EjectConfig,
}

impl Config {
    /// Load configuration from `arena.toml`, writing the defaults if it is missing.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            info!("No {} found, creating default config", CONFIG_FILE);
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }

    /// Load and validate configuration from an explicit path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        if w.size <= 0.0 {
            return Err(ConfigError::invalid("world.size", "must be positive"));
        }
        if w.spawn_margin < 0.0 || w.size <= w.spawn_margin * 2.0 {
            return Err(ConfigError::invalid(
                "world.spawn_margin",
                "must be non-negative and leave room to spawn",
            ));
        }
        if w.tick_interval_ms == 0 {
            return Err(ConfigError::invalid("world.tick_interval_ms", "must be positive"));
        }
        if self.player.start_mass <= 0.0 {
            return Err(ConfigError::invalid("player.start_mass", "must be positive"));
        }
        if self.enemy.start_mass <= 0.0 {
            return Err(ConfigError::invalid("enemy.start_mass", "must be positive"));
        }
        if self.enemy.base_speed <= 0.0 || self.player.pointer_speed <= 0.0 {
            return Err(ConfigError::invalid("speed", "base speeds must be positive"));
        }
        if self.enemy.special_interval_ms == 0 {
            return Err(ConfigError::invalid("enemy.special_interval_ms", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.enemy.eject_chance) {
            return Err(ConfigError::invalid("enemy.eject_chance", "must lie in [0, 1]"));
        }
        if self.split.impulse_ms == 0 {
            return Err(ConfigError::invalid("split.impulse_ms", "must be positive"));
        }
        if self.enemy.names.is_empty() {
            return Err(ConfigError::invalid("enemy.names", "name pool cannot be empty"));
        }
        if self.predation.eat_ratio < 1.0 {
            return Err(ConfigError::invalid(
                "predation.eat_ratio",
                "an eater must be at least as heavy as its prey",
            ));
        }
        if !(0.0..=1.0).contains(&self.predation.transfer_ratio) {
            return Err(ConfigError::invalid("predation.transfer_ratio", "must lie in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.ai.turn_rate) {
            return Err(ConfigError::invalid("ai.turn_rate", "must lie in [0, 1]"));
        }
        if self.ai.ally_near > self.ai.ally_far {
            return Err(ConfigError::invalid("ai.ally_near", "must not exceed ai.ally_far"));
        }
        if self.split.commit_min_mass > self.split.min_mass {
            return Err(ConfigError::invalid(
                "split.commit_min_mass",
                "must not exceed split.min_mass",
            ));
        }
        if self.eject.pellet_mass <= 0.0 || self.eject.mass_floor <= 0.0 {
            return Err(ConfigError::invalid("eject", "pellet mass and mass floor must be positive"));
        }
        Ok(())
    }
}

/// World size, populations and clock.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    /// Side of the square world.
    #[serde(default = "default_world_size")]
    pub size: f32,
    /// Random spawns stay this far from every edge.
    #[serde(default = "default_spawn_margin")]
    pub spawn_margin: f32,
    /// Food items kept alive at all times.
    #[serde(default = "default_food_count")]
    pub food_count: usize,
    /// Normal enemies kept alive at all times.
    #[serde(default = "default_enemy_count")]
    pub enemy_count: usize,
    /// Simulation step in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// RNG seed; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: default_world_size(),
            spawn_margin: default_spawn_margin(),
            food_count: default_food_count(),
            enemy_count: default_enemy_count(),
            tick_interval_ms: default_tick_interval(),
            seed: None,
        }
    }
}

fn default_world_size() -> f32 {
    2000.0
}
fn default_spawn_margin() -> f32 {
    50.0
}
fn default_food_count() -> usize {
    50
}
fn default_enemy_count() -> usize {
    20
}
fn default_tick_interval() -> u64 {
    16
}

/// Player piece settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_start_mass")]
    pub start_mass: f32,
    /// Pointer steering speed numerator (`speed / sqrt(mass)`).
    #[serde(default = "default_pointer_speed")]
    pub pointer_speed: f32,
    /// Key steering speed numerator (`speed / sqrt(mass)`).
    #[serde(default = "default_key_speed")]
    pub key_speed: f32,
    #[serde(default = "default_player_name")]
    pub default_name: String,
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start_mass: default_start_mass(),
            pointer_speed: default_pointer_speed(),
            key_speed: default_key_speed(),
            default_name: default_player_name(),
            max_name_length: default_max_name_length(),
        }
    }
}

fn default_start_mass() -> f32 {
    10.0
}
fn default_pointer_speed() -> f32 {
    400.0
}
fn default_key_speed() -> f32 {
    200.0
}
fn default_player_name() -> String {
    "Player".to_string()
}
fn default_max_name_length() -> usize {
    30
}

/// Enemy spawning and speed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnemyConfig {
    #[serde(default = "default_start_mass")]
    pub start_mass: f32,
    /// Speed numerator before the speed factor.
    #[serde(default = "default_enemy_base_speed")]
    pub base_speed: f32,
    #[serde(default = "default_enemy_speed_factor")]
    pub speed_factor: f32,
    #[serde(default = "default_special_speed_factor")]
    pub special_speed_factor: f32,
    /// Interval between special enemy spawns.
    #[serde(default = "default_special_interval")]
    pub special_interval_ms: u64,
    /// Distance from the primary piece at which specials appear.
    #[serde(default = "default_special_distance")]
    pub special_spawn_distance: f32,
    /// Per-tick probability that a normal enemy ejects a pellet.
    #[serde(default = "default_enemy_eject_chance")]
    pub eject_chance: f64,
    /// Display names, drawn without replacement.
    #[serde(default = "default_enemy_names")]
    pub names: Vec<String>,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            start_mass: default_start_mass(),
            base_speed: default_enemy_base_speed(),
            speed_factor: default_enemy_speed_factor(),
            special_speed_factor: default_special_speed_factor(),
            special_interval_ms: default_special_interval(),
            special_spawn_distance: default_special_distance(),
            eject_chance: default_enemy_eject_chance(),
            names: default_enemy_names(),
        }
    }
}

fn default_enemy_base_speed() -> f32 {
    400.0
}
fn default_enemy_speed_factor() -> f32 {
    0.8
}
fn default_special_speed_factor() -> f32 {
    1.2
}
fn default_special_interval() -> u64 {
    60_000
}
fn default_special_distance() -> f32 {
    300.0
}
fn default_enemy_eject_chance() -> f64 {
    0.002
}
fn default_enemy_names() -> Vec<String> {
    [
        "Qin Shi Huang", "Emperor Wu", "Taizong", "Genghis Khan", "Kangxi",
        "Napoleon", "Alexander", "Caesar", "Da Vinci", "Einstein",
        "Newton", "Shakespeare", "Beethoven", "Mozart", "Darwin",
        "Galileo", "Copernicus", "Edison", "Tesla", "Marie Curie",
        "Confucius", "Laozi", "Zhuangzi", "Mencius", "Sun Tzu",
        "Socrates", "Plato", "Aristotle", "Archimedes", "Euclid",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Enemy decision thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    /// Threats farther than this are ignored.
    #[serde(default = "default_alert_radius")]
    pub alert_radius: f32,
    /// A piece heavier than `mass * threat_ratio` is a threat.
    #[serde(default = "default_ratio_high")]
    pub threat_ratio: f32,
    /// Anything lighter than `mass * prey_ratio` is prey.
    #[serde(default = "default_ratio_low")]
    pub prey_ratio: f32,
    /// Peers are within `mass * (1 ± peer_tolerance)`.
    #[serde(default = "default_peer_tolerance")]
    pub peer_tolerance: f32,
    #[serde(default = "default_corner_margin")]
    pub corner_margin: f32,
    /// Fraction of the angular gap closed per tick while fleeing.
    #[serde(default = "default_turn_rate")]
    pub turn_rate: f32,
    /// Angular gaps (radians) below this do not turn at all.
    #[serde(default = "default_turn_threshold")]
    pub turn_threshold: f32,
    #[serde(default = "default_cornered_flee_factor")]
    pub cornered_flee_factor: f32,
    #[serde(default = "default_open_flee_factor")]
    pub open_flee_factor: f32,
    #[serde(default = "default_ally_near")]
    pub ally_near: f32,
    #[serde(default = "default_ally_far")]
    pub ally_far: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            alert_radius: default_alert_radius(),
            threat_ratio: default_ratio_high(),
            prey_ratio: default_ratio_low(),
            peer_tolerance: default_peer_tolerance(),
            corner_margin: default_corner_margin(),
            turn_rate: default_turn_rate(),
            turn_threshold: default_turn_threshold(),
            cornered_flee_factor: default_cornered_flee_factor(),
            open_flee_factor: default_open_flee_factor(),
            ally_near: default_ally_near(),
            ally_far: default_ally_far(),
        }
    }
}

fn default_alert_radius() -> f32 {
    300.0
}
fn default_ratio_high() -> f32 {
    1.1
}
fn default_ratio_low() -> f32 {
    0.9
}
fn default_peer_tolerance() -> f32 {
    0.1
}
fn default_corner_margin() -> f32 {
    100.0
}
fn default_turn_rate() -> f32 {
    0.05
}
fn default_turn_threshold() -> f32 {
    0.1
}
fn default_cornered_flee_factor() -> f32 {
    1.1
}
fn default_open_flee_factor() -> f32 {
    0.9
}
fn default_ally_near() -> f32 {
    100.0
}
fn default_ally_far() -> f32 {
    200.0
}

/// Absorption rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PredationConfig {
    /// An eater must be heavier than `prey * eat_ratio`.
    #[serde(default = "default_ratio_high")]
    pub eat_ratio: f32,
    /// Share of the prey's mass the eater keeps.
    #[serde(default = "default_transfer_ratio")]
    pub transfer_ratio: f32,
    /// Flat mass gained per food item.
    #[serde(default = "default_food_mass")]
    pub food_mass: f32,
    #[serde(default = "default_food_score")]
    pub food_score: u64,
    #[serde(default = "default_enemy_score")]
    pub enemy_score: u64,
}

impl Default for PredationConfig {
    fn default() -> Self {
        Self {
            eat_ratio: default_ratio_high(),
            transfer_ratio: default_transfer_ratio(),
            food_mass: default_food_mass(),
            food_score: default_food_score(),
            enemy_score: default_enemy_score(),
        }
    }
}

fn default_transfer_ratio() -> f32 {
    0.8
}
fn default_food_mass() -> f32 {
    2.0
}
fn default_food_score() -> u64 {
    10
}
fn default_enemy_score() -> u64 {
    50
}

/// Cell division.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SplitConfig {
    /// Pieces must be heavier than this to split.
    #[serde(default = "default_split_min")]
    pub min_mass: f32,
    /// Re-checked right before committing a split.
    #[serde(default = "default_split_commit_min")]
    pub commit_min_mass: f32,
    /// Multiplier on the pointer distance for the sling impulse.
    #[serde(default = "default_impulse_factor")]
    pub impulse_factor: f32,
    /// How long the sling impulse lasts.
    #[serde(default = "default_impulse_ms")]
    pub impulse_ms: u64,
    /// Speed factor applied once the impulse settles.
    #[serde(default = "default_settle_factor")]
    pub settle_speed_factor: f32,
    #[serde(default = "default_cooldown_base")]
    pub cooldown_base_ms: u64,
    /// Extra cooldown per unit of pre-split mass.
    #[serde(default = "default_cooldown_per_mass")]
    pub cooldown_per_mass_ms: f32,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            min_mass: default_split_min(),
            commit_min_mass: default_split_commit_min(),
            impulse_factor: default_impulse_factor(),
            impulse_ms: default_impulse_ms(),
            settle_speed_factor: default_settle_factor(),
            cooldown_base_ms: default_cooldown_base(),
            cooldown_per_mass_ms: default_cooldown_per_mass(),
        }
    }
}

fn default_split_min() -> f32 {
    100.0
}
fn default_split_commit_min() -> f32 {
    35.0
}
fn default_impulse_factor() -> f32 {
    10.0
}
fn default_impulse_ms() -> u64 {
    100
}
fn default_settle_factor() -> f32 {
    0.8
}
fn default_cooldown_base() -> u64 {
    30_000
}
fn default_cooldown_per_mass() -> f32 {
    10.0
}

/// Mass ejection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EjectConfig {
    /// Ejecting requires more mass than this.
    #[serde(default = "default_eject_min_mass")]
    pub min_mass: f32,
    /// Ejecting never leaves the origin below this.
    #[serde(default = "default_eject_min_mass")]
    pub mass_floor: f32,
    #[serde(default = "default_pellet_mass")]
    pub pellet_mass: f32,
    #[serde(default = "default_eject_speed")]
    pub speed: f32,
    #[serde(default = "default_pellet_lifetime")]
    pub lifetime_ms: u64,
}

impl Default for EjectConfig {
    fn default() -> Self {
        Self {
            min_mass: default_eject_min_mass(),
            mass_floor: default_eject_min_mass(),
            pellet_mass: default_pellet_mass(),
            speed: default_eject_speed(),
            lifetime_ms: default_pellet_lifetime(),
        }
    }
}

fn default_eject_min_mass() -> f32 {
    10.0
}
fn default_eject_speed() -> f32 {
    400.0
}
fn default_pellet_mass() -> f32 {
    1.0
}
fn default_pellet_lifetime() -> u64 {
    3000
}
