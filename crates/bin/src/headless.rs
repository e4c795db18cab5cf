//! Headless front-end: a scripted player, a log-backed renderer and a restart policy.

use arena::Session;
use arena::entity::Cell;
use contract::{
    CircleSprite, Command, Hud, InputFrame, InputSource, KeyLatch, LeaderboardRow, NameLabel, Renderer,
    RestartPrompt, Steering,
};
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Scripted player: runs from threats, chases prey and food, splits on close prey.
pub struct Autopilot {
    rng: SmallRng,
    pointer: Option<Vec2>,
    split_key: KeyLatch,
    eject_key: KeyLatch,
    wander: Vec2,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            pointer: None,
            split_key: KeyLatch::default(),
            eject_key: KeyLatch::default(),
            wander: Vec2::ZERO,
        }
    }

    /// Look at the world and decide what the keys and pointer do next.
    pub fn observe(&mut self, session: &Session) {
        let world = session.world();
        let config = session.config();
        let Some(primary) = world.primary_piece() else {
            self.pointer = None;
            self.split_key.update(false);
            self.eject_key.update(false);
            return;
        };
        let pos = primary.position();
        let mass = primary.mass();
        let ratio = config.predation.eat_ratio;
        let alert = config.ai.alert_radius;

        let threat = world
            .enemies()
            .filter(|e| e.mass() > mass * ratio && e.position().distance(pos) < alert)
            .min_by(|a, b| a.position().distance(pos).total_cmp(&b.position().distance(pos)));
        let prey = world
            .enemies()
            .filter(|e| mass > e.mass() * ratio)
            .min_by(|a, b| a.position().distance(pos).total_cmp(&b.position().distance(pos)));
        let food = world
            .foods()
            .min_by(|a, b| a.position().distance(pos).total_cmp(&b.position().distance(pos)));

        let mut want_split = false;
        self.pointer = if let Some(threat) = threat {
            Some(pos + (pos - threat.position()))
        } else if let Some(prey) = prey {
            let dist = prey.position().distance(pos);
            want_split = mass > config.split.min_mass * 2.0 && dist < primary.data().radius() * 4.0;
            Some(prey.position())
        } else if let Some(food) = food {
            Some(food.position())
        } else {
            if self.wander == Vec2::ZERO || self.rng.random_bool(0.01) {
                self.wander = world.border.random_position(&mut self.rng, config.world.spawn_margin);
            }
            Some(self.wander)
        };

        self.split_key.update(want_split);
        let want_eject = threat.is_none() && mass > 50.0 && self.rng.random_bool(0.005);
        self.eject_key.update(want_eject);
    }
}

impl InputSource for Autopilot {
    fn poll(&mut self) -> InputFrame {
        let mut frame = match self.pointer {
            Some(pointer) => InputFrame::pointer(pointer),
            None => InputFrame {
                steering: Steering::Idle,
                ..Default::default()
            },
        };
        if self.split_key.just_pressed() {
            frame.commands.push(Command::Split);
        }
        if self.eject_key.just_pressed() {
            frame.commands.push(Command::Eject);
        }
        frame
    }
}

/// Renderer that tallies draw calls and logs the leaderboard and HUD.
#[derive(Debug, Default)]
pub struct LogRenderer {
    circles: usize,
    labels: usize,
    top: Vec<LeaderboardRow>,
}

impl Renderer for LogRenderer {
    fn circle(&mut self, _sprite: &CircleSprite) {
        self.circles += 1;
    }

    fn label(&mut self, _label: &NameLabel) {
        self.labels += 1;
    }

    fn leaderboard(&mut self, rows: &[LeaderboardRow]) {
        self.top = rows.iter().take(5).cloned().collect();
    }

    fn hud(&mut self, hud: &Hud) {
        let top: Vec<String> = self
            .top
            .iter()
            .map(|row| {
                if row.is_player {
                    format!("*{}* {}", row.name, row.score)
                } else {
                    format!("{} {}", row.name, row.score)
                }
            })
            .collect();
        info!(
            "Score {} | {} pieces | {} circles, {} labels | top: {}",
            hud.score,
            hud.pieces,
            self.circles,
            self.labels,
            top.join(", ")
        );
        self.circles = 0;
        self.labels = 0;
    }
}

/// Accepts a fixed number of restarts, then declines.
#[derive(Debug)]
pub struct RoundLimit {
    remaining: u32,
    pub final_scores: Vec<u64>,
}

impl RoundLimit {
    pub fn new(restarts: u32) -> Self {
        Self {
            remaining: restarts,
            final_scores: Vec::new(),
        }
    }
}

impl RestartPrompt for RoundLimit {
    fn restart(&mut self, final_score: u64) -> bool {
        self.final_scores.push(final_score);
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
