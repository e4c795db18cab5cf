//! Draw items and the front-end traits the core renders through.

use crate::{Color, Position};

/// A filled circle, optionally stroked (special enemies).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleSprite {
    pub position: Position,
    pub radius: f32,
    pub fill: Color,
    pub stroke: Option<Color>,
}

/// Text drawn centered on an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct NameLabel {
    pub position: Position,
    pub text: String,
}

/// One leaderboard line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub name: String,
    pub score: u64,
    pub is_player: bool,
}

/// Heads-up display values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hud {
    pub score: u64,
    pub pieces: usize,
}

/// Something that can draw a frame.
///
/// Rows passed to [`Renderer::leaderboard`] are already sorted by score, descending.
pub trait Renderer {
    fn circle(&mut self, sprite: &CircleSprite);
    fn label(&mut self, label: &NameLabel);
    fn leaderboard(&mut self, rows: &[LeaderboardRow]);
    fn hud(&mut self, hud: &Hud);
}

/// Asked once the player has no pieces left.
pub trait RestartPrompt {
    /// Return `true` to start a fresh round, `false` to halt.
    fn restart(&mut self, final_score: u64) -> bool;
}
