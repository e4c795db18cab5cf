//! Shared contract crate for the blob arena.
//!
//! This crate contains:
//! - Shared types (Color, Position)
//! - Draw items handed to a renderer
//! - Input state and edge-triggered commands
//! - The collaborator traits the simulation core talks to

mod input;
mod render;

pub use input::{Command, InputFrame, InputSource, KeyLatch, Steering};
pub use render::{CircleSprite, Hud, LeaderboardRow, NameLabel, Renderer, RestartPrompt};

/// RGB color used for cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::new(0xff, 0x00, 0x00);
    pub const GREEN: Color = Color::new(0x00, 0xff, 0x00);
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a packed `0xRRGGBB` value.
    pub const fn from_rgb24(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        }
    }

    pub const fn to_rgb24(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// Represents a 2D position using glam's Vec2.
pub type Position = glam::Vec2;
