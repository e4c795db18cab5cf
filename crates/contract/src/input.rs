//! Input state handed to the simulation once per tick.

use crate::Position;

/// Continuous movement state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Steering {
    /// No movement input; pieces stop.
    #[default]
    Idle,
    /// Pieces steer toward a world-space pointer.
    Pointer(Position),
    /// Arrow-key style steering; each axis is independent.
    Keys {
        up: bool,
        down: bool,
        left: bool,
        right: bool,
    },
}

/// Discrete, edge-triggered player commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Split every splittable piece (Space).
    Split,
    /// Eject one pellet from the primary piece (W).
    Eject,
}

/// Everything the core needs from the input layer for one tick.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    pub steering: Steering,
    /// Pointer used to aim splits and ejections, even under key steering.
    pub aim: Option<Position>,
    pub commands: Vec<Command>,
}

impl InputFrame {
    /// Frame steering toward `pointer` and aiming at it.
    pub fn pointer(pointer: Position) -> Self {
        Self {
            steering: Steering::Pointer(pointer),
            aim: Some(pointer),
            commands: Vec::new(),
        }
    }

    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Aim point: the explicit aim, else the steering pointer.
    pub fn aim_point(&self) -> Option<Position> {
        match (self.aim, self.steering) {
            (Some(aim), _) => Some(aim),
            (None, Steering::Pointer(p)) => Some(p),
            _ => None,
        }
    }
}

/// Source of per-tick input.
pub trait InputSource {
    /// Poll the input for the coming tick.
    fn poll(&mut self) -> InputFrame;
}

/// Edge detector for a held key: fires once per press.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyLatch {
    pressed: bool,
    prev_pressed: bool,
}

impl KeyLatch {
    /// Record the key state for this frame and report whether it was just pressed.
    pub fn update(&mut self, pressed: bool) -> bool {
        self.prev_pressed = self.pressed;
        self.pressed = pressed;
        self.just_pressed()
    }

    /// Transition from not pressed to pressed.
    pub fn just_pressed(&self) -> bool {
        self.pressed && !self.prev_pressed
    }
}
