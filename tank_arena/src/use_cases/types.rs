// Use-case level inputs/outputs for the simulation loop.

use crate::domain::{BulletSnapshot, TankSnapshot};
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// Maps a raw button code (0 = left, 1 = middle, 2 = right).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Middle),
            2 => Some(MouseButton::Right),
            _ => None,
        }
    }
}

/// Raw input as delivered by the host, independent of any tank.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    MouseMove(Vec2),
}

#[derive(Debug, Clone)]
pub struct WorldUpdate {
    pub tick: u64,
    pub tanks: Vec<TankSnapshot>,
    pub bullets: Vec<BulletSnapshot>,
}
