// Domain-level simulation entities and input/snapshot types.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TankId(pub u64);

impl fmt::Display for TankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tank#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BulletId(pub u64);

impl fmt::Display for BulletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bullet#{}", self.0)
    }
}

/// Actions a control scheme can drive on a tank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TankAction {
    Forward,
    Backward,
    Left,
    Right,
    Fire,
}

/// Per-tank input snapshot.
///
/// Written by the input router between ticks, read by the controller drive during a tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,

    // Bullets owned by this tank that have not been retired yet.
    pub live_projectiles: u8,
}

impl InputState {
    pub fn is_held(&self, action: TankAction) -> bool {
        match action {
            TankAction::Forward => self.forward,
            TankAction::Backward => self.backward,
            TankAction::Left => self.left,
            TankAction::Right => self.right,
            TankAction::Fire => self.fire,
        }
    }

    pub fn set(&mut self, action: TankAction, held: bool) {
        match action {
            TankAction::Forward => self.forward = held,
            TankAction::Backward => self.backward = held,
            TankAction::Left => self.left = held,
            TankAction::Right => self.right = held,
            TankAction::Fire => self.fire = held,
        }
    }
}

/// Render colors for the two parts of a tank body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TankStyle {
    pub hull: String,
    pub turret: String,
}

impl TankStyle {
    pub fn new(hull: impl Into<String>, turret: impl Into<String>) -> Self {
        Self {
            hull: hull.into(),
            turret: turret.into(),
        }
    }

    /// Same color for hull and turret.
    pub fn solid(color: impl Into<String>) -> Self {
        let color = color.into();
        Self {
            hull: color.clone(),
            turret: color,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TankSnapshot {
    pub id: TankId,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub hull_fill: String,
    pub turret_fill: String,
    pub live_projectiles: u8,
}

#[derive(Debug, Clone)]
pub struct BulletSnapshot {
    pub id: BulletId,
    pub owner_id: TankId,
    pub x: f32,
    pub y: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_action_is_set_then_only_that_flag_changes() {
        let mut state = InputState::default();

        state.set(TankAction::Left, true);

        assert!(state.is_held(TankAction::Left));
        assert!(!state.is_held(TankAction::Right));
        assert!(!state.is_held(TankAction::Fire));
        assert_eq!(state.live_projectiles, 0);
    }

    #[test]
    fn when_action_is_released_then_flag_clears() {
        let mut state = InputState {
            fire: true,
            ..InputState::default()
        };

        state.set(TankAction::Fire, false);

        assert!(!state.fire);
    }
}
