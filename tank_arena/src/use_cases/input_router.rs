// Routes raw input events to the tank bound to them.

use crate::domain::state::{TankAction, TankId};
use crate::use_cases::types::MouseButton;
use glam::Vec2;
use std::collections::HashMap;

/// Key names for each tank action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub fire: String,
}

impl KeyBindings {
    /// W/S/A/D to drive, E to fire.
    pub fn wasd() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            fire: "e".to_string(),
        }
    }

    fn by_key(&self) -> HashMap<String, TankAction> {
        [
            (self.forward.clone(), TankAction::Forward),
            (self.backward.clone(), TankAction::Backward),
            (self.left.clone(), TankAction::Left),
            (self.right.clone(), TankAction::Right),
            (self.fire.clone(), TankAction::Fire),
        ]
        .into_iter()
        .collect()
    }
}

#[derive(Debug, Default)]
pub struct KeyboardRegistry {
    bindings: Vec<(HashMap<String, TankAction>, TankId)>,
}

impl KeyboardRegistry {
    /// Registers `tank`, replacing any earlier entry for it.
    pub fn attach(&mut self, tank: TankId, bindings: &KeyBindings) {
        self.detach(tank);
        self.bindings.push((bindings.by_key(), tank));
    }

    /// Returns how many entries were removed.
    pub fn detach(&mut self, tank: TankId) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|(_, bound)| *bound != tank);
        before - self.bindings.len()
    }

    /// First binding that knows `key`.
    pub fn route_down(&self, key: &str) -> Option<(TankId, TankAction)> {
        self.bindings
            .iter()
            .find_map(|(map, tank)| map.get(key).map(|action| (*tank, *action)))
    }

    /// Every binding that knows `key`.
    pub fn route_up(&self, key: &str) -> Vec<(TankId, TankAction)> {
        self.bindings
            .iter()
            .filter_map(|(map, tank)| map.get(key).map(|action| (*tank, *action)))
            .collect()
    }

    pub fn is_attached(&self, tank: TankId) -> bool {
        self.bindings.iter().any(|(_, bound)| *bound == tank)
    }
}

#[derive(Debug, Default)]
pub struct MouseRegistry {
    bindings: Vec<(MouseButton, TankId)>,
    pointer: Vec2,
}

impl MouseRegistry {
    /// Registers `tank`, replacing any earlier entry for it.
    pub fn attach(&mut self, tank: TankId, fire: MouseButton) {
        self.detach(tank);
        self.bindings.push((fire, tank));
    }

    pub fn detach(&mut self, tank: TankId) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|(_, bound)| *bound != tank);
        before - self.bindings.len()
    }

    /// Only the first registered binding is ever considered for a press.
    pub fn route_down(&self, button: MouseButton) -> Option<TankId> {
        self.bindings
            .first()
            .filter(|(fire, _)| *fire == button)
            .map(|(_, tank)| *tank)
    }

    /// First binding whose fire button matches.
    pub fn route_up(&self, button: MouseButton) -> Option<TankId> {
        self.bindings
            .iter()
            .find(|(fire, _)| *fire == button)
            .map(|(_, tank)| *tank)
    }

    pub fn is_attached(&self, tank: TankId) -> bool {
        self.bindings.iter().any(|(_, bound)| *bound == tank)
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn set_pointer(&mut self, pointer: Vec2) {
        self.pointer = pointer;
    }
}

/// Owns both input registries for one simulation.
#[derive(Debug, Default)]
pub struct InputRouter {
    keyboard: KeyboardRegistry,
    mouse: MouseRegistry,
}

impl InputRouter {
    pub fn keyboard(&self) -> &KeyboardRegistry {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyboardRegistry {
        &mut self.keyboard
    }

    pub fn mouse(&self) -> &MouseRegistry {
        &self.mouse
    }

    pub fn mouse_mut(&mut self) -> &mut MouseRegistry {
        &mut self.mouse
    }

    pub fn pointer(&self) -> Vec2 {
        self.mouse.pointer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrows() -> KeyBindings {
        KeyBindings {
            forward: "ArrowUp".to_string(),
            backward: "ArrowDown".to_string(),
            left: "ArrowLeft".to_string(),
            right: "ArrowRight".to_string(),
            fire: " ".to_string(),
        }
    }

    #[test]
    fn when_key_is_bound_then_route_down_finds_tank_and_action() {
        let mut keyboard = KeyboardRegistry::default();
        keyboard.attach(TankId(1), &KeyBindings::wasd());
        keyboard.attach(TankId(2), &arrows());

        assert_eq!(keyboard.route_down("a"), Some((TankId(1), TankAction::Left)));
        assert_eq!(keyboard.route_down(" "), Some((TankId(2), TankAction::Fire)));
        assert_eq!(keyboard.route_down("q"), None);
    }

    #[test]
    fn when_two_tanks_share_a_key_then_press_goes_to_first_and_release_to_both() {
        let mut keyboard = KeyboardRegistry::default();
        keyboard.attach(TankId(1), &KeyBindings::wasd());
        keyboard.attach(TankId(2), &KeyBindings::wasd());

        assert_eq!(keyboard.route_down("w"), Some((TankId(1), TankAction::Forward)));
        assert_eq!(
            keyboard.route_up("w"),
            vec![(TankId(1), TankAction::Forward), (TankId(2), TankAction::Forward)]
        );
    }

    #[test]
    fn when_tank_attaches_twice_then_it_has_one_entry() {
        let mut keyboard = KeyboardRegistry::default();
        keyboard.attach(TankId(1), &KeyBindings::wasd());
        keyboard.attach(TankId(1), &arrows());

        assert_eq!(keyboard.detach(TankId(1)), 1);
        assert!(!keyboard.is_attached(TankId(1)));
        assert_eq!(keyboard.detach(TankId(1)), 0);
    }

    #[test]
    fn when_first_mouse_binding_does_not_match_then_later_bindings_are_ignored() {
        let mut mouse = MouseRegistry::default();
        mouse.attach(TankId(1), MouseButton::Right);
        mouse.attach(TankId(2), MouseButton::Left);

        assert_eq!(mouse.route_down(MouseButton::Left), None);
        assert_eq!(mouse.route_down(MouseButton::Right), Some(TankId(1)));
        assert_eq!(mouse.route_up(MouseButton::Left), Some(TankId(2)));
    }

    #[test]
    fn when_pointer_moves_then_router_reports_it() {
        let mut router = InputRouter::default();

        router.mouse_mut().set_pointer(Vec2::new(12.0, 34.0));

        assert_eq!(router.pointer(), Vec2::new(12.0, 34.0));
    }
}
