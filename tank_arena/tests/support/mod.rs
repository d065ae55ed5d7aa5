// Shared fixtures for the combat scenario tests.
use std::time::Duration;

use glam::Vec2;
use tank_arena::domain::{TankId, TankStyle};
use tank_arena::interface_adapters::physics::RigidWorld;
use tank_arena::use_cases::{KeyBindings, KeyboardController, Simulation, SimulationSettings};

pub type Arena = Simulation<RigidWorld>;

// One reference physics step.
pub const TICK: Duration = Duration::from_micros(16_667);

pub fn empty_arena() -> Arena {
    Simulation::new(RigidWorld::new(), SimulationSettings::default())
}

// Keyboard tank on W/S/A/D + E, facing up, placed at `position`.
pub fn keyboard_tank(arena: &mut Arena, color: &str, position: Vec2) -> TankId {
    let tank = arena.spawn_tank(
        &KeyboardController::new(KeyBindings::wasd()),
        TankStyle::solid(color),
    );
    arena
        .set_position(tank, position)
        .expect("freshly spawned tank");
    tank
}

pub fn run_steps(arena: &mut Arena, steps: usize, dt: Duration) {
    for _ in 0..steps {
        arena.step(dt);
    }
}
