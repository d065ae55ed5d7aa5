// Use cases layer: combat rules running on top of the physics port.

pub mod bullet;
pub mod controllers;
pub mod events;
pub mod input_router;
pub mod simulation;
pub mod tank;
pub mod timers;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use bullet::{Bullet, FireBlock, FireOutcome, RetireCause};
pub use controllers::{Controller, Drive, DriveContext, KeyboardController, MouseController};
pub use input_router::{InputRouter, KeyBindings};
pub use simulation::{Simulation, SimulationSettings};
pub use tank::{DestroyHook, Tank, Teardown};
pub use types::{InputEvent, MouseButton, WorldUpdate};
