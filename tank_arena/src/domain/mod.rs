// Domain layer: core simulation types and rules.

pub mod collision;
pub mod errors;
pub mod ports;
pub mod state;
pub mod systems;
pub mod tuning;

pub use collision::{CollisionCategory, CollisionFilter};
pub use errors::{HookError, SimError};
pub use ports::{BodyDesc, BodyId, BodyState, Collision, PartDesc, PhysicsWorld, Shape};
pub use state::{BulletId, BulletSnapshot, InputState, TankAction, TankId, TankSnapshot, TankStyle};
