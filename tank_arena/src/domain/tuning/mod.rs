// Gameplay tuning, kept apart from runtime configuration.

pub mod control;
pub mod projectile;
pub mod tank;

pub use control::{KeyboardTuning, MouseTuning};
pub use projectile::ProjectileTuning;
pub use tank::TankTuning;
