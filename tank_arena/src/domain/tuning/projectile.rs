use std::time::Duration;

/// Gameplay tuning for projectiles.
#[derive(Debug, Clone, Copy)]
pub struct ProjectileTuning {
    /// Launch speed in pixels per reference step.
    pub speed: f32,

    /// Lifetime before the projectile retires on its own.
    pub life_time: Duration,

    /// World-space collision radius in pixels.
    pub radius: f32,

    /// Distance from the tank center where the spawn-time check runs.
    pub muzzle_distance: f32,

    /// Distance from the tank center where a launched projectile starts.
    pub launch_distance: f32,

    /// How long a struck part keeps the hit color.
    pub hit_flash: Duration,

    pub hit_color: &'static str,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 3.0,
            life_time: Duration::from_millis(5000),
            radius: 4.0,
            muzzle_distance: 40.0,
            launch_distance: 42.0,
            hit_flash: Duration::from_millis(50),
            hit_color: "blue",
        }
    }
}
