/// Gameplay tuning for tank bodies.
///
/// Keep this separate from runtime configuration (tick rates, buffer sizes, etc.).

#[derive(Debug, Clone, Copy)]
pub struct TankTuning {
    /// Hull rectangle width and height in pixels.
    pub hull_width: f32,
    pub hull_height: f32,

    /// Turret rectangle width and height in pixels.
    pub turret_width: f32,
    pub turret_height: f32,

    /// Distance of the turret center from the hull center, along the forward axis.
    pub turret_offset: f32,

    pub mass: f32,
    pub friction_air: f32,
    /// Coulomb coefficient for both sticking and sliding contact.
    pub friction: f32,

    /// Live bullets allowed per tank.
    pub max_live_projectiles: u8,

    /// Multiplier for the push handed to an overlapping tank.
    pub bounce_factor: f32,
}

impl Default for TankTuning {
    fn default() -> Self {
        Self {
            hull_width: 40.0,
            hull_height: 50.0,
            turret_width: 10.0,
            turret_height: 40.0,
            turret_offset: 25.0,
            mass: 1.0,
            friction_air: 0.5,
            friction: 0.5,
            max_live_projectiles: 5,
            bounce_factor: 2.0,
        }
    }
}
