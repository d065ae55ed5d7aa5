/// Tuning for the keyboard (differential track) drive.
#[derive(Debug, Clone, Copy)]
pub struct KeyboardTuning {
    /// Per-track force while driving forward (applied towards -Y before rotation).
    pub forward_force: f32,

    /// Per-track force while reversing.
    pub reverse_force: f32,

    /// Per-track force added with opposite signs while turning.
    pub turn_force: f32,

    /// Lateral distance of each track from the body center.
    pub track_offset: f32,
}

impl Default for KeyboardTuning {
    fn default() -> Self {
        Self {
            forward_force: 0.0015,
            reverse_force: 0.001,
            turn_force: 0.0035,
            track_offset: 15.0,
        }
    }
}

/// Tuning for the mouse (aim and approach) drive.
#[derive(Debug, Clone, Copy)]
pub struct MouseTuning {
    /// Heading error below which the tank stops snapping towards the pointer.
    pub aim_tolerance: f32,

    /// Angular velocity used for each snap.
    pub turn_rate: f32,

    /// Pointer distance below which no thrust is applied.
    pub approach_distance: f32,

    /// Pointer distance at which thrust saturates.
    pub full_thrust_distance: f32,

    /// Thrust at saturation.
    pub max_thrust: f32,

    /// Lateral distance of the thrust point from the body center.
    pub track_offset: f32,
}

impl Default for MouseTuning {
    fn default() -> Self {
        Self {
            aim_tolerance: 0.05,
            turn_rate: 0.04,
            approach_distance: 75.0,
            full_thrust_distance: 150.0,
            max_thrust: 0.003,
            track_offset: 15.0,
        }
    }
}
