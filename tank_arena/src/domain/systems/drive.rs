use crate::domain::ports::BodyState;
use crate::domain::state::InputState;
use crate::domain::tuning::{KeyboardTuning, MouseTuning};
use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// A force applied at a world-space point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointForce {
    pub point: Vec2,
    pub force: Vec2,
}

/// Wraps an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Body angle at which the forward axis `(0, -1)` points from `from` to `to`.
pub fn heading_to(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    normalize_angle(delta.y.atan2(delta.x) + FRAC_PI_2)
}

/// Local-frame forces for the left and right tracks.
pub fn track_forces(state: &InputState, tuning: &KeyboardTuning) -> (Vec2, Vec2) {
    let mut left = 0.0;
    let mut right = 0.0;

    // Reverse wins when both are held.
    if state.forward && !state.backward {
        left = -tuning.forward_force;
        right = -tuning.forward_force;
    } else if state.backward {
        left = tuning.reverse_force;
        right = tuning.reverse_force;
    }

    if state.left {
        left += tuning.turn_force;
        right -= tuning.turn_force;
    }
    if state.right {
        left -= tuning.turn_force;
        right += tuning.turn_force;
    }

    (Vec2::new(0.0, left), Vec2::new(0.0, right))
}

/// World-space forces for both tracks of a keyboard-driven tank.
pub fn keyboard_forces(state: &InputState, body: &BodyState, tuning: &KeyboardTuning) -> [PointForce; 2] {
    let (left, right) = track_forces(state, tuning);
    let rotation = Vec2::from_angle(body.angle);

    [
        PointForce {
            point: body.position + rotation.rotate(Vec2::new(-tuning.track_offset, 0.0)),
            force: rotation.rotate(left),
        },
        PointForce {
            point: body.position + rotation.rotate(Vec2::new(tuning.track_offset, 0.0)),
            force: rotation.rotate(right),
        },
    ]
}

/// What a mouse-driven tank does during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AimCommand {
    /// Replacement angle when the body angle had gone negative.
    pub normalized_angle: Option<f32>,
    /// Angular velocity snap towards the pointer.
    pub angular_velocity: Option<f32>,
    /// Forward thrust towards a distant pointer.
    pub thrust: Option<PointForce>,
}

pub fn aim_command(body: &BodyState, pointer: Vec2, tuning: &MouseTuning) -> AimCommand {
    let mut command = AimCommand::default();

    let mut angle = body.angle;
    if angle < 0.0 {
        angle = normalize_angle(angle);
        command.normalized_angle = Some(angle);
    }

    let heading = angle % TAU;
    let target = heading_to(body.position, pointer);
    let error = target - heading;
    if error.abs() > tuning.aim_tolerance {
        let toward = if target > heading { 1.0 } else { -1.0 };
        // Going the other way round is shorter past half a turn.
        let shorter = if error.abs() > PI { -1.0 } else { 1.0 };
        command.angular_velocity = Some(tuning.turn_rate * toward * shorter);
    }

    let distance = (pointer - body.position).length();
    if distance > tuning.approach_distance {
        let span = tuning.full_thrust_distance - tuning.approach_distance;
        let scale = (distance.min(tuning.full_thrust_distance) - tuning.approach_distance) / span;
        let rotation = Vec2::from_angle(angle);
        command.thrust = Some(PointForce {
            point: body.position + rotation.rotate(Vec2::new(-tuning.track_offset, 0.0)),
            force: rotation.rotate(Vec2::new(0.0, -tuning.max_thrust * scale)),
        });
    }

    command
}
