// Control schemes: bind a tank to an input source and drive it every tick.

use crate::domain::ports::{BodyId, PhysicsWorld};
use crate::domain::state::{InputState, TankId};
use crate::domain::systems::drive::{aim_command, keyboard_forces};
use crate::domain::tuning::{KeyboardTuning, MouseTuning};
use crate::use_cases::input_router::{InputRouter, KeyBindings};
use crate::use_cases::tank::{DestroyHook, Teardown};
use crate::use_cases::types::MouseButton;
use glam::Vec2;

/// Everything a drive may read or touch during one tick.
pub struct DriveContext<'a> {
    pub body: BodyId,
    pub state: &'a InputState,
    pub pointer: Vec2,
    pub physics: &'a mut dyn PhysicsWorld,
}

/// Per-tick force application for one tank.
pub trait Drive {
    fn apply(&mut self, ctx: DriveContext<'_>);
}

/// Factory binding a tank to an input scheme.
///
/// Attaching registers the matching detach on the tank's teardown list, so the
/// binding never outlives the tank.
pub trait Controller {
    fn attach(&self, tank: TankId, router: &mut InputRouter, teardown: &mut Teardown) -> Box<dyn Drive>;
}

#[derive(Debug, Clone)]
pub struct KeyboardController {
    bindings: KeyBindings,
    tuning: KeyboardTuning,
}

impl KeyboardController {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            tuning: KeyboardTuning::default(),
        }
    }

    pub fn with_tuning(mut self, tuning: KeyboardTuning) -> Self {
        self.tuning = tuning;
        self
    }
}

impl Controller for KeyboardController {
    fn attach(&self, tank: TankId, router: &mut InputRouter, teardown: &mut Teardown) -> Box<dyn Drive> {
        router.keyboard_mut().attach(tank, &self.bindings);
        teardown.push(DestroyHook::DetachKeyboard);
        Box::new(TrackDrive {
            tuning: self.tuning,
        })
    }
}

/// Differential drive: one force per track.
struct TrackDrive {
    tuning: KeyboardTuning,
}

impl Drive for TrackDrive {
    fn apply(&mut self, ctx: DriveContext<'_>) {
        let Some(body) = ctx.physics.body(ctx.body) else {
            return;
        };
        for track in keyboard_forces(ctx.state, &body, &self.tuning) {
            ctx.physics.apply_force(ctx.body, track.point, track.force);
        }
    }
}

#[derive(Debug, Clone)]
pub struct MouseController {
    fire: MouseButton,
    tuning: MouseTuning,
}

impl MouseController {
    pub fn new(fire: MouseButton) -> Self {
        Self {
            fire,
            tuning: MouseTuning::default(),
        }
    }

    pub fn with_tuning(mut self, tuning: MouseTuning) -> Self {
        self.tuning = tuning;
        self
    }
}

impl Controller for MouseController {
    fn attach(&self, tank: TankId, router: &mut InputRouter, teardown: &mut Teardown) -> Box<dyn Drive> {
        router.mouse_mut().attach(tank, self.fire);
        teardown.push(DestroyHook::DetachMouse);
        Box::new(AimDrive {
            tuning: self.tuning,
        })
    }
}

/// Turns towards the pointer and closes in when it is far away.
struct AimDrive {
    tuning: MouseTuning,
}

impl Drive for AimDrive {
    fn apply(&mut self, ctx: DriveContext<'_>) {
        let Some(body) = ctx.physics.body(ctx.body) else {
            return;
        };
        let command = aim_command(&body, ctx.pointer, &self.tuning);

        if let Some(angle) = command.normalized_angle {
            ctx.physics.set_angle(ctx.body, angle);
        }
        if let Some(angular_velocity) = command.angular_velocity {
            ctx.physics.set_angular_velocity(ctx.body, angular_velocity);
        }
        if let Some(thrust) = command.thrust {
            ctx.physics.apply_force(ctx.body, thrust.point, thrust.force);
        }
    }
}
