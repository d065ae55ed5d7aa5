// Tank entity: composite body, input state, and teardown list.

use crate::domain::collision::{CollisionCategory, CollisionFilter};
use crate::domain::errors::HookError;
use crate::domain::ports::{BodyDesc, BodyId, Material, PartDesc, Shape};
use crate::domain::state::{InputState, TankId, TankStyle};
use crate::domain::tuning::TankTuning;
use crate::use_cases::controllers::Drive;
use crate::use_cases::events::SubscriptionId;
use crate::use_cases::timers::TimerId;
use glam::Vec2;
use std::collections::HashMap;

pub const HULL_PART: usize = 0;
pub const TURRET_PART: usize = 1;

pub type CleanupFn = Box<dyn FnOnce() -> Result<(), HookError>>;

/// One entry of a tank's teardown list.
pub enum DestroyHook {
    DetachKeyboard,
    DetachMouse,
    Unsubscribe(SubscriptionId),
    Custom(CleanupFn),
}

/// Cleanup registered over a tank's lifetime, drained once when it is destroyed.
#[derive(Default)]
pub struct Teardown {
    hooks: Vec<DestroyHook>,
}

impl Teardown {
    pub fn push(&mut self, hook: DestroyHook) {
        self.hooks.push(hook);
    }

    /// Hands over every hook in registration order, leaving the list empty.
    pub fn drain(&mut self) -> Vec<DestroyHook> {
        std::mem::take(&mut self.hooks)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

pub struct Tank {
    pub(crate) id: TankId,
    pub(crate) body: BodyId,
    pub(crate) style: TankStyle,
    pub(crate) state: InputState,
    pub(crate) drive: Box<dyn Drive>,
    pub(crate) teardown: Teardown,
    // Restore timers for parts currently showing the hit color.
    pub(crate) pending_flashes: HashMap<usize, TimerId>,
}

impl Tank {
    pub fn id(&self) -> TankId {
        self.id
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn style(&self) -> &TankStyle {
        &self.style
    }

    /// Style color for a body part.
    pub fn part_fill(&self, part: usize) -> &str {
        if part == TURRET_PART {
            &self.style.turret
        } else {
            &self.style.hull
        }
    }
}

/// Hull plus a turret riding along towards the forward axis.
pub fn tank_body(style: &TankStyle, tuning: &TankTuning) -> BodyDesc {
    let hull = PartDesc::new(
        Shape::Rectangle {
            width: tuning.hull_width,
            height: tuning.hull_height,
        },
        Vec2::ZERO,
        style.hull.clone(),
    )
    .with_mass(tuning.mass);

    // No explicit mass on the turret.
    let turret = PartDesc::new(
        Shape::Rectangle {
            width: tuning.turret_width,
            height: tuning.turret_height,
        },
        Vec2::new(0.0, -tuning.turret_offset),
        style.turret.clone(),
    );

    BodyDesc::compose(
        vec![hull, turret],
        CollisionFilter::new(CollisionCategory::Tank),
    )
    .with_material(Material {
        friction_air: tuning.friction_air,
        friction: tuning.friction,
        restitution: 0.0,
    })
    .with_mass(tuning.mass)
}
