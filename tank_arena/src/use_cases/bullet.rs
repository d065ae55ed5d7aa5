// Projectile entity and the outcomes of trying to fire one.

use crate::domain::collision::{CollisionCategory, CollisionFilter};
use crate::domain::ports::{BodyDesc, BodyId, Material};
use crate::domain::state::{BulletId, TankId};
use crate::domain::tuning::ProjectileTuning;
use crate::use_cases::events::SubscriptionId;
use crate::use_cases::timers::TimerId;

#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: BulletId,
    pub owner: TankId,
    pub body: BodyId,
    pub expiry: TimerId,
    /// Set once the bullet survives the spawn-time check.
    pub watch: Option<SubscriptionId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetireCause {
    /// Overlapped a tank and a wall right at the muzzle.
    SpawnHit,
    /// Touched a tank during a later tick.
    Hit,
    /// Lived out its lifetime.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireBlock {
    /// Fire is already held; release it first.
    TriggerHeld,
    /// The tank already has the maximum number of live bullets.
    AtCapacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    Launched(BulletId),
    /// The bullet hit something at the muzzle and never flew.
    Absorbed,
    Blocked(FireBlock),
}

/// Small round body that bounces off walls and never spins.
///
/// Tanks are not in its mask: tank hits are found by explicit query, so they never deflect it.
pub fn bullet_body(tuning: &ProjectileTuning) -> BodyDesc {
    BodyDesc::circle(
        tuning.radius,
        CollisionFilter::with_mask(
            CollisionCategory::TankProjectile,
            CollisionCategory::Wall.bits(),
        ),
        "black",
    )
    .with_material(Material {
        friction_air: 0.0,
        friction: 0.0,
        restitution: 1.0,
    })
    .fixed_rotation()
}
