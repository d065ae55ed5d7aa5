// rapier2d world backing the physics port.
//
// The port speaks in reference steps of 1000/60 ms: velocities are displacement per
// reference step and forces act over its squared duration. Rapier works per second,
// so every value is scaled on the way in and out.

use crate::domain::collision::{CollisionCategory, CollisionFilter};
use crate::domain::ports::{BodyDesc, BodyId, BodyState, Collision, Material, PhysicsWorld, Shape};
use glam::Vec2;
use rapier2d::parry::query;
use rapier2d::prelude::*;
use std::collections::BTreeMap;
use std::f32::consts::{PI, TAU};
use std::time::Duration;
use tracing::trace;

/// Reference step length in milliseconds.
pub const BASE_DELTA_MS: f32 = 1000.0 / 60.0;
/// Mass per unit area for parts without an explicit mass.
pub const DEFAULT_DENSITY: f32 = 0.001;
/// Extra rotational inertia so off-center forces turn bodies gently.
pub const INERTIA_SCALE: f32 = 4.0;

// Reference steps per second.
const STEPS_PER_SECOND: f32 = 1000.0 / BASE_DELTA_MS;
// Port force to rapier force: one reference step of port force gives the same velocity change.
const FORCE_SCALE: f32 = BASE_DELTA_MS * BASE_DELTA_MS * STEPS_PER_SECOND * STEPS_PER_SECOND;
// Damping used when air friction stops a body within a single step.
const FULL_STOP_DAMPING: f32 = 1.0e6;

fn to_vector(value: Vec2) -> Vector<Real> {
    vector![value.x, value.y]
}

fn to_vec2(value: &Vector<Real>) -> Vec2 {
    Vec2::new(value.x, value.y)
}

// Air friction removes `friction_air` of the velocity each reference step;
// rapier's damping divides it by `1 + dt * damping`.
fn damping(friction_air: f32) -> f32 {
    if friction_air <= 0.0 {
        0.0
    } else if friction_air >= 1.0 {
        FULL_STOP_DAMPING
    } else {
        friction_air / (1.0 - friction_air) * STEPS_PER_SECOND
    }
}

fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

fn groups(filter: &CollisionFilter) -> InteractionGroups {
    InteractionGroups::new(
        Group::from_bits_truncate(filter.category.bits()),
        Group::from_bits_truncate(filter.mask),
    )
}

fn shared_shape(shape: Shape) -> SharedShape {
    match shape {
        Shape::Rectangle { width, height } => SharedShape::cuboid(width / 2.0, height / 2.0),
        Shape::Circle { radius } => SharedShape::ball(radius),
    }
}

#[derive(Clone)]
struct Part {
    shape: SharedShape,
    // Relative to the center of mass, in the body frame.
    local: Isometry<Real>,
    fill: String,
}

// Built but not yet handed to rapier.
struct PendingBody {
    body: RigidBody,
    colliders: Vec<Collider>,
}

struct Entry {
    handle: Option<RigidBodyHandle>,
    pending: Option<PendingBody>,
    parts: Vec<Part>,
    category: CollisionCategory,
    mass: f32,
    // Unwrapped; rapier only reports the principal angle.
    angle: f32,
}

impl Entry {
    fn from_desc(desc: BodyDesc) -> Self {
        let masses: Vec<f32> = desc
            .parts
            .iter()
            .map(|part| {
                if part.mass > 0.0 {
                    part.mass
                } else {
                    DEFAULT_DENSITY * part.shape.area()
                }
            })
            .collect();
        let parts_mass: f32 = masses.iter().sum();
        let centroid = if parts_mass > 0.0 {
            desc.parts
                .iter()
                .zip(&masses)
                .map(|(part, mass)| part.offset * *mass)
                .sum::<Vec2>()
                / parts_mass
        } else {
            Vec2::ZERO
        };
        let mass = desc.mass.unwrap_or(parts_mass);
        let scale = if parts_mass > 0.0 { mass / parts_mass } else { 0.0 };

        let builder = if desc.is_static {
            RigidBodyBuilder::fixed()
        } else {
            let damping = damping(desc.material.friction_air);
            RigidBodyBuilder::dynamic()
                .linear_damping(damping)
                .angular_damping(damping)
                .can_sleep(false)
        };
        let builder = builder
            .translation(to_vector(desc.position))
            .rotation(desc.angle);
        let body = if desc.fixed_rotation {
            builder.lock_rotations().build()
        } else {
            builder.build()
        };

        let parts: Vec<Part> = desc
            .parts
            .into_iter()
            .map(|part| {
                let offset = part.offset - centroid;
                Part {
                    shape: shared_shape(part.shape),
                    local: Isometry::translation(offset.x, offset.y),
                    fill: part.fill,
                }
            })
            .collect();
        let colliders = parts
            .iter()
            .zip(&masses)
            .map(|(part, part_mass)| collider(part, part_mass * scale, &desc.material, &desc.filter))
            .collect();

        Self {
            handle: None,
            pending: Some(PendingBody { body, colliders }),
            parts,
            category: desc.filter.category,
            mass,
            angle: desc.angle,
        }
    }
}

fn collider(part: &Part, mass: f32, material: &Material, filter: &CollisionFilter) -> Collider {
    ColliderBuilder::new(part.shape.clone())
        .position(part.local)
        .mass(mass)
        .friction(material.friction)
        .friction_combine_rule(CoefficientCombineRule::Min)
        .restitution(material.restitution)
        .restitution_combine_rule(CoefficientCombineRule::Max)
        .collision_groups(groups(filter))
        .build()
}

fn rigid<'a>(entry: &'a Entry, bodies: &'a RigidBodySet) -> Option<&'a RigidBody> {
    match (&entry.pending, entry.handle) {
        (Some(pending), _) => Some(&pending.body),
        (None, Some(handle)) => bodies.get(handle),
        (None, None) => None,
    }
}

fn rigid_mut<'a>(entry: &'a mut Entry, bodies: &'a mut RigidBodySet) -> Option<&'a mut RigidBody> {
    match (&mut entry.pending, entry.handle) {
        (Some(pending), _) => Some(&mut pending.body),
        (None, Some(handle)) => bodies.get_mut(handle),
        (None, None) => None,
    }
}

/// Bodies keyed by id; only those added to the world move and collide.
pub struct RigidWorld {
    next_id: u64,
    entries: BTreeMap<BodyId, Entry>,
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl Default for RigidWorld {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: BTreeMap::new(),
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, 0.0],
            integration_parameters: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }
}

impl RigidWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bodies the world still holds, added or not.
    pub fn body_count(&self) -> usize {
        self.entries.len()
    }

    /// Bodies currently handed to the rapier pipeline.
    pub fn simulated_count(&self) -> usize {
        self.bodies.len()
    }

    /// World-space center of one part.
    pub fn part_position(&self, body: BodyId, part: usize) -> Option<Vec2> {
        let entry = self.entries.get(&body)?;
        let placed = rigid(entry, &self.bodies)?.position() * entry.parts.get(part)?.local;
        Some(to_vec2(&placed.translation.vector))
    }

    /// Force accumulated since the last step.
    pub fn pending_force(&self, body: BodyId) -> Option<Vec2> {
        let entry = self.entries.get(&body)?;
        rigid(entry, &self.bodies).map(|rigid| to_vec2(&rigid.user_force()) / FORCE_SCALE)
    }

    pub fn mass(&self, body: BodyId) -> Option<f32> {
        let entry = self.entries.get(&body)?;
        (rigid(entry, &self.bodies)?.is_dynamic() && entry.mass > 0.0).then_some(entry.mass)
    }

    fn placed_parts(&self, entry: &Entry) -> Vec<(Isometry<Real>, SharedShape)> {
        let Some(rigid) = rigid(entry, &self.bodies) else {
            return Vec::new();
        };
        entry
            .parts
            .iter()
            .map(|part| (rigid.position() * part.local, part.shape.clone()))
            .collect()
    }

    // First part of `other` overlapping any part of `this`, with the deepest contact against it.
    fn first_contact(&self, this: &Entry, other: &Entry) -> Option<(usize, query::Contact)> {
        let ours = self.placed_parts(this);
        self.placed_parts(other)
            .iter()
            .enumerate()
            .find_map(|(index, (their_position, their_shape))| {
                ours.iter()
                    .filter_map(|(our_position, our_shape)| {
                        query::contact(
                            our_position,
                            &**our_shape,
                            their_position,
                            &**their_shape,
                            0.0,
                        )
                        .ok()
                        .flatten()
                        .filter(|contact| contact.dist < 0.0)
                    })
                    .min_by(|a, b| a.dist.total_cmp(&b.dist))
                    .map(|contact| (index, contact))
            })
    }

    // Keeps the unwrapped angle in step with the principal angle rapier integrated.
    fn sync_angles(&mut self) {
        for entry in self.entries.values_mut() {
            let Some(handle) = entry.handle else {
                continue;
            };
            if let Some(rigid) = self.bodies.get(handle) {
                entry.angle += wrap_angle(rigid.rotation().angle() - entry.angle);
            }
        }
    }
}

impl PhysicsWorld for RigidWorld {
    fn create_body(&mut self, desc: BodyDesc) -> BodyId {
        self.next_id += 1;
        let id = BodyId(self.next_id);
        self.entries.insert(id, Entry::from_desc(desc));
        id
    }

    fn add(&mut self, body: BodyId) {
        let Some(entry) = self.entries.get_mut(&body) else {
            return;
        };
        let Some(PendingBody { body: rigid, colliders }) = entry.pending.take() else {
            return;
        };
        let handle = self.bodies.insert(rigid);
        for collider in colliders {
            self.colliders
                .insert_with_parent(collider, handle, &mut self.bodies);
        }
        entry.handle = Some(handle);
        trace!(body = body.0, "body added");
    }

    fn remove(&mut self, body: BodyId) -> bool {
        let Some(handle) = self.entries.get(&body).and_then(|entry| entry.handle) else {
            return false;
        };
        self.entries.remove(&body);
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        trace!(body = body.0, "body removed");
        true
    }

    fn contains(&self, body: BodyId) -> bool {
        self.entries
            .get(&body)
            .is_some_and(|entry| entry.handle.is_some())
    }

    fn bodies_in(&self, category: CollisionCategory) -> Vec<BodyId> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.handle.is_some() && entry.category == category)
            .map(|(id, _)| *id)
            .collect()
    }

    fn collides(&self, body: BodyId, candidates: &[BodyId]) -> Vec<Collision> {
        let Some(this) = self.entries.get(&body) else {
            return Vec::new();
        };
        candidates
            .iter()
            .filter(|candidate| **candidate != body)
            .filter_map(|candidate| {
                let other = self.entries.get(candidate)?;
                let (other_part, contact) = self.first_contact(this, other)?;
                Some(Collision {
                    this: body,
                    other: *candidate,
                    other_part,
                    normal: to_vec2(&contact.normal1),
                    depth: -contact.dist,
                })
            })
            .collect()
    }

    fn body(&self, body: BodyId) -> Option<BodyState> {
        let entry = self.entries.get(&body)?;
        let rigid = rigid(entry, &self.bodies)?;
        Some(BodyState {
            position: to_vec2(rigid.translation()),
            angle: entry.angle,
            velocity: to_vec2(rigid.linvel()) / STEPS_PER_SECOND,
            angular_velocity: rigid.angvel() / STEPS_PER_SECOND,
        })
    }

    fn set_velocity(&mut self, body: BodyId, velocity: Vec2) {
        if let Some(rigid) = self
            .entries
            .get_mut(&body)
            .and_then(|entry| rigid_mut(entry, &mut self.bodies))
        {
            rigid.set_linvel(to_vector(velocity * STEPS_PER_SECOND), true);
        }
    }

    fn set_angular_velocity(&mut self, body: BodyId, angular_velocity: f32) {
        if let Some(rigid) = self
            .entries
            .get_mut(&body)
            .and_then(|entry| rigid_mut(entry, &mut self.bodies))
        {
            rigid.set_angvel(angular_velocity * STEPS_PER_SECOND, true);
        }
    }

    fn set_position(&mut self, body: BodyId, position: Vec2) {
        if let Some(rigid) = self
            .entries
            .get_mut(&body)
            .and_then(|entry| rigid_mut(entry, &mut self.bodies))
        {
            rigid.set_translation(to_vector(position), true);
        }
    }

    fn set_angle(&mut self, body: BodyId, angle: f32) {
        let Some(entry) = self.entries.get_mut(&body) else {
            return;
        };
        entry.angle = angle;
        if let Some(rigid) = rigid_mut(entry, &mut self.bodies) {
            rigid.set_rotation(Rotation::new(angle), true);
        }
    }

    fn apply_force(&mut self, body: BodyId, point: Vec2, force: Vec2) {
        let Some(rigid) = self
            .entries
            .get_mut(&body)
            .and_then(|entry| rigid_mut(entry, &mut self.bodies))
        else {
            return;
        };
        let arm = point - to_vec2(rigid.translation());
        rigid.add_force(to_vector(force * FORCE_SCALE), true);
        rigid.add_torque(arm.perp_dot(force) * FORCE_SCALE / INERTIA_SCALE, true);
    }

    fn set_fill(&mut self, body: BodyId, part: usize, color: &str) {
        if let Some(part) = self
            .entries
            .get_mut(&body)
            .and_then(|entry| entry.parts.get_mut(part))
        {
            part.fill = color.to_string();
        }
    }

    fn fill(&self, body: BodyId, part: usize) -> Option<&str> {
        self.entries
            .get(&body)?
            .parts
            .get(part)
            .map(|part| part.fill.as_str())
    }

    fn step(&mut self, dt: Duration) {
        if dt.is_zero() {
            return;
        }
        self.integration_parameters.dt = dt.as_secs_f32();
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
        // Rapier keeps user forces until reset; the port clears them every step.
        for (_, rigid) in self.bodies.iter_mut() {
            rigid.reset_forces(false);
            rigid.reset_torques(false);
        }
        self.sync_angles();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::PartDesc;
    use crate::domain::state::TankStyle;
    use crate::domain::tuning::{ProjectileTuning, TankTuning};
    use crate::use_cases::bullet::bullet_body;
    use crate::use_cases::tank::{HULL_PART, TURRET_PART, tank_body};

    const TICK: Duration = Duration::from_micros(16_667);

    fn tank_at(world: &mut RigidWorld, position: Vec2) -> BodyId {
        let tank = world.create_body(
            tank_body(&TankStyle::solid("red"), &TankTuning::default()).at(position),
        );
        world.add(tank);
        tank
    }

    fn bullet_at(world: &mut RigidWorld, position: Vec2) -> BodyId {
        let bullet = world.create_body(bullet_body(&ProjectileTuning::default()).at(position));
        world.add(bullet);
        bullet
    }

    fn wall(world: &mut RigidWorld, center: Vec2, width: f32, height: f32) -> BodyId {
        let wall = world.create_body(
            BodyDesc::rectangle(
                width,
                height,
                CollisionFilter::new(CollisionCategory::Wall),
                "grey",
            )
            .at(center)
            .static_body(),
        );
        world.add(wall);
        wall
    }

    #[test]
    fn when_turret_has_no_explicit_mass_then_center_shifts_towards_it() {
        let mut world = RigidWorld::new();
        let tank = tank_at(&mut world, Vec2::ZERO);

        let hull = world.part_position(tank, HULL_PART).expect("hull");
        let turret = world.part_position(tank, TURRET_PART).expect("turret");

        // Hull mass 1 against 0.4 of area-derived turret mass.
        let shift = 25.0 * 0.4 / 1.4;
        assert!((hull.y - shift).abs() < 1e-4);
        assert!((turret.y - (shift - 25.0)).abs() < 1e-4);
        assert_eq!(world.mass(tank), Some(1.0));
    }

    #[test]
    fn when_bullet_sits_at_launch_distance_then_it_clears_own_turret() {
        let mut world = RigidWorld::new();
        let tank = tank_at(&mut world, Vec2::new(100.0, 100.0));
        let at_muzzle = bullet_at(&mut world, Vec2::new(100.0, 60.0));
        let launched = bullet_at(&mut world, Vec2::new(100.0, 58.0));

        let muzzle_hits = world.collides(at_muzzle, &[tank]);
        let launch_hits = world.collides(launched, &[tank]);

        assert_eq!(muzzle_hits.len(), 1);
        assert_eq!(muzzle_hits[0].other_part, TURRET_PART);
        assert!(muzzle_hits[0].normal.y > 0.9);
        assert!(launch_hits.is_empty());
    }

    #[test]
    fn when_body_is_removed_twice_then_second_removal_reports_false() {
        let mut world = RigidWorld::new();
        let tank = tank_at(&mut world, Vec2::ZERO);

        assert!(world.remove(tank));
        assert!(!world.remove(tank));
        assert!(!world.contains(tank));
        assert!(world.bodies_in(CollisionCategory::Tank).is_empty());
    }

    #[test]
    fn when_bodies_are_removed_then_storage_returns_to_baseline() {
        let mut world = RigidWorld::new();
        let tank = tank_at(&mut world, Vec2::ZERO);
        let baseline = (world.body_count(), world.simulated_count());

        for _ in 0..200 {
            let bullet = bullet_at(&mut world, Vec2::new(300.0, 300.0));
            world.step(TICK);
            assert!(world.remove(bullet));
        }

        assert_eq!((world.body_count(), world.simulated_count()), baseline);
        assert!(world.contains(tank));
    }

    #[test]
    fn when_bodies_are_listed_by_category_then_only_added_ones_show_in_creation_order() {
        let mut world = RigidWorld::new();
        let first = tank_at(&mut world, Vec2::ZERO);
        let pending = world.create_body(tank_body(&TankStyle::solid("red"), &TankTuning::default()));
        let second = tank_at(&mut world, Vec2::new(200.0, 0.0));
        wall(&mut world, Vec2::new(0.0, 300.0), 10.0, 10.0);

        assert_eq!(world.bodies_in(CollisionCategory::Tank), vec![first, second]);
        assert!(!world.contains(pending));
        assert!(!world.remove(pending));
        assert_eq!(world.simulated_count(), 3);
        assert_eq!(world.bodies_in(CollisionCategory::Wall).len(), 1);
    }

    #[test]
    fn when_candidates_include_the_body_itself_then_it_is_skipped() {
        let mut world = RigidWorld::new();
        let tank = tank_at(&mut world, Vec2::ZERO);

        assert!(world.collides(tank, &[tank]).is_empty());
    }

    #[test]
    fn when_tank_coasts_then_air_friction_slows_it_sharply() {
        let mut world = RigidWorld::new();
        let tank = tank_at(&mut world, Vec2::ZERO);
        world.set_velocity(tank, Vec2::new(2.0, 0.0));

        world.step(TICK);

        let state = world.body(tank).expect("tank");
        assert!(state.velocity.x > 0.5 && state.velocity.x < 1.5);
        assert!(state.position.x > 0.5 && state.position.x < 2.0);
    }

    #[test]
    fn when_air_friction_is_mapped_then_half_per_step_becomes_sixty_per_second() {
        assert_eq!(damping(0.0), 0.0);
        assert!((damping(0.5) - 60.0).abs() < 1e-3);
        assert_eq!(damping(1.0), FULL_STOP_DAMPING);
    }

    #[test]
    fn when_force_is_applied_left_of_center_then_body_turns_clockwise() {
        let mut world = RigidWorld::new();
        let body = world.create_body(BodyDesc::compose(
            vec![PartDesc::new(
                Shape::Rectangle {
                    width: 40.0,
                    height: 50.0,
                },
                Vec2::ZERO,
                "red",
            )
            .with_mass(1.0)],
            CollisionFilter::new(CollisionCategory::Tank),
        ));
        world.add(body);

        world.apply_force(body, Vec2::new(-15.0, 0.0), Vec2::new(0.0, -0.0015));
        assert!((world.pending_force(body).expect("force").y + 0.0015).abs() < 1e-6);
        world.step(TICK);

        let state = world.body(body).expect("body");
        assert!(state.angular_velocity > 0.0);
        assert!(state.angle > 0.0);
        assert!(state.velocity.y < 0.0);
        assert_eq!(world.pending_force(body), Some(Vec2::ZERO));
    }

    #[test]
    fn when_bullet_hits_wall_then_it_bounces_back_at_full_speed() {
        let mut world = RigidWorld::new();
        wall(&mut world, Vec2::new(50.0, 0.0), 10.0, 100.0);
        let bullet = bullet_at(&mut world, Vec2::new(40.0, 0.0));
        world.set_velocity(bullet, Vec2::new(3.0, 0.0));

        for _ in 0..4 {
            world.step(TICK);
        }

        let state = world.body(bullet).expect("bullet");
        assert!(state.velocity.x < -2.5);
        assert!(state.velocity.y.abs() < 1e-3);
        assert!(state.position.x < 45.0);
        assert_eq!(state.angular_velocity, 0.0);
    }

    #[test]
    fn when_bullet_crosses_a_tank_then_the_tank_does_not_deflect_it() {
        let mut world = RigidWorld::new();
        let tank = tank_at(&mut world, Vec2::new(100.0, 100.0));
        let bullet = bullet_at(&mut world, Vec2::new(100.0, 100.0));
        world.set_velocity(bullet, Vec2::new(0.0, -3.0));

        world.step(TICK);

        let bullet = world.body(bullet).expect("bullet");
        assert!((bullet.velocity - Vec2::new(0.0, -3.0)).length() < 1e-4);
        assert!(world.body(tank).expect("tank").velocity.length() < 1e-4);
    }

    #[test]
    fn when_angle_passes_half_turn_then_it_is_reported_unwrapped() {
        let mut world = RigidWorld::new();
        let tank = tank_at(&mut world, Vec2::ZERO);
        world.set_angle(tank, 3.0);
        world.set_angular_velocity(tank, 0.3);

        world.step(TICK);

        let angle = world.body(tank).expect("tank").angle;
        assert!(angle > 3.0 && angle < 3.5);
    }

    #[test]
    fn when_tank_is_added_then_both_colliders_carry_its_friction() {
        let mut world = RigidWorld::new();
        let tank = tank_at(&mut world, Vec2::ZERO);

        let handle = world.entries[&tank].handle.expect("added tank");
        let rigid = world.bodies.get(handle).expect("rigid body");

        assert_eq!(rigid.colliders().len(), 2);
        for collider in rigid.colliders() {
            assert_eq!(world.colliders[*collider].friction(), TankTuning::default().friction);
        }
    }

    #[test]
    fn when_part_fill_is_set_then_only_that_part_changes() {
        let mut world = RigidWorld::new();
        let tank = tank_at(&mut world, Vec2::ZERO);

        world.set_fill(tank, TURRET_PART, "blue");

        assert_eq!(world.fill(tank, TURRET_PART), Some("blue"));
        assert_eq!(world.fill(tank, HULL_PART), Some("red"));
        assert_eq!(world.fill(tank, 7), None);
    }
}
