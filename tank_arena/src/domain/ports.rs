use glam::Vec2;
use std::time::Duration;

use crate::domain::collision::{CollisionCategory, CollisionFilter};

// Port for the rigid-body engine the combat rules run on.
//
// Units follow the engine's step convention: velocities are displacement per
// reference step (1000/60 ms), angles are radians, forces are in engine units.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rectangle { width: f32, height: f32 },
    Circle { radius: f32 },
}

impl Shape {
    pub fn area(&self) -> f32 {
        match *self {
            Shape::Rectangle { width, height } => width * height,
            Shape::Circle { radius } => std::f32::consts::PI * radius * radius,
        }
    }
}

/// One rigid part of a body, placed relative to the body's reference point.
#[derive(Debug, Clone)]
pub struct PartDesc {
    pub shape: Shape,
    pub offset: Vec2,
    /// Zero means "no explicit mass"; the engine then derives it from the part's area.
    pub mass: f32,
    pub fill: String,
}

impl PartDesc {
    pub fn new(shape: Shape, offset: Vec2, fill: impl Into<String>) -> Self {
        Self {
            shape,
            offset,
            mass: 0.0,
            fill: fill.into(),
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub friction_air: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            friction_air: 0.01,
            friction: 0.1,
            restitution: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub parts: Vec<PartDesc>,
    pub position: Vec2,
    pub angle: f32,
    pub filter: CollisionFilter,
    pub material: Material,
    /// Overrides the mass accumulated from the parts.
    pub mass: Option<f32>,
    /// Infinite inertia: forces never spin the body.
    pub fixed_rotation: bool,
    pub is_static: bool,
}

impl BodyDesc {
    /// Rigidly joins several parts into one body.
    pub fn compose(parts: Vec<PartDesc>, filter: CollisionFilter) -> Self {
        Self {
            parts,
            position: Vec2::ZERO,
            angle: 0.0,
            filter,
            material: Material::default(),
            mass: None,
            fixed_rotation: false,
            is_static: false,
        }
    }

    pub fn rectangle(width: f32, height: f32, filter: CollisionFilter, fill: impl Into<String>) -> Self {
        Self::compose(
            vec![PartDesc::new(Shape::Rectangle { width, height }, Vec2::ZERO, fill)],
            filter,
        )
    }

    pub fn circle(radius: f32, filter: CollisionFilter, fill: impl Into<String>) -> Self {
        Self::compose(
            vec![PartDesc::new(Shape::Circle { radius }, Vec2::ZERO, fill)],
            filter,
        )
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn fixed_rotation(mut self) -> Self {
        self.fixed_rotation = true;
        self
    }

    pub fn static_body(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// Kinematic state of a body at the moment it was read.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyState {
    pub position: Vec2,
    pub angle: f32,
    pub velocity: Vec2,
    pub angular_velocity: f32,
}

/// Overlap between the queried body (`this`) and one candidate (`other`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub this: BodyId,
    pub other: BodyId,
    /// Index of the first part of `other` found overlapping.
    pub other_part: usize,
    /// Unit normal pointing from `this` towards `other`.
    pub normal: Vec2,
    pub depth: f32,
}

pub trait PhysicsWorld {
    /// Builds a body without adding it to the world.
    fn create_body(&mut self, desc: BodyDesc) -> BodyId;
    fn add(&mut self, body: BodyId);
    /// Returns false when the body was not in the world; removing twice is harmless.
    fn remove(&mut self, body: BodyId) -> bool;
    fn contains(&self, body: BodyId) -> bool;
    /// Bodies currently in the world carrying `category`, in creation order.
    fn bodies_in(&self, category: CollisionCategory) -> Vec<BodyId>;
    /// At most one record per overlapping candidate, in candidate order. Filters are ignored.
    fn collides(&self, body: BodyId, candidates: &[BodyId]) -> Vec<Collision>;
    fn body(&self, body: BodyId) -> Option<BodyState>;

    fn set_velocity(&mut self, body: BodyId, velocity: Vec2);
    fn set_angular_velocity(&mut self, body: BodyId, angular_velocity: f32);
    fn set_position(&mut self, body: BodyId, position: Vec2);
    fn set_angle(&mut self, body: BodyId, angle: f32);
    /// Accumulates `force` applied at `point` (world space) until the next step.
    fn apply_force(&mut self, body: BodyId, point: Vec2, force: Vec2);

    /// Render color of one part. The combat rules only ever write it.
    fn set_fill(&mut self, body: BodyId, part: usize, color: &str);
    fn fill(&self, body: BodyId, part: usize) -> Option<&str>;

    fn step(&mut self, dt: Duration);
}
