use glam::Vec2;
use std::time::Duration;

use crate::domain::collision::{CollisionCategory, CollisionFilter};
use crate::domain::ports::{BodyDesc, BodyId, PhysicsWorld};
use crate::interface_adapters::physics::RigidWorld;
use crate::use_cases::simulation::{Simulation, SimulationSettings};

pub(crate) type TestSimulation = Simulation<RigidWorld>;

// One reference step of the physics engine.
pub(crate) const TICK: Duration = Duration::from_micros(16_667);

pub(crate) fn simulation() -> TestSimulation {
    Simulation::new(RigidWorld::new(), SimulationSettings::default())
}

// Static wall centered on `center`.
pub(crate) fn add_wall(sim: &mut TestSimulation, center: Vec2, size: Vec2) -> BodyId {
    let physics = sim.physics_mut();
    let wall = physics.create_body(
        BodyDesc::rectangle(
            size.x,
            size.y,
            CollisionFilter::new(CollisionCategory::Wall),
            "grey",
        )
        .at(center)
        .static_body(),
    );
    physics.add(wall);
    wall
}
