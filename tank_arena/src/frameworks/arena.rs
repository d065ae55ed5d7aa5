// Default two-tank arena: framed by four walls, one keyboard tank, one mouse tank.

use crate::domain::collision::{CollisionCategory, CollisionFilter};
use crate::domain::ports::{BodyDesc, PhysicsWorld};
use crate::domain::state::{TankId, TankStyle};
use crate::interface_adapters::physics::RigidWorld;
use crate::use_cases::{
    KeyBindings, KeyboardController, MouseButton, MouseController, Simulation, SimulationSettings,
};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct ArenaLayout {
    pub width: f32,
    pub height: f32,
    pub wall_thickness: f32,
}

pub struct Arena {
    pub simulation: Simulation<RigidWorld>,
    pub keyboard_tank: TankId,
    pub mouse_tank: TankId,
}

pub fn build_arena(layout: ArenaLayout, seed: Option<u64>) -> Arena {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut simulation = Simulation::new(RigidWorld::new(), SimulationSettings::default());

    for (center, size) in wall_rects(&layout) {
        let physics = simulation.physics_mut();
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
    }

    let keyboard_tank = simulation.spawn_tank(
        &KeyboardController::new(KeyBindings::wasd()),
        TankStyle::solid("red"),
    );
    let mouse_tank = simulation.spawn_tank(
        &MouseController::new(MouseButton::Left),
        TankStyle::solid("green"),
    );

    for tank in [keyboard_tank, mouse_tank] {
        let position = Vec2::new(
            rng.gen_range(0.0..layout.width),
            rng.gen_range(0.0..layout.height),
        );
        let angle = rng.gen_range(0.0..TAU);
        simulation
            .set_position(tank, position)
            .expect("freshly spawned tank");
        simulation
            .set_angle(tank, angle)
            .expect("freshly spawned tank");
        info!(tank_id = %tank, x = position.x, y = position.y, angle, "tank placed");
    }

    Arena {
        simulation,
        keyboard_tank,
        mouse_tank,
    }
}

// Centered rectangles along the bottom, top, left, and right edges.
fn wall_rects(layout: &ArenaLayout) -> [(Vec2, Vec2); 4] {
    let ArenaLayout {
        width,
        height,
        wall_thickness: t,
    } = *layout;
    [
        (Vec2::new(width / 2.0, height), Vec2::new(width, t)),
        (Vec2::new(width / 2.0, 0.0), Vec2::new(width, t)),
        (Vec2::new(0.0, height / 2.0), Vec2::new(t, height)),
        (Vec2::new(width, height / 2.0), Vec2::new(t, height)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: ArenaLayout = ArenaLayout {
        width: 800.0,
        height: 600.0,
        wall_thickness: 10.0,
    };

    #[test]
    fn when_arena_is_built_then_four_walls_and_two_tanks_exist() {
        let arena = build_arena(LAYOUT, Some(7));
        let physics = arena.simulation.physics();

        assert_eq!(physics.bodies_in(CollisionCategory::Wall).len(), 4);
        assert_eq!(physics.bodies_in(CollisionCategory::Tank).len(), 2);
        assert!(
            arena
                .simulation
                .router()
                .keyboard()
                .is_attached(arena.keyboard_tank)
        );
        assert!(arena.simulation.router().mouse().is_attached(arena.mouse_tank));
    }

    #[test]
    fn when_seed_is_fixed_then_layout_repeats() {
        let first = build_arena(LAYOUT, Some(42)).simulation.snapshot();
        let second = build_arena(LAYOUT, Some(42)).simulation.snapshot();

        let positions = |update: &crate::use_cases::WorldUpdate| {
            update
                .tanks
                .iter()
                .map(|tank| (tank.x, tank.y, tank.angle))
                .collect::<Vec<_>>()
        };
        assert_eq!(positions(&first), positions(&second));
    }

    #[test]
    fn when_tanks_are_placed_then_they_start_inside_the_arena() {
        let update = build_arena(LAYOUT, Some(3)).simulation.snapshot();

        for tank in &update.tanks {
            assert!((0.0..800.0).contains(&tank.x));
            assert!((0.0..600.0).contains(&tank.y));
            assert!((0.0..TAU).contains(&tank.angle));
        }
        assert_eq!(update.tanks[0].hull_fill, "red");
        assert_eq!(update.tanks[1].turret_fill, "green");
    }

    #[test]
    fn when_tanks_are_placed_then_each_leaves_the_spawn_origin() {
        let update = build_arena(LAYOUT, Some(11)).simulation.snapshot();

        assert_eq!(update.tanks.len(), 2);
        for tank in &update.tanks {
            assert!(tank.x != 0.0 || tank.y != 0.0);
        }
        assert_ne!(
            (update.tanks[0].x, update.tanks[0].y),
            (update.tanks[1].x, update.tanks[1].y)
        );
    }
}
