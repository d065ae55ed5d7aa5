// Simulation context: owns the physics world and every combat entity in it.

use crate::domain::collision::CollisionCategory;
use crate::domain::errors::{HookError, SimError};
use crate::domain::ports::{BodyId, Collision, PhysicsWorld};
use crate::domain::state::{BulletId, BulletSnapshot, InputState, TankAction, TankId, TankSnapshot, TankStyle};
use crate::domain::tuning::{ProjectileTuning, TankTuning};
use crate::use_cases::bullet::{Bullet, FireBlock, FireOutcome, RetireCause, bullet_body};
use crate::use_cases::controllers::{Controller, DriveContext};
use crate::use_cases::events::{EventBus, Subscriber, TickPhase};
use crate::use_cases::input_router::InputRouter;
use crate::use_cases::tank::{DestroyHook, HULL_PART, TURRET_PART, Tank, Teardown, tank_body};
use crate::use_cases::timers::{TimerQueue, TimerTask};
use crate::use_cases::types::{InputEvent, WorldUpdate};
use glam::Vec2;
use std::collections::{BTreeMap, HashMap};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Gameplay tuning shared by every entity in one simulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationSettings {
    pub tank: TankTuning,
    pub projectile: ProjectileTuning,
}

pub struct Simulation<P> {
    physics: P,
    settings: SimulationSettings,
    // Simulated time; timers are measured against it.
    clock: Duration,
    tick: u64,
    tanks: BTreeMap<TankId, Tank>,
    bullets: BTreeMap<BulletId, Bullet>,
    events: EventBus,
    timers: TimerQueue,
    router: InputRouter,
    next_tank_id: u64,
    next_bullet_id: u64,
}

impl<P> Simulation<P>
where
    P: PhysicsWorld,
{
    pub fn new(physics: P, settings: SimulationSettings) -> Self {
        Self {
            physics,
            settings,
            clock: Duration::ZERO,
            tick: 0,
            tanks: BTreeMap::new(),
            bullets: BTreeMap::new(),
            events: EventBus::default(),
            timers: TimerQueue::default(),
            router: InputRouter::default(),
            next_tank_id: 1,
            next_bullet_id: 1,
        }
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Simulated time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.clock
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn tank(&self, id: TankId) -> Option<&Tank> {
        self.tanks.get(&id)
    }

    pub fn tank_state(&self, id: TankId) -> Option<&InputState> {
        self.tanks.get(&id).map(|tank| &tank.state)
    }

    pub fn tank_ids(&self) -> Vec<TankId> {
        self.tanks.keys().copied().collect()
    }

    pub fn bullet(&self, id: BulletId) -> Option<&Bullet> {
        self.bullets.get(&id)
    }

    pub fn live_bullets(&self) -> usize {
        self.bullets.len()
    }

    /// Builds a tank, binds it to `controller`, and puts it in the world.
    pub fn spawn_tank(&mut self, controller: &dyn Controller, style: TankStyle) -> TankId {
        let id = TankId(self.next_tank_id);
        self.next_tank_id += 1;

        let body = self
            .physics
            .create_body(tank_body(&style, &self.settings.tank));

        let mut teardown = Teardown::default();
        let drive = controller.attach(id, &mut self.router, &mut teardown);
        let tick = self
            .events
            .subscribe(TickPhase::Tick, Subscriber::Tank(id));
        teardown.push(DestroyHook::Unsubscribe(tick));

        self.physics.add(body);
        self.tanks.insert(
            id,
            Tank {
                id,
                body,
                style,
                state: InputState::default(),
                drive,
                teardown,
                pending_flashes: HashMap::new(),
            },
        );

        info!(tank_id = %id, "tank spawned");
        id
    }

    /// Removes the tank's body, then runs every teardown hook in registration order.
    ///
    /// A failing hook is logged and the remaining hooks still run.
    pub fn destroy_tank(&mut self, id: TankId) -> Result<(), SimError> {
        let mut tank = self.tanks.remove(&id).ok_or(SimError::UnknownTank(id))?;

        self.physics.remove(tank.body);
        for (_, timer) in tank.pending_flashes.drain() {
            self.timers.cancel(timer);
        }

        let mut failures = 0;
        for hook in tank.teardown.drain() {
            if let Err(error) = self.run_destroy_hook(id, hook) {
                failures += 1;
                error!(tank_id = %id, %error, "destroy hook failed");
            }
        }

        info!(tank_id = %id, failures, "tank destroyed");
        Ok(())
    }

    /// Appends a cleanup hook that runs when the tank is destroyed.
    pub fn on_destroy<F>(&mut self, id: TankId, hook: F) -> Result<(), SimError>
    where
        F: FnOnce() -> Result<(), HookError> + 'static,
    {
        let tank = self.tanks.get_mut(&id).ok_or(SimError::UnknownTank(id))?;
        tank.teardown.push(DestroyHook::Custom(Box::new(hook)));
        Ok(())
    }

    pub fn set_position(&mut self, id: TankId, position: Vec2) -> Result<(), SimError> {
        let body = self.tank_body(id)?;
        self.physics.set_position(body, position);
        Ok(())
    }

    pub fn set_angle(&mut self, id: TankId, angle: f32) -> Result<(), SimError> {
        let body = self.tank_body(id)?;
        self.physics.set_angle(body, angle);
        Ok(())
    }

    /// Launches a bullet unless fire is held or the tank is at its bullet cap.
    pub fn fire(&mut self, id: TankId) -> Result<FireOutcome, SimError> {
        let tank = self.tanks.get(&id).ok_or(SimError::UnknownTank(id))?;
        if tank.state.fire {
            return Ok(FireOutcome::Blocked(FireBlock::TriggerHeld));
        }
        if tank.state.live_projectiles >= self.settings.tank.max_live_projectiles {
            return Ok(FireOutcome::Blocked(FireBlock::AtCapacity));
        }
        let tank_body = tank.body;

        let Some(bullet) = self.create_bullet(id) else {
            return Ok(FireOutcome::Absorbed);
        };

        let angle = self
            .physics
            .body(tank_body)
            .map(|state| state.angle)
            .unwrap_or_default();
        if let Some(body) = self.bullets.get(&bullet).map(|b| b.body) {
            let velocity =
                Vec2::from_angle(angle).rotate(Vec2::new(0.0, -self.settings.projectile.speed));
            self.physics.set_velocity(body, velocity);
        }

        debug!(tank_id = %id, bullet_id = %bullet, "bullet launched");
        Ok(FireOutcome::Launched(bullet))
    }

    /// Applies one raw input event to the tank bound to it.
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                let Some((tank, action)) = self.router.keyboard().route_down(&key) else {
                    return;
                };
                // Fire only on the press edge; key repeat keeps the flag set.
                if action == TankAction::Fire && !self.is_held(tank, TankAction::Fire) {
                    self.fire_from_input(tank);
                }
                self.set_action(tank, action, true);
            }
            InputEvent::KeyUp(key) => {
                for (tank, action) in self.router.keyboard().route_up(&key) {
                    self.set_action(tank, action, false);
                }
            }
            InputEvent::MouseDown(button) => {
                let Some(tank) = self.router.mouse().route_down(button) else {
                    return;
                };
                if !self.is_held(tank, TankAction::Fire) {
                    self.fire_from_input(tank);
                    self.set_action(tank, TankAction::Fire, true);
                }
            }
            InputEvent::MouseUp(button) => {
                if let Some(tank) = self.router.mouse().route_up(button) {
                    self.set_action(tank, TankAction::Fire, false);
                }
            }
            InputEvent::MouseMove(position) => self.router.mouse_mut().set_pointer(position),
        }
    }

    /// Advances simulated time by `dt` and runs one tick.
    ///
    /// Order: due timers, `BeforeTick` handlers, `Tick` handlers, then physics integration.
    pub fn step(&mut self, dt: Duration) {
        self.clock += dt;
        self.tick += 1;

        while let Some((_, task)) = self.timers.pop_due(self.clock) {
            self.run_timer(task);
        }

        self.dispatch(TickPhase::BeforeTick);
        self.dispatch(TickPhase::Tick);

        self.physics.step(dt);
    }

    pub fn snapshot(&self) -> WorldUpdate {
        let tanks = self
            .tanks
            .values()
            .filter_map(|tank| {
                let body = self.physics.body(tank.body)?;
                Some(TankSnapshot {
                    id: tank.id,
                    x: body.position.x,
                    y: body.position.y,
                    angle: body.angle,
                    hull_fill: self.current_fill(tank, HULL_PART),
                    turret_fill: self.current_fill(tank, TURRET_PART),
                    live_projectiles: tank.state.live_projectiles,
                })
            })
            .collect();

        let bullets = self
            .bullets
            .values()
            .filter_map(|bullet| {
                let body = self.physics.body(bullet.body)?;
                Some(BulletSnapshot {
                    id: bullet.id,
                    owner_id: bullet.owner,
                    x: body.position.x,
                    y: body.position.y,
                })
            })
            .collect();

        WorldUpdate {
            tick: self.tick,
            tanks,
            bullets,
        }
    }

    fn current_fill(&self, tank: &Tank, part: usize) -> String {
        self.physics
            .fill(tank.body, part)
            .unwrap_or_else(|| tank.part_fill(part))
            .to_string()
    }

    fn tank_body(&self, id: TankId) -> Result<BodyId, SimError> {
        self.tanks
            .get(&id)
            .map(|tank| tank.body)
            .ok_or(SimError::UnknownTank(id))
    }

    fn tank_by_body(&self, body: BodyId) -> Option<TankId> {
        self.tanks
            .values()
            .find(|tank| tank.body == body)
            .map(|tank| tank.id)
    }

    fn is_held(&self, id: TankId, action: TankAction) -> bool {
        self.tanks
            .get(&id)
            .is_some_and(|tank| tank.state.is_held(action))
    }

    fn set_action(&mut self, id: TankId, action: TankAction, held: bool) {
        if let Some(tank) = self.tanks.get_mut(&id) {
            tank.state.set(action, held);
        }
    }

    fn fire_from_input(&mut self, id: TankId) {
        match self.fire(id) {
            Ok(outcome) => debug!(tank_id = %id, ?outcome, "fire input"),
            Err(error) => warn!(tank_id = %id, %error, "fire input for missing tank"),
        }
    }

    fn run_destroy_hook(&mut self, id: TankId, hook: DestroyHook) -> Result<(), HookError> {
        match hook {
            DestroyHook::DetachKeyboard => match self.router.keyboard_mut().detach(id) {
                0 => Err(HookError::NotAttached {
                    registry: "keyboard",
                }),
                _ => Ok(()),
            },
            DestroyHook::DetachMouse => match self.router.mouse_mut().detach(id) {
                0 => Err(HookError::NotAttached { registry: "mouse" }),
                _ => Ok(()),
            },
            DestroyHook::Unsubscribe(subscription) => {
                if self.events.unsubscribe(subscription) {
                    Ok(())
                } else {
                    Err(HookError::NotSubscribed)
                }
            }
            DestroyHook::Custom(cleanup) => catch_unwind(AssertUnwindSafe(cleanup))
                .unwrap_or_else(|_| Err(HookError::Failed("cleanup panicked".to_string()))),
        }
    }

    fn dispatch(&mut self, phase: TickPhase) {
        for (subscription, subscriber) in self.events.subscribers(phase) {
            // An earlier handler in this pass may have cancelled it.
            if !self.events.is_subscribed(subscription) {
                continue;
            }
            match subscriber {
                Subscriber::Tank(id) => self.tank_tick(id),
                Subscriber::BulletWatch(id) => self.bullet_watch(id),
            }
        }
    }

    fn run_timer(&mut self, task: TimerTask) {
        match task {
            TimerTask::BulletExpiry(id) => {
                self.retire_bullet(id, RetireCause::Expired);
            }
            TimerTask::RestoreFill { tank, part } => self.restore_fill(tank, part),
        }
    }

    /// Drives the tank, then pushes away the first other tank it overlaps.
    pub(crate) fn tank_tick(&mut self, id: TankId) {
        let Some(tank) = self.tanks.get_mut(&id) else {
            return;
        };
        let body = tank.body;
        tank.drive.apply(DriveContext {
            body,
            state: &tank.state,
            pointer: self.router.pointer(),
            physics: &mut self.physics,
        });

        let others: Vec<BodyId> = self
            .physics
            .bodies_in(CollisionCategory::Tank)
            .into_iter()
            .filter(|other| *other != body)
            .collect();
        let Some(contact) = self.physics.collides(body, &others).first().copied() else {
            return;
        };
        let Some(state) = self.physics.body(body) else {
            return;
        };

        // Half a turn of our own velocity, scaled up, handed to the other tank only.
        let push = -state.velocity * self.settings.tank.bounce_factor;
        self.physics.set_velocity(contact.other, push);
        debug!(tank_id = %id, "tank overlap pushed partner");
    }

    fn bullet_watch(&mut self, id: BulletId) {
        let Some(body) = self.bullets.get(&id).map(|bullet| bullet.body) else {
            return;
        };
        let tanks = self.physics.bodies_in(CollisionCategory::Tank);
        if let Some(contact) = self.physics.collides(body, &tanks).first().copied() {
            self.resolve_hit(id, contact, RetireCause::Hit);
        }
    }

    /// Places a new bullet at the muzzle and either launches it or resolves an instant hit.
    fn create_bullet(&mut self, owner: TankId) -> Option<BulletId> {
        let tank = self.tanks.get_mut(&owner)?;
        let origin = self.physics.body(tank.body)?;
        tank.state.live_projectiles += 1;

        let id = BulletId(self.next_bullet_id);
        self.next_bullet_id += 1;

        let tuning = self.settings.projectile;
        let body = self.physics.create_body(bullet_body(&tuning));
        let expiry = self
            .timers
            .schedule(self.clock, tuning.life_time, TimerTask::BulletExpiry(id));
        self.physics.add(body);
        self.bullets.insert(
            id,
            Bullet {
                id,
                owner,
                body,
                expiry,
                watch: None,
            },
        );

        let rotation = Vec2::from_angle(origin.angle);
        self.physics.set_position(
            body,
            origin.position + rotation.rotate(Vec2::new(0.0, -tuning.muzzle_distance)),
        );

        // Muzzle pushed into a wall: the shot lands on the single tank it touches.
        let tanks = self.physics.bodies_in(CollisionCategory::Tank);
        let walls = self.physics.bodies_in(CollisionCategory::Wall);
        let tank_contacts = self.physics.collides(body, &tanks);
        let touches_wall = !self.physics.collides(body, &walls).is_empty();
        if tank_contacts.len() == 1 && touches_wall {
            self.resolve_hit(id, tank_contacts[0], RetireCause::SpawnHit);
            return None;
        }

        // Clear of the tank's own turret.
        self.physics.set_position(
            body,
            origin.position + rotation.rotate(Vec2::new(0.0, -tuning.launch_distance)),
        );
        let watch = self
            .events
            .subscribe(TickPhase::BeforeTick, Subscriber::BulletWatch(id));
        if let Some(bullet) = self.bullets.get_mut(&id) {
            bullet.watch = Some(watch);
        }
        Some(id)
    }

    fn resolve_hit(&mut self, bullet: BulletId, contact: Collision, cause: RetireCause) {
        if !self.retire_bullet(bullet, cause) {
            return;
        }
        let Some(struck) = self.tank_by_body(contact.other) else {
            return;
        };
        info!(bullet_id = %bullet, tank_id = %struck, ?cause, "tank hit");
        self.flash(struck, contact.other_part);
    }

    fn flash(&mut self, id: TankId, part: usize) {
        let tuning = self.settings.projectile;
        let Some(tank) = self.tanks.get_mut(&id) else {
            return;
        };
        self.physics.set_fill(tank.body, part, tuning.hit_color);
        let timer = self
            .timers
            .schedule(self.clock, tuning.hit_flash, TimerTask::RestoreFill { tank: id, part });
        // A fresh hit restarts the flash instead of stacking restores.
        if let Some(previous) = tank.pending_flashes.insert(part, timer) {
            self.timers.cancel(previous);
        }
    }

    fn restore_fill(&mut self, id: TankId, part: usize) {
        let Some(tank) = self.tanks.get_mut(&id) else {
            return;
        };
        tank.pending_flashes.remove(&part);
        let fill = tank.part_fill(part).to_string();
        self.physics.set_fill(tank.body, part, &fill);
    }

    /// Single exit for every bullet. Returns false when it was already retired.
    pub(crate) fn retire_bullet(&mut self, id: BulletId, cause: RetireCause) -> bool {
        let Some(bullet) = self.bullets.remove(&id) else {
            return false;
        };

        if let Some(owner) = self.tanks.get_mut(&bullet.owner) {
            owner.state.live_projectiles = owner.state.live_projectiles.saturating_sub(1);
        }
        self.physics.remove(bullet.body);
        self.timers.cancel(bullet.expiry);
        if let Some(watch) = bullet.watch {
            self.events.unsubscribe(watch);
        }

        debug!(bullet_id = %id, owner_id = %bullet.owner, ?cause, "bullet retired");
        true
    }
}
