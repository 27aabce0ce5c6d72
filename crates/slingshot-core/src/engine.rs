use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::world::{Body, BodyId, BodyOptions, Vec2, World};

/// Two bodies that started touching during a step. `a < b` by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionPair {
    pub a: BodyId,
    pub b: BodyId,
}

/// Capability surface of a rigid-body solver.
///
/// The range owns worlds and bodies; the engine only creates bodies and
/// advances worlds. Implementations must keep no per-world state of their own
/// (contact history lives in [`World`]) so one engine can step the live world
/// and a throwaway prediction world without the two influencing each other.
pub trait PhysicsEngine {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn create_world(&self, gravity: Vec2) -> World {
        World::new(gravity)
    }

    fn make_circle_body(
        &self,
        x: f32,
        y: f32,
        radius: f32,
        options: BodyOptions,
    ) -> Result<Body, CoreError> {
        Body::circle(x, y, radius, options)
    }

    fn make_rect_body(
        &self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        options: BodyOptions,
    ) -> Result<Body, CoreError> {
        Body::rect(x, y, width, height, options)
    }

    /// Advance `world` by one fixed interval of `dt_ms` milliseconds and
    /// return the contacts that began during this step (once per onset).
    fn step(&mut self, world: &mut World, dt_ms: f32) -> Result<Vec<CollisionPair>, CoreError>;

    fn set_velocity(
        &mut self,
        world: &mut World,
        id: BodyId,
        velocity: Vec2,
    ) -> Result<(), CoreError> {
        let body = world.get_mut(id).ok_or(CoreError::NotFound(id))?;
        if !body.is_static {
            body.velocity = velocity;
        }
        Ok(())
    }
}

impl<E: PhysicsEngine + ?Sized> PhysicsEngine for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn create_world(&self, gravity: Vec2) -> World {
        (**self).create_world(gravity)
    }

    fn make_circle_body(
        &self,
        x: f32,
        y: f32,
        radius: f32,
        options: BodyOptions,
    ) -> Result<Body, CoreError> {
        (**self).make_circle_body(x, y, radius, options)
    }

    fn make_rect_body(
        &self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        options: BodyOptions,
    ) -> Result<Body, CoreError> {
        (**self).make_rect_body(x, y, width, height, options)
    }

    fn step(&mut self, world: &mut World, dt_ms: f32) -> Result<Vec<CollisionPair>, CoreError> {
        (**self).step(world, dt_ms)
    }

    fn set_velocity(
        &mut self,
        world: &mut World,
        id: BodyId,
        velocity: Vec2,
    ) -> Result<(), CoreError> {
        (**self).set_velocity(world, id, velocity)
    }
}
