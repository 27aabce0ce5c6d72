use slingshot_core::engine::PhysicsEngine;
use slingshot_core::error::CoreError;
use slingshot_core::world::{BodyId, BodyLabel, BodyOptions, Vec2, World};

/// Everything a forecast depends on. Two equal requests produce equal paths.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub gravity: Vec2,
    pub origin: Vec2,
    pub velocity: Vec2,
    pub steps: usize,
    pub sample_radius: f32,
    pub dt_ms: f32,
    pub restitution: f32,
    pub friction_air: f32,
}

impl PredictionRequest {
    /// Build a request for launching the live `ball` from where it is now,
    /// copying its radius and surface parameters. `None` if the ball is gone
    /// or not a circle.
    pub fn for_ball(
        world: &World,
        ball: BodyId,
        velocity: Vec2,
        steps: usize,
        dt_ms: f32,
    ) -> Option<Self> {
        let body = world.get(ball)?;
        Some(Self {
            gravity: world.gravity,
            origin: body.position,
            velocity,
            steps,
            sample_radius: body.radius()?,
            dt_ms,
            restitution: body.restitution,
            friction_air: body.friction_air,
        })
    }
}

/// Forecast a launch by flying a sensor "ghost" ball through a throwaway
/// world of its own. Returns one position per step, recorded after each
/// advance. Nothing from the live world is read or written.
pub fn predict_path<E: PhysicsEngine + ?Sized>(
    engine: &mut E,
    request: &PredictionRequest,
) -> Result<Vec<Vec2>, CoreError> {
    let mut ghost_world = engine.create_world(request.gravity);
    let mut ghost = engine.make_circle_body(
        request.origin.x,
        request.origin.y,
        request.sample_radius,
        BodyOptions::new(BodyLabel::Ball)
            .restitution(request.restitution)
            .friction_air(request.friction_air)
            .sensor(),
    )?;
    // Still pending, so the launch velocity is ours to set directly.
    ghost.velocity = request.velocity;
    let ghost = ghost_world.add_body(ghost);

    let mut path = Vec::with_capacity(request.steps);
    for _ in 0..request.steps {
        engine.step(&mut ghost_world, request.dt_ms)?;
        let body = ghost_world.get(ghost).ok_or(CoreError::NotFound(ghost))?;
        path.push(body.position);
    }
    Ok(path)
}
