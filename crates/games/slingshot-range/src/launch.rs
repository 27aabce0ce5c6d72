use serde::{Deserialize, Serialize};

use slingshot_core::engine::PhysicsEngine;
use slingshot_core::error::{CoreError, check_range};
use slingshot_core::world::{BodyId, Vec2, World};

use crate::config::LaunchSettings;

/// Aim snapshot: angle in degrees above horizontal, power in px/step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimParameters {
    pub angle: f32,
    pub power: f32,
}

impl AimParameters {
    pub const fn new(angle: f32, power: f32) -> Self {
        Self { angle, power }
    }

    /// Build aim parameters, rejecting values outside the configured ranges.
    pub fn validated(angle: f32, power: f32, settings: &LaunchSettings) -> Result<Self, CoreError> {
        Ok(Self {
            angle: check_range("angle", angle, settings.angle_range)?,
            power: check_range("power", power, settings.power_range)?,
        })
    }

    /// Launch velocity. Screen y grows downward, so "up" is negative y.
    pub fn velocity(&self) -> Vec2 {
        let rad = self.angle.to_radians();
        Vec2::new(self.power * rad.cos(), -self.power * rad.sin())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchState {
    /// No aim has been set yet.
    #[default]
    Idle,
    /// Aimed and waiting for the fire trigger; prediction is shown.
    Armed,
    /// Velocity applied to the ball; prediction is hidden.
    Launched,
}

/// Gates when the ball receives its launch velocity.
#[derive(Debug, Clone)]
pub struct LaunchController {
    settings: LaunchSettings,
    state: LaunchState,
    aim: Option<AimParameters>,
    velocity: Vec2,
}

impl LaunchController {
    pub fn new(settings: LaunchSettings) -> Self {
        Self {
            settings,
            state: LaunchState::Idle,
            aim: None,
            velocity: Vec2::ZERO,
        }
    }

    pub fn state(&self) -> LaunchState {
        self.state
    }

    pub fn aim(&self) -> Option<AimParameters> {
        self.aim
    }

    pub fn settings(&self) -> &LaunchSettings {
        &self.settings
    }

    /// Check aim values without applying them.
    pub fn validate(&self, angle: f32, power: f32) -> Result<AimParameters, CoreError> {
        AimParameters::validated(angle, power, &self.settings)
    }

    /// Apply new aim. Arms the controller from `Idle`, and re-arms it after a
    /// launch without touching the velocity the ball already has.
    pub fn set_aim(&mut self, angle: f32, power: f32) -> Result<AimParameters, CoreError> {
        let aim = self.validate(angle, power)?;
        self.aim = Some(aim);
        self.velocity = aim.velocity();
        if self.state != LaunchState::Armed {
            tracing::debug!(from = ?self.state, angle, power, "Launch controller armed");
        }
        self.state = LaunchState::Armed;
        Ok(aim)
    }

    /// Launch the ball if armed. Returns `Ok(false)` (and changes nothing)
    /// in any other state.
    pub fn fire<E: PhysicsEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        world: &mut World,
        ball: BodyId,
    ) -> Result<bool, CoreError> {
        if self.state != LaunchState::Armed {
            tracing::debug!(state = ?self.state, "Fire ignored");
            return Ok(false);
        }
        engine.set_velocity(world, ball, self.velocity)?;
        self.state = LaunchState::Launched;
        Ok(true)
    }

    /// The velocity a fire would apply, while armed.
    pub fn armed_velocity(&self) -> Option<Vec2> {
        (self.state == LaunchState::Armed).then_some(self.velocity)
    }

    pub fn reset(&mut self) {
        self.state = LaunchState::Idle;
        self.aim = None;
        self.velocity = Vec2::ZERO;
    }
}
