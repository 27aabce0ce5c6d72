pub mod engine;
pub mod error;
pub mod time;
pub mod world;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::engine::{CollisionPair, PhysicsEngine};
    use crate::error::CoreError;
    use crate::world::{BodyId, Vec2, World};

    /// Delegating engine that records the calls made through it.
    pub struct RecordingEngine<E> {
        pub inner: E,
        pub steps: usize,
        pub velocity_calls: Vec<(BodyId, Vec2)>,
        /// When set, `step` fails once this many steps have succeeded.
        pub fail_after: Option<usize>,
    }

    impl<E> RecordingEngine<E> {
        pub fn new(inner: E) -> Self {
            Self {
                inner,
                steps: 0,
                velocity_calls: Vec::new(),
                fail_after: None,
            }
        }

        pub fn failing_after(inner: E, steps: usize) -> Self {
            Self {
                fail_after: Some(steps),
                ..Self::new(inner)
            }
        }
    }

    impl<E: PhysicsEngine> PhysicsEngine for RecordingEngine<E> {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn step(
            &mut self,
            world: &mut World,
            dt_ms: f32,
        ) -> Result<Vec<CollisionPair>, CoreError> {
            if self.fail_after.is_some_and(|n| self.steps >= n) {
                return Err(CoreError::AdapterFailure("injected step failure".into()));
            }
            self.steps += 1;
            self.inner.step(world, dt_ms)
        }

        fn set_velocity(
            &mut self,
            world: &mut World,
            id: BodyId,
            velocity: Vec2,
        ) -> Result<(), CoreError> {
            self.velocity_calls.push((id, velocity));
            self.inner.set_velocity(world, id, velocity)
        }
    }

    /// Minimal engine: applies gravity and moves bodies, never reports contacts.
    #[derive(Debug, Default)]
    pub struct DriftEngine;

    impl PhysicsEngine for DriftEngine {
        fn name(&self) -> &'static str {
            "drift"
        }

        fn step(
            &mut self,
            world: &mut World,
            _dt_ms: f32,
        ) -> Result<Vec<CollisionPair>, CoreError> {
            let gravity = world.gravity;
            for body in world.bodies_mut().iter_mut().filter(|b| !b.is_static) {
                body.velocity += gravity;
                body.position += body.velocity;
            }
            Ok(Vec::new())
        }
    }

    /// Assert two floats are within `tol` of each other.
    pub fn assert_close(actual: f32, expected: f32, tol: f32) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected} ± {tol}, got {actual}"
        );
    }
}
