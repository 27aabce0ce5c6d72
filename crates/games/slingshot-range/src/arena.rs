use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use slingshot_core::engine::PhysicsEngine;
use slingshot_core::error::CoreError;
use slingshot_core::world::{BodyId, BodyLabel, BodyOptions, Vec2, World};

use crate::config::{ArenaSettings, PhysicsSettings};

/// Thickness of the ground slab along the bottom edge.
pub const GROUND_HEIGHT: f32 = 40.0;
/// Horizontal distance of the ball spawn from the left edge.
pub const BALL_SPAWN_X: f32 = 100.0;
/// Scattered targets stay right of this fraction of the width, away from the ball.
const SCATTER_MIN_X_FRACTION: f32 = 0.4;
/// Gap kept between scattered targets.
const SCATTER_GAP: f32 = 6.0;

/// A circular target resting on the ground at `x`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TargetSpec {
    pub x: f32,
    pub radius: f32,
}

/// Static layout of a range: canvas size, ball spawn, and targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Arena {
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub targets: Vec<TargetSpec>,
}

/// Ids of the bodies an arena put into a world.
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaBodies {
    pub ball: BodyId,
    pub ground: BodyId,
    pub targets: Vec<BodyId>,
}

impl Arena {
    /// Y coordinate of the ground's top surface.
    pub fn ground_top(&self) -> f32 {
        self.height - GROUND_HEIGHT
    }

    /// Center of the ground rectangle.
    pub fn ground_center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height - GROUND_HEIGHT / 2.0)
    }

    /// Ball spawn, resting on the ground.
    pub fn ball_spawn(&self, ball_radius: f32) -> Vec2 {
        Vec2::new(BALL_SPAWN_X, self.ground_top() - ball_radius)
    }

    /// Create the ball, ground and targets through `engine` and add them to
    /// `world` in draw order.
    pub fn populate<E: PhysicsEngine + ?Sized>(
        &self,
        engine: &E,
        world: &mut World,
        physics: &PhysicsSettings,
    ) -> Result<ArenaBodies, CoreError> {
        let spawn = self.ball_spawn(physics.ball_radius);
        let ball = engine.make_circle_body(
            spawn.x,
            spawn.y,
            physics.ball_radius,
            BodyOptions::new(BodyLabel::Ball)
                .restitution(physics.ball_restitution)
                .friction_air(physics.ball_friction_air),
        )?;
        let center = self.ground_center();
        let ground = engine.make_rect_body(
            center.x,
            center.y,
            self.width,
            GROUND_HEIGHT,
            BodyOptions::new(BodyLabel::Ground).fixed(),
        )?;

        let mut targets = Vec::with_capacity(self.targets.len());
        for spec in &self.targets {
            targets.push(engine.make_circle_body(
                spec.x,
                self.ground_top() - spec.radius,
                spec.radius,
                BodyOptions::new(BodyLabel::Target)
                    .restitution(physics.target_restitution)
                    .mass(physics.target_mass),
            )?);
        }

        let ball = world.add_body(ball);
        let ground = world.add_body(ground);
        let targets = world.add_bodies(targets);
        Ok(ArenaBodies {
            ball,
            ground,
            targets,
        })
    }
}

fn layout(name: &str, width: f32, height: f32, targets: &[(f32, f32)]) -> Arena {
    // Layouts are authored for an 800-wide canvas.
    let sx = width / 800.0;
    Arena {
        name: name.to_string(),
        width,
        height,
        targets: targets
            .iter()
            .map(|&(x, radius)| TargetSpec { x: x * sx, radius })
            .collect(),
    }
}

/// Open Field: three evenly spaced mid-size targets.
pub fn default_arena(width: f32, height: f32) -> Arena {
    layout(
        "Open Field",
        width,
        height,
        &[(450.0, 20.0), (560.0, 20.0), (670.0, 20.0)],
    )
}

/// Far Line: small targets crowded at the far edge.
fn far_line(width: f32, height: f32) -> Arena {
    layout(
        "Far Line",
        width,
        height,
        &[(600.0, 15.0), (650.0, 15.0), (700.0, 15.0), (750.0, 15.0)],
    )
}

/// Giants: two large, easy targets.
fn giants(width: f32, height: f32) -> Arena {
    layout("Giants", width, height, &[(420.0, 30.0), (620.0, 35.0)])
}

/// Return all built-in arenas.
pub fn all_arenas(width: f32, height: f32) -> Vec<Arena> {
    vec![
        default_arena(width, height),
        far_line(width, height),
        giants(width, height),
    ]
}

/// Reject canvas extents that are not finite and positive.
fn check_canvas(width: f32, height: f32) -> Result<(), CoreError> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(CoreError::AdapterFailure(format!(
            "arena canvas must be finite and positive, got {width}x{height}"
        )))
    }
}

/// Generate a deterministic arena with up to `count` non-overlapping targets.
pub fn scatter_targets(
    seed: u64,
    count: usize,
    width: f32,
    height: f32,
) -> Result<Arena, CoreError> {
    check_canvas(width, height)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let min_x = width * SCATTER_MIN_X_FRACTION;
    let mut targets: Vec<TargetSpec> = Vec::with_capacity(count);

    // Bounded retries; a crowded canvas may end up with fewer targets.
    for _ in 0..count * 20 {
        if targets.len() == count {
            break;
        }
        let radius = rng.random_range(12.0f32..28.0);
        let max_x = width - radius - SCATTER_GAP;
        if max_x <= min_x + radius {
            break;
        }
        let x = rng.random_range((min_x + radius)..max_x);
        let clear = targets
            .iter()
            .all(|t| (t.x - x).abs() >= t.radius + radius + SCATTER_GAP);
        if clear {
            targets.push(TargetSpec { x, radius });
        }
    }
    targets.sort_by(|a, b| a.x.total_cmp(&b.x));

    Ok(Arena {
        name: format!("Scatter #{seed}"),
        width,
        height,
        targets,
    })
}

/// Pick the arena described by `settings`. An out-of-range index falls back
/// to the last catalog entry.
pub fn from_settings(settings: &ArenaSettings) -> Result<Arena, CoreError> {
    if let Some(seed) = settings.scatter_seed {
        return scatter_targets(seed, settings.scatter_count, settings.width, settings.height);
    }
    check_canvas(settings.width, settings.height)?;
    let mut arenas = all_arenas(settings.width, settings.height);
    let index = settings.arena_index.min(arenas.len() - 1);
    Ok(arenas.swap_remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slingshot_core::test_helpers::DriftEngine;

    #[test]
    fn ball_spawns_resting_on_ground() {
        let arena = default_arena(800.0, 600.0);
        assert_eq!(arena.ball_spawn(20.0), Vec2::new(100.0, 540.0));
        assert_eq!(arena.ground_center(), Vec2::new(400.0, 580.0));
    }

    #[test]
    fn populate_adds_one_ball_static_ground_and_targets() {
        let arena = default_arena(800.0, 600.0);
        let engine = DriftEngine;
        let mut world = engine.create_world(Vec2::new(0.0, 1.0));
        let bodies = arena
            .populate(&engine, &mut world, &PhysicsSettings::default())
            .unwrap();

        assert_eq!(world.len(), 2 + arena.targets.len());
        assert_eq!(world.with_label(BodyLabel::Ball).count(), 1);
        assert!(world.get(bodies.ground).unwrap().is_static);
        for id in &bodies.targets {
            let t = world.get(*id).unwrap();
            assert!(!t.is_static && !t.is_sensor);
            assert_eq!(t.label, BodyLabel::Target);
            // Resting on the ground surface.
            assert_eq!(t.position.y + t.radius().unwrap(), arena.ground_top());
        }
    }

    #[test]
    fn all_arenas_have_targets_inside_canvas() {
        for arena in all_arenas(800.0, 600.0) {
            assert!(!arena.targets.is_empty(), "{} has no targets", arena.name);
            for t in &arena.targets {
                assert!(t.x - t.radius > BALL_SPAWN_X && t.x + t.radius < arena.width);
            }
        }
    }

    #[test]
    fn layouts_scale_with_width() {
        let narrow = default_arena(400.0, 300.0);
        assert_eq!(narrow.targets[0].x, 225.0);
    }

    #[test]
    fn same_seed_same_scatter() {
        let a = scatter_targets(42, 5, 800.0, 600.0).unwrap();
        let b = scatter_targets(42, 5, 800.0, 600.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn scattered_targets_do_not_overlap() {
        for seed in 0..50 {
            let arena = scatter_targets(seed, 5, 800.0, 600.0).unwrap();
            assert!(!arena.targets.is_empty());
            for pair in arena.targets.windows(2) {
                let gap = pair[1].x - pair[0].x - pair[0].radius - pair[1].radius;
                assert!(gap >= SCATTER_GAP - 1e-3, "seed {seed}: gap {gap}");
            }
        }
    }

    #[test]
    fn settings_choose_arena() {
        let mut settings = ArenaSettings::default();
        assert_eq!(from_settings(&settings).unwrap().name, "Open Field");
        settings.arena_index = 2;
        assert_eq!(from_settings(&settings).unwrap().name, "Giants");
        settings.arena_index = 99;
        assert_eq!(from_settings(&settings).unwrap().name, "Giants");
        settings.scatter_seed = Some(9);
        assert_eq!(from_settings(&settings).unwrap().name, "Scatter #9");
    }

    #[test]
    fn non_finite_canvas_is_rejected() {
        for width in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 0.0, -800.0] {
            let err = scatter_targets(1, 3, width, 600.0).unwrap_err();
            assert!(err.is_fatal(), "width {width}: {err}");
        }
        assert!(scatter_targets(1, 3, 800.0, f32::NAN).unwrap_err().is_fatal());

        let settings = ArenaSettings {
            width: f32::INFINITY,
            ..ArenaSettings::default()
        };
        assert!(from_settings(&settings).unwrap_err().is_fatal());
        let settings = ArenaSettings {
            width: f32::NAN,
            scatter_seed: Some(4),
            ..ArenaSettings::default()
        };
        assert!(from_settings(&settings).unwrap_err().is_fatal());
    }
}
