use std::collections::BTreeSet;

use slingshot_core::engine::{CollisionPair, PhysicsEngine};
use slingshot_core::error::CoreError;
use slingshot_core::world::{Body, ContactKey, Shape, Vec2, World, contact_key};

/// Step length (ms) that velocities are measured against: a velocity of
/// `v` moves a body `v` pixels per 1000/60 ms.
pub const BASE_DELTA_MS: f32 = 1000.0 / 60.0;
/// Gravity multiplier, so a gravity of 1 pulls at 0.001 px/ms².
pub const GRAVITY_SCALE: f32 = 0.001;
/// Approach speeds (px/step) below this do not bounce; the body settles.
pub const RESTING_THRESHOLD: f32 = 2.0;
/// Coulomb friction coefficient between touching surfaces.
pub const SURFACE_FRICTION: f32 = 0.1;
/// Physics substeps per step for more accurate collision detection.
const SUBSTEPS: u32 = 4;

/// Overlap between two bodies. `normal` points from the first body to the second.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Contact {
    normal: Vec2,
    depth: f32,
}

/// The bundled rigid-body solver: circles and axis-aligned rectangles,
/// gravity, air friction, restitution, sensors, begin-only contact events.
#[derive(Debug, Clone, Default)]
pub struct ArcadeSolver;

impl ArcadeSolver {
    pub fn new() -> Self {
        Self
    }
}

impl PhysicsEngine for ArcadeSolver {
    fn name(&self) -> &'static str {
        "arcade"
    }

    fn step(&mut self, world: &mut World, dt_ms: f32) -> Result<Vec<CollisionPair>, CoreError> {
        if !(dt_ms.is_finite() && dt_ms > 0.0) {
            return Err(CoreError::AdapterFailure(format!(
                "step interval must be positive, got {dt_ms}"
            )));
        }

        let scale = dt_ms / BASE_DELTA_MS;
        let sub = scale / SUBSTEPS as f32;
        // Velocity gained per full base step, in px/step.
        let accel = world.gravity * (GRAVITY_SCALE * BASE_DELTA_MS * BASE_DELTA_MS);

        for body in world.bodies_mut().iter_mut().filter(|b| !b.is_static) {
            let damping = (1.0 - body.friction_air * scale).max(0.0);
            body.velocity = body.velocity * damping;
        }

        let mut touching = BTreeSet::new();
        for _ in 0..SUBSTEPS {
            for body in world.bodies_mut().iter_mut().filter(|b| !b.is_static) {
                body.velocity += accel * sub;
                body.position += body.velocity * sub;
            }
            collide_all(world.bodies_mut(), &mut touching);
        }

        if let Some(bad) = world
            .bodies()
            .iter()
            .find(|b| !(b.position.is_finite() && b.velocity.is_finite()))
        {
            return Err(CoreError::AdapterFailure(format!(
                "body {:?} ({:?}) diverged to a non-finite state",
                bad.id(),
                bad.label
            )));
        }

        Ok(world
            .begin_contacts(touching)
            .into_iter()
            .map(|(a, b)| CollisionPair { a, b })
            .collect())
    }
}

/// Detect every overlapping pair, record it, and resolve it unless a
/// sensor is involved.
fn collide_all(bodies: &mut [Body], touching: &mut BTreeSet<ContactKey>) {
    let n = bodies.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = pair_mut(bodies, i, j);
            if a.is_static && b.is_static {
                continue;
            }
            let Some(contact) = find_contact(a, b) else {
                continue;
            };
            if let (Some(ida), Some(idb)) = (a.id(), b.id()) {
                touching.insert(contact_key(ida, idb));
            }
            if !a.is_sensor && !b.is_sensor {
                resolve(a, b, contact);
            }
        }
    }
}

fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert!(i < j);
    let (head, tail) = bodies.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

fn find_contact(a: &Body, b: &Body) -> Option<Contact> {
    match (a.shape, b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(a.position, ra, b.position, rb)
        },
        (Shape::Circle { radius }, Shape::Rect { width, height }) => {
            circle_rect(a.position, radius, b.position, width, height)
        },
        (Shape::Rect { width, height }, Shape::Circle { radius }) => {
            circle_rect(b.position, radius, a.position, width, height).map(|c| Contact {
                normal: c.normal * -1.0,
                depth: c.depth,
            })
        },
        // Rectangles only ever appear as static ground.
        (Shape::Rect { .. }, Shape::Rect { .. }) => None,
    }
}

fn circle_circle(pa: Vec2, ra: f32, pb: Vec2, rb: f32) -> Option<Contact> {
    let delta = pb - pa;
    let dist = delta.length();
    let min_dist = ra + rb;
    if dist >= min_dist {
        return None;
    }
    let normal = if dist > 1e-6 {
        delta * (1.0 / dist)
    } else {
        Vec2::new(0.0, 1.0)
    };
    Some(Contact {
        normal,
        depth: min_dist - dist,
    })
}

/// Circle at `c` against an axis-aligned rectangle centered at `center`.
fn circle_rect(c: Vec2, r: f32, center: Vec2, width: f32, height: f32) -> Option<Contact> {
    let (hx, hy) = (width / 2.0, height / 2.0);
    let (left, right) = (center.x - hx, center.x + hx);
    let (top, bottom) = (center.y - hy, center.y + hy);

    let inside = c.x > left && c.x < right && c.y > top && c.y < bottom;
    if inside {
        // Push out through the nearest face.
        let faces = [
            (c.x - left, Vec2::new(-1.0, 0.0)),
            (right - c.x, Vec2::new(1.0, 0.0)),
            (c.y - top, Vec2::new(0.0, -1.0)),
            (bottom - c.y, Vec2::new(0.0, 1.0)),
        ];
        let (dist, outward) = faces
            .into_iter()
            .fold(faces[0], |best, f| if f.0 < best.0 { f } else { best });
        return Some(Contact {
            normal: outward * -1.0,
            depth: r + dist,
        });
    }

    let closest = Vec2::new(c.x.clamp(left, right), c.y.clamp(top, bottom));
    let delta = c - closest;
    let dist = delta.length();
    if dist >= r || dist <= 1e-6 {
        return None;
    }
    Some(Contact {
        normal: delta * (-1.0 / dist),
        depth: r - dist,
    })
}

fn resolve(a: &mut Body, b: &mut Body, contact: Contact) {
    let (ia, ib) = (a.inverse_mass(), b.inverse_mass());
    let total = ia + ib;
    if total <= 0.0 {
        return;
    }
    let n = contact.normal;

    a.position -= n * (contact.depth * ia / total);
    b.position += n * (contact.depth * ib / total);

    let rv = b.velocity - a.velocity;
    let vn = rv.dot(n);
    if vn >= 0.0 {
        return;
    }

    let restitution = if -vn < RESTING_THRESHOLD {
        0.0
    } else {
        a.restitution.max(b.restitution)
    };
    let j = -(1.0 + restitution) * vn / total;
    a.velocity -= n * (j * ia);
    b.velocity += n * (j * ib);

    let tangent_v = rv - n * vn;
    let speed = tangent_v.length();
    if speed > 1e-6 {
        let t = tangent_v * (1.0 / speed);
        let jt = (speed / total).min(SURFACE_FRICTION * j);
        a.velocity += t * (jt * ia);
        b.velocity -= t * (jt * ib);
    }
}
