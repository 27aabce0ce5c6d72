use std::collections::BTreeSet;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A 2D vector in screen space (x right, y down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Identity of a body inside the world that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a body is for. Collision filtering and drawing key off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyLabel {
    Ball,
    Ground,
    Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

/// Creation options for a body, mirroring what a rigid-body engine accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyOptions {
    pub label: BodyLabel,
    pub restitution: f32,
    pub friction_air: f32,
    pub density: f32,
    /// Overrides `density * area` when set.
    pub mass: Option<f32>,
    pub is_static: bool,
    pub is_sensor: bool,
}

impl BodyOptions {
    pub const DEFAULT_FRICTION_AIR: f32 = 0.01;
    pub const DEFAULT_DENSITY: f32 = 0.001;

    pub fn new(label: BodyLabel) -> Self {
        Self {
            label,
            restitution: 0.0,
            friction_air: Self::DEFAULT_FRICTION_AIR,
            density: Self::DEFAULT_DENSITY,
            mass: None,
            is_static: false,
            is_sensor: false,
        }
    }

    pub fn restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn friction_air(mut self, friction_air: f32) -> Self {
        self.friction_air = friction_air;
        self
    }

    pub fn density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn fixed(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn sensor(mut self) -> Self {
        self.is_sensor = true;
        self
    }
}

/// A rigid body. Created "pending" (no id) and given an id when a world
/// takes ownership of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    id: Option<BodyId>,
    pub label: BodyLabel,
    pub shape: Shape,
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
    pub restitution: f32,
    pub friction_air: f32,
    pub is_static: bool,
    pub is_sensor: bool,
    /// Set for exactly one rendered frame after a target is struck.
    pub hit: bool,
}

impl Body {
    pub fn circle(x: f32, y: f32, radius: f32, options: BodyOptions) -> Result<Self, CoreError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(CoreError::AdapterFailure(format!(
                "circle radius must be positive, got {radius}"
            )));
        }
        let area = std::f32::consts::PI * radius * radius;
        Self::build(Vec2::new(x, y), Shape::Circle { radius }, area, options)
    }

    pub fn rect(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        options: BodyOptions,
    ) -> Result<Self, CoreError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(CoreError::AdapterFailure(format!(
                "rectangle extents must be positive, got {width}x{height}"
            )));
        }
        Self::build(
            Vec2::new(x, y),
            Shape::Rect { width, height },
            width * height,
            options,
        )
    }

    fn build(
        position: Vec2,
        shape: Shape,
        area: f32,
        options: BodyOptions,
    ) -> Result<Self, CoreError> {
        if !position.is_finite() {
            return Err(CoreError::AdapterFailure(format!(
                "body position must be finite, got {position:?}"
            )));
        }
        let mass = options.mass.unwrap_or(options.density * area);
        if !options.is_static && !(mass.is_finite() && mass > 0.0) {
            return Err(CoreError::AdapterFailure(format!(
                "dynamic body mass must be positive, got {mass}"
            )));
        }
        Ok(Self {
            id: None,
            label: options.label,
            shape,
            position,
            velocity: Vec2::ZERO,
            mass,
            restitution: options.restitution,
            friction_air: options.friction_air,
            is_static: options.is_static,
            is_sensor: options.is_sensor,
            hit: false,
        })
    }

    /// Id assigned by the owning world, `None` while pending.
    pub fn id(&self) -> Option<BodyId> {
        self.id
    }

    /// Circle radius, `None` for rectangles.
    pub fn radius(&self) -> Option<f32> {
        match self.shape {
            Shape::Circle { radius } => Some(radius),
            Shape::Rect { .. } => None,
        }
    }

    /// Zero for static bodies so they never move in response to contacts.
    pub fn inverse_mass(&self) -> f32 {
        if self.is_static { 0.0 } else { 1.0 / self.mass }
    }
}

/// Ordered pair key for a contact between two bodies (lower id first).
pub type ContactKey = (BodyId, BodyId);

pub fn contact_key(a: BodyId, b: BodyId) -> ContactKey {
    if a <= b { (a, b) } else { (b, a) }
}

/// The set of bodies plus global gravity. Insertion order is draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub gravity: Vec2,
    bodies: Vec<Body>,
    next_id: u32,
    contacts: BTreeSet<ContactKey>,
}

impl World {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: Vec::new(),
            next_id: 1,
            contacts: BTreeSet::new(),
        }
    }

    /// Take ownership of a pending body and return its new id.
    pub fn add_body(&mut self, mut body: Body) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        body.id = Some(id);
        self.bodies.push(body);
        id
    }

    pub fn add_bodies(&mut self, bodies: impl IntoIterator<Item = Body>) -> Vec<BodyId> {
        bodies.into_iter().map(|b| self.add_body(b)).collect()
    }

    /// Remove a body, handing ownership back to the caller as a pending body.
    pub fn remove_body(&mut self, id: BodyId) -> Result<Body, CoreError> {
        let index = self
            .bodies
            .iter()
            .position(|b| b.id == Some(id))
            .ok_or(CoreError::NotFound(id))?;
        let mut body = self.bodies.remove(index);
        body.id = None;
        self.contacts.retain(|&(a, b)| a != id && b != id);
        Ok(body)
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == Some(id))
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == Some(id))
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn with_label(&self, label: BodyLabel) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(move |b| b.label == label)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Contacts that were touching after the last step.
    pub fn contacts(&self) -> &BTreeSet<ContactKey> {
        &self.contacts
    }

    /// Replace the touching set and return the pairs that were not touching
    /// before, in key order. This is what makes collision events begin-only.
    pub fn begin_contacts(&mut self, touching: BTreeSet<ContactKey>) -> Vec<ContactKey> {
        let begun = touching.difference(&self.contacts).copied().collect();
        self.contacts = touching;
        begun
    }
}
