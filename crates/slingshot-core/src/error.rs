use crate::world::BodyId;

#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// An aim value fell outside its allowed range (or was not finite).
    InvalidParameter {
        name: &'static str,
        value: f32,
        range: (f32, f32),
    },
    /// A body was looked up or removed but is not in the world.
    NotFound(BodyId),
    /// The physics engine could not create a body or advance the world.
    AdapterFailure(String),
}

impl CoreError {
    /// Whether this error ends the session. Only adapter failures do;
    /// the other variants leave the simulation untouched.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AdapterFailure(_))
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameter { name, value, range } => write!(
                f,
                "invalid {name}: {value} (allowed {}..={})",
                range.0, range.1
            ),
            Self::NotFound(id) => write!(f, "body {id} not found in world"),
            Self::AdapterFailure(e) => write!(f, "physics adapter failure: {e}"),
        }
    }
}

impl std::error::Error for CoreError {}

/// Check that `value` is finite and inside `range` (inclusive).
pub fn check_range(name: &'static str, value: f32, range: (f32, f32)) -> Result<f32, CoreError> {
    if value.is_finite() && value >= range.0 && value <= range.1 {
        Ok(value)
    } else {
        Err(CoreError::InvalidParameter { name, value, range })
    }
}
