use serde::{Deserialize, Serialize};

/// World and body parameters for the live simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity_x: f32,
    pub gravity_y: f32,
    /// Simulation tick rate in Hz; dt = 1000 / rate ms.
    pub tick_rate_hz: f32,
    pub ball_radius: f32,
    pub ball_restitution: f32,
    pub ball_friction_air: f32,
    pub target_restitution: f32,
    /// Targets are heavy so a single shot nudges rather than launches them.
    pub target_mass: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity_x: 0.0,
            gravity_y: 1.0,
            tick_rate_hz: 60.0,
            ball_radius: 20.0,
            ball_restitution: 0.6,
            ball_friction_air: 0.01,
            target_restitution: 0.3,
            target_mass: 20.0,
        }
    }
}

/// Allowed aim ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchSettings {
    /// Degrees above horizontal.
    pub angle_range: (f32, f32),
    pub power_range: (f32, f32),
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            angle_range: (10.0, 80.0),
            power_range: (5.0, 30.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub hit_award: u32,
    /// How long a struck target stays in the world before removal.
    pub removal_delay_ms: u64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            hit_award: 10,
            removal_delay_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionSettings {
    /// Number of forecast points per prediction.
    pub steps: usize,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self { steps: 50 }
    }
}

/// Which target layout to build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    pub width: f32,
    pub height: f32,
    /// Index into the built-in arena catalog.
    pub arena_index: usize,
    /// When set, targets are scattered from this seed instead.
    pub scatter_seed: Option<u64>,
    pub scatter_count: usize,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            arena_index: 0,
            scatter_seed: None,
            scatter_count: 5,
        }
    }
}

/// Top-level range configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    pub physics: PhysicsSettings,
    pub launch: LaunchSettings,
    pub scoring: ScoringSettings,
    pub prediction: PredictionSettings,
    pub arena: ArenaSettings,
}

impl RangeConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("SLINGSHOT_RANGE_CONFIG")
            .unwrap_or_else(|_| "config/range.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    Self::default()
                },
            },
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_range() {
        let cfg = RangeConfig::default();
        assert_eq!(cfg.physics.gravity_y, 1.0);
        assert_eq!(cfg.physics.ball_radius, 20.0);
        assert_eq!(cfg.physics.ball_restitution, 0.6);
        assert_eq!(cfg.launch.angle_range, (10.0, 80.0));
        assert_eq!(cfg.launch.power_range, (5.0, 30.0));
        assert_eq!(cfg.scoring.hit_award, 10);
        assert_eq!(cfg.scoring.removal_delay_ms, 300);
        assert_eq!(cfg.prediction.steps, 50);
        assert_eq!((cfg.arena.width, cfg.arena.height), (800.0, 600.0));
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let cfg = RangeConfig::from_toml_str(
            r#"
            [physics]
            gravity_y = 2.0

            [scoring]
            hit_award = 25

            [arena]
            scatter_seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(cfg.physics.gravity_y, 2.0);
        assert_eq!(cfg.physics.ball_radius, 20.0);
        assert_eq!(cfg.scoring.hit_award, 25);
        assert_eq!(cfg.scoring.removal_delay_ms, 300);
        assert_eq!(cfg.arena.scatter_seed, Some(7));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(RangeConfig::from_toml_str("physics = 3").is_err());
    }

    #[test]
    fn serializes_back_to_toml() {
        let cfg = RangeConfig::default();
        let text = toml::to_string(&cfg).unwrap();
        assert_eq!(RangeConfig::from_toml_str(&text).unwrap(), cfg);
    }
}
