use thiserror::Error;

pub const DEFAULT_COMPOSITION_INTERVAL: f64 = 0.05;
pub const DEFAULT_TEMPERATURE_MIN_K: f64 = 300.0;
pub const DEFAULT_TEMPERATURE_MAX_K: f64 = 1500.0;
pub const DEFAULT_TEMPERATURE_POINTS: usize = 50;

pub fn default_phases() -> Vec<String> {
    vec![
        "LIQUID".to_string(),
        "FCC_A1".to_string(),
        "BCC_A2".to_string(),
    ]
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Composition minimum ({min}) must be less than maximum ({max})")]
    CompositionRange { min: f64, max: f64 },
    #[error("Composition bounds [{min}, {max}] must lie within [0, 1]")]
    CompositionBounds { min: f64, max: f64 },
    #[error("Composition interval must be positive (got {0})")]
    CompositionInterval(f64),
    #[error("Temperature minimum ({min} K) must be less than maximum ({max} K)")]
    TemperatureRange { min: f64, max: f64 },
    #[error("Temperature minimum must be positive (got {0} K)")]
    TemperatureMin(f64),
    #[error("Temperature grid needs at least 2 points (got {0})")]
    TemperaturePoints(usize),
    #[error("At least one phase must be selected")]
    NoPhases,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositionRange {
    pub min: f64,
    pub max: f64,
    pub interval: f64,
}

impl Default for CompositionRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            interval: DEFAULT_COMPOSITION_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
    pub points: usize,
}

impl Default for TemperatureRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_TEMPERATURE_MIN_K,
            max: DEFAULT_TEMPERATURE_MAX_K,
            points: DEFAULT_TEMPERATURE_POINTS,
        }
    }
}

/// Validated inputs for one surface computation: which phases to evaluate
/// and how to sample composition and temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceConfig {
    pub composition: CompositionRange,
    pub temperature: TemperatureRange,
    pub phases: Vec<String>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            composition: CompositionRange::default(),
            temperature: TemperatureRange::default(),
            phases: default_phases(),
        }
    }
}

impl SurfaceConfig {
    pub fn builder() -> SurfaceConfigBuilder {
        SurfaceConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.composition;
        if !(0.0..=1.0).contains(&c.min) || !(0.0..=1.0).contains(&c.max) {
            return Err(ConfigError::CompositionBounds {
                min: c.min,
                max: c.max,
            });
        }
        if c.min >= c.max {
            return Err(ConfigError::CompositionRange {
                min: c.min,
                max: c.max,
            });
        }
        if c.interval <= 0.0 {
            return Err(ConfigError::CompositionInterval(c.interval));
        }
        let t = &self.temperature;
        // T appears inside LN(T) and negative powers; 0 K is never evaluable.
        if t.min <= 0.0 {
            return Err(ConfigError::TemperatureMin(t.min));
        }
        if t.min >= t.max {
            return Err(ConfigError::TemperatureRange {
                min: t.min,
                max: t.max,
            });
        }
        if t.points < 2 {
            return Err(ConfigError::TemperaturePoints(t.points));
        }
        if self.phases.is_empty() {
            return Err(ConfigError::NoPhases);
        }
        Ok(())
    }
}

/// Builder over [`SurfaceConfig`] defaults; `build` validates the result.
#[derive(Debug, Default, Clone)]
pub struct SurfaceConfigBuilder {
    composition_min: Option<f64>,
    composition_max: Option<f64>,
    composition_interval: Option<f64>,
    temperature_min: Option<f64>,
    temperature_max: Option<f64>,
    temperature_points: Option<usize>,
    phases: Option<Vec<String>>,
}

impl SurfaceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn composition_min(mut self, min: f64) -> Self {
        self.composition_min = Some(min);
        self
    }
    pub fn composition_max(mut self, max: f64) -> Self {
        self.composition_max = Some(max);
        self
    }
    pub fn composition_interval(mut self, interval: f64) -> Self {
        self.composition_interval = Some(interval);
        self
    }
    pub fn temperature_min(mut self, min: f64) -> Self {
        self.temperature_min = Some(min);
        self
    }
    pub fn temperature_max(mut self, max: f64) -> Self {
        self.temperature_max = Some(max);
        self
    }
    pub fn temperature_points(mut self, points: usize) -> Self {
        self.temperature_points = Some(points);
        self
    }
    pub fn phases(mut self, phases: Vec<String>) -> Self {
        self.phases = Some(phases);
        self
    }

    pub fn build(self) -> Result<SurfaceConfig, ConfigError> {
        let defaults = SurfaceConfig::default();
        let config = SurfaceConfig {
            composition: CompositionRange {
                min: self.composition_min.unwrap_or(defaults.composition.min),
                max: self.composition_max.unwrap_or(defaults.composition.max),
                interval: self
                    .composition_interval
                    .unwrap_or(defaults.composition.interval),
            },
            temperature: TemperatureRange {
                min: self.temperature_min.unwrap_or(defaults.temperature.min),
                max: self.temperature_max.unwrap_or(defaults.temperature.max),
                points: self
                    .temperature_points
                    .unwrap_or(defaults.temperature.points),
            },
            phases: self.phases.unwrap_or(defaults.phases),
        };
        config.validate()?;
        Ok(config)
    }
}
