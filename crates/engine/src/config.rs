//! Engine configuration
//!
//! Board geometry, palette and scoring parameters, supplied once when the
//! engine is built. Loaded from defaults, environment variables or JSON.
//!
//! # Environment Variables
//!
//! - `GEM_SWAP_WIDTH`, `GEM_SWAP_HEIGHT`: board size (default 8x8)
//! - `GEM_SWAP_ORIGIN_X`, `GEM_SWAP_ORIGIN_Y`: world position of cell (0, 0)
//! - `GEM_SWAP_SPACING`: world distance between cells (default 1.0)
//! - `GEM_SWAP_PALETTE`: number of gem kinds (default 6)
//! - `GEM_SWAP_POINTS_PER_GEM`: points per removed gem (default 10)
//! - `GEM_SWAP_SEED`: kind RNG seed (default 1)

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::LevelCurve;
use crate::types::{
    GridPosition, GridSize, Point, DEFAULT_HEIGHT, DEFAULT_LEVEL_CURVE, DEFAULT_PALETTE_SIZE,
    DEFAULT_POINTS_PER_GEM, DEFAULT_WIDTH, MIN_LINE_LENGTH, MIN_PALETTE_SIZE,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid grid dimensions {width}x{height}: need a line of {min} with room to swap into it")]
    InvalidDimensions { width: i32, height: i32, min: usize },

    #[error("palette of {0} kinds is too small (minimum {min})", min = MIN_PALETTE_SIZE)]
    PaletteTooSmall(u8),

    #[error("cell spacing must be finite and positive, got {0}")]
    InvalidSpacing(f32),

    #[error("level curve must not be empty")]
    EmptyCurve,

    #[error("level curve must be strictly increasing (entry {index} is {value})")]
    NonMonotonicCurve { index: usize, value: u32 },

    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub width: i32,
    pub height: i32,
    pub origin: Point,
    pub spacing: f32,
    pub palette_size: u8,
    pub points_per_gem: u32,
    pub level_curve: Vec<u32>,
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            origin: Point::default(),
            spacing: 1.0,
            palette_size: DEFAULT_PALETTE_SIZE,
            points_per_gem: DEFAULT_POINTS_PER_GEM,
            level_curve: DEFAULT_LEVEL_CURVE.to_vec(),
            seed: 1,
        }
    }
}

fn env_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(default);
            }
            trimmed
                .parse()
                .map_err(|_| ConfigError::InvalidValue { var, value: raw })
        }
        Err(_) => Ok(default),
    }
}

impl EngineConfig {
    /// Defaults overridden by any `GEM_SWAP_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        let config = Self {
            width: env_or("GEM_SWAP_WIDTH", d.width)?,
            height: env_or("GEM_SWAP_HEIGHT", d.height)?,
            origin: Point::new(
                env_or("GEM_SWAP_ORIGIN_X", d.origin.x)?,
                env_or("GEM_SWAP_ORIGIN_Y", d.origin.y)?,
            ),
            spacing: env_or("GEM_SWAP_SPACING", d.spacing)?,
            palette_size: env_or("GEM_SWAP_PALETTE", d.palette_size)?,
            points_per_gem: env_or("GEM_SWAP_POINTS_PER_GEM", d.points_per_gem)?,
            level_curve: d.level_curve,
            seed: env_or("GEM_SWAP_SEED", d.seed)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let longest = self.width.max(self.height) as usize;
        let shortest = self.width.min(self.height);
        // A single 3-cell line can only be permuted into itself: no legal move exists.
        let too_thin = shortest == 1 && longest == MIN_LINE_LENGTH;
        if shortest < 1 || longest < MIN_LINE_LENGTH || too_thin {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
                min: MIN_LINE_LENGTH,
            });
        }
        if self.palette_size < MIN_PALETTE_SIZE {
            return Err(ConfigError::PaletteTooSmall(self.palette_size));
        }
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(ConfigError::InvalidSpacing(self.spacing));
        }
        if self.level_curve.is_empty() {
            return Err(ConfigError::EmptyCurve);
        }
        if let Some(index) = self
            .level_curve
            .windows(2)
            .position(|w| w[0] >= w[1])
            .map(|i| i + 1)
        {
            return Err(ConfigError::NonMonotonicCurve {
                index,
                value: self.level_curve[index],
            });
        }
        Ok(())
    }

    pub fn grid_size(&self) -> GridSize {
        GridSize::new(self.width, self.height)
    }

    /// World coordinates of a cell under this layout
    pub fn to_world_position(&self, pos: GridPosition) -> Point {
        pos.to_world(self.origin, self.spacing)
    }

    /// The validated curve; call [`EngineConfig::validate`] first.
    pub fn curve(&self) -> LevelCurve {
        LevelCurve::new(self.level_curve.clone())
    }
}
