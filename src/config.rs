//! EAH logger configuration
//!
//! Scales are described declaratively and validated when converted:
//!
//! ```json
//! {
//!   "error": { "kind": "log10", "min": 0.0, "max": 6e7, "buckets": 20 },
//!   "evaluations": { "kind": "linear", "min": 0.0, "max": 1000.0, "buckets": 10 }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::eah::Eah;
use crate::scale::{Scale, ScaleKind};
use crate::{Error, Result};

/// Unvalidated description of a [`Scale`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleConfig {
    /// Bucket spacing.
    #[serde(default)]
    pub kind: ScaleKind,
    /// Lower domain bound.
    pub min: f64,
    /// Upper domain bound.
    pub max: f64,
    /// Number of buckets.
    pub buckets: usize,
}

impl ScaleConfig {
    /// Create a scale description.
    #[must_use]
    pub const fn new(kind: ScaleKind, min: f64, max: f64, buckets: usize) -> Self {
        Self {
            kind,
            min,
            max,
            buckets,
        }
    }
}

impl TryFrom<ScaleConfig> for Scale {
    type Error = Error;

    fn try_from(config: ScaleConfig) -> Result<Self> {
        Self::new(config.kind, config.min, config.max, config.buckets)
    }
}

impl From<Scale> for ScaleConfig {
    fn from(scale: Scale) -> Self {
        Self::new(scale.kind(), scale.min(), scale.max(), scale.size())
    }
}

/// Configuration of an [`Eah`] logger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EahConfig {
    /// Error axis (matrix rows).
    pub error: ScaleConfig,
    /// Evaluations axis (matrix columns).
    pub evaluations: ScaleConfig,
}

impl Default for EahConfig {
    fn default() -> Self {
        Self {
            error: ScaleConfig::new(ScaleKind::Log10, 0.0, 6e7, 20),
            evaluations: ScaleConfig::new(ScaleKind::Log10, 0.0, 1e4, 20),
        }
    }
}

impl EahConfig {
    /// Parse a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed JSON or missing fields.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("JSON parse error: {e}")))
    }

    /// Read a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, [`Error::Config`]
    /// if it does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("JSON serialization error: {e}")))
    }

    /// Validated `(error, evaluations)` scales.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidScale`] if either scale is invalid.
    pub fn scales(&self) -> Result<(Scale, Scale)> {
        Ok((Scale::try_from(self.error)?, Scale::try_from(self.evaluations)?))
    }

    /// Build an empty logger.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidScale`] if either scale is invalid.
    pub fn build(&self) -> Result<Eah> {
        let (error, evaluations) = self.scales()?;
        Ok(Eah::with_scales(error, evaluations))
    }
}
