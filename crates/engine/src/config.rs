use serde::Deserialize;

use crate::error::EvalError;
use crate::schema::{PropertyDef, PropertySchema};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct EvalConfig {
    pub name: String,
    pub properties: Vec<PropertyDef>,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
}

// ---------------------------------------------------------------------------
// Tolerance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ToleranceConfig {
    /// Relative margin for scalar-vs-scalar, as a percent of the ground truth.
    #[serde(default = "default_percent")]
    pub percent: f64,
    /// Share of the smaller interval that must be covered for range-vs-range.
    #[serde(default = "default_range_overlap_percent")]
    pub range_overlap_percent: f64,
}

fn default_percent() -> f64 {
    5.0
}

fn default_range_overlap_percent() -> f64 {
    80.0
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            percent: default_percent(),
            range_overlap_percent: default_range_overlap_percent(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl EvalConfig {
    pub fn from_toml(input: &str) -> Result<Self, EvalError> {
        let config: EvalConfig =
            toml::from_str(input).map_err(|e| EvalError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EvalError> {
        if self.name.trim().is_empty() {
            return Err(EvalError::ConfigValidation("name must not be empty".into()));
        }

        let tol = &self.tolerance;
        if !tol.percent.is_finite() || tol.percent < 0.0 {
            return Err(EvalError::ConfigValidation(format!(
                "tolerance.percent must be a non-negative number, got {}",
                tol.percent
            )));
        }
        if !(tol.range_overlap_percent > 0.0 && tol.range_overlap_percent <= 100.0) {
            return Err(EvalError::ConfigValidation(format!(
                "tolerance.range_overlap_percent must be in (0, 100], got {}",
                tol.range_overlap_percent
            )));
        }

        // Schema rules (non-empty, unique names) live with the schema type.
        PropertySchema::new(self.properties.clone())?;

        Ok(())
    }

    /// Build the session schema. Only valid after `validate()`.
    pub fn schema(&self) -> Result<PropertySchema, EvalError> {
        PropertySchema::new(self.properties.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
