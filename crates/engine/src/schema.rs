use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;

pub const POLYMER_SYSTEM: &str = "polymer_system";
pub const FORCE_FIELD: &str = "force_field";

/// How a property is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// Exact text equality; a mismatch is left for human review.
    Identity,
    /// Numeric tolerance / range rule.
    Measurement,
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identity => write!(f, "identity"),
            Self::Measurement => write!(f, "measurement"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
}

/// Fixed, ordered list of properties examined for every pair.
///
/// Built once (from config or [`PropertySchema::polymer_default`]) and shared
/// read-only by the builder and the aggregator for a whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySchema {
    properties: Vec<PropertyDef>,
}

impl PropertySchema {
    pub fn new(properties: Vec<PropertyDef>) -> Result<Self, EvalError> {
        if properties.is_empty() {
            return Err(EvalError::ConfigValidation(
                "at least one property is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for prop in &properties {
            if prop.name.trim().is_empty() {
                return Err(EvalError::ConfigValidation(
                    "property name must not be empty".into(),
                ));
            }
            if !seen.insert(prop.name.as_str()) {
                return Err(EvalError::ConfigValidation(format!(
                    "duplicate property '{}'",
                    prop.name
                )));
            }
        }

        Ok(Self { properties })
    }

    /// Schema of the polymer simulation benchmark: two identity fields
    /// followed by six physical measurements.
    pub fn polymer_default() -> Self {
        let identity = [POLYMER_SYSTEM, FORCE_FIELD];
        let measurement = [
            "Density (g/cm³)",
            "Glass Transition Temperature (K)",
            "Radius of Gyration (nm)",
            "Young's Modulus (GPa)",
            "Diffusion Coefficient (m²/s)",
            "Viscosity (Pa s)",
        ];

        let properties = identity
            .iter()
            .map(|n| (n, PropertyKind::Identity))
            .chain(measurement.iter().map(|n| (n, PropertyKind::Measurement)))
            .map(|(name, kind)| PropertyDef { name: name.to_string(), kind })
            .collect();

        Self { properties }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyDef> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn kind_of(&self, name: &str) -> Option<PropertyKind> {
        self.properties.iter().find(|p| p.name == name).map(|p| p.kind)
    }

    /// Like [`kind_of`](Self::kind_of) but an unknown name is an error.
    pub fn require(&self, name: &str) -> Result<PropertyKind, EvalError> {
        self.kind_of(name)
            .ok_or_else(|| EvalError::UnknownProperty(name.to_string()))
    }
}
