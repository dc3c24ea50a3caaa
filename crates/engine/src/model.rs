use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;

use crate::error::EvalError;
use crate::value::PropertyValue;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    GroundTruth,
    Predicted,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GroundTruth => write!(f, "ground_truth"),
            Self::Predicted => write!(f, "predicted"),
        }
    }
}

/// One ingested entity with its raw property values.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub id: String,
    pub role: Role,
    pub values: BTreeMap<String, String>,
}

impl Record {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role, values: BTreeMap::new() }
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(property.into(), value.into());
        self
    }

    /// A property absent from the record reads as missing.
    pub fn value(&self, property: &str) -> PropertyValue<'_> {
        PropertyValue::parse(self.values.get(property).map(String::as_str))
    }
}

// ---------------------------------------------------------------------------
// Pairs
// ---------------------------------------------------------------------------

/// Storage key of a pair: the (ground truth, predicted) record ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PairKey {
    pub ground_truth: String,
    pub predicted: String,
}

impl PairKey {
    pub fn new(ground_truth: impl Into<String>, predicted: impl Into<String>) -> Self {
        Self { ground_truth: ground_truth.into(), predicted: predicted.into() }
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {}", self.ground_truth, self.predicted)
    }
}

/// An externally established ground-truth / predicted association.
#[derive(Debug, Clone)]
pub struct Pair {
    pub ground_truth: Record,
    pub predicted: Record,
}

impl Pair {
    pub fn new(ground_truth: Record, predicted: Record) -> Result<Self, EvalError> {
        let pair = Self { ground_truth, predicted };
        pair.check_roles()?;
        Ok(pair)
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(&self.ground_truth.id, &self.predicted.id)
    }

    /// Fields are public, so callers that build a `Pair` by hand are
    /// re-checked before anything is resolved.
    pub fn check_roles(&self) -> Result<(), EvalError> {
        let gt = self.ground_truth.role;
        let pred = self.predicted.role;
        if gt == Role::GroundTruth && pred == Role::Predicted {
            return Ok(());
        }
        Err(EvalError::InvalidPairing {
            ground_truth: self.ground_truth.id.clone(),
            predicted: self.predicted.id.clone(),
            reason: format!("expected ground_truth/predicted roles, got {gt}/{pred}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Label {
    #[serde(rename = "TP")]
    TruePositive,
    #[serde(rename = "FP")]
    FalsePositive,
    #[serde(rename = "TN")]
    TrueNegative,
    #[serde(rename = "FN")]
    FalseNegative,
}

impl Label {
    pub fn code(self) -> &'static str {
        match self {
            Self::TruePositive => "TP",
            Self::FalsePositive => "FP",
            Self::TrueNegative => "TN",
            Self::FalseNegative => "FN",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Label {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TP" => Ok(Self::TruePositive),
            "FP" => Ok(Self::FalsePositive),
            "TN" => Ok(Self::TrueNegative),
            "FN" => Ok(Self::FalseNegative),
            other => Err(EvalError::InvalidLabel(other.to_string())),
        }
    }
}

/// Who produced a stored label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Automatic,
    Override,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Override => "override",
        }
    }
}

impl FromStr for Source {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "automatic" => Ok(Self::Automatic),
            "override" => Ok(Self::Override),
            other => Err(EvalError::Store(format!("unknown classification source '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stored {
    pub label: Label,
    pub source: Source,
}

/// One row of the classification store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationRecord {
    pub pair: PairKey,
    pub property: String,
    pub label: Label,
    pub source: Source,
}
