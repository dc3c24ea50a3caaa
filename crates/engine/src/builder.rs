use std::collections::HashSet;

use serde::Serialize;

use crate::config::ToleranceConfig;
use crate::error::EvalError;
use crate::model::{Label, Pair, PairKey, Source, Stored};
use crate::resolve::{resolve, Resolution};
use crate::schema::PropertySchema;
use crate::store::ClassificationStore;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Already stored before this pass; left untouched.
    Existing { label: Label, source: Source },
    /// Written by this pass.
    Classified { label: Label },
    /// Indeterminate: nothing stored, awaiting a human label.
    NeedsReview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyOutcome {
    pub property: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairOutcome {
    pub pair: PairKey,
    pub properties: Vec<PropertyOutcome>,
}

impl PairOutcome {
    pub fn needs_review(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|p| p.outcome == Outcome::NeedsReview)
            .map(|p| p.property.as_str())
    }
}

/// Observable state of one (pair, property) slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "label", rename_all = "snake_case")]
pub enum ClassificationState {
    /// Nothing stored, but the resolver would decide it automatically.
    Unevaluated,
    /// Nothing stored and the resolver cannot decide it.
    PendingReview,
    Automatic(Label),
    Override(Label),
}

/// A slot that needs a human label, with the two values to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewItem {
    pub pair: PairKey,
    pub property: String,
    pub ground_truth: String,
    pub predicted: String,
}

// ---------------------------------------------------------------------------
// Automatic path
// ---------------------------------------------------------------------------

/// Classify every schema property of `pair` that has no stored label yet.
///
/// Idempotent: existing labels (automatic or overridden) are never
/// recomputed, and indeterminate properties store nothing.
pub fn ensure_classifications<S: ClassificationStore + ?Sized>(
    pair: &Pair,
    schema: &PropertySchema,
    tolerance: &ToleranceConfig,
    store: &mut S,
) -> Result<PairOutcome, EvalError> {
    pair.check_roles()?;
    let key = pair.key();
    let mut properties = Vec::with_capacity(schema.len());

    for prop in schema.iter() {
        let outcome = match store.get(&key, &prop.name)? {
            Some(stored) => existing(stored),
            None => {
                let gt = pair.ground_truth.value(&prop.name);
                let pred = pair.predicted.value(&prop.name);
                match resolve(prop.kind, &gt, &pred, tolerance) {
                    Resolution::Decided(label) => store_automatic(&key, &prop.name, label, store)?,
                    Resolution::Indeterminate => {
                        log::debug!(
                            "{key}: {} needs review ('{}' vs '{}')",
                            prop.name,
                            gt.raw,
                            pred.raw
                        );
                        Outcome::NeedsReview
                    }
                }
            }
        };
        properties.push(PropertyOutcome { property: prop.name.clone(), outcome });
    }

    Ok(PairOutcome { pair: key, properties })
}

/// Insert an automatic label, reporting what actually ends up stored.
///
/// A rejected insert means another writer got there first. If that row is
/// gone again by the time it is re-read, the insert is retried once.
fn store_automatic<S: ClassificationStore + ?Sized>(
    key: &PairKey,
    property: &str,
    label: Label,
    store: &mut S,
) -> Result<Outcome, EvalError> {
    for _ in 0..2 {
        if store.insert_if_absent(key, property, label)? {
            log::debug!("{key}: {property} = {label}");
            return Ok(Outcome::Classified { label });
        }
        if let Some(stored) = store.get(key, property)? {
            return Ok(existing(stored));
        }
    }
    Err(EvalError::Store(format!(
        "{key}: {property} rejected by insert but not readable"
    )))
}

/// Run [`ensure_classifications`] over a batch of pairs.
///
/// The batch is checked up front: a duplicated (ground truth, predicted)
/// combination or a role mismatch fails before anything is written.
pub fn ensure_all<S: ClassificationStore + ?Sized>(
    pairs: &[Pair],
    schema: &PropertySchema,
    tolerance: &ToleranceConfig,
    store: &mut S,
) -> Result<Vec<PairOutcome>, EvalError> {
    let mut seen = HashSet::new();
    for pair in pairs {
        pair.check_roles()?;
        if !seen.insert(pair.key()) {
            return Err(EvalError::InvalidPairing {
                ground_truth: pair.ground_truth.id.clone(),
                predicted: pair.predicted.id.clone(),
                reason: "pair appears more than once".into(),
            });
        }
    }

    pairs
        .iter()
        .map(|pair| ensure_classifications(pair, schema, tolerance, &mut *store))
        .collect()
}

fn existing(stored: Stored) -> Outcome {
    Outcome::Existing { label: stored.label, source: stored.source }
}

// ---------------------------------------------------------------------------
// Override path
// ---------------------------------------------------------------------------

/// Store a human label, replacing whatever is there. Idempotent.
pub fn set_classification<S: ClassificationStore + ?Sized>(
    pair: &PairKey,
    property: &str,
    label: Label,
    schema: &PropertySchema,
    store: &mut S,
) -> Result<Option<Stored>, EvalError> {
    schema.require(property)?;
    let previous = store.upsert(pair, property, label)?;

    if let Some(prev) = previous {
        if prev.source == Source::Automatic && prev.label != label {
            log::warn!("{pair}: {property} overridden {} -> {label}", prev.label);
        }
    }

    Ok(previous)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub fn classification_state<S: ClassificationStore + ?Sized>(
    pair: &Pair,
    property: &str,
    schema: &PropertySchema,
    tolerance: &ToleranceConfig,
    store: &S,
) -> Result<ClassificationState, EvalError> {
    pair.check_roles()?;
    let kind = schema.require(property)?;

    if let Some(stored) = store.get(&pair.key(), property)? {
        return Ok(match stored.source {
            Source::Automatic => ClassificationState::Automatic(stored.label),
            Source::Override => ClassificationState::Override(stored.label),
        });
    }

    let gt = pair.ground_truth.value(property);
    let pred = pair.predicted.value(property);
    Ok(match resolve(kind, &gt, &pred, tolerance) {
        Resolution::Decided(_) => ClassificationState::Unevaluated,
        Resolution::Indeterminate => ClassificationState::PendingReview,
    })
}

/// Every (pair, property) slot that is unlabeled and cannot be decided
/// automatically, in pair then schema order.
pub fn pending_review<S: ClassificationStore + ?Sized>(
    pairs: &[Pair],
    schema: &PropertySchema,
    tolerance: &ToleranceConfig,
    store: &S,
) -> Result<Vec<ReviewItem>, EvalError> {
    let mut items = Vec::new();
    for pair in pairs {
        for prop in schema.iter() {
            let state = classification_state(pair, &prop.name, schema, tolerance, store)?;
            if state == ClassificationState::PendingReview {
                items.push(ReviewItem {
                    pair: pair.key(),
                    property: prop.name.clone(),
                    ground_truth: pair.ground_truth.value(&prop.name).raw.to_string(),
                    predicted: pair.predicted.value(&prop.name).raw.to_string(),
                });
            }
        }
    }
    Ok(items)
}
