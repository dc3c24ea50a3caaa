use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::builder::pending_review;
use crate::config::ToleranceConfig;
use crate::error::EvalError;
use crate::metrics::{aggregate, Distribution, MetricsReport};
use crate::model::{Label, Pair, PairKey};
use crate::schema::PropertySchema;
use crate::store::ClassificationStore;

// ---------------------------------------------------------------------------
// Export shape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub meta: ReportMeta,
    pub summary: ReportSummary,
    pub metrics: MetricsReport,
    pub distribution: Distribution,
    pub pairs: Vec<PairBreakdown>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub session_name: String,
    pub engine_version: String,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_pairs: usize,
    pub total_classifications: usize,
    pub pending_review: usize,
    pub best_property: Option<BestProperty>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BestProperty {
    pub property: String,
    pub f1_score: f64,
}

/// Per-pair detail: both sides' values and the stored labels.
#[derive(Debug, Clone, Serialize)]
pub struct PairBreakdown {
    pub pair: PairKey,
    pub ground_truth: BTreeMap<String, String>,
    pub predicted: BTreeMap<String, String>,
    pub classifications: BTreeMap<String, Label>,
}

impl EvaluationReport {
    pub fn to_json(&self) -> Result<String, EvalError> {
        serde_json::to_string_pretty(self).map_err(|e| EvalError::Export(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Assemble the report from whatever is currently stored for `pairs`.
///
/// Only labels of the given pairs and of schema properties are counted.
/// Metrics are rounded to four decimals.
pub fn build_report<S: ClassificationStore + ?Sized>(
    session_name: &str,
    pairs: &[Pair],
    schema: &PropertySchema,
    tolerance: &ToleranceConfig,
    store: &S,
) -> Result<EvaluationReport, EvalError> {
    let in_schema: HashSet<&str> = schema.iter().map(|p| p.name.as_str()).collect();

    let mut breakdowns = Vec::with_capacity(pairs.len());
    let mut labels: Vec<(String, Label)> = Vec::new();

    for pair in pairs {
        let key = pair.key();
        let mut classifications = BTreeMap::new();
        for rec in store.records_for(&key)? {
            if in_schema.contains(rec.property.as_str()) {
                labels.push((rec.property.clone(), rec.label));
                classifications.insert(rec.property, rec.label);
            }
        }

        breakdowns.push(PairBreakdown {
            pair: key,
            ground_truth: schema_values(&pair.ground_truth.values, &in_schema),
            predicted: schema_values(&pair.predicted.values, &in_schema),
            classifications,
        });
    }

    let raw = aggregate(labels.iter().map(|(p, l)| (p.as_str(), *l)));
    let best_property = raw.best_property().map(|(name, summary)| BestProperty {
        property: name.to_string(),
        f1_score: summary.metrics.rounded().f1_score,
    });
    let distribution = raw.distribution();
    let metrics = raw.rounded();
    let pending = pending_review(pairs, schema, tolerance, store)?.len();

    Ok(EvaluationReport {
        meta: ReportMeta {
            session_name: session_name.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        },
        summary: ReportSummary {
            total_pairs: pairs.len(),
            total_classifications: labels.len(),
            pending_review: pending,
            best_property,
        },
        metrics,
        distribution,
        pairs: breakdowns,
    })
}

fn schema_values(
    values: &BTreeMap<String, String>,
    in_schema: &HashSet<&str>,
) -> BTreeMap<String, String> {
    values
        .iter()
        .filter(|(k, _)| in_schema.contains(k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
