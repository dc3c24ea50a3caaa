//! `propeval-engine` — property comparison and TP/FP/TN/FN classification.
//!
//! Pure engine crate: receives already-paired records, returns labels and
//! metrics. Persistence sits behind [`store::ClassificationStore`].

pub mod builder;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod model;
pub mod report;
pub mod resolve;
pub mod schema;
pub mod store;
pub mod value;

pub use builder::{
    classification_state, ensure_all, ensure_classifications, pending_review, set_classification,
    ClassificationState, Outcome, PairOutcome,
};
pub use compare::{compare, compare_raw, Verdict};
pub use config::{EvalConfig, ToleranceConfig};
pub use engine::run;
pub use error::EvalError;
pub use metrics::{aggregate, MetricsReport};
pub use model::{Label, Pair, PairKey, Record, Role};
pub use report::EvaluationReport;
pub use resolve::{resolve, Resolution};
pub use schema::{PropertyKind, PropertySchema};
pub use store::{ClassificationStore, MemoryStore};
pub use value::{classify, PropertyValue, ValueKind};
