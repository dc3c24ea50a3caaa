use crate::builder::{ensure_all, Outcome};
use crate::config::EvalConfig;
use crate::error::EvalError;
use crate::model::Pair;
use crate::report::{build_report, EvaluationReport};
use crate::store::ClassificationStore;

/// Run an evaluation session: classify every pair that still has open
/// slots, then report on everything stored for these pairs.
pub fn run<S: ClassificationStore + ?Sized>(
    config: &EvalConfig,
    pairs: &[Pair],
    store: &mut S,
) -> Result<EvaluationReport, EvalError> {
    let schema = config.schema()?;
    let outcomes = ensure_all(pairs, &schema, &config.tolerance, &mut *store)?;

    let mut classified = 0;
    let mut existing = 0;
    let mut review = 0;
    for o in outcomes.iter().flat_map(|o| &o.properties) {
        match o.outcome {
            Outcome::Classified { .. } => classified += 1,
            Outcome::Existing { .. } => existing += 1,
            Outcome::NeedsReview => review += 1,
        }
    }
    log::info!(
        "{}: {} pair(s), {classified} classified, {existing} already stored, {review} need review",
        config.name,
        pairs.len()
    );

    build_report(&config.name, pairs, &schema, &config.tolerance, &*store)
}
