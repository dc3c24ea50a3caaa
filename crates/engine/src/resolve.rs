use crate::compare::compare;
use crate::config::ToleranceConfig;
use crate::model::Label;
use crate::schema::PropertyKind;
use crate::value::PropertyValue;

/// Outcome of automatic classification for one property of one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Decided(Label),
    /// Disagreeing identity values: needs a human, no label is produced.
    Indeterminate,
}

/// Turn a ground-truth / predicted value pair into a label.
///
/// Missing-value state is decided first. For two present measurements a
/// mismatch is always FN, never FP.
pub fn resolve(
    kind: PropertyKind,
    gt: &PropertyValue<'_>,
    pred: &PropertyValue<'_>,
    tolerance: &ToleranceConfig,
) -> Resolution {
    match (gt.is_missing(), pred.is_missing()) {
        (true, true) => return Resolution::Decided(Label::TrueNegative),
        (true, false) => return Resolution::Decided(Label::FalsePositive),
        (false, true) => return Resolution::Decided(Label::FalseNegative),
        (false, false) => {}
    }

    match kind {
        PropertyKind::Identity => {
            if gt.raw == pred.raw {
                Resolution::Decided(Label::TruePositive)
            } else {
                Resolution::Indeterminate
            }
        }
        PropertyKind::Measurement => {
            if compare(gt, pred, tolerance).is_match() {
                Resolution::Decided(Label::TruePositive)
            } else {
                Resolution::Decided(Label::FalseNegative)
            }
        }
    }
}
