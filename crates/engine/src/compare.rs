use serde::Serialize;

use crate::config::ToleranceConfig;
use crate::value::{PropertyValue, ValueKind};

/// Relative slack absorbing binary representation error at the tolerance
/// boundary, so that e.g. 1.2 vs 1.26 sits exactly on 5%.
const BOUNDARY_SLACK: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Match,
    NoMatch,
}

impl Verdict {
    fn from_bool(matched: bool) -> Self {
        if matched {
            Self::Match
        } else {
            Self::NoMatch
        }
    }

    pub fn is_match(self) -> bool {
        self == Self::Match
    }
}

/// Compare a ground-truth value against a predicted value.
///
/// Precedence: identical text, then missing, then the numeric rules, then
/// no match. Scalar tolerance is relative to the ground truth, so argument
/// order matters.
pub fn compare(gt: &PropertyValue<'_>, pred: &PropertyValue<'_>, tolerance: &ToleranceConfig) -> Verdict {
    if gt.raw == pred.raw {
        return Verdict::Match;
    }
    if gt.is_missing() || pred.is_missing() {
        return Verdict::NoMatch;
    }

    match (gt.kind, pred.kind) {
        (ValueKind::Range { min: a_min, max: a_max }, ValueKind::Range { min: b_min, max: b_max }) => {
            Verdict::from_bool(ranges_overlap((a_min, a_max), (b_min, b_max), tolerance.range_overlap_percent))
        }
        (ValueKind::Range { min, max }, ValueKind::Number(x))
        | (ValueKind::Number(x), ValueKind::Range { min, max }) => {
            Verdict::from_bool(min <= x && x <= max)
        }
        (ValueKind::Number(a), ValueKind::Number(b)) => {
            Verdict::from_bool(within_tolerance(a, b, tolerance.percent))
        }
        _ => Verdict::NoMatch,
    }
}

/// Convenience wrapper over raw strings, for diagnostics and tests.
pub fn compare_raw(gt: &str, pred: &str, tolerance: &ToleranceConfig) -> Verdict {
    compare(
        &PropertyValue::parse(Some(gt)),
        &PropertyValue::parse(Some(pred)),
        tolerance,
    )
}

/// `|gt - pred| <= percent% of |gt|`.
pub fn within_tolerance(gt: f64, pred: f64, percent: f64) -> bool {
    let limit = gt.abs() * percent / 100.0;
    (gt - pred).abs() <= limit * (1.0 + BOUNDARY_SLACK)
}

/// Percentage of the smaller interval covered by the intersection.
///
/// Touching or disjoint intervals give 0, as does a zero-length (or
/// reversed) smaller interval.
pub fn overlap_percent(a: (f64, f64), b: (f64, f64)) -> f64 {
    let start = a.0.max(b.0);
    let end = a.1.min(b.1);
    if start >= end {
        return 0.0;
    }

    let smaller = (a.1 - a.0).min(b.1 - b.0);
    if smaller <= 0.0 {
        return 0.0;
    }

    (end - start) / smaller * 100.0
}

fn ranges_overlap(a: (f64, f64), b: (f64, f64), required_percent: f64) -> bool {
    let pct = overlap_percent(a, b);
    pct > 0.0 && pct >= required_percent
}
