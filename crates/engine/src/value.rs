//! Value classification.
//!
//! Every raw property string is classified exactly once into a [`ValueKind`].
//! Unparseable text never fails: it narrows to [`ValueKind::Text`].

/// Sentinel written by ingestion for an absent measurement.
pub const MISSING_SENTINEL: &str = "NA";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKind<'a> {
    /// Empty string or the `NA` sentinel.
    Missing,
    Number(f64),
    /// Inclusive interval written as `min-max`. Bounds are kept as written.
    Range { min: f64, max: f64 },
    Text(&'a str),
}

impl ValueKind<'_> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// Classify a raw property value. Pure function of the text.
pub fn classify(raw: &str) -> ValueKind<'_> {
    if raw.is_empty() || raw == MISSING_SENTINEL {
        return ValueKind::Missing;
    }
    if let Some((min, max)) = parse_range(raw) {
        return ValueKind::Range { min, max };
    }
    match parse_number(raw) {
        Some(value) => ValueKind::Number(value),
        None => ValueKind::Text(raw),
    }
}

/// A raw value together with its classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyValue<'a> {
    pub raw: &'a str,
    pub kind: ValueKind<'a>,
}

impl<'a> PropertyValue<'a> {
    /// `None` (absent from the record) is treated like an empty string.
    pub fn parse(raw: Option<&'a str>) -> Self {
        let raw = raw.unwrap_or("");
        Self { raw, kind: classify(raw) }
    }

    pub fn is_missing(&self) -> bool {
        self.kind.is_missing()
    }
}

/// Split on the first `-` only. A leading `-` is a sign, never a separator,
/// and a second `-` anywhere disqualifies the value as a range.
fn parse_range(raw: &str) -> Option<(f64, f64)> {
    if raw.starts_with('-') {
        return None;
    }
    let (lo, hi) = raw.split_once('-')?;
    if hi.contains('-') {
        return None;
    }
    Some((parse_number(lo)?, parse_number(hi)?))
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}
