//! Metrics aggregation over stored labels.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::Label;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    #[serde(rename = "TP")]
    pub true_positives: usize,
    #[serde(rename = "FP")]
    pub false_positives: usize,
    #[serde(rename = "TN")]
    pub true_negatives: usize,
    #[serde(rename = "FN")]
    pub false_negatives: usize,
}

impl Counts {
    pub fn add(&mut self, label: Label) {
        match label {
            Label::TruePositive => self.true_positives += 1,
            Label::FalsePositive => self.false_positives += 1,
            Label::TrueNegative => self.true_negatives += 1,
            Label::FalseNegative => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn metrics(&self) -> Metrics {
        let tp = self.true_positives as f64;
        let precision = ratio(tp, (self.true_positives + self.false_positives) as f64);
        let recall = ratio(tp, (self.true_positives + self.false_negatives) as f64);
        let f1_score = ratio(2.0 * precision * recall, precision + recall);
        let accuracy = ratio(
            (self.true_positives + self.true_negatives) as f64,
            self.total() as f64,
        );
        Metrics { precision, recall, f1_score, accuracy }
    }
}

/// Every division is guarded: an empty denominator yields 0.
fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub accuracy: f64,
}

impl Metrics {
    /// Round every metric to four decimals for export.
    pub fn rounded(&self) -> Metrics {
        Metrics {
            precision: round4(self.precision),
            recall: round4(self.recall),
            f1_score: round4(self.f1_score),
            accuracy: round4(self.accuracy),
        }
    }

    pub fn band(&self) -> PerformanceBand {
        PerformanceBand::from_f1(self.f1_score)
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Coarse F1 rating shown next to each property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl PerformanceBand {
    pub fn from_f1(f1: f64) -> Self {
        if f1 >= 0.8 {
            Self::Excellent
        } else if f1 >= 0.6 {
            Self::Good
        } else if f1 >= 0.4 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

impl std::fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "excellent"),
            Self::Good => write!(f, "good"),
            Self::Fair => write!(f, "fair"),
            Self::Poor => write!(f, "poor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub counts: Counts,
    #[serde(rename = "Total")]
    pub total: usize,
    pub metrics: Metrics,
    pub band: PerformanceBand,
}

impl From<Counts> for Summary {
    fn from(counts: Counts) -> Self {
        let metrics = counts.metrics();
        Summary { counts, total: counts.total(), metrics, band: metrics.band() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub per_property: BTreeMap<String, Summary>,
    pub overall: Summary,
}

/// Count and percentage of all classifications.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Share {
    pub count: usize,
    pub percent: f64,
}

impl Share {
    fn of(count: usize, total: usize) -> Self {
        Share { count, percent: round4(ratio(count as f64, total as f64) * 100.0) }
    }
}

/// How the classifications split across labels and properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub labels: BTreeMap<String, Share>,
    pub properties: BTreeMap<String, Share>,
}

impl MetricsReport {
    /// Property with the highest F1; ties go to the first name in order.
    pub fn best_property(&self) -> Option<(&str, &Summary)> {
        let mut best: Option<(&str, &Summary)> = None;
        for (name, summary) in &self.per_property {
            match best {
                Some((_, b)) if summary.metrics.f1_score <= b.metrics.f1_score => {}
                _ => best = Some((name.as_str(), summary)),
            }
        }
        best
    }

    pub fn distribution(&self) -> Distribution {
        let total = self.overall.total;
        let c = self.overall.counts;
        let labels = [
            (Label::TruePositive, c.true_positives),
            (Label::FalsePositive, c.false_positives),
            (Label::TrueNegative, c.true_negatives),
            (Label::FalseNegative, c.false_negatives),
        ]
        .into_iter()
        .map(|(label, n)| (label.code().to_string(), Share::of(n, total)))
        .collect();
        let properties = self
            .per_property
            .iter()
            .map(|(name, s)| (name.clone(), Share::of(s.total, total)))
            .collect();
        Distribution { labels, properties }
    }

    /// Copy with all metrics rounded to four decimals.
    pub fn rounded(&self) -> MetricsReport {
        let round = |s: &Summary| Summary { metrics: s.metrics.rounded(), ..*s };
        MetricsReport {
            per_property: self
                .per_property
                .iter()
                .map(|(k, v)| (k.clone(), round(v)))
                .collect(),
            overall: round(&self.overall),
        }
    }
}

/// Tally labels per property and overall.
///
/// Overall metrics come from the summed counts, not from averaging the
/// per-property metrics.
pub fn aggregate<'a, I>(classifications: I) -> MetricsReport
where
    I: IntoIterator<Item = (&'a str, Label)>,
{
    let mut by_property: BTreeMap<String, Counts> = BTreeMap::new();
    let mut overall = Counts::default();

    for (property, label) in classifications {
        by_property.entry(property.to_string()).or_default().add(label);
        overall.add(label);
    }

    MetricsReport {
        per_property: by_property
            .into_iter()
            .map(|(name, counts)| (name, Summary::from(counts)))
            .collect(),
        overall: Summary::from(overall),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-4;

    fn labels(tp: usize, fp: usize, tn: usize, fn_: usize) -> Vec<Label> {
        let mut out = Vec::new();
        out.extend(std::iter::repeat(Label::TruePositive).take(tp));
        out.extend(std::iter::repeat(Label::FalsePositive).take(fp));
        out.extend(std::iter::repeat(Label::TrueNegative).take(tn));
        out.extend(std::iter::repeat(Label::FalseNegative).take(fn_));
        out
    }

    #[test]
    fn reference_metrics() {
        let ls = labels(3, 1, 2, 0);
        let report = aggregate(ls.iter().map(|l| ("density", *l)));
        let m = report.overall.metrics;
        assert!((m.precision - 0.75).abs() < EPS);
        assert!((m.recall - 1.0).abs() < EPS);
        assert!((m.f1_score - 0.8571).abs() < EPS);
        assert!((m.accuracy - 0.8333).abs() < EPS);
        assert_eq!(report.overall.total, 6);
        assert_eq!(report.overall.band, PerformanceBand::Excellent);

        let r = m.rounded();
        assert_eq!(r.f1_score, 0.8571);
        assert_eq!(r.accuracy, 0.8333);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let report = aggregate(std::iter::empty());
        assert!(report.per_property.is_empty());
        assert_eq!(report.overall.counts, Counts::default());
        assert_eq!(report.overall.metrics, Metrics::default());
        assert_eq!(report.overall.band, PerformanceBand::Poor);
        assert!(report.best_property().is_none());
    }

    #[test]
    fn only_negatives_guard_every_division() {
        let ls = labels(0, 0, 4, 0);
        let m = aggregate(ls.iter().map(|l| ("radius", *l))).overall.metrics;
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1_score, 0.0);
        assert_eq!(m.accuracy, 1.0);
    }

    #[test]
    fn overall_sums_counts_not_metrics() {
        // density: TP=1 FP=1 (precision 0.5); radius: TP=3 (precision 1.0)
        let input = vec![
            ("density", Label::TruePositive),
            ("density", Label::FalsePositive),
            ("radius", Label::TruePositive),
            ("radius", Label::TruePositive),
            ("radius", Label::TruePositive),
        ];
        let report = aggregate(input);
        assert_eq!(report.per_property["density"].metrics.precision, 0.5);
        assert_eq!(report.per_property["radius"].metrics.precision, 1.0);
        // 4 / 5, not (0.5 + 1.0) / 2
        assert!((report.overall.metrics.precision - 0.8).abs() < 1e-12);
        assert_eq!(report.overall.counts.true_positives, 4);
    }

    #[test]
    fn best_property_tie_goes_to_first_name() {
        let input = vec![
            ("b", Label::TruePositive),
            ("a", Label::TruePositive),
            ("c", Label::FalseNegative),
        ];
        let report = aggregate(input);
        let (name, summary) = report.best_property().unwrap();
        assert_eq!(name, "a");
        assert_eq!(summary.metrics.f1_score, 1.0);
    }

    #[test]
    fn distribution_shares() {
        let input = vec![
            ("density", Label::TruePositive),
            ("density", Label::FalseNegative),
            ("radius", Label::TruePositive),
            ("radius", Label::TrueNegative),
        ];
        let dist = aggregate(input).distribution();
        assert_eq!(dist.labels["TP"], Share { count: 2, percent: 50.0 });
        assert_eq!(dist.labels["FN"], Share { count: 1, percent: 25.0 });
        assert_eq!(dist.labels["FP"], Share { count: 0, percent: 0.0 });
        assert_eq!(dist.properties["radius"], Share { count: 2, percent: 50.0 });
        assert_eq!(dist.properties.len(), 2);
    }

    #[test]
    fn empty_distribution_has_zero_shares() {
        let dist = aggregate(Vec::<(&str, Label)>::new()).distribution();
        assert_eq!(dist.labels.len(), 4);
        assert!(dist.labels.values().all(|s| s.count == 0 && s.percent == 0.0));
        assert!(dist.properties.is_empty());
    }

    #[test]
    fn bands() {
        assert_eq!(PerformanceBand::from_f1(0.8), PerformanceBand::Excellent);
        assert_eq!(PerformanceBand::from_f1(0.79), PerformanceBand::Good);
        assert_eq!(PerformanceBand::from_f1(0.4), PerformanceBand::Fair);
        assert_eq!(PerformanceBand::from_f1(0.39), PerformanceBand::Poor);
    }

    #[test]
    fn counts_serialize_with_codes() {
        let mut c = Counts::default();
        c.add(Label::FalseNegative);
        let json = serde_json::to_value(c).unwrap();
        assert_eq!(json["FN"], 1);
        assert_eq!(json["TP"], 0);
    }
}
