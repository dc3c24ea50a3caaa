use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty schema, duplicate property, bad tolerance, etc.).
    ConfigValidation(String),
    /// A pair whose records do not have one ground-truth and one predicted side,
    /// or a (ground truth, predicted) combination submitted twice in one batch.
    InvalidPairing {
        ground_truth: String,
        predicted: String,
        reason: String,
    },
    /// A property name that is not part of the active schema.
    UnknownProperty(String),
    /// A label code other than TP / FP / TN / FN.
    InvalidLabel(String),
    /// Classification store failure.
    Store(String),
    /// Report serialization failure.
    Export(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InvalidPairing { ground_truth, predicted, reason } => {
                write!(f, "invalid pairing '{ground_truth}' <-> '{predicted}': {reason}")
            }
            Self::UnknownProperty(name) => write!(f, "unknown property: {name}"),
            Self::InvalidLabel(code) => {
                write!(f, "invalid classification '{code}' (expected TP, FP, TN or FN)")
            }
            Self::Store(msg) => write!(f, "classification store error: {msg}"),
            Self::Export(msg) => write!(f, "export error: {msg}"),
        }
    }
}

impl std::error::Error for EvalError {}
