//! Error type shared by every credal classifier.
//!
//! Errors fall in three kinds:
//! - `Configuration`: raised while building or training a model; fatal.
//! - `Input`: raised by a single prediction call; the model is untouched
//!   and later calls are unaffected.
//! - `Io`: reading or writing data files.
use std::fmt;
use std::io;

use thiserror::Error;


/// Result of any fallible learning operation.
pub type LearningResult<T> = Result<T, Error>;

/// Coarse classification of an `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Input,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Input => write!(f, "input"),
            ErrorKind::Io => write!(f, "io"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("parameter s must be a finite non-negative number (got {0})")]
    InvalidS(f64),

    #[error("a classifier needs at least one class")]
    NoClasses,

    #[error("class weights: {reason}")]
    InvalidClassWeights { reason: String },

    #[error("cost matrix: {reason}")]
    InvalidCostMatrix { reason: String },

    #[error("dominance threshold must be in (0.5, 1] (got {0})")]
    InvalidThreshold(f64),

    #[error("root selection: {reason}")]
    InvalidRootSelection { reason: String },

    #[error("local classifier needs at least one positive bandwidth")]
    InvalidBandwidths,

    #[error("training set is empty")]
    EmptyTrainingData,

    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("training record {record}: feature {feature} has value {value}, \
             but only {n_values} values are declared")]
    TrainingValueOutOfRange { record: usize, feature: usize, value: usize, n_values: usize },

    #[error("training record {record}: label {label} is not one of the {n_classes} classes")]
    LabelOutOfRange { record: usize, label: usize, n_classes: usize },

    #[error("training record {record}: missing value for feature {feature} \
             is not supported by the tree builder")]
    MissingTrainingValue { record: usize, feature: usize },

    #[error("unsupported missing value for feature {feature}")]
    UnsupportedMissingValue { feature: usize },

    #[error("feature {feature} has value {value}, but only {n_values} values were seen in training")]
    UnknownFeatureValue { feature: usize, value: usize, n_values: usize },

    #[error("query has {got} features, the model was trained on {expected}")]
    QueryLength { expected: usize, got: usize },

    #[error("the model must be trained before classifying")]
    NotTrained,

    #[error("malformed data at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match *self {
            Error::InvalidS(_)
            | Error::NoClasses
            | Error::InvalidClassWeights { .. }
            | Error::InvalidCostMatrix { .. }
            | Error::InvalidThreshold(_)
            | Error::InvalidRootSelection { .. }
            | Error::InvalidBandwidths
            | Error::EmptyTrainingData
            | Error::ShapeMismatch { .. }
            | Error::TrainingValueOutOfRange { .. }
            | Error::LabelOutOfRange { .. }
            | Error::MissingTrainingValue { .. } => ErrorKind::Configuration,
            Error::UnsupportedMissingValue { .. }
            | Error::UnknownFeatureValue { .. }
            | Error::QueryLength { .. }
            | Error::NotTrained => ErrorKind::Input,
            Error::Malformed { .. }
            | Error::Io(_)
            | Error::Csv(_)
            | Error::Json(_) => ErrorKind::Io,
        }
    }

    /// True if the failed call can be retried (e.g., after imputing a
    /// missing value) without rebuilding the model.
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Input
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert!(Error::InvalidS(-1.).kind() == ErrorKind::Configuration);
        assert!(Error::NoClasses.kind() == ErrorKind::Configuration);
        assert!(Error::UnsupportedMissingValue { feature: 3 }.kind() == ErrorKind::Input);
        assert!(Error::Malformed { line: 1, reason: "x".into() }.kind() == ErrorKind::Io);
    }

    /// Only per-call input errors are recoverable.
    #[test]
    fn recoverable() {
        assert!(Error::UnsupportedMissingValue { feature: 0 }.is_recoverable());
        assert!(Error::NotTrained.is_recoverable());
        assert!(!Error::InvalidS(f64::NAN).is_recoverable());
        assert!(!Error::EmptyTrainingData.is_recoverable());
    }

    #[test]
    fn messages() {
        let e = Error::UnsupportedMissingValue { feature: 2 };
        assert_eq!(e.to_string(), "unsupported missing value for feature 2");
        let e = Error::InvalidS(-0.5);
        assert_eq!(e.to_string(), "parameter s must be a finite non-negative number (got -0.5)");
    }
}
