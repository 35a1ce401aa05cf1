//! Utility routines for loading and storing data into files.
use std::path::Path;

use ndarray::prelude::*;
use csv::{ReaderBuilder, Trim, WriterBuilder};

use data::{Dataset, MISSING};
use dominance::NonDominatedSet;
use error::{Error, LearningResult};


/// Loads the raw content of a CSV data file.
///
/// The file format should be, for each row:
///     label, x1, x2, ...
/// where x1, x2, ... are small non-negative integers forming a feature
/// vector; `?` or an empty cell marks a missing value.
pub fn load_records<P: AsRef<Path>>(path: P)
        -> LearningResult<(Array2<usize>, Array1<usize>)> {
    let mut reader = ReaderBuilder::new().has_headers(false)
                                         .flexible(true)
                                         .trim(Trim::All)
                                         .from_path(path)?;

    let mut features: Vec<usize> = Vec::new();
    let mut labels: Vec<usize> = Vec::new();
    let mut d: Option<usize> = None;

    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line() as usize);

        if record.len() == 0 {
            continue;
        }
        let width = record.len() - 1;
        match d {
            Some(x) if x != width => {
                return Err(Error::Malformed {
                    line,
                    reason: format!("expected {} features, got {}", x, width),
                });
            },
            _ => d = Some(width),
        }

        labels.push(parse_value(&record[0], line)?);
        for cell in record.iter().skip(1) {  // First one is the label.
            features.push(if cell.is_empty() || cell == "?" {
                MISSING
            } else {
                parse_value(cell, line)?
            });
        }
    }

    let d = d.unwrap_or(0);
    let n = labels.len();
    let features = Array::from_shape_vec((n, d), features)
                         .map_err(|e| Error::Malformed { line: 0, reason: e.to_string() })?;

    Ok((features, Array::from(labels)))
}

/// Loads a CSV data file into a `Dataset`, inferring the number of values
/// of each feature and the number of classes.
pub fn load_data<P: AsRef<Path>>(path: P) -> LearningResult<Dataset> {
    let (features, labels) = load_records(path)?;
    Dataset::from_observed(features, labels)
}

/// Loads a CSV file of queries described like `training`: same value
/// counts per feature, same classes. Values the training set cannot
/// describe are rejected here, before any prediction.
pub fn load_testing_data<P: AsRef<Path>>(path: P, training: &Dataset) -> LearningResult<Dataset> {
    let (features, labels) = load_records(path)?;
    Dataset::new(features, labels, training.n_values().to_vec(), training.n_classes())
}

/// Stores predictions into a file.
///
/// Each line contains the non-dominated classes of one query, separated
/// by spaces; a query that could not be classified gives a line with a
/// single `?`.
pub fn store_predictions<P: AsRef<Path>>(predictions: &[Option<NonDominatedSet>], path: P)
        -> LearningResult<()> {
    let mut writer = WriterBuilder::new().delimiter(b' ')
                                         .flexible(true)
                                         .from_path(path)?;

    for prediction in predictions {
        match *prediction {
            Some(ref set) => writer.write_record(set.classes()
                                                   .iter()
                                                   .map(|y| y.to_string()))?,
            None => writer.write_record(&["?"])?,
        }
    }

    writer.flush()?;
    Ok(())
}

fn parse_value(cell: &str, line: usize) -> LearningResult<usize> {
    cell.parse::<usize>()
        .map_err(|_| Error::Malformed {
            line,
            reason: format!("`{}` is not a non-negative integer", cell),
        })
}
