#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate tracing;
extern crate docopt;
extern crate serde_json;
extern crate tracing_subscriber;
extern crate credal;

use std::io;

use docopt::Docopt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use credal::classify::CredalClassifier;
use credal::config::{NaiveConfig, TreeConfig};
use credal::dominance::NonDominatedSet;
use credal::error::Error;
use credal::stats::{SetAccuracy, StatisticsSink};
use credal::utils::{load_data, load_testing_data, store_predictions};

const USAGE: &'static str = "
Predict data using credal classifiers.

Each output line holds the non-dominated classes of one testing record,
or `?` if the record could not be classified. A JSON summary of the
set-valued accuracy is printed on stdout.

Usage: credal tree [options] [--] <output-file> <training-file> <testing-file>
       credal ncc [options] [--] <output-file> <training-file> <testing-file>
       credal (--help | --version)

Options:
    -c, --config=<json>         JSON configuration of the classifier.
    -s, --strength=<s>          IDM prior strength; overrides the configuration.
    -v, --verbose               Debug logging (RUST_LOG takes precedence).
    -h, --help                  Show help.
    --version                   Show the version.
";

#[derive(Deserialize)]
struct Args {
    flag_config: Option<String>,
    flag_strength: Option<f64>,
    flag_verbose: bool,
    arg_output_file: String,
    arg_training_file: String,
    arg_testing_file: String,
    cmd_tree: bool,
    cmd_ncc: bool,
}

/// Collects the predictions of an evaluation next to its statistics.
struct Recorder {
    stats: SetAccuracy,
    predictions: Vec<Option<NonDominatedSet>>,
}

impl StatisticsSink for Recorder {
    fn record(&mut self, set: &NonDominatedSet, truth: usize) {
        self.stats.record(set, truth);
        self.predictions.push(Some(set.clone()));
    }

    fn record_precise(&mut self, set: &NonDominatedSet, predicted: usize, truth: usize) {
        self.stats.record_precise(set, predicted, truth);
    }

    fn record_failure(&mut self, error: &Error) {
        warn!(record = self.predictions.len(), %error, "record not classified");
        self.stats.record_failure(error);
        self.predictions.push(None);
    }
}

/// Logs to stderr, filtered by RUST_LOG.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("credal={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr)
                          .with_target(false))
        .init();
}


fn main() {
    // Parse args from command line.
    let args: Args = Docopt::new(USAGE)
                            .and_then(|d| d.version(Some(env!("CARGO_PKG_VERSION").into()))
                                           .deserialize())
                            .unwrap_or_else(|e| e.exit());

    init_logging(args.flag_verbose);

    // Classifier.
    let mut classifier: Box<dyn CredalClassifier> = if args.cmd_tree {
        let mut config = match args.flag_config {
            Some(ref path) => TreeConfig::from_json_file(path)
                                         .expect("Failed to load the configuration"),
            None => TreeConfig::default(),
        };
        if let Some(s) = args.flag_strength {
            config.s = s;
        }
        Box::new(config.build().expect("Invalid configuration"))
    } else if args.cmd_ncc {
        let mut config = match args.flag_config {
            Some(ref path) => NaiveConfig::from_json_file(path)
                                          .expect("Failed to load the configuration"),
            None => NaiveConfig::default(),
        };
        if let Some(s) = args.flag_strength {
            config.s = s;
        }
        config.build().expect("Invalid configuration")
    } else {
        // Docopt shouldn't let this happen.
        panic!("This shouldn't happen");
    };

    // Load training and test data.
    let training = load_data(&args.arg_training_file)
                            .expect("Failed to load training data");
    let testing = load_testing_data(&args.arg_testing_file, &training)
                           .expect("Failed to load testing data");
    info!(training = training.n_records(), testing = testing.n_records(),
          features = training.n_features(), classes = training.n_classes(),
          "loaded data");

    // Train.
    classifier.train(&training)
              .expect("Failed to train the model");

    // Predict and store results.
    let mut recorder = Recorder {
        stats: SetAccuracy::new(),
        predictions: Vec::with_capacity(testing.n_records()),
    };
    let skipped = classifier.evaluate(&testing, &mut recorder)
                            .expect("Failed to predict");
    if skipped > 0 {
        warn!(skipped, "some testing records could not be classified");
    }
    store_predictions(&recorder.predictions, &args.arg_output_file)
        .expect("Failed to store the output");

    println!("{}", serde_json::to_string_pretty(&recorder.stats.summary())
                              .expect("Failed to serialise the summary"));
}
