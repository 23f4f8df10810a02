use std::path::Path;

use clap::{Args, Parser, Subcommand};
use crossboro_core::model::{
    geography::{CrossingGeography, TableGeographyStore},
    layout::{FeatureLayout, LayoutFlags},
    leg::LegSynthesizer,
    partition::Superborough,
};
use serde::{Deserialize, Serialize};

use crate::{
    app::dataset::{Dataset, DEFAULT_SUBSAMPLE_SEED},
    model::{
        duration::{ModelEnsemble, ModelPaths},
        evaluation::{
            EvaluationSummary, Evaluator, FileLogObserver, LogObserver, ProgressObserver,
        },
        route::RouteAggregator,
    },
};

use super::{CrossboroAppError, CrossboroConfig};

/// Cross-superborough trip duration ensemble: predicts taxi trip durations that
/// cross a bridge by combining per-partition models over each candidate bridge.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CrossboroApp {
    /// raise the log level, repeat for more detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub op: CrossboroOperation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum CrossboroOperation {
    /// score a dataset of crossing trips and report the RMSE of the ensemble
    Evaluate(EvaluateArgs),
    /// list the bridge crossings between two superboroughs as CSV
    Bridges {
        /// run configuration file (TOML)
        #[arg(short, long)]
        config_file: String,

        /// superborough code of the first partition (1, 2 or 3)
        #[arg(short, long)]
        a: u8,

        /// superborough code of the second partition (1, 2 or 3)
        #[arg(short, long)]
        b: u8,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct EvaluateArgs {
    /// run configuration file (TOML)
    #[arg(short, long)]
    pub config_file: String,

    /// dataset manifest (JSON) of the crossing trips to score
    #[arg(short, long)]
    pub dataset: String,

    /// features carry the one-hot pickup datetime block
    #[arg(long)]
    pub datetime_one_hot: bool,

    /// features carry the one-hot weekday block
    #[arg(long)]
    pub weekdays_one_hot: bool,

    /// features carry one-hot pickup and dropoff zone ids
    #[arg(long)]
    pub loc_id: bool,

    /// fraction of the dataset to score, in (0, 1]
    #[arg(long, default_value_t = 1.0)]
    pub test_size: f64,

    /// seed of the shuffle applied before subsampling
    #[arg(long, default_value_t = DEFAULT_SUBSAMPLE_SEED)]
    pub seed: u64,

    /// overrides the configured model for superborough 1
    #[arg(long)]
    pub sb1_model_path: Option<String>,

    /// overrides the configured model for superborough 2
    #[arg(long)]
    pub sb2_model_path: Option<String>,

    /// overrides the configured model for superborough 3
    #[arg(long)]
    pub sb3_model_path: Option<String>,

    /// overrides the configured checkpoint interval. 0 disables the log file.
    #[arg(long)]
    pub log_interval: Option<usize>,

    /// overrides the configured number of worker threads
    #[arg(long)]
    pub parallelism: Option<usize>,

    /// hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl EvaluateArgs {
    pub fn layout_flags(&self) -> LayoutFlags {
        LayoutFlags::new(self.datetime_one_hot, self.weekdays_one_hot, self.loc_id)
    }

    /// model paths for this run: command line overrides on top of the configured
    /// paths for the layout. a path left empty fails when the ensemble is loaded.
    pub fn model_paths(&self, configured: Option<&ModelPaths>) -> ModelPaths {
        let pick = |arg: &Option<String>, sb: Superborough| match arg {
            Some(path) => path.clone(),
            None => configured
                .map(|paths| paths.get(sb).to_string())
                .unwrap_or_default(),
        };
        ModelPaths {
            sb1: pick(&self.sb1_model_path, Superborough::ManhattanEwrBronx),
            sb2: pick(&self.sb2_model_path, Superborough::BrooklynQueens),
            sb3: pick(&self.sb3_model_path, Superborough::StatenIsland),
        }
    }
}

impl CrossboroOperation {
    pub fn run(&self) -> Result<(), CrossboroAppError> {
        match self {
            CrossboroOperation::Evaluate(args) => {
                let config = CrossboroConfig::try_from(Path::new(&args.config_file))?;
                let summary = run_evaluation(&config, args)?;
                let output = serde_json::to_string_pretty(&summary).map_err(|e| {
                    CrossboroAppError::WriteError(format!("failure serializing summary: {e}"))
                })?;
                println!("{output}");
                Ok(())
            }
            CrossboroOperation::Bridges { config_file, a, b } => {
                let config = CrossboroConfig::try_from(Path::new(config_file))?;
                let a = parse_superborough(*a)?;
                let b = parse_superborough(*b)?;
                write_bridges(&config, a, b, std::io::stdout())
            }
        }
    }
}

/// runs the evaluation pipeline for a loaded configuration.
pub fn run_evaluation(
    config: &CrossboroConfig,
    args: &EvaluateArgs,
) -> Result<EvaluationSummary, CrossboroAppError> {
    let flags = args.layout_flags();
    let key = flags.key();
    let mut evaluation = config.evaluation.clone();
    if let Some(interval) = args.log_interval {
        evaluation.log_interval = interval;
    }
    if let Some(parallelism) = args.parallelism {
        evaluation.parallelism = parallelism;
    }

    let model_paths = args.model_paths(config.model_paths(&flags));
    let ensemble = ModelEnsemble::try_from(&model_paths)?;
    log::info!("loaded models for layout {key}: {ensemble:?}");

    let dataset = Dataset::load(Path::new(&args.dataset), &flags)?
        .subsample(args.test_size, args.seed)?;
    log::info!(
        "scoring {} trips with unroutable policy '{}'",
        dataset.len(),
        evaluation.unroutable_policy
    );

    let store = TableGeographyStore::try_from(&config.geography)?;
    let geography = CrossingGeography::new(store)?;
    let synthesizer = LegSynthesizer::new(FeatureLayout::new(flags));
    let aggregator = RouteAggregator::new(ensemble);

    let mut evaluator = Evaluator::new(synthesizer, aggregator, geography, evaluation.clone())
        .with_observer(Box::new(LogObserver));
    if !args.no_progress {
        evaluator = evaluator.with_observer(Box::new(ProgressObserver::new()));
    }
    if evaluation.writes_log_file() {
        let filename = format!("log_ts{:?}_{key}.txt", args.test_size);
        let path = Path::new(&evaluation.log_directory).join(filename);
        let header = vec![
            format!("sb1: {}", model_paths.sb1),
            format!("sb2: {}", model_paths.sb2),
            format!("sb3: {}", model_paths.sb3),
            format!("started: {}", chrono::Local::now().to_rfc3339()),
        ];
        log::info!("writing checkpoints to {}", path.display());
        evaluator = evaluator.with_observer(Box::new(FileLogObserver::new(&path, header)));
    }

    let summary = evaluator.run(&dataset.trips)?;
    Ok(summary)
}

#[derive(Serialize)]
struct BridgeRow {
    #[serde(rename = "LocationID1")]
    location_id_1: u32,
    #[serde(rename = "LocationID2")]
    location_id_2: u32,
    #[serde(rename = "Borough1")]
    borough_1: String,
    #[serde(rename = "Borough2")]
    borough_2: String,
}

/// writes the bridges between two superboroughs as CSV rows.
pub fn write_bridges<W: std::io::Write>(
    config: &CrossboroConfig,
    a: Superborough,
    b: Superborough,
    output: W,
) -> Result<(), CrossboroAppError> {
    let store = TableGeographyStore::try_from(&config.geography)?;
    let mut geography = CrossingGeography::new(store)?;
    let bridges = geography.bridges_between(a, b)?.to_vec();
    log::info!("found {} bridges between {a} and {b}", bridges.len());

    let name = |location| {
        geography
            .regions()
            .borough_of(location)
            .map(|borough| borough.name().to_string())
            .unwrap_or_default()
    };
    let mut writer = csv::Writer::from_writer(output);
    for bridge in bridges.iter() {
        let row = BridgeRow {
            location_id_1: bridge.first,
            location_id_2: bridge.second,
            borough_1: name(bridge.first),
            borough_2: name(bridge.second),
        };
        writer
            .serialize(row)
            .map_err(|e| CrossboroAppError::WriteError(format!("bridge {bridge}: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| CrossboroAppError::WriteError(e.to_string()))
}

fn parse_superborough(code: u8) -> Result<Superborough, CrossboroAppError> {
    Superborough::from_code(code).ok_or_else(|| {
        CrossboroAppError::InvalidUserInput(format!(
            "'{code}' is not a superborough code, expected 1, 2 or 3"
        ))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::evaluation::UnroutablePolicy;
    use std::path::PathBuf;

    fn test_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test")
    }

    fn evaluate_args() -> EvaluateArgs {
        EvaluateArgs {
            config_file: test_dir()
                .join("crossboro_test.toml")
                .to_string_lossy()
                .to_string(),
            dataset: test_dir()
                .join("dataset")
                .join("crossing_011.json")
                .to_string_lossy()
                .to_string(),
            datetime_one_hot: false,
            weekdays_one_hot: true,
            loc_id: true,
            test_size: 1.0,
            seed: DEFAULT_SUBSAMPLE_SEED,
            sb1_model_path: None,
            sb2_model_path: None,
            sb3_model_path: None,
            log_interval: None,
            parallelism: None,
            no_progress: true,
        }
    }

    fn test_config(log_directory: &Path) -> CrossboroConfig {
        let args = evaluate_args();
        let mut config = CrossboroConfig::try_from(Path::new(&args.config_file)).unwrap();
        config.evaluation.log_directory = log_directory.to_string_lossy().to_string();
        config
    }

    #[test]
    fn test_evaluate_with_fallback() {
        let log_directory = std::env::temp_dir().join("crossboro_test_evaluate_fallback");
        let config = test_config(&log_directory);
        let args = evaluate_args();
        let summary = run_evaluation(&config, &args).unwrap();
        assert_eq!(summary.n_trips, 3);
        assert_eq!(summary.routed, 2);
        assert_eq!(summary.unroutable, 1);
        assert_eq!(summary.fallback_scored, 1);
        let expected = ((530.0_f64.powi(2) + 170.0_f64.powi(2) + 600.0_f64.powi(2)) / 3.0).sqrt();
        let rmse = summary.rmse.unwrap();
        assert!((rmse - expected).abs() < 1e-6, "rmse {rmse} != {expected}");

        let log_file = log_directory.join("log_ts1.0_011.txt");
        let contents = std::fs::read_to_string(&log_file).unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("sb1: "));
        assert!(contents.contains("idx 1: 530.0000"));
        let _ = std::fs::remove_dir_all(&log_directory);
    }

    #[test]
    fn test_evaluate_excluding_unroutable() {
        let log_directory = std::env::temp_dir().join("crossboro_test_evaluate_exclude");
        let mut config = test_config(&log_directory);
        config.evaluation.unroutable_policy = UnroutablePolicy::Exclude;
        let mut args = evaluate_args();
        args.log_interval = Some(0);
        args.parallelism = Some(2);
        let summary = run_evaluation(&config, &args).unwrap();
        assert_eq!(summary.routed, 2);
        assert_eq!(summary.fallback_scored, 0);
        let expected = ((530.0_f64.powi(2) + 170.0_f64.powi(2)) / 2.0).sqrt();
        assert!((summary.rmse.unwrap() - expected).abs() < 1e-6);
        assert!(!log_directory.exists());
    }

    #[test]
    fn test_model_path_overrides() {
        let configured = ModelPaths {
            sb1: String::from("a.json"),
            sb2: String::from("b.json"),
            sb3: String::from("c.json"),
        };
        let mut args = evaluate_args();
        args.sb2_model_path = Some(String::from("override.json"));
        let paths = args.model_paths(Some(&configured));
        assert_eq!(paths.sb1, "a.json");
        assert_eq!(paths.sb2, "override.json");
        assert_eq!(paths.sb3, "c.json");

        let paths = args.model_paths(None);
        assert_eq!(paths.sb1, "");
        assert_eq!(paths.sb2, "override.json");
    }

    #[test]
    fn test_missing_layout_models() {
        let log_directory = std::env::temp_dir().join("crossboro_test_missing_models");
        let config = test_config(&log_directory);
        let mut args = evaluate_args();
        args.loc_id = false;
        let result = run_evaluation(&config, &args);
        assert!(matches!(result, Err(CrossboroAppError::Model(_))));
    }

    #[test]
    fn test_write_bridges() {
        let config = test_config(&std::env::temp_dir());
        let mut output = vec![];
        write_bridges(
            &config,
            Superborough::BrooklynQueens,
            Superborough::ManhattanEwrBronx,
            &mut output,
        )
        .unwrap();
        let text = String::from_utf8(output).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("LocationID1,LocationID2,Borough1,Borough2")
        );
        assert_eq!(lines.count(), 3);
    }

    #[test]
    fn test_parse_superborough() {
        assert_eq!(
            parse_superborough(2).unwrap(),
            Superborough::BrooklynQueens
        );
        assert!(parse_superborough(0).is_err());
        assert!(parse_superborough(4).is_err());
    }
}
