use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use crossboro_core::model::{
    feature::{FeatureVector, SparseFeatures},
    layout::{FeatureLayout, LayoutFlags, LayoutTag},
};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use itertools::Itertools;
use kdam::tqdm;
use rand::prelude::*;

use crate::model::evaluation::LabeledTrip;

use super::{DatasetError, DatasetFormat, DatasetManifest};

/// seed of the shuffle that precedes subsampling
pub const DEFAULT_SUBSAMPLE_SEED: u64 = 10701;

/// crossing trips encoded under a single layout
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub layout: LayoutTag,
    pub trips: Vec<LabeledTrip>,
}

impl Dataset {
    pub fn new(layout: LayoutTag, trips: Vec<LabeledTrip>) -> Dataset {
        Dataset { layout, trips }
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// reads a dataset through its manifest, rejecting it unless it was written
    /// under the current schema version with the requested flags.
    pub fn load(manifest_path: &Path, flags: &LayoutFlags) -> Result<Dataset, DatasetError> {
        let manifest = DatasetManifest::try_from(manifest_path)?;
        if !manifest.layout.is_compatible_with(flags) {
            return Err(DatasetError::LayoutMismatch {
                expected: LayoutTag::current(*flags),
                found: manifest.layout,
            });
        }
        let features_path = resolve(manifest_path, &manifest.features_file);
        let width = FeatureLayout::new(*flags).width;
        let reader = open_reader(&features_path)?;
        let trips = match manifest.format {
            DatasetFormat::Libsvm => read_libsvm(reader, &features_path, width)?,
            DatasetFormat::Csv => read_csv(reader, &features_path, width)?,
        };
        log::info!(
            "loaded {} trips with layout {} from '{}'",
            trips.len(),
            manifest.layout,
            features_path.display()
        );
        Ok(Dataset::new(manifest.layout, trips))
    }

    /// writes `{name}.json` and the features file into a directory, returning the
    /// manifest path. the features file is gzipped when `gzip` is set.
    pub fn save(
        &self,
        directory: &Path,
        name: &str,
        format: DatasetFormat,
        gzip: bool,
    ) -> Result<PathBuf, DatasetError> {
        let extension = match format {
            DatasetFormat::Libsvm => "libsvm",
            DatasetFormat::Csv => "csv",
        };
        let features_file = if gzip {
            format!("{name}.{extension}.gz")
        } else {
            format!("{name}.{extension}")
        };
        let features_path = directory.join(&features_file);
        let manifest_path = directory.join(format!("{name}.json"));
        let write_error = |path: &Path, e: String| DatasetError::Write {
            path: path.to_path_buf(),
            message: e,
        };

        std::fs::create_dir_all(directory).map_err(|e| write_error(directory, e.to_string()))?;
        let file =
            File::create(&features_path).map_err(|e| write_error(&features_path, e.to_string()))?;
        let writer: Box<dyn Write> = if gzip {
            Box::new(GzEncoder::new(BufWriter::new(file), Compression::default()))
        } else {
            Box::new(BufWriter::new(file))
        };
        match format {
            DatasetFormat::Libsvm => write_libsvm(writer, &self.trips),
            DatasetFormat::Csv => write_csv(writer, &self.trips),
        }
        .map_err(|e| write_error(&features_path, e))?;

        let manifest = DatasetManifest {
            layout: self.layout,
            format,
            features_file,
        };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| write_error(&manifest_path, e.to_string()))?;
        std::fs::write(&manifest_path, json)
            .map_err(|e| write_error(&manifest_path, e.to_string()))?;
        Ok(manifest_path)
    }

    /// keeps floor(n * test_size) trips drawn by a seeded shuffle. a test size of
    /// 1 keeps every trip in dataset order.
    pub fn subsample(self, test_size: f64, seed: u64) -> Result<Dataset, DatasetError> {
        if !(test_size > 0.0 && test_size <= 1.0) {
            return Err(DatasetError::InvalidTestSize(test_size));
        }
        if test_size == 1.0 {
            return Ok(self);
        }
        let n_keep = (self.trips.len() as f64 * test_size).floor() as usize;
        let mut trips = self.trips;
        let mut rng = StdRng::seed_from_u64(seed);
        trips.shuffle(&mut rng);
        trips.truncate(n_keep);
        log::info!("subsampled {n_keep} trips with test size {test_size}");
        Ok(Dataset::new(self.layout, trips))
    }
}

fn resolve(manifest_path: &Path, features_file: &str) -> PathBuf {
    let path = Path::new(features_file);
    match manifest_path.parent() {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

fn open_reader(path: &Path) -> Result<Box<dyn BufRead>, DatasetError> {
    let file = File::open(path).map_err(|e| DatasetError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let is_gzip = path.extension().map(|e| e == "gz").unwrap_or(false);
    let reader: Box<dyn Read> = if is_gzip {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(reader)))
}

fn read_libsvm(
    reader: Box<dyn BufRead>,
    path: &Path,
    width: usize,
) -> Result<Vec<LabeledTrip>, DatasetError> {
    let mut trips = vec![];
    let parse_error = |line: usize, message: String| DatasetError::Parse {
        path: path.to_path_buf(),
        line: line + 1,
        message,
    };
    for (idx, row) in tqdm!(reader.lines().enumerate(), desc = "read libsvm rows") {
        let row = row.map_err(|e| DatasetError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut tokens = row.split_whitespace();
        let label = match tokens.next() {
            Some(label) => label
                .parse::<f64>()
                .map_err(|e| parse_error(idx, format!("invalid label '{label}': {e}")))?,
            None => continue,
        };
        let entries = tokens
            .map(|token| {
                let (index, value) = token
                    .split_once(':')
                    .ok_or_else(|| parse_error(idx, format!("expected idx:value, found '{token}'")))?;
                let index = index
                    .parse::<usize>()
                    .map_err(|e| parse_error(idx, format!("invalid index '{index}': {e}")))?;
                let value = value
                    .parse::<f32>()
                    .map_err(|e| parse_error(idx, format!("invalid value '{value}': {e}")))?;
                Ok((index, value))
            })
            .collect::<Result<Vec<_>, DatasetError>>()?;
        let sparse = SparseFeatures::from_entries(width, entries)
            .map_err(|e| parse_error(idx, e.to_string()))?;
        trips.push(LabeledTrip::new(FeatureVector::Sparse(sparse), label));
    }
    eprintln!();
    Ok(trips)
}

fn read_csv(
    reader: Box<dyn BufRead>,
    path: &Path,
    width: usize,
) -> Result<Vec<LabeledTrip>, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut trips = vec![];
    let parse_error = |line: usize, message: String| DatasetError::Parse {
        path: path.to_path_buf(),
        line: line + 1,
        message,
    };
    for (idx, row) in tqdm!(csv_reader.records().enumerate(), desc = "read csv rows") {
        let record = row.map_err(|e| parse_error(idx, e.to_string()))?;
        if record.len() != width + 1 {
            return Err(parse_error(
                idx,
                format!("expected a label and {width} values, found {} fields", record.len()),
            ));
        }
        let label = record[0]
            .parse::<f64>()
            .map_err(|e| parse_error(idx, format!("invalid label '{}': {e}", &record[0])))?;
        let values = record
            .iter()
            .skip(1)
            .map(|field| match field {
                "" => Ok(f32::NAN),
                _ => field
                    .parse::<f32>()
                    .map_err(|e| parse_error(idx, format!("invalid value '{field}': {e}"))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        trips.push(LabeledTrip::new(FeatureVector::Dense(values), label));
    }
    eprintln!();
    Ok(trips)
}

fn write_libsvm(mut writer: Box<dyn Write>, trips: &[LabeledTrip]) -> Result<(), String> {
    for trip in trips.iter() {
        let entries = match &trip.features {
            FeatureVector::Sparse(sparse) => sparse.entries().collect_vec(),
            FeatureVector::Dense(values) => values
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_nan())
                .map(|(i, v)| (i, *v))
                .collect_vec(),
        };
        let row = entries.iter().map(|(i, v)| format!("{i}:{v}")).join(" ");
        writeln!(writer, "{} {row}", trip.duration).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())
}

fn write_csv(writer: Box<dyn Write>, trips: &[LabeledTrip]) -> Result<(), String> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for trip in trips.iter() {
        let mut record = vec![trip.duration.to_string()];
        record.extend(trip.features.to_dense().iter().map(|v| {
            if v.is_nan() {
                String::new()
            } else {
                v.to_string()
            }
        }));
        csv_writer.write_record(&record).map_err(|e| e.to_string())?;
    }
    csv_writer.flush().map_err(|e| e.to_string())
}
