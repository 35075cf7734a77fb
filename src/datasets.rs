use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use tidy_sheet::{NormalizeError, Normalizer, StandardNormalizer, Table};

use crate::args::Args;
use crate::datasets::cache::*;
use crate::datasets::config_reader::*;
use crate::datasets::io_common::*;

pub mod cache;
pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DatasetError {
    #[snafu(display("Missing data source {path}"))]
    MissingSource { path: String },
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("Worksheet {worksheet:?} not found in workbook {path}"))]
    MissingWorksheet { path: String, worksheet: String },
    #[snafu(display("Workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV file {path} at line {lineno}"))]
    ParsingCsv {
        source: csv::Error,
        path: String,
        lineno: u64,
    },
    #[snafu(display("Error reading derived file {path}"))]
    ReadingArtifact {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Unexpected layout in {path}: {source}"))]
    Schema {
        source: NormalizeError,
        path: String,
    },
    #[snafu(display("Error rendering CSV for {path}"))]
    RenderingCsv { source: csv::Error, path: String },
    #[snafu(display("Error writing {path}"))]
    WritingArtifact {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error opening configuration {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing configuration"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Derived file {path} differs from a fresh normalization of its source"))]
    ArtifactMismatch { path: String },
}

/// The broad classes of failures, as seen by a caller of [`load_all`].
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ErrorKind {
    /// A raw source or a derived file is missing or cannot be read.
    DataSource,
    /// A row or column is not where it is expected.
    Schema,
    /// A derived file or the summary could not be written.
    Write,
    Config,
    Mismatch,
}

impl DatasetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DatasetError::MissingSource { .. }
            | DatasetError::OpeningExcel { .. }
            | DatasetError::MissingWorksheet { .. }
            | DatasetError::EmptyExcel { .. }
            | DatasetError::OpeningCsv { .. }
            | DatasetError::ParsingCsv { .. }
            | DatasetError::ReadingArtifact { .. } => ErrorKind::DataSource,
            DatasetError::Schema { .. } => ErrorKind::Schema,
            DatasetError::RenderingCsv { .. }
            | DatasetError::WritingArtifact { .. }
            | DatasetError::WritingSummary { .. }
            | DatasetError::SerializingJson { .. } => ErrorKind::Write,
            DatasetError::OpeningJson { .. } | DatasetError::ParsingJson { .. } => {
                ErrorKind::Config
            }
            DatasetError::ArtifactMismatch { .. } => ErrorKind::Mismatch,
        }
    }
}

pub type DatasetResult<T> = Result<T, DatasetError>;

/// The datasets used by the dashboard.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum DatasetName {
    PandemicHistory,
    CantonMortality,
    CantonIncidenceWeekly,
    CantonPopulation,
    CausesOfDeath,
    CausesOfDeathCleaned,
    CovidDaily,
    InfectiousDiseases,
}

enum SourceFormat {
    Excel,
    Csv,
}

impl DatasetName {
    pub const ALL: [DatasetName; 8] = [
        DatasetName::PandemicHistory,
        DatasetName::CantonMortality,
        DatasetName::CantonIncidenceWeekly,
        DatasetName::CantonPopulation,
        DatasetName::CausesOfDeath,
        DatasetName::CausesOfDeathCleaned,
        DatasetName::CovidDaily,
        DatasetName::InfectiousDiseases,
    ];

    /// The name under which the presentation code looks the dataset up.
    pub fn key(&self) -> &'static str {
        match self {
            DatasetName::PandemicHistory => "data_set1",
            DatasetName::CantonMortality => "data_set2_mortality",
            DatasetName::CantonIncidenceWeekly => "data_set2_incidence_weekly",
            DatasetName::CantonPopulation => "data_set2_population",
            DatasetName::CausesOfDeath => "data_set3",
            DatasetName::CausesOfDeathCleaned => "data_set3_cleaned",
            DatasetName::CovidDaily => "data_covid",
            DatasetName::InfectiousDiseases => "dataset3_infectdata",
        }
    }

    /// The file name inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            DatasetName::PandemicHistory => "1_History_Pandemics.xlsx",
            DatasetName::CantonMortality => "2_All_cantons_1953-1958_Mortality.xlsx",
            DatasetName::CantonIncidenceWeekly => "2_Data_cantons_incidence_weekly_56_58_NEW.xlsx",
            DatasetName::CantonPopulation => "2_Population_cantons.xlsx",
            DatasetName::CausesOfDeath => "3_Todesursachen Schweiz ohne Alter 1876-2002.xlsx",
            DatasetName::CausesOfDeathCleaned => "data_set3_cleaned.csv",
            DatasetName::CovidDaily => "full_data.csv",
            DatasetName::InfectiousDiseases => "dataset_3_cleaned_infectious_diseases.csv",
        }
    }

    /// True for the files derived from the causes of death workbook.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            DatasetName::CausesOfDeathCleaned | DatasetName::InfectiousDiseases
        )
    }

    fn format(&self) -> SourceFormat {
        match self {
            DatasetName::CausesOfDeathCleaned
            | DatasetName::CovidDaily
            | DatasetName::InfectiousDiseases => SourceFormat::Csv,
            _ => SourceFormat::Excel,
        }
    }
}

impl Display for DatasetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// All the loaded datasets, by name.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Datasets {
    tables: BTreeMap<DatasetName, Table>,
}

impl Datasets {
    pub fn get(&self, name: DatasetName) -> Option<&Table> {
        self.tables.get(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DatasetName, &Table)> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }
}

/// Every raw source must be present before anything is derived or read.
fn check_sources(config: &DataConfig) -> DatasetResult<()> {
    for name in DatasetName::ALL.iter().filter(|n| !n.is_derived()) {
        require_file(&config.path(*name))?;
    }
    Ok(())
}

fn build_causes_of_death(config: &DataConfig, normalizer: &dyn Normalizer) -> DatasetResult<Table> {
    let raw_path = config.path(DatasetName::CausesOfDeath);
    let sheet = io_excel::read_raw_sheet(&raw_path, None)?;
    let layout = config.causes_of_death.hierarchical_layout();
    debug!("build_causes_of_death: layout: {:?}", layout);
    normalizer
        .hierarchical(&sheet, &layout)
        .context(SchemaSnafu {
            path: path_str(&raw_path),
        })
}

fn build_infectious_diseases(
    config: &DataConfig,
    normalizer: &dyn Normalizer,
) -> DatasetResult<Table> {
    let raw_path = config.path(DatasetName::CausesOfDeath);
    let worksheet = config.causes_of_death.worksheet_name();
    let sheet = io_excel::read_raw_sheet(&raw_path, Some(worksheet.as_str()))?;
    let layout = config.causes_of_death.flat_layout();
    debug!("build_infectious_diseases: layout: {:?}", layout);
    normalizer.flat(&sheet, &layout).context(SchemaSnafu {
        path: path_str(&raw_path),
    })
}

fn build_derived(
    name: DatasetName,
    config: &DataConfig,
    normalizer: &dyn Normalizer,
) -> DatasetResult<Table> {
    match name {
        DatasetName::InfectiousDiseases => build_infectious_diseases(config, normalizer),
        _ => build_causes_of_death(config, normalizer),
    }
}

/// Loads all the datasets from the data directory, deriving the cleaned files
/// from the causes of death workbook when they do not exist yet.
pub fn load_all(config: &DataConfig) -> DatasetResult<Datasets> {
    load_all_with(config, &FileCache, &StandardNormalizer)
}

/// Same as [`load_all`], with the cache policy and the normalization procedures
/// provided by the caller.
///
/// Either all the datasets are returned, or none.
pub fn load_all_with(
    config: &DataConfig,
    cache: &dyn ArtifactCache,
    normalizer: &dyn Normalizer,
) -> DatasetResult<Datasets> {
    check_sources(config)?;

    for name in DatasetName::ALL.iter().filter(|n| n.is_derived()) {
        let created = ensure_artifact(cache, &config.path(*name), || {
            build_derived(*name, config, normalizer)
        })?;
        debug!("load_all: {}: created: {}", name, created);
    }

    let mut tables: BTreeMap<DatasetName, Table> = BTreeMap::new();
    for name in DatasetName::ALL {
        let path = config.path(name);
        info!("Attempting to read dataset {} from {:?}", name, path_str(&path));
        let table = match name.format() {
            SourceFormat::Excel => io_excel::read_flat_table(&path)?,
            SourceFormat::Csv => io_csv::read_table_csv(&path)?,
        };
        debug!(
            "load_all: {}: {} rows, columns: {:?}",
            name,
            table.num_rows(),
            table.column_names()
        );
        tables.insert(name, table);
    }
    Ok(Datasets { tables })
}

/// Checks that the derived files on disk are exactly what the normalization of
/// the current workbook produces. The differences are printed.
pub fn verify_artifacts(config: &DataConfig) -> DatasetResult<()> {
    check_sources(config)?;
    for name in DatasetName::ALL.iter().filter(|n| n.is_derived()) {
        let path = config.path(*name);
        let table = build_derived(*name, config, &StandardNormalizer)?;
        let expected = io_csv::render_csv(&table, &path)?;
        let actual = fs::read(&path).context(ReadingArtifactSnafu {
            path: path_str(&path),
        })?;
        if actual != expected {
            warn!("Found differences in derived file {:?}", path_str(&path));
            print_diff(
                String::from_utf8_lossy(&actual).as_ref(),
                String::from_utf8_lossy(&expected).as_ref(),
                "\n",
            );
            return ArtifactMismatchSnafu {
                path: path_str(&path),
            }
            .fail();
        }
        info!("Derived file {:?} is up to date", path_str(&path));
    }
    Ok(())
}

/// A JSON description of the loaded datasets: files, sizes and column types.
pub fn summary_json(config: &DataConfig, datasets: &Datasets) -> JSValue {
    let entries: Vec<JSValue> = datasets
        .iter()
        .map(|(name, table)| {
            let columns: Vec<JSValue> = table
                .columns()
                .iter()
                .map(|c| json!({"name": c.name, "type": c.kind.as_str()}))
                .collect();
            json!({
                "name": name.key(),
                "file": path_str(&config.path(*name)),
                "rows": table.num_rows(),
                "columns": columns
            })
        })
        .collect();
    json!({
        "dataDirectory": config.data_directory,
        "datasets": entries
    })
}

fn write_summary(out: &str, summary: &JSValue) -> DatasetResult<()> {
    let pretty = serde_json::to_string_pretty(summary).context(SerializingJsonSnafu {})?;
    if out == "stdout" {
        println!("{}", pretty);
    } else {
        fs::write(Path::new(out), pretty).context(WritingSummarySnafu { path: out })?;
        info!("Summary written to {:?}", out);
    }
    Ok(())
}

pub fn run(args: &Args) -> DatasetResult<()> {
    let mut config = match &args.config {
        Some(p) => read_config(p)?,
        None => DataConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data_directory = dir.clone();
    }
    info!("config: {:?}", config);

    let datasets = if args.refresh {
        load_all_with(&config, &RefreshCache, &StandardNormalizer)?
    } else {
        load_all(&config)?
    };
    info!("Loaded {} datasets", datasets.len());
    for name in DatasetName::ALL {
        if let Some(table) = datasets.get(name) {
            info!(
                "{}: {} rows, {} columns",
                name,
                table.num_rows(),
                table.num_columns()
            );
        }
    }

    if args.verify {
        verify_artifacts(&config)?;
    }

    if let Some(out) = &args.out {
        write_summary(out, &summary_json(&config, &datasets))?;
    }
    Ok(())
}
