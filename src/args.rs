use clap::Parser;

/// Loads the datasets on the history of pandemics in Switzerland, and builds the
/// cleaned tables derived from the causes of death statistics.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file with the location of the data and the layout of the
    /// causes of death workbook. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (directory) The directory containing the raw data files. Setting this option overrides
    /// the directory that may be specified with the --config option. Defaults to 'Data'.
    #[clap(short, long, value_parser)]
    pub data_dir: Option<String>,

    /// (file path or 'stdout') If specified, a summary of the loaded datasets (rows,
    /// columns and column types) will be written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// If passed as an argument, the derived CSV files are rebuilt even if they already exist.
    #[clap(long, takes_value = false)]
    pub refresh: bool,

    /// If passed as an argument, the derived CSV files are rebuilt in memory and compared with
    /// the files on disk. Any difference is reported as an error.
    #[clap(long, takes_value = false)]
    pub verify: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
