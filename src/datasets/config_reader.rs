use crate::datasets::*;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::path::PathBuf;
use tidy_sheet::{FlatLayout, HierarchicalLayout};

pub const DEFAULT_DATA_DIRECTORY: &str = "Data";
pub const DEFAULT_WORKSHEET: &str = "Tabelle1";

fn default_data_directory() -> String {
    DEFAULT_DATA_DIRECTORY.to_string()
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(rename = "dataDirectory", default = "default_data_directory")]
    pub data_directory: String,
    #[serde(rename = "causesOfDeath", default)]
    pub causes_of_death: CausesOfDeathSettings,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            data_directory: default_data_directory(),
            causes_of_death: CausesOfDeathSettings::default(),
        }
    }
}

impl DataConfig {
    /// The canonical location of a dataset.
    pub fn path(&self, name: DatasetName) -> PathBuf {
        [self.data_directory.as_str(), name.file_name()].iter().collect()
    }
}

/// Layout of the causes of death workbook. Rows are 0-based, counted from the
/// first used row of the worksheet.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct CausesOfDeathSettings {
    /// The worksheet holding the infectious disease columns.
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
    #[serde(rename = "headerDelimiter")]
    pub header_delimiter: Option<String>,
    #[serde(rename = "firstHeaderRow")]
    pub first_header_row: Option<usize>,
    #[serde(rename = "lastHeaderRow")]
    pub last_header_row: Option<usize>,
    #[serde(rename = "firstDataRow")]
    pub first_data_row: Option<usize>,
    #[serde(rename = "infectiousHeaderRow")]
    pub infectious_header_row: Option<usize>,
    #[serde(rename = "infectiousFirstDataRow")]
    pub infectious_first_data_row: Option<usize>,
}

impl CausesOfDeathSettings {
    pub fn worksheet_name(&self) -> String {
        self.worksheet_name
            .clone()
            .unwrap_or_else(|| DEFAULT_WORKSHEET.to_string())
    }

    pub fn hierarchical_layout(&self) -> HierarchicalLayout {
        let default = HierarchicalLayout::causes_of_death();
        HierarchicalLayout {
            first_header_row: self.first_header_row.unwrap_or(default.first_header_row),
            last_header_row: self.last_header_row.unwrap_or(default.last_header_row),
            first_data_row: self.first_data_row.unwrap_or(default.first_data_row),
            delimiter: self.header_delimiter.clone().unwrap_or(default.delimiter),
        }
    }

    pub fn flat_layout(&self) -> FlatLayout {
        let default = FlatLayout::infectious_diseases();
        FlatLayout {
            header_row: self.infectious_header_row.unwrap_or(default.header_row),
            first_data_row: self
                .infectious_first_data_row
                .unwrap_or(default.first_data_row),
            column_names: default.column_names,
        }
    }
}

pub fn read_config(path: &str) -> DatasetResult<DataConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: {:?}", contents);
    let config: DataConfig = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DataConfig::default();
        assert_eq!(
            config.path(DatasetName::CovidDaily),
            PathBuf::from("Data").join("full_data.csv")
        );
        assert_eq!(config.causes_of_death.worksheet_name(), "Tabelle1");
        assert_eq!(
            config.causes_of_death.hierarchical_layout(),
            HierarchicalLayout::causes_of_death()
        );
        assert_eq!(
            config.causes_of_death.flat_layout(),
            FlatLayout::infectious_diseases()
        );
    }

    #[test]
    fn partial_file() {
        let js = r#"{
            "causesOfDeath": {
                "headerDelimiter": " / ",
                "firstDataRow": 11,
                "infectiousHeaderRow": 5
            }
        }"#;
        let config: DataConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.data_directory, "Data");
        let h = config.causes_of_death.hierarchical_layout();
        assert_eq!(h.delimiter, " / ");
        assert_eq!(h.first_header_row, 4);
        assert_eq!(h.first_data_row, 11);
        let f = config.causes_of_death.flat_layout();
        assert_eq!(f.header_row, 5);
        assert_eq!(f.first_data_row, 8);
    }

    #[test]
    fn missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = read_config(missing.to_str().unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, "{\"dataDirectory\": 3}").unwrap();
        let err = read_config(invalid.to_str().unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let valid = dir.path().join("valid.json");
        fs::write(&valid, "{\"dataDirectory\": \"/srv/pandemics\"}").unwrap();
        let config = read_config(valid.to_str().unwrap()).unwrap();
        assert_eq!(
            config.path(DatasetName::PandemicHistory),
            PathBuf::from("/srv/pandemics/1_History_Pandemics.xlsx")
        );
    }
}
