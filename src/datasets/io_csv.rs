// Primitives for reading and writing CSV files.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use snafu::prelude::*;
use tidy_sheet::{disambiguate_headers, Cell, Value};

use crate::datasets::io_common::{path_str, tmp_path};
use crate::datasets::*;

/// The bytes of `table` as a CSV file: one header line, then one line per row.
/// `path` is only used to report errors.
pub fn render_csv(table: &Table, path: &Path) -> DatasetResult<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(table.column_names())
        .context(RenderingCsvSnafu {
            path: path_str(path),
        })?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(|v| v.render()))
            .context(RenderingCsvSnafu {
                path: path_str(path),
            })?;
    }
    wtr.into_inner()
        .map_err(|e| e.into_error())
        .context(WritingArtifactSnafu {
            path: path_str(path),
        })
}

/// Writes `table` to `path`. The content goes to a temporary file first, which
/// is then renamed over `path`: a reader never sees a partial file.
pub fn write_table_csv(path: &Path, table: &Table) -> DatasetResult<()> {
    let bytes = render_csv(table, path)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).context(WritingArtifactSnafu {
            path: path_str(dir),
        })?;
    }

    let tmp = tmp_path(path);
    let res = write_then_rename(&tmp, path, &bytes);
    if res.is_err() {
        _ = fs::remove_file(&tmp);
    }
    res.context(WritingArtifactSnafu {
        path: path_str(path),
    })?;
    info!(
        "Wrote {} rows and {} columns to {:?}",
        table.num_rows(),
        table.num_columns(),
        path_str(path)
    );
    Ok(())
}

fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(tmp, path)
}

/// Reads a CSV file with a header line. Empty fields and `NaN` are missing values.
pub fn read_table_csv(path: &Path) -> DatasetResult<Table> {
    let p = path_str(path);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path: p.clone() })?;

    let header: Vec<Cell> = rdr
        .headers()
        .context(ParsingCsvSnafu {
            path: p.clone(),
            lineno: 1u64,
        })?
        .iter()
        .map(|h| Cell::Text(h.to_string()))
        .collect();
    let names = disambiguate_headers(&header);
    debug!("read_table_csv: {:?}: header: {:?}", p, names);

    let mut records: Vec<csv::StringRecord> = Vec::new();
    for (idx, record_r) in rdr.records().enumerate() {
        // The header is on the first line.
        let lineno = idx as u64 + 2;
        let record = record_r.context(ParsingCsvSnafu {
            path: p.clone(),
            lineno,
        })?;
        records.push(record);
    }

    // Fields of a text column are kept verbatim: "007" stays "007".
    let text_columns: Vec<bool> = (0..names.len())
        .map(|col| {
            records
                .iter()
                .any(|r| matches!(r.get(col).map(Value::parse), Some(Value::Text(_))))
        })
        .collect();
    debug!("read_table_csv: {:?}: text columns: {:?}", p, text_columns);

    let rows: Vec<Vec<Value>> = records
        .iter()
        .map(|record| {
            record
                .iter()
                .zip(text_columns.iter())
                .map(|(field, is_text)| match Value::parse(field) {
                    v if *is_text && !v.is_missing() => Value::Text(field.to_string()),
                    v => v,
                })
                .collect()
        })
        .collect();
    Table::new(names, rows).context(SchemaSnafu { path: p })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidy_sheet::builder::SheetBuilder;
    use tidy_sheet::{normalize_hierarchical, ColumnType, HierarchicalLayout};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn normalized_table_survives_the_csv_file() {
        init();
        let sheet = SheetBuilder::new()
            .texts(&["Code", "Year", "Infectious", ""])
            .texts(&["", "", "Measles", "Typhus"])
            .texts(&["", "", "Total", "Total"])
            .row(|r| r.text("007").number(1900.0).number(12.0).blank())
            .row(|r| r.text("1.50").number(1901.0).number(9.5).number(3.0))
            .row(|r| r.text("see note").number(1902.0).number(4.0).number(1.0))
            .build();
        let layout = HierarchicalLayout {
            first_header_row: 0,
            last_header_row: 2,
            first_data_row: 3,
            delimiter: " | ".to_string(),
        };
        let table = normalize_hierarchical(&sheet, &layout).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("derived").join("cleaned.csv");
        write_table_csv(&path, &table).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Code,Year,Infectious | Measles | Total,Infectious | Typhus | Total\n\
             007,1900,12,\n\
             1.50,1901,9.5,3\n\
             see note,1902,4,1\n"
        );

        let reloaded = read_table_csv(&path).unwrap();
        assert_eq!(reloaded, table);
        assert_eq!(reloaded.num_rows(), 3);
        assert_eq!(reloaded.columns()[0].kind, ColumnType::Text);
        assert_eq!(reloaded.columns()[2].kind, ColumnType::Number);
        assert_eq!(
            reloaded.column_values("Code").unwrap(),
            vec![
                &Value::Text("007".to_string()),
                &Value::Text("1.50".to_string()),
                &Value::Text("see note".to_string())
            ]
        );
    }

    #[test]
    fn write_replaces_existing_files_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaned.csv");
        fs::write(&path, "stale\n").unwrap();

        let table = Table::new(
            vec!["Year".to_string()],
            vec![vec![Value::Integer(1918)]],
        )
        .unwrap();
        write_table_csv(&path, &table).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Year\n1918\n");
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["cleaned.csv".to_string()]);
    }

    #[test]
    fn rendering_is_stable() {
        let table = Table::new(
            vec!["location".to_string(), "new_cases".to_string()],
            vec![
                vec![Value::Text("Switzerland, FL".to_string()), Value::Integer(3)],
                vec![Value::Text("Liechtenstein".to_string()), Value::Missing],
            ],
        )
        .unwrap();
        let path = Path::new("memory.csv");
        let first = render_csv(&table, path).unwrap();
        assert_eq!(first, render_csv(&table, path).unwrap());
        assert_eq!(
            String::from_utf8(first).unwrap(),
            "location,new_cases\n\"Switzerland, FL\",3\nLiechtenstein,\n"
        );
    }

    #[test]
    fn reading_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_table_csv(&dir.path().join("full_data.csv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataSource);

        let path = dir.path().join("ragged.csv");
        fs::write(&path, "date,new_cases\n2020-03-01,10\n2020-03-02\n").unwrap();
        let err = read_table_csv(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataSource);
        assert!(err.to_string().contains("line 3"));

        let path = dir.path().join("nan.csv");
        fs::write(&path, "date,new_cases,,new_cases\n2020-03-01,NaN,1,2\n").unwrap();
        let table = read_table_csv(&path).unwrap();
        assert_eq!(
            table.column_names(),
            vec!["date", "new_cases", "Unnamed_2", "new_cases_2"]
        );
        assert_eq!(table.rows()[0][1], Value::Missing);
    }
}
