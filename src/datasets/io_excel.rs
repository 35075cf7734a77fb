// Reading of Excel workbooks into raw sheets.

use std::path::Path;

use calamine::{open_workbook_auto, DataType, Reader};
use snafu::prelude::*;
use tidy_sheet::{table_from_header_row, Cell, RawSheet};

use crate::datasets::io_common::path_str;
use crate::datasets::*;

/// Reads the used range of a worksheet, blank rows included. Without a name,
/// the first worksheet of the workbook is read.
pub fn read_raw_sheet(path: &Path, worksheet: Option<&str>) -> DatasetResult<RawSheet> {
    let p = path_str(path);
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path: p.clone() })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu {
                path: p.clone(),
                worksheet: name,
            })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path: p.clone() })?,
    }
    .context(OpeningExcelSnafu { path: p.clone() })?;
    debug!(
        "read_raw_sheet: {:?}: worksheet {:?}: range {:?} to {:?}",
        p,
        worksheet,
        wrange.start(),
        wrange.end()
    );

    let rows: Vec<Vec<Cell>> = wrange
        .rows()
        .map(|row| row.iter().map(to_cell).collect())
        .collect();
    Ok(RawSheet::new(rows))
}

#[allow(unreachable_patterns)]
fn to_cell(elt: &DataType) -> Cell {
    match elt {
        DataType::Empty => Cell::Empty,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Float(f) => Cell::Number(*f),
        DataType::Int(i) => Cell::Integer(*i),
        DataType::Bool(b) => Cell::Bool(*b),
        // Serial date, as stored in the workbook.
        DataType::DateTime(f) => Cell::Number(*f),
        DataType::Error(e) => {
            warn!("to_cell: cell error {:?} read as a blank cell", e);
            Cell::Empty
        }
        x => {
            warn!("to_cell: unsupported cell {:?} read as a blank cell", x);
            Cell::Empty
        }
    }
}

/// Reads a workbook whose first worksheet is already a flat table with its
/// header on the first used row.
pub fn read_flat_table(path: &Path) -> DatasetResult<Table> {
    let sheet = read_raw_sheet(path, None)?;
    table_from_header_row(&sheet, 0).context(SchemaSnafu {
        path: path_str(path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tidy_sheet::Value;

    fn write_population(path: &Path) {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Bevölkerung").unwrap();
        worksheet.write_string(0, 0, "Canton").unwrap();
        worksheet.write_string(0, 1, "Population").unwrap();
        worksheet.write_string(1, 0, "ZH").unwrap();
        worksheet.write_number(1, 1, 952_304.0).unwrap();
        worksheet.write_string(3, 0, "GE").unwrap();
        worksheet.write_number(3, 1, 259_234.5).unwrap();
        workbook.save(path).unwrap();
    }

    #[test]
    fn reads_blank_rows_and_numbers() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2_Population_cantons.xlsx");
        write_population(&path);

        let sheet = read_raw_sheet(&path, Some("Bevölkerung")).unwrap();
        assert_eq!(sheet.height(), 4);
        assert_eq!(sheet.width(), 2);
        assert!(sheet.row(2).unwrap().iter().all(|c| c.is_blank()));

        let table = read_flat_table(&path).unwrap();
        assert_eq!(table.column_names(), vec!["Canton", "Population"]);
        assert_eq!(
            table.column_values("Population").unwrap(),
            vec![
                &Value::Number(952_304.0),
                &Value::Missing,
                &Value::Number(259_234.5)
            ]
        );
    }

    #[test]
    fn workbook_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2_Population_cantons.xlsx");
        write_population(&path);

        let err = read_raw_sheet(&path, Some("Tabelle1")).unwrap_err();
        assert!(matches!(err, DatasetError::MissingWorksheet { .. }));
        assert_eq!(err.kind(), ErrorKind::DataSource);

        let not_excel = dir.path().join("notes.xlsx");
        fs::write(&not_excel, "not a workbook").unwrap();
        let err = read_raw_sheet(&not_excel, None).unwrap_err();
        assert!(matches!(err, DatasetError::OpeningExcel { .. }));
    }

    #[test]
    fn cell_conversion() {
        assert_eq!(to_cell(&DataType::Float(1876.0)), Cell::Number(1876.0));
        assert_eq!(to_cell(&DataType::Int(3)), Cell::Integer(3));
        assert_eq!(
            to_cell(&DataType::String("Pocken".to_string())),
            Cell::Text("Pocken".to_string())
        );
        assert_eq!(to_cell(&DataType::Empty), Cell::Empty);
    }
}
