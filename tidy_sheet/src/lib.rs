/*!
Flattening of spreadsheets with stacked, merged-cell headers into tidy tables.

Statistical offices often publish tables whose header spans several rows: a group
label is written once above all the columns it covers, with a subgroup row and a
metric row below it. This crate turns such a sheet into a [`Table`] with one unique
name per column and typed values.

```
use tidy_sheet::builder::SheetBuilder;
use tidy_sheet::{normalize_hierarchical, HierarchicalLayout};

let sheet = SheetBuilder::new()
    .texts(&["Infectious", "", "Respiratory"])
    .texts(&["Total", "Measles", "Total"])
    .row(|r| r.number(1900.0).number(12.0).number(4.0))
    .build();

let layout = HierarchicalLayout {
    first_header_row: 0,
    last_header_row: 1,
    first_data_row: 2,
    delimiter: " | ".to_string(),
};
let table = normalize_hierarchical(&sheet, &layout)?;
assert_eq!(
    table.column_names(),
    vec!["Infectious | Total", "Infectious | Measles", "Respiratory | Total"]
);
# Ok::<(), tidy_sheet::NormalizeError>(())
```
*/

pub mod builder;
mod config;
pub mod manual;

use log::{debug, info};
use std::collections::{HashMap, HashSet};

pub use crate::config::*;

/// Forward-fills one header row: every blank cell takes the nearest
/// non-blank label to its left. Leading blanks stay blank.
pub fn forward_fill(row: &[Cell]) -> Vec<Option<String>> {
    let mut last: Option<String> = None;
    row.iter()
        .map(|cell| {
            if let Some(label) = cell.label() {
                last = Some(label);
            }
            last.clone()
        })
        .collect()
}

/// Assigns unique names: the first occurrence of a name is kept as is, the
/// following ones get `_2`, `_3`, ... Empty names become `Unnamed_<index>`.
///
/// A suffix is skipped when the resulting name is already taken, including by a
/// later column that carries it literally.
fn unique_names(raw: Vec<Option<String>>) -> Vec<String> {
    let names: Vec<String> = raw
        .into_iter()
        .enumerate()
        .map(|(idx, name)| match name {
            Some(n) if !n.is_empty() => n,
            _ => format!("Unnamed_{}", idx),
        })
        .collect();
    let mut taken: HashSet<String> = names.iter().cloned().collect();
    let mut seen: HashMap<String, usize> = HashMap::new();
    names
        .into_iter()
        .map(|name| {
            let count = seen.entry(name.clone()).or_insert(0);
            if *count == 0 {
                *count = 1;
                return name;
            }
            let mut suffix = *count + 1;
            loop {
                let candidate = format!("{}_{}", name, suffix);
                if taken.insert(candidate.clone()) {
                    *count = suffix;
                    return candidate;
                }
                suffix += 1;
            }
        })
        .collect()
}

/// The names given by a single header row.
///
/// Blank cells become `Unnamed_<column index>`, other cells their trimmed text.
/// Repeated names get a numeric suffix starting at `_2`.
pub fn disambiguate_headers(row: &[Cell]) -> Vec<String> {
    unique_names(row.iter().map(|c| c.label()).collect())
}

/// The composite names of a block of stacked header rows.
///
/// Each header row is forward-filled, then the labels of a column are joined
/// from top to bottom with the layout's delimiter. Rows still blank after the
/// fill do not contribute to the name.
pub fn composite_headers(
    sheet: &RawSheet,
    layout: &HierarchicalLayout,
) -> Result<Vec<String>, NormalizeError> {
    if layout.first_header_row > layout.last_header_row {
        return Err(NormalizeError::InvalidHeaderRange {
            first: layout.first_header_row,
            last: layout.last_header_row,
        });
    }
    let mut filled: Vec<Vec<Option<String>>> = Vec::new();
    for idx in layout.first_header_row..=layout.last_header_row {
        let row = sheet
            .row(idx)
            .ok_or(NormalizeError::HeaderRowOutOfBounds {
                row: idx,
                height: sheet.height(),
            })?;
        filled.push(forward_fill(row));
    }

    let raw: Vec<Option<String>> = (0..sheet.width())
        .map(|col| {
            let parts: Vec<&str> = filled
                .iter()
                .filter_map(|row| row[col].as_deref())
                .collect();
            Some(parts.join(&layout.delimiter))
        })
        .collect();
    Ok(unique_names(raw))
}

/// Flattens a sheet with stacked header rows.
///
/// The rows between the header block and `first_data_row` are dropped. The data
/// cells are kept as they are, the column types are inferred.
pub fn normalize_hierarchical(
    sheet: &RawSheet,
    layout: &HierarchicalLayout,
) -> Result<Table, NormalizeError> {
    let names = composite_headers(sheet, layout)?;
    debug!("normalize_hierarchical: headers: {:?}", names);

    let rows: Vec<Vec<Value>> = sheet
        .rows()
        .skip(layout.first_data_row)
        .map(|row| row.iter().map(Value::from_cell).collect())
        .collect();
    info!(
        "normalize_hierarchical: {} columns, {} data rows",
        names.len(),
        rows.len()
    );
    Table::new(names, rows)
}

/// Extracts the leading columns of a sheet with a single header row.
///
/// The first column is the period. Rows where it is not a number (notes,
/// footers) are dropped and the remaining periods become integers. The leading
/// columns are then renamed by position with `layout.column_names`; the text of
/// the header row does not influence the result.
pub fn normalize_flat(sheet: &RawSheet, layout: &FlatLayout) -> Result<Table, NormalizeError> {
    let header = sheet
        .row(layout.header_row)
        .ok_or(NormalizeError::HeaderRowOutOfBounds {
            row: layout.header_row,
            height: sheet.height(),
        })?;
    if sheet.width() == 0 || layout.column_names.is_empty() {
        return Err(NormalizeError::MissingPeriodColumn);
    }
    let num_cols = layout.column_names.len();
    if sheet.width() < num_cols {
        return Err(NormalizeError::TooFewColumns {
            expected: num_cols,
            found: sheet.width(),
        });
    }
    debug!(
        "normalize_flat: header names: {:?}",
        disambiguate_headers(header)
    );

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (idx, row) in sheet.rows().enumerate().skip(layout.first_data_row) {
        let period = match row[0].as_year() {
            Some(p) => p,
            None => {
                debug!("normalize_flat: skipping row {}: {:?}", idx, row[0]);
                continue;
            }
        };
        let mut values = vec![Value::Integer(period)];
        values.extend(row[1..num_cols].iter().map(Value::from_cell));
        rows.push(values);
    }
    info!(
        "normalize_flat: {} rows with a period, {} columns",
        rows.len(),
        num_cols
    );
    Table::new(layout.column_names.clone(), rows)
}

/// Reads a sheet that already has one flat header row: the names come from
/// `header_row`, every following row is data.
pub fn table_from_header_row(sheet: &RawSheet, header_row: usize) -> Result<Table, NormalizeError> {
    let header = sheet
        .row(header_row)
        .ok_or(NormalizeError::HeaderRowOutOfBounds {
            row: header_row,
            height: sheet.height(),
        })?;
    let names = disambiguate_headers(header);
    let rows: Vec<Vec<Value>> = sheet
        .rows()
        .skip(header_row + 1)
        .map(|row| row.iter().map(Value::from_cell).collect())
        .collect();
    Table::new(names, rows)
}

/// The two flattening procedures, behind a trait so that callers can count or
/// replace them.
pub trait Normalizer {
    fn hierarchical(
        &self,
        sheet: &RawSheet,
        layout: &HierarchicalLayout,
    ) -> Result<Table, NormalizeError>;

    fn flat(&self, sheet: &RawSheet, layout: &FlatLayout) -> Result<Table, NormalizeError>;
}

/// Delegates to [`normalize_hierarchical`] and [`normalize_flat`].
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct StandardNormalizer;

impl Normalizer for StandardNormalizer {
    fn hierarchical(
        &self,
        sheet: &RawSheet,
        layout: &HierarchicalLayout,
    ) -> Result<Table, NormalizeError> {
        normalize_hierarchical(sheet, layout)
    }

    fn flat(&self, sheet: &RawSheet, layout: &FlatLayout) -> Result<Table, NormalizeError> {
        normalize_flat(sheet, layout)
    }
}
