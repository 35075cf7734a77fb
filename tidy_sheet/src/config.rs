// ********* Input data structures ***********

use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;

/// The content of one spreadsheet cell, as read from a workbook.
///
/// Readers map their own cell representation onto this type. Formatting,
/// formulas and styles are not kept.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Integer(i64),
    Bool(bool),
}

impl Cell {
    /// True for empty cells and for text made only of whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// The trimmed textual form of a non-blank cell, as it would appear in a header.
    pub fn label(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.trim().is_empty() => None,
            Cell::Text(s) => Some(s.trim().to_string()),
            Cell::Number(f) => Some(render_number(*f)),
            Cell::Integer(i) => Some(i.to_string()),
            Cell::Bool(b) => Some(b.to_string()),
        }
    }

    /// Reads the cell as a year (or any integer period).
    ///
    /// Numeric text is accepted, fractional values are truncated.
    pub fn as_year(&self) -> Option<i64> {
        match self {
            Cell::Integer(i) => Some(*i),
            Cell::Number(f) if f.is_finite() => Some(f.trunc() as i64),
            Cell::Text(s) => {
                let s = s.trim();
                match s.parse::<i64>() {
                    Ok(i) => Some(i),
                    Err(_) => s
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64),
                }
            }
            _ => None,
        }
    }
}

/// A rectangular grid of untyped cells.
///
/// Ragged input rows are padded with [`Cell::Empty`] up to the widest row.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RawSheet {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl RawSheet {
    pub fn new(rows: Vec<Vec<Cell>>) -> RawSheet {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, Cell::Empty);
                r
            })
            .collect();
        RawSheet { rows, width }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row(&self, idx: usize) -> Option<&[Cell]> {
        self.rows.get(idx).map(|r| r.as_slice())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(|r| r.as_slice())
    }
}

// ******** Output data structures *********

/// The semantic type of a column in a [`Table`].
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ColumnType {
    Integer,
    Number,
    Text,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Number => "number",
            ColumnType::Text => "text",
        }
    }
}

/// A typed value in a [`Table`].
#[derive(PartialEq, Debug, Clone)]
pub enum Value {
    Missing,
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Value {
    /// Converts a spreadsheet cell. Blank cells are missing values.
    ///
    /// Workbooks store every number as a float: integral numbers are read as integers.
    pub fn from_cell(cell: &Cell) -> Value {
        match cell {
            c if c.is_blank() => Value::Missing,
            Cell::Integer(i) => Value::Integer(*i),
            Cell::Number(f) if is_integral(*f) => Value::Integer(*f as i64),
            Cell::Number(f) => Value::Number(*f),
            Cell::Text(s) => Value::Text(s.clone()),
            Cell::Bool(b) => Value::Text(b.to_string()),
            Cell::Empty => Value::Missing,
        }
    }

    /// Parses a field of a flat file (CSV).
    pub fn parse(field: &str) -> Value {
        if field.is_empty() || field == "NaN" {
            return Value::Missing;
        }
        if let Ok(i) = field.parse::<i64>() {
            return Value::Integer(i);
        }
        match field.parse::<f64>() {
            Ok(f) if f.is_finite() => Value::Number(f),
            _ => Value::Text(field.to_string()),
        }
    }

    /// The textual form written to flat files. Missing values are empty.
    pub fn render(&self) -> String {
        match self {
            Value::Missing => "".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Number(f) => render_number(*f),
            Value::Text(s) => s.clone(),
        }
    }

    /// True for [`Value::Missing`], the empty cells of a sheet and empty CSV fields.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    fn coerce(self, kind: ColumnType) -> Value {
        match (kind, self) {
            (_, Value::Missing) => Value::Missing,
            (ColumnType::Number, Value::Integer(i)) => Value::Number(i as f64),
            (ColumnType::Text, v @ Value::Integer(_)) | (ColumnType::Text, v @ Value::Number(_)) => {
                Value::Text(v.render())
            }
            (_, v) => v,
        }
    }
}

// Integral numbers are written without a fractional part so that a year read as a
// float from a workbook comes out as "1876".
fn render_number(f: f64) -> String {
    if is_integral(f) {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
}

/// A tidy table: unique column names, one type per column, rows of equal width.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Builds a table, inferring the type of each column from its values.
    ///
    /// All present values integral gives [`ColumnType::Integer`], all numeric gives
    /// [`ColumnType::Number`], anything else [`ColumnType::Text`]. A column without any
    /// present value is numeric. Values are coerced to the type of their column.
    pub fn new(names: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Table, NormalizeError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for name in names.iter() {
            if !seen.insert(name.as_str()) {
                return Err(NormalizeError::DuplicateColumn { name: name.clone() });
            }
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != names.len() {
                return Err(NormalizeError::RaggedRow {
                    row: idx,
                    expected: names.len(),
                    found: row.len(),
                });
            }
        }

        let kinds: Vec<ColumnType> = (0..names.len())
            .map(|col| infer_kind(rows.iter().map(|r| &r[col])))
            .collect();

        let rows: Vec<Vec<Value>> = rows
            .into_iter()
            .map(|r| {
                r.into_iter()
                    .zip(kinds.iter())
                    .map(|(v, k)| v.coerce(*k))
                    .collect()
            })
            .collect();

        let columns = names
            .into_iter()
            .zip(kinds)
            .map(|(name, kind)| Column { name, kind })
            .collect();

        Ok(Table { columns, rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// All the values of one column, in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

fn infer_kind<'a>(values: impl Iterator<Item = &'a Value>) -> ColumnType {
    let mut kind: Option<ColumnType> = None;
    for v in values {
        match v {
            Value::Missing => {}
            Value::Integer(_) => {
                kind.get_or_insert(ColumnType::Integer);
            }
            Value::Number(_) => kind = Some(ColumnType::Number),
            Value::Text(_) => return ColumnType::Text,
        }
    }
    kind.unwrap_or(ColumnType::Number)
}

/// Errors when a sheet does not have the expected shape.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum NormalizeError {
    HeaderRowOutOfBounds { row: usize, height: usize },
    InvalidHeaderRange { first: usize, last: usize },
    MissingPeriodColumn,
    TooFewColumns { expected: usize, found: usize },
    DuplicateColumn { name: String },
    RaggedRow { row: usize, expected: usize, found: usize },
}

impl Error for NormalizeError {}

impl Display for NormalizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeError::HeaderRowOutOfBounds { row, height } => write!(
                f,
                "header row {} is outside of the sheet ({} rows)",
                row, height
            ),
            NormalizeError::InvalidHeaderRange { first, last } => {
                write!(f, "invalid header rows {}..={}", first, last)
            }
            NormalizeError::MissingPeriodColumn => {
                write!(f, "the sheet has no period column in first position")
            }
            NormalizeError::TooFewColumns { expected, found } => write!(
                f,
                "expected at least {} columns, found {}",
                expected, found
            ),
            NormalizeError::DuplicateColumn { name } => write!(f, "duplicate column {:?}", name),
            NormalizeError::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {} has {} values, expected {}",
                row, found, expected
            ),
        }
    }
}

// ********* Configuration **********

/// Column names of the infectious disease extract of the causes of death statistics.
pub const INFECTIOUS_DISEASE_COLUMNS: [&str; 8] = [
    "Year",
    "Total",
    "Smallpox",
    "Scarlet_Fever",
    "Measles",
    "Typhoid_Paratyphoid",
    "Diphtheria",
    "Whooping_Cough",
];

/// Where the header block and the data sit in a sheet with stacked header rows.
///
/// All indices are 0-based rows of the sheet. The header range is inclusive.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct HierarchicalLayout {
    pub first_header_row: usize,
    pub last_header_row: usize,
    pub first_data_row: usize,
    pub delimiter: String,
}

impl HierarchicalLayout {
    pub const DEFAULT_DELIMITER: &'static str = " | ";

    /// The three header rows of the causes of death workbook.
    pub fn causes_of_death() -> HierarchicalLayout {
        HierarchicalLayout {
            first_header_row: 4,
            last_header_row: 6,
            first_data_row: 10,
            delimiter: HierarchicalLayout::DEFAULT_DELIMITER.to_string(),
        }
    }
}

/// A sheet with a single header row, of which the leading columns are kept
/// under fixed names. The first column is the period (year).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FlatLayout {
    pub header_row: usize,
    pub first_data_row: usize,
    pub column_names: Vec<String>,
}

impl FlatLayout {
    pub fn infectious_diseases() -> FlatLayout {
        FlatLayout {
            header_row: 6,
            first_data_row: 8,
            column_names: INFECTIOUS_DISEASE_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
