pub use crate::config::*;

/// A builder for assembling a [`RawSheet`] row by row.
///
/// Readers of real workbooks construct a [`RawSheet`] directly. The builder is
/// meant for small, hand-written sheets.
///
/// ```
/// use tidy_sheet::builder::SheetBuilder;
/// use tidy_sheet::Cell;
///
/// let sheet = SheetBuilder::new()
///     .texts(&["Year", "", "Deaths"])
///     .row(|r| r.integer(1918).blank().number(24_449.0))
///     .build();
///
/// assert_eq!(sheet.height(), 2);
/// assert_eq!(sheet.row(0).unwrap()[1], Cell::Empty);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SheetBuilder {
    rows: Vec<Vec<Cell>>,
}

impl SheetBuilder {
    pub fn new() -> SheetBuilder {
        SheetBuilder { rows: Vec::new() }
    }

    /// Adds a row of text cells. Empty strings are blank cells.
    pub fn texts(mut self, cells: &[&str]) -> SheetBuilder {
        self.rows.push(
            cells
                .iter()
                .map(|s| {
                    if s.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(s.to_string())
                    }
                })
                .collect(),
        );
        self
    }

    /// Adds a row built cell by cell.
    pub fn row<F>(mut self, f: F) -> SheetBuilder
    where
        F: FnOnce(RowBuilder) -> RowBuilder,
    {
        self.rows.push(f(RowBuilder::default()).cells);
        self
    }

    pub fn build(self) -> RawSheet {
        RawSheet::new(self.rows)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RowBuilder {
    cells: Vec<Cell>,
}

impl RowBuilder {
    pub fn text(mut self, s: &str) -> RowBuilder {
        self.cells.push(Cell::Text(s.to_string()));
        self
    }

    pub fn number(mut self, f: f64) -> RowBuilder {
        self.cells.push(Cell::Number(f));
        self
    }

    pub fn integer(mut self, i: i64) -> RowBuilder {
        self.cells.push(Cell::Integer(i));
        self
    }

    pub fn blank(mut self) -> RowBuilder {
        self.cells.push(Cell::Empty);
        self
    }
}
