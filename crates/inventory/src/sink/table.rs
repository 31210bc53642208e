use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use comfy_table::presets::UTF8_FULL_CONDENSED;

use crate::record::{Column, InspectionResult};
use crate::sink::ResultSink;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// A column and direction to sort a [`Table`] by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sort {
    pub column: Column,
    pub order: SortOrder,
}

impl Sort {
    pub fn ascending(column: Column) -> Self {
        Self { column, order: SortOrder::Ascending }
    }

    pub fn descending(column: Column) -> Self {
        Self { column, order: SortOrder::Descending }
    }

    fn compare(&self, a: &InspectionResult, b: &InspectionResult) -> Ordering {
        let ordering = self.column.compare(a, b);
        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// Parses `column` or `column:asc|desc`, e.g. `mime:desc`.
impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, order) = s.split_once(':').unwrap_or((s, "asc"));
        let order = match order.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => SortOrder::Ascending,
            "desc" | "descending" => SortOrder::Descending,
            other => return Err(format!("unknown sort order {other:?}, expected asc or desc")),
        };
        Ok(Self { column: column.parse()?, order })
    }
}

/// In-memory results table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<InspectionResult>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[InspectionResult] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stable sort, so rows equal in `sort.column` keep their relative order.
    pub fn sort(&mut self, sort: Sort) {
        self.rows.sort_by(|a, b| sort.compare(a, b));
    }
}

impl ResultSink for Table {
    fn push(&mut self, result: InspectionResult) {
        self.rows.push(result);
    }
}

/// Renders through `comfy-table`, header row first, one line per result.
impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut grid = comfy_table::Table::new();
        grid.load_preset(UTF8_FULL_CONDENSED);
        grid.set_header(Column::ALL.iter().map(Column::header).collect::<Vec<_>>());
        for row in &self.rows {
            grid.add_row(Column::ALL.iter().map(|column| column.cell(row)).collect::<Vec<_>>());
        }
        writeln!(f, "{grid}")
    }
}
