//! Table model handed over by the spreadsheet loader.
//!
//! The loader lives outside this crate. It produces an ordered mapping from
//! sheet (branch) name to a rectangular grid of scalar cells. This module
//! models that mapping and the cell coercion rules the tree builder relies on:
//! every cell can be turned into a trimmed string, so ingestion never fails on
//! an unexpected cell type.

use std::fmt;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tokens that never name a person, compared case-insensitively after trimming.
pub const SENTINEL_TOKENS: [&str; 4] = ["nan", "none", "note", ""];

/// Check whether trimmed cell text is one of the built-in sentinel tokens.
pub fn is_sentinel(text: &str) -> bool {
    let text = text.trim();
    SENTINEL_TOKENS
        .iter()
        .any(|token| text.eq_ignore_ascii_case(token))
}

/// A single scalar cell.
///
/// Deserialises untagged from JS values: `null`/`undefined` become
/// [`Cell::Blank`], strings, numbers and booleans map to their variants.
/// A NaN number is the loader's "not a value" marker and behaves like a blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Empty or missing cell.
    Blank,
    /// Text cell.
    Text(String),
    /// Numeric cell.
    Number(f64),
    /// Boolean cell.
    Flag(bool),
}

impl Cell {
    /// Coerce the cell to trimmed text.
    ///
    /// Blanks and NaN yield an empty string. Numbers use Rust's shortest
    /// round-trip formatting, so `1990.0` becomes `"1990"`.
    pub fn coerce(&self) -> String {
        match self {
            Cell::Blank => String::new(),
            Cell::Text(text) => text.trim().to_string(),
            Cell::Number(n) if n.is_nan() => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Flag(b) => b.to_string(),
        }
    }

    /// The person name this cell carries, if any.
    pub fn name(&self) -> Option<String> {
        let text = self.coerce();
        if is_sentinel(&text) { None } else { Some(text) }
    }

    /// Whether the cell carries no value at all.
    pub fn is_blank(&self) -> bool {
        self.coerce().is_empty()
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::Text(text)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<Option<&str>> for Cell {
    fn from(text: Option<&str>) -> Self {
        text.map(Cell::from).unwrap_or(Cell::Blank)
    }
}

/// A grid of cells. Rows may be ragged; missing trailing cells read as blanks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create a table from rows.
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a table from string rows (handy in tests and demos).
    pub fn from_strings<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<Cell>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// All rows in loader order.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cells of column `column`, top to bottom, starting at row `skip`.
    /// Rows shorter than the column yield [`Cell::Blank`].
    pub fn column(&self, column: usize, skip: usize) -> impl Iterator<Item = &Cell> + '_ {
        const BLANK: &Cell = &Cell::Blank;
        self.rows
            .iter()
            .skip(skip)
            .map(move |row| row.get(column).unwrap_or(BLANK))
    }

    /// Whether every cell in the table is blank.
    pub fn is_blank(&self) -> bool {
        self.rows.iter().flatten().all(Cell::is_blank)
    }
}

/// Ordered mapping from branch label to its table.
///
/// Order is the loader's sheet order and is preserved through every stage.
/// Deserialises from either a JS object (`{ "Alice": [[...]], ... }`, key
/// order kept) or an array of `[name, rows]` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSet {
    sheets: Vec<(String, Table)>,
}

impl TableSet {
    /// Create an empty table set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet. Later sheets come after earlier ones.
    pub fn push(&mut self, name: impl Into<String>, table: Table) {
        self.sheets.push((name.into(), table));
    }

    /// Builder-style [`TableSet::push`].
    pub fn with_sheet(mut self, name: impl Into<String>, table: Table) -> Self {
        self.push(name, table);
        self
    }

    /// Iterate sheets in loader order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.sheets.iter().map(|(name, table)| (name.as_str(), table))
    }

    /// The first sheet, if any.
    pub fn first(&self) -> Option<(&str, &Table)> {
        self.iter().next()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl FromIterator<(String, Table)> for TableSet {
    fn from_iter<I: IntoIterator<Item = (String, Table)>>(iter: I) -> Self {
        Self {
            sheets: iter.into_iter().collect(),
        }
    }
}

impl Serialize for TableSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sheets.len()))?;
        for (name, table) in &self.sheets {
            map.serialize_entry(name, table)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TableSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableSetVisitor;

        impl<'de> Visitor<'de> for TableSetVisitor {
            type Value = TableSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of sheet name to rows, or a list of [name, rows] pairs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<TableSet, A::Error> {
                let mut sheets = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, table)) = access.next_entry::<String, Table>()? {
                    sheets.push((name, table));
                }
                Ok(TableSet { sheets })
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<TableSet, A::Error> {
                let mut sheets = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(pair) = access.next_element::<(String, Table)>()? {
                    sheets.push(pair);
                }
                Ok(TableSet { sheets })
            }
        }

        deserializer.deserialize_any(TableSetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_case_insensitive() {
        for token in ["nan", "NaN", " None ", "NOTE", "", "   "] {
            assert!(is_sentinel(token), "{token:?} should be a sentinel");
        }
        assert!(!is_sentinel("Nancy"));
        assert!(!is_sentinel("Notes from Aunt May"));
    }

    #[test]
    fn test_cell_coercion() {
        assert_eq!(Cell::from("  Bob ").coerce(), "Bob");
        assert_eq!(Cell::Number(1990.0).coerce(), "1990");
        assert_eq!(Cell::Number(2.5).coerce(), "2.5");
        assert_eq!(Cell::Number(f64::NAN).coerce(), "");
        assert_eq!(Cell::Flag(true).coerce(), "true");
        assert_eq!(Cell::Blank.coerce(), "");
    }

    #[test]
    fn test_cell_name() {
        assert_eq!(Cell::from(" Carol").name(), Some("Carol".to_string()));
        assert_eq!(Cell::from("nan").name(), None);
        assert_eq!(Cell::Blank.name(), None);
        assert_eq!(Cell::Number(f64::NAN).name(), None);
        assert_eq!(Cell::Number(7.0).name(), Some("7".to_string()));
    }

    #[test]
    fn test_ragged_column_reads_blank() {
        let table = Table::from_strings(vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(table.column_count(), 2);

        let second: Vec<&Cell> = table.column(1, 0).collect();
        assert_eq!(second, vec![&Cell::from("b"), &Cell::Blank]);

        let skipped: Vec<&Cell> = table.column(0, 1).collect();
        assert_eq!(skipped, vec![&Cell::from("c")]);
    }

    #[test]
    fn test_blank_table() {
        let table = Table::new(vec![vec![Cell::Blank, Cell::from("  ")], vec![]]);
        assert!(table.is_blank());
        assert!(Table::default().is_blank());
    }

    #[test]
    fn test_table_set_keeps_order() {
        let set = TableSet::new()
            .with_sheet("Zed", Table::default())
            .with_sheet("Amy", Table::default());
        let names: Vec<&str> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Zed", "Amy"]);
        assert_eq!(set.first().map(|(name, _)| name), Some("Zed"));
        assert_eq!(set.len(), 2);
    }
}
