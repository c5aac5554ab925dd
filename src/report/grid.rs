use crate::error::{MetricsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Zero-based (row, column) position. Orders row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Parses spreadsheet notation such as `K3` (row 2, column 10).
    pub fn from_a1(a1: &str) -> Result<Self> {
        let invalid = || MetricsError::InvalidCell(a1.to_string());
        let split = a1
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = a1.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let mut col = 0usize;
        for c in letters.chars() {
            let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(invalid)?;
        }
        let row: usize = digits.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }
        Ok(Self::new(row - 1, col - 1))
    }

    pub fn to_a1(&self) -> String {
        let mut letters = Vec::new();
        let mut n = self.col + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        letters.reverse();
        format!("{}{}", letters.into_iter().collect::<String>(), self.row + 1)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Count(u64),
    Text(String),
}

impl CellValue {
    pub fn as_count(&self) -> Option<u64> {
        match self {
            CellValue::Count(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            CellValue::Count(_) => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Count(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<u64> for CellValue {
    fn from(value: u64) -> Self {
        CellValue::Count(value)
    }
}

/// Sparse grid of cells filled in by the report layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellGrid {
    cells: BTreeMap<CellRef, CellValue>,
}

impl CellGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, row: usize, col: usize, value: impl Into<CellValue>) {
        self.cells.insert(CellRef::new(row, col), value.into());
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.cells.get(&CellRef::new(row, col))
    }

    pub fn is_occupied(&self, cell: CellRef) -> bool {
        self.cells.contains_key(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (&CellRef, &CellValue)> {
        self.cells.iter()
    }

    /// Values of column `col` from `from_row` down, stopping at the first gap.
    pub fn column_run(&self, col: usize, from_row: usize) -> Vec<&CellValue> {
        (from_row..)
            .map_while(|row| self.get(row, col))
            .collect()
    }

    /// The grid as rectangular rows of display strings, empty cells blank.
    pub fn dense_rows(&self) -> Vec<Vec<String>> {
        let Some(rows) = self.cells.keys().map(|c| c.row).max() else {
            return Vec::new();
        };
        let cols = self.cells.keys().map(|c| c.col).max().unwrap_or(0);
        let mut dense = vec![vec![String::new(); cols + 1]; rows + 1];
        for (cell, value) in &self.cells {
            dense[cell.row][cell.col] = value.to_string();
        }
        dense
    }
}
