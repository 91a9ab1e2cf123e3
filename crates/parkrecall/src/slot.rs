//! Parking slot codes and the slot grid.
//!
//! A slot code is a row letter followed by a column number, e.g. `B3`.
//! The lot is laid out as a fixed grid of rows × columns.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default grid rows.
pub const DEFAULT_ROWS: &str = "ABCD";

/// Default number of columns per row.
pub const DEFAULT_COLUMNS: u8 = 6;

fn slot_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Z])([0-9]{1,2})$").expect("valid slot pattern"))
}

/// A parsed slot code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Row letter (uppercase).
    pub row: char,
    /// Column number, starting at 1.
    pub column: u8,
}

impl Slot {
    /// Parse a slot code such as `"B3"`.
    ///
    /// Leading/trailing whitespace is ignored and the row letter is
    /// case-insensitive. Returns `None` if the code is not a single letter
    /// followed by a one- or two-digit column.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim().to_uppercase();
        let caps = slot_pattern().captures(&code)?;
        let row = caps.get(1)?.as_str().chars().next()?;
        let column = caps.get(2)?.as_str().parse().ok()?;
        Some(Self { row, column })
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.column)
    }
}

/// The layout of the parking lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGrid {
    /// Row letters, in display order.
    pub rows: Vec<char>,
    /// Number of columns per row.
    pub columns: u8,
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLUMNS)
    }
}

impl SlotGrid {
    /// Create a grid from a string of row letters and a column count.
    #[must_use]
    pub fn new(rows: &str, columns: u8) -> Self {
        Self {
            rows: rows.chars().map(|c| c.to_ascii_uppercase()).collect(),
            columns,
        }
    }

    /// Check whether the slot code lies on this grid.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        Slot::parse(code)
            .is_some_and(|slot| self.rows.contains(&slot.row) && (1..=self.columns).contains(&slot.column))
    }

    /// All slots on the grid in row-major order.
    #[must_use]
    pub fn slots(&self) -> Vec<Slot> {
        self.rows
            .iter()
            .flat_map(|&row| (1..=self.columns).map(move |column| Slot { row, column }))
            .collect()
    }

    /// Total number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len() * usize::from(self.columns)
    }

    /// Check whether the grid has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
