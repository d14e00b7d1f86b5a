//! Cell address and range types

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Convert column letters to a 1-based column number (A = 1, Z = 26, AA = 27, etc.)
///
/// Letters are case-insensitive.
///
/// # Examples
/// ```
/// use review_sheets_core::col_to_number;
///
/// assert_eq!(col_to_number("A").unwrap(), 1);
/// assert_eq!(col_to_number("aa").unwrap(), 27);
/// ```
pub fn col_to_number(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidAddress("empty column letters".into()));
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidAddress(format!(
                "invalid column letter '{}'",
                c
            )));
        }
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| Error::ColumnOutOfBounds(letters.to_ascii_uppercase()))?;
    }

    Ok(col)
}

/// Convert a 1-based column number to letters (1 = A, 26 = Z, 27 = AA, etc.)
///
/// Bijective base-26: there is no "zero" letter. Column 0 has no letters and
/// yields an empty string.
pub fn number_to_col(n: u32) -> String {
    let mut result = String::new();
    let mut n = n;

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Expand the rectangle spanned by two corners into individual addresses.
///
/// Corners may be given in any order. Addresses come out row-major: increasing
/// row, then increasing column.
///
/// ```
/// use review_sheets_core::expand_range;
///
/// let cells: Vec<String> = expand_range("A", 1, "B", 2)
///     .unwrap()
///     .iter()
///     .map(|a| a.to_string())
///     .collect();
/// assert_eq!(cells, ["A1", "B1", "A2", "B2"]);
/// ```
pub fn expand_range(c1: &str, r1: u32, c2: &str, r2: u32) -> Result<Vec<CellAddress>> {
    let start = CellAddress::new(r1, col_to_number(c1)?)?;
    let end = CellAddress::new(r2, col_to_number(c2)?)?;
    Ok(CellRange::new(start, end).cells().collect())
}

/// A cell address (e.g., "A1", "AB12")
///
/// Row and column are both 1-based, matching the A1 notation. Addresses are
/// opaque identifiers: rows inserted at runtime get addresses that need not
/// correspond to any physical position in a table.
///
/// Ordering is row-major, which gives maps keyed by address a stable
/// iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct CellAddress {
    /// Row number (1-based)
    pub row: u32,
    /// Column number (1-based, A=1)
    pub col: u32,
}

impl CellAddress {
    /// Create a new cell address from a 1-based row and column
    pub fn new(row: u32, col: u32) -> Result<Self> {
        if row == 0 || col == 0 {
            return Err(Error::InvalidAddress(format!(
                "row and column must be >= 1 (got row {}, column {})",
                row, col
            )));
        }
        Ok(Self { row, col })
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use review_sheets_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("B12").unwrap();
    /// assert_eq!(addr.row, 12);
    /// assert_eq!(addr.col, 2);
    ///
    /// let addr = CellAddress::parse("aa3").unwrap();
    /// assert_eq!(addr.to_string(), "AA3");
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let col_end = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(s.len());

        if col_end == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = col_to_number(&s[..col_end])?;

        let row_str = &s[col_end..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }
        if !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid row number in '{}'",
                s
            )));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("row number too large in '{}'", s)))?;

        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self { row, col })
    }

    /// Column letters of this address
    pub fn column_letters(&self) -> String {
        number_to_col(self.col)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", self.column_letters(), self.row)
    }

    /// Create a range from this address to another
    pub fn to(&self, other: CellAddress) -> CellRange {
        CellRange::new(*self, other)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CellAddress {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<CellAddress> for String {
    fn from(addr: CellAddress) -> Self {
        addr.to_a1_string()
    }
}

/// A rectangular range of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        // Normalize so start is top-left and end is bottom-right
        Self {
            start: CellAddress {
                row: start.row.min(end.row),
                col: start.col.min(end.col),
            },
            end: CellAddress {
                row: start.row.max(end.row),
                col: start.col.max(end.col),
            },
        }
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse a range from A1:B10 notation
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(colon_pos) = s.find(':') {
            let start = CellAddress::parse(&s[..colon_pos])
                .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
            let end = CellAddress::parse(&s[colon_pos + 1..])
                .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
            Ok(Self::new(start, end))
        } else {
            // Single cell range
            let addr = CellAddress::parse(s)?;
            Ok(Self::single(addr))
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// Get the total number of cells in the range
    pub fn cell_count(&self) -> u64 {
        self.row_count() as u64 * self.col_count() as u64
    }

    /// Iterate over all cell addresses in the range (row by row)
    pub fn cells(&self) -> CellRangeIterator {
        CellRangeIterator {
            range: *self,
            current_row: self.start.row,
            current_col: self.start.col,
            remaining: self.cell_count(),
        }
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Iterator over cells in a range
pub struct CellRangeIterator {
    range: CellRange,
    current_row: u32,
    current_col: u32,
    remaining: u64,
}

impl Iterator for CellRangeIterator {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let addr = CellAddress {
            row: self.current_row,
            col: self.current_col,
        };

        // Step without overflowing at u32::MAX edges; `remaining` ends the walk
        if self.current_col == self.range.end.col {
            self.current_col = self.range.start.col;
            self.current_row = self.current_row.saturating_add(1);
        } else {
            self.current_col += 1;
        }

        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}
