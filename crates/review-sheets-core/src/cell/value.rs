//! Cell value types

use std::fmt;

/// Literal value stored in a table cell
///
/// Table payloads carry `null`, a number, or a string; with the `serde`
/// feature those map onto [`CellValue::Empty`], [`CellValue::Number`] and
/// [`CellValue::Text`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Numeric value
    Number(f64),

    /// String value
    Text(String),
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Try to get the value as a number
    ///
    /// Text counts as a number when it parses as a finite decimal after
    /// trimming, so a user typing `" 12.5 "` into an input still feeds `12.5`
    /// into formulas.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Try to get the value as a string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value the way it is seeded into an input box
    ///
    /// Empty values become the empty string; integral numbers carry no
    /// fractional part.
    pub fn to_input_string(&self) -> String {
        self.to_string()
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Number(_) => "number",
            CellValue::Text(_) => "text",
        }
    }
}

/// Parse user-entered text as a number
///
/// Surrounding whitespace is ignored. Values that do not parse to a finite
/// number (`inf`, `NaN`, `1e999`) are not numbers here.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, ""),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Empty, Into::into)
    }
}
