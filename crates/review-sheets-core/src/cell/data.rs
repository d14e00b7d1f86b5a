//! Table cell data

use super::{CellAddress, CellValue};

/// Complete data for a single table cell
///
/// A cell either holds a literal, is an input the user edits, or carries a
/// formula. Formula cells are derived and never inputs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct Cell {
    /// Address used by formulas to refer to this cell (None for headers and
    /// decoration cells)
    pub addr: Option<CellAddress>,
    /// Literal value (for formula cells: the last value the caller knew of)
    pub value: CellValue,
    /// Formula text, e.g. `=SUM(A1:A3)`
    pub formula: Option<String>,
    /// Cell is edited by the user
    pub is_input: bool,
    /// Cell is hidden and invisible to formulas
    pub hidden: bool,
    /// Number of rows this cell spans
    pub row_span: u32,
    /// Number of columns this cell spans
    pub col_span: u32,
}

impl Cell {
    /// Create an unaddressed cell holding a literal value
    pub fn new<V: Into<CellValue>>(value: V) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Create an addressed cell holding a literal value
    pub fn literal<V: Into<CellValue>>(addr: CellAddress, value: V) -> Self {
        Self {
            addr: Some(addr),
            ..Self::new(value)
        }
    }

    /// Create an input cell seeded with a value
    pub fn input<V: Into<CellValue>>(addr: CellAddress, value: V) -> Self {
        Self {
            is_input: true,
            ..Self::literal(addr, value)
        }
    }

    /// Create a formula cell
    pub fn formula<S: Into<String>>(addr: CellAddress, formula: S) -> Self {
        Self {
            addr: Some(addr),
            formula: Some(formula.into()),
            ..Self::default()
        }
    }

    /// Mark the cell as hidden
    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Set the row/column span
    pub fn with_span(mut self, row_span: u32, col_span: u32) -> Self {
        self.row_span = row_span;
        self.col_span = col_span;
        self
    }

    /// Check if this cell carries a formula
    pub fn is_formula(&self) -> bool {
        self.formula.is_some()
    }

    /// Check if formulas can see this cell
    pub fn is_visible(&self) -> bool {
        !self.hidden && self.addr.is_some()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            addr: None,
            value: CellValue::Empty,
            formula: None,
            is_input: false,
            hidden: false,
            row_span: 1,
            col_span: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let a1 = CellAddress::parse("A1").unwrap();

        let cell = Cell::input(a1, 5);
        assert!(cell.is_input);
        assert!(!cell.is_formula());
        assert_eq!(cell.value, CellValue::Number(5.0));

        let cell = Cell::formula(a1, "=B1+1");
        assert!(cell.is_formula());
        assert!(!cell.is_input);
        assert_eq!((cell.row_span, cell.col_span), (1, 1));

        assert!(!Cell::new("Header").is_visible());
        assert!(!Cell::literal(a1, 1).hide().is_visible());
        assert!(Cell::literal(a1, 1).is_visible());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_cell_json() {
        let cell: Cell =
            serde_json::from_str(r#"{"addr":"b2","formula":"=A1*2","rowSpan":2}"#).unwrap();
        assert_eq!(cell.addr, Some(CellAddress::parse("B2").unwrap()));
        assert_eq!(cell.formula.as_deref(), Some("=A1*2"));
        assert_eq!(cell.value, CellValue::Empty);
        assert_eq!((cell.row_span, cell.col_span), (2, 1));
        assert!(!cell.is_input);

        assert!(serde_json::from_str::<Cell>(r#"{"addr":"B0"}"#).is_err());
    }
}
