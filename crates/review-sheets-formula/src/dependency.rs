//! Dependency tracking for formula calculation
//!
//! [`extract_deps`] finds the cells a formula mentions without evaluating
//! it, and [`DependencyGraph`] orders formula cells so that every cell is
//! calculated after the formula cells it reads.

use ahash::{AHashMap, AHashSet};
use crate::parser::MAX_RANGE_CELLS;
use lazy_regex::regex;
use review_sheets_core::{col_to_number, CellAddress, CellRange};
use std::collections::BTreeSet;

/// Cells referenced by a formula
///
/// A purely textual scan: `A1:B2` style ranges (whitespace around the colon
/// allowed) expand to every cell they cover, and each standalone `A1` style
/// reference is added as is. Matching is case-insensitive, string literals
/// are skipped, and matches that do not form a valid address (such as row 0)
/// are ignored. Ranges larger than [`MAX_RANGE_CELLS`] never parse, so only
/// their corners are added.
///
/// # Example
/// ```rust
/// use review_sheets_formula::extract_deps;
///
/// let deps: Vec<String> = extract_deps("=SUM(a1:b2)+C3")
///     .iter()
///     .map(|addr| addr.to_string())
///     .collect();
/// assert_eq!(deps, ["A1", "B1", "A2", "B2", "C3"]);
/// ```
pub fn extract_deps(formula: &str) -> BTreeSet<CellAddress> {
    let body = formula.trim_start();
    let body = body.strip_prefix('=').unwrap_or(body);
    let body = regex!(r#""(?:[^"]|"")*""#).replace_all(body, " ");

    let mut deps = BTreeSet::new();

    for caps in regex!(r"(?i)([A-Z]+)([0-9]+)\s*:\s*([A-Z]+)([0-9]+)").captures_iter(&body) {
        if let (Some(start), Some(end)) = (
            range_corner(&caps[1], &caps[2]),
            range_corner(&caps[3], &caps[4]),
        ) {
            let range = CellRange::new(start, end);
            if range.cell_count() <= MAX_RANGE_CELLS {
                deps.extend(range.cells());
            }
        }
    }

    for m in regex!(r"(?i)[A-Z]+[0-9]+").find_iter(&body) {
        if let Ok(addr) = CellAddress::parse(m.as_str()) {
            deps.insert(addr);
        }
    }

    deps
}

fn range_corner(letters: &str, digits: &str) -> Option<CellAddress> {
    let col = col_to_number(letters).ok()?;
    let row = digits.parse().ok()?;
    CellAddress::new(row, col).ok()
}

/// Result of ordering a dependency graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologicalOrder {
    /// Cells in an order where precedents come first
    pub order: Vec<CellAddress>,
    /// Cells on or downstream of a cycle, in address order
    pub unresolved: Vec<CellAddress>,
}

impl TopologicalOrder {
    /// Check if every cell could be ordered
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Dependency graph for formula cells
///
/// Tracks which cells depend on which other cells,
/// enabling ordered calculation.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Every cell in the graph
    nodes: BTreeSet<CellAddress>,
    /// Cell → Cells that depend on it (dependents)
    dependents: AHashMap<CellAddress, AHashSet<CellAddress>>,
    /// Cell → Cells it depends on (precedents)
    precedents: AHashMap<CellAddress, AHashSet<CellAddress>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell with no dependencies yet
    pub fn add_node(&mut self, cell: CellAddress) {
        self.nodes.insert(cell);
    }

    /// Add a dependency: dependent depends on precedent
    pub fn add_dependency(&mut self, precedent: CellAddress, dependent: CellAddress) {
        self.nodes.insert(precedent);
        self.nodes.insert(dependent);
        self.dependents
            .entry(precedent)
            .or_default()
            .insert(dependent);
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Check if a cell is in the graph
    pub fn contains(&self, cell: &CellAddress) -> bool {
        self.nodes.contains(cell)
    }

    /// Number of cells in the graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get cells that depend on the given cell
    pub fn get_dependents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get cells that the given cell depends on
    pub fn get_precedents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Order all cells so that precedents come first (Kahn's algorithm)
    ///
    /// Ready cells are released in address order, so the result does not
    /// depend on insertion order. Cells that can never become ready sit on or
    /// behind a cycle and are returned in `unresolved`.
    pub fn topological_order(&self) -> TopologicalOrder {
        let mut in_degree: AHashMap<CellAddress, usize> = self
            .nodes
            .iter()
            .map(|cell| (*cell, self.precedents.get(cell).map_or(0, |p| p.len())))
            .collect();

        let mut ready: BTreeSet<CellAddress> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&cell, _)| cell)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(cell) = ready.pop_first() {
            order.push(cell);

            for dependent in self.get_dependents(cell) {
                if let Some(degree) = in_degree.get_mut(&dependent) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        let unresolved = self
            .nodes
            .iter()
            .filter(|cell| in_degree.get(cell).map_or(false, |degree| *degree > 0))
            .copied()
            .collect();

        TopologicalOrder { order, unresolved }
    }

    /// Check if a cell lies on a circular reference
    ///
    /// Cells that merely read from a cycle are not circular themselves.
    pub fn has_circular_reference(&self, cell: CellAddress) -> bool {
        let mut visited = AHashSet::new();
        let mut stack: Vec<CellAddress> = self.get_precedents(cell).collect();

        while let Some(current) = stack.pop() {
            if current == cell {
                return true;
            }
            if visited.insert(current) {
                stack.extend(self.get_precedents(current));
            }
        }

        false
    }

    /// Clear the entire graph
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.dependents.clear();
        self.precedents.clear();
    }
}
