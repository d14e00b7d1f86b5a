//! Table calculation engine
//!
//! Recomputes every formula cell of a review table from the current inputs,
//! in dependency order, with bounded relaxation for circular references.
//!
//! # Example
//!
//! ```rust
//! use review_sheets::prelude::*;
//!
//! let a1: CellAddress = "A1".parse().unwrap();
//! let b1: CellAddress = "B1".parse().unwrap();
//!
//! let mut table = Table::new();
//! table.push_row(Row::new([Cell::input(a1, 10), Cell::formula(b1, "=A1*2")]));
//!
//! let mut inputs = InputsMap::new();
//! inputs.insert(a1, "21".to_string());
//!
//! let calculation = table.calculate(&inputs);
//! assert_eq!(calculation.values[&b1], ComputedValue::Number(42.0));
//! println!("Calculated {} cells", calculation.stats.cells_calculated);
//! ```

use crate::{
    build_cell_map, build_initial_inputs, evaluate, extract_deps, parse_formula, CellAddress,
    CellMap, CellValue, ComputedMap, DependencyGraph, EvaluationContext, FormulaExpr, InputsMap,
    Table,
};
use std::collections::BTreeMap;

/// Options for table calculation
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct CalculationOptions {
    /// Maximum relaxation rounds over cells caught in circular references
    /// (default: 5)
    pub max_relaxation_rounds: u32,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            max_relaxation_rounds: 5,
        }
    }
}

/// Statistics from a calculation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct CalculationStats {
    /// Total number of formula cells
    pub formula_count: usize,
    /// Number of successful formula evaluations
    pub cells_calculated: usize,
    /// Number of failed parses and evaluations
    pub errors: usize,
    /// Number of cells that lie on a circular reference
    pub circular_references: usize,
    /// Number of cells on or downstream of a circular reference
    pub unresolved: usize,
    /// Number of relaxation rounds performed
    pub iterations: u32,
    /// Whether every value settled
    pub converged: bool,
}

/// Values and statistics of one calculation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calculation {
    /// Computed values of formula cells that produced one
    pub values: ComputedMap,
    /// What the run did
    pub stats: CalculationStats,
}

/// Compute every formula cell of a table
///
/// `cell_inputs` overrides the table's own input values; an address absent
/// from the table still feeds formulas that reference it. Formula cells whose
/// formula fails to parse or evaluate are left out of the result.
pub fn compute_computed_by_addr(
    table: &Table,
    cell_inputs: &InputsMap,
    cell_map: &CellMap,
) -> ComputedMap {
    calculate(table, cell_inputs, cell_map, &CalculationOptions::default()).values
}

/// Compute every formula cell of a table with custom options
///
/// Same as [`compute_computed_by_addr`], but also reports statistics.
pub fn calculate(
    table: &Table,
    cell_inputs: &InputsMap,
    cell_map: &CellMap,
    options: &CalculationOptions,
) -> Calculation {
    let mut engine = CalculationEngine::new(options.clone());
    engine.calculate_all(table, cell_inputs, cell_map)
}

/// Extension trait for Table to add calculation methods
pub trait TableCalculationExt {
    /// Calculate all formulas with default options
    fn calculate(&self, cell_inputs: &InputsMap) -> Calculation;

    /// Calculate all formulas with custom options
    fn calculate_with_options(
        &self,
        cell_inputs: &InputsMap,
        options: &CalculationOptions,
    ) -> Calculation;
}

impl TableCalculationExt for Table {
    fn calculate(&self, cell_inputs: &InputsMap) -> Calculation {
        self.calculate_with_options(cell_inputs, &CalculationOptions::default())
    }

    fn calculate_with_options(
        &self,
        cell_inputs: &InputsMap,
        options: &CalculationOptions,
    ) -> Calculation {
        calculate(self, cell_inputs, &build_cell_map(self), options)
    }
}

/// The calculation engine
struct CalculationEngine {
    options: CalculationOptions,
    /// Dependency graph over formula cells
    dependency_graph: DependencyGraph,
    /// Parsed formula ASTs, keyed by address
    parsed_formulas: BTreeMap<CellAddress, FormulaExpr>,
    /// Values formulas read: inputs, literals and results so far
    snapshot: BTreeMap<CellAddress, CellValue>,
    /// Results of this run
    computed: ComputedMap,
    stats: CalculationStats,
}

impl CalculationEngine {
    fn new(options: CalculationOptions) -> Self {
        Self {
            options,
            dependency_graph: DependencyGraph::new(),
            parsed_formulas: BTreeMap::new(),
            snapshot: BTreeMap::new(),
            computed: ComputedMap::new(),
            stats: CalculationStats::default(),
        }
    }

    /// Calculate all formulas of the table
    fn calculate_all(
        &mut self,
        table: &Table,
        cell_inputs: &InputsMap,
        cell_map: &CellMap,
    ) -> Calculation {
        // Phase 1: Seed the value snapshot
        self.seed_snapshot(table, cell_inputs, cell_map);

        // Phase 2: Parse formulas and build the dependency graph
        self.collect_formulas(cell_map);

        // Phase 3: Calculate acyclic cells in dependency order
        let order = self.dependency_graph.topological_order();
        for &cell in &order.order {
            self.calculate_cell(cell);
        }

        // Phase 4: Relax whatever a cycle kept from being ordered
        self.stats.unresolved = order.unresolved.len();
        self.stats.circular_references = order
            .unresolved
            .iter()
            .filter(|cell| self.dependency_graph.has_circular_reference(**cell))
            .count();
        self.calculate_cells_iterative(&order.unresolved);

        log::debug!(
            "calculated {} of {} formula cells ({} errors, {} unresolved, {} rounds)",
            self.stats.cells_calculated,
            self.stats.formula_count,
            self.stats.errors,
            self.stats.unresolved,
            self.stats.iterations
        );

        Calculation {
            values: std::mem::take(&mut self.computed),
            stats: std::mem::take(&mut self.stats),
        }
    }

    /// Inputs win over literal values; inputs for unknown addresses still
    /// count
    fn seed_snapshot(&mut self, table: &Table, cell_inputs: &InputsMap, cell_map: &CellMap) {
        let mut inputs = build_initial_inputs(table);
        inputs.extend(
            cell_inputs
                .iter()
                .map(|(addr, text)| (*addr, text.clone())),
        );

        for (addr, entry) in cell_map {
            self.snapshot.insert(*addr, entry.value.clone());
        }
        for (addr, text) in inputs {
            self.snapshot.insert(addr, CellValue::Text(text));
        }
    }

    /// Parse every formula and add an edge for each formula cell it mentions
    fn collect_formulas(&mut self, cell_map: &CellMap) {
        for (addr, entry) in cell_map {
            let Some(formula) = entry.formula.as_deref() else {
                continue;
            };
            self.stats.formula_count += 1;
            self.dependency_graph.add_node(*addr);

            for dep in extract_deps(formula) {
                if cell_map.get(&dep).map_or(false, |e| e.is_formula()) {
                    self.dependency_graph.add_dependency(dep, *addr);
                }
            }

            match parse_formula(formula) {
                Ok(ast) => {
                    self.parsed_formulas.insert(*addr, ast);
                }
                Err(e) => {
                    log::warn!("failed to parse formula at {} ({:?}): {}", addr, formula, e);
                    self.stats.errors += 1;
                }
            }
        }
    }

    /// Calculate one cell against the current snapshot
    ///
    /// Returns true if the cell's value changed.
    fn calculate_cell(&mut self, cell: CellAddress) -> bool {
        let Some(ast) = self.parsed_formulas.get(&cell) else {
            return false;
        };

        let ctx = EvaluationContext::new(&self.snapshot);
        let value = match evaluate(ast, &ctx).and_then(|v| v.into_computed()) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("keeping previous value of {}: {}", cell, e);
                self.stats.errors += 1;
                return false;
            }
        };
        self.stats.cells_calculated += 1;

        if self.computed.get(&cell) == Some(&value) {
            return false;
        }
        self.snapshot.insert(cell, value.clone().into());
        self.computed.insert(cell, value);
        true
    }

    /// Re-evaluate cells caught in cycles until nothing changes
    fn calculate_cells_iterative(&mut self, cells: &[CellAddress]) {
        if cells.is_empty() {
            self.stats.converged = true;
            return;
        }

        for round in 1..=self.options.max_relaxation_rounds {
            self.stats.iterations = round;

            let mut changed = false;
            for &cell in cells {
                changed |= self.calculate_cell(cell);
            }

            if !changed {
                self.stats.converged = true;
                return;
            }
        }

        log::warn!(
            "{} cells still changing after {} relaxation rounds",
            cells.len(),
            self.options.max_relaxation_rounds
        );
    }
}
