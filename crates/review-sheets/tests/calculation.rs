//! End-to-end tests for table calculation

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use review_sheets::prelude::*;

fn addr(s: &str) -> CellAddress {
    s.parse().unwrap()
}

fn table(rows: Vec<Vec<Cell>>) -> Table {
    let mut table = Table::new();
    for cells in rows {
        table.push_row(Row::new(cells));
    }
    table
}

/// Run the engine the way the table view does
fn compute(table: &Table, overrides: &[(&str, &str)]) -> ComputedMap {
    let cell_map = build_cell_map(table);
    let mut inputs = build_initial_inputs(table);
    for (a, text) in overrides {
        inputs.insert(addr(a), text.to_string());
    }
    compute_computed_by_addr(table, &inputs, &cell_map)
}

fn number(values: &ComputedMap, a: &str) -> f64 {
    match values.get(&addr(a)) {
        Some(ComputedValue::Number(n)) => *n,
        other => panic!("{} is {:?}", a, other),
    }
}

#[test]
fn test_sum_over_literals() {
    let t = table(vec![
        vec![Cell::literal(addr("A1"), 2), Cell::formula(addr("B1"), "=SUM(A1:A3)")],
        vec![Cell::literal(addr("A2"), 3)],
        vec![Cell::literal(addr("A3"), 5)],
    ]);

    let values = compute(&t, &[]);
    assert_eq!(values.len(), 1);
    assert_eq!(number(&values, "B1"), 10.0);
}

#[test]
fn test_if_returns_text() {
    let t = table(vec![vec![
        Cell::input(addr("A1"), 10),
        Cell::formula(addr("B1"), "=IF(A1>5,\"big\",\"small\")"),
    ]]);

    assert_eq!(
        compute(&t, &[])[&addr("B1")],
        ComputedValue::Text("big".into())
    );
    assert_eq!(
        compute(&t, &[("A1", "1")])[&addr("B1")],
        ComputedValue::Text("small".into())
    );
}

#[test]
fn test_round_half_away_from_zero() {
    let t = table(vec![vec![
        Cell::formula(addr("A1"), "=ROUND(2.345,2)"),
        Cell::formula(addr("B1"), "=ROUND(-2.345,2)"),
        Cell::formula(addr("C1"), "=ROUND(2.5,0)"),
        Cell::formula(addr("D1"), "=ROUND(-2.5,0)"),
    ]]);

    let values = compute(&t, &[]);
    assert_eq!(number(&values, "A1"), 2.35);
    assert_eq!(number(&values, "B1"), -2.35);
    assert_eq!(number(&values, "C1"), 3.0);
    assert_eq!(number(&values, "D1"), -3.0);
}

#[test]
fn test_min_max() {
    let t = table(vec![
        vec![Cell::input(addr("A1"), 4), Cell::formula(addr("B1"), "=MIN(A1,A2,A3)")],
        vec![Cell::input(addr("A2"), -1), Cell::formula(addr("B2"), "=MAX(A1,A2,A3)")],
        vec![Cell::input(addr("A3"), 9)],
    ]);

    let values = compute(&t, &[]);
    assert_eq!(number(&values, "B1"), -1.0);
    assert_eq!(number(&values, "B2"), 9.0);
}

#[test]
fn test_mutual_cycle_terminates() {
    let t = table(vec![vec![
        Cell::formula(addr("A1"), "=B1+1"),
        Cell::formula(addr("B1"), "=A1+1"),
    ]]);
    let cell_map = build_cell_map(&t);

    let calc = calculate(&t, &InputsMap::new(), &cell_map, &CalculationOptions::default());

    // Five rounds, each raising both cells by two
    assert_eq!(number(&calc.values, "A1"), 9.0);
    assert_eq!(number(&calc.values, "B1"), 10.0);
    assert_eq!(calc.stats.iterations, 5);
    assert_eq!(calc.stats.circular_references, 2);
    assert!(!calc.stats.converged);
}

#[test]
fn test_settling_cycle_stops_early() {
    let t = table(vec![vec![
        Cell::formula(addr("A1"), "=MIN(B1+1, 3)"),
        Cell::formula(addr("B1"), "=A1"),
    ]]);

    let calc = t.calculate(&InputsMap::new());
    assert_eq!(number(&calc.values, "A1"), 3.0);
    assert_eq!(number(&calc.values, "B1"), 3.0);
    assert_eq!(calc.stats.iterations, 4);
    assert!(calc.stats.converged);
}

#[test]
fn test_idempotent() {
    let t = table(vec![
        vec![
            Cell::input(addr("A1"), 7),
            Cell::formula(addr("B1"), "=A1*3"),
            Cell::formula(addr("C1"), "=IF(B1>20,\"ok\",\"low\")"),
        ],
        vec![Cell::formula(addr("A2"), "=SUM(A1:C1)")],
    ]);

    assert_eq!(compute(&t, &[]), compute(&t, &[]));
}

#[test]
fn test_blank_reference_is_zero() {
    let t = table(vec![vec![
        Cell::input(addr("A1"), CellValue::Empty),
        Cell::formula(addr("B1"), "=A1+Z40+1"),
    ]]);

    assert_eq!(number(&compute(&t, &[]), "B1"), 1.0);
}

#[test]
fn test_non_numeric_input_is_zero() {
    let t = table(vec![vec![
        Cell::input(addr("A1"), 5),
        Cell::formula(addr("B1"), "=A1*2"),
    ]]);

    assert_eq!(number(&compute(&t, &[("A1", "abc")]), "B1"), 0.0);
    assert_eq!(number(&compute(&t, &[("A1", " 2.5 ")]), "B1"), 5.0);
}

#[test]
fn test_disallowed_characters_yield_no_value() {
    let t = table(vec![vec![
        Cell::input(addr("A1"), 1),
        Cell::input(addr("B1"), 2),
        Cell::formula(addr("C1"), "=A1;1"),
        Cell::formula(addr("D1"), "=A1&B1"),
        Cell::formula(addr("E1"), "=A1+B1"),
    ]]);

    let cell_map = build_cell_map(&t);
    let calc = calculate(&t, &InputsMap::new(), &cell_map, &CalculationOptions::default());

    assert_eq!(calc.values.get(&addr("C1")), None);
    assert_eq!(calc.values.get(&addr("D1")), None);
    assert_eq!(number(&calc.values, "E1"), 3.0);
    assert_eq!(calc.stats.errors, 2);
}

#[test]
fn test_evaluation_failures_are_swallowed() {
    let t = table(vec![vec![
        Cell::input(addr("A1"), 0),
        Cell::formula(addr("B1"), "=10/A1"),
        Cell::formula(addr("C1"), "=NOPE(1)"),
        Cell::formula(addr("D1"), "=B1+1"),
    ]]);

    let values = compute(&t, &[]);
    assert_eq!(values.get(&addr("B1")), None);
    assert_eq!(values.get(&addr("C1")), None);
    // D1 reads the missing B1 as 0
    assert_eq!(number(&values, "D1"), 1.0);

    let values = compute(&t, &[("A1", "4")]);
    assert_eq!(number(&values, "B1"), 2.5);
    assert_eq!(number(&values, "D1"), 3.5);
}

#[test]
fn test_inputs_override_literals() {
    let t = table(vec![vec![
        Cell::input(addr("A1"), 1),
        Cell::literal(addr("B1"), 100),
        Cell::formula(addr("C1"), "=A1+B1+D9"),
    ]]);

    // B1 is not an input, but an entry for it still wins; D9 is not in the
    // table at all and still feeds C1
    let values = compute(&t, &[("A1", "2"), ("B1", "3"), ("D9", "4")]);
    assert_eq!(number(&values, "C1"), 9.0);
}

#[test]
fn test_hidden_cells_are_excluded() {
    let t = table(vec![vec![
        Cell::input(addr("A1"), 5).hide(),
        Cell::formula(addr("B1"), "=A1+1"),
        Cell::formula(addr("C1"), "=2").hide(),
    ]]);

    assert!(build_cell_map(&t).get(&addr("A1")).is_none());
    assert!(build_initial_inputs(&t).is_empty());

    let values = compute(&t, &[]);
    assert_eq!(number(&values, "B1"), 1.0);
    assert_eq!(values.get(&addr("C1")), None);
}

#[test]
fn test_chain_in_any_table_order() {
    let t = table(vec![
        vec![Cell::formula(addr("C1"), "=B1*2")],
        vec![Cell::formula(addr("B1"), "=A1+1")],
        vec![Cell::input(addr("A1"), 4)],
    ]);

    let values = compute(&t, &[]);
    assert_eq!(number(&values, "B1"), 5.0);
    assert_eq!(number(&values, "C1"), 10.0);
}

#[test]
fn test_virtual_rows_are_addressed_opaquely() {
    let mut t = table(vec![vec![
        Cell::input(addr("A1"), 10),
        Cell::formula(addr("B1"), "=SUM(A1:A1000)"),
    ]]);
    t.push_row(Row::new_virtual([Cell::input(addr("A1000"), 5)]).with_key("extra-goal"));

    let values = compute(&t, &[("A1000", "7")]);
    assert_eq!(number(&values, "B1"), 17.0);
}

#[test]
fn test_deep_nesting_is_rejected() {
    let deep = format!("={}1{}", "(".repeat(500), ")".repeat(500));
    let t = table(vec![vec![
        Cell::formula(addr("A1"), deep),
        Cell::formula(addr("B1"), "=((((1))))"),
    ]]);

    let values = compute(&t, &[]);
    assert_eq!(values.get(&addr("A1")), None);
    assert_eq!(number(&values, "B1"), 1.0);
}

#[test]
fn test_output_has_only_formula_cells() {
    let t = table(vec![vec![
        Cell::new("Goal"),
        Cell::input(addr("A1"), 3),
        Cell::literal(addr("B1"), 4),
        Cell::formula(addr("C1"), "=A1*B1"),
    ]]);

    let values = compute(&t, &[]);
    assert_eq!(values.keys().copied().collect::<Vec<_>>(), vec![addr("C1")]);
}

#[cfg(feature = "serde")]
#[test]
fn test_table_from_json() {
    let t: Table = serde_json::from_str(
        r#"{
            "columns": [{"key": "goal", "label": "Goal"}, {"key": "score", "label": "Score"}],
            "rows": [
                {"cells": [{"value": "Revenue"}, {"addr": "B1", "value": 3, "isInput": true}]},
                {"cells": [{"value": "Total"}, {"addr": "B2", "formula": "=ROUND(B1/7, 2)"}]},
                {"key": "extra", "isVirtual": true, "cells": [null, {"addr": "b100", "formula": "=IF(B2>0.4, \"ok\", \"low\")"}]}
            ]
        }"#,
    )
    .unwrap();

    let calc = t.calculate(&InputsMap::new());
    assert_eq!(
        serde_json::to_string(&calc.values).unwrap(),
        r#"{"B2":0.43,"B100":"ok"}"#
    );

    let inputs: InputsMap = serde_json::from_str(r#"{"b1": "1"}"#).unwrap();
    let calc = t.calculate(&inputs);
    assert_eq!(calc.values[&addr("B100")], ComputedValue::Text("low".into()));
}

#[test]
fn test_spaced_range_orders_interior_formulas() {
    let t = table(vec![
        vec![Cell::input(addr("A1"), 1), Cell::formula(addr("B1"), "=SUM(A1 : A3)")],
        vec![Cell::formula(addr("A2"), "=5")],
        vec![Cell::input(addr("A3"), 2)],
    ]);

    let values = compute(&t, &[]);
    assert_eq!(number(&values, "A2"), 5.0);
    assert_eq!(number(&values, "B1"), 8.0);
}

#[test]
fn test_oversized_range_yields_no_value() {
    let t = table(vec![vec![
        Cell::input(addr("A1"), 1),
        Cell::formula(addr("B1"), "=SUM(A1:ZZ999999)"),
        Cell::formula(addr("C1"), "=A1+1"),
    ]]);

    let calc = t.calculate(&InputsMap::new());
    assert_eq!(calc.values.get(&addr("B1")), None);
    assert_eq!(number(&calc.values, "C1"), 2.0);
    assert_eq!(calc.stats.errors, 1);
}

proptest! {
    #[test]
    fn prop_sum_matches_inputs(a in -1000i32..1000, b in -1000i32..1000, c in -1000i32..1000) {
        let t = table(vec![
            vec![Cell::input(addr("A1"), 0), Cell::formula(addr("B1"), "=SUM(A1:A3)")],
            vec![Cell::input(addr("A2"), 0)],
            vec![Cell::input(addr("A3"), 0)],
        ]);
        let (a_text, b_text, c_text) = (a.to_string(), b.to_string(), c.to_string());
        let overrides = [("A1", a_text.as_str()), ("A2", b_text.as_str()), ("A3", c_text.as_str())];

        let first = compute(&t, &overrides);
        prop_assert_eq!(number(&first, "B1"), f64::from(a + b + c));
        prop_assert_eq!(first, compute(&t, &overrides));
    }
}
