use concept_graph::utils::{logging, table};

#[test]
fn table_renderer_produces_expected_grid() {
    let headers = ["A", "B"];
    let rows = vec![vec!["x".into(), "y".into()], vec!["long".into(), "z".into()]];
    let out = table::render(&headers, &rows);
    let expected = "\
+------+---+
| A    | B |
+------+---+
| x    | y |
| long | z |
+------+---+";
    assert_eq!(out, expected);
}

#[test]
fn table_pads_missing_cells_and_counts_chars() {
    let rows = vec![vec!["Nervus_für".into()], vec!["a".into(), "b".into()]];
    let out = table::render(&["Name", "X"], &rows);
    let lines: Vec<&str> = out.lines().collect();
    // every line has the same visible width
    let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
    assert!(widths.windows(2).all(|w| w[0] == w[1]));
    assert!(out.contains("| Nervus_für |   |"));
}

#[test]
fn log_level_follows_flags() {
    assert_eq!(logging::level_for(0, false), "warn");
    assert_eq!(logging::level_for(1, false), "debug");
    assert_eq!(logging::level_for(3, false), "trace");
    assert_eq!(logging::level_for(2, true), "error");
}

#[test]
fn init_tracing_twice_is_harmless() {
    logging::init_tracing(0, true);
    logging::init_tracing(2, false);
}
