use recordbeam::testing::{table_rows, write_input};
use pretty_assertions::assert_eq;
use recordbeam::*;

fn run(lines: &[&str], select: &str, distinct: &str) -> anyhow::Result<(RunResult, Table)> {
    let dir = tempfile::tempdir()?;
    let input = write_input(dir.path(), "in.tbl", lines);
    let cfg = DedupConfig::from_tokens(&format!("R={}", input.display()), select, distinct)?;
    let mut store = MemoryStore::new();
    let res = DedupPipeline::new(&cfg).run(&LocalFs, &mut store)?;
    let table = store.scan("Result")?;
    Ok((res, table))
}

#[test]
fn only_matching_rows_are_loaded() -> anyhow::Result<()> {
    let (res, table) = run(&["1|2|5.0|x", "3|4|9.9|y"], "select:R2,gt,5.0", "distinct:R0,R1")?;
    assert_eq!(res.rows_matched, 1);
    assert_eq!(res.rows_loaded, 1);
    assert_eq!(table.get("0", "res", "R0"), Some("3"));
    assert_eq!(table.get("0", "res", "R1"), Some("4"));
    assert_eq!(table.rows.len(), 1);
    Ok(())
}

#[test]
fn duplicates_after_projection_collapse() -> anyhow::Result<()> {
    let (res, table) = run(&["1|9|9.9", "2|9|9.9"], "select:R2,gt,5.0", "distinct:R1")?;
    assert_eq!(res.rows_matched, 2);
    assert_eq!(res.rows_loaded, 1);
    assert_eq!(table_rows(&table, "res", &["R1"]), vec![vec!["9".to_string()]]);
    Ok(())
}

#[test]
fn loaded_count_equals_distinct_tuple_count() -> anyhow::Result<()> {
    let lines: Vec<String> = (0..200)
        .map(|i| format!("{}|{}|{}", i % 7, i % 3, i))
        .collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let (res, table) = run(&refs, "select:R2,ge,50", "distinct:R0,R1")?;

    let mut expected: Vec<(usize, usize)> = (50..200).map(|i| (i % 7, i % 3)).collect();
    expected.sort();
    expected.dedup();
    assert_eq!(res.rows_loaded, expected.len());
    assert_eq!(table.rows.len(), expected.len());
    Ok(())
}

#[test]
fn row_keys_are_sequential_from_zero() -> anyhow::Result<()> {
    let (_, table) = run(&["a|1", "b|2", "c|3"], "select:R1,gt,0", "distinct:R0")?;
    let keys: Vec<&str> = table.rows.keys().map(String::as_str).collect();
    assert_eq!(keys, ["0", "1", "2"]);
    Ok(())
}

#[test]
fn projection_order_sets_column_labels() -> anyhow::Result<()> {
    let (_, table) = run(&["a|b|c|7"], "select:R3,eq,7", "distinct:R2,R0")?;
    assert_eq!(table_rows(&table, "res", &["R2", "R0"]), vec![vec!["c".to_string(), "a".to_string()]]);
    Ok(())
}

#[test]
fn unknown_operator_yields_empty_table() -> anyhow::Result<()> {
    let (res, table) = run(&["1|9|9.9", "2|9|1.0"], "select:R2,zz,5.0", "distinct:R1")?;
    assert_eq!(res.lines_read, 2);
    assert_eq!(res.rows_loaded, 0);
    assert!(table.rows.is_empty());
    Ok(())
}

#[test]
fn rerun_replaces_previous_output() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = write_input(dir.path(), "in.tbl", &["1|9|9.9", "2|8|9.9", "3|8|1.0"]);
    let cfg = DedupConfig::from_tokens(
        &format!("R={}", input.display()),
        "select:R2,gt,5.0",
        "distinct:R1",
    )?;
    let mut store = JsonDirStore::open(dir.path().join("store"))?;

    DedupPipeline::new(&cfg).run(&LocalFs, &mut store)?;
    let first = table_rows(&store.scan("Result")?, "res", &["R1"]);
    DedupPipeline::new(&cfg).run(&LocalFs, &mut store)?;
    let second = store.scan("Result")?;

    assert_eq!(second.rows.len(), 2);
    assert_eq!(table_rows(&second, "res", &["R1"]), first);
    Ok(())
}

#[test]
fn non_numeric_compare_field_aborts() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = write_input(dir.path(), "in.tbl", &["1|9|9.9", "2|9|n/a"]);
    let cfg = DedupConfig::from_tokens(&format!("R={}", input.display()), "select:R2,gt,5.0", "distinct:R1")?;
    let mut store = MemoryStore::new();
    let err = DedupPipeline::new(&cfg).run(&LocalFs, &mut store).unwrap_err();
    assert!(matches!(err, PipelineError::Parse { line: 2, column: 2, .. }));
    assert_eq!(err.exit_code(), -4);
    // the sink is only touched after the whole input is read
    assert!(store.table("Result").is_none());
    Ok(())
}

#[test]
fn missing_input_is_not_found() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let cfg = DedupConfig::from_tokens(
        &format!("R={}/absent.tbl", dir.path().display()),
        "select:R0,gt,0",
        "distinct:R0",
    )?;
    let err = DedupPipeline::new(&cfg).run(&LocalFs, &mut MemoryStore::new()).unwrap_err();
    assert_eq!(err.exit_code(), -2);
    Ok(())
}

#[test]
fn sink_failure_leaves_prefix_and_reports_write_error() -> anyhow::Result<()> {
    let src = MemorySource::new().with_file("in.tbl", ["a|1", "b|2", "c|3"]);
    let cfg = DedupConfig::from_tokens("R=in.tbl", "select:R1,gt,0", "distinct:R0")?;
    let mut store = MemoryStore::new().fail_after(2);
    let err = DedupPipeline::new(&cfg).run(&src, &mut store).unwrap_err();
    assert_eq!(err.exit_code(), -3);
    assert_eq!(store.scan("Result")?.rows.len(), 2);
    Ok(())
}
