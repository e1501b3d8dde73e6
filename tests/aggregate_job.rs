use recordbeam::testing::{assert_collections_unordered_equal, read_part_lines, write_input};
use pretty_assertions::assert_eq;
use recordbeam::*;
use std::collections::HashMap;

fn compute(lines: &[&str], cfg: &AggregateConfig) -> anyhow::Result<Vec<String>> {
    let parts = AggregateJob::new(cfg).compute(lines.iter().map(|s| s.to_string()).collect())?;
    Ok(parts.into_iter().flatten().collect())
}

fn cfg(sequential: bool, combine: bool, partitions: Option<usize>) -> AggregateConfig {
    let mut c = AggregateConfig::new(vec![], "unused");
    c.sequential = sequential;
    c.map_side_combine = combine;
    c.partitions = partitions;
    c.threads = Some(2);
    c
}

#[test]
fn invalid_durations_do_not_count() -> anyhow::Result<()> {
    let out = compute(&["A B 10", "A B 20", "A B bad"], &cfg(true, false, None))?;
    assert_eq!(out, ["A B 2 15.000"]);
    Ok(())
}

#[test]
fn two_field_lines_form_no_group() -> anyhow::Result<()> {
    let out = compute(&["A B", "C D 1"], &cfg(true, false, None))?;
    assert_eq!(out, ["C D 1 1.000"]);
    Ok(())
}

#[test]
fn multi_line_chunks_are_tokenized() -> anyhow::Result<()> {
    let out = compute(&["A B 1\nA B 2\r\nC D 4"], &cfg(true, false, None))?;
    assert_collections_unordered_equal(&out, &["A B 2 1.500".to_string(), "C D 1 4.000".to_string()]);
    Ok(())
}

#[test]
fn parallel_and_combined_runs_agree_with_sequential() -> anyhow::Result<()> {
    let lines: Vec<String> = (0..500)
        .map(|i| format!("s{} d{} {}", i % 5, i % 3, i % 17))
        .chain(["junk".to_string(), "x y z".to_string()])
        .collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();

    let seq = compute(&refs, &cfg(true, false, None))?;
    let par = compute(&refs, &cfg(false, false, Some(4)))?;
    let comb = compute(&refs, &cfg(false, true, Some(3)))?;
    assert_eq!(seq.len(), 15);
    assert_collections_unordered_equal(&par, &seq);
    assert_collections_unordered_equal(&comb, &seq);
    Ok(())
}

#[test]
fn counts_and_averages_match_direct_computation() -> anyhow::Result<()> {
    let lines: Vec<String> = (0..300)
        .map(|i| format!("n{} m{} {}.25", i % 4, i % 2, i))
        .collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();

    let mut expected: HashMap<(String, String), (u64, f64)> = HashMap::new();
    for i in 0..300u32 {
        let e = expected
            .entry((format!("n{}", i % 4), format!("m{}", i % 2)))
            .or_default();
        e.0 += 1;
        e.1 += f64::from(i) + 0.25;
    }

    let out = compute(&refs, &cfg(false, false, Some(5)))?;
    assert_eq!(out.len(), expected.len());
    for line in out {
        let f: Vec<&str> = line.split(' ').collect();
        let (count, sum) = expected[&(f[0].to_string(), f[1].to_string())];
        assert_eq!(f[2].parse::<u64>()?, count);
        assert_eq!(f[3], recordbeam::utils::format_fixed(sum / count as f64, 3));
    }
    Ok(())
}

#[test]
fn each_key_lands_in_exactly_one_partition() -> anyhow::Result<()> {
    let lines: Vec<String> = (0..100).map(|i| format!("a{} b 1", i % 10)).collect();
    let c = cfg(false, false, Some(4));
    let parts = AggregateJob::new(&c).compute(lines)?;
    assert_eq!(parts.len(), 4);
    let mut seen: Vec<String> = parts
        .iter()
        .flatten()
        .map(|l| l.split(' ').next().unwrap_or_default().to_string())
        .collect();
    let total = seen.len();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), total);
    assert_eq!(total, 10);
    Ok(())
}

#[test]
fn run_writes_part_files_and_marker() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let inputs = dir.path().join("in");
    std::fs::create_dir(&inputs)?;
    write_input(&inputs, "a.txt", &["A B 10", "A B 20"]);
    write_input(&inputs, "b.txt", &["A B bad", "C D 3", "E F"]);

    let out = dir.path().join("out");
    let mut c = AggregateConfig::new(vec![inputs.display().to_string()], &out);
    c.partitions = Some(2);
    let report = AggregateJob::new(&c).run(&LocalFs)?;

    assert_eq!(report.input_files, 2);
    assert_eq!(report.lines_read, 5);
    assert_eq!(report.groups, 2);
    assert_eq!(report.parts.len(), 2);
    assert!(out.join("_SUCCESS").exists());
    assert_eq!(read_part_lines(&out), ["A B 2 15.000", "C D 1 3.000"]);
    Ok(())
}

#[test]
fn run_fails_on_missing_input_or_existing_output() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let missing = AggregateConfig::new(
        vec![dir.path().join("nope.txt").display().to_string()],
        dir.path().join("out"),
    );
    assert!(matches!(
        AggregateJob::new(&missing).run(&LocalFs),
        Err(PipelineError::SourceNotFound { .. })
    ));

    let input = write_input(dir.path(), "in.txt", &["A B 1"]);
    let existing = AggregateConfig::new(vec![input.display().to_string()], dir.path());
    assert!(matches!(
        AggregateJob::new(&existing).run(&LocalFs),
        Err(PipelineError::Argument(_))
    ));
    Ok(())
}

#[test]
fn undecodable_line_is_dropped_like_any_malformed_record() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("calls.txt");
    std::fs::write(&input, b"A B 10\n\xff\xfe junk\nA B 20\n")?;

    let out = dir.path().join("out");
    let c = AggregateConfig::new(vec![input.display().to_string()], &out);
    let report = AggregateJob::new(&c).run(&LocalFs)?;

    assert_eq!(report.lines_read, 3);
    assert_eq!(read_part_lines(&out), ["A B 2 15.000"]);
    Ok(())
}
