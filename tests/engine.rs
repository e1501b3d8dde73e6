use recordbeam::testing::assert_collections_unordered_equal;
use recordbeam::*;

fn words(p: &Pipeline) -> PCollection<String> {
    from_vec(
        p,
        vec![
            "the quick brown fox".to_string(),
            "jumps over the lazy dog".to_string(),
            "the end".to_string(),
        ],
    )
    .flat_map(|s: &String| s.split(' ').map(str::to_string).collect::<Vec<_>>())
}

#[test]
fn map_filter_flat_map_chain() -> anyhow::Result<()> {
    let p = Pipeline::default();
    let out = words(&p)
        .filter(|w: &String| w.len() >= 4)
        .map(|w: &String| w.to_uppercase())
        .collect_seq()?;
    assert_eq!(out, ["QUICK", "BROWN", "JUMPS", "OVER", "LAZY"]);
    Ok(())
}

#[test]
fn group_by_key_gathers_every_value() -> anyhow::Result<()> {
    let p = Pipeline::default();
    let grouped = words(&p)
        .key_by(|w: &String| w.len())
        .group_by_key()
        .map(|(k, vs): &(usize, Vec<String>)| (*k, vs.len()))
        .collect_seq_sorted()?;
    assert_eq!(grouped, [(3, 6), (4, 2), (5, 3)]);
    Ok(())
}

#[test]
fn combine_values_matches_group_by_key() -> anyhow::Result<()> {
    let data: Vec<(String, u32)> = (0..1000).map(|i| (format!("k{}", i % 13), i)).collect();

    let p = Pipeline::default();
    let counted = from_vec(&p, data.clone())
        .combine_values(Count)
        .collect_par_sorted(Some(4), Some(8))?;

    let p = Pipeline::default();
    let grouped = from_vec(&p, data)
        .group_by_key()
        .map(|(k, vs): &(String, Vec<u32>)| (k.clone(), vs.len() as u64))
        .collect_seq_sorted()?;

    assert_eq!(counted, grouped);
    Ok(())
}

#[test]
fn parallel_matches_sequential() -> anyhow::Result<()> {
    let p = Pipeline::default();
    let seq = words(&p).key_by(|w: &String| w.clone()).combine_values(Count).collect_seq()?;

    let p = Pipeline::default();
    let par = words(&p)
        .key_by(|w: &String| w.clone())
        .combine_values(Count)
        .collect_par(Some(3), Some(5))?;

    assert_collections_unordered_equal(&par, &seq);
    Ok(())
}

#[test]
fn shuffle_partitions_are_disjoint() -> anyhow::Result<()> {
    let p = Pipeline::default();
    let parts = from_vec(&p, (0..200u32).map(|i| (i % 17, i)).collect())
        .group_by_key()
        .collect_partitions(&Runner::parallel(Some(2), Some(6)))?;

    assert_eq!(parts.len(), 6);
    let mut keys: Vec<u32> = parts.iter().flatten().map(|(k, _)| *k).collect();
    keys.sort();
    assert_eq!(keys, (0..17).collect::<Vec<_>>());
    for (i, part) in parts.iter().enumerate() {
        for (k, _) in part {
            assert_eq!(reduce_partition_for(k, 6), i);
        }
    }
    Ok(())
}

#[test]
fn empty_source_yields_empty_output() -> anyhow::Result<()> {
    let p = Pipeline::default();
    let out = from_vec(&p, Vec::<(String, f64)>::new())
        .combine_values(DurationStats)
        .collect_par(None, Some(4))?;
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn try_map_fails_fast_on_first_error() -> anyhow::Result<()> {
    let p = Pipeline::default();
    let ok = from_vec(&p, vec!["1".to_string(), " 2.5".to_string()])
        .try_map(|s: &String| s.trim().parse::<f64>().map_err(|e| e.to_string()))
        .collect_fail_fast()?;
    assert_eq!(ok, [1.0, 2.5]);

    let p = Pipeline::default();
    let err = from_vec(&p, vec!["1".to_string(), "x".to_string()])
        .try_map(|s: &String| s.parse::<u32>().map_err(|e| e.to_string()))
        .collect_fail_fast()
        .unwrap_err();
    assert!(err.to_string().contains("element failed"));
    Ok(())
}
