use anyhow::Result;
use placer::domain::model::Candidate;
use placer::domain::ports::RecordStore;
use placer::{
    render_ledger, render_round, DirectoryStore, PlacerEngine, PlacerError, ReportFormat,
    ReusePolicy, StoreLayout,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> Result<()> {
    fs::write(dir.join(name), content)?;
    Ok(())
}

/// Candidates 1..=3, places A (10) and B (3), one block X with one slot.
/// Candidate 2 carries +5 and candidate 3 +2 from adjustments.
fn seed_scenario() -> Result<TempDir> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();

    write(dir, "candidates", "id\n1\n2\n3\n")?;
    write(dir, "places", "id hardness desc\n1 10 A\n2 3 B\n")?;
    write(dir, "blocks", "id slots desc\n100 1 X\n")?;
    write(dir, "manual.extra", "whom extra\n2 5\n3 2\n")?;

    Ok(temp_dir)
}

fn engine(dir: &Path, policy: ReusePolicy) -> PlacerEngine<DirectoryStore> {
    PlacerEngine::with_policy(DirectoryStore::new(dir, StoreLayout::default()), policy)
}

#[test]
fn test_end_to_end_round_is_written() -> Result<()> {
    let temp_dir = seed_scenario()?;
    let engine = engine(temp_dir.path(), ReusePolicy::Exclusive);

    let outcome = engine.run_next()?;

    assert_eq!(outcome.round.number, 1);
    assert!(outcome.location.ends_with("000001.placement"));

    let written = fs::read_to_string(temp_dir.path().join("000001.placement"))?;
    let rows: Vec<Vec<&str>> = written
        .lines()
        .skip(1)
        .map(|l| l.split_whitespace().collect())
        .collect();
    assert_eq!(rows, vec![vec!["1", "1", "100"], vec!["3", "2", "100"]]);

    Ok(())
}

#[test]
fn test_round_trip_raises_scores_by_hardness() -> Result<()> {
    let temp_dir = seed_scenario()?;
    let engine = engine(temp_dir.path(), ReusePolicy::Exclusive);

    let before = engine.summary()?;
    let outcome = engine.run_next()?;
    let after = engine.summary()?;

    for id in 1..=3 {
        let candidate = Candidate::new(id);
        let gained: i64 = outcome
            .round
            .placements
            .iter()
            .filter(|p| p.candidate == candidate)
            .map(|p| p.place.hardness)
            .sum();
        assert_eq!(after.score(candidate), before.score(candidate).map(|s| s + gained));
    }

    assert_eq!(after.score(Candidate::new(1)), Some(10));
    assert_eq!(after.score(Candidate::new(2)), Some(5));
    assert_eq!(after.score(Candidate::new(3)), Some(5));

    Ok(())
}

#[test]
fn test_next_round_follows_highest_existing_round() -> Result<()> {
    let temp_dir = seed_scenario()?;
    for name in ["000001.placement", "000002.placement", "000004.placement"] {
        write(temp_dir.path(), name, "whom  place  block\n")?;
    }
    let engine = engine(temp_dir.path(), ReusePolicy::Exclusive);

    let outcome = engine.run_next()?;

    assert_eq!(outcome.round.number, 5);
    assert!(temp_dir.path().join("000005.placement").exists());
    assert!(!temp_dir.path().join("000003.placement").exists());

    Ok(())
}

#[test]
fn test_dry_run_leaves_directory_untouched() -> Result<()> {
    let temp_dir = seed_scenario()?;
    let engine = engine(temp_dir.path(), ReusePolicy::Exclusive);

    let round = engine.plan_next()?;

    assert_eq!(round.number, 1);
    assert_eq!(round.placements.len(), 2);
    assert!(engine.store().round_numbers()?.is_empty());

    Ok(())
}

#[test]
fn test_successive_rounds_rotate_the_hard_place() -> Result<()> {
    let temp_dir = seed_scenario()?;
    let engine = engine(temp_dir.path(), ReusePolicy::Exclusive);

    let first = engine.run_next()?;
    let second = engine.run_next()?;
    let third = engine.run_next()?;

    let hardest_taker = |round: &placer::domain::model::Round| round.placements[0].candidate.id;
    assert_eq!(hardest_taker(&first.round), 1);
    assert_eq!(hardest_taker(&second.round), 2);
    // 1 -> 10, 2 -> 15, 3 -> 8
    assert_eq!(hardest_taker(&third.round), 3);

    assert_eq!(engine.store().round_numbers()?, vec![1, 2, 3]);

    Ok(())
}

#[test]
fn test_insufficient_candidates_writes_nothing() -> Result<()> {
    let temp_dir = seed_scenario()?;
    write(temp_dir.path(), "blocks", "id slots desc\n100 1 X\n200 1 Y\n")?;
    let engine = engine(temp_dir.path(), ReusePolicy::Exclusive);

    match engine.run_next() {
        Err(PlacerError::InsufficientCandidates {
            required,
            available,
        }) => {
            assert_eq!(required, 4);
            assert_eq!(available, 3);
        }
        other => panic!("expected InsufficientCandidates, got {:?}", other),
    }
    assert!(engine.store().round_numbers()?.is_empty());

    // the same roster works when candidates may take several slots
    let engine = self::engine(temp_dir.path(), ReusePolicy::RoundRobin);
    let outcome = engine.run_next()?;
    assert_eq!(outcome.round.placements.len(), 4);

    Ok(())
}

#[test]
fn test_removed_candidate_with_history_is_fatal() -> Result<()> {
    let temp_dir = seed_scenario()?;
    let engine = engine(temp_dir.path(), ReusePolicy::Exclusive);
    engine.run_next()?;

    // candidate 1 took place A in round 1
    write(temp_dir.path(), "candidates", "id\n2\n3\n")?;

    let err = engine.summary().unwrap_err();
    assert!(matches!(err, PlacerError::UnknownCandidate { id: 1 }));

    let err = engine.run_next().unwrap_err();
    assert!(matches!(err, PlacerError::UnknownCandidate { id: 1 }));
    assert_eq!(engine.store().round_numbers()?, vec![1]);

    Ok(())
}

#[test]
fn test_adjustment_for_unknown_candidate_is_fatal() -> Result<()> {
    let temp_dir = seed_scenario()?;
    write(temp_dir.path(), "late.extra", "whom extra\n9 -4\n")?;
    let engine = engine(temp_dir.path(), ReusePolicy::Exclusive);

    let err = engine.summary().unwrap_err();
    assert!(matches!(err, PlacerError::UnknownCandidate { id: 9 }));

    Ok(())
}

#[test]
fn test_reports_for_summary_and_show() -> Result<()> {
    let temp_dir = seed_scenario()?;
    let engine = engine(temp_dir.path(), ReusePolicy::Exclusive);
    engine.run_next()?;

    let ledger_text = render_ledger(&engine.summary()?, ReportFormat::Text)?;
    assert_eq!(
        ledger_text,
        "  whom score\n     1    10\n     2     5\n     3     5\n"
    );

    let shown = engine.show_round(None)?;
    assert_eq!(shown.number, 1);

    let csv = render_round(&shown, ReportFormat::Csv)?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[1], "1,1,A,100,X,10");
    assert_eq!(lines[2], "3,2,B,100,X,3");

    let json: serde_json::Value = serde_json::from_str(&render_round(&shown, ReportFormat::Json)?)?;
    assert_eq!(json["round"], 1);
    assert_eq!(json["placements"].as_array().map(|a| a.len()), Some(2));

    Ok(())
}

#[test]
fn test_custom_layout() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();
    write(dir, "people", "id\n7\n8\n")?;
    write(dir, "duties", "id hardness desc\n1 4 night watch\n")?;
    write(dir, "shifts", "id slots desc\n1 2 weekend\n")?;
    write(dir, "bonus.adj", "whom extra\n7 3\n")?;

    let layout = StoreLayout {
        candidates_file: "people".to_string(),
        blocks_file: "shifts".to_string(),
        places_file: "duties".to_string(),
        placement_extension: "round".to_string(),
        adjustment_extension: "adj".to_string(),
    };
    let engine = PlacerEngine::new(DirectoryStore::new(dir, layout));

    let outcome = engine.run_next()?;
    let ids: Vec<i64> = outcome.round.placements.iter().map(|p| p.candidate.id).collect();
    assert_eq!(ids, vec![8, 7]);
    assert!(dir.join("000001.round").exists());

    let ledger = engine.summary()?;
    assert_eq!(ledger.score(Candidate::new(7)), Some(7));
    assert_eq!(ledger.score(Candidate::new(8)), Some(4));

    Ok(())
}
