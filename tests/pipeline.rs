use std::path::{Path, PathBuf};

use raceday_analytics::errors::Error;
use raceday_analytics::models::RacedayId;
use raceday_analytics::modules::analysis::comparative::PaceQuadrant;
use raceday_analytics::modules::analysis::consistency::ConsistencyAnalyzer;
use raceday_analytics::modules::analysis::costly_mistake::CostlyMistakeAnalyzer;
use raceday_analytics::modules::chat_context::ChatContext;
use raceday_analytics::modules::csv_import::CsvImporter;
use raceday_analytics::modules::models::lap::LapFilter;
use raceday_analytics::modules::session::{AnalysisSession, AnalysisSettings};

const EPSILON: f64 = 1e-9;

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {}, got {}",
        expected,
        actual
    );
}

fn session(with_rd2: bool) -> AnalysisSession {
    let importer = CsvImporter::default();
    let mut session = AnalysisSession::new(AnalysisSettings::default());
    session.load(
        RacedayId::Rd1,
        importer
            .load_raceday(&data("rd1_results.csv"), &data("rd1_laps.csv"))
            .unwrap(),
    );
    if with_rd2 {
        session.load(
            RacedayId::Rd2,
            importer
                .load_raceday(&data("rd2_results.csv"), &data("rd2_laps.csv"))
                .unwrap(),
        );
    }
    session.run().unwrap();
    session
}

#[test]
fn test_driver_table() {
    let session = session(false);
    let snapshot = session.snapshot(RacedayId::Rd1).unwrap();

    // the DNF row has no position
    assert_eq!(snapshot.drivers.numbers(), vec!["5", "7", "12", "3"]);
    assert_close(snapshot.max_official_race_time.unwrap(), 751.0);

    let five = snapshot.baseline.get("5").unwrap();
    assert_close(five.sector_averages[1], (3.0 * 29.5 + 4.0 * 30.0) / 7.0);
    assert_close(five.sector_averages[2], 30.0);
    assert_eq!(five.pit_stops, 1);
    assert_close(five.total_pit_time, 25.0);

    // no clean lap at all
    let three = snapshot.baseline.get("3").unwrap();
    assert_eq!(three.sector_averages, [0.0; 3]);
    assert_eq!(three.sector_deviation, [None; 3]);
}

#[test]
fn test_filter_with_pit_laps() {
    let mut session = session(false);
    session
        .set_filter(LapFilter::new(["GF", "FCY"], false).unwrap())
        .unwrap();
    let snapshot = session.snapshot(RacedayId::Rd1).unwrap();

    let five = snapshot.drivers.get("5").unwrap();
    assert_close(five.sector_averages[2], (3.0 * 30.0 + 55.0 + 4.0 * 30.0) / 8.0);
    assert_eq!(snapshot.drivers.get("3").unwrap().sector_averages, [32.0; 3]);
    // analyzers keep reading the clean baseline
    assert_close(snapshot.baseline.get("5").unwrap().sector_averages[2], 30.0);

    assert!(matches!(
        LapFilter::new(Vec::<String>::new(), false),
        Err(Error::NoFlagsSelected)
    ));
}

#[test]
fn test_theoretical_pace_and_racecraft() {
    let session = session(false);
    let snapshot = session.snapshot(RacedayId::Rd1).unwrap();
    let pace = snapshot.theoretical_pace.as_ref().unwrap();

    assert_eq!(pace.winner_laps, 8);
    let ranking: Vec<(&str, u32)> = pace
        .entries
        .iter()
        .map(|entry| (entry.number.as_str(), entry.theoretical_rank))
        .collect();
    assert_eq!(ranking, vec![("7", 1), ("5", 2), ("12", 3), ("3", 4), ("44", 5)]);

    assert_close(pace.get("7").unwrap().theoretical_race_time, 708.0);
    assert_eq!(pace.racecraft_of("5"), Some(1));
    assert_eq!(pace.racecraft_of("7"), Some(-1));
    assert_eq!(pace.racecraft_of("44"), None);
}

#[test]
fn test_consistency_and_mistakes() {
    let session = session(false);
    let snapshot = session.snapshot(RacedayId::Rd1).unwrap();

    let ranked: Vec<&str> = ConsistencyAnalyzer::ranked(&snapshot.consistency)
        .iter()
        .map(|entry| entry.number.as_str())
        .collect();
    assert_eq!(ranked, vec!["5", "7", "12"]);
    let twelve = ConsistencyAnalyzer::get(&snapshot.consistency, "12").unwrap();
    assert_close(twelve.gap.unwrap(), 2.75);
    assert_eq!(ConsistencyAnalyzer::get(&snapshot.consistency, "3").unwrap().gap, None);

    let mistakes = CostlyMistakeAnalyzer::ranked(&snapshot.costly_mistakes);
    let order: Vec<&str> = mistakes.iter().map(|(entry, _)| entry.number.as_str()).collect();
    assert_eq!(order, vec!["5", "7", "12"]);
    let (_, costliest) = mistakes[2];
    assert_close(costliest.worst, 100.0);
    assert_close(costliest.delta, 7.25);
}

#[test]
fn test_pace_degradation_quarters() {
    let session = session(false);
    let snapshot = session.snapshot(RacedayId::Rd1).unwrap();
    let paces = snapshot.pace_degradation.as_ref().unwrap();

    // #3 never drove a clean lap
    let numbers: Vec<&str> = paces.iter().map(|pace| pace.number.as_str()).collect();
    assert_eq!(numbers, vec!["5", "7", "12"]);

    assert_close(paces[0].degradation_delta().unwrap(), 0.5);
    assert_eq!(paces[0].pit_quarter, 2);
    assert_close(paces[1].degradation_delta().unwrap(), 3.0);
    assert_close(paces[2].averages[2].unwrap(), 95.0);
    assert_close(paces[2].degradation_delta().unwrap(), -3.0);

    let custom = session
        .pace_degradation(RacedayId::Rd1, &["12".to_string()])
        .unwrap();
    assert_eq!(custom.len(), 1);
    assert!(session.pace_degradation(RacedayId::Rd1, &[]).unwrap().is_empty());
}

#[test]
fn test_sector_fingerprint() {
    let session = session(false);
    let profile = session.sector_profile(RacedayId::Rd1, "7").unwrap();
    assert_close(profile.performance[0], 29.5 / 30.0 * 100.0);
    assert!(!profile.is_all_rounder());

    assert!(matches!(
        session.sector_profile(RacedayId::Rd1, "3"),
        Err(Error::InsufficientData { .. })
    ));
}

#[test]
fn test_comparative_analysis() {
    let session = session(true);
    let analysis = session.comparative().unwrap().as_ref().unwrap();
    assert_eq!(analysis.common_drivers, vec!["5", "7", "12"]);

    let pace: Vec<&str> = analysis
        .pace_evolution
        .iter()
        .map(|delta| delta.number.as_str())
        .collect();
    assert_eq!(pace, vec!["7", "5", "12"]);
    assert_close(analysis.pace_evolution[0].delta, 88.8 - 90.0);

    let consistency: Vec<&str> = analysis
        .consistency_delta
        .iter()
        .map(|delta| delta.number.as_str())
        .collect();
    assert_eq!(consistency, vec!["7", "5", "12"]);

    let racecraft: Vec<(&str, i64)> = analysis
        .racecraft_delta
        .iter()
        .map(|delta| (delta.number.as_str(), delta.delta))
        .collect();
    assert_eq!(racecraft, vec![("7", 2), ("12", 0), ("5", -2)]);

    assert_eq!(analysis.quadrant_members(PaceQuadrant::TrueImprover), vec!["5"]);
    assert_eq!(analysis.quadrant_members(PaceQuadrant::MaximizedPackage), vec!["7"]);
    assert_eq!(analysis.quadrant_members(PaceQuadrant::LostSetup), vec!["12"]);
    assert!(analysis.quadrant_members(PaceQuadrant::HeroOrZero).is_empty());

    let evolution = session.sector_profile_evolution("12").unwrap();
    assert_eq!(evolution.position_rd2, 3);
    assert!(matches!(
        session.sector_profile_evolution("21"),
        Err(Error::InsufficientData { .. })
    ));
}

#[test]
fn test_runs_are_repeatable() {
    let mut session = session(true);
    let first = ChatContext::build(&session).unwrap();
    session.run().unwrap();
    let second = ChatContext::build(&session).unwrap();
    assert_eq!(first, second);
    assert!(first.contains("--- RD2 Pit Stop Analysis ---"));
}
