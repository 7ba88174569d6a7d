use log::{error, info};

use raceday_analytics::errors::CustomResult;
use raceday_analytics::models::RacedayId;
use raceday_analytics::modules::analysis::narrative::{Insight, Narrative};
use raceday_analytics::modules::helpers::config::Config;
use raceday_analytics::modules::helpers::logging::setup_logging;
use raceday_analytics::modules::helpers::math::Math;
use raceday_analytics::modules::helpers::time::{format_optional_seconds, format_seconds};
use raceday_analytics::modules::session::{AnalysisSession, RacedaySnapshot};

fn print_insights(title: &str, insights: &[Insight]) {
    println!("{}", title);
    if insights.is_empty() {
        println!("  (no data)");
    }
    for insight in insights {
        println!("  * {}: {}", insight.headline, insight.detail);
    }
    println!();
}

fn print_raceday(session: &AnalysisSession, snapshot: &RacedaySnapshot) {
    println!("===== {} =====", snapshot.id);
    println!(
        "Official race time: {}\n",
        format_optional_seconds(snapshot.max_official_race_time)
    );

    println!("{:>4} {:>6} {:>9} {:>9} {:>9} {:>5} {:>8}", "POS", "#", "S1", "S2", "S3", "PITS", "PIT TIME");
    for driver in &snapshot.drivers {
        let sector = |index: usize| Math::fixed(Some(driver.sector_averages[index]).filter(|v| *v > 0.0), 3);
        println!(
            "{:>4} {:>6} {:>9} {:>9} {:>9} {:>5} {:>8}",
            driver.position,
            driver.number,
            sector(0),
            sector(1),
            sector(2),
            driver.pit_stops,
            Math::fixed(Some(driver.total_pit_time), 1)
        );
    }
    println!();

    match &snapshot.theoretical_pace {
        Ok(pace) => {
            println!("Theoretical pace over {} laps", pace.winner_laps);
            for entry in pace.by_position() {
                println!(
                    "  #{:<5} best {} race {} theoretical P{} racecraft {}",
                    entry.number,
                    format_seconds(entry.best_lap_time),
                    format_seconds(entry.theoretical_race_time),
                    entry.theoretical_rank,
                    entry.racecraft_score().map_or("N/A".to_string(), |score| format!("{:+}", score))
                );
            }
            println!();
            print_insights("Best lap", &Narrative::best_lap(pace));
            print_insights("Racecraft", &Narrative::performers(pace));
        }
        Err(error) => println!("Theoretical pace unavailable: {}\n", error),
    }

    print_insights("Consistency", &Narrative::consistency(&snapshot.consistency));
    print_insights("Costly mistakes", &Narrative::costly_mistakes(&snapshot.costly_mistakes));
    match &snapshot.pace_degradation {
        Ok(paces) => print_insights("Pace degradation", &Narrative::pace_degradation(paces)),
        Err(error) => println!("Pace degradation unavailable: {}\n", error),
    }
    print_insights("Pit stops", &Narrative::pit_stops(&snapshot.pit_stops));

    let fingerprints: Vec<Insight> = snapshot
        .baseline
        .iter()
        .filter_map(|driver| {
            session
                .sector_profile(snapshot.id, &driver.number)
                .ok()
                .map(|profile| Narrative::sector_fingerprint(&profile, driver.position))
        })
        .collect();
    print_insights("Sector fingerprints", &fingerprints);
}

fn print_comparison(session: &AnalysisSession) {
    let analysis = match session.comparative() {
        Some(Ok(analysis)) => analysis,
        Some(Err(error)) => {
            println!("Comparison unavailable: {}", error);
            return;
        }
        None => return,
    };

    println!("===== {} vs. {} =====", RacedayId::Rd1, RacedayId::Rd2);
    print_insights("Evolution", &Narrative::comparative(analysis));
    print_insights("Pace quadrants", &Narrative::quadrants(analysis));

    let evolutions: Vec<Insight> = analysis
        .common_drivers
        .iter()
        .filter_map(|number| session.sector_profile_evolution(number).ok())
        .map(|evolution| Narrative::sector_evolution(&evolution))
        .collect();
    print_insights("Sector profile evolution", &evolutions);
}

fn run() -> CustomResult<()> {
    let config = Config::from_env()?;
    let mut session = config.load_session()?;
    session.run()?;

    for id in RacedayId::all() {
        if let Ok(snapshot) = session.snapshot(id) {
            print_raceday(&session, snapshot);
        }
    }
    print_comparison(&session);

    info!(target:"main", "Report finished");
    Ok(())
}

fn main() {
    if let Err(error) = setup_logging() {
        eprintln!("Could not set up logging: {}", error);
    }

    if let Err(error) = run() {
        error!(target:"main", "{}", error);
        std::process::exit(1);
    }
}
