use std::fmt::Write;

use log::debug;
use serde::Serialize;
use serde_json::{json, Value};
use snafu::ResultExt;

use crate::errors::{CustomResult, SerializeContextSnafu};
use crate::models::RacedayId;
use crate::modules::analysis::comparative::ComparativeAnalysis;
use crate::modules::analysis::consistency::ConsistencyAnalyzer;
use crate::modules::analysis::costly_mistake::CostlyMistakeAnalyzer;
use crate::modules::helpers::math::Math;
use crate::modules::session::{AnalysisSession, RacedaySnapshot};

const PREAMBLE: &str = "You are an expert race data analyst named RaceKit. The user has provided you with several data sets from a race. Analyze this data to answer the user's questions. Format your answers clearly using Markdown (headers, lists, tables, bold text).\n\n";

const TWO_RACEDAYS: &str = "IMPORTANT: You have data for TWO racedays (RD1 and RD2) and a 'Comparative' analysis. When the user asks a question, first determine if they are asking about RD1, RD2, or a comparison. Use the correct data set.\n\n";

const SINGLE_RACEDAY: &str = "You have data for a single raceday (RD1). All data provided is for this single event.\n\n";

/// # chat context
/// renders the computed analysis as the text an assistant gets before the
/// user's questions. lap and sector times keep 3 decimals, pit times 1.
pub struct ChatContext {}

impl ChatContext {
    pub fn build(session: &AnalysisSession) -> CustomResult<String> {
        let mut context = String::from(PREAMBLE);
        context.push_str(if session.is_comparison() {
            TWO_RACEDAYS
        } else {
            SINGLE_RACEDAY
        });

        for id in RacedayId::all() {
            if let Ok(snapshot) = session.snapshot(id) {
                ChatContext::raceday_sections(&mut context, snapshot)?;
            }
        }

        if let Some(Ok(comparative)) = session.comparative() {
            ChatContext::comparative_sections(&mut context, comparative)?;
        }

        debug!(target:"chat_context:build", "Built a chat context of {} characters", context.len());
        Ok(context)
    }

    fn section<T: Serialize>(context: &mut String, title: &str, rows: &T) -> CustomResult<()> {
        let body = serde_json::to_string_pretty(rows).context(SerializeContextSnafu)?;
        // writing to a String cannot fail
        let _ = write!(context, "--- {} ---\n{}\n\n", title, body);
        Ok(())
    }

    fn raceday_sections(context: &mut String, snapshot: &RacedaySnapshot) -> CustomResult<()> {
        let short = snapshot.id.short();
        let _ = write!(context, "=== [START] {} ({}) Data ===\n\n", snapshot.id, short);

        let core: Vec<Value> = snapshot
            .baseline
            .iter()
            .map(|driver| {
                let sector = |index: usize| {
                    let average = driver.sector_averages[index];
                    Math::fixed(Some(average).filter(|value| *value > 0.0), 3)
                };
                json!({
                    "Position": driver.position,
                    "Driver": driver.number,
                    "Avg_S1": sector(0),
                    "Avg_S2": sector(1),
                    "Avg_S3": sector(2),
                    "PitStops": driver.pit_stops,
                    "TotalPitTime": Math::fixed(Some(driver.total_pit_time), 1),
                })
            })
            .collect();
        ChatContext::section(context, &format!("{} Core Driver Analysis (Filtered Laps)", short), &core)?;

        if let Ok(pace) = &snapshot.theoretical_pace {
            let rows: Vec<Value> = pace
                .entries
                .iter()
                .map(|entry| {
                    json!({
                        "Driver": entry.number,
                        "ActualPosition": entry.actual_position.map_or("N/A".to_string(), |p| p.to_string()),
                        "TheoreticalRank": entry.theoretical_rank,
                        "BestLapTime_s": Math::fixed(Some(entry.best_lap_time), 3),
                        "TheoreticalRaceTime_s": Math::fixed(Some(entry.theoretical_race_time), 0),
                    })
                })
                .collect();
            ChatContext::section(context, &format!("{} Theoretical Best Lap Race Analysis", short), &rows)?;
        }

        let consistency: Vec<Value> = ConsistencyAnalyzer::ranked(&snapshot.consistency)
            .into_iter()
            .map(|entry| {
                json!({
                    "Driver": entry.number,
                    "Position": entry.position,
                    "ConsistencyGap_s": Math::fixed(entry.gap, 3),
                    "AvgLapTime_s": Math::fixed(entry.average_lap_time, 3),
                    "BestLapTime_s": Math::fixed(entry.best_lap_time, 3),
                })
            })
            .collect();
        ChatContext::section(context, &format!("{} Consistency Gap Analysis", short), &consistency)?;

        let mistakes: Vec<Value> = CostlyMistakeAnalyzer::ranked(&snapshot.costly_mistakes)
            .into_iter()
            .map(|(entry, worst_lap)| {
                json!({
                    "Driver": entry.number,
                    "Position": entry.position,
                    "WorstLapDelta_s": Math::fixed(Some(worst_lap.delta), 3),
                    "WorstLapTime_s": Math::fixed(Some(worst_lap.worst), 3),
                    "AvgLapTime_s": Math::fixed(Some(worst_lap.average), 3),
                })
            })
            .collect();
        ChatContext::section(context, &format!("{} Costly Mistake Analysis", short), &mistakes)?;

        let pit_stops: Vec<Value> = snapshot
            .pit_stops
            .iter()
            .map(|entry| {
                json!({
                    "Driver": entry.number,
                    "Position": entry.position,
                    "PitStops": entry.pit_stops,
                    "TotalPitTime_s": Math::fixed(Some(entry.total_pit_time), 1),
                })
            })
            .collect();
        ChatContext::section(context, &format!("{} Pit Stop Analysis", short), &pit_stops)?;

        let _ = write!(context, "=== [END] {} ({}) Data ===\n\n", snapshot.id, short);
        Ok(())
    }

    fn comparative_sections(context: &mut String, comparative: &ComparativeAnalysis) -> CustomResult<()> {
        context.push_str("=== [START] Comparative (RD1 vs. RD2) Data ===\n\n");
        let round = |value: f64| Math::round_float_to_n_decimals(value, 3);

        let pace: Vec<Value> = comparative
            .pace_evolution
            .iter()
            .map(|delta| {
                json!({
                    "Driver": delta.number,
                    "RD1_AvgLap_s": round(delta.rd1),
                    "RD2_AvgLap_s": round(delta.rd2),
                    "Delta_s": round(delta.delta),
                })
            })
            .collect();
        ChatContext::section(context, "Pace Evolution (RD2 Avg Lap - RD1 Avg Lap)", &pace)?;

        let consistency: Vec<Value> = comparative
            .consistency_delta
            .iter()
            .map(|delta| {
                json!({
                    "Driver": delta.number,
                    "RD1_Gap_s": round(delta.rd1),
                    "RD2_Gap_s": round(delta.rd2),
                    "Delta_s": round(delta.delta),
                })
            })
            .collect();
        ChatContext::section(context, "Consistency Delta (RD2 Gap - RD1 Gap)", &consistency)?;

        let racecraft: Vec<Value> = comparative
            .racecraft_delta
            .iter()
            .map(|delta| {
                json!({
                    "Driver": delta.number,
                    "RD1_Score": delta.rd1,
                    "RD2_Score": delta.rd2,
                    "Delta": delta.delta,
                })
            })
            .collect();
        ChatContext::section(context, "Racecraft Delta (RD2 Score - RD1 Score)", &racecraft)?;

        let quadrant: Vec<Value> = comparative
            .pace_quadrant
            .iter()
            .map(|point| {
                json!({
                    "Driver": point.number,
                    "BestLapDelta_s": round(point.best_lap_delta),
                    "AvgLapDelta_s": round(point.average_lap_delta),
                    "Quadrant": point.quadrant.to_string(),
                })
            })
            .collect();
        ChatContext::section(context, "Pace Quadrant (x: BestLapDelta, y: AvgLapDelta)", &quadrant)?;

        context.push_str("=== [END] Comparative (RD1 vs. RD2) Data ===\n\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawLapRow, RawResultRow};
    use crate::modules::session::{AnalysisSettings, RacedayData};

    fn raceday(best_lap: &str) -> RacedayData {
        let result = RawResultRow {
            pos: "1".to_string(),
            number: "5".to_string(),
            elapsed: "4:30.0".to_string(),
            laps: "3".to_string(),
            best_lap_time: best_lap.to_string(),
            best_lap_kph: "120".to_string(),
        };
        let laps: Vec<RawLapRow> = (1..=3)
            .map(|lap_number| RawLapRow {
                number: "5".to_string(),
                flag_at_fl: "GF".to_string(),
                s1_seconds: "30.0".to_string(),
                s2_seconds: "30.0".to_string(),
                s3_seconds: "30.0".to_string(),
                pit_time: String::new(),
                lap_number: lap_number.to_string(),
                lap_time: "1:30.0".to_string(),
            })
            .collect();
        RacedayData::from_raw(&[result], &laps)
    }

    #[test]
    fn test_single_raceday_context() {
        let mut session = AnalysisSession::new(AnalysisSettings::default());
        session.load(RacedayId::Rd1, raceday("1:30.0"));
        session.run().unwrap();

        let context = ChatContext::build(&session).unwrap();
        assert!(context.starts_with(PREAMBLE));
        assert!(context.contains(SINGLE_RACEDAY));
        assert!(context.contains("=== [START] Raceday 1 (RD1) Data ==="));
        assert!(context.contains("--- RD1 Core Driver Analysis (Filtered Laps) ---"));
        assert!(context.contains("\"Avg_S1\": \"30.000\""));
        assert!(context.contains("\"TheoreticalRaceTime_s\": \"270\""));
        assert!(!context.contains("Comparative (RD1 vs. RD2)"));
    }

    #[test]
    fn test_core_section_follows_the_analyzers() {
        use crate::modules::models::lap::LapFilter;

        let mut session = AnalysisSession::new(AnalysisSettings::default());
        session.load(RacedayId::Rd1, raceday("1:30.0"));
        session.run().unwrap();
        let clean = ChatContext::build(&session).unwrap();

        // no lap has the SC flag, the driver table is left without sector data
        session.set_filter(LapFilter::new(["SC"], true).unwrap()).unwrap();
        let snapshot = session.snapshot(RacedayId::Rd1).unwrap();
        assert_eq!(snapshot.drivers.get("5").unwrap().sector_averages, [0.0; 3]);

        let filtered = ChatContext::build(&session).unwrap();
        assert!(filtered.contains("\"Avg_S1\": \"30.000\""));
        assert_eq!(clean, filtered);
    }

    #[test]
    fn test_two_raceday_context() {
        let mut session = AnalysisSession::new(AnalysisSettings::default());
        session.load(RacedayId::Rd1, raceday("1:29.5"));
        session.load(RacedayId::Rd2, raceday("1:29.0"));
        session.run().unwrap();

        let context = ChatContext::build(&session).unwrap();
        assert!(context.contains(TWO_RACEDAYS));
        assert!(context.contains("=== [END] Raceday 2 (RD2) Data ==="));
        assert!(context.contains("--- Racecraft Delta (RD2 Score - RD1 Score) ---"));
        assert!(context.ends_with("=== [END] Comparative (RD1 vs. RD2) Data ===\n\n"));
    }
}
