use serde::{Deserialize, Serialize};

use crate::modules::models::driver::DriverTable;
use crate::modules::models::race_result::RaceResult;

/// a gap below this many seconds is a solid, reliable performance
pub const SOLID_GAP_THRESHOLD: f64 = 1.2;

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub enum ConsistencyClass {
    Solid,
    NoticeableGap,
}

impl ConsistencyClass {
    pub fn from_gap(gap: f64) -> ConsistencyClass {
        if gap < SOLID_GAP_THRESHOLD {
            ConsistencyClass::Solid
        } else {
            ConsistencyClass::NoticeableGap
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct ConsistencyEntry {
    pub number: String,
    pub position: u32,
    pub pit_stops: u32,
    pub average_lap_time: Option<f64>,
    pub best_lap_time: Option<f64>,
    /// average lap minus best lap, `None` when either side is missing
    pub gap: Option<f64>,
}

impl ConsistencyEntry {
    pub fn class(&self) -> Option<ConsistencyClass> {
        self.gap.map(ConsistencyClass::from_gap)
    }
}

pub struct ConsistencyAnalyzer {}

impl ConsistencyAnalyzer {
    /// # compute the consistency gap of every driver
    /// the average lap is the sum of the sector averages and needs all three sectors,
    /// the best lap comes from the results.
    ///
    /// ## Returns
    /// * `Vec<ConsistencyEntry>` - every driver of the table in finishing order
    pub fn analyze(drivers: &DriverTable, results: &[RaceResult]) -> Vec<ConsistencyEntry> {
        drivers
            .iter()
            .map(|driver| {
                let average_lap_time = driver.average_lap_time();
                let best_lap_time = RaceResult::best_lap_of(results, &driver.number)
                    .filter(|best| *best > 0.0);
                let gap = match (average_lap_time, best_lap_time) {
                    (Some(average), Some(best)) => Some(average - best),
                    _ => None,
                };

                ConsistencyEntry {
                    number: driver.number.clone(),
                    position: driver.position,
                    pit_stops: driver.pit_stops,
                    average_lap_time,
                    best_lap_time,
                    gap,
                }
            })
            .collect()
    }

    /// drivers with a gap, most consistent first
    pub fn ranked(entries: &[ConsistencyEntry]) -> Vec<&ConsistencyEntry> {
        let mut ranked: Vec<(&ConsistencyEntry, f64)> = entries
            .iter()
            .filter_map(|entry| entry.gap.map(|gap| (entry, gap)))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.into_iter().map(|(entry, _)| entry).collect()
    }

    pub fn get<'a>(entries: &'a [ConsistencyEntry], number: &str) -> Option<&'a ConsistencyEntry> {
        entries.iter().find(|entry| entry.number == number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::models::driver::DriverAnalysis;

    fn driver(number: &str, position: u32, sectors: [f64; 3]) -> DriverAnalysis {
        DriverAnalysis {
            number: number.to_string(),
            position,
            sector_averages: sectors,
            pit_stops: 0,
            total_pit_time: 0.0,
            official_elapsed_time: None,
            sector_deviation: [None; 3],
        }
    }

    fn result(number: &str, best: f64) -> RaceResult {
        RaceResult {
            driver_number: number.to_string(),
            position: Some(1),
            laps: Some(10),
            elapsed: None,
            best_lap_time: Some(best),
            best_lap_kph: None,
        }
    }

    #[test]
    fn test_driver_without_clean_laps_is_not_ranked() {
        let table = DriverTable::new(vec![
            driver("5", 1, [30.0, 31.0, 30.0]),
            driver("7", 2, [0.0, 0.0, 0.0]),
            driver("9", 3, [30.0, 30.0, 30.0]),
        ]);
        let results = vec![result("5", 89.0), result("7", 88.0), result("9", 89.5)];
        let entries = ConsistencyAnalyzer::analyze(&table, &results);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].gap, None);
        assert_eq!(entries[1].class(), None);

        let ranked: Vec<&str> = ConsistencyAnalyzer::ranked(&entries)
            .iter()
            .map(|entry| entry.number.as_str())
            .collect();
        assert_eq!(ranked, vec!["9", "5"]);
        assert_eq!(entries[0].gap, Some(2.0));
        assert_eq!(entries[0].class(), Some(ConsistencyClass::NoticeableGap));
        assert_eq!(entries[2].class(), Some(ConsistencyClass::Solid));
    }

    #[test]
    fn test_gap_threshold() {
        assert_eq!(ConsistencyClass::from_gap(1.199), ConsistencyClass::Solid);
        assert_eq!(ConsistencyClass::from_gap(1.2), ConsistencyClass::NoticeableGap);
    }
}
