use serde::{Deserialize, Serialize};

use crate::modules::models::driver::DriverTable;

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct PitStopEntry {
    pub number: String,
    pub position: u32,
    pub pit_stops: u32,
    pub total_pit_time: f64,
}

pub struct PitStopAnalyzer {}

impl PitStopAnalyzer {
    /// drivers with at least one pit stop, in finishing order
    pub fn summarize(drivers: &DriverTable) -> Vec<PitStopEntry> {
        drivers
            .iter()
            .filter(|driver| driver.has_pitted())
            .map(|driver| PitStopEntry {
                number: driver.number.clone(),
                position: driver.position,
                pit_stops: driver.pit_stops,
                total_pit_time: driver.total_pit_time,
            })
            .collect()
    }

    /// # most and least efficient pitters
    /// ## Returns
    /// * `(fastest, slowest)` on total pit time, the first in finishing order on a tie
    pub fn efficiency(entries: &[PitStopEntry]) -> Option<(&PitStopEntry, &PitStopEntry)> {
        let mut sorted: Vec<&PitStopEntry> = entries.iter().collect();
        sorted.sort_by(|a, b| a.total_pit_time.total_cmp(&b.total_pit_time));
        Some((*sorted.first()?, *sorted.last()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::models::driver::DriverAnalysis;

    fn driver(number: &str, position: u32, pit_stops: u32, total_pit_time: f64) -> DriverAnalysis {
        DriverAnalysis {
            number: number.to_string(),
            position,
            sector_averages: [0.0; 3],
            pit_stops,
            total_pit_time,
            official_elapsed_time: None,
            sector_deviation: [None; 3],
        }
    }

    #[test]
    fn test_summary_and_efficiency() {
        let table = DriverTable::new(vec![
            driver("5", 1, 1, 31.0),
            driver("7", 2, 0, 0.0),
            driver("9", 3, 2, 58.5),
            driver("11", 4, 1, 29.9),
        ]);
        let entries = PitStopAnalyzer::summarize(&table);
        let numbers: Vec<&str> = entries.iter().map(|e| e.number.as_str()).collect();
        assert_eq!(numbers, vec!["5", "9", "11"]);

        let (fastest, slowest) = PitStopAnalyzer::efficiency(&entries).unwrap();
        assert_eq!(fastest.number, "11");
        assert_eq!(slowest.number, "9");
        assert!(PitStopAnalyzer::efficiency(&[]).is_none());
    }
}
