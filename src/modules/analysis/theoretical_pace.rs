use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::CustomResult;
use crate::modules::models::race_result::RaceResult;

/// one driver in the theoretical race, where every lap equals the best lap
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct TheoreticalPaceEntry {
    pub number: String,
    pub actual_position: Option<u32>,
    pub best_lap_time: f64,
    /// 0 when the export has no speed for the best lap
    pub best_lap_kph: f64,
    pub theoretical_race_time: f64,
    pub theoretical_rank: u32,
}

impl TheoreticalPaceEntry {
    /// theoretical rank minus finishing position. positive means the driver
    /// finished better than their pace predicted
    pub fn racecraft_score(&self) -> Option<i64> {
        self.actual_position
            .map(|position| i64::from(self.theoretical_rank) - i64::from(position))
    }
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct TheoreticalPace {
    pub winner_laps: u32,
    /// sorted on theoretical rank
    pub entries: Vec<TheoreticalPaceEntry>,
}

impl TheoreticalPace {
    pub fn get(&self, number: &str) -> Option<&TheoreticalPaceEntry> {
        self.entries.iter().find(|entry| entry.number == number)
    }

    pub fn racecraft_of(&self, number: &str) -> Option<i64> {
        self.get(number).and_then(|entry| entry.racecraft_score())
    }

    /// the driver with the fastest best lap
    pub fn fastest_lap(&self) -> Option<&TheoreticalPaceEntry> {
        self.entries.first()
    }

    /// the driver with the highest speed on their best lap, the first one on a tie
    pub fn fastest_kph(&self) -> Option<&TheoreticalPaceEntry> {
        self.entries.iter().fold(None, |fastest, entry| match fastest {
            Some(current) if current.best_lap_kph >= entry.best_lap_kph => Some(current),
            _ => Some(entry),
        })
    }

    /// entries ordered by finishing position, unclassified drivers last
    pub fn by_position(&self) -> Vec<&TheoreticalPaceEntry> {
        let mut entries: Vec<&TheoreticalPaceEntry> = self.entries.iter().collect();
        entries.sort_by_key(|entry| entry.actual_position.unwrap_or(u32::MAX));
        entries
    }
}

pub struct TheoreticalPaceRanker {}

impl TheoreticalPaceRanker {
    /// # rank the drivers on theoretical race time
    /// theoretical race time is the best lap times the lap count of the winner.
    /// drivers without a positive best lap or without a car number are left out.
    ///
    /// ## Returns
    /// * `TheoreticalPace` - `NoValidLapCount` when the race distance is unknown
    pub fn rank(results: &[RaceResult]) -> CustomResult<TheoreticalPace> {
        let winner_laps = RaceResult::winner_lap_count(results)?;

        let mut entries: Vec<TheoreticalPaceEntry> = results
            .iter()
            .filter(|result| !result.driver_number.is_empty())
            .filter_map(|result| {
                let best_lap_time = result.valid_best_lap()?;
                Some(TheoreticalPaceEntry {
                    number: result.driver_number.clone(),
                    actual_position: result.position,
                    best_lap_time,
                    best_lap_kph: result.best_lap_kph.unwrap_or(0.0),
                    theoretical_race_time: best_lap_time * f64::from(winner_laps),
                    theoretical_rank: 0,
                })
            })
            .collect();

        // stable, so equal times keep the order of the results
        entries.sort_by(|a, b| a.theoretical_race_time.total_cmp(&b.theoretical_race_time));
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.theoretical_rank = i as u32 + 1;
        }

        debug!(target:"analysis/theoretical_pace:rank", "Ranked {} drivers over {} laps", entries.len(), winner_laps);
        Ok(TheoreticalPace {
            winner_laps,
            entries,
        })
    }
}
