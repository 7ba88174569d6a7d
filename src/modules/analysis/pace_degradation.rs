use std::collections::{HashMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::CustomResult;
use crate::modules::helpers::math::Math;
use crate::modules::models::driver::DriverTable;
use crate::modules::models::lap::Lap;
use crate::modules::models::race_result::RaceResult;

/// last lap number of the first three quarters of the race
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub struct QuarterBounds {
    pub q1_end: u32,
    pub q2_end: u32,
    pub q3_end: u32,
}

impl QuarterBounds {
    pub fn from_winner_laps(winner_laps: u32) -> QuarterBounds {
        let winner_laps = f64::from(winner_laps);
        QuarterBounds {
            q1_end: (winner_laps * 0.25).floor() as u32,
            q2_end: (winner_laps * 0.50).floor() as u32,
            q3_end: (winner_laps * 0.75).floor() as u32,
        }
    }

    /// the quarter (1 to 4) a lap number falls in
    pub fn quarter_of(&self, lap_number: u32) -> u8 {
        if lap_number <= self.q1_end {
            1
        } else if lap_number <= self.q2_end {
            2
        } else if lap_number <= self.q3_end {
            3
        } else {
            4
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct QuarterPace {
    pub number: String,
    pub position: u32,
    /// average clean lap time per quarter, `None` for a quarter without clean laps
    pub averages: [Option<f64>; 4],
    /// quarter of the last pit stop found in the export, 0 when the driver never pitted
    pub pit_quarter: u8,
}

impl QuarterPace {
    /// last quarter minus first quarter. positive means the driver faded
    pub fn degradation_delta(&self) -> Option<f64> {
        match (self.averages[0], self.averages[3]) {
            (Some(first), Some(last)) => Some(last - first),
            _ => None,
        }
    }
}

pub struct PaceDegradationAnalyzer {}

impl PaceDegradationAnalyzer {
    /// the drivers selected when nobody picked any: the first `count` finishers
    pub fn default_selection(drivers: &DriverTable, count: usize) -> Vec<String> {
        drivers.leading(count)
    }

    /// # split the clean laps of the selected drivers into race quarters
    ///
    /// ## Arguments
    /// * `drivers` - the drivers of the raceday, used for the positions
    /// * `results` - used for the lap count of the winner
    /// * `laps` - every lap of the raceday
    /// * `selected` - car numbers to analyze, an empty selection gives an empty result
    /// * `clean_flag` - the flag of a clean lap
    ///
    /// ## Returns
    /// * `Vec<QuarterPace>` - selected drivers with at least one clean lap, by position.
    ///   a pit lap without a lap number marks the last quarter
    pub fn analyze(
        drivers: &DriverTable,
        results: &[RaceResult],
        laps: &[Lap],
        selected: &[String],
        clean_flag: &str,
    ) -> CustomResult<Vec<QuarterPace>> {
        if selected.is_empty() {
            return Ok(Vec::new());
        }

        let bounds = QuarterBounds::from_winner_laps(RaceResult::winner_lap_count(results)?);
        let selected: HashSet<&str> = selected
            .iter()
            .map(|number| number.as_str())
            .filter(|number| drivers.contains(number))
            .collect();

        let mut buckets: HashMap<&str, [Vec<f64>; 4]> = HashMap::new();
        for lap in laps {
            if !selected.contains(lap.driver_number.as_str()) || !lap.is_clean(clean_flag) {
                continue;
            }
            let (lap_number, lap_time) = match (lap.lap_number, lap.valid_lap_time()) {
                (Some(lap_number), Some(lap_time)) => (lap_number, lap_time),
                _ => continue,
            };

            let quarter = bounds.quarter_of(lap_number);
            buckets
                .entry(lap.driver_number.as_str())
                .or_insert_with(|| [Vec::new(), Vec::new(), Vec::new(), Vec::new()])
                [usize::from(quarter - 1)]
                .push(lap_time);
        }

        // later pit laps overwrite the marker of earlier ones
        let mut pit_quarters: HashMap<&str, u8> = HashMap::new();
        for lap in laps {
            if !buckets.contains_key(lap.driver_number.as_str()) || !lap.is_pit_lap() {
                continue;
            }
            let quarter = lap.lap_number.map_or(4, |lap_number| bounds.quarter_of(lap_number));
            pit_quarters.insert(lap.driver_number.as_str(), quarter);
        }

        let paces: Vec<QuarterPace> = drivers
            .iter()
            .filter_map(|driver| {
                let quarters = buckets.get(driver.number.as_str())?;
                Some(QuarterPace {
                    number: driver.number.clone(),
                    position: driver.position,
                    averages: [
                        Math::mean_checked(&quarters[0]),
                        Math::mean_checked(&quarters[1]),
                        Math::mean_checked(&quarters[2]),
                        Math::mean_checked(&quarters[3]),
                    ],
                    pit_quarter: pit_quarters
                        .get(driver.number.as_str())
                        .copied()
                        .unwrap_or(0),
                })
            })
            .collect();

        debug!(target:"analysis/pace_degradation:analyze", "Split the laps of {} drivers into quarters ({:?})", paces.len(), bounds);
        Ok(paces)
    }
}
