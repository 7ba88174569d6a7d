use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, Error};
use crate::models::RawResultRow;
use crate::modules::helpers::time::{parse_float, parse_integer, parse_time_to_seconds};

/// the official classification of one car in one raceday
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct RaceResult {
    pub driver_number: String,
    pub position: Option<u32>,
    pub laps: Option<u32>,
    pub elapsed: Option<f64>,
    pub best_lap_time: Option<f64>,
    pub best_lap_kph: Option<f64>,
}

impl RaceResult {
    pub fn from_raw(raw: &RawResultRow) -> RaceResult {
        RaceResult {
            driver_number: raw.number.trim().to_string(),
            position: parse_integer(&raw.pos).and_then(|n| u32::try_from(n).ok()),
            laps: parse_integer(&raw.laps).and_then(|n| u32::try_from(n).ok()),
            elapsed: parse_time_to_seconds(&raw.elapsed),
            best_lap_time: parse_time_to_seconds(&raw.best_lap_time),
            best_lap_kph: parse_float(&raw.best_lap_kph),
        }
    }

    pub fn from_raw_rows(rows: &[RawResultRow]) -> Vec<RaceResult> {
        rows.iter().map(RaceResult::from_raw).collect()
    }

    /// a row that can be analyzed: it has a position and a car number
    pub fn is_classified(&self) -> bool {
        self.position.is_some() && !self.driver_number.is_empty()
    }

    /// the best lap if it was recorded and positive
    pub fn valid_best_lap(&self) -> Option<f64> {
        self.best_lap_time.filter(|time| *time > 0.0)
    }

    /// # get the lap count of the winner
    /// the largest lap count in the results, this is the distance of the race
    ///
    /// ## Returns
    /// * `u32` - the lap count, `NoValidLapCount` when no row has a positive lap count
    pub fn winner_lap_count(results: &[RaceResult]) -> CustomResult<u32> {
        results
            .iter()
            .filter_map(|result| result.laps)
            .filter(|laps| *laps > 0)
            .max()
            .ok_or(Error::NoValidLapCount)
    }

    /// the longest positive official elapsed time in the results
    pub fn max_official_elapsed(results: &[RaceResult]) -> Option<f64> {
        results
            .iter()
            .filter_map(|result| result.elapsed)
            .filter(|elapsed| *elapsed > 0.0)
            .reduce(f64::max)
    }

    /// best lap per driver, later rows overwrite earlier ones for the same car
    pub fn best_lap_of(results: &[RaceResult], number: &str) -> Option<f64> {
        results
            .iter()
            .rev()
            .find(|result| result.driver_number == number)
            .and_then(|result| result.best_lap_time)
    }
}
