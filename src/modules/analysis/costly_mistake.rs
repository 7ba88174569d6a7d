use serde::{Deserialize, Serialize};

use crate::modules::helpers::math::Math;
use crate::modules::models::driver::DriverTable;
use crate::modules::models::lap::Lap;

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Copy)]
pub struct WorstLap {
    pub average: f64,
    pub worst: f64,
    /// time lost on the worst lap compared to the average
    pub delta: f64,
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct CostlyMistakeEntry {
    pub number: String,
    pub position: u32,
    /// `None` when the driver has no clean lap with a lap time
    pub worst_lap: Option<WorstLap>,
}

pub struct CostlyMistakeAnalyzer {}

impl CostlyMistakeAnalyzer {
    /// # find the worst clean lap of every driver
    /// only laps under `clean_flag` with a positive lap time and without a pit stop count
    pub fn analyze(drivers: &DriverTable, laps: &[Lap], clean_flag: &str) -> Vec<CostlyMistakeEntry> {
        let grouped = Lap::group_by_driver(laps);

        drivers
            .iter()
            .map(|driver| {
                let lap_times: Vec<f64> = grouped
                    .get(driver.number.as_str())
                    .map(|driver_laps| {
                        driver_laps
                            .iter()
                            .filter(|lap| lap.is_clean(clean_flag))
                            .filter_map(|lap| lap.valid_lap_time())
                            .collect()
                    })
                    .unwrap_or_default();

                CostlyMistakeEntry {
                    number: driver.number.clone(),
                    position: driver.position,
                    worst_lap: CostlyMistakeAnalyzer::worst_lap(&lap_times),
                }
            })
            .collect()
    }

    pub fn worst_lap(lap_times: &[f64]) -> Option<WorstLap> {
        let average = Math::mean_checked(lap_times)?;
        let worst = Math::max(lap_times)?;
        Some(WorstLap {
            average,
            worst,
            delta: worst - average,
        })
    }

    /// drivers with a worst lap, cleanest race first and costliest mistake last
    pub fn ranked(entries: &[CostlyMistakeEntry]) -> Vec<(&CostlyMistakeEntry, WorstLap)> {
        let mut ranked: Vec<(&CostlyMistakeEntry, WorstLap)> = entries
            .iter()
            .filter_map(|entry| entry.worst_lap.map(|worst| (entry, worst)))
            .collect();
        ranked.sort_by(|a, b| a.1.delta.total_cmp(&b.1.delta));
        ranked
    }
}
