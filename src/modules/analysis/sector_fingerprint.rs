use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, Error};
use crate::modules::helpers::math::Math;
use crate::modules::models::lap::Lap;

/// a driver who reaches more than this percentage of the field best in every
/// sector is an all-rounder
pub const ALL_ROUNDER_THRESHOLD: f64 = 99.0;

/// field best sector times and the clean sector times of every driver
#[derive(Debug, Clone, PartialEq)]
pub struct SectorField {
    pub field_best: [Option<f64>; 3],
    driver_sectors: HashMap<String, [Vec<f64>; 3]>,
}

impl SectorField {
    /// # collect the clean sector times of the whole field
    /// fails with `NoValidSectorData` when no clean lap has a sector 1 time
    pub fn build(laps: &[Lap], clean_flag: &str) -> CustomResult<SectorField> {
        let mut field_best: [Option<f64>; 3] = [None; 3];
        let mut driver_sectors: HashMap<String, [Vec<f64>; 3]> = HashMap::new();

        for lap in laps.iter().filter(|lap| lap.is_clean(clean_flag)) {
            let sectors = driver_sectors
                .entry(lap.driver_number.clone())
                .or_insert_with(|| [Vec::new(), Vec::new(), Vec::new()]);

            for (sector, best) in field_best.iter_mut().enumerate() {
                if let Some(time) = lap.valid_sector(sector) {
                    *best = Math::min_positive(*best, Some(time));
                    sectors[sector].push(time);
                }
            }
        }

        if field_best[0].is_none() {
            return Err(Error::NoValidSectorData);
        }

        debug!(target:"analysis/sector_fingerprint:build", "Field best sectors {:?} over {} drivers", field_best, driver_sectors.len());
        Ok(SectorField {
            field_best,
            driver_sectors,
        })
    }

    /// the sector profile of a driver, `None` when they drove no clean lap
    pub fn profile(&self, number: &str) -> Option<SectorProfile> {
        let sectors = self.driver_sectors.get(number)?;

        let mut averages = [0.0; 3];
        let mut performance = [0.0; 3];
        for sector in 0..3 {
            averages[sector] = Math::mean(&sectors[sector]);
            performance[sector] = match self.field_best[sector] {
                Some(best) if averages[sector] > 0.0 => best / averages[sector] * 100.0,
                _ => 0.0,
            };
        }

        Some(SectorProfile {
            number: number.to_string(),
            averages,
            performance,
        })
    }

    pub fn require_profile(&self, number: &str) -> CustomResult<SectorProfile> {
        self.profile(number).ok_or_else(|| Error::InsufficientData {
            number: number.to_string(),
            analysis: "sector fingerprint",
        })
    }
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct SectorProfile {
    pub number: String,
    /// average clean sector times, 0 for a sector without data
    pub averages: [f64; 3],
    /// field best divided by the driver average, as a percentage. 0 when unknown
    pub performance: [f64; 3],
}

impl SectorProfile {
    pub fn zero(number: &str) -> SectorProfile {
        SectorProfile {
            number: number.to_string(),
            averages: [0.0; 3],
            performance: [0.0; 3],
        }
    }

    /// sector indexes from strongest to weakest, ties keep the sector order
    pub fn ranked_sectors(&self) -> [usize; 3] {
        let mut order = [0, 1, 2];
        order.sort_by(|a, b| self.performance[*b].total_cmp(&self.performance[*a]));
        order
    }

    pub fn strongest(&self) -> usize {
        self.ranked_sectors()[0]
    }

    pub fn weakest(&self) -> usize {
        self.ranked_sectors()[2]
    }

    pub fn is_all_rounder(&self) -> bool {
        self.performance[self.strongest()] > ALL_ROUNDER_THRESHOLD
            && self.performance[self.weakest()] > ALL_ROUNDER_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::models::lap::GREEN_FLAG;

    fn lap(number: &str, flag: &str, sectors: [f64; 3], pit: Option<f64>) -> Lap {
        Lap {
            driver_number: number.to_string(),
            lap_number: Some(1),
            flag: flag.to_string(),
            lap_time: None,
            sectors: sectors.map(Some),
            pit_time: pit,
        }
    }

    #[test]
    fn test_profile_against_field_best() {
        let laps = vec![
            lap("5", GREEN_FLAG, [20.0, 30.0, 40.0], None),
            lap("5", GREEN_FLAG, [20.0, 30.0, 40.0], None),
            lap("7", GREEN_FLAG, [25.0, 30.0, 0.0], None),
            lap("7", GREEN_FLAG, [15.0, 30.0, 0.0], Some(10.0)),
            lap("9", "FCY", [10.0, 10.0, 10.0], None),
        ];
        let field = SectorField::build(&laps, GREEN_FLAG).unwrap();
        assert_eq!(field.field_best, [Some(20.0), Some(30.0), Some(40.0)]);

        let five = field.profile("5").unwrap();
        assert_eq!(five.performance, [100.0, 100.0, 100.0]);
        assert!(five.is_all_rounder());

        let seven = field.profile("7").unwrap();
        assert!((seven.performance[0] - 80.0).abs() < 1e-9);
        assert_eq!(seven.performance[1..], [100.0, 0.0]);
        assert_eq!(seven.strongest(), 1);
        assert_eq!(seven.weakest(), 2);
        assert!(!seven.is_all_rounder());

        assert!(field.profile("9").is_none());
        assert!(field.require_profile("9").is_err());
    }

    #[test]
    fn test_no_sector_data() {
        let laps = vec![lap("5", "FCY", [20.0, 30.0, 40.0], None)];
        assert!(matches!(
            SectorField::build(&laps, GREEN_FLAG),
            Err(Error::NoValidSectorData)
        ));
    }
}
