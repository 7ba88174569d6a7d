use std::fmt;

use inflections::Inflect;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, Error};
use crate::models::RacedayId;
use crate::modules::analysis::consistency::{ConsistencyAnalyzer, ConsistencyEntry};
use crate::modules::analysis::sector_fingerprint::{SectorField, SectorProfile};
use crate::modules::analysis::theoretical_pace::TheoreticalPace;
use crate::modules::helpers::general::Helpers;
use crate::modules::models::driver::DriverTable;
use crate::modules::models::race_result::RaceResult;

/// everything of one raceday the comparison reads
pub struct RacedayView<'a> {
    pub id: RacedayId,
    pub drivers: &'a DriverTable,
    pub results: &'a [RaceResult],
    pub consistency: &'a [ConsistencyEntry],
    /// `None` when the theoretical pace of the raceday could not be ranked
    pub theoretical_pace: Option<&'a TheoreticalPace>,
    pub sector_field: Option<&'a SectorField>,
}

/// a value of a driver on both racedays, `delta` is raceday 2 minus raceday 1
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct ComparativeDelta {
    pub number: String,
    pub position_rd1: u32,
    pub position_rd2: u32,
    pub rd1: f64,
    pub rd2: f64,
    pub delta: f64,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct RacecraftDelta {
    pub number: String,
    pub position_rd2: u32,
    pub rd1: i64,
    pub rd2: i64,
    pub delta: i64,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PaceQuadrant {
    /// faster best lap and faster average
    TrueImprover,
    /// no faster best lap, but a faster average
    MaximizedPackage,
    /// faster best lap, but no faster average
    HeroOrZero,
    LostSetup,
}

impl PaceQuadrant {
    /// `best_lap_delta` and `average_delta` are raceday 2 minus raceday 1
    pub fn from_deltas(best_lap_delta: f64, average_delta: f64) -> PaceQuadrant {
        match (best_lap_delta < 0.0, average_delta < 0.0) {
            (true, true) => PaceQuadrant::TrueImprover,
            (false, true) => PaceQuadrant::MaximizedPackage,
            (true, false) => PaceQuadrant::HeroOrZero,
            (false, false) => PaceQuadrant::LostSetup,
        }
    }

    pub fn all() -> [PaceQuadrant; 4] {
        [
            PaceQuadrant::TrueImprover,
            PaceQuadrant::MaximizedPackage,
            PaceQuadrant::HeroOrZero,
            PaceQuadrant::LostSetup,
        ]
    }

    fn key(&self) -> &'static str {
        match self {
            PaceQuadrant::TrueImprover => "true_improver",
            PaceQuadrant::MaximizedPackage => "maximized_package",
            PaceQuadrant::HeroOrZero => "hero_or_zero",
            PaceQuadrant::LostSetup => "lost_setup",
        }
    }
}

impl fmt::Display for PaceQuadrant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key().to_title_case())
    }
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct QuadrantPoint {
    pub number: String,
    pub position_rd2: u32,
    /// best lap raceday 2 minus raceday 1
    pub best_lap_delta: f64,
    /// average lap raceday 2 minus raceday 1
    pub average_lap_delta: f64,
    pub quadrant: PaceQuadrant,
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct ComparativeAnalysis {
    /// drivers on both racedays, in raceday 1 finishing order
    pub common_drivers: Vec<String>,
    /// ascending on delta, the biggest improvement first
    pub pace_evolution: Vec<ComparativeDelta>,
    /// ascending on delta
    pub consistency_delta: Vec<ComparativeDelta>,
    /// descending on delta
    pub racecraft_delta: Vec<RacecraftDelta>,
    pub pace_quadrant: Vec<QuadrantPoint>,
}

impl ComparativeAnalysis {
    pub fn quadrant_members(&self, quadrant: PaceQuadrant) -> Vec<&str> {
        self.pace_quadrant
            .iter()
            .filter(|point| point.quadrant == quadrant)
            .map(|point| point.number.as_str())
            .collect()
    }
}

/// the sector performance of one driver on both racedays
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct SectorProfileEvolution {
    pub number: String,
    pub position_rd1: u32,
    pub position_rd2: u32,
    pub rd1: SectorProfile,
    pub rd2: SectorProfile,
    /// raceday 2 performance minus raceday 1 performance, per sector
    pub delta: [f64; 3],
}

impl SectorProfileEvolution {
    /// sector indexes from biggest improvement to biggest drop, ties keep the sector order
    pub fn ranked_sectors(&self) -> [usize; 3] {
        let mut order = [0, 1, 2];
        order.sort_by(|a, b| self.delta[*b].total_cmp(&self.delta[*a]));
        order
    }

    pub fn best_change(&self) -> usize {
        self.ranked_sectors()[0]
    }

    pub fn worst_change(&self) -> usize {
        self.ranked_sectors()[2]
    }
}

pub struct ComparativeAnalyzer {}

impl ComparativeAnalyzer {
    /// # compare two racedays
    /// only drivers on both racedays are compared, a driver missing a value on
    /// either day is left out of that series.
    ///
    /// ## Returns
    /// * `ComparativeAnalysis` - `NoCommonDrivers` when the racedays share nobody
    pub fn compare(rd1: &RacedayView, rd2: &RacedayView) -> CustomResult<ComparativeAnalysis> {
        let common_drivers = ComparativeAnalyzer::common_drivers(rd1.drivers, rd2.drivers);
        if common_drivers.is_empty() {
            return Err(Error::NoCommonDrivers {
                first: rd1.id,
                second: rd2.id,
            });
        }
        for (view, other) in [(rd1, rd2), (rd2, rd1)] {
            let missing = Helpers::get_difference_between_vectors(&view.drivers.numbers(), &other.drivers.numbers());
            if !missing.is_empty() {
                debug!(target:"analysis/comparative:compare", "Drivers only on {} are left out: {:?}", view.id, missing);
            }
        }
        if rd1.theoretical_pace.is_none() || rd2.theoretical_pace.is_none() {
            warn!(target:"analysis/comparative:compare", "Theoretical pace missing on a raceday, the racecraft delta will be empty");
        }

        let mut pace_evolution = Vec::new();
        let mut consistency_delta = Vec::new();
        let mut racecraft_delta = Vec::new();
        let mut pace_quadrant = Vec::new();

        for number in &common_drivers {
            let (driver_rd1, driver_rd2) = match (rd1.drivers.get(number), rd2.drivers.get(number)) {
                (Some(driver_rd1), Some(driver_rd2)) => (driver_rd1, driver_rd2),
                _ => continue,
            };

            let average_rd1 = driver_rd1.sector_sum();
            let average_rd2 = driver_rd2.sector_sum();
            if average_rd1 > 0.0 && average_rd2 > 0.0 {
                pace_evolution.push(ComparativeDelta {
                    number: number.clone(),
                    position_rd1: driver_rd1.position,
                    position_rd2: driver_rd2.position,
                    rd1: average_rd1,
                    rd2: average_rd2,
                    delta: average_rd2 - average_rd1,
                });
            }

            // a gap of exactly 0 counts as missing here
            let gap_rd1 = ConsistencyAnalyzer::get(rd1.consistency, number).and_then(|e| e.gap);
            let gap_rd2 = ConsistencyAnalyzer::get(rd2.consistency, number).and_then(|e| e.gap);
            if let (Some(gap_rd1), Some(gap_rd2)) = (gap_rd1, gap_rd2) {
                if gap_rd1 > 0.0 && gap_rd2 > 0.0 {
                    consistency_delta.push(ComparativeDelta {
                        number: number.clone(),
                        position_rd1: driver_rd1.position,
                        position_rd2: driver_rd2.position,
                        rd1: gap_rd1,
                        rd2: gap_rd2,
                        delta: gap_rd2 - gap_rd1,
                    });
                }
            }

            let score_rd1 = rd1.theoretical_pace.and_then(|pace| pace.racecraft_of(number));
            let score_rd2 = rd2.theoretical_pace.and_then(|pace| pace.racecraft_of(number));
            if let (Some(score_rd1), Some(score_rd2)) = (score_rd1, score_rd2) {
                racecraft_delta.push(RacecraftDelta {
                    number: number.clone(),
                    position_rd2: driver_rd2.position,
                    rd1: score_rd1,
                    rd2: score_rd2,
                    delta: score_rd2 - score_rd1,
                });
            }

            let best_rd1 = RaceResult::best_lap_of(rd1.results, number).filter(|best| *best > 0.0);
            let best_rd2 = RaceResult::best_lap_of(rd2.results, number).filter(|best| *best > 0.0);
            if let (Some(best_rd1), Some(best_rd2)) = (best_rd1, best_rd2) {
                if average_rd1 > 0.0 && average_rd2 > 0.0 {
                    let best_lap_delta = best_rd2 - best_rd1;
                    let average_lap_delta = average_rd2 - average_rd1;
                    pace_quadrant.push(QuadrantPoint {
                        number: number.clone(),
                        position_rd2: driver_rd2.position,
                        best_lap_delta,
                        average_lap_delta,
                        quadrant: PaceQuadrant::from_deltas(best_lap_delta, average_lap_delta),
                    });
                }
            }
        }

        pace_evolution.sort_by(|a, b| a.delta.total_cmp(&b.delta));
        consistency_delta.sort_by(|a, b| a.delta.total_cmp(&b.delta));
        racecraft_delta.sort_by(|a, b| b.delta.cmp(&a.delta));

        debug!(target:"analysis/comparative:compare", "Compared {} common drivers", common_drivers.len());
        Ok(ComparativeAnalysis {
            common_drivers,
            pace_evolution,
            consistency_delta,
            racecraft_delta,
            pace_quadrant,
        })
    }

    /// car numbers present on both racedays, in raceday 1 order
    pub fn common_drivers(rd1: &DriverTable, rd2: &DriverTable) -> Vec<String> {
        Helpers::get_common_elements(&rd1.numbers(), &rd2.numbers())
    }

    /// # sector profile of one driver on both racedays
    /// a raceday without sector data, or on which the driver drove no clean lap,
    /// contributes a profile of zeros
    pub fn sector_profile_evolution(
        number: &str,
        rd1: &RacedayView,
        rd2: &RacedayView,
    ) -> CustomResult<SectorProfileEvolution> {
        let (driver_rd1, driver_rd2) = match (rd1.drivers.get(number), rd2.drivers.get(number)) {
            (Some(driver_rd1), Some(driver_rd2)) => (driver_rd1, driver_rd2),
            _ => {
                return Err(Error::InsufficientData {
                    number: number.to_string(),
                    analysis: "sector profile evolution",
                })
            }
        };

        let profile_of = |view: &RacedayView| {
            view.sector_field
                .and_then(|field| field.profile(number))
                .unwrap_or_else(|| SectorProfile::zero(number))
        };
        let profile_rd1 = profile_of(rd1);
        let profile_rd2 = profile_of(rd2);

        let mut delta = [0.0; 3];
        for (sector, value) in delta.iter_mut().enumerate() {
            *value = profile_rd2.performance[sector] - profile_rd1.performance[sector];
        }

        Ok(SectorProfileEvolution {
            number: number.to_string(),
            position_rd1: driver_rd1.position,
            position_rd2: driver_rd2.position,
            rd1: profile_rd1,
            rd2: profile_rd2,
            delta,
        })
    }
}
