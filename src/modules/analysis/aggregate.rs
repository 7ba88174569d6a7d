use std::collections::HashMap;

use log::{debug, warn};

use crate::errors::{CustomResult, Error};
use crate::modules::helpers::math::Math;
use crate::modules::models::driver::{DriverAnalysis, DriverTable};
use crate::modules::models::lap::{Lap, LapFilter};
use crate::modules::models::race_result::RaceResult;

pub struct DriverAggregator {}

struct Accumulator {
    position: u32,
    elapsed: Option<f64>,
    sectors: [Vec<f64>; 3],
    pit_stops: u32,
    total_pit_time: f64,
}

impl Accumulator {
    fn new(position: u32, elapsed: Option<f64>) -> Accumulator {
        Accumulator {
            position,
            elapsed,
            sectors: [Vec::new(), Vec::new(), Vec::new()],
            pit_stops: 0,
            total_pit_time: 0.0,
        }
    }
}

impl DriverAggregator {
    /// # aggregate the drivers of one raceday
    /// computes the sector averages over the laps accepted by `filter` and the pit
    /// totals over every lap of the driver, then the deviation from the field average.
    ///
    /// ## Arguments
    /// * `results` - the classification of the raceday
    /// * `laps` - every lap of the raceday
    /// * `filter` - the accepted flags and the pit lap toggle
    ///
    /// ## Returns
    /// * `DriverTable` - one entry per classified driver, ordered by position
    pub fn aggregate(
        results: &[RaceResult],
        laps: &[Lap],
        filter: &LapFilter,
    ) -> CustomResult<DriverTable> {
        let mut order: Vec<&str> = Vec::new();
        let mut accumulators: HashMap<&str, Accumulator> = HashMap::new();

        for result in results {
            let position = match result.position {
                Some(position) if !result.driver_number.is_empty() => position,
                _ => continue,
            };
            let number = result.driver_number.as_str();
            let accumulator = Accumulator::new(position, result.elapsed);
            if accumulators.insert(number, accumulator).is_some() {
                warn!(target:"analysis/aggregate:aggregate", "Driver #{} appears more than once in the results, keeping the last row", number);
            } else {
                order.push(number);
            }
        }

        if accumulators.is_empty() {
            debug!(target:"analysis/aggregate:aggregate", "None of the {} result rows has a position and a car number", results.len());
            return Err(Error::NoValidResults);
        }

        for lap in laps {
            let accumulator = match accumulators.get_mut(lap.driver_number.as_str()) {
                Some(accumulator) => accumulator,
                None => continue,
            };

            if filter.accepts(lap) {
                for (sector, times) in accumulator.sectors.iter_mut().enumerate() {
                    if let Some(time) = lap.valid_sector(sector) {
                        times.push(time);
                    }
                }
            }

            // pit stops are counted on every lap, regardless of the filter
            if let Some(pit_time) = lap.pit_time.filter(|_| lap.is_pit_lap()) {
                accumulator.pit_stops += 1;
                accumulator.total_pit_time += pit_time;
            }
        }

        let mut drivers: Vec<DriverAnalysis> = order
            .iter()
            .filter_map(|number| accumulators.get(number).map(|acc| (number, acc)))
            .map(|(number, acc)| DriverAnalysis {
                number: number.to_string(),
                position: acc.position,
                sector_averages: [
                    Math::mean(&acc.sectors[0]),
                    Math::mean(&acc.sectors[1]),
                    Math::mean(&acc.sectors[2]),
                ],
                pit_stops: acc.pit_stops,
                total_pit_time: acc.total_pit_time,
                official_elapsed_time: acc.elapsed,
                sector_deviation: [None; 3],
            })
            .collect();

        let field_averages = DriverAggregator::field_averages(&drivers);
        for driver in drivers.iter_mut() {
            for sector in 0..3 {
                driver.sector_deviation[sector] =
                    DriverAggregator::deviation(driver.sector_averages[sector], field_averages[sector]);
            }
        }

        debug!(target:"analysis/aggregate:aggregate", "Aggregated {} drivers from {} laps", drivers.len(), laps.len());
        Ok(DriverTable::new(drivers))
    }

    /// average of every sector over the drivers that have data in all three sectors
    pub fn field_averages(drivers: &[DriverAnalysis]) -> [Option<f64>; 3] {
        let complete: Vec<&DriverAnalysis> =
            drivers.iter().filter(|driver| driver.has_all_sectors()).collect();

        let mut averages = [None; 3];
        for (sector, average) in averages.iter_mut().enumerate() {
            let values: Vec<f64> = complete
                .iter()
                .map(|driver| driver.sector_averages[sector])
                .collect();
            *average = Math::mean_checked(&values);
        }
        averages
    }

    fn deviation(average: f64, field_average: Option<f64>) -> Option<f64> {
        match field_average {
            Some(field) if field > 0.0 && average > 0.0 => Some((average - field) / field * 100.0),
            _ => None,
        }
    }
}
