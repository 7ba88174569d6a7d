use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// the aggregated statistics of one driver in one raceday
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct DriverAnalysis {
    pub number: String,
    pub position: u32,
    /// average sector 1, 2 and 3 over the filtered laps. 0 when no lap qualified
    pub sector_averages: [f64; 3],
    pub pit_stops: u32,
    pub total_pit_time: f64,
    pub official_elapsed_time: Option<f64>,
    /// percentage the sector average deviates from the field average
    pub sector_deviation: [Option<f64>; 3],
}

impl DriverAnalysis {
    /// every sector has at least one qualifying lap
    pub fn has_all_sectors(&self) -> bool {
        self.sector_averages.iter().all(|avg| *avg > 0.0)
    }

    /// sum of the three sector averages, the average lap time of the driver
    pub fn sector_sum(&self) -> f64 {
        self.sector_averages.iter().sum()
    }

    /// average lap time, only when all three sectors have data
    pub fn average_lap_time(&self) -> Option<f64> {
        if self.has_all_sectors() {
            Some(self.sector_sum())
        } else {
            None
        }
    }

    pub fn has_pitted(&self) -> bool {
        self.pit_stops > 0
    }
}

/// all drivers of one raceday ordered by finishing position,
/// with a lookup by car number
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct DriverTable {
    drivers: Vec<DriverAnalysis>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl DriverTable {
    /// builds the table, sorting on position. equal positions keep their input order
    pub fn new(mut drivers: Vec<DriverAnalysis>) -> DriverTable {
        drivers.sort_by_key(|driver| driver.position);
        let index = drivers
            .iter()
            .enumerate()
            .map(|(i, driver)| (driver.number.clone(), i))
            .collect();

        DriverTable { drivers, index }
    }

    pub fn get(&self, number: &str) -> Option<&DriverAnalysis> {
        self.index.get(number).map(|i| &self.drivers[*i])
    }

    pub fn contains(&self, number: &str) -> bool {
        self.index.contains_key(number)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DriverAnalysis> {
        self.drivers.iter()
    }

    /// car numbers in finishing order
    pub fn numbers(&self) -> Vec<String> {
        self.drivers.iter().map(|driver| driver.number.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// the first `count` drivers by finishing position
    pub fn leading(&self, count: usize) -> Vec<String> {
        self.drivers
            .iter()
            .take(count)
            .map(|driver| driver.number.clone())
            .collect()
    }
}

impl<'a> IntoIterator for &'a DriverTable {
    type Item = &'a DriverAnalysis;
    type IntoIter = std::slice::Iter<'a, DriverAnalysis>;

    fn into_iter(self) -> Self::IntoIter {
        self.drivers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_table_sorted_by_position() {
        let table = DriverTable::new(vec![
            driver("7", 2, [30.0, 31.0, 29.0]),
            driver("5", 1, [30.5, 31.0, 0.0]),
            driver("9", 3, [0.0, 0.0, 0.0]),
        ]);
        assert_eq!(table.numbers(), vec!["5", "7", "9"]);
        assert_eq!(table.get("7").map(|d| d.position), Some(2));
        assert_eq!(table.leading(2), vec!["5", "7"]);
        assert!(!table.contains("11"));
    }

    #[test]
    fn test_average_lap_time_needs_all_sectors() {
        assert_eq!(driver("7", 2, [30.0, 31.0, 29.0]).average_lap_time(), Some(90.0));
        assert_eq!(driver("5", 1, [30.5, 31.0, 0.0]).average_lap_time(), None);
        assert_eq!(driver("5", 1, [30.5, 31.0, 0.0]).sector_sum(), 61.5);
    }
}
