use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, Error};
use crate::models::RawLapRow;
use crate::modules::helpers::time::{parse_float, parse_integer, parse_time_to_seconds};

/// the flag code of a green flag lap
pub const GREEN_FLAG: &str = "GF";

/// one car crossing the line once, parsed from a `RawLapRow`
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct Lap {
    pub driver_number: String,
    pub lap_number: Option<u32>,
    pub flag: String,
    pub lap_time: Option<f64>,
    /// sector 1, 2 and 3. `None` or 0 means the sector was not recorded
    pub sectors: [Option<f64>; 3],
    pub pit_time: Option<f64>,
}

impl Lap {
    /// # parse a raw lap
    /// sector columns are plain seconds, lap and pit times may use `MM:SS.f`
    pub fn from_raw(raw: &RawLapRow) -> Lap {
        Lap {
            driver_number: raw.number.trim().to_string(),
            lap_number: parse_integer(&raw.lap_number).and_then(|n| u32::try_from(n).ok()),
            flag: raw.flag_at_fl.trim().to_string(),
            lap_time: parse_time_to_seconds(&raw.lap_time),
            sectors: [
                parse_float(&raw.s1_seconds),
                parse_float(&raw.s2_seconds),
                parse_float(&raw.s3_seconds),
            ],
            pit_time: parse_time_to_seconds(&raw.pit_time),
        }
    }

    pub fn from_raw_rows(rows: &[RawLapRow]) -> Vec<Lap> {
        rows.iter().map(Lap::from_raw).collect()
    }

    pub fn is_pit_lap(&self) -> bool {
        self.pit_time.map_or(false, |pit| pit > 0.0)
    }

    /// a lap under the clean flag that did not include a pit stop
    pub fn is_clean(&self, clean_flag: &str) -> bool {
        self.flag == clean_flag && !self.is_pit_lap()
    }

    /// the lap time if it was recorded and positive
    pub fn valid_lap_time(&self) -> Option<f64> {
        self.lap_time.filter(|time| *time > 0.0)
    }

    /// the sector time if it was recorded and positive
    pub fn valid_sector(&self, sector: usize) -> Option<f64> {
        self.sectors[sector].filter(|time| *time > 0.0)
    }

    /// # group the laps per driver
    /// the laps keep the order of the export within every driver
    pub fn group_by_driver(laps: &[Lap]) -> HashMap<&str, Vec<&Lap>> {
        let mut grouped: HashMap<&str, Vec<&Lap>> = HashMap::new();
        for lap in laps {
            grouped.entry(lap.driver_number.as_str()).or_default().push(lap);
        }
        grouped
    }
}

/// which laps count towards the sector averages
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct LapFilter {
    pub accepted_flags: BTreeSet<String>,
    pub exclude_pit_laps: bool,
}

impl LapFilter {
    pub fn new<I, S>(flags: I, exclude_pit_laps: bool) -> CustomResult<LapFilter>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let accepted_flags: BTreeSet<String> = flags
            .into_iter()
            .map(|flag| {
                let flag: String = flag.into();
                flag.trim().to_string()
            })
            .filter(|flag| !flag.is_empty())
            .collect();

        if accepted_flags.is_empty() {
            return Err(Error::NoFlagsSelected);
        }

        Ok(LapFilter {
            accepted_flags,
            exclude_pit_laps,
        })
    }

    /// only laps under `flag`, pit laps excluded
    pub fn clean_only(flag: &str) -> LapFilter {
        LapFilter {
            accepted_flags: BTreeSet::from([flag.to_string()]),
            exclude_pit_laps: true,
        }
    }

    pub fn accepts(&self, lap: &Lap) -> bool {
        self.accepted_flags.contains(&lap.flag) && !(self.exclude_pit_laps && lap.is_pit_lap())
    }
}

impl Default for LapFilter {
    fn default() -> Self {
        LapFilter::clean_only(GREEN_FLAG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(number: &str, flag: &str, pit: &str) -> RawLapRow {
        RawLapRow {
            number: number.to_string(),
            flag_at_fl: flag.to_string(),
            s1_seconds: "30.1".to_string(),
            s2_seconds: "0".to_string(),
            s3_seconds: "".to_string(),
            pit_time: pit.to_string(),
            lap_number: "3".to_string(),
            lap_time: "1:31.250".to_string(),
        }
    }

    #[test]
    fn test_from_raw_parses_fields() {
        let lap = Lap::from_raw(&raw(" 12A ", "GF", ""));
        assert_eq!(lap.driver_number, "12A");
        assert_eq!(lap.lap_number, Some(3));
        assert_eq!(lap.lap_time, Some(91.25));
        assert_eq!(lap.valid_sector(0), Some(30.1));
        assert_eq!(lap.valid_sector(1), None);
        assert_eq!(lap.valid_sector(2), None);
        assert!(!lap.is_pit_lap());
        assert!(lap.is_clean(GREEN_FLAG));
    }

    #[test]
    fn test_pit_lap_is_never_clean() {
        let lap = Lap::from_raw(&raw("7", "GF", "0:42.5"));
        assert!(lap.is_pit_lap());
        assert!(!lap.is_clean(GREEN_FLAG));

        let zero_pit = Lap::from_raw(&raw("7", "GF", "0"));
        assert!(!zero_pit.is_pit_lap());
    }

    #[test]
    fn test_filter_accepts_flags_and_pit_toggle() {
        let pit_lap = Lap::from_raw(&raw("7", "FCY", "30"));
        let including = LapFilter::new(["GF", "FCY"], false).unwrap();
        let excluding = LapFilter::new(["GF", "FCY"], true).unwrap();
        assert!(including.accepts(&pit_lap));
        assert!(!excluding.accepts(&pit_lap));
        assert!(!LapFilter::default().accepts(&pit_lap));
    }

    #[test]
    fn test_filter_needs_a_flag() {
        let empty: Vec<&str> = vec![" ", ""];
        assert!(matches!(LapFilter::new(empty, true), Err(Error::NoFlagsSelected)));
    }
}
