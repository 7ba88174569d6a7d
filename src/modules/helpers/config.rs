use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use log::debug;

use crate::errors::{CustomResult, Error};
use crate::models::RacedayId;
use crate::modules::csv_import::{CsvImporter, DEFAULT_DELIMITER};
use crate::modules::models::lap::{LapFilter, GREEN_FLAG};
use crate::modules::session::{AnalysisSession, AnalysisSettings};

/// the two exports of one raceday
#[derive(Debug, Clone, PartialEq)]
pub struct RacedayFiles {
    pub results: PathBuf,
    pub laps: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub rd1: RacedayFiles,
    pub rd2: Option<RacedayFiles>,
    pub delimiter: u8,
    pub settings: AnalysisSettings,
}

impl Config {
    /// # read the configuration
    /// loads `.env` when present and reads the process environment
    pub fn from_env() -> CustomResult<Config> {
        dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// # parse the configuration
    /// ## Arguments
    /// * `lookup` - returns the raw value of a key, `None` when it is not set
    pub fn from_lookup<F>(lookup: F) -> CustomResult<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            value(key).ok_or_else(|| Error::InvalidConfig {
                key: key.to_string(),
                message: "is required".to_string(),
            })
        };

        let rd1 = RacedayFiles {
            results: PathBuf::from(required("RD1_RESULTS_FILE")?),
            laps: PathBuf::from(required("RD1_LAPS_FILE")?),
        };
        let rd2 = match (value("RD2_RESULTS_FILE"), value("RD2_LAPS_FILE")) {
            (Some(results), Some(laps)) => Some(RacedayFiles {
                results: PathBuf::from(results),
                laps: PathBuf::from(laps),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(missing_pair("RD2_LAPS_FILE")),
            (None, Some(_)) => return Err(missing_pair("RD2_RESULTS_FILE")),
        };

        let delimiter = match value("CSV_DELIMITER") {
            None => DEFAULT_DELIMITER,
            Some(delimiter) if delimiter.len() == 1 => delimiter.as_bytes()[0],
            Some(delimiter) => {
                return Err(Error::InvalidConfig {
                    key: "CSV_DELIMITER".to_string(),
                    message: format!("`{}` is not a single character", delimiter),
                })
            }
        };

        let flags = value("ACCEPTED_FLAGS").unwrap_or_else(|| GREEN_FLAG.to_string());
        let exclude_pit_laps = parse_bool("EXCLUDE_PIT_LAPS", value("EXCLUDE_PIT_LAPS"))?;
        let filter = LapFilter::new(flags.split(','), exclude_pit_laps).map_err(|_| Error::InvalidConfig {
            key: "ACCEPTED_FLAGS".to_string(),
            message: "contains no flag".to_string(),
        })?;

        let pace_driver_count = match value("PACE_DRIVER_COUNT") {
            None => AnalysisSettings::default().pace_driver_count,
            Some(count) => count.parse::<usize>().map_err(|_| Error::InvalidConfig {
                key: "PACE_DRIVER_COUNT".to_string(),
                message: format!("`{}` is not a positive integer", count),
            })?,
        };

        let config = Config {
            rd1,
            rd2,
            delimiter,
            settings: AnalysisSettings {
                filter,
                clean_flag: value("CLEAN_FLAG").unwrap_or_else(|| GREEN_FLAG.to_string()),
                pace_driver_count,
            },
        };
        debug!(target:"helpers/config:from_lookup", "Loaded configuration {:?}", config);
        Ok(config)
    }

    /// every raceday with its files, raceday 1 first
    pub fn racedays(&self) -> Vec<(RacedayId, &RacedayFiles)> {
        let mut racedays = vec![(RacedayId::Rd1, &self.rd1)];
        if let Some(rd2) = &self.rd2 {
            racedays.push((RacedayId::Rd2, rd2));
        }
        racedays
    }

    /// loads every configured raceday into a new session, without running it
    pub fn load_session(&self) -> CustomResult<AnalysisSession> {
        let importer = CsvImporter::new(self.delimiter);
        let mut session = AnalysisSession::new(self.settings.clone());
        for (id, files) in self.racedays() {
            session.load(id, importer.load_raceday(&files.results, &files.laps)?);
        }
        Ok(session)
    }
}

fn missing_pair(key: &str) -> Error {
    Error::InvalidConfig {
        key: key.to_string(),
        message: "both raceday 2 files have to be set".to_string(),
    }
}

fn parse_bool(key: &str, raw: Option<String>) -> CustomResult<bool> {
    match raw.map(|v| v.to_lowercase()).as_deref() {
        None => Ok(false),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some("false") | Some("0") | Some("no") => Ok(false),
        Some(other) => Err(Error::InvalidConfig {
            key: key.to_string(),
            message: format!("`{}` is not a boolean", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> CustomResult<Config> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("RD1_RESULTS_FILE", "results.csv"), ("RD1_LAPS_FILE", "laps.csv")]).unwrap();
        assert_eq!(config.rd2, None);
        assert_eq!(config.delimiter, b';');
        assert_eq!(config.settings.clean_flag, "GF");
        assert_eq!(config.settings.pace_driver_count, 5);
        assert!(!config.settings.filter.exclude_pit_laps);
        assert!(config.settings.filter.accepted_flags.contains("GF"));
        assert_eq!(config.racedays().len(), 1);
    }

    #[test]
    fn test_full_configuration() {
        let config = config(&[
            ("RD1_RESULTS_FILE", "rd1_results.csv"),
            ("RD1_LAPS_FILE", "rd1_laps.csv"),
            ("RD2_RESULTS_FILE", "rd2_results.csv"),
            ("RD2_LAPS_FILE", "rd2_laps.csv"),
            ("CSV_DELIMITER", ","),
            ("ACCEPTED_FLAGS", "GF, FCY"),
            ("EXCLUDE_PIT_LAPS", "true"),
            ("PACE_DRIVER_COUNT", "3"),
        ])
        .unwrap();
        assert_eq!(config.delimiter, b',');
        assert_eq!(config.settings.filter.accepted_flags.len(), 2);
        assert!(config.settings.filter.exclude_pit_laps);
        assert_eq!(config.settings.pace_driver_count, 3);
        assert_eq!(config.racedays()[1].0, RacedayId::Rd2);
    }

    #[test]
    fn test_invalid_values() {
        let base = [("RD1_RESULTS_FILE", "results.csv"), ("RD1_LAPS_FILE", "laps.csv")];
        let with = |extra: (&'static str, &'static str)| {
            let mut pairs = base.to_vec();
            pairs.push(extra);
            config(&pairs)
        };

        assert!(matches!(config(&base[..1]), Err(Error::InvalidConfig { .. })));
        assert!(matches!(with(("RD2_RESULTS_FILE", "rd2.csv")), Err(Error::InvalidConfig { .. })));
        assert!(matches!(with(("EXCLUDE_PIT_LAPS", "maybe")), Err(Error::InvalidConfig { .. })));
        assert!(matches!(with(("PACE_DRIVER_COUNT", "-1")), Err(Error::InvalidConfig { .. })));
        assert!(matches!(with(("ACCEPTED_FLAGS", " , ")), Err(Error::InvalidConfig { .. })));
        assert!(matches!(with(("CSV_DELIMITER", ";;")), Err(Error::InvalidConfig { .. })));
    }
}
