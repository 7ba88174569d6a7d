use std::path::Path;
use std::sync::OnceLock;

use csv::{ReaderBuilder, Trim};
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::errors::{CustomResult, Error, ReadCsvSnafu};
use crate::models::{RawLapRow, RawResultRow};
use crate::modules::session::RacedayData;

pub const DEFAULT_DELIMITER: u8 = b';';

fn separators() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[\s_]").expect("valid separator regex"))
}

fn normalize_header(header: &str) -> String {
    separators().replace_all(&header.to_uppercase(), "").to_string()
}

/// # guess the header of a field
/// first a header that equals the field once upper-cased and stripped of
/// whitespace and underscores, then a header that contains the field.
pub fn guess_header(headers: &[String], field: &str) -> Option<String> {
    let field = normalize_header(field);
    headers
        .iter()
        .find(|header| normalize_header(header) == field)
        .or_else(|| {
            headers
                .iter()
                .find(|header| normalize_header(header).contains(&field))
        })
        .cloned()
}

/// the car number column is also called `CAR` in some exports
pub fn guess_number_header(headers: &[String]) -> Option<String> {
    headers
        .iter()
        .find(|header| {
            let header = header.trim().to_uppercase();
            header == "NUMBER" || header == "CAR"
        })
        .cloned()
        .or_else(|| guess_header(headers, "NUMBER"))
}

/// which header of the results export holds which field
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct ResultsMapping {
    pub pos: String,
    pub number: String,
    pub elapsed: String,
    pub laps: String,
    pub best_lap_time: String,
    pub best_lap_kph: String,
}

impl Default for ResultsMapping {
    fn default() -> Self {
        ResultsMapping {
            pos: "POS".to_string(),
            number: "NUMBER".to_string(),
            elapsed: "ELAPSED".to_string(),
            laps: "LAPS".to_string(),
            best_lap_time: "BEST_LAP_TIME".to_string(),
            best_lap_kph: "BEST_LAP_KPH".to_string(),
        }
    }
}

impl ResultsMapping {
    /// guesses every field, a field without a match keeps its canonical name
    pub fn guess(headers: &[String]) -> ResultsMapping {
        let canonical = ResultsMapping::default();
        let guess = |field: &str| guess_header(headers, field).unwrap_or_else(|| field.to_string());
        ResultsMapping {
            pos: guess(&canonical.pos),
            number: guess_number_header(headers).unwrap_or(canonical.number),
            elapsed: guess(&canonical.elapsed),
            laps: guess(&canonical.laps),
            best_lap_time: guess(&canonical.best_lap_time),
            best_lap_kph: guess(&canonical.best_lap_kph),
        }
    }

    fn columns(&self) -> [(&'static str, &str); 6] {
        [
            ("POS", &self.pos),
            ("NUMBER", &self.number),
            ("ELAPSED", &self.elapsed),
            ("LAPS", &self.laps),
            ("BEST_LAP_TIME", &self.best_lap_time),
            ("BEST_LAP_KPH", &self.best_lap_kph),
        ]
    }
}

/// which header of the lap timing export holds which field
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct LapsMapping {
    pub number: String,
    pub flag_at_fl: String,
    pub s1_seconds: String,
    pub s2_seconds: String,
    pub s3_seconds: String,
    pub pit_time: String,
    pub lap_number: String,
    pub lap_time: String,
}

impl Default for LapsMapping {
    fn default() -> Self {
        LapsMapping {
            number: "NUMBER".to_string(),
            flag_at_fl: "FLAG_AT_FL".to_string(),
            s1_seconds: "S1_SECONDS".to_string(),
            s2_seconds: "S2_SECONDS".to_string(),
            s3_seconds: "S3_SECONDS".to_string(),
            pit_time: "PIT_TIME".to_string(),
            lap_number: "LAP_NUMBER".to_string(),
            lap_time: "LAP_TIME".to_string(),
        }
    }
}

impl LapsMapping {
    pub fn guess(headers: &[String]) -> LapsMapping {
        let canonical = LapsMapping::default();
        let guess = |field: &str| guess_header(headers, field).unwrap_or_else(|| field.to_string());
        LapsMapping {
            number: guess_number_header(headers).unwrap_or(canonical.number),
            flag_at_fl: guess(&canonical.flag_at_fl),
            s1_seconds: guess(&canonical.s1_seconds),
            s2_seconds: guess(&canonical.s2_seconds),
            s3_seconds: guess(&canonical.s3_seconds),
            pit_time: guess(&canonical.pit_time),
            lap_number: guess(&canonical.lap_number),
            lap_time: guess(&canonical.lap_time),
        }
    }

    fn columns(&self) -> [(&'static str, &str); 8] {
        [
            ("NUMBER", &self.number),
            ("FLAG_AT_FL", &self.flag_at_fl),
            ("S1_SECONDS", &self.s1_seconds),
            ("S2_SECONDS", &self.s2_seconds),
            ("S3_SECONDS", &self.s3_seconds),
            ("PIT_TIME", &self.pit_time),
            ("LAP_NUMBER", &self.lap_number),
            ("LAP_TIME", &self.lap_time),
        ]
    }
}

/// reads timing exports into canonical raw rows
pub struct CsvImporter {
    delimiter: u8,
}

impl Default for CsvImporter {
    fn default() -> Self {
        CsvImporter::new(DEFAULT_DELIMITER)
    }
}

impl CsvImporter {
    pub fn new(delimiter: u8) -> CsvImporter {
        CsvImporter { delimiter }
    }

    fn reader(&self, path: &Path) -> CustomResult<csv::Reader<std::fs::File>> {
        ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_path(path)
            .context(ReadCsvSnafu { path })
    }

    /// the headers of an export, used to guess a mapping
    pub fn read_headers(&self, path: &Path) -> CustomResult<Vec<String>> {
        let mut reader = self.reader(path)?;
        let headers = reader.headers().context(ReadCsvSnafu { path })?;
        Ok(headers.iter().map(|header| header.to_string()).collect())
    }

    pub fn read_results(&self, path: &Path, mapping: &ResultsMapping) -> CustomResult<Vec<RawResultRow>> {
        let rows = self.read_columns(path, mapping.columns())?;
        info!(target:"csv_import:read_results", "Read {} result rows from {}", rows.len(), path.display());
        Ok(rows
            .into_iter()
            .map(|[pos, number, elapsed, laps, best_lap_time, best_lap_kph]| RawResultRow {
                pos,
                number,
                elapsed,
                laps,
                best_lap_time,
                best_lap_kph,
            })
            .collect())
    }

    pub fn read_laps(&self, path: &Path, mapping: &LapsMapping) -> CustomResult<Vec<RawLapRow>> {
        let rows = self.read_columns(path, mapping.columns())?;
        info!(target:"csv_import:read_laps", "Read {} lap rows from {}", rows.len(), path.display());
        Ok(rows
            .into_iter()
            .map(
                |[number, flag_at_fl, s1_seconds, s2_seconds, s3_seconds, pit_time, lap_number, lap_time]| {
                    RawLapRow {
                        number,
                        flag_at_fl,
                        s1_seconds,
                        s2_seconds,
                        s3_seconds,
                        pit_time,
                        lap_number,
                        lap_time,
                    }
                },
            )
            .collect())
    }

    /// # load a raceday
    /// guesses both mappings from the headers and parses the rows
    pub fn load_raceday(&self, results: &Path, laps: &Path) -> CustomResult<RacedayData> {
        let (result_rows, lap_rows) = self.read_raceday(results, laps)?;
        Ok(RacedayData::from_raw(&result_rows, &lap_rows))
    }

    /// the raw rows of both exports of a raceday, with guessed mappings
    pub fn read_raceday(&self, results: &Path, laps: &Path) -> CustomResult<(Vec<RawResultRow>, Vec<RawLapRow>)> {
        let results_mapping = ResultsMapping::guess(&self.read_headers(results)?);
        let laps_mapping = LapsMapping::guess(&self.read_headers(laps)?);
        debug!(target:"csv_import:read_raceday", "Guessed mappings {:?} and {:?}", results_mapping, laps_mapping);
        Ok((
            self.read_results(results, &results_mapping)?,
            self.read_laps(laps, &laps_mapping)?,
        ))
    }

    /// reads the mapped columns of every record, a short record gives empty fields
    fn read_columns<const N: usize>(
        &self,
        path: &Path,
        columns: [(&'static str, &str); N],
    ) -> CustomResult<Vec<[String; N]>> {
        let mut reader = self.reader(path)?;
        let headers = reader.headers().context(ReadCsvSnafu { path })?.clone();

        let mut indexes = [0usize; N];
        for (index, (field, header)) in indexes.iter_mut().zip(columns.iter()) {
            *index = headers
                .iter()
                .position(|candidate| candidate == *header)
                .ok_or_else(|| Error::MissingColumn {
                    path: path.to_path_buf(),
                    field: *field,
                    header: header.to_string(),
                })?;
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.context(ReadCsvSnafu { path })?;
            rows.push(std::array::from_fn(|i| {
                record.get(indexes[i]).unwrap_or("").to_string()
            }));
        }

        if rows.is_empty() {
            return Err(Error::EmptyFile {
                path: path.to_path_buf(),
            });
        }
        debug!(target:"csv_import:read_columns", "Mapped columns {:?} of {}", indexes, path.display());
        Ok(rows)
    }
}

/// sorted unique non-empty flag codes over the laps of both racedays
pub fn distinct_flags(rd1: &[RawLapRow], rd2: &[RawLapRow]) -> Vec<String> {
    let mut flags: Vec<String> = rd1
        .iter()
        .chain(rd2)
        .map(|row| row.flag_at_fl.trim().to_string())
        .filter(|flag| !flag.is_empty())
        .collect();
    flags.sort();
    flags.dedup();
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_guess_results_mapping() {
        let found = headers(&["Pos", "Car", "Elapsed", "Laps", "Best Lap Time", "Best_Lap_Kph"]);
        let mapping = ResultsMapping::guess(&found);
        assert_eq!(mapping.pos, "Pos");
        assert_eq!(mapping.number, "Car");
        assert_eq!(mapping.best_lap_time, "Best Lap Time");
        assert_eq!(mapping.best_lap_kph, "Best_Lap_Kph");
    }

    #[test]
    fn test_guess_falls_back_to_containment() {
        let found = headers(&["NUMBER", "FLAG_AT_FL", "S1_SECONDS", "LAP_TIME_S", "LAP_NUMBER"]);
        let mapping = LapsMapping::guess(&found);
        assert_eq!(mapping.lap_time, "LAP_TIME_S");
        assert_eq!(mapping.lap_number, "LAP_NUMBER");
        // no match keeps the canonical name, loading will report it as missing
        assert_eq!(mapping.pit_time, "PIT_TIME");
    }

    #[test]
    fn test_distinct_flags() {
        let row = |flag: &str| RawLapRow {
            flag_at_fl: flag.to_string(),
            ..Default::default()
        };
        let flags = distinct_flags(&[row("GF"), row(" FCY "), row("")], &[row("GF"), row("SC")]);
        assert_eq!(flags, vec!["FCY", "GF", "SC"]);
    }
}
