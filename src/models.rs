use std::fmt;

use serde::{Deserialize, Serialize};

/// identifies one of the (at most two) loaded racedays
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RacedayId {
    Rd1,
    Rd2,
}

impl RacedayId {
    pub fn all() -> [RacedayId; 2] {
        [RacedayId::Rd1, RacedayId::Rd2]
    }

    pub fn short(&self) -> &'static str {
        match self {
            RacedayId::Rd1 => "RD1",
            RacedayId::Rd2 => "RD2",
        }
    }
}

impl fmt::Display for RacedayId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RacedayId::Rd1 => write!(f, "Raceday 1"),
            RacedayId::Rd2 => write!(f, "Raceday 2"),
        }
    }
}

/// one row of the results export after the header mapping.
/// every field is kept as text, parsing happens in `RaceResult::from_raw`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawResultRow {
    #[serde(rename = "POS")]
    pub pos: String,
    #[serde(rename = "NUMBER")]
    pub number: String,
    #[serde(rename = "ELAPSED")]
    pub elapsed: String,
    #[serde(rename = "LAPS")]
    pub laps: String,
    #[serde(rename = "BEST_LAP_TIME")]
    pub best_lap_time: String,
    #[serde(rename = "BEST_LAP_KPH")]
    pub best_lap_kph: String,
}

/// one row of the lap timing export after the header mapping
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawLapRow {
    #[serde(rename = "NUMBER")]
    pub number: String,
    #[serde(rename = "FLAG_AT_FL")]
    pub flag_at_fl: String,
    #[serde(rename = "S1_SECONDS")]
    pub s1_seconds: String,
    #[serde(rename = "S2_SECONDS")]
    pub s2_seconds: String,
    #[serde(rename = "S3_SECONDS")]
    pub s3_seconds: String,
    #[serde(rename = "PIT_TIME")]
    pub pit_time: String,
    #[serde(rename = "LAP_NUMBER")]
    pub lap_number: String,
    #[serde(rename = "LAP_TIME")]
    pub lap_time: String,
}
