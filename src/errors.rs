use std::path::PathBuf;

use snafu::Snafu;

use crate::models::RacedayId;

/// every failure the analytics pipeline can surface.
///
/// the first four variants are fatal for the analysis that detects them,
/// `InsufficientData` only concerns one driver in one analysis.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("no valid drivers found in results (every row lacks a position or a car number)"))]
    NoValidResults,

    #[snafu(display("could not determine a valid lap count for the race"))]
    NoValidLapCount,

    #[snafu(display("no common drivers found between {first} and {second}"))]
    NoCommonDrivers { first: RacedayId, second: RacedayId },

    #[snafu(display("no valid sector times found on clean laps"))]
    NoValidSectorData,

    #[snafu(display("not enough data for {analysis} of driver #{number}"))]
    InsufficientData { number: String, analysis: &'static str },

    #[snafu(display("select at least one lap flag type (e.g. GF) to analyze"))]
    NoFlagsSelected,

    #[snafu(display("{raceday} is not loaded"))]
    RacedayNotLoaded { raceday: RacedayId },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadCsv { path: PathBuf, source: csv::Error },

    #[snafu(display("column `{header}` mapped to {field} does not exist in {}", path.display()))]
    MissingColumn {
        path: PathBuf,
        field: &'static str,
        header: String,
    },

    #[snafu(display("{} is empty or failed to parse", path.display()))]
    EmptyFile { path: PathBuf },

    #[snafu(display("invalid value for {key}: {message}"))]
    InvalidConfig { key: String, message: String },

    #[snafu(display("could not serialize analysis data: {source}"))]
    SerializeContext { source: serde_json::Error },
}

pub type CustomResult<T> = Result<T, Error>;
