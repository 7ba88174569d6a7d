use log::error;

use raceday_analytics::errors::CustomResult;
use raceday_analytics::modules::csv_import::{distinct_flags, CsvImporter};
use raceday_analytics::modules::helpers::config::Config;
use raceday_analytics::modules::helpers::logging::setup_logging;

fn run() -> CustomResult<Vec<String>> {
    let config = Config::from_env()?;
    let importer = CsvImporter::new(config.delimiter);

    let (_, rd1) = importer.read_raceday(&config.rd1.results, &config.rd1.laps)?;
    let rd2 = match &config.rd2 {
        Some(files) => importer.read_raceday(&files.results, &files.laps)?.1,
        None => Vec::new(),
    };
    Ok(distinct_flags(&rd1, &rd2))
}

pub fn main() {
    if let Err(error) = setup_logging() {
        eprintln!("Could not set up logging: {}", error);
    }

    match run() {
        Ok(flags) => {
            for flag in flags {
                println!("{}", flag);
            }
        }
        Err(error) => {
            error!(target:"list_flags", "{}", error);
            std::process::exit(1);
        }
    }
}
