use std::collections::BTreeMap;

use log::{debug, info};

use crate::errors::{CustomResult, Error};
use crate::macros::analysis_error_handler::{handle_analysis_error, handle_fatal_analysis_error};
use crate::models::{RacedayId, RawLapRow, RawResultRow};
use crate::modules::analysis::aggregate::DriverAggregator;
use crate::modules::analysis::comparative::{
    ComparativeAnalysis, ComparativeAnalyzer, RacedayView, SectorProfileEvolution,
};
use crate::modules::analysis::consistency::{ConsistencyAnalyzer, ConsistencyEntry};
use crate::modules::analysis::costly_mistake::{CostlyMistakeAnalyzer, CostlyMistakeEntry};
use crate::modules::analysis::pace_degradation::{PaceDegradationAnalyzer, QuarterPace};
use crate::modules::analysis::pit_stops::{PitStopAnalyzer, PitStopEntry};
use crate::modules::analysis::sector_fingerprint::{SectorField, SectorProfile};
use crate::modules::analysis::theoretical_pace::{TheoreticalPace, TheoreticalPaceRanker};
use crate::modules::models::driver::DriverTable;
use crate::modules::models::lap::{Lap, LapFilter, GREEN_FLAG};
use crate::modules::models::race_result::RaceResult;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    /// flags and pit toggle of the driver table
    pub filter: LapFilter,
    /// the flag of a clean lap, used by every analyzer
    pub clean_flag: String,
    /// how many leading drivers the pace degradation shows by default
    pub pace_driver_count: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            filter: LapFilter::default(),
            clean_flag: GREEN_FLAG.to_string(),
            pace_driver_count: 5,
        }
    }
}

/// the parsed exports of one raceday
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RacedayData {
    pub results: Vec<RaceResult>,
    pub laps: Vec<Lap>,
}

impl RacedayData {
    pub fn from_raw(results: &[RawResultRow], laps: &[RawLapRow]) -> RacedayData {
        RacedayData {
            results: RaceResult::from_raw_rows(results),
            laps: Lap::from_raw_rows(laps),
        }
    }
}

/// every derived output of one raceday. analyzers that can fail as a whole
/// keep their error, so one failure never hides the others
#[derive(Debug)]
pub struct RacedaySnapshot {
    pub id: RacedayId,
    /// drivers aggregated with the selected flags
    pub drivers: DriverTable,
    /// drivers aggregated over clean laps without pit stops, read by the analyzers
    pub baseline: DriverTable,
    pub max_official_race_time: Option<f64>,
    pub theoretical_pace: CustomResult<TheoreticalPace>,
    pub consistency: Vec<ConsistencyEntry>,
    pub costly_mistakes: Vec<CostlyMistakeEntry>,
    /// for the default selection of drivers
    pub pace_degradation: CustomResult<Vec<QuarterPace>>,
    pub pit_stops: Vec<PitStopEntry>,
    pub sector_field: CustomResult<SectorField>,
}

impl RacedaySnapshot {
    fn view<'a>(&'a self, data: &'a RacedayData) -> RacedayView<'a> {
        RacedayView {
            id: self.id,
            drivers: &self.baseline,
            results: &data.results,
            consistency: &self.consistency,
            theoretical_pace: self.theoretical_pace.as_ref().ok(),
            sector_field: self.sector_field.as_ref().ok(),
        }
    }
}

/// the results of one run, not yet stored in the session
struct RunOutcome {
    snapshots: BTreeMap<RacedayId, RacedaySnapshot>,
    comparative: Option<CustomResult<ComparativeAnalysis>>,
}

/// # analysis session
/// owns the loaded racedays and the snapshots of the last run. every run
/// replaces the snapshots as a whole.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    settings: AnalysisSettings,
    racedays: BTreeMap<RacedayId, RacedayData>,
    snapshots: BTreeMap<RacedayId, RacedaySnapshot>,
    comparative: Option<CustomResult<ComparativeAnalysis>>,
}

impl AnalysisSession {
    pub fn new(settings: AnalysisSettings) -> AnalysisSession {
        AnalysisSession {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// loads (or replaces) a raceday, the snapshots stay until the next run
    pub fn load(&mut self, id: RacedayId, data: RacedayData) {
        info!(target:"session:load", "Loaded {} ({} results, {} laps)", id, data.results.len(), data.laps.len());
        self.racedays.insert(id, data);
    }

    pub fn raceday(&self, id: RacedayId) -> CustomResult<&RacedayData> {
        self.racedays
            .get(&id)
            .ok_or(Error::RacedayNotLoaded { raceday: id })
    }

    pub fn is_comparison(&self) -> bool {
        self.racedays.len() == 2
    }

    /// # run every analysis
    /// fails when raceday 1 is missing or a raceday has no classified driver, every
    /// other failure is kept in the snapshot of the analyzer that hit it
    pub fn run(&mut self) -> CustomResult<()> {
        let outcome = self.analyze(&self.settings)?;
        self.commit(outcome);
        Ok(())
    }

    /// # replace the lap filter of the driver table and run again
    /// the filter is only kept when the run succeeds, a failed run leaves the
    /// settings and snapshots of the previous run in place
    pub fn set_filter(&mut self, filter: LapFilter) -> CustomResult<()> {
        let settings = AnalysisSettings {
            filter,
            ..self.settings.clone()
        };
        let outcome = self.analyze(&settings)?;
        self.settings = settings;
        self.commit(outcome);
        Ok(())
    }

    fn analyze(&self, settings: &AnalysisSettings) -> CustomResult<RunOutcome> {
        self.raceday(RacedayId::Rd1)?;

        let mut snapshots = BTreeMap::new();
        for (id, data) in &self.racedays {
            let snapshot = AnalysisSession::analyze_raceday(*id, data, settings)?;
            snapshots.insert(*id, snapshot);
        }

        let with_data = |id: RacedayId| Some((snapshots.get(&id)?, self.racedays.get(&id)?));
        let comparative = match (with_data(RacedayId::Rd1), with_data(RacedayId::Rd2)) {
            (Some((rd1, rd1_data)), Some((rd2, rd2_data))) => Some(handle_analysis_error!(
                ComparativeAnalyzer::compare(&rd1.view(rd1_data), &rd2.view(rd2_data)),
                "session:analyze",
                "comparative analysis"
            )),
            _ => None,
        };

        Ok(RunOutcome {
            snapshots,
            comparative,
        })
    }

    fn commit(&mut self, outcome: RunOutcome) {
        self.snapshots = outcome.snapshots;
        self.comparative = outcome.comparative;
        info!(target:"session:commit", "Analyzed {} raceday(s)", self.snapshots.len());
    }

    fn analyze_raceday(
        id: RacedayId,
        data: &RacedayData,
        settings: &AnalysisSettings,
    ) -> CustomResult<RacedaySnapshot> {
        if settings.filter.accepted_flags.is_empty() {
            return Err(Error::NoFlagsSelected);
        }

        let drivers = handle_fatal_analysis_error!(
            DriverAggregator::aggregate(&data.results, &data.laps, &settings.filter),
            "session:analyze_raceday",
            "driver aggregation"
        );
        let baseline = handle_fatal_analysis_error!(
            DriverAggregator::aggregate(
                &data.results,
                &data.laps,
                &LapFilter::clean_only(&settings.clean_flag)
            ),
            "session:analyze_raceday",
            "baseline aggregation"
        );

        let theoretical_pace = handle_analysis_error!(
            TheoreticalPaceRanker::rank(&data.results),
            "session:analyze_raceday",
            "theoretical pace"
        );
        let consistency = ConsistencyAnalyzer::analyze(&baseline, &data.results);
        let costly_mistakes =
            CostlyMistakeAnalyzer::analyze(&baseline, &data.laps, &settings.clean_flag);
        let selection =
            PaceDegradationAnalyzer::default_selection(&baseline, settings.pace_driver_count);
        let pace_degradation = handle_analysis_error!(
            PaceDegradationAnalyzer::analyze(
                &baseline,
                &data.results,
                &data.laps,
                &selection,
                &settings.clean_flag
            ),
            "session:analyze_raceday",
            "pace degradation"
        );
        let pit_stops = PitStopAnalyzer::summarize(&baseline);
        let sector_field = handle_analysis_error!(
            SectorField::build(&data.laps, &settings.clean_flag),
            "session:analyze_raceday",
            "sector fingerprint"
        );

        for entry in consistency.iter().filter(|entry| entry.gap.is_none()) {
            debug!(target:"session:analyze_raceday", "{} has no consistency gap for #{}", id, entry.number);
        }
        for entry in costly_mistakes.iter().filter(|entry| entry.worst_lap.is_none()) {
            debug!(target:"session:analyze_raceday", "{} has no clean lap time for #{}", id, entry.number);
        }

        Ok(RacedaySnapshot {
            id,
            max_official_race_time: RaceResult::max_official_elapsed(&data.results),
            drivers,
            baseline,
            theoretical_pace,
            consistency,
            costly_mistakes,
            pace_degradation,
            pit_stops,
            sector_field,
        })
    }

    fn snapshot_with_data(&self, id: RacedayId) -> CustomResult<(&RacedaySnapshot, &RacedayData)> {
        Ok((self.snapshot(id)?, self.raceday(id)?))
    }

    /// the snapshot of the last run for a raceday
    pub fn snapshot(&self, id: RacedayId) -> CustomResult<&RacedaySnapshot> {
        self.snapshots
            .get(&id)
            .ok_or(Error::RacedayNotLoaded { raceday: id })
    }

    /// `None` unless two racedays were analyzed
    pub fn comparative(&self) -> Option<&CustomResult<ComparativeAnalysis>> {
        self.comparative.as_ref()
    }

    /// pace degradation for a custom selection of drivers
    pub fn pace_degradation(&self, id: RacedayId, selected: &[String]) -> CustomResult<Vec<QuarterPace>> {
        let snapshot = self.snapshot(id)?;
        let data = self.raceday(id)?;
        PaceDegradationAnalyzer::analyze(
            &snapshot.baseline,
            &data.results,
            &data.laps,
            selected,
            &self.settings.clean_flag,
        )
    }

    pub fn sector_profile(&self, id: RacedayId, number: &str) -> CustomResult<SectorProfile> {
        match &self.snapshot(id)?.sector_field {
            Ok(field) => field.require_profile(number),
            Err(_) => Err(Error::NoValidSectorData),
        }
    }

    pub fn sector_profile_evolution(&self, number: &str) -> CustomResult<SectorProfileEvolution> {
        let (rd1, rd1_data) = self.snapshot_with_data(RacedayId::Rd1)?;
        let (rd2, rd2_data) = self.snapshot_with_data(RacedayId::Rd2)?;
        ComparativeAnalyzer::sector_profile_evolution(number, &rd1.view(rd1_data), &rd2.view(rd2_data))
    }
}
