use serde::{Deserialize, Serialize};

use crate::modules::analysis::comparative::{ComparativeAnalysis, PaceQuadrant, SectorProfileEvolution};
use crate::modules::analysis::consistency::{ConsistencyAnalyzer, ConsistencyClass, ConsistencyEntry};
use crate::modules::analysis::costly_mistake::{CostlyMistakeAnalyzer, CostlyMistakeEntry};
use crate::modules::analysis::pace_degradation::QuarterPace;
use crate::modules::analysis::pit_stops::{PitStopAnalyzer, PitStopEntry};
use crate::modules::analysis::sector_fingerprint::SectorProfile;
use crate::modules::analysis::theoretical_pace::TheoreticalPace;

/// one finding about the race, formatting is left to whoever shows it
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Insight {
    pub headline: String,
    pub detail: String,
}

impl Insight {
    fn new(headline: impl Into<String>, detail: impl Into<String>) -> Insight {
        Insight {
            headline: headline.into(),
            detail: detail.into(),
        }
    }
}

fn position_label(position: Option<u32>) -> String {
    position.map_or_else(|| "unclassified".to_string(), |position| format!("P{}", position))
}

fn sector_label(sector: usize) -> String {
    format!("S{}", sector + 1)
}

/// builds the insights of every analysis
pub struct Narrative {}

impl Narrative {
    /// fastest lap against top speed, and whether the fastest driver won
    pub fn best_lap(pace: &TheoreticalPace) -> Vec<Insight> {
        let (fastest_lap, fastest_kph) = match (pace.fastest_lap(), pace.fastest_kph()) {
            (Some(fastest_lap), Some(fastest_kph)) => (fastest_lap, fastest_kph),
            _ => return Vec::new(),
        };

        let mut insights = Vec::new();
        if fastest_lap.number == fastest_kph.number {
            insights.push(Insight::new(
                "Dominant Pace",
                format!(
                    "Driver #{} (actual {}) set the fastest potential lap of the race ({:.3}s) and also achieved the highest average speed on that lap ({:.1} kph).",
                    fastest_lap.number,
                    position_label(fastest_lap.actual_position),
                    fastest_lap.best_lap_time,
                    fastest_kph.best_lap_kph
                ),
            ));
        } else {
            insights.push(Insight::new(
                "Top Speed vs. Agility",
                format!(
                    "Driver #{} (actual {}) set the fastest potential lap ({:.3}s), but driver #{} (actual {}) recorded the highest average speed ({:.1} kph).",
                    fastest_lap.number,
                    position_label(fastest_lap.actual_position),
                    fastest_lap.best_lap_time,
                    fastest_kph.number,
                    position_label(fastest_kph.actual_position),
                    fastest_kph.best_lap_kph
                ),
            ));
        }

        if fastest_lap.actual_position != Some(1) {
            insights.push(Insight::new(
                "Missed Opportunity",
                format!(
                    "Despite having the fastest theoretical lap, driver #{} finished {}, suggesting significant issues during the race.",
                    fastest_lap.number,
                    position_label(fastest_lap.actual_position)
                ),
            ));
        }
        insights
    }

    /// drivers who finished furthest from their pace rank, and a winner outside the top 3 pace
    pub fn performers(pace: &TheoreticalPace) -> Vec<Insight> {
        let mut scored: Vec<(i64, &_)> = pace
            .entries
            .iter()
            .filter_map(|entry| entry.racecraft_score().map(|score| (score, entry)))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let mut insights = Vec::new();
        if let Some((score, entry)) = scored.first().filter(|(score, _)| *score > 0) {
            insights.push(Insight::new(
                "Top Overperformer",
                format!(
                    "Driver #{} (finished {}) finished {} positions higher than their theoretical rank of P{}.",
                    entry.number,
                    position_label(entry.actual_position),
                    score,
                    entry.theoretical_rank
                ),
            ));
        }
        if let Some((score, entry)) = scored.last().filter(|(score, _)| *score < 0) {
            insights.push(Insight::new(
                "Top Underperformer",
                format!(
                    "Driver #{} (finished {}) finished {} positions lower than their theoretical rank of P{}.",
                    entry.number,
                    position_label(entry.actual_position),
                    score.abs(),
                    entry.theoretical_rank
                ),
            ));
        }

        let winner = pace.entries.iter().find(|entry| entry.actual_position == Some(1));
        if let Some(winner) = winner.filter(|winner| winner.theoretical_rank > 3) {
            insights.push(Insight::new(
                "Race Winner",
                format!(
                    "The winner, driver #{}, won with only the number {} fastest lap, a well-executed race.",
                    winner.number, winner.theoretical_rank
                ),
            ));
        }
        insights
    }

    /// the podium and the most consistent driver, each mentioned once
    pub fn consistency(entries: &[ConsistencyEntry]) -> Vec<Insight> {
        let ranked = ConsistencyAnalyzer::ranked(entries);
        let most_consistent = match ranked.first() {
            Some(entry) => *entry,
            None => {
                return vec![Insight::new(
                    "Consistency",
                    "No valid consistency data could be calculated.",
                )]
            }
        };

        let mut podium: Vec<&ConsistencyEntry> = ranked
            .iter()
            .copied()
            .filter(|entry| entry.position <= 3)
            .collect();
        podium.sort_by_key(|entry| entry.position);

        let mut described: Vec<&str> = Vec::new();
        let mut insights = Vec::new();
        let subjects = podium
            .into_iter()
            .map(|entry| (format!("The P{} finisher", entry.position), entry))
            .chain(std::iter::once(("The most consistent driver".to_string(), most_consistent)));

        for (reason, entry) in subjects {
            let gap = match entry.gap {
                Some(gap) if !described.contains(&entry.number.as_str()) => gap,
                _ => continue,
            };
            described.push(entry.number.as_str());

            let mut detail = format!("Showed a consistency gap of {:.3}s. ", gap);
            detail.push_str(match ConsistencyClass::from_gap(gap) {
                ConsistencyClass::Solid => "This is a solid, reliable performance.",
                ConsistencyClass::NoticeableGap => {
                    "This is a noticeable gap, suggesting struggles with traffic or mistakes."
                }
            });
            if entry.pit_stops > 0 {
                detail.push_str(&format!(
                    " This gap was also influenced by their {} pit stop(s).",
                    entry.pit_stops
                ));
            }

            insights.push(Insight::new(
                format!("{}, driver #{} (finished P{})", reason, entry.number, entry.position),
                detail,
            ));
        }
        insights
    }

    /// the cleanest race and the costliest mistake
    pub fn costly_mistakes(entries: &[CostlyMistakeEntry]) -> Vec<Insight> {
        let ranked = CostlyMistakeAnalyzer::ranked(entries);
        let (cleanest, messiest) = match (ranked.first(), ranked.last()) {
            (Some(cleanest), Some(messiest)) => (cleanest, messiest),
            _ => {
                return vec![Insight::new(
                    "Clean Race Analysis",
                    "Not enough valid laps to calculate.",
                )]
            }
        };

        vec![
            Insight::new(
                "Cleanest Race",
                format!(
                    "Driver #{} (P{}) ran the cleanest race. Their single worst lap was only {:.3}s slower than their average.",
                    cleanest.0.number, cleanest.0.position, cleanest.1.delta
                ),
            ),
            Insight::new(
                "Costliest Mistake",
                format!(
                    "Driver #{} (P{}) suffered at least one major error, losing {:.3}s on their worst lap.",
                    messiest.0.number, messiest.0.position, messiest.1.delta
                ),
            ),
        ]
    }

    /// improved, faded or not enough laps, per selected driver
    pub fn pace_degradation(paces: &[QuarterPace]) -> Vec<Insight> {
        if paces.is_empty() {
            return vec![Insight::new(
                "Degradation Insights",
                "Not enough data for pace degradation analysis.",
            )];
        }

        paces
            .iter()
            .map(|pace| {
                let headline = format!("Driver #{} (P{})", pace.number, pace.position);
                let detail = match pace.degradation_delta() {
                    None => "Not enough clean laps to analyze.".to_string(),
                    Some(delta) if delta < 0.0 => {
                        format!("Improved by {:.3}s from Q1 to Q4.", delta.abs())
                    }
                    Some(delta) => format!("Faded by {:.3}s from Q1 to Q4.", delta),
                };
                Insight::new(headline, detail)
            })
            .collect()
    }

    pub fn pit_stops(entries: &[PitStopEntry]) -> Vec<Insight> {
        let detail = match entries {
            [] => "No drivers made a pit stop.".to_string(),
            [single] => format!(
                "Only one driver, #{} (P{}), made a pit stop, spending {:.1}s in the pits.",
                single.number, single.position, single.total_pit_time
            ),
            _ => match PitStopAnalyzer::efficiency(entries) {
                Some((fastest, slowest)) => format!(
                    "{} drivers made pit stops. Driver #{} (P{}) was most efficient ({:.1}s). Driver #{} (P{}) spent the most time ({:.1}s).",
                    entries.len(),
                    fastest.number,
                    fastest.position,
                    fastest.total_pit_time,
                    slowest.number,
                    slowest.position,
                    slowest.total_pit_time
                ),
                None => "No drivers made a pit stop.".to_string(),
            },
        };
        vec![Insight::new("Pit Stop Analysis", detail)]
    }

    /// all-rounder, or the strongest and weakest sector of the driver
    pub fn sector_fingerprint(profile: &SectorProfile, position: u32) -> Insight {
        let headline = format!("Driver #{} (P{})", profile.number, position);
        if profile.is_all_rounder() {
            return Insight::new(
                headline,
                "Was a true all-rounder, matching the field's best pace in all sectors.",
            );
        }

        let (best, worst) = (profile.strongest(), profile.weakest());
        Insight::new(
            headline,
            format!(
                "Showed strength in {} ({:.1}% of field best) and weakness in {} ({:.1}%).",
                sector_label(best),
                profile.performance[best],
                sector_label(worst),
                profile.performance[worst]
            ),
        )
    }

    /// biggest mover and faded pace, locked in and erratic speed, top racer and bad day
    pub fn comparative(analysis: &ComparativeAnalysis) -> Vec<Insight> {
        let mut insights = Vec::new();

        if let (Some(improver), Some(fader)) =
            (analysis.pace_evolution.first(), analysis.pace_evolution.last())
        {
            insights.push(Insight::new(
                "Biggest Mover",
                format!(
                    "Driver #{} found {:.3}s/lap on average on day 2.",
                    improver.number,
                    improver.delta.abs()
                ),
            ));
            insights.push(Insight::new(
                "Faded Pace",
                format!(
                    "Driver #{} struggled on day 2, ending up {:.3}s/lap slower, going from P{} to P{}.",
                    fader.number, fader.delta, fader.position_rd1, fader.position_rd2
                ),
            ));
        }

        if let (Some(improver), Some(fader)) =
            (analysis.consistency_delta.first(), analysis.consistency_delta.last())
        {
            insights.push(Insight::new(
                "Locked In",
                format!(
                    "Driver #{} became much more reliable, cutting their consistency gap by {:.3}s.",
                    improver.number,
                    improver.delta.abs()
                ),
            ));
            insights.push(Insight::new(
                "Erratic Speed",
                format!(
                    "Driver #{} became less consistent. Their gap grew by {:.3}s, suggesting they were pushing harder and making more mistakes.",
                    fader.number, fader.delta
                ),
            ));
        }

        insights.extend(Narrative::quadrants(analysis));

        if let (Some(improver), Some(fader)) =
            (analysis.racecraft_delta.first(), analysis.racecraft_delta.last())
        {
            insights.push(Insight::new(
                "Top Racer",
                format!(
                    "Driver #{} had the best racecraft delta, a {}-position swing.",
                    improver.number, improver.delta
                ),
            ));
            insights.push(Insight::new(
                "Bad Day",
                format!(
                    "Driver #{} had a tough second raceday, a {}-position swing, suggesting they got stuck in the pack.",
                    fader.number, fader.delta
                ),
            ));
        }
        insights
    }

    /// one insight per pace quadrant listing its drivers
    pub fn quadrants(analysis: &ComparativeAnalysis) -> Vec<Insight> {
        PaceQuadrant::all()
            .iter()
            .map(|quadrant| {
                let members: Vec<String> = analysis
                    .quadrant_members(*quadrant)
                    .iter()
                    .map(|number| format!("#{}", number))
                    .collect();
                let members = if members.is_empty() {
                    "None".to_string()
                } else {
                    members.join(", ")
                };
                let meaning = match quadrant {
                    PaceQuadrant::TrueImprover => {
                        "Unlocked new ultimate speed and improved average race pace."
                    }
                    PaceQuadrant::MaximizedPackage => {
                        "Did not get faster, but became more consistent and improved their average."
                    }
                    PaceQuadrant::HeroOrZero => {
                        "Set a faster hero lap but could not sustain it, hurting their average pace."
                    }
                    PaceQuadrant::LostSetup => {
                        "Went backward, slower in both ultimate and average pace."
                    }
                };
                Insight::new(quadrant.to_string(), format!("{}. {}", members, meaning))
            })
            .collect()
    }

    pub fn sector_evolution(evolution: &SectorProfileEvolution) -> Insight {
        let (best, worst) = (evolution.best_change(), evolution.worst_change());
        Insight::new(
            format!("Driver #{} sector evolution", evolution.number),
            format!(
                "The biggest improvement came in sector {}, where the performance against the field best improved by {:.1} points. The biggest drop-off was in sector {}, falling by {:.1} points.",
                best + 1,
                evolution.delta[best],
                worst + 1,
                evolution.delta[worst].abs()
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::analysis::theoretical_pace::TheoreticalPaceEntry;

    fn entry(number: &str, position: u32, best: f64, kph: f64, rank: u32) -> TheoreticalPaceEntry {
        TheoreticalPaceEntry {
            number: number.to_string(),
            actual_position: Some(position),
            best_lap_time: best,
            best_lap_kph: kph,
            theoretical_race_time: best * 20.0,
            theoretical_rank: rank,
        }
    }

    fn headlines(insights: &[Insight]) -> Vec<&str> {
        insights.iter().map(|insight| insight.headline.as_str()).collect()
    }

    #[test]
    fn test_best_lap_missed_opportunity() {
        let pace = TheoreticalPace {
            winner_laps: 20,
            entries: vec![entry("7", 2, 89.0, 151.0, 1), entry("5", 1, 90.0, 150.0, 2)],
        };

        assert_eq!(
            headlines(&Narrative::best_lap(&pace)),
            vec!["Dominant Pace", "Missed Opportunity"]
        );
        assert_eq!(
            headlines(&Narrative::performers(&pace)),
            vec!["Top Overperformer", "Top Underperformer"]
        );
    }

    #[test]
    fn test_consistency_mentions_driver_once() {
        let entries = vec![
            ConsistencyEntry {
                number: "5".to_string(),
                position: 1,
                pit_stops: 1,
                average_lap_time: Some(90.5),
                best_lap_time: Some(90.0),
                gap: Some(0.5),
            },
            ConsistencyEntry {
                number: "7".to_string(),
                position: 2,
                pit_stops: 0,
                average_lap_time: Some(92.0),
                best_lap_time: Some(90.0),
                gap: Some(2.0),
            },
        ];
        let insights = Narrative::consistency(&entries);
        assert_eq!(insights.len(), 2);
        assert!(insights[0].detail.contains("solid, reliable"));
        assert!(insights[0].detail.contains("1 pit stop(s)"));
        assert!(insights[1].detail.contains("noticeable gap"));
    }

    #[test]
    fn test_pit_stop_texts() {
        let stop = |number: &str, total: f64| PitStopEntry {
            number: number.to_string(),
            position: 1,
            pit_stops: 1,
            total_pit_time: total,
        };
        assert!(Narrative::pit_stops(&[])[0].detail.starts_with("No drivers"));
        assert!(Narrative::pit_stops(&[stop("5", 30.0)])[0]
            .detail
            .starts_with("Only one driver, #5"));
        assert!(Narrative::pit_stops(&[stop("5", 30.0), stop("7", 28.0)])[0]
            .detail
            .contains("Driver #7 (P1) was most efficient (28.0s)"));
    }

    #[test]
    fn test_degradation_texts() {
        let pace = |averages: [Option<f64>; 4]| QuarterPace {
            number: "5".to_string(),
            position: 1,
            averages,
            pit_quarter: 0,
        };
        let insights = Narrative::pace_degradation(&[
            pace([Some(61.0), None, None, Some(60.5)]),
            pace([Some(61.0), None, None, Some(62.0)]),
            pace([Some(61.0), None, None, None]),
        ]);
        assert_eq!(insights[0].detail, "Improved by 0.500s from Q1 to Q4.");
        assert_eq!(insights[1].detail, "Faded by 1.000s from Q1 to Q4.");
        assert_eq!(insights[2].detail, "Not enough clean laps to analyze.");
    }
}
