use std::collections::BTreeMap;

use crate::data::AnalyticsContext;
use crate::models::{
    BattingPhase, BattingSummary, BowlingPhase, BowlingSummary, Delivery, MatchupStats,
    PhaseBreakdown, PhaseReport, PlayerSummary, Rate, Role, SeasonRuns,
};
use crate::utils::{economy, overs_notation, strike_rate};

/// Batting and bowling analytics for a single player, computed from deliveries.
pub struct PlayerAnalytics<'a> {
    ctx: &'a AnalyticsContext,
}

impl<'a> PlayerAnalytics<'a> {
    pub fn new(ctx: &'a AnalyticsContext) -> Self {
        Self { ctx }
    }

    /// The summary for `role`, or `PlayerSummary::Empty` when there is nothing to report.
    pub fn summary(&self, player: &str, role: Role) -> PlayerSummary {
        let summary = match role {
            Role::Batsman => self.batting_summary(player).map(PlayerSummary::Batting),
            Role::Bowler => self.bowling_summary(player).map(PlayerSummary::Bowling),
        };
        summary.unwrap_or(PlayerSummary::Empty {})
    }

    pub fn batting_summary(&self, player: &str) -> Option<BattingSummary> {
        if self.ctx.is_empty() {
            return None;
        }

        let balls = self.batting_deliveries(player);
        if balls.is_empty() {
            return None;
        }

        let total_runs: u32 = balls.iter().map(|d| d.batter_runs).sum();
        let balls_faced = count(&balls, |d| d.counts_as_faced());
        let dismissals = count(&balls, |d| d.dismissed(player));

        let mut innings_scores: BTreeMap<u64, u32> = BTreeMap::new();
        for d in &balls {
            *innings_scores.entry(d.match_id).or_default() += d.batter_runs;
        }
        let innings = innings_scores.len() as u32;

        Some(BattingSummary {
            innings,
            total_runs,
            balls_faced,
            dismissals,
            not_out: innings.saturating_sub(dismissals),
            average: Rate::ratio(total_runs, dismissals),
            strike_rate: strike_rate(total_runs, balls_faced),
            fifties: innings_scores.values().filter(|&&r| (50..100).contains(&r)).count() as u32,
            hundreds: innings_scores.values().filter(|&&r| r >= 100).count() as u32,
            highest_score: innings_scores.values().copied().max().unwrap_or(0),
            fours: count(&balls, |d| d.batter_runs == 4),
            sixes: count(&balls, |d| d.batter_runs == 6),
            man_of_the_match: self.player_of_match_awards(player),
        })
    }

    pub fn bowling_summary(&self, player: &str) -> Option<BowlingSummary> {
        if self.ctx.is_empty() {
            return None;
        }

        let balls = self.bowling_deliveries(player);
        if balls.is_empty() {
            return None;
        }

        let runs_conceded: u32 = balls.iter().map(|d| d.bowler_runs()).sum();
        let balls_bowled = count(&balls, |d| d.counts_as_bowled());
        let wickets = count(&balls, |d| d.is_wicket);

        // match id -> (wickets, runs conceded)
        let mut spells: BTreeMap<u64, (u32, u32)> = BTreeMap::new();
        for d in &balls {
            let spell = spells.entry(d.match_id).or_default();
            spell.0 += u32::from(d.is_wicket);
            spell.1 += d.bowler_runs();
        }

        let best_figures = best_figures(spells.values().copied())
            .map(|(w, r)| format!("{}/{}", w, r))
            .unwrap_or_else(|| "N/A".to_string());

        Some(BowlingSummary {
            innings: spells.len() as u32,
            overs_bowled: overs_notation(balls_bowled),
            balls_bowled,
            wickets,
            runs_conceded,
            average: Rate::ratio(runs_conceded, wickets),
            economy: economy(runs_conceded, balls_bowled),
            strike_rate: Rate::ratio(balls_bowled, wickets),
            three_wicket_hauls: spells.values().filter(|(w, _)| *w >= 3).count() as u32,
            five_wicket_hauls: spells.values().filter(|(w, _)| *w >= 5).count() as u32,
            best_figures,
            man_of_the_match: self.player_of_match_awards(player),
        })
    }

    /// Runs per season in season order.
    pub fn runs_per_season(&self, player: &str) -> SeasonRuns {
        if self.ctx.is_empty() {
            return SeasonRuns::default();
        }

        let mut by_season: BTreeMap<&str, u32> = BTreeMap::new();
        for d in self.ctx.deliveries().iter().filter(|d| d.batter == player) {
            if let Some(game) = self.ctx.match_by_id(d.match_id) {
                *by_season.entry(game.season.as_str()).or_default() += d.batter_runs;
            }
        }

        let (seasons, runs) = by_season
            .into_iter()
            .map(|(season, runs)| (season.to_string(), runs))
            .unzip();
        SeasonRuns { seasons, runs }
    }

    /// Batter against bowler, from every ball where the two faced each other.
    pub fn vs_player(&self, batsman: &str, bowler: &str) -> MatchupStats {
        let balls: Vec<&Delivery> = self
            .ctx
            .deliveries()
            .iter()
            .filter(|d| d.batter == batsman && d.bowler == bowler)
            .collect();
        if balls.is_empty() {
            return MatchupStats::empty();
        }

        let runs_scored: u32 = balls.iter().map(|d| d.batter_runs).sum();
        let balls_faced = count(&balls, |d| d.counts_as_faced());

        MatchupStats {
            runs_scored,
            balls_faced: Some(balls_faced),
            dismissals: count(&balls, |d| d.dismissed(batsman)),
            strike_rate: strike_rate(runs_scored, balls_faced),
        }
    }

    /// Per-phase figures; a phase with no balls reports a rate of 0.
    pub fn performance_by_phase(&self, player: &str, role: Role) -> PhaseReport {
        match role {
            Role::Batsman => {
                // (runs, balls faced)
                let mut totals: PhaseBreakdown<(u32, u32)> = PhaseBreakdown::default();
                for d in self.batting_deliveries(player) {
                    if let Some(phase) = d.phase() {
                        let slot = totals.get_mut(phase);
                        slot.0 += d.batter_runs;
                        slot.1 += u32::from(d.counts_as_faced());
                    }
                }
                PhaseReport::Batting(totals.map(|(runs, balls)| BattingPhase {
                    runs,
                    strike_rate: strike_rate(runs, balls),
                }))
            }
            Role::Bowler => {
                // (runs, wickets, balls bowled)
                let mut totals: PhaseBreakdown<(u32, u32, u32)> = PhaseBreakdown::default();
                for d in self.bowling_deliveries(player) {
                    if let Some(phase) = d.phase() {
                        let slot = totals.get_mut(phase);
                        slot.0 += d.total_runs;
                        slot.1 += u32::from(d.is_wicket);
                        slot.2 += u32::from(d.counts_as_bowled());
                    }
                }
                PhaseReport::Bowling(totals.map(|(runs, wickets, balls)| BowlingPhase {
                    wickets,
                    economy: economy(runs, balls),
                }))
            }
        }
    }

    fn batting_deliveries(&self, player: &str) -> Vec<&'a Delivery> {
        self.ctx
            .deliveries()
            .iter()
            .filter(|d| d.batter == player)
            .collect()
    }

    fn bowling_deliveries(&self, player: &str) -> Vec<&'a Delivery> {
        self.ctx
            .deliveries()
            .iter()
            .filter(|d| d.bowler == player)
            .collect()
    }

    fn player_of_match_awards(&self, player: &str) -> u32 {
        self.ctx
            .matches()
            .iter()
            .filter(|m| m.player_of_match.as_deref() == Some(player))
            .count() as u32
    }
}

fn count(balls: &[&Delivery], pred: impl Fn(&Delivery) -> bool) -> u32 {
    balls.iter().filter(|d| pred(d)).count() as u32
}

/// Most wickets, then fewest runs; the earliest spell wins a full tie.
pub fn best_figures(spells: impl IntoIterator<Item = (u32, u32)>) -> Option<(u32, u32)> {
    let mut best: Option<(u32, u32)> = None;
    for (wickets, runs) in spells {
        let better = match best {
            None => true,
            Some((best_wickets, best_runs)) => {
                wickets > best_wickets || (wickets == best_wickets && runs < best_runs)
            }
        };
        if better {
            best = Some((wickets, runs));
        }
    }
    best
}
