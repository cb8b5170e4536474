use statrs::statistics::Statistics;
use std::collections::HashMap;

use crate::data::AnalyticsContext;
use crate::models::{
    HeadToHead, HeadToHeadReport, HeadToHeadSummary, MarginStats, MatchRecord, TeamMargins,
    TeamStreak, TossAnalysis, WinType,
};
use crate::utils::{percentage, round2};

/// Filter value meaning "no filter on this dimension".
pub const ALL: &str = "All";

const BIG_RUN_MARGIN: u32 = 50;
const BIG_WICKET_MARGIN: u32 = 7;

pub struct TeamAnalytics<'a> {
    ctx: &'a AnalyticsContext,
}

impl<'a> TeamAnalytics<'a> {
    pub fn new(ctx: &'a AnalyticsContext) -> Self {
        Self { ctx }
    }

    /// Every meeting of the two teams (in either order), optionally narrowed to
    /// one season and/or one venue.
    pub fn advanced_head_to_head(
        &self,
        team1: &str,
        team2: &str,
        season: Option<&str>,
        venue: Option<&str>,
    ) -> HeadToHead {
        let games: Vec<&MatchRecord> = self
            .ctx
            .matches()
            .iter()
            .filter(|m| m.is_between(team1, team2))
            .filter(|m| passes(season, &m.season))
            .filter(|m| passes(venue, &m.venue))
            .collect();

        if games.is_empty() {
            return HeadToHead::no_matches();
        }

        let total_matches = games.len() as u32;
        let wins = |team: &str| games.iter().filter(|m| m.won_by_team(team)).count() as u32;
        let team1_wins = wins(team1);
        let team2_wins = wins(team2);

        let toss_and_match = games
            .iter()
            .filter(|m| m.won_by_team(&m.toss_winner))
            .count() as u32;

        let streaks = longest_streaks(chronological_winners(&games));

        HeadToHead::Report(Box::new(HeadToHeadReport {
            team1: team1.to_string(),
            team2: team2.to_string(),
            summary: HeadToHeadSummary {
                total_matches,
                team1_wins,
                team2_wins,
                draws: total_matches.saturating_sub(team1_wins + team2_wins),
            },
            toss_analysis: TossAnalysis {
                toss_win_match_win_percent: percentage(toss_and_match, total_matches),
            },
            win_margins: [team1, team2]
                .iter()
                .map(|team| TeamMargins {
                    team: team.to_string(),
                    margins: margin_stats(&games, team),
                })
                .collect(),
            streaks: [team1, team2]
                .iter()
                .map(|team| TeamStreak {
                    team: team.to_string(),
                    longest_streak: streaks.get(team).copied().unwrap_or(0),
                })
                .collect(),
        }))
    }
}

fn passes(filter: Option<&str>, value: &str) -> bool {
    match filter {
        None => true,
        Some(f) if f.is_empty() || f == ALL => true,
        Some(f) => f == value,
    }
}

fn margin_stats(games: &[&MatchRecord], team: &str) -> MarginStats {
    let margins = |won_by: WinType| -> Vec<u32> {
        games
            .iter()
            .filter(|m| m.won_by_team(team) && m.won_by == won_by)
            .filter_map(|m| m.margin)
            .collect()
    };
    let runs = margins(WinType::Runs);
    let wickets = margins(WinType::Wickets);

    MarginStats {
        avg_run_margin: mean(&runs),
        max_run_margin: runs.iter().copied().max().unwrap_or(0),
        big_run_wins: runs.iter().filter(|&&m| m > BIG_RUN_MARGIN).count() as u32,
        avg_wicket_margin: mean(&wickets),
        max_wicket_margin: wickets.iter().copied().max().unwrap_or(0),
        big_wicket_wins: wickets.iter().filter(|&&m| m > BIG_WICKET_MARGIN).count() as u32,
    }
}

fn mean(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    round2(values.iter().map(|&v| f64::from(v)).mean())
}

/// Winners of the decided games, oldest first. Games without a parseable date
/// sort before dated ones; ties keep input order.
fn chronological_winners<'m>(games: &[&'m MatchRecord]) -> Vec<&'m str> {
    let mut decided: Vec<&MatchRecord> = games
        .iter()
        .copied()
        .filter(|m| m.winning_team.is_some())
        .collect();
    decided.sort_by_key(|m| (m.match_date(), m.date.clone()));
    decided
        .into_iter()
        .filter_map(|m| m.winning_team.as_deref())
        .collect()
}

/// Longest run of consecutive wins per team, in one pass over the winners in
/// the order given.
pub fn longest_streaks<'w>(winners: impl IntoIterator<Item = &'w str>) -> HashMap<&'w str, u32> {
    let mut best: HashMap<&str, u32> = HashMap::new();
    let mut current: Option<(&str, u32)> = None;

    for winner in winners {
        let length = match current {
            Some((holder, length)) if holder == winner => length + 1,
            _ => 1,
        };
        current = Some((winner, length));

        let longest = best.entry(winner).or_insert(0);
        if length > *longest {
            *longest = length;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{game, won};

    const MI: &str = "Mumbai Indians";
    const CSK: &str = "Chennai Super Kings";

    fn report(h2h: HeadToHead) -> HeadToHeadReport {
        match h2h {
            HeadToHead::Report(report) => *report,
            HeadToHead::NoMatches { summary } => panic!("unexpected: {}", summary.message),
        }
    }

    fn context() -> AnalyticsContext {
        let mut matches = vec![
            won(game(1, "2021-04-01", MI, CSK), MI, WinType::Runs, 60),
            won(game(2, "2021-04-20", CSK, MI), MI, WinType::Runs, 10),
            won(game(3, "2022-04-05", MI, CSK), CSK, WinType::Wickets, 8),
            game(4, "2022-04-12", CSK, MI),
            won(game(5, "2022-05-01", MI, CSK), CSK, WinType::Wickets, 4),
            won(game(6, "2022-05-09", CSK, "Delhi Capitals"), CSK, WinType::Runs, 90),
        ];
        matches[1].venue = "MA Chidambaram Stadium".to_string();
        matches[2].toss_winner = CSK.to_string();
        AnalyticsContext::new(matches, vec![])
    }

    #[test]
    fn test_summary_is_order_independent() {
        let ctx = context();
        let analytics = TeamAnalytics::new(&ctx);
        let forward = report(analytics.advanced_head_to_head(MI, CSK, None, None));
        let reverse = report(analytics.advanced_head_to_head(CSK, MI, Some(ALL), Some(ALL)));

        assert_eq!(forward.summary.total_matches, 5);
        assert_eq!(forward.summary.team1_wins, 2);
        assert_eq!(forward.summary.team2_wins, 2);
        assert_eq!(forward.summary.draws, 1, "no-result counts as a draw");
        assert_eq!(reverse.summary.team1_wins, 2);
        assert_eq!(reverse.summary.total_matches, 5);
    }

    #[test]
    fn test_toss_correlation() {
        let ctx = context();
        let h2h = report(TeamAnalytics::new(&ctx).advanced_head_to_head(MI, CSK, None, None));
        // Toss winners: MI (won), CSK (lost), CSK (won), CSK (no result), MI (lost).
        assert_eq!(h2h.toss_analysis.toss_win_match_win_percent, 40.0);
    }

    #[test]
    fn test_win_margins() {
        let ctx = context();
        let h2h = report(TeamAnalytics::new(&ctx).advanced_head_to_head(MI, CSK, None, None));

        let mi = &h2h.win_margins[0];
        assert_eq!(mi.team, MI);
        assert_eq!(mi.margins.avg_run_margin, 35.0);
        assert_eq!(mi.margins.max_run_margin, 60);
        assert_eq!(mi.margins.big_run_wins, 1);
        assert_eq!(mi.margins.avg_wicket_margin, 0.0);
        assert_eq!(mi.margins.max_wicket_margin, 0);

        let csk = &h2h.win_margins[1];
        assert_eq!(csk.margins.avg_wicket_margin, 6.0);
        assert_eq!(csk.margins.max_wicket_margin, 8);
        assert_eq!(csk.margins.big_wicket_wins, 1);
        assert_eq!(csk.margins.max_run_margin, 0, "the 90-run win was against another team");
    }

    #[test]
    fn test_team_without_wins_reports_zero_margins() {
        let ctx = context();
        let h2h = report(TeamAnalytics::new(&ctx).advanced_head_to_head(
            MI,
            CSK,
            Some("2022"),
            None,
        ));
        assert_eq!(h2h.summary.total_matches, 3);
        assert_eq!(h2h.win_margins[0].margins, MarginStats::default());
        assert_eq!(h2h.streaks[0].longest_streak, 0);
        assert_eq!(h2h.streaks[1].longest_streak, 2);
    }

    #[test]
    fn test_filters_narrow_and_can_empty_the_set() {
        let ctx = context();
        let analytics = TeamAnalytics::new(&ctx);
        let chepauk = report(analytics.advanced_head_to_head(
            MI,
            CSK,
            None,
            Some("MA Chidambaram Stadium"),
        ));
        assert_eq!(chepauk.summary.total_matches, 1);

        let none = analytics.advanced_head_to_head(MI, CSK, Some("2008"), None);
        assert_eq!(none, HeadToHead::no_matches());
        let json = serde_json::to_value(&none).unwrap();
        assert_eq!(
            json["summary"]["message"],
            "No matches found with the selected filters."
        );
    }

    #[test]
    fn test_streaks_follow_dates_not_input_order() {
        // Stored newest first; winners by date are MI, MI, CSK, CSK.
        let matches = vec![
            won(game(4, "2022-04-04", MI, CSK), CSK, WinType::Runs, 1),
            won(game(3, "2022-04-03", MI, CSK), CSK, WinType::Runs, 1),
            won(game(2, "2022-04-02", MI, CSK), MI, WinType::Runs, 1),
            won(game(1, "2022-04-01", MI, CSK), MI, WinType::Runs, 1),
        ];
        let ctx = AnalyticsContext::new(matches, vec![]);
        let h2h = report(TeamAnalytics::new(&ctx).advanced_head_to_head(MI, CSK, None, None));
        assert_eq!(h2h.streaks[0].longest_streak, 2);
        assert_eq!(h2h.streaks[1].longest_streak, 2);
    }

    #[test]
    fn test_longest_streaks_single_pass() {
        let streaks = longest_streaks(["A", "A", "B", "B", "B", "A"]);
        assert_eq!(streaks["A"], 2);
        assert_eq!(streaks["B"], 3);
    }

    #[test]
    fn test_longest_streaks_are_order_sensitive() {
        let streaks = longest_streaks(["A", "B", "A", "B", "B", "A"]);
        assert_eq!(streaks["A"], 1);
        assert_eq!(streaks["B"], 2);
        assert!(longest_streaks(Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn test_empty_context_has_no_matches() {
        let ctx = AnalyticsContext::empty();
        let h2h = TeamAnalytics::new(&ctx).advanced_head_to_head(MI, CSK, None, None);
        assert_eq!(h2h, HeadToHead::no_matches());
    }
}
