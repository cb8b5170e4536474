use std::collections::BTreeMap;

use crate::data::AnalyticsContext;
use crate::models::FortressStats;
use crate::utils::percentage;

/// Venues with fewer matches than this are left out of fortress rankings.
pub const MIN_VENUE_MATCHES: u32 = 5;

pub struct VenueAnalytics<'a> {
    ctx: &'a AnalyticsContext,
}

impl<'a> VenueAnalytics<'a> {
    pub fn new(ctx: &'a AnalyticsContext) -> Self {
        Self { ctx }
    }

    /// Win percentage at each venue where `team` has played at least
    /// `MIN_VENUE_MATCHES` matches, best first.
    pub fn fortress_stats(&self, team: &str) -> FortressStats {
        // venue -> (played, won)
        let mut by_venue: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
        for game in self.ctx.matches().iter().filter(|m| m.involves(team)) {
            let entry = by_venue.entry(game.venue.as_str()).or_default();
            entry.0 += 1;
            entry.1 += u32::from(game.won_by_team(team));
        }

        let mut rows: Vec<(&str, f64)> = by_venue
            .into_iter()
            .filter(|(_, (played, _))| *played >= MIN_VENUE_MATCHES)
            .map(|(venue, (played, won))| (venue, percentage(won, played)))
            .collect();
        rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let (venues, win_percentages) = rows
            .into_iter()
            .map(|(venue, pct)| (venue.to_string(), pct))
            .unzip();
        FortressStats {
            venues,
            win_percentages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{game, won};
    use crate::models::{MatchRecord, WinType};

    const MI: &str = "Mumbai Indians";

    fn at(mut game: MatchRecord, venue: &str) -> MatchRecord {
        game.venue = venue.to_string();
        game
    }

    fn context() -> AnalyticsContext {
        let mut matches = Vec::new();
        let mut id = 0;
        let mut next = || {
            id += 1;
            id
        };
        // Wankhede: 6 played, 5 won.
        for i in 0..6 {
            let g = game(next(), "2022-04-01", MI, "Chennai Super Kings");
            matches.push(if i < 5 {
                won(g, MI, WinType::Runs, 10)
            } else {
                won(g, "Chennai Super Kings", WinType::Runs, 10)
            });
        }
        // Eden Gardens: 5 played, 2 won, one with no result.
        for i in 0..5 {
            let g = at(game(next(), "2022-04-01", "Kolkata Knight Riders", MI), "Eden Gardens");
            matches.push(match i {
                0 | 1 => won(g, MI, WinType::Wickets, 5),
                2 => g,
                _ => won(g, "Kolkata Knight Riders", WinType::Wickets, 5),
            });
        }
        // Chinnaswamy: one win only, below the sample-size floor.
        matches.push(won(
            at(game(next(), "2022-04-01", MI, "Royal Challengers Bangalore"), "M Chinnaswamy Stadium"),
            MI,
            WinType::Runs,
            1,
        ));
        AnalyticsContext::new(matches, vec![])
    }

    #[test]
    fn test_fortress_ranking() {
        let ctx = context();
        let stats = VenueAnalytics::new(&ctx).fortress_stats(MI);
        assert_eq!(stats.venues, vec!["Wankhede Stadium", "Eden Gardens"]);
        assert_eq!(stats.win_percentages, vec![83.33, 40.0]);
    }

    #[test]
    fn test_small_samples_are_dropped_even_at_100_percent() {
        let ctx = context();
        let stats = VenueAnalytics::new(&ctx).fortress_stats(MI);
        assert!(!stats.venues.iter().any(|v| v == "M Chinnaswamy Stadium"));

        let rcb = VenueAnalytics::new(&ctx).fortress_stats("Royal Challengers Bangalore");
        assert_eq!(rcb, FortressStats::default());
    }

    #[test]
    fn test_unknown_team_and_empty_context() {
        let ctx = context();
        assert_eq!(
            VenueAnalytics::new(&ctx).fortress_stats("Nobody"),
            FortressStats::default()
        );
        let empty = AnalyticsContext::empty();
        assert_eq!(
            VenueAnalytics::new(&empty).fortress_stats(MI),
            FortressStats::default()
        );
    }
}
