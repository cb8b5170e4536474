use anyhow::{Context, Result};
use std::path::Path;

use crate::config::AppConfig;
use crate::models::{Delivery, ExtraType, MatchRecord, WinType};

// (team, home venue, batters, bowlers)
const TEAMS: [(&str, &str, [&str; 3], [&str; 2]); 4] = [
    (
        "Mumbai Indians",
        "Wankhede Stadium",
        ["RG Sharma", "Ishan Kishan", "SA Yadav"],
        ["JJ Bumrah", "TA Boult"],
    ),
    (
        "Chennai Super Kings",
        "MA Chidambaram Stadium",
        ["RD Gaikwad", "F du Plessis", "MS Dhoni"],
        ["DL Chahar", "RA Jadeja"],
    ),
    (
        "Royal Challengers Bangalore",
        "M Chinnaswamy Stadium",
        ["V Kohli", "AB de Villiers", "GJ Maxwell"],
        ["YS Chahal", "HV Patel"],
    ),
    (
        "Kolkata Knight Riders",
        "Eden Gardens",
        ["SP Narine", "AD Russell", "N Rana"],
        ["Varun Chakravarthy", "PJ Cummins"],
    ),
];

// (season label, year the matches are played in)
const SEASONS: [(&str, u32); 4] = [("2019", 2019), ("2020/21", 2020), ("2021", 2021), ("2022", 2022)];

// (batter runs, extra type, extras runs, wicket) cycled ball by ball
const BALL_PATTERN: [(u32, Option<ExtraType>, u32, bool); 16] = [
    (1, None, 0, false),
    (0, None, 0, false),
    (4, None, 0, false),
    (0, Some(ExtraType::Wide), 1, false),
    (2, None, 0, false),
    (6, None, 0, false),
    (0, None, 0, true),
    (1, None, 0, false),
    (0, Some(ExtraType::LegBye), 1, false),
    (3, None, 0, false),
    (1, Some(ExtraType::NoBall), 1, false),
    (0, None, 0, false),
    (4, None, 0, false),
    (0, Some(ExtraType::Bye), 4, false),
    (1, None, 0, false),
    (2, None, 0, false),
];

const BALLS_PER_INNINGS: u32 = 120;

/// A small deterministic two-table dataset in the source layout: four teams
/// playing home and away each season, with full ball-by-ball innings.
pub fn sample_dataset() -> (Vec<MatchRecord>, Vec<Delivery>) {
    let mut matches = Vec::new();
    let mut deliveries = Vec::new();
    let mut id = 1000u64;

    for (season, year) in SEASONS {
        let mut day = 0u32;
        for home in 0..TEAMS.len() {
            for away in 0..TEAMS.len() {
                if home == away {
                    continue;
                }
                id += 1;
                day += 1;
                let game = sample_match(id, season, year, day, home, away);
                let first = if batted_first(&game) { home } else { away };
                let second = if first == home { away } else { home };
                deliveries.extend(sample_innings(id, 0, first, second));
                deliveries.extend(sample_innings(id, 7, second, first));
                matches.push(game);
            }
        }
    }

    (matches, deliveries)
}

fn sample_match(id: u64, season: &str, year: u32, day: u32, home: usize, away: usize) -> MatchRecord {
    let (home_team, venue, home_batters, _) = TEAMS[home];
    let (away_team, _, away_batters, _) = TEAMS[away];

    let toss_winner = if id % 2 == 0 { home_team } else { away_team };
    let toss_decision = if id % 3 == 0 { "bat" } else { "field" };

    let (winning_team, won_by, margin, player_of_match) = if id % 17 == 0 {
        (None, WinType::NoResults, None, None)
    } else {
        let home_wins = id % 5 < 3;
        let winner = if home_wins { home_team } else { away_team };
        let star = if home_wins { home_batters[0] } else { away_batters[0] };
        let winner_batted_first = (winner == toss_winner) == (toss_decision == "bat");
        let (won_by, margin) = if winner_batted_first {
            (WinType::Runs, 5 + (id * 13 % 60) as u32)
        } else {
            (WinType::Wickets, 1 + (id * 7 % 9) as u32)
        };
        (Some(winner.to_string()), won_by, Some(margin), Some(star.to_string()))
    };

    MatchRecord {
        id,
        date: format!("{}-04-{:02}", year, day),
        season: season.to_string(),
        team1: home_team.to_string(),
        team2: away_team.to_string(),
        venue: venue.to_string(),
        toss_winner: toss_winner.to_string(),
        toss_decision: toss_decision.to_string(),
        winning_team,
        won_by,
        margin,
        player_of_match,
    }
}

fn batted_first(game: &MatchRecord) -> bool {
    (game.toss_winner == game.team1) == (game.toss_decision == "bat")
}

fn sample_innings(match_id: u64, offset: usize, batting: usize, bowling: usize) -> Vec<Delivery> {
    let (batting_team, _, batters, _) = TEAMS[batting];
    let (_, _, _, bowlers) = TEAMS[bowling];

    let mut balls = Vec::new();
    let mut legal = 0u32;
    let mut wickets = 0usize;
    let mut cursor = match_id as usize + offset;

    while legal < BALLS_PER_INNINGS {
        let (batter_runs, extra_type, extras_runs, is_wicket) = BALL_PATTERN[cursor % BALL_PATTERN.len()];
        cursor += 1;

        let over = legal / 6;
        let batter = batters[wickets % batters.len()];
        balls.push(Delivery {
            match_id,
            over,
            ball: legal % 6 + 1,
            batter: batter.to_string(),
            bowler: bowlers[(over % 2) as usize].to_string(),
            extra_type,
            batter_runs,
            extras_runs,
            total_runs: batter_runs + extras_runs,
            is_wicket,
            player_out: is_wicket.then(|| batter.to_string()),
            batting_team: batting_team.to_string(),
            bowling_team: None,
        });

        if is_wicket {
            wickets += 1;
        }
        if !matches!(extra_type, Some(ExtraType::Wide | ExtraType::NoBall)) {
            legal += 1;
        }
    }

    balls
}

/// Write the sample dataset as the two CSV files `config` points at.
pub fn write_sample_csv(config: &AppConfig) -> Result<usize> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating {}", config.data_dir.display()))?;

    let (matches, deliveries) = sample_dataset();
    write_rows(&config.matches_path(), &matches)?;
    write_rows(&config.deliveries_path(), &deliveries)?;

    tracing::info!(
        "Wrote {} sample matches and {} deliveries to {}",
        matches.len(),
        deliveries.len(),
        config.data_dir.display()
    );
    Ok(matches.len())
}

fn write_rows<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("opening {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AnalyticsContext;

    #[test]
    fn test_sample_dataset_shape() {
        let (matches, deliveries) = sample_dataset();
        assert_eq!(matches.len(), 48);
        assert!(matches.iter().all(|m| m.team1 != m.team2));
        assert!(matches
            .iter()
            .all(|m| m.winning_team.as_deref().map_or(true, |w| m.involves(w))));

        for game in &matches {
            let legal = deliveries
                .iter()
                .filter(|d| d.match_id == game.id && d.counts_as_bowled())
                .count();
            assert_eq!(legal, 2 * BALLS_PER_INNINGS as usize);
        }
    }

    #[test]
    fn test_sample_csv_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default().with_data_dir(dir.path());
        write_sample_csv(&config).unwrap();

        let (matches, deliveries) = sample_dataset();
        let ctx = AnalyticsContext::load(&config);
        assert_eq!(ctx.matches().len(), matches.len());
        assert_eq!(ctx.deliveries().len(), deliveries.len());
        assert_eq!(ctx.teams().len(), 4);
        assert_eq!(ctx.seasons(), ["2019", "2020/21", "2021", "2022"]);
        assert!(ctx
            .deliveries()
            .iter()
            .all(|d| d.bowling_team.as_deref().is_some_and(|b| b != d.batting_team)));
    }
}
