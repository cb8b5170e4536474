pub mod seed;

use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::{Catalog, Delivery, MatchRecord};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// The loaded dataset: both tables joined, plus the name index and catalogs.
///
/// Built once at startup and shared read-only by every analytics call.
#[derive(Debug, Default)]
pub struct AnalyticsContext {
    matches: Vec<MatchRecord>,
    deliveries: Vec<Delivery>,
    match_index: HashMap<u64, usize>,
    player_names: Vec<String>,
    folded_player_names: Vec<String>,
    teams: Vec<String>,
    venues: Vec<String>,
    seasons: Vec<String>,
}

impl AnalyticsContext {
    /// Join deliveries to their matches, derive each delivery's bowling team,
    /// and build the player index and catalogs.
    pub fn new(matches: Vec<MatchRecord>, mut deliveries: Vec<Delivery>) -> Self {
        let match_index: HashMap<u64, usize> = matches
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id, i))
            .collect();

        for delivery in &mut deliveries {
            delivery.bowling_team = match_index.get(&delivery.match_id).map(|&i| {
                let game = &matches[i];
                if delivery.batting_team == game.team1 {
                    game.team2.clone()
                } else {
                    game.team1.clone()
                }
            });
        }

        let player_names: Vec<String> = deliveries
            .iter()
            .flat_map(|d| [d.batter.as_str(), d.bowler.as_str()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        let folded_player_names = player_names.iter().map(|p| p.to_lowercase()).collect();

        let teams = sorted_distinct(matches.iter().flat_map(|m| [m.team1.as_str(), m.team2.as_str()]));
        let venues = sorted_distinct(matches.iter().map(|m| m.venue.as_str()));
        let seasons = sorted_distinct(matches.iter().map(|m| m.season.as_str()));

        Self {
            matches,
            deliveries,
            match_index,
            player_names,
            folded_player_names,
            teams,
            venues,
            seasons,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Load both CSV files named by `config`. Any failure is logged and yields
    /// an empty context so callers get empty results instead of errors.
    pub fn load(config: &AppConfig) -> Self {
        match Self::try_load(&config.matches_path(), &config.deliveries_path()) {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::warn!("Dataset unavailable, serving empty results: {}", e);
                Self::empty()
            }
        }
    }

    pub fn try_load(matches_path: &Path, deliveries_path: &Path) -> Result<Self, LoadError> {
        let matches: Vec<MatchRecord> = read_table(matches_path)?;
        let deliveries: Vec<Delivery> = read_table(deliveries_path)?;

        let ctx = Self::new(matches, deliveries);
        tracing::info!(
            "Loaded {} matches, {} deliveries, {} players",
            ctx.matches.len(),
            ctx.deliveries.len(),
            ctx.player_names.len()
        );
        Ok(ctx)
    }

    /// True when either table is missing; every analytics call checks this first.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() || self.deliveries.is_empty()
    }

    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    pub fn match_by_id(&self, id: u64) -> Option<&MatchRecord> {
        self.match_index.get(&id).map(|&i| &self.matches[i])
    }

    /// Distinct batter and bowler names, sorted.
    pub fn player_names(&self) -> &[String] {
        &self.player_names
    }

    /// Lower-cased `player_names`, index-aligned with it.
    pub fn folded_player_names(&self) -> &[String] {
        &self.folded_player_names
    }

    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn venues(&self) -> &[String] {
        &self.venues
    }

    pub fn seasons(&self) -> &[String] {
        &self.seasons
    }

    pub fn catalog(&self) -> Catalog {
        Catalog {
            teams: self.teams.clone(),
            venues: self.venues.clone(),
            seasons: self.seasons.clone(),
        }
    }
}

fn sorted_distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Read every row of a CSV table, skipping (and counting) rows that don't parse.
fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    if !path.exists() {
        return Err(LoadError::Missing(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    let mut first_error: Option<csv::Error> = None;
    for record in reader.deserialize::<T>() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                first_error.get_or_insert(e);
            }
        }
    }

    if let Some(e) = first_error {
        tracing::warn!(
            "Skipped {} malformed rows in {} (first: {})",
            skipped,
            path.display(),
            e
        );
    }
    Ok(rows)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{Delivery, MatchRecord, WinType};

    /// A match with no result; tests override what they need.
    pub fn game(id: u64, date: &str, team1: &str, team2: &str) -> MatchRecord {
        MatchRecord {
            id,
            date: date.to_string(),
            season: date.get(..4).unwrap_or(date).to_string(),
            team1: team1.to_string(),
            team2: team2.to_string(),
            venue: "Wankhede Stadium".to_string(),
            toss_winner: team1.to_string(),
            toss_decision: "bat".to_string(),
            winning_team: None,
            won_by: WinType::NoResults,
            margin: None,
            player_of_match: None,
        }
    }

    pub fn won(mut game: MatchRecord, winner: &str, won_by: WinType, margin: u32) -> MatchRecord {
        game.winning_team = Some(winner.to_string());
        game.won_by = won_by;
        game.margin = Some(margin);
        game
    }

    /// A dot ball.
    pub fn ball(match_id: u64, over: u32, batter: &str, bowler: &str, batting_team: &str) -> Delivery {
        Delivery {
            match_id,
            over,
            ball: 1,
            batter: batter.to_string(),
            bowler: bowler.to_string(),
            extra_type: None,
            batter_runs: 0,
            extras_runs: 0,
            total_runs: 0,
            is_wicket: false,
            player_out: None,
            batting_team: batting_team.to_string(),
            bowling_team: None,
        }
    }

    pub fn runs(mut delivery: Delivery, batter_runs: u32) -> Delivery {
        delivery.batter_runs = batter_runs;
        delivery.total_runs = batter_runs + delivery.extras_runs;
        delivery
    }

    pub fn wicket(mut delivery: Delivery) -> Delivery {
        delivery.is_wicket = true;
        delivery.player_out = Some(delivery.batter.clone());
        delivery
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{ball, game};
    use super::*;

    #[test]
    fn test_bowling_team_is_the_other_side() {
        let matches = vec![game(1, "2022-04-01", "Mumbai Indians", "Chennai Super Kings")];
        let deliveries = vec![
            ball(1, 0, "RG Sharma", "DL Chahar", "Mumbai Indians"),
            ball(1, 0, "RD Gaikwad", "JJ Bumrah", "Chennai Super Kings"),
            ball(99, 0, "Orphan", "Nobody", "Mumbai Indians"),
        ];
        let ctx = AnalyticsContext::new(matches, deliveries);

        let bowling: Vec<Option<&str>> = ctx
            .deliveries()
            .iter()
            .map(|d| d.bowling_team.as_deref())
            .collect();
        assert_eq!(
            bowling,
            vec![Some("Chennai Super Kings"), Some("Mumbai Indians"), None]
        );
    }

    #[test]
    fn test_player_index_is_deduplicated() {
        let matches = vec![game(1, "2022-04-01", "A", "B")];
        let deliveries = vec![
            ball(1, 0, "Kohli", "Bumrah", "A"),
            ball(1, 0, "Kohli", "Bumrah", "A"),
            ball(1, 1, "Bumrah", "Kohli", "B"),
        ];
        let ctx = AnalyticsContext::new(matches, deliveries);
        assert_eq!(ctx.player_names(), ["Bumrah", "Kohli"]);
        assert_eq!(ctx.folded_player_names(), ["bumrah", "kohli"]);
    }

    #[test]
    fn test_catalogs_are_sorted_and_distinct() {
        let mut second = game(2, "2021-04-01", "C", "A");
        second.venue = "Eden Gardens".to_string();
        let ctx = AnalyticsContext::new(vec![game(1, "2022-04-01", "B", "A"), second], vec![]);
        assert_eq!(ctx.teams(), ["A", "B", "C"]);
        assert_eq!(ctx.venues(), ["Eden Gardens", "Wankhede Stadium"]);
        assert_eq!(ctx.seasons(), ["2021", "2022"]);
    }

    #[test]
    fn test_missing_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default().with_data_dir(dir.path());
        let ctx = AnalyticsContext::load(&config);
        assert!(ctx.is_empty());
        assert!(ctx.teams().is_empty());
        assert!(ctx.player_names().is_empty());

        let err = AnalyticsContext::try_load(&config.matches_path(), &config.deliveries_path())
            .unwrap_err();
        assert!(matches!(err, LoadError::Missing(_)));
    }

    #[test]
    fn test_reads_source_layout_with_na_values() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default().with_data_dir(dir.path());
        std::fs::write(
            config.matches_path(),
            "ID,City,Date,Season,MatchNumber,Team1,Team2,Venue,TossWinner,TossDecision,SuperOver,WinningTeam,WonBy,Margin,method,Player_of_Match\n\
             10,Mumbai,2022-05-01,2022,1,Mumbai Indians,Chennai Super Kings,Wankhede Stadium,Mumbai Indians,bat,N,Mumbai Indians,Runs,12,NA,RG Sharma\n\
             11,Mumbai,2022-05-03,2022,2,Chennai Super Kings,Mumbai Indians,Wankhede Stadium,Chennai Super Kings,field,N,NA,NoResults,NA,NA,NA\n",
        )
        .unwrap();
        std::fs::write(
            config.deliveries_path(),
            "ID,innings,overs,ballnumber,batter,bowler,non-striker,extra_type,batsman_run,extras_run,total_run,non_boundary,isWicketDelivery,player_out,kind,fielders_involved,BattingTeam\n\
             10,1,0,1,RG Sharma,DL Chahar,Ishan Kishan,NA,4,0,4,0,0,NA,NA,NA,Mumbai Indians\n\
             10,1,0,2,RG Sharma,DL Chahar,Ishan Kishan,wides,0,1,1,0,0,NA,NA,NA,Mumbai Indians\n\
             10,1,0,3,RG Sharma,DL Chahar,Ishan Kishan,NA,0,0,0,0,1,RG Sharma,caught,MS Dhoni,Mumbai Indians\n\
             10,1,0,4,not-a-number,DL Chahar,Ishan Kishan,NA,x,0,0,0,0,NA,NA,NA,Mumbai Indians\n",
        )
        .unwrap();

        let ctx = AnalyticsContext::load(&config);
        assert_eq!(ctx.matches().len(), 2);
        assert_eq!(ctx.deliveries().len(), 3, "the malformed row is skipped");

        let no_result = ctx.match_by_id(11).unwrap();
        assert_eq!(no_result.winning_team, None);
        assert_eq!(no_result.margin, None);
        assert_eq!(no_result.player_of_match, None);

        let wide = &ctx.deliveries()[1];
        assert_eq!(wide.extra_type, Some(crate::models::ExtraType::Wide));
        let out = &ctx.deliveries()[2];
        assert!(out.is_wicket);
        assert_eq!(out.player_out.as_deref(), Some("RG Sharma"));
        assert_eq!(out.bowling_team.as_deref(), Some("Chennai Super Kings"));
    }

    #[test]
    fn test_fractional_margin_and_overs_keep_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default().with_data_dir(dir.path());
        std::fs::write(
            config.matches_path(),
            "ID,Date,Season,Team1,Team2,Venue,TossWinner,TossDecision,WinningTeam,WonBy,Margin,Player_of_Match\n\
             20,2022-05-01,2022,Mumbai Indians,Chennai Super Kings,Wankhede Stadium,Mumbai Indians,bat,Mumbai Indians,Runs,12.0,RG Sharma\n\
             21,2022-05-03,2022,Chennai Super Kings,Mumbai Indians,Wankhede Stadium,Chennai Super Kings,field,Chennai Super Kings,Wickets,n/a,MS Dhoni\n",
        )
        .unwrap();
        std::fs::write(
            config.deliveries_path(),
            "ID,overs,ballnumber,batter,bowler,extra_type,batsman_run,extras_run,total_run,isWicketDelivery,player_out,BattingTeam\n\
             20,0,1,RG Sharma,DL Chahar,NA,4,0,4,0,NA,Mumbai Indians\n\
             20,15.0,2,RG Sharma,DL Chahar,NA,6,0,6,0,NA,Mumbai Indians\n",
        )
        .unwrap();

        let ctx = AnalyticsContext::load(&config);
        assert_eq!(ctx.matches().len(), 2, "odd margins must not drop the match");
        assert_eq!(ctx.match_by_id(20).unwrap().margin, Some(12));
        assert_eq!(ctx.match_by_id(21).unwrap().margin, None);

        assert_eq!(ctx.deliveries().len(), 2);
        let death = &ctx.deliveries()[1];
        assert_eq!(death.over, 15);
        assert_eq!(death.phase(), Some(crate::models::Phase::Death));
        assert_eq!(death.bowling_team.as_deref(), Some("Chennai Super Kings"));
    }
}
