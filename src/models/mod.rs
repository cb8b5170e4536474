use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::utils::round2;

// ── Source tables ────────────────────────────────────────────────────────────

/// One historical match, one row of the matches CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Season")]
    pub season: String,
    #[serde(rename = "Team1")]
    pub team1: String,
    #[serde(rename = "Team2")]
    pub team2: String,
    #[serde(rename = "Venue")]
    pub venue: String,
    #[serde(rename = "TossWinner")]
    pub toss_winner: String,
    #[serde(rename = "TossDecision")]
    pub toss_decision: String,
    /// Absent for no-result matches.
    #[serde(rename = "WinningTeam", default, with = "na")]
    pub winning_team: Option<String>,
    #[serde(rename = "WonBy")]
    pub won_by: WinType,
    /// Absent when blank, `NA`, or not a number at all.
    #[serde(rename = "Margin", default, with = "whole::optional")]
    pub margin: Option<u32>,
    #[serde(rename = "Player_of_Match", default, with = "na")]
    pub player_of_match: Option<String>,
}

impl MatchRecord {
    pub fn match_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    pub fn involves(&self, team: &str) -> bool {
        self.team1 == team || self.team2 == team
    }

    /// True when the fixture is `a` against `b`, in either order.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.team1 == a && self.team2 == b) || (self.team1 == b && self.team2 == a)
    }

    pub fn won_by_team(&self, team: &str) -> bool {
        self.winning_team.as_deref() == Some(team)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinType {
    Runs,
    Wickets,
    NoResults,
    SuperOver,
    #[serde(other)]
    Unknown,
}

/// One ball bowled, one row of the deliveries CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    #[serde(rename = "ID")]
    pub match_id: u64,
    /// Zero-based over index within the innings; `3.4`-style values keep
    /// only the whole over.
    #[serde(rename = "overs", with = "whole")]
    pub over: u32,
    #[serde(rename = "ballnumber")]
    pub ball: u32,
    pub batter: String,
    pub bowler: String,
    #[serde(default, with = "na")]
    pub extra_type: Option<ExtraType>,
    #[serde(rename = "batsman_run")]
    pub batter_runs: u32,
    #[serde(rename = "extras_run")]
    pub extras_runs: u32,
    #[serde(rename = "total_run")]
    pub total_runs: u32,
    #[serde(rename = "isWicketDelivery", with = "flag")]
    pub is_wicket: bool,
    #[serde(default, with = "na")]
    pub player_out: Option<String>,
    #[serde(rename = "BattingTeam")]
    pub batting_team: String,
    /// Derived at load time from the match's two teams.
    #[serde(skip)]
    pub bowling_team: Option<String>,
}

impl Delivery {
    /// Wides never count as a ball faced.
    pub fn counts_as_faced(&self) -> bool {
        self.extra_type != Some(ExtraType::Wide)
    }

    /// Wides and no-balls are not part of the bowler's completed balls.
    pub fn counts_as_bowled(&self) -> bool {
        !matches!(self.extra_type, Some(ExtraType::Wide | ExtraType::NoBall))
    }

    /// Runs charged to the bowler: byes and leg-byes are never charged.
    pub fn bowler_runs(&self) -> u32 {
        match self.extra_type {
            Some(ExtraType::Bye | ExtraType::LegBye) => 0,
            _ => self.total_runs.saturating_sub(self.extras_runs),
        }
    }

    pub fn dismissed(&self, player: &str) -> bool {
        self.player_out.as_deref() == Some(player)
    }

    pub fn phase(&self) -> Option<Phase> {
        Phase::from_over(self.over)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraType {
    Wide,
    NoBall,
    Bye,
    LegBye,
    Penalty,
}

impl ExtraType {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtraType::Wide => "wides",
            ExtraType::NoBall => "noballs",
            ExtraType::Bye => "byes",
            ExtraType::LegBye => "legbyes",
            ExtraType::Penalty => "penalty",
        }
    }
}

impl fmt::Display for ExtraType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtraType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wides" | "wide" => Ok(ExtraType::Wide),
            "noballs" | "noball" => Ok(ExtraType::NoBall),
            "byes" | "bye" => Ok(ExtraType::Bye),
            "legbyes" | "legbye" => Ok(ExtraType::LegBye),
            "penalty" => Ok(ExtraType::Penalty),
            other => Err(format!("unknown extra type '{}'", other)),
        }
    }
}

// ── Cricket categories ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Powerplay,
    Middle,
    Death,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Powerplay, Phase::Middle, Phase::Death];

    /// Powerplay [0,6), Middle [6,15), Death [15,20); anything later has no phase.
    pub fn from_over(over: u32) -> Option<Phase> {
        match over {
            0..=5 => Some(Phase::Powerplay),
            6..=14 => Some(Phase::Middle),
            15..=19 => Some(Phase::Death),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Powerplay => "Powerplay",
            Phase::Middle => "Middle",
            Phase::Death => "Death",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Batsman,
    Bowler,
}

impl Role {
    /// "batsman" (or "batter") selects batting; any other value means bowling.
    pub fn from_param(raw: &str) -> Role {
        match raw.trim().to_ascii_lowercase().as_str() {
            "batsman" | "batter" => Role::Batsman,
            _ => Role::Bowler,
        }
    }
}

/// A ratio that may have no value because its denominator was zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rate {
    Value(f64),
    Undefined,
}

impl Rate {
    pub fn ratio(numerator: u32, denominator: u32) -> Rate {
        if denominator == 0 {
            Rate::Undefined
        } else {
            Rate::Value(round2(numerator as f64 / denominator as f64))
        }
    }

    pub fn is_undefined(self) -> bool {
        self == Rate::Undefined
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rate::Value(v) => write!(f, "{:.2}", v),
            Rate::Undefined => f.write_str("inf"),
        }
    }
}

impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rate::Value(v) => serializer.serialize_f64(*v),
            Rate::Undefined => serializer.serialize_str("inf"),
        }
    }
}

// ── Player analytics results ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattingSummary {
    pub innings: u32,
    pub total_runs: u32,
    pub balls_faced: u32,
    pub dismissals: u32,
    pub not_out: u32,
    pub average: Rate,
    pub strike_rate: f64,
    pub fifties: u32,
    pub hundreds: u32,
    pub highest_score: u32,
    pub fours: u32,
    pub sixes: u32,
    pub man_of_the_match: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BowlingSummary {
    pub innings: u32,
    pub overs_bowled: String,
    pub balls_bowled: u32,
    pub wickets: u32,
    pub runs_conceded: u32,
    pub average: Rate,
    pub economy: f64,
    pub strike_rate: Rate,
    pub three_wicket_hauls: u32,
    pub five_wicket_hauls: u32,
    /// `wickets/runs` of the best spell, or "N/A".
    pub best_figures: String,
    pub man_of_the_match: u32,
}

/// Either summary, or `{}` when the player has no deliveries in that role.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlayerSummary {
    Batting(BattingSummary),
    Bowling(BowlingSummary),
    Empty {},
}

/// Chronological runs series for charting; `seasons` and `runs` are parallel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonRuns {
    pub seasons: Vec<String>,
    pub runs: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupStats {
    pub runs_scored: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balls_faced: Option<u32>,
    pub dismissals: u32,
    pub strike_rate: f64,
}

impl MatchupStats {
    /// The pair never met.
    pub fn empty() -> Self {
        Self {
            runs_scored: 0,
            balls_faced: None,
            dismissals: 0,
            strike_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhaseBreakdown<T> {
    #[serde(rename = "Powerplay")]
    pub powerplay: T,
    #[serde(rename = "Middle")]
    pub middle: T,
    #[serde(rename = "Death")]
    pub death: T,
}

impl<T> PhaseBreakdown<T> {
    pub fn get(&self, phase: Phase) -> &T {
        match phase {
            Phase::Powerplay => &self.powerplay,
            Phase::Middle => &self.middle,
            Phase::Death => &self.death,
        }
    }

    pub fn get_mut(&mut self, phase: Phase) -> &mut T {
        match phase {
            Phase::Powerplay => &mut self.powerplay,
            Phase::Middle => &mut self.middle,
            Phase::Death => &mut self.death,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> PhaseBreakdown<U> {
        PhaseBreakdown {
            powerplay: f(self.powerplay),
            middle: f(self.middle),
            death: f(self.death),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BattingPhase {
    pub runs: u32,
    pub strike_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BowlingPhase {
    pub wickets: u32,
    pub economy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PhaseReport {
    Batting(PhaseBreakdown<BattingPhase>),
    Bowling(PhaseBreakdown<BowlingPhase>),
}

// ── Team analytics results ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeadToHead {
    NoMatches { summary: NoMatchesSummary },
    Report(Box<HeadToHeadReport>),
}

impl HeadToHead {
    pub fn no_matches() -> Self {
        HeadToHead::NoMatches {
            summary: NoMatchesSummary {
                message: "No matches found with the selected filters.".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoMatchesSummary {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadToHeadReport {
    pub team1: String,
    pub team2: String,
    pub summary: HeadToHeadSummary,
    pub toss_analysis: TossAnalysis,
    pub win_margins: Vec<TeamMargins>,
    pub streaks: Vec<TeamStreak>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadToHeadSummary {
    pub total_matches: u32,
    pub team1_wins: u32,
    pub team2_wins: u32,
    /// Includes no-result matches.
    pub draws: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TossAnalysis {
    pub toss_win_match_win_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMargins {
    pub team: String,
    #[serde(flatten)]
    pub margins: MarginStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarginStats {
    pub avg_run_margin: f64,
    pub max_run_margin: u32,
    pub big_run_wins: u32,
    pub avg_wicket_margin: f64,
    pub max_wicket_margin: u32,
    pub big_wicket_wins: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStreak {
    pub team: String,
    pub longest_streak: u32,
}

// ── Venue analytics results ──────────────────────────────────────────────────

/// Venues ordered by win percentage, highest first; the lists are parallel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FortressStats {
    pub venues: Vec<String>,
    pub win_percentages: Vec<f64>,
}

// ── Catalogs & prediction ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub teams: Vec<String>,
    pub venues: Vec<String>,
    pub seasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinPrediction {
    pub team1: String,
    pub team1_win_percent: f64,
    pub team2: String,
    pub team2_win_percent: f64,
}

// API Response types
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}

// ── CSV field codecs ─────────────────────────────────────────────────────────

/// Optional columns: `NA` or an empty field means absent.
mod na {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Display,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_str("NA"),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") | Some("NA") => Ok(None),
            Some(s) => s.parse().map(Some).map_err(de::Error::custom),
        }
    }
}

/// Counts that exports sometimes write as floats (`12.0`); the fraction is dropped.
mod whole {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<u32> {
        let s = raw.trim();
        s.parse::<u32>().ok().or_else(|| {
            s.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0 && *v <= f64::from(u32::MAX))
                .map(|v| v.trunc() as u32)
        })
    }

    pub fn serialize<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid whole number '{}'", raw)))
    }

    /// Optional variant: anything unparseable loads as absent instead of
    /// rejecting the row.
    pub mod optional {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
            super::super::na::serialize(value, serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            Ok(raw.as_deref().and_then(super::parse))
        }
    }
}

/// 0/1 columns.
mod flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim() {
            "1" | "true" | "True" => Ok(true),
            "0" | "false" | "False" | "" => Ok(false),
            other => Err(de::Error::custom(format!("invalid flag '{}'", other))),
        }
    }
}
