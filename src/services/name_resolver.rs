use crate::data::AnalyticsContext;
use crate::utils::title_case;

/// Minimum similarity for a fuzzy candidate to be accepted.
pub const SIMILARITY_CUTOFF: f64 = 0.6;

/// Abbreviations and nicknames, matched after lower-casing and trimming.
const TEAM_ALIASES: &[(&str, &str)] = &[
    ("mi", "Mumbai Indians"),
    ("mumbai", "Mumbai Indians"),
    ("rcb", "Royal Challengers Bangalore"),
    ("bangalore", "Royal Challengers Bangalore"),
    ("csk", "Chennai Super Kings"),
    ("chennai", "Chennai Super Kings"),
    ("dc", "Delhi Capitals"),
    ("delhi", "Delhi Capitals"),
    ("dd", "Delhi Daredevils"),
    ("srh", "Sunrisers Hyderabad"),
    ("sunrisers", "Sunrisers Hyderabad"),
    ("kkr", "Kolkata Knight Riders"),
    ("kolkata", "Kolkata Knight Riders"),
    ("kxip", "Kings XI Punjab"),
    ("punjab", "Punjab Kings"),
    ("pbks", "Punjab Kings"),
    ("rr", "Rajasthan Royals"),
    ("rajasthan", "Rajasthan Royals"),
    ("gt", "Gujarat Titans"),
    ("gujarat", "Gujarat Titans"),
    ("lsg", "Lucknow Super Giants"),
    ("lucknow", "Lucknow Super Giants"),
];

/// Normalized Levenshtein similarity in [0, 1]; 1 means identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Index of the most similar candidate scoring at least `SIMILARITY_CUTOFF`.
/// Ties go to the earliest candidate.
pub fn closest_match<'c>(query: &str, candidates: impl IntoIterator<Item = &'c str>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates.into_iter().enumerate() {
        let score = similarity(query, candidate);
        if score < SIMILARITY_CUTOFF {
            continue;
        }
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}

pub fn team_alias(key: &str) -> Option<&'static str> {
    TEAM_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, team)| *team)
}

/// Maps free-text team and player names onto the dataset's canonical names.
/// The result is advisory: unmatched input comes back unchanged.
pub struct NameResolver<'a> {
    ctx: &'a AnalyticsContext,
}

impl<'a> NameResolver<'a> {
    pub fn new(ctx: &'a AnalyticsContext) -> Self {
        Self { ctx }
    }

    pub fn resolve_team(&self, raw: &str) -> String {
        let key = raw.trim().to_lowercase();
        if let Some(team) = team_alias(&key) {
            return team.to_string();
        }

        let teams = self.ctx.teams();
        if let Some(team) = teams.iter().find(|t| t.to_lowercase() == key) {
            return team.clone();
        }

        let query = title_case(raw.trim());
        match closest_match(&query, teams.iter().map(String::as_str)) {
            Some(index) => {
                tracing::debug!("Resolved team '{}' to '{}'", raw, teams[index]);
                teams[index].clone()
            }
            None => raw.to_string(),
        }
    }

    pub fn resolve_player(&self, raw: &str) -> String {
        let key = raw.trim().to_lowercase();
        let names = self.ctx.player_names();
        let folded = self.ctx.folded_player_names();

        if let Some(index) = folded.iter().position(|p| *p == key) {
            return names[index].clone();
        }

        match closest_match(&key, folded.iter().map(String::as_str)) {
            Some(index) => {
                tracing::debug!("Resolved player '{}' to '{}'", raw, names[index]);
                names[index].clone()
            }
            None => raw.to_string(),
        }
    }
}
