use anyhow::Result;

use crate::config::AppConfig;
use crate::data::{seed, AnalyticsContext};
use crate::models::{HeadToHead, Phase, PhaseReport, PlayerSummary, Role};
use crate::services::{
    MatchFeatures, NameResolver, PlayerAnalytics, TeamAnalytics, VenueAnalytics, WinPredictor,
};

fn load(config: &AppConfig) -> AnalyticsContext {
    let ctx = AnalyticsContext::load(config);
    if ctx.is_empty() {
        println!(
            "📭 No data found in {}. Try generating a sample with: cricket-analytics seed",
            config.data_dir.display()
        );
    }
    ctx
}

fn announce_correction(kind: &str, raw: &str, resolved: &str) {
    if raw != resolved {
        println!("🔎 Interpreting {} '{}' as '{}'", kind, raw, resolved);
    }
}

pub fn show_player(config: &AppConfig, name: &str, role: &str) -> Result<()> {
    let ctx = load(config);
    let player = NameResolver::new(&ctx).resolve_player(name);
    announce_correction("player", name, &player);

    let role = Role::from_param(role);
    match PlayerAnalytics::new(&ctx).summary(&player, role) {
        PlayerSummary::Batting(s) => {
            println!("🏏 Batting record: {}", player);
            println!("   Innings: {} | Not out: {}", s.innings, s.not_out);
            println!("   Runs: {} off {} balls (SR {:.2})", s.total_runs, s.balls_faced, s.strike_rate);
            if s.average.is_undefined() {
                println!("   Average: - (never dismissed)");
            } else {
                println!("   Average: {}", s.average);
            }
            println!("   50s: {} | 100s: {} | Highest: {}", s.fifties, s.hundreds, s.highest_score);
            println!("   4s: {} | 6s: {}", s.fours, s.sixes);
            println!("   Player of the match: {}", s.man_of_the_match);
        }
        PlayerSummary::Bowling(s) => {
            println!("🎯 Bowling record: {}", player);
            println!("   Innings: {} | Overs: {}", s.innings, s.overs_bowled);
            println!("   Wickets: {} for {} runs", s.wickets, s.runs_conceded);
            println!(
                "   Average: {} | Economy: {:.2} | Strike rate: {}",
                s.average, s.economy, s.strike_rate
            );
            println!(
                "   3W: {} | 5W: {} | Best: {}",
                s.three_wicket_hauls, s.five_wicket_hauls, s.best_figures
            );
            println!("   Player of the match: {}", s.man_of_the_match);
        }
        PlayerSummary::Empty {} => {
            println!("❌ No deliveries found for '{}' in that role", player);
        }
    }

    Ok(())
}

pub fn show_seasons(config: &AppConfig, name: &str) -> Result<()> {
    let ctx = load(config);
    let player = NameResolver::new(&ctx).resolve_player(name);
    announce_correction("player", name, &player);

    let series = PlayerAnalytics::new(&ctx).runs_per_season(&player);
    if series.seasons.is_empty() {
        println!("❌ No runs recorded for '{}'", player);
        return Ok(());
    }

    println!("📅 Runs per season: {}", player);
    for (season, runs) in series.seasons.iter().zip(&series.runs) {
        println!("   {:>8}  {}", season, runs);
    }

    Ok(())
}

pub fn show_matchup(config: &AppConfig, batsman: &str, bowler: &str) -> Result<()> {
    let ctx = load(config);
    let resolver = NameResolver::new(&ctx);
    let batsman_name = resolver.resolve_player(batsman);
    let bowler_name = resolver.resolve_player(bowler);
    announce_correction("batsman", batsman, &batsman_name);
    announce_correction("bowler", bowler, &bowler_name);

    let stats = PlayerAnalytics::new(&ctx).vs_player(&batsman_name, &bowler_name);
    println!("⚔️  {} vs {}", batsman_name, bowler_name);
    match stats.balls_faced {
        Some(balls) => {
            println!("   Runs: {} off {} balls (SR {:.2})", stats.runs_scored, balls, stats.strike_rate);
            println!("   Dismissals: {}", stats.dismissals);
        }
        None => println!("   These players have never faced each other"),
    }

    Ok(())
}

pub fn show_phases(config: &AppConfig, name: &str, role: &str) -> Result<()> {
    let ctx = load(config);
    let player = NameResolver::new(&ctx).resolve_player(name);
    announce_correction("player", name, &player);

    println!("⏱️  Phase breakdown: {}", player);
    match PlayerAnalytics::new(&ctx).performance_by_phase(&player, Role::from_param(role)) {
        PhaseReport::Batting(phases) => {
            for phase in Phase::ALL {
                let stats = phases.get(phase);
                println!("   {:<10} {} runs (SR {:.2})", phase.label(), stats.runs, stats.strike_rate);
            }
        }
        PhaseReport::Bowling(phases) => {
            for phase in Phase::ALL {
                let stats = phases.get(phase);
                println!("   {:<10} {} wickets (econ {:.2})", phase.label(), stats.wickets, stats.economy);
            }
        }
    }

    Ok(())
}

pub fn show_head_to_head(
    config: &AppConfig,
    team1: &str,
    team2: &str,
    season: Option<&str>,
    venue: Option<&str>,
) -> Result<()> {
    let ctx = load(config);
    let resolver = NameResolver::new(&ctx);
    let first = resolver.resolve_team(team1);
    let second = resolver.resolve_team(team2);
    announce_correction("team", team1, &first);
    announce_correction("team", team2, &second);

    let report = match TeamAnalytics::new(&ctx).advanced_head_to_head(&first, &second, season, venue) {
        HeadToHead::NoMatches { summary } => {
            println!("📭 {}", summary.message);
            return Ok(());
        }
        HeadToHead::Report(report) => report,
    };

    let summary = &report.summary;
    println!("🏆 {} vs {}", report.team1, report.team2);
    println!("   Matches: {}", summary.total_matches);
    println!(
        "   {} wins: {} | {} wins: {} | No decision: {}",
        report.team1, summary.team1_wins, report.team2, summary.team2_wins, summary.draws
    );
    println!(
        "   Toss winner won the match: {:.2}%",
        report.toss_analysis.toss_win_match_win_percent
    );

    println!("\n📏 Win margins:");
    for entry in &report.win_margins {
        let m = &entry.margins;
        println!(
            "   {}: avg {:.2} runs (max {}, {} big) | avg {:.2} wickets (max {}, {} big)",
            entry.team,
            m.avg_run_margin,
            m.max_run_margin,
            m.big_run_wins,
            m.avg_wicket_margin,
            m.max_wicket_margin,
            m.big_wicket_wins
        );
    }

    println!("\n🔥 Longest winning streaks:");
    for streak in &report.streaks {
        println!("   {}: {}", streak.team, streak.longest_streak);
    }

    Ok(())
}

pub fn show_fortress(config: &AppConfig, team: &str) -> Result<()> {
    let ctx = load(config);
    let resolved = NameResolver::new(&ctx).resolve_team(team);
    announce_correction("team", team, &resolved);

    let stats = VenueAnalytics::new(&ctx).fortress_stats(&resolved);
    if stats.venues.is_empty() {
        println!("❌ No venue with enough matches for '{}'", resolved);
        return Ok(());
    }

    println!("🏟️  Fortress venues: {}", resolved);
    for (i, (venue, pct)) in stats.venues.iter().zip(&stats.win_percentages).enumerate() {
        println!("{}. {} - {:.2}%", i + 1, venue, pct);
    }

    Ok(())
}

pub fn show_catalog(config: &AppConfig) -> Result<()> {
    let catalog = load(config).catalog();

    println!("🏏 Teams ({}):", catalog.teams.len());
    for team in &catalog.teams {
        println!("   • {}", team);
    }
    println!("\n🏟️  Venues ({}):", catalog.venues.len());
    for venue in &catalog.venues {
        println!("   • {}", venue);
    }
    println!("\n📅 Seasons: {}", catalog.seasons.join(", "));

    println!("\n💡 Use 'cricket-analytics head-to-head --team1 <a> --team2 <b>' to compare teams");
    Ok(())
}

pub fn predict(config: &AppConfig, features: MatchFeatures) -> Result<()> {
    let ctx = load(config);
    let resolver = NameResolver::new(&ctx);
    let features = MatchFeatures {
        team1: resolver.resolve_team(&features.team1),
        team2: resolver.resolve_team(&features.team2),
        toss_winner: resolver.resolve_team(&features.toss_winner),
        ..features
    };

    let predictor = WinPredictor::load(&config.model_path);
    let prediction = predictor.predict(&features)?;

    println!("🔮 {} vs {} at {}", prediction.team1, prediction.team2, features.venue);
    println!(
        "   {} won the toss and chose to {}",
        features.toss_winner, features.toss_decision
    );
    println!("   {}: {:.2}%", prediction.team1, prediction.team1_win_percent);
    println!("   {}: {:.2}%", prediction.team2, prediction.team2_win_percent);

    Ok(())
}

pub fn seed(config: &AppConfig) -> Result<()> {
    println!("🌱 Writing sample dataset to {}...", config.data_dir.display());
    let count = seed::write_sample_csv(config)?;
    println!("✅ Wrote {} matches", count);
    println!("   {}", config.matches_path().display());
    println!("   {}", config.deliveries_path().display());
    Ok(())
}
