use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::data::AnalyticsContext;
use crate::models::{
    ApiResponse, FortressStats, HeadToHead, MatchupStats, PhaseReport, PlayerSummary, Role,
    SeasonRuns, WinPrediction,
};
use crate::services::{
    MatchFeatures, NameResolver, PlayerAnalytics, PredictionError, TeamAnalytics, VenueAnalytics,
    WinPredictor,
};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<AnalyticsContext>,
    pub predictor: Arc<WinPredictor>,
}

impl AppState {
    pub fn new(ctx: AnalyticsContext, predictor: WinPredictor) -> Self {
        Self {
            ctx: Arc::new(ctx),
            predictor: Arc::new(predictor),
        }
    }

    fn resolver(&self) -> NameResolver<'_> {
        NameResolver::new(&self.ctx)
    }
}

pub async fn serve(config: AppConfig, port: u16) -> anyhow::Result<()> {
    let loader_config = config.clone();
    let (ctx, predictor) = tokio::task::spawn_blocking(move || {
        (
            AnalyticsContext::load(&loader_config),
            WinPredictor::load(&loader_config.model_path),
        )
    })
    .await?;

    let model_status = if predictor.is_loaded() { "ready" } else { "unavailable" };
    let app = create_router().with_state(AppState::new(ctx, predictor));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!(
        "Cricket analytics API listening on port {} (win predictor {})",
        port,
        model_status
    );

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/teams", get(teams_handler))
        .route("/api/venues", get(venues_handler))
        .route("/api/seasons", get(seasons_handler))
        .route("/api/team-head-to-head", get(team_head_to_head_handler))
        .route("/api/player-stats", get(player_stats_handler))
        .route("/api/player-runs-per-season", get(runs_per_season_handler))
        .route("/api/player-head-to-head", get(player_head_to_head_handler))
        .route("/api/phase-analysis", get(phase_analysis_handler))
        .route("/api/venue-fortress", get(venue_fortress_handler))
        .route("/api/predict", get(predict_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("Cricket analytics API is running"))
}

// GET /api/teams, /api/venues, /api/seasons
async fn teams_handler(State(state): State<AppState>) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::success(state.ctx.teams().to_vec()))
}

async fn venues_handler(State(state): State<AppState>) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::success(state.ctx.venues().to_vec()))
}

async fn seasons_handler(State(state): State<AppState>) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::success(state.ctx.seasons().to_vec()))
}

// GET /api/team-head-to-head
#[derive(Deserialize)]
pub struct HeadToHeadQuery {
    team1: String,
    team2: String,
    season: Option<String>,
    venue: Option<String>,
}

#[derive(Serialize)]
pub struct HeadToHeadResponse {
    corrected_team1: String,
    corrected_team2: String,
    #[serde(flatten)]
    result: HeadToHead,
}

async fn team_head_to_head_handler(
    State(state): State<AppState>,
    Query(params): Query<HeadToHeadQuery>,
) -> Json<ApiResponse<HeadToHeadResponse>> {
    let resolver = state.resolver();
    let team1 = resolver.resolve_team(&params.team1);
    let team2 = resolver.resolve_team(&params.team2);

    let result = TeamAnalytics::new(&state.ctx).advanced_head_to_head(
        &team1,
        &team2,
        params.season.as_deref(),
        params.venue.as_deref(),
    );

    Json(ApiResponse::success(HeadToHeadResponse {
        corrected_team1: team1,
        corrected_team2: team2,
        result,
    }))
}

// GET /api/player-stats
#[derive(Deserialize)]
pub struct PlayerQuery {
    player: String,
    role: Option<String>,
}

impl PlayerQuery {
    fn role(&self) -> Role {
        self.role.as_deref().map(Role::from_param).unwrap_or(Role::Batsman)
    }
}

#[derive(Serialize)]
pub struct PlayerStatsResponse {
    corrected_name: String,
    role: Role,
    summary: PlayerSummary,
}

async fn player_stats_handler(
    State(state): State<AppState>,
    Query(params): Query<PlayerQuery>,
) -> Json<ApiResponse<PlayerStatsResponse>> {
    let player = state.resolver().resolve_player(&params.player);
    let role = params.role();
    let summary = PlayerAnalytics::new(&state.ctx).summary(&player, role);

    Json(ApiResponse::success(PlayerStatsResponse {
        corrected_name: player,
        role,
        summary,
    }))
}

// GET /api/player-runs-per-season
#[derive(Deserialize)]
pub struct SeasonRunsQuery {
    player: String,
}

#[derive(Serialize)]
pub struct SeasonRunsResponse {
    corrected_name: String,
    #[serde(flatten)]
    series: SeasonRuns,
}

async fn runs_per_season_handler(
    State(state): State<AppState>,
    Query(params): Query<SeasonRunsQuery>,
) -> Json<ApiResponse<SeasonRunsResponse>> {
    let player = state.resolver().resolve_player(&params.player);
    let series = PlayerAnalytics::new(&state.ctx).runs_per_season(&player);

    Json(ApiResponse::success(SeasonRunsResponse {
        corrected_name: player,
        series,
    }))
}

// GET /api/player-head-to-head
#[derive(Deserialize)]
pub struct MatchupQuery {
    batsman: String,
    bowler: String,
}

#[derive(Serialize)]
pub struct MatchupResponse {
    corrected_batsman: String,
    corrected_bowler: String,
    stats: MatchupStats,
}

async fn player_head_to_head_handler(
    State(state): State<AppState>,
    Query(params): Query<MatchupQuery>,
) -> Json<ApiResponse<MatchupResponse>> {
    let resolver = state.resolver();
    let batsman = resolver.resolve_player(&params.batsman);
    let bowler = resolver.resolve_player(&params.bowler);
    let stats = PlayerAnalytics::new(&state.ctx).vs_player(&batsman, &bowler);

    Json(ApiResponse::success(MatchupResponse {
        corrected_batsman: batsman,
        corrected_bowler: bowler,
        stats,
    }))
}

// GET /api/phase-analysis
#[derive(Serialize)]
pub struct PhaseResponse {
    corrected_player: String,
    role: Role,
    stats: PhaseReport,
}

async fn phase_analysis_handler(
    State(state): State<AppState>,
    Query(params): Query<PlayerQuery>,
) -> Json<ApiResponse<PhaseResponse>> {
    let player = state.resolver().resolve_player(&params.player);
    let role = params.role();
    let stats = PlayerAnalytics::new(&state.ctx).performance_by_phase(&player, role);

    Json(ApiResponse::success(PhaseResponse {
        corrected_player: player,
        role,
        stats,
    }))
}

// GET /api/venue-fortress
#[derive(Deserialize)]
pub struct FortressQuery {
    team: String,
}

#[derive(Serialize)]
pub struct FortressResponse {
    corrected_team: String,
    #[serde(flatten)]
    stats: FortressStats,
}

async fn venue_fortress_handler(
    State(state): State<AppState>,
    Query(params): Query<FortressQuery>,
) -> Json<ApiResponse<FortressResponse>> {
    let team = state.resolver().resolve_team(&params.team);
    let stats = VenueAnalytics::new(&state.ctx).fortress_stats(&team);

    Json(ApiResponse::success(FortressResponse {
        corrected_team: team,
        stats,
    }))
}

// GET /api/predict
async fn predict_handler(
    State(state): State<AppState>,
    Query(params): Query<MatchFeatures>,
) -> (StatusCode, Json<ApiResponse<WinPrediction>>) {
    let resolver = state.resolver();
    let features = MatchFeatures {
        team1: resolver.resolve_team(&params.team1),
        team2: resolver.resolve_team(&params.team2),
        toss_winner: resolver.resolve_team(&params.toss_winner),
        ..params
    };

    match state.predictor.predict(&features) {
        Ok(prediction) => (StatusCode::OK, Json(ApiResponse::success(prediction))),
        Err(e @ PredictionError::ModelUnavailable) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::error(e.to_string())),
        ),
        Err(e) => {
            tracing::error!("Prediction failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(e.to_string())),
            )
        }
    }
}
