use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::api::{
    required, CaseStudyRequest, FitResponse, ImpactRequest, PitchResponse, SituationQuery, WeeksResponse,
};
use bluebloom::alerts::{
    find_perfect_weeks, find_perfect_weeks_grid, week_range, PerfectWeekGrid, PerfectWeekOverview, SEASON_WEEKS,
};
use bluebloom::beaches::BeachStatus;
use bluebloom::bulletin::{generate_bulletin, Bulletin};
use bluebloom::data::Dataset;
use bluebloom::impact::{simulate_impact, ImpactSimulationResult};
use bluebloom::narrative::{
    build_case_study, build_pilot_opportunity, build_pitch_snippet, format_pilot_as_text, format_pitch_as_text,
    PilotOpportunity, PitchSnippet, StartupCaseStudy,
};
use bluebloom::recommend::{recommend_actors, Recommendation};
use bluebloom::scoring::{
    build_clusters_for_situation, build_gap_radar, build_investor_view, compute_problem_fit_score,
    CollaborationCluster, InvestorViewSummary, SolutionGap,
};
use bluebloom::{BloomError, BloomSummary};

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

const MAX_CREATED_CASE_STUDIES: usize = 500;

/// `created_case_studies` holds at most `MAX_CREATED_CASE_STUDIES` entries;
/// the oldest are dropped first.
#[derive(Clone)]
struct AppState {
    dataset: Arc<Dataset>,
    created_case_studies: Arc<Mutex<Vec<StartupCaseStudy>>>,
}

impl AppState {
    fn new(dataset: Dataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
            created_case_studies: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn summary(&self, query: &SituationQuery) -> BloomSummary {
        self.dataset.summary(&query.region(), query.week())
    }
}

fn router(state: AppState, data_dir: PathBuf) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/regions", get(regions_handler))
        .route("/api/weeks", get(weeks_handler))
        .route("/api/summary", get(summary_handler))
        .route("/api/bulletin", get(bulletin_handler))
        .route("/api/recommendations", get(recommendations_handler))
        .route("/api/fit", get(fit_handler))
        .route("/api/gaps", get(gaps_handler))
        .route("/api/clusters", get(clusters_handler))
        .route("/api/investor", get(investor_handler))
        .route("/api/perfect-weeks", get(perfect_weeks_handler))
        .route("/api/perfect-weeks/grid", get(perfect_weeks_grid_handler))
        .route("/api/beaches", get(beaches_handler))
        .route("/api/impact", post(impact_handler))
        .route("/api/pitch", get(pitch_handler))
        .route("/api/pilot", get(pilot_handler))
        .route(
            "/api/case-studies",
            get(list_case_studies_handler).post(create_case_study_handler),
        )
        .nest_service("/data", ServeDir::new(data_dir))
        .with_state(state)
}

pub async fn serve(args: crate::ServeArgs, dataset: Dataset) -> Result<(), String> {
    let config = &dataset.config;
    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let data_dir = dataset.data_config().dir.clone();
    let app = router(AppState::new(dataset), data_dir);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    info!("Serving bluebloom API - addr={}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await.map_err(|err| {
        format!("failed to bind server: {}", err)
    })?, app)
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

fn error_response(err: BloomError) -> (StatusCode, String) {
    let status = match &err {
        BloomError::NotFound { .. } => StatusCode::NOT_FOUND,
        BloomError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!("Request failed - error={}", err);
    }
    (status, err.to_string())
}

fn bad_request(message: String) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, message)
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn regions_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "regions": state.dataset.regions() }))
}

async fn weeks_handler(State(state): State<AppState>, Query(query): Query<SituationQuery>) -> Json<WeeksResponse> {
    let weeks = state.dataset.weeks(query.region.as_deref());
    Json(WeeksResponse {
        region: query.region,
        weeks,
    })
}

async fn summary_handler(State(state): State<AppState>, Query(query): Query<SituationQuery>) -> Json<BloomSummary> {
    Json(state.summary(&query))
}

async fn bulletin_handler(State(state): State<AppState>, Query(query): Query<SituationQuery>) -> Json<Bulletin> {
    Json(generate_bulletin(&state.summary(&query)))
}

async fn recommendations_handler(
    State(state): State<AppState>,
    Query(query): Query<SituationQuery>,
) -> Json<Vec<Recommendation>> {
    let summary = state.summary(&query);
    Json(recommend_actors(&summary, &state.dataset.actors, query.seed.unwrap_or(0)))
}

async fn fit_handler(State(state): State<AppState>, Query(query): Query<SituationQuery>) -> ApiResult<FitResponse> {
    let actor_id = required(&query.actor, "actor").map_err(bad_request)?;
    let actor = state.dataset.actor(actor_id).map_err(error_response)?;
    let summary = state.summary(&query);
    let fit = compute_problem_fit_score(&summary, actor);
    Ok(Json(FitResponse::from_score(actor, &summary, fit)))
}

async fn gaps_handler(State(state): State<AppState>, Query(query): Query<SituationQuery>) -> Json<Vec<SolutionGap>> {
    let summary = state.summary(&query);
    Json(build_gap_radar(&summary, &state.dataset.actors, &state.dataset.config.radar))
}

async fn clusters_handler(
    State(state): State<AppState>,
    Query(query): Query<SituationQuery>,
) -> Json<Vec<CollaborationCluster>> {
    let summary = state.summary(&query);
    Json(build_clusters_for_situation(&summary, &state.dataset.actors))
}

async fn investor_handler(
    State(state): State<AppState>,
    Query(query): Query<SituationQuery>,
) -> ApiResult<InvestorViewSummary> {
    let investor_id = required(&query.investor, "investor").map_err(bad_request)?;
    let investor = state.dataset.investor(investor_id).map_err(error_response)?;
    let summary = state.summary(&query);
    Ok(Json(build_investor_view(
        &summary,
        investor,
        &state.dataset.actors,
        &state.dataset.config.investor,
    )))
}

async fn perfect_weeks_handler(
    State(state): State<AppState>,
    Query(query): Query<SituationQuery>,
) -> ApiResult<PerfectWeekOverview> {
    let startup_id = required(&query.startup, "startup").map_err(bad_request)?;
    let use_cases = query.use_cases().map_err(bad_request)?;
    let dataset = state.dataset.as_ref();
    dataset.startup(startup_id).map_err(error_response)?;
    let region = query.region();
    let weeks = scan_weeks(&query, || dataset.weeks(Some(region.as_str())))?;
    let mut overview = find_perfect_weeks(dataset, dataset.alert_rules(startup_id), startup_id, &region, &weeks);
    overview.retain_use_cases(&use_cases);
    Ok(Json(overview))
}

async fn perfect_weeks_grid_handler(
    State(state): State<AppState>,
    Query(query): Query<SituationQuery>,
) -> ApiResult<PerfectWeekGrid> {
    let startup_id = required(&query.startup, "startup").map_err(bad_request)?;
    let use_cases = query.use_cases().map_err(bad_request)?;
    let dataset = state.dataset.as_ref();
    dataset.startup(startup_id).map_err(error_response)?;
    let weeks = scan_weeks(&query, || (SEASON_WEEKS.0..=SEASON_WEEKS.1).collect())?;
    Ok(Json(find_perfect_weeks_grid(
        dataset,
        dataset.alert_rules(startup_id),
        startup_id,
        &dataset.regions(),
        &weeks,
        &use_cases,
    )))
}

/// `from`/`to` together, or neither for the fallback weeks.
fn scan_weeks(
    query: &SituationQuery,
    fallback: impl FnOnce() -> Vec<u32>,
) -> Result<Vec<u32>, (StatusCode, String)> {
    match (query.from, query.to) {
        (Some(from), Some(to)) => week_range(from, to).map_err(error_response),
        (None, None) => Ok(fallback()),
        _ => Err(bad_request("from and to must be given together".to_string())),
    }
}

async fn beaches_handler(State(state): State<AppState>, Query(query): Query<SituationQuery>) -> Json<Vec<BeachStatus>> {
    Json(state.dataset.beach_statuses(query.q.as_deref()))
}

async fn impact_handler(
    State(state): State<AppState>,
    Json(request): Json<ImpactRequest>,
) -> ApiResult<ImpactSimulationResult> {
    let (actor_id, input) = request.into_input().map_err(bad_request)?;
    let actor = state.dataset.actor(&actor_id).map_err(error_response)?;
    let summary = state.dataset.summary(&input.region, input.start_week);
    let result = simulate_impact(&summary, actor, &input).map_err(error_response)?;
    Ok(Json(result))
}

async fn pitch_handler(
    State(state): State<AppState>,
    Query(query): Query<SituationQuery>,
) -> ApiResult<PitchResponse<PitchSnippet>> {
    let actor_id = required(&query.actor, "actor").map_err(bad_request)?;
    let actor = state.dataset.actor(actor_id).map_err(error_response)?;
    let pitch = build_pitch_snippet(&state.summary(&query), actor);
    let text = format_pitch_as_text(&pitch);
    Ok(Json(PitchResponse {
        actor_id: actor.id.clone(),
        body: pitch,
        text,
    }))
}

async fn pilot_handler(
    State(state): State<AppState>,
    Query(query): Query<SituationQuery>,
) -> ApiResult<PitchResponse<PilotOpportunity>> {
    let actor_id = required(&query.actor, "actor").map_err(bad_request)?;
    let actor = state.dataset.actor(actor_id).map_err(error_response)?;
    let summary = state.summary(&query);
    let pilot = build_pilot_opportunity(&summary, actor);
    let text = format_pilot_as_text(&pilot, &summary.region, summary.week, &actor.name);
    Ok(Json(PitchResponse {
        actor_id: actor.id.clone(),
        body: pilot,
        text,
    }))
}

async fn create_case_study_handler(
    State(state): State<AppState>,
    Json(request): Json<CaseStudyRequest>,
) -> ApiResult<StartupCaseStudy> {
    let startup = state
        .dataset
        .startup(request.input.startup_id.trim())
        .map_err(error_response)?;
    let summary = request
        .week
        .map(|week| state.dataset.summary(request.input.region.trim(), week));
    let study = build_case_study(&request.input, startup, summary.as_ref()).map_err(error_response)?;

    let mut guard = state.created_case_studies.lock().await;
    remember_case_study(&mut guard, study.clone());
    info!(
        "Created case study - id={}, startup={}, stored={}",
        study.id,
        study.startup_id,
        guard.len()
    );
    Ok(Json(study))
}

fn remember_case_study(studies: &mut Vec<StartupCaseStudy>, study: StartupCaseStudy) {
    if studies.len() >= MAX_CREATED_CASE_STUDIES {
        let overflow = studies.len() + 1 - MAX_CREATED_CASE_STUDIES;
        studies.drain(..overflow);
    }
    studies.push(study);
}

async fn list_case_studies_handler(
    State(state): State<AppState>,
    Query(query): Query<SituationQuery>,
) -> ApiResult<Vec<StartupCaseStudy>> {
    let startup_id = required(&query.startup, "startup").map_err(bad_request)?;
    let mut studies = state.dataset.case_studies_for(startup_id);
    let guard = state.created_case_studies.lock().await;
    studies.extend(guard.iter().filter(|study| study.startup_id == startup_id).cloned());
    studies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(studies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bluebloom::beaches::{Beach, BeachSafety};
    use bluebloom::narrative::{build_case_study_at, CaseStudyInput};
    use bluebloom::{Actor, BloomObservation, Severity};
    use chrono::{TimeZone, Utc};

    fn obs(id: &str, region: &str, area: &str, date: &str, week: u32, severity: Severity) -> BloomObservation {
        BloomObservation {
            id: id.to_string(),
            region: region.to_string(),
            area_name: area.to_string(),
            lat: 60.4,
            lon: 22.1,
            date: date.to_string(),
            week,
            severity,
        }
    }

    fn beach(name: &str, region: &str) -> Beach {
        Beach {
            name: name.to_string(),
            region: region.to_string(),
            lat: 60.4,
            lon: 22.1,
        }
    }

    fn dataset() -> Dataset {
        let observations = vec![
            obs("t1", "Turku archipelago", "Ruissalo Beach", "2024-07-03", 27, Severity::Low),
            obs("t2", "Turku archipelago", "Ruissalo Beach", "2024-07-10", 28, Severity::High),
            obs("h1", "Helsinki coast", "Hietaniemi Beach", "2024-07-10", 28, Severity::Low),
        ];
        let actors: Vec<Actor> = serde_json::from_value(json!([
            {"id": "algaesense", "name": "AlgaeSense", "type": "startup", "tags": ["monitoring", "sensors"]},
            {"id": "swimsafe", "name": "SwimSafe", "type": "startup", "tags": ["citizen science"]},
            {"id": "bluewave", "name": "BlueWave Ventures", "type": "investor", "tags": ["climate"]}
        ]))
        .unwrap();
        let rules = serde_json::from_value(json!([
            {"id": "pilot-high", "name": "High risk", "useCase": "pilot", "conditions": {"minOverallRisk": "high"}},
            {"id": "sales-any", "name": "Any bloom", "useCase": "sales", "conditions": {"minOverallRisk": "low"}}
        ]))
        .unwrap();

        let mut dataset = Dataset::from_parts(observations, actors).with_alerts("algaesense", rules);
        dataset.beaches = vec![
            beach("Ruissalo Beach", "Turku archipelago"),
            beach("Hietaniemi Beach", "Helsinki coast"),
            beach("Kupittaa Beach", "Turku archipelago"),
        ];
        dataset
    }

    fn case_input(startup_id: &str, customer: &str) -> CaseStudyInput {
        CaseStudyInput {
            startup_id: startup_id.to_string(),
            customer_name: customer.to_string(),
            region: "Turku archipelago".to_string(),
            time_period: "Summer 2024".to_string(),
            summary_of_pilot: "Sensor buoys at two public beaches".to_string(),
            key_actions: vec!["Deployed four buoys".to_string()],
            observed_results: Vec::new(),
            metrics: Vec::new(),
        }
    }

    fn scan_query(from: Option<u32>, to: Option<u32>) -> SituationQuery {
        SituationQuery {
            startup: Some("algaesense".to_string()),
            from,
            to,
            ..SituationQuery::default()
        }
    }

    #[test]
    fn errors_map_to_status_codes() {
        assert_eq!(error_response(BloomError::not_found("actor", "x")).0, StatusCode::NOT_FOUND);
        assert_eq!(error_response(BloomError::validation("bad week")).0, StatusCode::BAD_REQUEST);
        assert_eq!(
            error_response(BloomError::Data("broken json".to_string())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let (status, message) = error_response(BloomError::Io("disk".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "io error: disk");
    }

    #[tokio::test]
    async fn perfect_weeks_needs_both_range_ends() {
        let state = AppState::new(dataset());
        let (status, message) = perfect_weeks_handler(State(state.clone()), Query(scan_query(Some(27), None)))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "from and to must be given together");

        let overview = perfect_weeks_handler(State(state), Query(scan_query(Some(27), Some(28))))
            .await
            .unwrap()
            .0;
        let weeks: Vec<u32> = overview.matches.iter().map(|found| found.week).collect();
        assert_eq!(weeks, vec![27, 28, 28]);
    }

    #[tokio::test]
    async fn oversized_ranges_are_bad_requests() {
        let state = AppState::new(dataset());
        let (status, _) = perfect_weeks_handler(State(state.clone()), Query(scan_query(Some(0), Some(u32::MAX))))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = ImpactRequest {
            actor_id: Some("algaesense".to_string()),
            region: None,
            start_week: None,
            duration_weeks: Some(u32::MAX),
            deployment_intensity: None,
        };
        let (status, message) = impact_handler(State(state), Json(request)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "invalid input: durationWeeks must be at most 52");
    }

    #[tokio::test]
    async fn unknown_startup_is_not_found() {
        let mut query = scan_query(None, None);
        query.startup = Some("bluewave".to_string());
        let (status, message) = perfect_weeks_handler(State(AppState::new(dataset())), Query(query))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "startup not found: bluewave");
    }

    #[tokio::test]
    async fn grid_counts_perfect_weeks_per_region() {
        let state = AppState::new(dataset());
        let grid = perfect_weeks_grid_handler(State(state.clone()), Query(scan_query(Some(27), Some(28))))
            .await
            .unwrap()
            .0;
        let counts: Vec<(&str, usize)> = grid
            .regions
            .iter()
            .map(|row| (row.region.as_str(), row.perfect_week_count))
            .collect();
        assert_eq!(counts, vec![("Helsinki coast", 1), ("Turku archipelago", 2)]);
        assert_eq!(grid.total_perfect_weeks, 3);

        let mut pilots_only = scan_query(Some(27), Some(28));
        pilots_only.use_case = Some("pilot".to_string());
        let grid = perfect_weeks_grid_handler(State(state), Query(pilots_only)).await.unwrap().0;
        assert_eq!(grid.total_perfect_weeks, 1);
        assert_eq!(grid.regions[1].perfect_weeks, vec![28]);
        assert!(grid.regions[0].matches.is_empty());
    }

    #[tokio::test]
    async fn beaches_are_searchable() {
        let query = SituationQuery {
            q: Some("turku".to_string()),
            ..SituationQuery::default()
        };
        let statuses = beaches_handler(State(AppState::new(dataset())), Query(query)).await.0;
        let found: Vec<(&str, BeachSafety)> = statuses
            .iter()
            .map(|status| (status.beach.name.as_str(), status.status))
            .collect();
        assert_eq!(
            found,
            vec![("Ruissalo Beach", BeachSafety::Detected), ("Kupittaa Beach", BeachSafety::Unknown)]
        );
    }

    #[tokio::test]
    async fn created_case_studies_list_newest_first_with_stored_ones() {
        let mut data = dataset();
        let older_at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let startup = data.startup("algaesense").unwrap().clone();
        let other = data.startup("swimsafe").unwrap().clone();
        data.case_studies = vec![
            build_case_study_at(&case_input("algaesense", "Naantali Marina"), &startup, None, older_at).unwrap(),
            build_case_study_at(&case_input("swimsafe", "Turku Beaches"), &other, None, older_at).unwrap(),
        ];
        let state = AppState::new(data);

        let request = CaseStudyRequest {
            input: case_input("algaesense", "City of Turku"),
            week: Some(28),
        };
        let created = create_case_study_handler(State(state.clone()), Json(request)).await.unwrap().0;
        assert!(created.created_at > older_at);

        let query = SituationQuery {
            startup: Some("algaesense".to_string()),
            ..SituationQuery::default()
        };
        let studies = list_case_studies_handler(State(state), Query(query)).await.unwrap().0;
        let customers: Vec<&str> = studies.iter().map(|study| study.customer_name.as_str()).collect();
        assert_eq!(customers, vec!["City of Turku", "Naantali Marina"]);
    }

    #[tokio::test]
    async fn invalid_case_study_is_rejected() {
        let mut input = case_input("algaesense", "City of Turku");
        input.time_period = "  ".to_string();
        let request = CaseStudyRequest { input, week: None };
        let (status, message) = create_case_study_handler(State(AppState::new(dataset())), Json(request))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "invalid input: time period is required");
    }

    #[test]
    fn created_case_studies_are_capped() {
        let data = dataset();
        let startup = data.startup("algaesense").unwrap();
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let study = build_case_study_at(&case_input("algaesense", "City of Turku"), startup, None, at).unwrap();

        let mut studies = Vec::new();
        for idx in 0..MAX_CREATED_CASE_STUDIES + 3 {
            let mut next = study.clone();
            next.id = format!("case_{}", idx);
            remember_case_study(&mut studies, next);
        }
        assert_eq!(studies.len(), MAX_CREATED_CASE_STUDIES);
        assert_eq!(studies[0].id, "case_3");
    }

    #[test]
    fn router_builds_with_all_routes() {
        let _app: Router = router(AppState::new(dataset()), PathBuf::from("data"));
    }
}
