//! Single binary web server: JSON API over the result engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).
//!
//! Each handler takes the store's write lock for its whole body; that guard
//! is the transaction boundary, so report/confirm/edit/advance never
//! interleave with another writer.

use actix_web::{
    delete, get, post,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use ladder_tournament_web::{
    advance_match, clear_match, confirm_match, delete_match, dispute_match, edit_match,
    initialize_tournament, replace_competitor, report_match, BracketSize, CompetitionRef,
    Competitor, CompetitorType, DeletePolicy, EngineError, EngineStore, Ladder, Side, SideResult,
    Tournament,
};
use serde::Deserialize;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory state: the whole engine store behind one lock.
type AppState = Data<RwLock<EngineStore>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateCompetitorBody {
    name: String,
    kind: CompetitorType,
}

#[derive(Deserialize)]
struct CreateLadderBody {
    competitor_type: CompetitorType,
    win_points: i64,
    loss_points: i64,
    draw_points: i64,
    uses_draws: bool,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    competitor_type: CompetitorType,
    bracket_size: BracketSize,
}

#[derive(Deserialize)]
struct CompetitorIdBody {
    competitor_id: Uuid,
}

#[derive(Deserialize)]
struct ReportMatchBody {
    #[serde(flatten)]
    competition: CompetitionRef,
    one_competitor_id: Uuid,
    two_competitor_id: Uuid,
    side: Side,
    result: SideResult,
    #[serde(default)]
    comment: String,
}

#[derive(Deserialize)]
struct ConfirmMatchBody {
    side: Side,
    result: SideResult,
    #[serde(default)]
    comment: String,
}

#[derive(Deserialize)]
struct EditMatchBody {
    one_result: SideResult,
    #[serde(default)]
    one_comment: String,
    two_result: SideResult,
    #[serde(default)]
    two_comment: String,
}

#[derive(Deserialize, Default)]
struct DeleteMatchBody {
    #[serde(default)]
    policy: DeletePolicy,
}

#[derive(Deserialize)]
struct AdvanceMatchBody {
    winner_competitor_id: Uuid,
}

#[derive(Deserialize)]
struct ReplaceCompetitorBody {
    match_id: Uuid,
    old_competitor_id: Uuid,
    new_competitor_id: Uuid,
}

/// Path segment: entity id (e.g. /api/matches/{id})
#[derive(Deserialize)]
struct IdPath {
    id: Uuid,
}

/// Path segments: ladder id and competitor id.
#[derive(Deserialize)]
struct LadderCompetitorPath {
    id: Uuid,
    competitor_id: Uuid,
}

/// JSON error body with the status code the taxonomy calls for: 404 for
/// missing entities, 409 for optimistic-lock conflicts, 400 otherwise.
fn error_response(err: EngineError) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err {
        EngineError::NotFound { .. } => HttpResponse::NotFound().json(body),
        EngineError::ConcurrencyConflict(_) => HttpResponse::Conflict().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "ladder-tournament-web",
    })
}

/// Register a competitor (player or team).
#[post("/api/competitors")]
async fn api_create_competitor(state: AppState, body: Json<CreateCompetitorBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "name required" }));
    }
    let competitor = Competitor::new(name, body.kind);
    let id = g.insert_competitor(competitor);
    match g.competitor(id) {
        Ok(c) => HttpResponse::Ok().json(c),
        Err(e) => error_response(e),
    }
}

/// Get a competitor with its career record.
#[get("/api/competitors/{id}")]
async fn api_get_competitor(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.competitor(path.id) {
        Ok(c) => HttpResponse::Ok().json(c),
        Err(e) => error_response(e),
    }
}

/// Create a ladder with its point configuration.
#[post("/api/ladders")]
async fn api_create_ladder(state: AppState, body: Json<CreateLadderBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let ladder = Ladder::new(
        body.competitor_type,
        body.win_points,
        body.loss_points,
        body.draw_points,
        body.uses_draws,
    );
    let id = g.insert_ladder(ladder);
    match g.ladder(id) {
        Ok(l) => HttpResponse::Ok().json(l),
        Err(e) => error_response(e),
    }
}

/// Join a ladder: creates the competitor's standing row.
#[post("/api/ladders/{id}/join")]
async fn api_join_ladder(
    state: AppState,
    path: Path<IdPath>,
    body: Json<CompetitorIdBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let competitor = match g.competitor(body.competitor_id) {
        Ok(c) => c.reference(),
        Err(e) => return error_response(e),
    };
    match g.join_ladder(path.id, competitor) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ok": true })),
        Err(e) => error_response(e),
    }
}

/// Leave a ladder: deletes the competitor's standing row.
#[delete("/api/ladders/{id}/members/{competitor_id}")]
async fn api_leave_ladder(state: AppState, path: Path<LadderCompetitorPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.leave_ladder(path.id, path.competitor_id) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ok": true })),
        Err(e) => error_response(e),
    }
}

/// Ranked standings for a ladder (points descending).
#[get("/api/ladders/{id}/standings")]
async fn api_standings(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.standings_ranked(path.id) {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => error_response(e),
    }
}

/// Ranked standings as CSV (rank, name, points, wins, losses, draws, streak).
#[get("/api/ladders/{id}/standings.csv")]
async fn api_standings_csv(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let rows = match g.standings_ranked(path.id) {
        Ok(rows) => rows,
        Err(e) => return error_response(e),
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    let header = writer.write_record(["rank", "name", "points", "wins", "losses", "draws", "streak"]);
    if header.is_err() {
        return HttpResponse::InternalServerError().body("csv error");
    }
    for (i, row) in rows.iter().enumerate() {
        let record = writer.write_record([
            (i + 1).to_string(),
            row.name.clone(),
            row.standing.points.to_string(),
            row.standing.wins.to_string(),
            row.standing.losses.to_string(),
            row.standing.draws.to_string(),
            row.standing.streak.to_string(),
        ]);
        if record.is_err() {
            return HttpResponse::InternalServerError().body("csv error");
        }
    }
    match writer.into_inner() {
        Ok(data) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(data),
        Err(_) => HttpResponse::InternalServerError().body("csv error"),
    }
}

/// Create a tournament with a fixed bracket size.
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let tournament = Tournament::new(body.competitor_type, body.bracket_size);
    let id = g.insert_tournament(tournament);
    match g.tournament(id) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(e),
    }
}

/// Register an entrant at the next seed.
#[post("/api/tournaments/{id}/entrants")]
async fn api_register_entrant(
    state: AppState,
    path: Path<IdPath>,
    body: Json<CompetitorIdBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let competitor = match g.competitor(body.competitor_id) {
        Ok(c) => c.reference(),
        Err(e) => return error_response(e),
    };
    match g.register_entrant(path.id, competitor) {
        Ok(()) => match g.tournament(path.id) {
            Ok(t) => HttpResponse::Ok().json(t),
            Err(e) => error_response(e),
        },
        Err(e) => error_response(e),
    }
}

/// Initialize the bracket: seed entrants into round 1, create all spots.
#[post("/api/tournaments/{id}/initialize")]
async fn api_initialize_tournament(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match initialize_tournament(&mut g, path.id) {
        Ok(()) => HttpResponse::Ok().json(g.tournament_matches(path.id)),
        Err(e) => error_response(e),
    }
}

/// Bracket view: the tournament's matches in spot order.
#[get("/api/tournaments/{id}/bracket")]
async fn api_bracket(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    if let Err(e) = g.tournament(path.id) {
        return error_response(e);
    }
    HttpResponse::Ok().json(g.tournament_matches(path.id))
}

/// Report a result (creates the ladder match, or fills the scheduled
/// tournament spot match).
#[post("/api/matches/report")]
async fn api_report_match(state: AppState, body: Json<ReportMatchBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let one = match g.competitor(body.one_competitor_id) {
        Ok(c) => c.reference(),
        Err(e) => return error_response(e),
    };
    let two = match g.competitor(body.two_competitor_id) {
        Ok(c) => c.reference(),
        Err(e) => return error_response(e),
    };
    match report_match(
        &mut g,
        body.competition,
        one,
        two,
        body.side,
        body.result,
        body.comment.clone(),
    ) {
        Ok(match_id) => HttpResponse::Ok().json(serde_json::json!({ "match_id": match_id })),
        Err(e) => error_response(e),
    }
}

/// Get a match by id.
#[get("/api/matches/{id}")]
async fn api_get_match(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.match_record(path.id) {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => error_response(e),
    }
}

/// Confirm a reported match (the opposite side acknowledges the result).
#[post("/api/matches/{id}/confirm")]
async fn api_confirm_match(
    state: AppState,
    path: Path<IdPath>,
    body: Json<ConfirmMatchBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match confirm_match(&mut g, path.id, body.side, body.result, body.comment.clone()) {
        Ok(()) => match g.match_record(path.id) {
            Ok(m) => HttpResponse::Ok().json(m),
            Err(e) => error_response(e),
        },
        Err(e) => error_response(e),
    }
}

/// Flag a match as disputed for administrator review.
#[post("/api/matches/{id}/dispute")]
async fn api_dispute_match(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match dispute_match(&mut g, path.id) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ok": true })),
        Err(e) => error_response(e),
    }
}

/// Administrative reset of a match back to scheduled.
#[post("/api/matches/{id}/clear")]
async fn api_clear_match(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match clear_match(&mut g, path.id) {
        Ok(()) => match g.match_record(path.id) {
            Ok(m) => HttpResponse::Ok().json(m),
            Err(e) => error_response(e),
        },
        Err(e) => error_response(e),
    }
}

/// Edit a confirmed match's results (administrative correction).
#[post("/api/matches/{id}/edit")]
async fn api_edit_match(
    state: AppState,
    path: Path<IdPath>,
    body: Json<EditMatchBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match edit_match(
        &mut g,
        path.id,
        body.one_result,
        body.one_comment.clone(),
        body.two_result,
        body.two_comment.clone(),
    ) {
        Ok(()) => match g.match_record(path.id) {
            Ok(m) => HttpResponse::Ok().json(m),
            Err(e) => error_response(e),
        },
        Err(e) => error_response(e),
    }
}

/// Delete a ladder match. The body selects whether confirmed stats roll back.
#[delete("/api/matches/{id}")]
async fn api_delete_match(
    state: AppState,
    path: Path<IdPath>,
    body: Option<Json<DeleteMatchBody>>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let policy = body.map(|b| b.policy).unwrap_or_default();
    match delete_match(&mut g, path.id, policy) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ok": true })),
        Err(e) => error_response(e),
    }
}

/// Manually advance a confirmed match's winner (administrative).
#[post("/api/matches/{id}/advance")]
async fn api_advance_match(
    state: AppState,
    path: Path<IdPath>,
    body: Json<AdvanceMatchBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match advance_match(&mut g, path.id, body.winner_competitor_id) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ok": true })),
        Err(e) => error_response(e),
    }
}

/// Swap a competitor at a spot for another registered entrant.
#[post("/api/tournaments/{id}/replace")]
async fn api_replace_competitor(
    state: AppState,
    path: Path<IdPath>,
    body: Json<ReplaceCompetitorBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match replace_competitor(
        &mut g,
        path.id,
        body.match_id,
        body.old_competitor_id,
        body.new_competitor_id,
    ) {
        Ok(()) => match g.match_record(body.match_id) {
            Ok(m) => HttpResponse::Ok().json(m),
            Err(e) => error_response(e),
        },
        Err(e) => error_response(e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(EngineStore::new()));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_competitor)
            .service(api_get_competitor)
            .service(api_create_ladder)
            .service(api_join_ladder)
            .service(api_leave_ladder)
            .service(api_standings)
            .service(api_standings_csv)
            .service(api_create_tournament)
            .service(api_register_entrant)
            .service(api_initialize_tournament)
            .service(api_bracket)
            .service(api_report_match)
            .service(api_get_match)
            .service(api_confirm_match)
            .service(api_dispute_match)
            .service(api_clear_match)
            .service(api_edit_match)
            .service(api_delete_match)
            .service(api_advance_match)
            .service(api_replace_competitor)
    })
    .bind(bind)?
    .run()
    .await
}
