use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use stockcut::{
    Config, Objective, OptimizeResult, PieceSpec, RunSummary, StrategyKind, Unit, optimize,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    board: BoardRequest,
    pieces: Vec<PieceRequest>,
    #[serde(default = "default_kerf")]
    kerf: f64,
    #[serde(default)]
    unit: Unit,
    #[serde(default = "default_true")]
    allow_rotate: bool,
    #[serde(default)]
    force_two_columns: bool,
    #[serde(default)]
    objective: Objective,
    #[serde(default)]
    advanced: bool,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    strategy: Option<StrategyKind>,
}

#[derive(Deserialize, Serialize)]
struct BoardRequest {
    width: f64,
    height: f64,
}

#[derive(Deserialize, Serialize)]
struct PieceRequest {
    #[serde(default)]
    id: Option<String>,
    width: f64,
    height: f64,
    qty: i64,
}

fn default_true() -> bool {
    true
}

fn default_kerf() -> f64 {
    3.0
}

#[derive(Serialize)]
struct OptimizeResponse {
    #[serde(flatten)]
    result: OptimizeResult,
    summary: RunSummary,
}

impl OptimizeRequest {
    fn into_inputs(self) -> (Config, Vec<PieceSpec>) {
        let unit = self.unit;
        let config = Config {
            board_width: unit.to_mm(self.board.width),
            board_height: unit.to_mm(self.board.height),
            kerf: unit.to_mm(self.kerf),
            allow_rotation: self.allow_rotate,
            force_two_columns: self.force_two_columns,
            objective: self.objective,
            use_advanced_optimizer: self.advanced,
            seed: self.seed.unwrap_or(Config::default().seed),
            strategy: self.strategy,
        };
        let specs = self
            .pieces
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                PieceSpec::new(
                    p.id.unwrap_or_else(|| format!("P{}", i + 1)),
                    unit.to_mm(p.width),
                    unit.to_mm(p.height),
                    p.qty,
                )
            })
            .collect();
        (config, specs)
    }
}

async fn optimize_handler(
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    let (config, specs) = req.into_inputs();
    config
        .validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let result = tokio::task::spawn_blocking(move || optimize(&config, &specs))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "optimizer task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "optimizer failed".to_string())
        })?;

    let summary = result.summary();
    Ok(Json(OptimizeResponse { result, summary }))
}

async fn serve() {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));
    eprintln!("Listening on {addr}");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server stopped");
    }
}

fn main() {
    // Reporting is disabled when SENTRY_DSN is unset.
    let _sentry = sentry::init((
        std::env::var("SENTRY_DSN").ok(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    ));

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(serve());
}
