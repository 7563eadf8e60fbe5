use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};

use topic_insight::{sort_articles, AnalyticsConfig, Report, ReportBuilder};

use crate::api::{
    ApiAnalysisRequest, ApiArticlesQuery, ApiArticlesResponse, ApiInsightRequest, ApiInsightResponse,
    ApiKeywordQuery,
};
use crate::insights::{self, InsightError, InsightRequest};
use crate::llm::LlmClient;
use crate::store::{AnalysisRecord, AnalysisStore, AnalysisSummary};

type Channels = Arc<Mutex<HashMap<String, broadcast::Sender<StreamEvent>>>>;

#[derive(Clone)]
struct AppState {
    config: Arc<AnalyticsConfig>,
    store: Arc<AnalysisStore>,
    llm_client: Option<LlmClient>,
    channels: Channels,
}

#[derive(Clone, Serialize)]
struct StreamEvent {
    event: String,
    message: String,
    timestamp_ms: u128,
}

#[derive(serde::Deserialize)]
struct StreamQuery {
    request_id: String,
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub async fn serve(args: crate::ServeArgs, config: AnalyticsConfig) -> anyhow::Result<()> {
    let store = AnalysisStore::load(config.store.path.clone()).await?;
    let llm_client = LlmClient::from_env(&config.llm, None);
    if llm_client.is_none() {
        warn!("OPENROUTER_API_KEY not set, insights will use fallback rules");
    }

    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(store),
        llm_client,
        channels: Arc::new(Mutex::new(HashMap::new())),
    };

    let web_root = args.web_root;
    let index_path = format!("{}/index.html", web_root.trim_end_matches('/'));
    let static_service = ServeDir::new(web_root).not_found_service(ServeFile::new(index_path));

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/analyses", get(list_analyses).post(create_analysis))
        .route("/api/analyses/:id", get(get_analysis).delete(delete_analysis))
        .route("/api/analyses/:id/report", get(analysis_report))
        .route("/api/analyses/:id/articles", get(analysis_articles))
        .route("/api/insights", get(cached_insights))
        .route("/api/insights/generate", post(generate_insights))
        .route("/api/insights/stream", get(stream_handler))
        .nest_service("/", static_service)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind server")?;
    info!(%addr, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn list_analyses(State(state): State<AppState>) -> Json<Vec<AnalysisSummary>> {
    Json(state.store.list_analyses().await)
}

async fn create_analysis(
    State(state): State<AppState>,
    Json(request): Json<ApiAnalysisRequest>,
) -> Result<Json<AnalysisSummary>, (StatusCode, String)> {
    let record = request
        .into_record(Utc::now())
        .map_err(|err| (StatusCode::BAD_REQUEST, err))?;
    let stored = state.store.add_analysis(record).await.map_err(internal)?;
    Ok(Json(AnalysisSummary::from(&stored)))
}

async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AnalysisRecord>, (StatusCode, String)> {
    find_analysis(&state, &id).await.map(Json)
}

async fn delete_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.store.delete_analysis(&id).await.map_err(internal)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id))
    }
}

async fn analysis_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Report>, (StatusCode, String)> {
    let record = find_analysis(&state, &id).await?;
    let builder = ReportBuilder::from_config(&state.config);
    let report = builder.build(&record.articles, Some(&record.keyword), Utc::now().timestamp());
    Ok(Json(report))
}

async fn analysis_articles(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ApiArticlesQuery>,
) -> Result<Json<ApiArticlesResponse>, (StatusCode, String)> {
    let key = query.sort_key().map_err(|err| (StatusCode::BAD_REQUEST, err))?;
    let record = find_analysis(&state, &id).await?;
    let articles: Vec<_> = sort_articles(&record.articles, key)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(ApiArticlesResponse {
        analysis_id: record.id,
        sort: key.label().to_string(),
        total: articles.len(),
        articles,
    }))
}

async fn cached_insights(
    State(state): State<AppState>,
    Query(query): Query<ApiKeywordQuery>,
) -> Result<Json<ApiInsightResponse>, (StatusCode, String)> {
    let keyword = query.keyword.unwrap_or_default();
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "keyword is required".to_string()));
    }

    let now = Utc::now();
    if let Err(err) = state.store.cleanup_expired(now).await {
        warn!(error = %err, "failed to clean up expired insight reports");
    }
    let report = state.store.valid_insight_report(keyword, now).await.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("no cached insights for {}, generate them first", keyword),
        )
    })?;
    Ok(Json(ApiInsightResponse::from_cached(report)))
}

async fn generate_insights(
    State(state): State<AppState>,
    Json(request): Json<ApiInsightRequest>,
) -> Result<Json<ApiInsightResponse>, (StatusCode, String)> {
    let request_id = request.request_id.clone().unwrap_or_else(generate_request_id);
    let sender = get_or_create_channel(&state, &request_id).await;
    let progress = |event: &str, message: &str| send_event(&sender, event, message);

    let keyword = request.keyword.unwrap_or_default();
    let result = insights::generate(
        &state.store,
        state.llm_client.as_ref(),
        &state.config,
        InsightRequest {
            keyword: &keyword,
            analysis_id: request.analysis_id.as_deref(),
            force_refresh: request.force_refresh,
        },
        Utc::now(),
        &progress,
    )
    .await;
    schedule_cleanup(state.channels.clone(), request_id.clone());

    match result {
        Ok(result) => Ok(Json(ApiInsightResponse::from_result(result, Some(request_id)))),
        Err(err) => {
            send_event(&sender, "error", &err.to_string());
            let status = match err {
                InsightError::MissingKeyword | InsightError::MissingAnalysis => StatusCode::BAD_REQUEST,
                InsightError::AnalysisNotFound(_) | InsightError::NoArticles(_) => StatusCode::NOT_FOUND,
            };
            Err((status, err.to_string()))
        }
    }
}

async fn stream_handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>, StatusCode>
{
    let sender = get_or_create_channel(&state, &query.request_id).await;
    let receiver = sender.subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(|event| match event {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data)))
        }
        Err(_) => None,
    });

    send_event(&sender, "connected", "Streaming insight status");
    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(8))))
}

async fn find_analysis(state: &AppState, id: &str) -> Result<AnalysisRecord, (StatusCode, String)> {
    state.store.get_analysis(id).await.ok_or_else(|| not_found(id))
}

fn not_found(id: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("analysis not found: {}", id))
}

fn internal(err: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", err))
}

async fn get_or_create_channel(state: &AppState, request_id: &str) -> broadcast::Sender<StreamEvent> {
    let mut guard = state.channels.lock().await;
    if let Some(sender) = guard.get(request_id) {
        return sender.clone();
    }
    let (sender, _) = broadcast::channel(32);
    guard.insert(request_id.to_string(), sender.clone());
    sender
}

fn send_event(sender: &broadcast::Sender<StreamEvent>, event: &str, message: &str) {
    let _ = sender.send(StreamEvent {
        event: event.to_string(),
        message: message.to_string(),
        timestamp_ms: now_ms(),
    });
}

fn schedule_cleanup(channels: Channels, request_id: String) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        let mut guard = channels.lock().await;
        guard.remove(&request_id);
    });
}

fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{}-{}", now_ms(), counter)
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}
