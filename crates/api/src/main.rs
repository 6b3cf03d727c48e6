use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signalist_core::domain::news::FormattedArticle;
use signalist_core::domain::stock::{StockSearchResult, WatchlistChange, WatchlistRow};
use signalist_core::domain::symbol::Symbol;
use signalist_core::domain::user::UserPreferences;
use signalist_core::market::finnhub::FinnhubClient;
use signalist_core::market::MarketDataClient;
use signalist_core::storage::{self, Database};

mod error;

use error::ApiError;

const USER_EMAIL_HEADER: &str = "x-user-email";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = signalist_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let db = connect_db(&settings).await;

    if settings.finnhub_api_key.is_none() {
        tracing::warn!("FINNHUB_API_KEY missing; stock search will return no results");
    }
    let market: Arc<dyn MarketDataClient> = Arc::new(FinnhubClient::from_settings(&settings)?);

    let state = AppState {
        db: db.clone(),
        market,
    };

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.close().await;
    }

    Ok(())
}

async fn connect_db(settings: &signalist_core::config::Settings) -> Option<Database> {
    let db_url = match settings.require_database_url() {
        Ok(url) => url,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "DATABASE_URL missing; starting API in degraded mode");
            return None;
        }
    };

    let db = match Database::connect(db_url).await {
        Ok(db) => db,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "db connect failed; starting API in degraded mode");
            return None;
        }
    };

    match db.migrate().await {
        Ok(()) => Some(db),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "db migrations failed; starting API in degraded mode");
            None
        }
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/news", get(get_news))
        .route("/search", get(search))
        .route("/users/:email/news", get(get_user_news))
        .route(
            "/users/:email/watchlist",
            get(get_watchlist).post(add_to_watchlist),
        )
        .route(
            "/users/:email/watchlist/:symbol",
            delete(remove_from_watchlist),
        )
        .route("/users/:email/preferences", put(put_preferences))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[derive(Clone)]
struct AppState {
    db: Option<Database>,
    market: Arc<dyn MarketDataClient>,
}

impl AppState {
    fn db(&self) -> Result<&Database, ApiError> {
        self.db
            .as_ref()
            .ok_or_else(|| ApiError::Unavailable("database unavailable".to_string()))
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn readyz(State(state): State<AppState>) -> StatusCode {
    let Some(db) = &state.db else {
        return StatusCode::SERVICE_UNAVAILABLE;
    };
    match db.health_check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewsParams {
    /// Comma-separated tickers.
    symbols: Option<String>,
}

async fn get_news(
    State(state): State<AppState>,
    Query(params): Query<NewsParams>,
) -> Result<Json<Vec<FormattedArticle>>, ApiError> {
    let symbols = split_symbols_param(params.symbols.as_deref());
    let news = signalist_core::news::get_news(
        state.market.as_ref(),
        &symbols,
        signalist_core::time::window::today_utc(),
    )
    .await?;
    Ok(Json(news))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Json<Vec<StockSearchResult>> {
    // Watchlist flags are best-effort; search works without a database.
    let watchlist = match (caller_email(&headers), state.db.as_ref()) {
        (Some(email), Some(db)) => storage::watchlist::symbols_by_email(db.pool(), &email).await,
        _ => Vec::new(),
    };

    Json(
        signalist_core::search::search_stocks(
            state.market.as_ref(),
            params.q.as_deref(),
            &watchlist,
        )
        .await,
    )
}

async fn get_user_news(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<FormattedArticle>>, ApiError> {
    let db = state.db()?;
    let symbols = storage::watchlist::symbols_by_email(db.pool(), &email).await;
    let news = signalist_core::news::get_news(
        state.market.as_ref(),
        &symbols,
        signalist_core::time::window::today_utc(),
    )
    .await?;
    Ok(Json(news))
}

async fn get_watchlist(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<WatchlistRow>>, ApiError> {
    let db = state.db()?;
    ensure_user(db, &email).await?;
    let items = storage::watchlist::items_by_email(db.pool(), &email).await?;
    let rows = signalist_core::watchlist::enrich_watchlist(state.market.as_ref(), items).await;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
struct AddToWatchlist {
    symbol: String,
    #[serde(default)]
    company: Option<String>,
}

#[derive(Debug, Serialize)]
struct WatchlistChangeResponse {
    symbol: Symbol,
    change: WatchlistChange,
}

async fn add_to_watchlist(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(body): Json<AddToWatchlist>,
) -> Result<(StatusCode, Json<WatchlistChangeResponse>), ApiError> {
    let db = state.db()?;
    let symbol = parse_symbol(&body.symbol)?;
    ensure_user(db, &email).await?;

    let company = body.company.as_deref().unwrap_or_default();
    let change = storage::watchlist::add(db.pool(), &email, &symbol, company).await?;
    tracing::info!(%email, %symbol, ?change, "watchlist add");

    let status = match change {
        WatchlistChange::Added => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    Ok((status, Json(WatchlistChangeResponse { symbol, change })))
}

async fn remove_from_watchlist(
    State(state): State<AppState>,
    Path((email, symbol)): Path<(String, String)>,
) -> Result<Json<WatchlistChangeResponse>, ApiError> {
    let db = state.db()?;
    let symbol = parse_symbol(&symbol)?;
    ensure_user(db, &email).await?;

    let change = storage::watchlist::remove(db.pool(), &email, &symbol).await?;
    tracing::info!(%email, %symbol, ?change, "watchlist remove");
    Ok(Json(WatchlistChangeResponse { symbol, change }))
}

async fn put_preferences(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(prefs): Json<UserPreferences>,
) -> Result<StatusCode, ApiError> {
    let db = state.db()?;
    ensure_user(db, &email).await?;
    storage::users::upsert_preferences(db.pool(), &email, &prefs).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_user(db: &Database, email: &str) -> Result<(), ApiError> {
    match storage::users::find_user_id_by_email(db.pool(), email).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound(format!("no user with email {email}"))),
    }
}

fn parse_symbol(raw: &str) -> Result<Symbol, ApiError> {
    Symbol::parse(raw).ok_or_else(|| ApiError::BadRequest("symbol must be non-empty".to_string()))
}

fn split_symbols_param(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| s.split(',').map(str::to_string).collect())
        .unwrap_or_default()
}

fn caller_email(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_EMAIL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &signalist_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
