//! The transcript resolver HTTP server.
//!
//! Exposes the resolver over a small REST surface, plus the legacy
//! `/transcribe` audio fallback. Every response carries an `X-Request-Id`
//! correlation header.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::UndertekstError;
use crate::fallback::AudioFallback;
use crate::limiter::KeyedRateLimiter;
use crate::resolver::Resolver;
use crate::transcript::{format_transcript, OutputFormat, TrackList};
use crate::youtube;
use axum::{
    extract::{ConnectInfo, RawQuery, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;
use uuid::Uuid;

/// Shared application state.
struct AppState {
    resolver: Resolver,
    fallback: AudioFallback,
    inbound: KeyedRateLimiter,
    settings: Settings,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let resolver = Resolver::new(&settings)?;
    let fallback = AudioFallback::new(&settings);

    let cors = cors_layer(&settings.server.cors_allow_origins)?;

    let state = Arc::new(AppState {
        resolver,
        fallback,
        inbound: KeyedRateLimiter::new(settings.server.inbound_requests_per_minute),
        settings,
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/", get(index))
        .route("/transcript", get(get_transcript))
        .route("/transcript/available", get(available_tracks))
        .route("/transcribe", post(transcribe_fallback))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            inbound_rate_limit,
        ))
        .layer(middleware::from_fn(request_id))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Undertekst Transcript Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Transcript", "GET  /transcript?id=...&format=txt|json|srt|vtt");
    Output::kv("Available", "GET  /transcript/available?id=...");
    Output::kv("Transcribe (legacy)", "POST /transcribe");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let values: Vec<HeaderValue> = origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<_, _>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(values)))
}

/// Attach a correlation ID to every response, honoring an incoming
/// `X-Request-Id` header when present.
async fn request_id(request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

/// Reject clients past the inbound per-IP limit before any handler runs.
/// This protects the service itself; the resolver's own limiter separately
/// paces outbound provider requests.
async fn inbound_rate_limit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    match state.inbound.try_acquire(addr.ip()) {
        Ok(()) => next.run(request).await,
        Err(wait) => too_many_requests(wait),
    }
}

fn too_many_requests(wait: Duration) -> Response {
    // Retry-After rounds the wait up to whole seconds.
    let retry_after = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    let mut response = error_body(StatusCode::TOO_MANY_REQUESTS, "Too many requests");
    if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    response
}

// === Request/Response Types ===

/// Parsed `/transcript` query parameters. Languages come from repeatable
/// `lang` params and/or a csv `languages` param, preference order preserved.
#[derive(Debug, Default, PartialEq)]
struct TranscriptQuery {
    input: Option<String>,
    languages: Vec<String>,
    format: String,
    download: bool,
}

impl TranscriptQuery {
    fn parse(query: &str) -> Self {
        let mut parsed = TranscriptQuery {
            format: "txt".to_string(),
            ..Default::default()
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "id" | "url" => {
                    if parsed.input.is_none() && !value.is_empty() {
                        parsed.input = Some(value.into_owned());
                    }
                }
                "lang" => {
                    let value = value.trim();
                    if !value.is_empty() {
                        parsed.languages.push(value.to_string());
                    }
                }
                "languages" => {
                    parsed.languages.extend(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(String::from),
                    );
                }
                "format" => {
                    // An empty value keeps the default, like a missing param.
                    if !value.trim().is_empty() {
                        parsed.format = value.trim().to_lowercase();
                    }
                }
                "download" => {
                    parsed.download = matches!(value.as_ref(), "1" | "true" | "yes");
                }
                _ => {}
            }
        }

        parsed
    }
}

#[derive(Deserialize)]
struct TranscribeRequest {
    youtube_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AvailableResponse {
    video_id: String,
    available: Vec<AvailableTrack>,
    translation_languages: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AvailableTrack {
    language: Option<String>,
    language_code: String,
    is_generated: bool,
    is_translatable: bool,
}

impl AvailableResponse {
    fn new(video_id: String, list: TrackList) -> Self {
        Self {
            video_id,
            available: list
                .tracks
                .into_iter()
                .map(|t| AvailableTrack {
                    language: t.language,
                    language_code: t.language_code,
                    is_generated: t.is_auto_generated,
                    is_translatable: t.is_translatable,
                })
                .collect(),
            translation_languages: list.translation_languages,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Map resolver errors onto the HTTP surface: availability failures are 404,
/// bad identifiers are 400, transport and everything else is 500.
fn error_response(err: &UndertekstError) -> Response {
    let status = match err {
        UndertekstError::InvalidVideoId(_) => StatusCode::BAD_REQUEST,
        e if e.is_availability_error() => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        warn!("Request failed: {}", err);
    }
    error_body(status, err.to_string())
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "undertekst",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/transcript", "/transcript/available", "/transcribe", "/health"],
    }))
}

async fn get_transcript(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = TranscriptQuery::parse(query.as_deref().unwrap_or(""));

    let Some(input) = params.input else {
        return error_body(StatusCode::BAD_REQUEST, "Missing 'id' or 'url'");
    };
    let Some(video_id) = youtube::extract_video_id(&input) else {
        return error_body(StatusCode::BAD_REQUEST, "Invalid YouTube URL or ID");
    };
    let format: OutputFormat = match params.format.parse() {
        Ok(f) => f,
        Err(e) => return error_body(StatusCode::BAD_REQUEST, e),
    };

    let transcript = match state.resolver.resolve(&video_id, &params.languages).await {
        Ok(t) => t,
        Err(e) => return error_response(&e),
    };

    let body = format_transcript(&transcript, format);

    let disposition = format!(
        "{}; filename=\"{}.{}\"",
        if params.download { "attachment" } else { "inline" },
        video_id,
        format.extension()
    );

    let mut response = ([(header::CONTENT_TYPE, format.content_type())], body).into_response();
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }
    let max_age = state.settings.resolver.cache_max_age_seconds;
    if max_age > 0 {
        if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={}", max_age)) {
            response.headers_mut().insert(header::CACHE_CONTROL, value);
        }
    }
    response
}

async fn available_tracks(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = TranscriptQuery::parse(query.as_deref().unwrap_or(""));

    let Some(input) = params.input else {
        return error_body(StatusCode::BAD_REQUEST, "Missing 'id' or 'url'");
    };
    let Some(video_id) = youtube::extract_video_id(&input) else {
        return error_body(StatusCode::BAD_REQUEST, "Invalid YouTube URL or ID");
    };

    match state.resolver.available_tracks(&video_id).await {
        Ok(list) => Json(AvailableResponse::new(video_id, list)).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn transcribe_fallback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranscribeRequest>,
) -> Response {
    match state
        .fallback
        .transcribe_url(state.resolver.cache(), &req.youtube_url)
        .await
    {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(&e),
    }
}
