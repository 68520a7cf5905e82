use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::photos::validate_photo_array;
use crate::store::{login_count_key, PHOTOS_CACHE_KEY, SESSION_MARKER};

use super::error::ApiError;
use super::responses::{login_fields, LoginResponse, PhotosQuery};
use super::state::AppState;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/login", post(login))
        .route("/photos", get(photos))
        // Layers wrap outward: the id must be set before it is propagated.
        .layer(tower_http::request_id::PropagateRequestIdLayer::new(
            axum::http::header::HeaderName::from_static("x-request-id"),
        ))
        .layer(
            tower_http::request_id::SetRequestIdLayer::new(
                axum::http::header::HeaderName::from_static("x-request-id"),
                tower_http::request_id::MakeRequestUuid::default(),
            ),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> &'static str {
    "Server is running!"
}

async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<LoginResponse>, ApiError> {
    let body = parse_login_body(&headers, &body)?;
    let Some((username, _)) = login_fields(&body)
        .filter(|(username, password)| state.credentials.is_valid(username, password))
    else {
        warn!("login rejected: invalid credentials");
        return Err(ApiError::InvalidCredentials);
    };

    let login_count = state
        .store
        .incr(&login_count_key(username))
        .await
        .map_err(|err| {
            error!(username = %username, error = %err, "failed to increment login count");
            ApiError::LoginTracking
        })?;

    state
        .store
        .set_ex(username, SESSION_MARKER, state.ttls.session_seconds)
        .await
        .map_err(|err| {
            error!(username = %username, error = %err, "failed to store session");
            ApiError::LoginTracking
        })?;

    info!(username = %username, login_count, "user logged in");
    Ok(Json(LoginResponse {
        message: "Logged in successfully",
        login_count,
    }))
}

async fn photos(
    State(state): State<AppState>,
    Query(query): Query<PhotosQuery>,
) -> Result<Response, ApiError> {
    let Some(username) = query.username else {
        error!("error fetching photos: username query parameter is missing");
        return Err(ApiError::PhotoFetch);
    };

    let session = state.store.get(&username).await.map_err(|err| {
        error!(username = %username, error = %err, "failed to look up session");
        ApiError::PhotoFetch
    })?;
    if session.is_none() {
        debug!(username = %username, "photos requested without session");
        return Err(ApiError::NotLoggedIn);
    }

    let cached = state.store.get(PHOTOS_CACHE_KEY).await.map_err(|err| {
        error!(error = %err, "failed to read photo cache");
        ApiError::PhotoFetch
    })?;
    if let Some(cached) = cached {
        validate_photo_array(&cached).map_err(|err| {
            error!(error = %err, "cached photo listing is corrupt");
            ApiError::PhotoFetch
        })?;
        debug!(username = %username, "returning cached photos");
        return Ok(json_response(cached));
    }

    let fetched = state.photos.fetch().await.map_err(|err| {
        error!(error = %err, "error fetching photos");
        ApiError::PhotoFetch
    })?;
    state
        .store
        .set_ex(PHOTOS_CACHE_KEY, &fetched, state.ttls.photo_cache_seconds)
        .await
        .map_err(|err| {
            error!(error = %err, "failed to cache photos");
            ApiError::PhotoFetch
        })?;
    debug!(
        username = %username,
        ttl_seconds = state.ttls.photo_cache_seconds,
        "photos fetched and cached"
    );

    Ok(json_response(fetched))
}

/// Bodies without a JSON content type, and empty bodies, read as an empty object.
/// Only objects and arrays are accepted at the top level.
fn parse_login_body(headers: &HeaderMap, body: &[u8]) -> Result<Value, ApiError> {
    if !is_json_content_type(headers) {
        return Ok(Value::Null);
    }
    match body.iter().copied().find(|b| !b.is_ascii_whitespace()) {
        None => return Ok(Value::Null),
        Some(b'{' | b'[') => {}
        Some(_) => {
            debug!("login body is not a JSON object or array");
            return Err(ApiError::MalformedBody);
        }
    }
    serde_json::from_slice(body).map_err(|err| {
        debug!(error = %err, "malformed login body");
        ApiError::MalformedBody
    })
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

fn json_response(body: String) -> Response {
    (
        [(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
        body,
    )
        .into_response()
}
