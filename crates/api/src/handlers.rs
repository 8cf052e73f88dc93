use crate::AppState;
use account_models::{Account, AccountError, AccountRequest, ErrorShape};
use account_store::HealthStatus;
use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

pub type ApiError = (StatusCode, Json<ErrorShape>);

pub const SERVICE_NAME: &str = "Account REST API Service";
pub const SERVICE_VERSION: &str = "1.0";

/// Converts a domain error into the JSON error response and counts it.
fn api_error(state: &AppState, e: AccountError) -> ApiError {
    state.metrics.record_failure(&e);
    if e.http_status() >= 500 {
        error!("Request failed: {}", e);
    } else {
        warn!("Request rejected: {}", e);
    }
    error_response(&e)
}

pub fn error_response(e: &AccountError) -> ApiError {
    (
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(e.to_error_shape()),
    )
}

/// Account ids are integers; anything else names a resource that cannot exist.
fn parse_account_id(raw: &str) -> Result<i64, AccountError> {
    raw.parse::<i64>()
        .map_err(|_| AccountError::ResourceNotFound {
            path: format!("/accounts/{raw}"),
        })
}

/// Same as [`parse_account_id`], but also covers segments axum could not
/// decode, such as invalid UTF-8 escapes.
fn account_id(path: Result<Path<String>, PathRejection>, uri: &Uri) -> Result<i64, AccountError> {
    match path {
        Ok(Path(raw)) => parse_account_id(&raw),
        Err(_) => Err(AccountError::ResourceNotFound {
            path: uri.path().to_string(),
        }),
    }
}

fn check_content_type(headers: &HeaderMap) -> Result<(), AccountError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let is_json = content_type
        .and_then(|v| v.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false);

    if is_json {
        Ok(())
    } else {
        Err(AccountError::UnsupportedMediaType {
            content_type: content_type.map(str::to_string),
        })
    }
}

fn read_account_request(headers: &HeaderMap, body: &[u8]) -> Result<AccountRequest, AccountError> {
    check_content_type(headers)?;
    AccountRequest::from_json_bytes(body)
}

pub async fn index() -> Json<Value> {
    Json(json!({
        "name": SERVICE_NAME,
        "version": SERVICE_VERSION,
    }))
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let health = state.registry.health().await;
    let status = if health.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}

pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state.metrics.render().map_err(|e| api_error(&state, e))?;
    Ok((
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; version=0.0.4"),
        )],
        body,
    )
        .into_response())
}

#[instrument(skip(state, headers, body))]
pub async fn create_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, HeaderMap, Json<Account>), ApiError> {
    info!("Request to create an Account");

    let request = read_account_request(&headers, &body).map_err(|e| api_error(&state, e))?;
    let account = state
        .registry
        .create_account(request)
        .await
        .map_err(|e| api_error(&state, e))?;
    state.metrics.record_account_created();

    let mut response_headers = HeaderMap::new();
    let location = format!("/accounts/{}", account.id);
    if let Ok(value) = HeaderValue::from_str(&location) {
        response_headers.insert(header::LOCATION, value);
    }

    Ok((StatusCode::CREATED, response_headers, Json(account)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub name: Option<String>,
}

#[instrument(skip(state))]
pub async fn list_accounts(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Account>>, ApiError> {
    info!("Request to list Accounts");

    let Query(params) = params.map_err(|e| {
        api_error(
            &state,
            AccountError::DataValidation {
                reason: format!("Invalid query string: {}", e.body_text()),
            },
        )
    })?;

    let accounts = state
        .registry
        .list_accounts(params.name.as_deref())
        .await
        .map_err(|e| api_error(&state, e))?;
    info!("Returning {} accounts", accounts.len());
    Ok(Json(accounts))
}

#[instrument(skip(state, path))]
pub async fn get_account(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    uri: Uri,
) -> Result<Json<Account>, ApiError> {
    let id = account_id(path, &uri).map_err(|e| api_error(&state, e))?;
    info!("Request to read an Account with id: {}", id);
    let account = state
        .registry
        .get_account(id)
        .await
        .map_err(|e| api_error(&state, e))?;
    Ok(Json(account))
}

#[instrument(skip(state, path, headers, body))]
pub async fn update_account(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Account>, ApiError> {
    let id = account_id(path, &uri).map_err(|e| api_error(&state, e))?;
    info!("Request to update an Account with id: {}", id);
    let request = read_account_request(&headers, &body).map_err(|e| api_error(&state, e))?;
    let account = state
        .registry
        .update_account(id, request)
        .await
        .map_err(|e| api_error(&state, e))?;
    state.metrics.record_account_updated();
    Ok(Json(account))
}

#[instrument(skip(state, path))]
pub async fn delete_account(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    uri: Uri,
) -> Result<StatusCode, ApiError> {
    let id = account_id(path, &uri).map_err(|e| api_error(&state, e))?;
    info!("Request to delete an Account with id: {}", id);
    state
        .registry
        .delete_account(id)
        .await
        .map_err(|e| api_error(&state, e))?;
    state.metrics.record_account_deleted();
    Ok(StatusCode::NO_CONTENT)
}

pub async fn not_found(State(state): State<AppState>, uri: Uri) -> ApiError {
    api_error(
        &state,
        AccountError::ResourceNotFound {
            path: uri.path().to_string(),
        },
    )
}
