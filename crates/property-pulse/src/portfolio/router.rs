use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::PropertySummary;
use super::repository::{PropertyRepository, RepositoryError};
use super::service::{
    envelope, PortfolioError, PortfolioService, FETCH_FAILED, LIST_FAILED, SUMMARY_FAILED,
    UPDATE_FAILED,
};

/// Router builder exposing the portfolio endpoints.
pub fn portfolio_router<R>(service: Arc<PortfolioService<R>>) -> Router
where
    R: PropertyRepository + 'static,
{
    Router::new()
        .route("/api/v1/properties", get(list_handler::<R>))
        .route("/api/v1/properties/:property_id", get(property_handler::<R>))
        .route(
            "/api/v1/properties/:property_id/status",
            put(update_status_handler::<R>),
        )
        .route("/api/v1/portfolio/summary", get(summary_handler::<R>))
        .with_state(service)
}

/// Body of a status update. A missing status, or a body that is not JSON, is
/// treated as empty input so the caller still gets an envelope.
#[derive(Debug, Default, Deserialize)]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub status: Option<String>,
}

pub(crate) async fn list_handler<R>(State(service): State<Arc<PortfolioService<R>>>) -> Response
where
    R: PropertyRepository + 'static,
{
    respond(service.properties(), Vec::new(), LIST_FAILED, "list_properties")
}

pub(crate) async fn property_handler<R>(
    State(service): State<Arc<PortfolioService<R>>>,
    Path(property_id): Path<String>,
) -> Response
where
    R: PropertyRepository + 'static,
{
    respond(
        service.property(&property_id).map(Some),
        None,
        FETCH_FAILED,
        "property_by_id",
    )
}

pub(crate) async fn update_status_handler<R>(
    State(service): State<Arc<PortfolioService<R>>>,
    Path(property_id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Response
where
    R: PropertyRepository + 'static,
{
    let client = client_identifier(&headers);
    let status = match body {
        Ok(Json(request)) => request.status.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!(%rejection, "unreadable status update body");
            String::new()
        }
    };
    respond(
        service
            .update_status(&client, &property_id, &status)
            .map(Some),
        None,
        UPDATE_FAILED,
        "update_property_status",
    )
}

pub(crate) async fn summary_handler<R>(
    State(service): State<Arc<PortfolioService<R>>>,
) -> Response
where
    R: PropertyRepository + 'static,
{
    respond(
        service.summary(),
        PropertySummary::default(),
        SUMMARY_FAILED,
        "portfolio_summary",
    )
}

fn respond<T: Serialize>(
    result: Result<T, PortfolioError>,
    empty: T,
    fallback: &str,
    operation: &'static str,
) -> Response {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(err) => status_for(err),
    };
    let body = envelope(result, empty, fallback, operation);
    (status, Json(body)).into_response()
}

pub fn status_for(error: &PortfolioError) -> StatusCode {
    match error {
        PortfolioError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PortfolioError::NotFound { .. } | PortfolioError::Repository(RepositoryError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        PortfolioError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        PortfolioError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, else `unknown`.
pub fn client_identifier(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty());
    if let Some(first) = forwarded {
        return first.to_string();
    }

    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}
