use std::sync::Arc;

use tracing::{error, info, warn};

use super::domain::{ApiResponse, Property, PropertySummary};
use super::rate_limit::{RateLimitPolicy, RateLimiter};
use super::repository::{PropertyRepository, RepositoryError};
use super::scoring::summarize;
use super::validation::{parse_property_id, parse_property_status, ValidationError};

pub const UPDATE_STATUS_ACTION: &str = "update_status";

pub(crate) const LIST_FAILED: &str = "Failed to fetch properties";
pub(crate) const FETCH_FAILED: &str = "Failed to fetch property";
pub(crate) const UPDATE_FAILED: &str = "Failed to update property status";
pub(crate) const SUMMARY_FAILED: &str = "Failed to calculate property summary";
const NOT_FOUND: &str = "Property not found";
const RATE_LIMITED: &str = "Too many requests, please try again later";

/// Service composing the repository, derived-field recomputation, and the
/// advisory rate limiter.
pub struct PortfolioService<R> {
    repository: Arc<R>,
    limiter: Arc<RateLimiter>,
    policy: RateLimitPolicy,
}

impl<R> PortfolioService<R>
where
    R: PropertyRepository + 'static,
{
    pub fn new(repository: Arc<R>, limiter: Arc<RateLimiter>, policy: RateLimitPolicy) -> Self {
        Self {
            repository,
            limiter,
            policy,
        }
    }

    /// All properties with freshly derived score and status.
    pub fn properties(&self) -> Result<Vec<Property>, PortfolioError> {
        let properties = self.repository.list()?;
        let properties: Vec<Property> =
            properties.into_iter().map(Property::with_derived).collect();
        info!(count = properties.len(), "listed properties");
        Ok(properties)
    }

    /// Looks up a property by a client-supplied id, normalizing it first.
    pub fn property(&self, raw_id: &str) -> Result<Property, PortfolioError> {
        let id = parse_property_id(raw_id)?;
        let property = self
            .repository
            .fetch(&id)?
            .ok_or(PortfolioError::NotFound { id })?
            .with_derived();
        info!(property_id = %property.id, name = %property.name, "found property");
        Ok(property)
    }

    /// Stores the requested status, then returns the record with score and
    /// status recomputed from its tasks and issues.
    ///
    /// Each call counts against `client`'s budget before any validation runs.
    pub fn update_status(
        &self,
        client: &str,
        raw_id: &str,
        raw_status: &str,
    ) -> Result<Property, PortfolioError> {
        let decision = self
            .limiter
            .check_policy(client, UPDATE_STATUS_ACTION, &self.policy);
        if !decision.allowed {
            return Err(PortfolioError::RateLimited {
                client: client.to_string(),
                reset_time: decision.reset_time,
            });
        }

        let id = parse_property_id(raw_id)?;
        let requested = parse_property_status(raw_status)?;

        let property = self
            .repository
            .update_status(&id, requested)?
            .ok_or(PortfolioError::NotFound { id })?
            .with_derived();

        if property.status != requested {
            warn!(
                property_id = %property.id,
                requested = %requested,
                derived = %property.status,
                "requested status differs from derived status"
            );
        }
        info!(
            property_id = %property.id,
            status = %property.status,
            maintenance_score = property.maintenance_score,
            remaining = decision.remaining,
            "updated property status"
        );

        Ok(property)
    }

    pub fn summary(&self) -> Result<PropertySummary, PortfolioError> {
        let summary = summarize(&self.properties()?);
        info!(
            total_properties = summary.total_properties,
            completion_rate = summary.task_completion_rate,
            "calculated portfolio summary"
        );
        Ok(summary)
    }

    pub fn list_properties(&self) -> ApiResponse<Vec<Property>> {
        envelope(self.properties(), Vec::new(), LIST_FAILED, "list_properties")
    }

    pub fn property_by_id(&self, raw_id: &str) -> ApiResponse<Option<Property>> {
        envelope(self.property(raw_id).map(Some), None, FETCH_FAILED, "property_by_id")
    }

    pub fn update_property_status(
        &self,
        client: &str,
        raw_id: &str,
        raw_status: &str,
    ) -> ApiResponse<Option<Property>> {
        envelope(
            self.update_status(client, raw_id, raw_status).map(Some),
            None,
            UPDATE_FAILED,
            "update_property_status",
        )
    }

    pub fn portfolio_summary(&self) -> ApiResponse<PropertySummary> {
        envelope(
            self.summary(),
            PropertySummary::default(),
            SUMMARY_FAILED,
            "portfolio_summary",
        )
    }
}

/// Converts an operation result into the response envelope, logging the
/// internal detail and exposing only the public message.
pub fn envelope<T>(
    result: Result<T, PortfolioError>,
    empty: T,
    fallback: &str,
    operation: &'static str,
) -> ApiResponse<T> {
    match result {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => {
            err.log(operation);
            ApiResponse::failure(empty, err.public_message(fallback))
        }
    }
}

/// Failure of a portfolio operation, recovered into an error envelope.
#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("property '{id}' not found")]
    NotFound { id: String },
    #[error("rate limit exceeded for {client} until {reset_time}")]
    RateLimited { client: String, reset_time: i64 },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl PortfolioError {
    /// Message safe to show a client; `fallback` covers internal failures.
    pub fn public_message(&self, fallback: &str) -> String {
        match self {
            PortfolioError::Validation(err) => err.0.clone(),
            PortfolioError::NotFound { .. }
            | PortfolioError::Repository(RepositoryError::NotFound) => NOT_FOUND.to_string(),
            PortfolioError::RateLimited { .. } => RATE_LIMITED.to_string(),
            PortfolioError::Repository(RepositoryError::Unavailable(_)) => fallback.to_string(),
        }
    }

    pub(crate) fn log(&self, operation: &'static str) {
        match self {
            PortfolioError::Validation(err) => {
                warn!(
                    security_event = "validation_failed",
                    operation,
                    reason = %err,
                    "rejected client input"
                );
            }
            PortfolioError::RateLimited { client, reset_time } => {
                warn!(
                    security_event = "rate_limit_exceeded",
                    operation,
                    client = %client,
                    reset_time,
                    "rate limit exceeded"
                );
            }
            PortfolioError::NotFound { id } => {
                info!(operation, property_id = %id, "property not found");
            }
            PortfolioError::Repository(err) => {
                error!(operation, error = %err, "repository failure");
            }
        }
    }
}
