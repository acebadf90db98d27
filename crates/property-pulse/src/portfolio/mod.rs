//! Property portfolio health: derived maintenance scores and statuses, input
//! hygiene for client-supplied values, and the service/router pair that serves
//! them behind a uniform response envelope.

pub mod domain;
pub mod rate_limit;
pub mod repository;
pub mod router;
pub mod sanitize;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{ApiResponse, Property, PropertyStatus, PropertySummary, PropertyTaskCounts};
pub use rate_limit::{
    Clock, ManualClock, RateLimitDecision, RateLimitPolicy, RateLimiter, SystemClock,
};
pub use repository::{PropertyRepository, RepositoryError};
pub use router::{client_identifier, portfolio_router};
pub use sanitize::{sanitize_html, sanitize_text};
pub use scoring::{classify_status, maintenance_score, summarize};
pub use service::{PortfolioError, PortfolioService};
pub use validation::{
    validate_property, validate_property_id, validate_property_status, FieldViolation,
    ValidationError, ValidationResult,
};
