use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::portfolio::domain::{Property, PropertyStatus, PropertyTaskCounts};
use crate::portfolio::rate_limit::{ManualClock, RateLimitPolicy, RateLimiter};
use crate::portfolio::repository::{PropertyRepository, RepositoryError};
use crate::portfolio::PortfolioService;

pub(super) const START_MILLIS: i64 = 1_727_740_800_000;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn property(
    id: &str,
    status: PropertyStatus,
    tasks: (u32, u32, u32),
    issues: &[&str],
) -> Property {
    Property {
        id: id.to_string(),
        name: format!("{} Homes", id.replace('-', " ")),
        address: "100 Test Street".to_string(),
        units: 12,
        status,
        last_inspection: date(2024, 9, 20),
        next_inspection: date(2024, 10, 20),
        maintenance_score: 0,
        tasks: PropertyTaskCounts {
            completed: tasks.0,
            pending: tasks.1,
            overdue: tasks.2,
        },
        issues: issues.iter().map(|issue| issue.to_string()).collect(),
    }
}

/// Stored statuses and scores are deliberately stale.
pub(super) fn portfolio() -> Vec<Property> {
    vec![
        property("oak-street", PropertyStatus::Pending, (12, 1, 0), &[]),
        property(
            "garden-view",
            PropertyStatus::Complete,
            (6, 4, 3),
            &["Parking lot repairs", "HVAC system check", "Landscaping"],
        ),
        property(
            "maple-heights",
            PropertyStatus::Complete,
            (10, 2, 0),
            &["Pool cleaning scheduled"],
        ),
    ]
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<Vec<Property>>,
}

impl MemoryRepository {
    pub(super) fn with(records: Vec<Property>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub(super) fn stored(&self, id: &str) -> Option<Property> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }
}

impl PropertyRepository for MemoryRepository {
    fn list(&self) -> Result<Vec<Property>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    fn fetch(&self, id: &str) -> Result<Option<Property>, RepositoryError> {
        Ok(self.stored(id))
    }

    fn update_status(
        &self,
        id: &str,
        status: PropertyStatus,
    ) -> Result<Option<Property>, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter_mut().find(|record| record.id == id).map(|record| {
            record.status = status;
            record.clone()
        }))
    }
}

pub(super) struct UnavailableRepository;

impl PropertyRepository for UnavailableRepository {
    fn list(&self) -> Result<Vec<Property>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &str) -> Result<Option<Property>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_status(
        &self,
        _id: &str,
        _status: PropertyStatus,
    ) -> Result<Option<Property>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn policy(max_requests: u32) -> RateLimitPolicy {
    RateLimitPolicy {
        max_requests,
        window: Duration::from_secs(60),
    }
}

pub(super) struct Harness<R> {
    pub(super) service: Arc<PortfolioService<R>>,
    pub(super) repository: Arc<R>,
    pub(super) clock: Arc<ManualClock>,
}

pub(super) fn harness_with<R>(repository: R, max_requests: u32) -> Harness<R>
where
    R: PropertyRepository + 'static,
{
    let repository = Arc::new(repository);
    let clock = Arc::new(ManualClock::starting_at(START_MILLIS));
    let limiter = Arc::new(RateLimiter::new(clock.clone()));
    let service = Arc::new(PortfolioService::new(
        repository.clone(),
        limiter,
        policy(max_requests),
    ));
    Harness {
        service,
        repository,
        clock,
    }
}

pub(super) fn harness() -> Harness<MemoryRepository> {
    harness_with(MemoryRepository::with(portfolio()), 10)
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is json")
}

pub(super) async fn assert_envelope_error(response: Response, status: StatusCode, message: &str) {
    assert_eq!(response.status(), status);
    let body = json_body(response).await;
    assert_eq!(body["success"], Value::Bool(false));
    assert_eq!(body["error"], Value::String(message.to_string()));
}
