use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use property_pulse::error::AppError;
use property_pulse::portfolio::{
    validate_property, Property, PropertyRepository, PropertyStatus, PropertyTaskCounts,
    RepositoryError,
};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local property store; records keep their insertion order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPropertyRepository {
    records: Arc<Mutex<Vec<Property>>>,
}

impl InMemoryPropertyRepository {
    /// Loads records after checking each one against the strict record rules.
    pub(crate) fn with_properties(records: Vec<Property>) -> Result<Self, AppError> {
        for record in &records {
            if let Err(violations) = validate_property(record) {
                let detail = violations
                    .iter()
                    .map(|violation| format!("{}: {}", violation.field, violation.message))
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(AppError::Seed(format!("{} ({detail})", record.id)));
            }
        }

        Ok(Self {
            records: Arc::new(Mutex::new(records)),
        })
    }

    pub(crate) fn seeded() -> Result<Self, AppError> {
        Self::with_properties(seed_portfolio()?)
    }

    fn guard(&self) -> Result<MutexGuard<'_, Vec<Property>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("property store lock poisoned".to_string()))
    }
}

impl PropertyRepository for InMemoryPropertyRepository {
    fn list(&self) -> Result<Vec<Property>, RepositoryError> {
        Ok(self.guard()?.clone())
    }

    fn fetch(&self, id: &str) -> Result<Option<Property>, RepositoryError> {
        Ok(self.guard()?.iter().find(|record| record.id == id).cloned())
    }

    fn update_status(
        &self,
        id: &str,
        status: PropertyStatus,
    ) -> Result<Option<Property>, RepositoryError> {
        let mut guard = self.guard()?;
        Ok(guard.iter_mut().find(|record| record.id == id).map(|record| {
            record.status = status;
            record.clone()
        }))
    }
}

struct SeedRecord {
    id: &'static str,
    name: &'static str,
    address: &'static str,
    units: u32,
    status: PropertyStatus,
    last_inspection: (i32, u32, u32),
    next_inspection: (i32, u32, u32),
    maintenance_score: u8,
    tasks: (u32, u32, u32),
    issues: &'static [&'static str],
}

const SEED_PORTFOLIO: [SeedRecord; 6] = [
    SeedRecord {
        id: "oak-street",
        name: "Oak Street Apartments",
        address: "123 Oak Street, Downtown",
        units: 24,
        status: PropertyStatus::Complete,
        last_inspection: (2024, 10, 1),
        next_inspection: (2024, 10, 15),
        maintenance_score: 95,
        tasks: (12, 1, 0),
        issues: &[],
    },
    SeedRecord {
        id: "riverside-complex",
        name: "Riverside Complex",
        address: "456 Riverside Drive",
        units: 36,
        status: PropertyStatus::Pending,
        last_inspection: (2024, 9, 28),
        next_inspection: (2024, 10, 8),
        maintenance_score: 78,
        tasks: (8, 3, 1),
        issues: &["Elevator maintenance due"],
    },
    SeedRecord {
        id: "sunset-manor",
        name: "Sunset Manor",
        address: "789 Sunset Boulevard",
        units: 18,
        status: PropertyStatus::Complete,
        last_inspection: (2024, 9, 30),
        next_inspection: (2024, 10, 14),
        maintenance_score: 92,
        tasks: (15, 0, 0),
        issues: &[],
    },
    SeedRecord {
        id: "garden-view",
        name: "Garden View Apartments",
        address: "321 Garden Lane",
        units: 42,
        status: PropertyStatus::Overdue,
        last_inspection: (2024, 9, 20),
        next_inspection: (2024, 9, 25),
        maintenance_score: 65,
        tasks: (6, 4, 3),
        issues: &["Parking lot repairs", "HVAC system check", "Landscaping"],
    },
    SeedRecord {
        id: "maple-heights",
        name: "Maple Heights",
        address: "654 Maple Street",
        units: 30,
        status: PropertyStatus::Pending,
        last_inspection: (2024, 9, 25),
        next_inspection: (2024, 10, 5),
        maintenance_score: 83,
        tasks: (10, 2, 0),
        issues: &["Pool cleaning scheduled"],
    },
    SeedRecord {
        id: "cedar-court",
        name: "Cedar Court",
        address: "987 Cedar Avenue",
        units: 28,
        status: PropertyStatus::Complete,
        last_inspection: (2024, 10, 2),
        next_inspection: (2024, 10, 16),
        maintenance_score: 88,
        tasks: (14, 1, 0),
        issues: &[],
    },
];

/// Demo portfolio served until a real data source is wired in. Stored scores
/// and statuses are recomputed on every read.
pub(crate) fn seed_portfolio() -> Result<Vec<Property>, AppError> {
    SEED_PORTFOLIO
        .iter()
        .map(|seed| {
            Ok(Property {
                id: seed.id.to_string(),
                name: seed.name.to_string(),
                address: seed.address.to_string(),
                units: seed.units,
                status: seed.status,
                last_inspection: seed_date(seed.id, seed.last_inspection)?,
                next_inspection: seed_date(seed.id, seed.next_inspection)?,
                maintenance_score: seed.maintenance_score,
                tasks: PropertyTaskCounts {
                    completed: seed.tasks.0,
                    pending: seed.tasks.1,
                    overdue: seed.tasks.2,
                },
                issues: seed.issues.iter().map(|issue| issue.to_string()).collect(),
            })
        })
        .collect()
}

fn seed_date(id: &str, (year, month, day): (i32, u32, u32)) -> Result<NaiveDate, AppError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| AppError::Seed(format!("{id} has an invalid inspection date")))
}

pub(crate) fn parse_status(raw: &str) -> Result<PropertyStatus, String> {
    property_pulse::portfolio::validation::parse_property_status(raw).map_err(|err| err.to_string())
}
