use super::domain::{Property, PropertyStatus, PropertySummary, PropertyTaskCounts};

/// Score awarded when a property has no tasks on record.
pub const PERFECT_SCORE: u8 = 100;
/// Scores below this line keep a property in `pending`.
pub const HEALTHY_SCORE_THRESHOLD: u8 = 70;
/// More pending tasks than this keep a property in `pending`.
pub const MAX_PENDING_FOR_COMPLETE: u32 = 3;

const OVERDUE_PENALTY: i64 = 10;
const ISSUE_PENALTY: i64 = 5;

/// Completion percentage minus penalties for overdue tasks and open issues.
///
/// The completion percentage is rounded half-up before penalties apply, and
/// the result is floored at zero.
pub fn maintenance_score<S: AsRef<str>>(tasks: &PropertyTaskCounts, issues: &[S]) -> u8 {
    let total = tasks.total();
    if total == 0 {
        return PERFECT_SCORE;
    }

    let base = rounded_percentage(u64::from(tasks.completed), total);
    let overdue_penalty = OVERDUE_PENALTY.saturating_mul(i64::from(tasks.overdue));
    let issue_penalty =
        ISSUE_PENALTY.saturating_mul(i64::try_from(issues.len()).unwrap_or(i64::MAX));

    let score = base
        .saturating_sub(overdue_penalty)
        .saturating_sub(issue_penalty)
        .clamp(0, i64::from(PERFECT_SCORE));
    score as u8
}

/// Tri-state classification; any overdue task wins over the score.
pub fn classify_status(score: u8, tasks: &PropertyTaskCounts) -> PropertyStatus {
    if tasks.overdue > 0 {
        return PropertyStatus::Overdue;
    }

    if score < HEALTHY_SCORE_THRESHOLD || tasks.pending > MAX_PENDING_FOR_COMPLETE {
        return PropertyStatus::Pending;
    }

    PropertyStatus::Complete
}

impl Property {
    /// Recomputes the score, then the status from that fresh score.
    pub fn refresh_derived(&mut self) {
        self.maintenance_score = maintenance_score(&self.tasks, self.issues.as_slice());
        self.status = classify_status(self.maintenance_score, &self.tasks);
    }

    pub fn with_derived(mut self) -> Self {
        self.refresh_derived();
        self
    }
}

/// Rolls up derived statuses and task counts across a portfolio.
pub fn summarize(properties: &[Property]) -> PropertySummary {
    let mut summary = PropertySummary {
        total_properties: properties.len(),
        ..PropertySummary::default()
    };

    for property in properties {
        match property.status {
            PropertyStatus::Complete => summary.complete_properties += 1,
            PropertyStatus::Pending => summary.pending_properties += 1,
            PropertyStatus::Overdue => summary.overdue_properties += 1,
        }
        summary.total_units += u64::from(property.units);
        summary.total_tasks += property.tasks.total();
        summary.completed_tasks += u64::from(property.tasks.completed);
    }

    summary.task_completion_rate = if summary.total_tasks == 0 {
        0
    } else {
        rounded_percentage(summary.completed_tasks, summary.total_tasks) as u8
    };

    summary
}

// Half-up rounding of `part / whole * 100` in integer arithmetic.
fn rounded_percentage(part: u64, whole: u64) -> i64 {
    let part = u128::from(part.min(whole));
    let whole = u128::from(whole);
    ((part * 200 + whole) / (whole * 2)) as i64
}
