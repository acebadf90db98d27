use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use property_pulse::portfolio::{
    classify_status, maintenance_score, sanitize_html, sanitize_text, summarize,
    validate_property_id, validate_property_status, ManualClock, Property, PropertyStatus,
    PropertyTaskCounts, RateLimiter,
};

fn tasks(completed: u32, pending: u32, overdue: u32) -> PropertyTaskCounts {
    PropertyTaskCounts {
        completed,
        pending,
        overdue,
    }
}

#[test]
fn maintenance_scores_match_reference_cases() {
    let none: [String; 0] = [];
    assert_eq!(maintenance_score(&tasks(0, 0, 0), &none), 100);
    assert_eq!(maintenance_score(&tasks(8, 2, 0), &none), 80);
    assert_eq!(maintenance_score(&tasks(8, 1, 1), &none), 70);
    assert_eq!(maintenance_score(&tasks(8, 2, 0), &["a", "b"]), 70);
    assert_eq!(maintenance_score(&tasks(1, 1, 5), &["a", "b", "c"]), 0);
}

#[test]
fn classification_reference_cases() {
    assert_eq!(classify_status(65, &tasks(3, 2, 0)), PropertyStatus::Pending);
    assert_eq!(classify_status(85, &tasks(5, 5, 0)), PropertyStatus::Pending);
    assert_eq!(classify_status(85, &tasks(8, 2, 0)), PropertyStatus::Complete);
    assert_eq!(classify_status(100, &tasks(0, 0, 1)), PropertyStatus::Overdue);
}

#[test]
fn derived_fields_stay_consistent_with_tasks() {
    let mut property = Property {
        id: "riverside-complex".to_string(),
        name: "Riverside Complex".to_string(),
        address: "456 Riverside Drive".to_string(),
        units: 36,
        status: PropertyStatus::Complete,
        last_inspection: NaiveDate::from_ymd_opt(2024, 9, 28).expect("valid date"),
        next_inspection: NaiveDate::from_ymd_opt(2024, 10, 8).expect("valid date"),
        maintenance_score: 100,
        tasks: tasks(8, 3, 1),
        issues: vec!["Elevator maintenance due".to_string()],
    };

    property.refresh_derived();
    // 8/12 = 66.67% -> 67, minus 10 overdue, minus 5 for the issue
    assert_eq!(property.maintenance_score, 52);
    assert_eq!(property.status, PropertyStatus::Overdue);

    property.tasks = tasks(11, 1, 0);
    property.issues.clear();
    property.refresh_derived();
    assert_eq!(property.maintenance_score, 92);
    assert_eq!(property.status, PropertyStatus::Complete);

    let summary = summarize(std::slice::from_ref(&property));
    assert_eq!(summary.complete_properties, 1);
    assert_eq!(summary.task_completion_rate, 92);
}

#[test]
fn client_values_are_normalized_before_rules() {
    let id = validate_property_id("  OAK-STREET  ");
    assert!(id.valid);
    assert_eq!(id.sanitized.as_deref(), Some("oak-street"));

    for (raw, message) in [
        ("ab".to_string(), "Property ID must be 3-50 characters"),
        ("a".repeat(51), "Property ID must be 3-50 characters"),
        ("Invalid_ID!".to_string(), "Property ID contains invalid characters"),
    ] {
        let result = validate_property_id(&raw);
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some(message));
    }

    let status = validate_property_status("\tOverdue\n");
    assert_eq!(status.sanitized.as_deref(), Some("overdue"));
}

#[test]
fn sanitizers_neutralize_markup_and_noise() {
    assert_eq!(
        sanitize_html("<script>alert(\"xss\")</script>"),
        "&lt;script&gt;alert(&quot;xss&quot;)&lt;&#x2F;script&gt;"
    );
    let cleaned = sanitize_text("  HVAC\x07 system \n\n check ");
    assert_eq!(cleaned, "HVAC system check");
    assert_eq!(sanitize_text(&cleaned), cleaned);
}

#[test]
fn limiter_denies_request_beyond_budget() {
    let clock = Arc::new(ManualClock::starting_at(0));
    let limiter = RateLimiter::new(clock.clone());
    let window = Duration::from_millis(500);

    for _ in 0..5 {
        assert!(limiter.check("tenant-portal", "update_status", 5, window).allowed);
    }
    assert!(!limiter.check("tenant-portal", "update_status", 5, window).allowed);

    clock.advance(window);
    assert!(limiter.check("tenant-portal", "update_status", 5, window).allowed);
}
