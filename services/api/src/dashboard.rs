use crate::infra::{parse_status, InMemoryPropertyRepository};
use clap::Args;
use property_pulse::error::AppError;
use property_pulse::portfolio::{
    sanitize_text, ApiResponse, PortfolioService, Property, PropertyStatus, PropertySummary,
    RateLimitPolicy, RateLimiter,
};
use std::fmt::Write;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DashboardArgs {
    /// Only show properties with this status (complete, pending, overdue)
    #[arg(long, value_parser = parse_status)]
    pub(crate) status: Option<PropertyStatus>,
    /// Include each property's open issues in the output
    #[arg(long)]
    pub(crate) list_issues: bool,
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryPropertyRepository::seeded()?);
    let service = PortfolioService::new(
        repository,
        Arc::new(RateLimiter::default()),
        RateLimitPolicy::default(),
    );

    let summary = service.portfolio_summary();
    let properties = service.list_properties();
    print!(
        "{}",
        render_dashboard(&summary, &properties, args.status, args.list_issues)
    );
    Ok(())
}

pub(crate) fn render_dashboard(
    summary: &ApiResponse<PropertySummary>,
    properties: &ApiResponse<Vec<Property>>,
    filter: Option<PropertyStatus>,
    list_issues: bool,
) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_dashboard(&mut out, summary, properties, filter, list_issues);
    out
}

fn write_dashboard(
    out: &mut String,
    summary: &ApiResponse<PropertySummary>,
    properties: &ApiResponse<Vec<Property>>,
    filter: Option<PropertyStatus>,
    list_issues: bool,
) -> std::fmt::Result {
    writeln!(out, "Property status dashboard")?;

    match &summary.error {
        Some(error) => writeln!(out, "Summary unavailable: {error}")?,
        None => {
            let totals = &summary.data;
            writeln!(
                out,
                "{} properties | {} units | {}% of tasks completed ({}/{})",
                totals.total_properties,
                totals.total_units,
                totals.task_completion_rate,
                totals.completed_tasks,
                totals.total_tasks
            )?;
            for status in PropertyStatus::ordered() {
                let count = match status {
                    PropertyStatus::Complete => totals.complete_properties,
                    PropertyStatus::Pending => totals.pending_properties,
                    PropertyStatus::Overdue => totals.overdue_properties,
                };
                writeln!(out, "- {}: {}", status.label(), count)?;
            }
        }
    }

    if let Some(error) = &properties.error {
        writeln!(out, "\nProperties unavailable: {error}")?;
        return Ok(());
    }

    let visible: Vec<&Property> = properties
        .data
        .iter()
        .filter(|property| filter.map_or(true, |status| property.status == status))
        .collect();

    match filter {
        Some(status) => writeln!(out, "\n{} properties", status.label())?,
        None => writeln!(out, "\nProperties")?,
    }
    if visible.is_empty() {
        writeln!(out, "- none")?;
    }

    for property in visible {
        writeln!(
            out,
            "- {} [{}] score {}, {} units, {}",
            sanitize_text(&property.name),
            property.status.label(),
            property.maintenance_score,
            property.units,
            sanitize_text(&property.address)
        )?;
        writeln!(
            out,
            "  tasks {} done, {} pending, {} overdue | inspected {} | next {}",
            property.tasks.completed,
            property.tasks.pending,
            property.tasks.overdue,
            property.last_inspection,
            property.next_inspection
        )?;

        if list_issues {
            if property.issues.is_empty() {
                writeln!(out, "  issues: none")?;
            }
            for issue in &property.issues {
                writeln!(out, "  * {}", sanitize_text(issue))?;
            }
        }
    }

    Ok(())
}
