//! Listing commands.

use super::AppContext;
use chrono::Local;
use gonetwork::format::{DEFAULT_TRUNCATE_LEN, format_date, format_status, truncate};
use gonetwork::services::{DeliverableService, EventService};

const TITLE_WIDTH: usize = 32;

/// Events command.
pub fn cmd_events(ctx: &AppContext) -> anyhow::Result<()> {
    let db = ctx.existing_database()?;
    let events = EventService::new(db).list()?;
    if events.is_empty() {
        println!("No events.");
        return Ok(());
    }
    for event in events {
        println!(
            "{:<10}  {:<w$}  {:<22}  {}",
            format_date(&event.date),
            truncate(&event.name, TITLE_WIDTH),
            format_status(event.status.as_str()),
            truncate(event.location.as_deref().unwrap_or("-"), DEFAULT_TRUNCATE_LEN),
            w = TITLE_WIDTH + 3,
        );
    }
    Ok(())
}

/// Deliverables command.
pub fn cmd_deliverables(ctx: &AppContext, overdue: bool) -> anyhow::Result<()> {
    let db = ctx.existing_database()?;
    let service = DeliverableService::new(db);
    let deliverables = if overdue {
        service.overdue(Local::now().date_naive())?
    } else {
        service.list()?
    };
    if deliverables.is_empty() {
        println!("No deliverables.");
        return Ok(());
    }
    for deliverable in deliverables {
        let deadline = deliverable
            .deadline
            .as_deref()
            .map_or_else(|| "-".to_string(), format_date);
        println!(
            "{:<10}  {:<w$}  {:>3}%  {}",
            deadline,
            truncate(&deliverable.title, TITLE_WIDTH),
            deliverable.progress,
            format_status(deliverable.status.as_str()),
            w = TITLE_WIDTH + 3,
        );
    }
    Ok(())
}
