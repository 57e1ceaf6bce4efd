//! Command implementations, kept apart from argument parsing so they can be
//! driven against any [`EventsApi`].

use std::{fmt::Write as _, fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Datelike;
use client_core::{
    calendar::MonthGrid,
    wizard::{Step, LAST_STEP},
    DraftPatch, EventWizard, EventsApi, SubmitOutcome,
};
use shared::{
    domain::{Category, EventId},
    protocol::EventQuery,
};
use tracing::{info, warn};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct InviteReport {
    pub invited: Vec<String>,
    pub failed: Vec<(String, String)>,
}

pub fn read_patch(path: &Path) -> Result<DraftPatch> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read draft {}", path.display()))?;
    parse_patch(&raw).with_context(|| format!("failed to parse draft {}", path.display()))
}

pub fn parse_patch(raw: &str) -> Result<DraftPatch> {
    Ok(toml::from_str(raw)?)
}

pub fn parse_category(raw: &str) -> Result<Category> {
    let wanted = raw.trim().replace(['-', ' '], "_");
    Category::ALL
        .into_iter()
        .find(|category| category.as_wire().eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| anyhow!("unknown category \"{raw}\""))
}

fn describe_errors(wizard: &EventWizard) -> String {
    let step = Step::from_index(wizard.current_step())
        .map(Step::title)
        .unwrap_or("unknown step");
    let mut out = format!("step {} ({step}) is incomplete:", wizard.current_step());
    for (field, message) in wizard.errors() {
        let _ = write!(out, "\n  {field}: {message}");
    }
    out
}

fn warn_rejected(rejected: Vec<String>) {
    for entry in rejected {
        warn!("ignored {entry}");
    }
}

async fn submit<A: EventsApi + ?Sized>(wizard: &mut EventWizard, api: &A) -> Result<EventId> {
    let outcome = wizard
        .submit(api, |id| info!(event_id = %id, "event saved"))
        .await;
    match outcome {
        SubmitOutcome::Saved(id) => Ok(id),
        SubmitOutcome::Invalid => bail!(describe_errors(wizard)),
        SubmitOutcome::Failed => bail!(
            "could not save event: {}",
            wizard.submit_error().unwrap_or("unknown error")
        ),
        SubmitOutcome::Busy => bail!("a submission is already in progress"),
    }
}

/// Walks a fresh wizard through every step with the given draft, creates the
/// event and then invites the draft's guests.
pub async fn create_event<A: EventsApi + ?Sized>(
    api: &A,
    patch: DraftPatch,
) -> Result<(EventId, InviteReport)> {
    let mut wizard = EventWizard::create();
    warn_rejected(wizard.update_field(patch));

    while wizard.current_step() < LAST_STEP {
        if !wizard.next_step() {
            bail!(describe_errors(&wizard));
        }
    }

    let id = submit(&mut wizard, api).await?;
    let guests = wizard.draft().guest_emails.as_slice().to_vec();
    let report = invite_guests(api, &id, &guests).await;
    Ok((id, report))
}

pub async fn edit_event<A: EventsApi + ?Sized>(
    api: &A,
    id: &EventId,
    patch: DraftPatch,
) -> Result<(EventId, InviteReport)> {
    let record = api
        .get_event(id)
        .await
        .with_context(|| format!("failed to load event {id}"))?;
    let mut wizard = EventWizard::edit(&record);
    warn_rejected(wizard.update_field(patch));

    if !wizard.validate_all() {
        bail!(describe_errors(&wizard));
    }

    let id = submit(&mut wizard, api).await?;
    let guests = wizard.draft().guest_emails.as_slice().to_vec();
    let report = invite_guests(api, &id, &guests).await;
    Ok((id, report))
}

/// Invites each address in turn. A rejected address does not stop the rest.
pub async fn invite_guests<A: EventsApi + ?Sized>(
    api: &A,
    id: &EventId,
    emails: &[String],
) -> InviteReport {
    let mut report = InviteReport::default();
    for email in emails {
        match api.invite_guest(id, email).await {
            Ok(()) => report.invited.push(email.clone()),
            Err(err) => {
                warn!(event_id = %id, %email, "invite failed: {err}");
                report.failed.push((email.clone(), err.to_string()));
            }
        }
    }
    report
}

pub async fn month_grid<A: EventsApi + ?Sized>(
    api: &A,
    year: i32,
    month: u32,
    category: Option<Category>,
) -> Result<MonthGrid> {
    let events = api
        .list_events(&EventQuery {
            category,
            search: None,
        })
        .await
        .context("failed to list events")?;
    Ok(MonthGrid::build(year, month, &events)?)
}

/// Plain-text month view: a day-number header row per week followed by the
/// events of that week.
pub fn render_grid(grid: &MonthGrid) -> String {
    let mut out = format!(
        "{:04}-{:02}\n  Su  Mo  Tu  We  Th  Fr  Sa\n",
        grid.year(),
        grid.month()
    );
    for week in grid.weeks() {
        let mut line = String::new();
        for cell in week {
            if cell.in_month {
                let marker = if cell.events.is_empty() { ' ' } else { '*' };
                let _ = write!(line, "{:>3}{marker}", cell.date.day());
            } else {
                line.push_str("    ");
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
        for cell in week.iter().filter(|cell| cell.in_month) {
            for entry in &cell.events {
                let time = entry
                    .time
                    .map(|time| time.format("%H:%M").to_string())
                    .unwrap_or_else(|| "--:--".to_string());
                let _ = writeln!(out, "      {} {time} {} [{}]", cell.date, entry.title, entry.id);
            }
        }
    }
    out
}

pub fn render_invites(report: &InviteReport) -> String {
    let mut out = String::new();
    if !report.invited.is_empty() {
        let _ = writeln!(out, "invited: {}", report.invited.join(", "));
    }
    for (email, reason) in &report.failed {
        let _ = writeln!(out, "not invited: {email} ({reason})");
    }
    out
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
