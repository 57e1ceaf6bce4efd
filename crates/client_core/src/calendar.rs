//! Month grid for the compact calendar view.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use shared::{domain::EventId, protocol::EventRecord};
use thiserror::Error;
use tracing::debug;

use crate::fields::{parse_date, parse_time};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub id: EventId,
    pub title: String,
    pub time: Option<NaiveTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub events: Vec<CalendarEntry>,
}

#[derive(Debug, Clone)]
pub struct MonthGrid {
    year: i32,
    month: u32,
    weeks: Vec<[DayCell; 7]>,
}

impl MonthGrid {
    /// Lays out `year`-`month` as Sunday-first weeks and drops every event
    /// into the cell of its start date. Events outside the visible weeks or
    /// with an unreadable date are left out.
    pub fn build(year: i32, month: u32, events: &[EventRecord]) -> Result<Self, CalendarError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(CalendarError::InvalidMonth { year, month })?;
        let lead = i64::from(first.weekday().num_days_from_sunday());
        let grid_start = first - Duration::days(lead);
        let days = days_in_month(first);
        let week_count = (lead + i64::from(days) + 6) / 7;

        let mut weeks: Vec<[DayCell; 7]> = (0..week_count)
            .map(|week| {
                std::array::from_fn(|weekday| {
                    let date = grid_start + Duration::days(week * 7 + weekday as i64);
                    DayCell {
                        date,
                        in_month: date.month() == month && date.year() == year,
                        events: Vec::new(),
                    }
                })
            })
            .collect();

        for record in events {
            let Some(date) = parse_date(record.date.split('T').next().unwrap_or_default())
            else {
                debug!(event_id = %record.id, date = %record.date, "skipping event with unreadable date");
                continue;
            };
            let offset = (date - grid_start).num_days();
            if offset < 0 || offset >= week_count * 7 {
                continue;
            }
            let cell = &mut weeks[(offset / 7) as usize][(offset % 7) as usize];
            cell.events.push(CalendarEntry {
                id: record.id.clone(),
                title: record.title.clone(),
                time: record.time.as_deref().and_then(parse_time),
            });
        }

        for cell in weeks.iter_mut().flat_map(|week| week.iter_mut()) {
            // Untimed events sort first.
            cell.events
                .sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.title.cmp(&b.title)));
        }

        Ok(Self { year, month, weeks })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn weeks(&self) -> &[[DayCell; 7]] {
        &self.weeks
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayCell> {
        self.weeks
            .iter()
            .flat_map(|week| week.iter())
            .find(|cell| cell.date == date)
    }

    pub fn events_on(&self, date: NaiveDate) -> &[CalendarEntry] {
        self.day(date)
            .map(|cell| cell.events.as_slice())
            .unwrap_or(&[])
    }

    pub fn event_count(&self) -> usize {
        self.weeks
            .iter()
            .flat_map(|week| week.iter())
            .filter(|cell| cell.in_month)
            .map(|cell| cell.events.len())
            .sum()
    }
}

fn days_in_month(first: NaiveDate) -> u32 {
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next.map(|next| (next - first).num_days() as u32)
        .unwrap_or(31)
}

#[cfg(test)]
#[path = "tests/calendar_tests.rs"]
mod tests;
