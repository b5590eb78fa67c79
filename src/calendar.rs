use chrono::{Datelike, Days, NaiveDate, TimeZone, Weekday};
use serde::Serialize;

use crate::api::models::Raid;
use crate::error::{AppError, Result};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub raids: Vec<Raid>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CalendarWeek {
    pub days: Vec<CalendarDay>,
}

/// First and last day of a month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Custom(format!("Invalid month {year}-{month:02}")))?;
    let next = first
        .checked_add_months(chrono::Months::new(1))
        .ok_or_else(|| AppError::Custom(format!("Month {year}-{month:02} out of range")))?;
    let last = next
        .pred_opt()
        .ok_or_else(|| AppError::Custom(format!("Month {year}-{month:02} out of range")))?;
    Ok((first, last))
}

/// Dates the month grid shows: whole weeks from the week containing the 1st to
/// the week containing the last day.
pub fn grid_bounds(year: i32, month: u32, week_start: Weekday) -> Result<(NaiveDate, NaiveDate)> {
    let (first, last) = month_bounds(year, month)?;
    let lead = days_after(first.weekday(), week_start);
    let trail = 6 - days_after(last.weekday(), week_start);
    let start = first - Days::new(u64::from(lead));
    let end = last + Days::new(u64::from(trail));
    Ok((start, end))
}

fn days_after(day: Weekday, week_start: Weekday) -> u32 {
    (7 + day.num_days_from_monday() - week_start.num_days_from_monday()) % 7
}

/// Lays raids out on a month grid. A raid lands on the day it starts in `tz`.
pub fn month_grid<Tz: TimeZone>(
    year: i32,
    month: u32,
    week_start: Weekday,
    raids: &[Raid],
    tz: &Tz,
) -> Result<Vec<CalendarWeek>> {
    let (start, end) = grid_bounds(year, month, week_start)?;

    let mut sorted: Vec<&Raid> = raids.iter().collect();
    sorted.sort_by_key(|r| r.starts_at);

    let mut weeks = Vec::new();
    let mut days = Vec::with_capacity(7);
    for date in start.iter_days().take_while(|d| *d <= end) {
        let raids = sorted
            .iter()
            .filter(|r| r.starts_at.with_timezone(tz).date_naive() == date)
            .map(|r| (*r).clone())
            .collect();
        days.push(CalendarDay {
            date,
            in_month: date.month() == month && date.year() == year,
            raids,
        });
        if days.len() == 7 {
            weeks.push(CalendarWeek {
                days: std::mem::take(&mut days),
            });
        }
    }
    Ok(weeks)
}
