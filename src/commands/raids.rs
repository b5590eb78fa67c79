use chrono::{Local, Weekday};

use crate::api::models::{Raid, RaidInput};
use crate::calendar::{self, CalendarWeek};
use crate::commands::config::current_config;
use crate::commands::session::ApiState;
use crate::error::{AppError, Result};
use crate::notify::{surface, NotifierState};

/// Raids visible on a month page, including the spill-over days of the
/// first and last week.
#[tauri::command]
pub async fn list_raids_for_month(
    year: i32,
    month: u32,
    api: tauri::State<'_, ApiState>,
) -> Result<Vec<Raid>> {
    let week_start: Weekday = current_config().week_start.into();
    let (from, to) = calendar::grid_bounds(year, month, week_start)?;
    api.client().await.list_raids(from, to).await
}

/// Month grid with raids placed on the local date they start.
#[tauri::command]
pub async fn calendar_month(
    year: i32,
    month: u32,
    api: tauri::State<'_, ApiState>,
) -> Result<Vec<CalendarWeek>> {
    let week_start: Weekday = current_config().week_start.into();
    let (from, to) = calendar::grid_bounds(year, month, week_start)?;
    let raids = api.client().await.list_raids(from, to).await?;
    calendar::month_grid(year, month, week_start, &raids, &Local)
}

#[tauri::command]
pub async fn get_raid(id: i64, api: tauri::State<'_, ApiState>) -> Result<Raid> {
    api.client().await.get_raid(id).await
}

fn validate_raid(input: &RaidInput) -> Result<()> {
    if input.title.trim().is_empty() {
        return Err(AppError::Custom("A raid needs a title".into()));
    }
    if input.capacity.total() == 0 {
        return Err(AppError::Custom("A raid needs at least one roster slot".into()));
    }
    Ok(())
}

#[tauri::command]
pub async fn create_raid(
    input: RaidInput,
    api: tauri::State<'_, ApiState>,
    notifier: tauri::State<'_, NotifierState>,
) -> Result<Raid> {
    validate_raid(&input)?;
    let result = api.client().await.create_raid(&input).await;
    let raid = surface(notifier.0.as_ref(), "Could not create raid", result)?;
    log::info!("created raid {} \"{}\" at {}", raid.id, raid.title, raid.starts_at);
    Ok(raid)
}
