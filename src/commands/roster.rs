use futures_util::future::try_join3;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tauri::AppHandle;
use tauri_plugin_dialog::DialogExt;
use tokio::sync::Mutex;

use crate::api::models::{RosterRecord, SlotRecord};
use crate::commands::config::remember_raid;
use crate::commands::session::ApiState;
use crate::error::{AppError, Result};
use crate::notify::{surface, Notice, Notifier, NotifierState};
use crate::roster::{CharacterId, RosterEditor, RosterError, RosterView, SlotId};
use crate::util::expand_tilde;

/// Managed Tauri state holding the roster currently open for editing.
#[derive(Default)]
pub struct RosterState {
    editor: Mutex<Option<RosterEditor>>,
}

impl RosterState {
    /// Runs `f` against the open editor under the lock.
    async fn with_editor<T>(&self, f: impl FnOnce(&mut RosterEditor) -> Result<T>) -> Result<T> {
        let mut guard = self.editor.lock().await;
        let editor = guard
            .as_mut()
            .ok_or_else(|| AppError::Custom("No roster is open".into()))?;
        f(editor)
    }

    async fn view(&self) -> Result<RosterView> {
        self.with_editor(|e| Ok(e.view())).await
    }

    /// Non-blocking check for unsaved edits, used when the window is closing.
    /// A held lock means a command is mid-edit, which counts as unsaved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.editor
            .try_lock()
            .map(|guard| guard.as_ref().is_some_and(RosterEditor::is_dirty))
            .unwrap_or(true)
    }
}

/// Loads a raid, its sign-ups and any saved roster, and opens it for editing.
#[tauri::command]
pub async fn open_roster(
    raid_id: i64,
    api: tauri::State<'_, ApiState>,
    roster: tauri::State<'_, RosterState>,
) -> Result<RosterView> {
    let client = api.client().await;
    let (raid, signups, record) = try_join3(
        client.get_raid(raid_id),
        client.list_signups(raid_id),
        client.get_roster(raid_id),
    )
    .await?;

    let editor = RosterEditor::open(raid, &signups, record.as_ref());
    let view = editor.view();
    log::info!(
        "opened roster for raid {raid_id}: {} candidates, {} slots",
        view.pool.len(),
        view.slots.len()
    );

    *roster.editor.lock().await = Some(editor);
    remember_raid(raid_id);
    Ok(view)
}

#[tauri::command]
pub async fn roster_view(roster: tauri::State<'_, RosterState>) -> Result<RosterView> {
    roster.view().await
}

#[tauri::command]
pub async fn assign_character(
    character_id: CharacterId,
    slot_id: SlotId,
    roster: tauri::State<'_, RosterState>,
    notifier: tauri::State<'_, NotifierState>,
) -> Result<RosterView> {
    roster
        .with_editor(|editor| {
            let outcome = editor.assign(character_id, &slot_id, notifier.0.as_ref())?;
            log::debug!("assign {character_id} -> {slot_id}: {outcome:?}");
            Ok(editor.view())
        })
        .await
}

#[tauri::command]
pub async fn unassign_slot(
    slot_id: SlotId,
    roster: tauri::State<'_, RosterState>,
) -> Result<RosterView> {
    roster
        .with_editor(|editor| {
            editor.unassign(&slot_id)?;
            Ok(editor.view())
        })
        .await
}

#[tauri::command]
pub async fn begin_touch_drag(
    character_id: CharacterId,
    roster: tauri::State<'_, RosterState>,
) -> Result<RosterView> {
    roster
        .with_editor(|editor| {
            editor.begin_drag(character_id)?;
            Ok(editor.view())
        })
        .await
}

#[tauri::command]
pub async fn drop_touch_drag(
    slot_id: SlotId,
    roster: tauri::State<'_, RosterState>,
    notifier: tauri::State<'_, NotifierState>,
) -> Result<RosterView> {
    roster
        .with_editor(|editor| {
            editor.drop_on(&slot_id, notifier.0.as_ref())?;
            Ok(editor.view())
        })
        .await
}

#[tauri::command]
pub async fn cancel_touch_drag(roster: tauri::State<'_, RosterState>) -> Result<RosterView> {
    roster
        .with_editor(|editor| {
            editor.cancel_drag();
            Ok(editor.view())
        })
        .await
}

/// Raid id and slots as they are right now, for sending to the backend.
async fn snapshot(roster: &RosterState) -> Result<(i64, Vec<SlotRecord>)> {
    roster
        .with_editor(|editor| {
            if editor.is_finalized() {
                return Err(RosterError::Locked.into());
            }
            Ok((editor.raid().id, editor.to_records()))
        })
        .await
}

/// Saves the current draft through `save`. A failed save is surfaced and
/// leaves the local roster as it was.
async fn save_draft_with<F, Fut>(
    roster: &RosterState,
    notifier: &dyn Notifier,
    save: F,
) -> Result<RosterView>
where
    F: FnOnce(i64, Vec<SlotRecord>) -> Fut,
    Fut: Future<Output = Result<RosterRecord>>,
{
    let (raid_id, slots) = snapshot(roster).await?;
    let result = save(raid_id, slots.clone()).await;
    surface(notifier, "Could not save roster", result)?;
    log::info!("saved draft roster for raid {raid_id}");

    roster
        .with_editor(|editor| {
            // Only clean if nothing changed while the request was in flight.
            if editor.raid().id == raid_id && editor.to_records() == slots {
                editor.mark_saved();
            }
            Ok(editor.view())
        })
        .await
}

/// Asks the leader to confirm, then finalizes through `finalize`. Declining
/// changes nothing. The slots are taken after the dialog closes, and the
/// record the backend answers with becomes the local roster.
async fn finalize_with<F, Fut>(
    roster: &RosterState,
    notifier: Arc<dyn Notifier>,
    finalize: F,
) -> Result<RosterView>
where
    F: FnOnce(i64, Vec<SlotRecord>) -> Fut,
    Fut: Future<Output = Result<RosterRecord>>,
{
    let (raid_id, _) = snapshot(roster).await?;
    let prompt = roster.with_editor(|editor| Ok(editor.finalize_prompt())).await?;

    let asker = notifier.clone();
    let confirmed = tokio::task::spawn_blocking(move || asker.confirm("Finalize roster", &prompt))
        .await
        .map_err(|e| AppError::Custom(e.to_string()))?;
    if !confirmed {
        log::info!("finalize of raid {raid_id} cancelled");
        return roster.view().await;
    }

    let (current_id, slots) = snapshot(roster).await?;
    if current_id != raid_id {
        return Err(AppError::Custom("The open roster changed".into()));
    }
    let result = finalize(raid_id, slots).await;
    let record = surface(notifier.as_ref(), "Could not finalize roster", result)?;
    log::info!("finalized roster for raid {raid_id}");

    let view = roster
        .with_editor(|editor| {
            if editor.raid().id == raid_id {
                editor.apply_finalized(&record);
            }
            Ok(editor.view())
        })
        .await?;
    notifier.notify(Notice::info(
        "Roster finalized",
        format!("The roster for {} is now visible to everyone signed up.", view.title),
    ));
    Ok(view)
}

/// Persists the current draft.
#[tauri::command]
pub async fn save_roster_draft(
    api: tauri::State<'_, ApiState>,
    roster: tauri::State<'_, RosterState>,
    notifier: tauri::State<'_, NotifierState>,
) -> Result<RosterView> {
    let client = api.client().await;
    save_draft_with(&roster, notifier.0.as_ref(), move |raid_id, slots| async move {
        client.save_roster(raid_id, &slots).await
    })
    .await
}

/// Locks the roster after the leader confirms.
#[tauri::command]
pub async fn finalize_roster(
    api: tauri::State<'_, ApiState>,
    roster: tauri::State<'_, RosterState>,
    notifier: tauri::State<'_, NotifierState>,
) -> Result<RosterView> {
    let client = api.client().await;
    finalize_with(&roster, notifier.0.clone(), move |raid_id, slots| async move {
        client.finalize_roster(raid_id, &slots).await
    })
    .await
}

/// Asks the backend for a suggested roster and loads it into the editor.
#[tauri::command]
pub async fn suggest_roster(
    api: tauri::State<'_, ApiState>,
    roster: tauri::State<'_, RosterState>,
    notifier: tauri::State<'_, NotifierState>,
) -> Result<RosterView> {
    let (raid_id, _) = snapshot(&roster).await?;
    let result = api.client().await.suggest_roster(raid_id).await;
    let suggestion = surface(notifier.0.as_ref(), "Could not suggest a roster", result)?;

    roster
        .with_editor(|editor| {
            if editor.raid().id != raid_id {
                return Err(AppError::Custom("The open roster changed".into()));
            }
            let report = editor.apply_suggestion(&suggestion.slots)?;
            log::info!(
                "applied suggestion for raid {raid_id}: {} placed, {} skipped",
                report.placed,
                report.skipped
            );
            if report.skipped > 0 {
                notifier.0.notify(Notice::warning(
                    "Suggestion adjusted",
                    format!(
                        "{} suggested placement(s) did not fit the roster and were left out.",
                        report.skipped
                    ),
                ));
            }
            Ok(editor.view())
        })
        .await
}

fn default_export_name(title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "roster.csv".to_string()
    } else {
        format!("{slug}-roster.csv")
    }
}

/// Writes the roster as CSV. Without a path the user picks one in a save
/// dialog; returns where the file went, or `None` if the dialog was cancelled.
#[tauri::command]
pub async fn export_roster_csv(
    path: Option<String>,
    app: AppHandle,
    roster: tauri::State<'_, RosterState>,
    notifier: tauri::State<'_, NotifierState>,
) -> Result<Option<String>> {
    let (csv, title) = roster
        .with_editor(|editor| Ok((editor.csv(), editor.raid().title.clone())))
        .await?;

    let target: Option<PathBuf> = match path {
        Some(p) => Some(expand_tilde(&p)),
        None => {
            let file_name = default_export_name(&title);
            tauri::async_runtime::spawn_blocking(move || {
                app.dialog()
                    .file()
                    .add_filter("CSV", &["csv"])
                    .set_file_name(file_name)
                    .blocking_save_file()
                    .and_then(|p| p.as_path().map(Path::to_path_buf))
            })
            .await
            .map_err(|e| AppError::Custom(e.to_string()))?
        }
    };

    let Some(target) = target else {
        return Ok(None);
    };
    let result = tokio::fs::write(&target, csv).await.map_err(AppError::from);
    surface(notifier.0.as_ref(), "Could not export roster", result)?;
    log::info!("exported roster to {}", target.display());
    Ok(Some(target.to_string_lossy().to_string()))
}

/// Roster text grouped by role, ready for the clipboard.
#[tauri::command]
pub async fn roster_summary(roster: tauri::State<'_, RosterState>) -> Result<String> {
    roster.with_editor(|editor| Ok(editor.summary())).await
}
