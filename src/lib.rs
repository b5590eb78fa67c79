use std::sync::Arc;
use tauri::Manager;

pub mod api;
pub mod calendar;
mod commands;
pub mod error;
pub mod notify;
pub mod roster;
pub mod util;

pub use commands::config::{current_config, RaidplanConfig};

use commands::logs::{self, SessionLogger};
use commands::roster::RosterState;
use commands::session::ApiState;
use notify::{DialogNotifier, NotifierState};

pub fn run() {
    let config = current_config();
    let api_url = config.effective_api_url();
    let log_level = config.log_filter();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_opener::init())
        .manage(ApiState::new(&api_url))
        .manage(RosterState::default())
        .setup(move |app| {
            if let Some(dir) = logs::logs_dir() {
                if let Some(logger) = tauri::async_runtime::block_on(SessionLogger::new(&dir)) {
                    logs::init(logger, log_level);
                }
            }
            app.manage(NotifierState(Arc::new(DialogNotifier::new(
                app.handle().clone(),
            ))));
            log::info!(
                "Raidplan {} starting, backend {api_url}",
                env!("CARGO_PKG_VERSION")
            );
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::auth::open_login,
            commands::auth::set_session_token,
            commands::auth::current_user,
            commands::auth::logout,
            commands::characters::class_catalog,
            commands::characters::classify_character,
            commands::characters::list_characters,
            commands::characters::create_character,
            commands::characters::update_character,
            commands::characters::delete_character,
            commands::raids::list_raids_for_month,
            commands::raids::calendar_month,
            commands::raids::get_raid,
            commands::raids::create_raid,
            commands::signups::list_signups,
            commands::signups::sign_up,
            commands::signups::withdraw_signup,
            commands::signups::set_signup_status,
            commands::roster::open_roster,
            commands::roster::roster_view,
            commands::roster::assign_character,
            commands::roster::unassign_slot,
            commands::roster::begin_touch_drag,
            commands::roster::drop_touch_drag,
            commands::roster::cancel_touch_drag,
            commands::roster::save_roster_draft,
            commands::roster::finalize_roster,
            commands::roster::suggest_roster,
            commands::roster::export_roster_csv,
            commands::roster::roster_summary,
            commands::config::load_config,
            commands::config::save_settings,
        ])
        .on_window_event(|window, event| match event {
            tauri::WindowEvent::CloseRequested { api, .. } => {
                let unsaved = window
                    .try_state::<RosterState>()
                    .is_some_and(|state| state.inner().has_unsaved_changes());
                if !unsaved {
                    return;
                }
                api.prevent_close();
                let window = window.clone();
                tauri::async_runtime::spawn_blocking(move || {
                    let leave = match window.try_state::<NotifierState>() {
                        Some(notifier) => notifier.0.confirm(
                            "Unsaved roster",
                            "The roster has changes that are not saved. Close anyway?",
                        ),
                        None => true,
                    };
                    if leave {
                        log::warn!("closing with unsaved roster changes");
                        if let Err(e) = window.destroy() {
                            log::warn!("failed to close window: {e}");
                        }
                    }
                });
            }
            tauri::WindowEvent::Destroyed => log::info!("window closed"),
            _ => {}
        })
        .run(tauri::generate_context!())
        .expect("failed to run Raidplan");
}
