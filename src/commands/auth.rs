use tauri::AppHandle;
use tauri_plugin_opener::OpenerExt;

use crate::api::models::User;
use crate::commands::session::ApiState;
use crate::error::{AppError, Result};

/// Opens the backend's Discord login page in the system browser.
#[tauri::command]
pub async fn open_login(app: AppHandle, api: tauri::State<'_, ApiState>) -> Result<()> {
    let url = api.client().await.login_url();
    log::info!("opening login page {url}");
    app.opener()
        .open_url(url, None::<&str>)
        .map_err(|e| AppError::Custom(format!("Could not open browser: {e}")))
}

/// Stores the session token handed back by the login flow and checks it
/// against the backend. A rejected token is discarded.
#[tauri::command]
pub async fn set_session_token(token: String, api: tauri::State<'_, ApiState>) -> Result<User> {
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(AppError::NotAuthenticated);
    }

    api.set_token(token).await;
    match api.client().await.current_user().await {
        Ok(user) => {
            log::info!("signed in as {} (#{})", user.username, user.id);
            Ok(user)
        }
        Err(e) => {
            log::warn!("session token rejected: {e}");
            api.clear_token().await;
            Err(e)
        }
    }
}

#[tauri::command]
pub async fn current_user(api: tauri::State<'_, ApiState>) -> Result<User> {
    api.client().await.current_user().await
}

/// Ends the session on the backend and forgets the token either way.
#[tauri::command]
pub async fn logout(api: tauri::State<'_, ApiState>) -> Result<()> {
    let client = api.client().await;
    if client.token().is_some() {
        if let Err(e) = client.logout().await {
            log::warn!("logout request failed: {e}");
        }
    }
    api.clear_token().await;
    log::info!("signed out");
    Ok(())
}
