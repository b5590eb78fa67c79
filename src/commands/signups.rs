use crate::api::models::{RaidStatus, Signup, SignupInput, SignupStatus};
use crate::commands::characters::reconcile_role;
use crate::commands::session::ApiState;
use crate::error::{AppError, Result};
use crate::notify::{surface, NotifierState};

#[tauri::command]
pub async fn list_signups(raid_id: i64, api: tauri::State<'_, ApiState>) -> Result<Vec<Signup>> {
    let mut signups = api.client().await.list_signups(raid_id).await?;
    for signup in &mut signups {
        reconcile_role(&mut signup.character);
    }
    Ok(signups)
}

/// Signs a character up. Only raids still open take new sign-ups.
#[tauri::command]
pub async fn sign_up(
    raid_id: i64,
    character_id: i64,
    note: Option<String>,
    api: tauri::State<'_, ApiState>,
    notifier: tauri::State<'_, NotifierState>,
) -> Result<Signup> {
    let client = api.client().await;
    let result = async {
        let raid = client.get_raid(raid_id).await?;
        if raid.status != RaidStatus::Open {
            return Err(AppError::Custom(format!(
                "{} is no longer taking sign-ups",
                raid.title
            )));
        }
        let input = SignupInput {
            character_id,
            note: note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        };
        client.sign_up(raid_id, &input).await
    }
    .await;

    let signup = surface(notifier.0.as_ref(), "Sign-up failed", result)?;
    log::info!("character {character_id} signed up for raid {raid_id}");
    Ok(signup)
}

#[tauri::command]
pub async fn withdraw_signup(
    signup_id: i64,
    api: tauri::State<'_, ApiState>,
    notifier: tauri::State<'_, NotifierState>,
) -> Result<Signup> {
    let result = api
        .client()
        .await
        .set_signup_status(signup_id, SignupStatus::Withdrawn)
        .await;
    surface(notifier.0.as_ref(), "Could not withdraw", result)
}

/// Raid-leader action: confirm, decline or reset a sign-up.
#[tauri::command]
pub async fn set_signup_status(
    signup_id: i64,
    status: SignupStatus,
    api: tauri::State<'_, ApiState>,
    notifier: tauri::State<'_, NotifierState>,
) -> Result<Signup> {
    let result = api.client().await.set_signup_status(signup_id, status).await;
    let signup = surface(notifier.0.as_ref(), "Could not update sign-up", result)?;
    log::info!("sign-up {signup_id} is now {status:?}");
    Ok(signup)
}
