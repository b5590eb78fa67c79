use serde::Serialize;

use crate::api::models::{Character, CharacterInput};
use crate::commands::session::ApiState;
use crate::error::{AppError, Result};
use crate::notify::{surface, NotifierState};
use crate::roster::{classify, Role, WowClass};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecInfo {
    pub name: &'static str,
    pub role: Role,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub specs: Vec<SpecInfo>,
}

/// Every class with its specs and the role each spec plays.
pub fn catalog() -> Vec<ClassInfo> {
    WowClass::ALL
        .iter()
        .map(|&class| ClassInfo {
            key: class.key(),
            name: class.display_name(),
            specs: class
                .specs()
                .iter()
                .map(|&name| SpecInfo {
                    name,
                    role: classify(class.key(), name),
                })
                .collect(),
        })
        .collect()
}

/// Checks a character form and fills in the canonical class key and derived role.
pub fn prepare_input(mut input: CharacterInput) -> Result<CharacterInput> {
    input.name = input.name.trim().to_string();
    if input.name.is_empty() {
        return Err(AppError::InvalidCharacter("name is required".into()));
    }

    let class = WowClass::parse(&input.class)
        .ok_or_else(|| AppError::InvalidCharacter(format!("unknown class \"{}\"", input.class)))?;
    if !class.has_spec(&input.spec) {
        return Err(AppError::InvalidCharacter(format!(
            "{} has no \"{}\" specialization",
            class.display_name(),
            input.spec
        )));
    }

    input.class = class.key().to_string();
    input.role = Some(classify(&input.class, &input.spec));
    Ok(input)
}

/// Replaces the stored role with the locally derived one, logging any drift.
pub fn reconcile_role(character: &mut Character) {
    let derived = classify(&character.class, &character.spec);
    if let Some(stored) = character.role {
        if stored != derived {
            log::warn!(
                "character {} ({}): backend role {stored} differs from derived {derived}",
                character.name,
                character.id
            );
        }
    }
    character.role = Some(derived);
}

#[tauri::command]
pub fn class_catalog() -> Vec<ClassInfo> {
    catalog()
}

#[tauri::command]
pub fn classify_character(class: String, spec: String) -> Role {
    classify(&class, &spec)
}

#[tauri::command]
pub async fn list_characters(api: tauri::State<'_, ApiState>) -> Result<Vec<Character>> {
    let mut characters = api.client().await.list_characters().await?;
    characters.iter_mut().for_each(reconcile_role);
    Ok(characters)
}

#[tauri::command]
pub async fn create_character(
    input: CharacterInput,
    api: tauri::State<'_, ApiState>,
    notifier: tauri::State<'_, NotifierState>,
) -> Result<Character> {
    let input = prepare_input(input)?;
    let result = api.client().await.create_character(&input).await;
    let mut character = surface(notifier.0.as_ref(), "Could not create character", result)?;
    reconcile_role(&mut character);
    log::info!("created character {} ({})", character.name, character.id);
    Ok(character)
}

#[tauri::command]
pub async fn update_character(
    id: i64,
    input: CharacterInput,
    api: tauri::State<'_, ApiState>,
    notifier: tauri::State<'_, NotifierState>,
) -> Result<Character> {
    let input = prepare_input(input)?;
    let result = api.client().await.update_character(id, &input).await;
    let mut character = surface(notifier.0.as_ref(), "Could not update character", result)?;
    reconcile_role(&mut character);
    Ok(character)
}

#[tauri::command]
pub async fn delete_character(
    id: i64,
    api: tauri::State<'_, ApiState>,
    notifier: tauri::State<'_, NotifierState>,
) -> Result<()> {
    let result = api.client().await.delete_character(id).await;
    surface(notifier.0.as_ref(), "Could not delete character", result)?;
    log::info!("deleted character {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(class: &str, spec: &str) -> CharacterInput {
        CharacterInput {
            name: " Bolvar ".into(),
            class: class.into(),
            spec: spec.into(),
            gear_score: 5900,
            is_main: true,
            role: None,
        }
    }

    #[test]
    fn test_prepare_input_normalizes_and_derives_role() {
        let prepared = prepare_input(input("Death Knight", "Frost")).unwrap();
        assert_eq!(prepared.name, "Bolvar");
        assert_eq!(prepared.class, "DEATH_KNIGHT");
        assert_eq!(prepared.role, Some(Role::Tank));
    }

    #[test]
    fn test_prepare_input_rejects_bad_forms() {
        assert!(matches!(
            prepare_input(input("Monk", "Mistweaver")),
            Err(AppError::InvalidCharacter(_))
        ));
        let err = prepare_input(input("MAGE", "Shadow")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid character: Mage has no \"Shadow\" specialization"
        );
        let mut blank = input("MAGE", "Fire");
        blank.name = "   ".into();
        assert!(prepare_input(blank).is_err());
    }

    #[test]
    fn test_reconcile_role_prefers_derived() {
        let mut character = Character {
            id: 9,
            name: "Jaina".into(),
            class: "MAGE".into(),
            spec: "Frost".into(),
            gear_score: 5700,
            is_main: true,
            role: Some(Role::Melee),
        };
        reconcile_role(&mut character);
        assert_eq!(character.role, Some(Role::Ranged));

        character.role = None;
        reconcile_role(&mut character);
        assert_eq!(character.role, Some(Role::Ranged));
    }

    #[test]
    fn test_catalog_lists_all_classes() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 10);
        let dk = catalog.iter().find(|c| c.key == "DEATH_KNIGHT").unwrap();
        assert_eq!(dk.name, "Death Knight");
        let frost = dk.specs.iter().find(|s| s.name == "Frost").unwrap();
        assert_eq!(frost.role, Role::Tank);
        assert!(catalog.iter().all(|c| c.specs.len() == 3));
    }
}
