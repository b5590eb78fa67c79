use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::roster::{CharacterId, RaidCapacity, Role};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_raid_leader: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub class: String,
    pub spec: String,
    #[serde(default)]
    pub gear_score: u32,
    #[serde(default)]
    pub is_main: bool,
    /// Role as the backend has it stored. Recomputed locally on fetch.
    #[serde(default)]
    pub role: Option<Role>,
}

/// Body for creating or updating a character.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterInput {
    pub name: String,
    pub class: String,
    pub spec: String,
    #[serde(default)]
    pub gear_score: u32,
    #[serde(default)]
    pub is_main: bool,
    /// Filled in from `classify` before sending.
    #[serde(default, skip_deserializing)]
    pub role: Option<Role>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaidStatus {
    Open,
    Locked,
    Finalized,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Raid {
    pub id: i64,
    pub title: String,
    pub instance: String,
    pub starts_at: DateTime<Utc>,
    pub status: RaidStatus,
    #[serde(flatten)]
    pub capacity: RaidCapacity,
    pub leader_id: i64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaidInput {
    pub title: String,
    pub instance: String,
    pub starts_at: DateTime<Utc>,
    #[serde(flatten)]
    pub capacity: RaidCapacity,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignupStatus {
    Pending,
    Confirmed,
    Declined,
    Withdrawn,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
    pub id: i64,
    pub raid_id: i64,
    pub character_id: CharacterId,
    pub character: Character,
    pub status: SignupStatus,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    pub character_id: CharacterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One roster slot as the backend stores it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRecord {
    pub role: Role,
    pub position: u32,
    #[serde(default)]
    pub character_id: Option<CharacterId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRecord {
    pub raid_id: i64,
    pub slots: Vec<SlotRecord>,
    #[serde(default)]
    pub finalized: bool,
    #[serde(default)]
    pub finalized_at: Option<DateTime<Utc>>,
}
