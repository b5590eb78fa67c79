use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::role::{classify, Role};
use super::RosterError;

pub type CharacterId = i64;

/// Stable slot identifier, derived from role and position (`heal-3`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(String);

impl SlotId {
    pub fn new(role: Role, position: u32) -> Self {
        Self(format!("{role}-{position}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SlotId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How many slots of each role a raid has.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaidCapacity {
    pub tank_cap: u32,
    pub heal_cap: u32,
    pub melee_cap: u32,
    pub ranged_cap: u32,
}

impl RaidCapacity {
    pub fn new(tank_cap: u32, heal_cap: u32, melee_cap: u32, ranged_cap: u32) -> Self {
        Self {
            tank_cap,
            heal_cap,
            melee_cap,
            ranged_cap,
        }
    }

    pub fn for_role(&self, role: Role) -> u32 {
        match role {
            Role::Tank => self.tank_cap,
            Role::Heal => self.heal_cap,
            Role::Melee => self.melee_cap,
            Role::Ranged => self.ranged_cap,
        }
    }

    pub fn total(&self) -> u32 {
        Role::ALL.iter().map(|r| self.for_role(*r)).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSlot {
    pub id: SlotId,
    pub role: Role,
    pub position: u32,
    pub character_id: Option<CharacterId>,
}

/// A character with a confirmed sign-up, eligible for a slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CharacterId,
    pub name: String,
    pub class: String,
    pub spec: String,
    pub gear_score: u32,
    pub role: Role,
}

impl Candidate {
    pub fn new(
        id: CharacterId,
        name: impl Into<String>,
        class: impl Into<String>,
        spec: impl Into<String>,
        gear_score: u32,
    ) -> Self {
        let class = class.into();
        let spec = spec.into();
        let role = classify(&class, &spec);
        Self {
            id,
            name: name.into(),
            class,
            spec,
            gear_score,
            role,
        }
    }
}

/// Result of a successful `assign`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum AssignOutcome {
    /// The character already sat in that slot.
    Unchanged,
    #[serde(rename_all = "camelCase")]
    Placed {
        slot: SlotId,
        /// Slot the character moved out of.
        vacated: Option<SlotId>,
        /// Character that previously held the target slot.
        displaced: Option<CharacterId>,
    },
}

/// Fixed-role slots plus the pool of eligible characters.
#[derive(Clone, Debug, Default)]
pub struct RosterBoard {
    slots: Vec<RosterSlot>,
    candidates: BTreeMap<CharacterId, Candidate>,
}

impl RosterBoard {
    /// Creates empty slots for each role, tanks first.
    pub fn from_capacity(capacity: RaidCapacity, candidates: impl IntoIterator<Item = Candidate>) -> Self {
        let slots = Role::ALL
            .iter()
            .flat_map(|&role| {
                (1..=capacity.for_role(role)).map(move |position| RosterSlot {
                    id: SlotId::new(role, position),
                    role,
                    position,
                    character_id: None,
                })
            })
            .collect();

        Self {
            slots,
            candidates: candidates.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn slots(&self) -> &[RosterSlot] {
        &self.slots
    }

    pub fn slot(&self, id: &SlotId) -> Option<&RosterSlot> {
        self.slots.iter().find(|s| &s.id == id)
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.values()
    }

    pub fn candidate(&self, id: CharacterId) -> Option<&Candidate> {
        self.candidates.get(&id)
    }

    /// Character sitting in a slot, if any.
    pub fn occupant(&self, slot: &RosterSlot) -> Option<&Candidate> {
        slot.character_id.and_then(|id| self.candidates.get(&id))
    }

    /// Places a character into a slot, moving it out of any other slot.
    pub fn assign(
        &mut self,
        character_id: CharacterId,
        slot_id: &SlotId,
    ) -> Result<AssignOutcome, RosterError> {
        let target = self
            .slots
            .iter()
            .position(|s| &s.id == slot_id)
            .ok_or_else(|| RosterError::UnknownSlot(slot_id.to_string()))?;
        let candidate = self
            .candidates
            .get(&character_id)
            .ok_or(RosterError::NotEligible(character_id))?;

        let slot_role = self.slots[target].role;
        if candidate.role != slot_role {
            return Err(RosterError::RoleMismatch {
                character: candidate.name.clone(),
                character_role: candidate.role,
                slot_role,
            });
        }

        if self.slots[target].character_id == Some(character_id) {
            return Ok(AssignOutcome::Unchanged);
        }

        let displaced = self.slots[target].character_id.replace(character_id);

        let mut vacated = None;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if i != target && slot.character_id == Some(character_id) {
                slot.character_id = None;
                vacated = Some(slot.id.clone());
            }
        }

        Ok(AssignOutcome::Placed {
            slot: slot_id.clone(),
            vacated,
            displaced,
        })
    }

    /// Empties a slot. Returns the character that was removed.
    pub fn unassign(&mut self, slot_id: &SlotId) -> Option<CharacterId> {
        self.slots
            .iter_mut()
            .find(|s| &s.id == slot_id)
            .and_then(|s| s.character_id.take())
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.character_id = None;
        }
    }

    pub fn capacity_of(&self, role: Role) -> usize {
        self.slots.iter().filter(|s| s.role == role).count()
    }

    pub fn filled_count(&self, role: Role) -> usize {
        self.slots
            .iter()
            .filter(|s| s.role == role && s.character_id.is_some())
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| s.character_id.is_some())
    }

    pub fn assigned_character_ids(&self) -> BTreeSet<CharacterId> {
        self.slots.iter().filter_map(|s| s.character_id).collect()
    }
}
