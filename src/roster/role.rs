use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::normalize_key;

/// Combat function a character fills in a raid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Tank,
    Heal,
    Melee,
    Ranged,
}

impl Role {
    /// Board order: tanks first, ranged last.
    pub const ALL: [Role; 4] = [Role::Tank, Role::Heal, Role::Melee, Role::Ranged];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Tank => "tank",
            Role::Heal => "heal",
            Role::Melee => "melee",
            Role::Ranged => "ranged",
        }
    }

    /// Heading used when listing a role's slots to people.
    pub fn heading(self) -> &'static str {
        match self {
            Role::Tank => "Tanks",
            Role::Heal => "Healers",
            Role::Melee => "Melee",
            Role::Ranged => "Ranged",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ten playable classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WowClass {
    Warrior,
    Paladin,
    Hunter,
    Rogue,
    Priest,
    DeathKnight,
    Shaman,
    Mage,
    Warlock,
    Druid,
}

impl WowClass {
    pub const ALL: [WowClass; 10] = [
        WowClass::Warrior,
        WowClass::Paladin,
        WowClass::Hunter,
        WowClass::Rogue,
        WowClass::Priest,
        WowClass::DeathKnight,
        WowClass::Shaman,
        WowClass::Mage,
        WowClass::Warlock,
        WowClass::Druid,
    ];

    /// Parses a class name in any casing or spacing ("death knight", "DEATH_KNIGHT").
    pub fn parse(name: &str) -> Option<Self> {
        let key = normalize_key(name);
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn key(self) -> &'static str {
        match self {
            WowClass::Warrior => "WARRIOR",
            WowClass::Paladin => "PALADIN",
            WowClass::Hunter => "HUNTER",
            WowClass::Rogue => "ROGUE",
            WowClass::Priest => "PRIEST",
            WowClass::DeathKnight => "DEATH_KNIGHT",
            WowClass::Shaman => "SHAMAN",
            WowClass::Mage => "MAGE",
            WowClass::Warlock => "WARLOCK",
            WowClass::Druid => "DRUID",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            WowClass::Warrior => "Warrior",
            WowClass::Paladin => "Paladin",
            WowClass::Hunter => "Hunter",
            WowClass::Rogue => "Rogue",
            WowClass::Priest => "Priest",
            WowClass::DeathKnight => "Death Knight",
            WowClass::Shaman => "Shaman",
            WowClass::Mage => "Mage",
            WowClass::Warlock => "Warlock",
            WowClass::Druid => "Druid",
        }
    }

    pub fn specs(self) -> &'static [&'static str] {
        match self {
            WowClass::Warrior => &["Arms", "Fury", "Protection"],
            WowClass::Paladin => &["Holy", "Protection", "Retribution"],
            WowClass::Hunter => &["Beast Mastery", "Marksmanship", "Survival"],
            WowClass::Rogue => &["Assassination", "Combat", "Subtlety"],
            WowClass::Priest => &["Discipline", "Holy", "Shadow"],
            WowClass::DeathKnight => &["Blood", "Frost", "Unholy"],
            WowClass::Shaman => &["Elemental", "Enhancement", "Restoration"],
            WowClass::Mage => &["Arcane", "Fire", "Frost"],
            WowClass::Warlock => &["Affliction", "Demonology", "Destruction"],
            WowClass::Druid => &["Balance", "Feral", "Restoration"],
        }
    }

    pub fn has_spec(self, spec: &str) -> bool {
        self.specs().contains(&spec)
    }
}

/// Pretty class name for output, falling back to the raw input for unknown classes.
pub fn class_display_name(name: &str) -> String {
    WowClass::parse(name)
        .map(|c| c.display_name().to_string())
        .unwrap_or_else(|| name.to_string())
}

// Class/spec pairs that do not follow the general rules below. Keep this table
// verbatim; some entries correct the general rules on purpose.
const OVERRIDES: [(WowClass, &str, Role); 4] = [
    (WowClass::Priest, "Shadow", Role::Ranged),
    (WowClass::Druid, "Balance", Role::Ranged),
    (WowClass::Shaman, "Elemental", Role::Ranged),
    (WowClass::DeathKnight, "Frost", Role::Tank),
];

const TANK_SPECS: [&str; 3] = ["Protection", "Blood", "Feral"];
const HEAL_SPECS: [&str; 3] = ["Holy", "Discipline", "Restoration"];
const RANGED_CLASSES: [WowClass; 3] = [WowClass::Hunter, WowClass::Mage, WowClass::Warlock];

/// Derives the role for a class/spec pair. First matching rule wins; anything
/// unrecognized ends up melee.
pub fn classify(class_name: &str, spec: &str) -> Role {
    let class = WowClass::parse(class_name);

    if let Some(class) = class {
        if let Some(&(_, _, role)) = OVERRIDES
            .iter()
            .find(|(c, s, _)| *c == class && *s == spec)
        {
            return role;
        }
    }

    if TANK_SPECS.contains(&spec) {
        return Role::Tank;
    }
    if HEAL_SPECS.contains(&spec) {
        return Role::Heal;
    }

    match class {
        Some(c) if RANGED_CLASSES.contains(&c) => Role::Ranged,
        _ => Role::Melee,
    }
}
