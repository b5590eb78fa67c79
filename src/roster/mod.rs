//! Roster building: role derivation, slot assignment, editing sessions and export.

pub mod board;
pub mod drag;
pub mod editor;
pub mod export;
pub mod role;

pub use board::{AssignOutcome, Candidate, CharacterId, RaidCapacity, RosterBoard, RosterSlot, SlotId};
pub use editor::{RosterEditor, RosterView, SuggestionReport};
pub use role::{classify, Role, WowClass};

/// Local roster validation failures. All of them are recoverable.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("{character} is a {character_role} character and cannot fill a {slot_role} slot")]
    RoleMismatch {
        character: String,
        character_role: Role,
        slot_role: Role,
    },

    #[error("Roster slot {0} does not exist")]
    UnknownSlot(String),

    #[error("Character {0} has no confirmed sign-up for this raid")]
    NotEligible(CharacterId),

    #[error("This roster is finalized and can no longer be changed")]
    Locked,
}
