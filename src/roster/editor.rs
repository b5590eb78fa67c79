use serde::Serialize;

use super::board::{AssignOutcome, Candidate, CharacterId, RosterBoard, SlotId};
use super::drag::TouchDrag;
use super::export;
use super::role::Role;
use super::RosterError;
use crate::api::models::{Character, Raid, RaidStatus, RosterRecord, Signup, SignupStatus, SlotRecord};
use crate::notify::{Notice, Notifier};

/// Snapshot of the editor handed to the webview after every change.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterView {
    pub raid_id: i64,
    pub title: String,
    pub finalized: bool,
    pub dirty: bool,
    pub complete: bool,
    pub dragging: Option<CharacterId>,
    pub slots: Vec<SlotView>,
    pub roles: Vec<RoleFill>,
    pub pool: Vec<PoolEntry>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub id: SlotId,
    pub role: Role,
    pub position: u32,
    pub character: Option<Candidate>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleFill {
    pub role: Role,
    pub filled: usize,
    pub capacity: usize,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolEntry {
    #[serde(flatten)]
    pub candidate: Candidate,
    /// Already sitting in a slot; the UI grays these out.
    pub assigned: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionReport {
    pub placed: usize,
    pub skipped: usize,
}

fn candidate_from(character: &Character) -> Candidate {
    Candidate::new(
        character.id,
        character.name.clone(),
        character.class.clone(),
        character.spec.clone(),
        character.gear_score,
    )
}

/// Places saved slots on `board`, dropping the ones that no longer fit.
fn replay(board: &mut RosterBoard, raid_id: i64, slots: &[SlotRecord]) {
    for slot in slots {
        let Some(character_id) = slot.character_id else {
            continue;
        };
        let slot_id = SlotId::new(slot.role, slot.position);
        if let Err(e) = board.assign(character_id, &slot_id) {
            log::warn!("raid {raid_id}: dropping saved slot {slot_id}: {e}");
        }
    }
}

/// One raid's roster while a leader is working on it.
pub struct RosterEditor {
    raid: Raid,
    board: RosterBoard,
    drag: TouchDrag,
    finalized: bool,
    dirty: bool,
}

impl RosterEditor {
    /// Builds the board from the raid's capacity, fills the pool with confirmed
    /// sign-ups and replays the persisted slots, if any.
    pub fn open(raid: Raid, signups: &[Signup], record: Option<&RosterRecord>) -> Self {
        let candidates = signups
            .iter()
            .filter(|s| s.status == SignupStatus::Confirmed)
            .map(|s| candidate_from(&s.character));
        let mut board = RosterBoard::from_capacity(raid.capacity, candidates);
        let mut finalized = raid.status == RaidStatus::Finalized;

        if let Some(record) = record {
            finalized |= record.finalized;
            replay(&mut board, raid.id, &record.slots);
        }

        Self {
            raid,
            board,
            drag: TouchDrag::default(),
            finalized,
            dirty: false,
        }
    }

    pub fn raid(&self) -> &Raid {
        &self.raid
    }

    pub fn board(&self) -> &RosterBoard {
        &self.board
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn ensure_editable(&self) -> Result<(), RosterError> {
        if self.finalized {
            Err(RosterError::Locked)
        } else {
            Ok(())
        }
    }

    /// Assigns a character to a slot. Role mismatches are also reported to the
    /// user through `notifier`.
    pub fn assign(
        &mut self,
        character_id: CharacterId,
        slot_id: &SlotId,
        notifier: &dyn Notifier,
    ) -> Result<AssignOutcome, RosterError> {
        self.ensure_editable()?;
        match self.board.assign(character_id, slot_id) {
            Ok(outcome) => {
                if outcome != AssignOutcome::Unchanged {
                    self.dirty = true;
                }
                Ok(outcome)
            }
            Err(e @ RosterError::RoleMismatch { .. }) => {
                notifier.notify(Notice::warning("Role mismatch", e.to_string()));
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    pub fn unassign(&mut self, slot_id: &SlotId) -> Result<Option<CharacterId>, RosterError> {
        self.ensure_editable()?;
        let removed = self.board.unassign(slot_id);
        if removed.is_some() {
            self.dirty = true;
        }
        Ok(removed)
    }

    pub fn begin_drag(&mut self, character_id: CharacterId) -> Result<(), RosterError> {
        self.ensure_editable()?;
        self.drag.begin(character_id);
        Ok(())
    }

    /// Finishes a touch drag over `slot_id`. Nothing in flight means nothing happens.
    pub fn drop_on(
        &mut self,
        slot_id: &SlotId,
        notifier: &dyn Notifier,
    ) -> Result<AssignOutcome, RosterError> {
        match self.drag.take() {
            Some(character_id) => self.assign(character_id, slot_id, notifier),
            None => Ok(AssignOutcome::Unchanged),
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Replaces the board contents with a server-side suggestion. Placements
    /// that fail local validation are skipped.
    pub fn apply_suggestion(&mut self, slots: &[SlotRecord]) -> Result<SuggestionReport, RosterError> {
        self.ensure_editable()?;
        self.board.clear();
        self.dirty = true;

        let mut suggested = 0;
        for slot in slots {
            let Some(character_id) = slot.character_id else {
                continue;
            };
            suggested += 1;
            let slot_id = SlotId::new(slot.role, slot.position);
            match self.board.assign(character_id, &slot_id) {
                Ok(AssignOutcome::Placed { vacated: Some(from), .. }) => {
                    log::warn!(
                        "raid {}: character {character_id} suggested twice, moved from {from} to {slot_id}",
                        self.raid.id
                    );
                }
                Ok(AssignOutcome::Placed { displaced: Some(other), .. }) => {
                    log::warn!(
                        "raid {}: suggested slot {slot_id} listed twice, {other} replaced",
                        self.raid.id
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("raid {}: skipping suggested slot {slot_id}: {e}", self.raid.id);
                }
            }
        }

        // Duplicates overwrite earlier placements, so count what actually stuck.
        let placed = self.board.assigned_character_ids().len();
        Ok(SuggestionReport {
            placed,
            skipped: suggested - placed,
        })
    }

    /// Wire form of every slot, filled or not.
    pub fn to_records(&self) -> Vec<SlotRecord> {
        self.board
            .slots()
            .iter()
            .map(|s| SlotRecord {
                role: s.role,
                position: s.position,
                character_id: s.character_id,
            })
            .collect()
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn mark_finalized(&mut self) {
        self.finalized = true;
        self.dirty = false;
        self.raid.status = RaidStatus::Finalized;
        self.drag.cancel();
    }

    /// Takes the roster the backend finalized as the local truth and locks it.
    pub fn apply_finalized(&mut self, record: &RosterRecord) {
        self.board.clear();
        replay(&mut self.board, self.raid.id, &record.slots);
        self.mark_finalized();
    }

    /// Question put to the leader before finalizing, warning about empty slots.
    pub fn finalize_prompt(&self) -> String {
        let open = self.board.slots().len() - self.board.assigned_character_ids().len();
        let mut message = format!(
            "Finalize the roster for {}? Everyone signed up will see it and it can no longer be edited.",
            self.raid.title
        );
        if open > 0 {
            message.push_str(&format!(" {open} slot(s) are still empty."));
        }
        message
    }

    pub fn csv(&self) -> String {
        export::roster_csv(&self.board)
    }

    pub fn summary(&self) -> String {
        export::roster_summary(&self.raid, &self.board)
    }

    pub fn view(&self) -> RosterView {
        let assigned = self.board.assigned_character_ids();

        let slots = self
            .board
            .slots()
            .iter()
            .map(|s| SlotView {
                id: s.id.clone(),
                role: s.role,
                position: s.position,
                character: self.board.occupant(s).cloned(),
            })
            .collect();

        let roles = Role::ALL
            .iter()
            .map(|&role| RoleFill {
                role,
                filled: self.board.filled_count(role),
                capacity: self.board.capacity_of(role),
            })
            .collect();

        let mut pool: Vec<PoolEntry> = self
            .board
            .candidates()
            .map(|c| PoolEntry {
                candidate: c.clone(),
                assigned: assigned.contains(&c.id),
            })
            .collect();
        pool.sort_by(|a, b| {
            a.candidate
                .role
                .cmp(&b.candidate.role)
                .then_with(|| a.candidate.name.cmp(&b.candidate.name))
        });

        RosterView {
            raid_id: self.raid.id,
            title: self.raid.title.clone(),
            finalized: self.finalized,
            dirty: self.dirty,
            complete: self.board.is_complete(),
            dragging: self.drag.current(),
            slots,
            roles,
            pool,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::roster::RaidCapacity;
    use chrono::TimeZone;

    pub fn raid(status: RaidStatus) -> Raid {
        Raid {
            id: 3,
            title: "Ulduar".into(),
            instance: "ULD10".into(),
            starts_at: chrono::Utc.with_ymd_and_hms(2026, 11, 2, 20, 0, 0).unwrap(),
            status,
            capacity: RaidCapacity::new(1, 1, 1, 1),
            leader_id: 1,
            description: None,
        }
    }

    pub fn signup(id: i64, name: &str, class: &str, spec: &str, status: SignupStatus) -> Signup {
        Signup {
            id: id + 100,
            raid_id: 3,
            character_id: id,
            character: Character {
                id,
                name: name.into(),
                class: class.into(),
                spec: spec.into(),
                gear_score: 5000,
                is_main: true,
                role: None,
            },
            status,
            note: None,
        }
    }

    pub fn signups() -> Vec<Signup> {
        vec![
            signup(1, "Tirion", "PALADIN", "Protection", SignupStatus::Confirmed),
            signup(2, "Malfurion", "DRUID", "Restoration", SignupStatus::Confirmed),
            signup(3, "Valeera", "ROGUE", "Subtlety", SignupStatus::Confirmed),
            signup(4, "Sylvanas", "HUNTER", "Marksmanship", SignupStatus::Confirmed),
            signup(5, "Bolvar", "PALADIN", "Holy", SignupStatus::Pending),
            signup(6, "Kael", "MAGE", "Fire", SignupStatus::Declined),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::RecordingNotifier;
    use crate::notify::NoticeLevel;
    use crate::roster::RaidCapacity;
    use super::testing::{raid, signups};

    #[test]
    fn test_only_confirmed_signups_are_eligible() {
        let editor = RosterEditor::open(raid(RaidStatus::Open), &signups(), None);
        let ids: Vec<_> = editor.board().candidates().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let mut editor = editor;
        let notifier = RecordingNotifier::default();
        assert_eq!(
            editor.assign(5, &SlotId::from("heal-1"), &notifier).unwrap_err(),
            RosterError::NotEligible(5)
        );
    }

    #[test]
    fn test_role_mismatch_is_notified() {
        let mut editor = RosterEditor::open(raid(RaidStatus::Open), &signups(), None);
        let notifier = RecordingNotifier::default();

        let err = editor.assign(3, &SlotId::from("tank-1"), &notifier).unwrap_err();
        assert!(matches!(err, RosterError::RoleMismatch { .. }));
        assert!(!editor.is_dirty());

        let notices = notifier.taken();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
        assert_eq!(
            notices[0].message,
            "Valeera is a melee character and cannot fill a tank slot"
        );
    }

    #[test]
    fn test_assign_marks_dirty_and_save_clears() {
        let mut editor = RosterEditor::open(raid(RaidStatus::Open), &signups(), None);
        let notifier = RecordingNotifier::default();
        editor.assign(1, &SlotId::from("tank-1"), &notifier).unwrap();
        assert!(editor.is_dirty());
        editor.mark_saved();
        assert!(!editor.is_dirty());

        // Re-assigning to the same slot changes nothing.
        editor.assign(1, &SlotId::from("tank-1"), &notifier).unwrap();
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_persisted_slots_are_replayed() {
        let record = RosterRecord {
            raid_id: 3,
            slots: vec![
                SlotRecord { role: Role::Tank, position: 1, character_id: Some(1) },
                SlotRecord { role: Role::Heal, position: 1, character_id: Some(2) },
                // Pending sign-up: dropped.
                SlotRecord { role: Role::Melee, position: 1, character_id: Some(5) },
                // Wrong role: dropped.
                SlotRecord { role: Role::Ranged, position: 1, character_id: Some(3) },
            ],
            finalized: false,
            finalized_at: None,
        };
        let editor = RosterEditor::open(raid(RaidStatus::Open), &signups(), Some(&record));
        let records = editor.to_records();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].character_id, Some(1));
        assert_eq!(records[1].character_id, Some(2));
        assert_eq!(records[2].character_id, None);
        assert_eq!(records[3].character_id, None);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_records_round_trip() {
        let mut editor = RosterEditor::open(raid(RaidStatus::Open), &signups(), None);
        let notifier = RecordingNotifier::default();
        editor.assign(1, &SlotId::from("tank-1"), &notifier).unwrap();
        editor.assign(4, &SlotId::from("ranged-1"), &notifier).unwrap();

        let record = RosterRecord {
            raid_id: 3,
            slots: editor.to_records(),
            finalized: false,
            finalized_at: None,
        };
        let reopened = RosterEditor::open(raid(RaidStatus::Open), &signups(), Some(&record));
        assert_eq!(reopened.to_records(), editor.to_records());
    }

    #[test]
    fn test_touch_drag_and_drop() {
        let mut editor = RosterEditor::open(raid(RaidStatus::Open), &signups(), None);
        let notifier = RecordingNotifier::default();

        // Nothing in flight.
        assert_eq!(
            editor.drop_on(&SlotId::from("tank-1"), &notifier).unwrap(),
            AssignOutcome::Unchanged
        );

        editor.begin_drag(3).unwrap();
        editor.begin_drag(1).unwrap();
        assert_eq!(editor.view().dragging, Some(1));
        editor.drop_on(&SlotId::from("tank-1"), &notifier).unwrap();
        assert_eq!(editor.board().slot(&SlotId::from("tank-1")).unwrap().character_id, Some(1));
        assert_eq!(editor.view().dragging, None);

        editor.begin_drag(2).unwrap();
        editor.cancel_drag();
        assert_eq!(
            editor.drop_on(&SlotId::from("heal-1"), &notifier).unwrap(),
            AssignOutcome::Unchanged
        );
    }

    #[test]
    fn test_finalized_roster_is_locked() {
        let mut editor = RosterEditor::open(raid(RaidStatus::Finalized), &signups(), None);
        let notifier = RecordingNotifier::default();
        assert!(editor.is_finalized());
        assert_eq!(
            editor.assign(1, &SlotId::from("tank-1"), &notifier).unwrap_err(),
            RosterError::Locked
        );
        assert_eq!(editor.unassign(&SlotId::from("tank-1")).unwrap_err(), RosterError::Locked);
        assert_eq!(editor.begin_drag(1).unwrap_err(), RosterError::Locked);
        assert_eq!(editor.apply_suggestion(&[]).unwrap_err(), RosterError::Locked);
    }

    #[test]
    fn test_mark_finalized_locks_further_edits() {
        let mut editor = RosterEditor::open(raid(RaidStatus::Open), &signups(), None);
        let notifier = RecordingNotifier::default();
        editor.assign(1, &SlotId::from("tank-1"), &notifier).unwrap();
        editor.mark_finalized();
        assert_eq!(editor.raid().status, RaidStatus::Finalized);
        assert!(!editor.is_dirty());
        assert_eq!(
            editor.unassign(&SlotId::from("tank-1")).unwrap_err(),
            RosterError::Locked
        );
    }

    #[test]
    fn test_apply_suggestion_skips_invalid_placements() {
        let mut editor = RosterEditor::open(raid(RaidStatus::Open), &signups(), None);
        let notifier = RecordingNotifier::default();
        editor.assign(3, &SlotId::from("melee-1"), &notifier).unwrap();

        let report = editor
            .apply_suggestion(&[
                SlotRecord { role: Role::Tank, position: 1, character_id: Some(1) },
                SlotRecord { role: Role::Heal, position: 1, character_id: Some(4) },
                SlotRecord { role: Role::Heal, position: 2, character_id: Some(2) },
                SlotRecord { role: Role::Ranged, position: 1, character_id: Some(4) },
                SlotRecord { role: Role::Melee, position: 1, character_id: None },
            ])
            .unwrap();
        assert_eq!(report, SuggestionReport { placed: 2, skipped: 2 });

        // The suggestion replaces earlier placements.
        assert_eq!(
            editor.board().assigned_character_ids().into_iter().collect::<Vec<_>>(),
            vec![1, 4]
        );
        assert!(editor.is_dirty());
        // Suggestions never pop dialogs.
        assert!(notifier.taken().is_empty());
    }

    #[test]
    fn test_apply_suggestion_counts_duplicates_as_skipped() {
        let mut two_ranged = raid(RaidStatus::Open);
        two_ranged.capacity = RaidCapacity::new(1, 1, 1, 2);
        let mut editor = RosterEditor::open(two_ranged, &signups(), None);

        // Sylvanas listed in both ranged slots only fills one of them.
        let report = editor
            .apply_suggestion(&[
                SlotRecord { role: Role::Ranged, position: 1, character_id: Some(4) },
                SlotRecord { role: Role::Ranged, position: 2, character_id: Some(4) },
                SlotRecord { role: Role::Tank, position: 1, character_id: Some(1) },
            ])
            .unwrap();
        assert_eq!(report, SuggestionReport { placed: 2, skipped: 1 });
        assert_eq!(editor.board().filled_count(Role::Ranged), 1);
    }

    #[test]
    fn test_apply_finalized_takes_backend_roster() {
        let mut editor = RosterEditor::open(raid(RaidStatus::Open), &signups(), None);
        let notifier = RecordingNotifier::default();
        editor.assign(4, &SlotId::from("ranged-1"), &notifier).unwrap();

        let record = RosterRecord {
            raid_id: 3,
            slots: vec![SlotRecord { role: Role::Tank, position: 1, character_id: Some(1) }],
            finalized: true,
            finalized_at: None,
        };
        editor.apply_finalized(&record);

        assert!(editor.is_finalized());
        assert!(!editor.is_dirty());
        assert_eq!(
            editor.board().assigned_character_ids().into_iter().collect::<Vec<_>>(),
            vec![1]
        );
        assert_eq!(
            editor.assign(2, &SlotId::from("heal-1"), &notifier).unwrap_err(),
            RosterError::Locked
        );
    }

    #[test]
    fn test_view_pool_flags_assigned() {
        let mut editor = RosterEditor::open(raid(RaidStatus::Open), &signups(), None);
        let notifier = RecordingNotifier::default();
        editor.assign(2, &SlotId::from("heal-1"), &notifier).unwrap();

        let view = editor.view();
        let pool: Vec<(&str, bool)> = view
            .pool
            .iter()
            .map(|p| (p.candidate.name.as_str(), p.assigned))
            .collect();
        assert_eq!(
            pool,
            vec![
                ("Tirion", false),
                ("Malfurion", true),
                ("Valeera", false),
                ("Sylvanas", false),
            ]
        );
        let heal = view.roles.iter().find(|r| r.role == Role::Heal).unwrap();
        assert_eq!((heal.filled, heal.capacity), (1, 1));
        assert!(!view.complete);
        assert_eq!(view.slots[1].character.as_ref().map(|c| c.id), Some(2));
    }

    #[test]
    fn test_finalize_prompt_mentions_empty_slots() {
        let mut editor = RosterEditor::open(raid(RaidStatus::Open), &signups(), None);
        assert!(editor.finalize_prompt().ends_with(" 4 slot(s) are still empty."));

        let notifier = RecordingNotifier::default();
        editor.assign(1, &SlotId::from("tank-1"), &notifier).unwrap();
        editor.assign(2, &SlotId::from("heal-1"), &notifier).unwrap();
        editor.assign(3, &SlotId::from("melee-1"), &notifier).unwrap();
        editor.assign(4, &SlotId::from("ranged-1"), &notifier).unwrap();
        let prompt = editor.finalize_prompt();
        assert!(prompt.starts_with("Finalize the roster for Ulduar?"));
        assert!(!prompt.contains("still empty"));
    }
}
