use std::fmt::Write;

use super::board::RosterBoard;
use super::role::{class_display_name, Role};
use crate::api::models::Raid;

pub const CSV_HEADER: &str = "Character,Class,Spec,Role,Position,Gear Score";

/// One row per filled slot, in board order. Empty slots are left out.
pub fn roster_csv(board: &RosterBoard) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for slot in board.slots() {
        let Some(character) = board.occupant(slot) else {
            continue;
        };
        let row = [
            csv_field(&character.name),
            csv_field(&class_display_name(&character.class)),
            csv_field(&character.spec),
            slot.role.to_string(),
            slot.position.to_string(),
            character.gear_score.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Plain-text roster grouped by role, for pasting into chat.
pub fn roster_summary(raid: &Raid, board: &RosterBoard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", raid.title, raid.instance);
    let _ = writeln!(out, "{}", raid.starts_at.format("%a %d %b %Y, %H:%M UTC"));

    for role in Role::ALL {
        let _ = writeln!(
            out,
            "\n{} ({}/{})",
            role.heading(),
            board.filled_count(role),
            board.capacity_of(role)
        );

        let mut n = 0;
        for slot in board.slots().iter().filter(|s| s.role == role) {
            if let Some(character) = board.occupant(slot) {
                n += 1;
                let _ = writeln!(
                    out,
                    "{n}. {} - {} ({})",
                    character.name,
                    class_display_name(&character.class),
                    character.spec
                );
            }
        }
        if n == 0 {
            out.push_str("-\n");
        }
    }
    out
}
