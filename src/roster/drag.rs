use super::board::CharacterId;

/// Tracks the single character being dragged by a touch gesture.
///
/// Touch events carry no drag payload, so the character picked up on
/// `touchstart` is remembered here until the matching drop. Starting a new
/// drag replaces whatever was in flight.
#[derive(Debug, Default)]
pub struct TouchDrag {
    dragged: Option<CharacterId>,
}

impl TouchDrag {
    pub fn begin(&mut self, character_id: CharacterId) {
        self.dragged = Some(character_id);
    }

    pub fn current(&self) -> Option<CharacterId> {
        self.dragged
    }

    /// Ends the gesture and returns the dragged character, if any.
    pub fn take(&mut self) -> Option<CharacterId> {
        self.dragged.take()
    }

    pub fn cancel(&mut self) {
        self.dragged = None;
    }
}
