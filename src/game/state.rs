use serde::Serialize;

/// Runtime state of one note, kept beside the immutable chart note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum NoteState {
    Scheduled,
    /// Hold note pressed at `since` and not yet released.
    Holding { since: f64 },
    Hit,
    Missed,
}

impl NoteState {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Self::Scheduled)
    }

    pub fn is_holding(&self) -> bool {
        matches!(self, Self::Holding { .. })
    }

    /// Hit and Missed never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Hit | Self::Missed)
    }
}

/// Note states indexed by chart note index.
#[derive(Debug, Clone)]
pub struct GamePlayState {
    note_states: Vec<NoteState>,
}

impl GamePlayState {
    pub fn new(note_count: usize) -> Self {
        Self {
            note_states: vec![NoteState::Scheduled; note_count],
        }
    }

    pub fn get_state(&self, index: usize) -> Option<NoteState> {
        self.note_states.get(index).copied()
    }

    pub fn states(&self) -> &[NoteState] {
        &self.note_states
    }

    pub fn set_holding(&mut self, index: usize, since: f64) {
        self.transition(index, NoteState::Holding { since });
    }

    pub fn set_hit(&mut self, index: usize) {
        self.transition(index, NoteState::Hit);
    }

    pub fn set_missed(&mut self, index: usize) {
        self.transition(index, NoteState::Missed);
    }

    /// Put a held note back to `Scheduled`. Terminal notes are left alone.
    pub fn revert_hold(&mut self, index: usize) {
        if let Some(state) = self.note_states.get_mut(index) {
            if state.is_holding() {
                *state = NoteState::Scheduled;
            }
        }
    }

    // Terminal states are never overwritten.
    fn transition(&mut self, index: usize, next: NoteState) {
        if let Some(state) = self.note_states.get_mut(index) {
            if !state.is_terminal() {
                *state = next;
            }
        }
    }

    pub fn all_notes_processed(&self) -> bool {
        self.note_states.iter().all(NoteState::is_terminal)
    }
}
