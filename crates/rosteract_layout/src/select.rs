//! Selection state reducers.
//!
//! The store is an immutable snapshot; every edit returns a new store so that a
//! layout call can hold one snapshot while the operator keeps editing.

use tracing::debug;

use crate::conf::C_LABEL_SELECTED;
use crate::spec::{EnumSelectionAction, SelectionError, SpecSelectionState, SpecSelectionStore};

impl SpecSelectionState {
    /// State seeded at import: selected, default label, not edited.
    pub fn seeded() -> Self {
        Self {
            selected: true,
            note: C_LABEL_SELECTED.to_string(),
            if_note_edited: false,
        }
    }
}

impl Default for SpecSelectionState {
    fn default() -> Self {
        Self::seeded()
    }
}

/// Apply one action to one state.
///
/// Toggling on always restores the default label. Toggling off clears the note
/// unless the operator typed it.
pub fn reduce_selection_state(
    state: &SpecSelectionState,
    action: &EnumSelectionAction,
) -> SpecSelectionState {
    match action {
        EnumSelectionAction::Toggle => {
            if state.selected {
                SpecSelectionState {
                    selected: false,
                    note: if state.if_note_edited {
                        state.note.clone()
                    } else {
                        String::new()
                    },
                    if_note_edited: state.if_note_edited,
                }
            } else {
                SpecSelectionState::seeded()
            }
        }
        EnumSelectionAction::SetNote(text) => SpecSelectionState {
            selected: state.selected,
            note: text.clone(),
            if_note_edited: true,
        },
    }
}

impl SpecSelectionStore {
    /// Store with `n_records` seeded states.
    pub fn seeded(n_records: usize) -> Self {
        Self {
            states: vec![SpecSelectionState::seeded(); n_records],
        }
    }

    /// Number of tracked records.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no record is tracked.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// State of record `id`.
    pub fn get(&self, id: usize) -> Option<&SpecSelectionState> {
        self.states.get(id)
    }

    /// States in record order.
    pub fn states(&self) -> &[SpecSelectionState] {
        &self.states
    }

    /// Number of selected records.
    pub fn n_selected(&self) -> usize {
        self.states.iter().filter(|state| state.selected).count()
    }

    /// New store with `action` applied to record `id`.
    pub fn apply(&self, id: usize, action: &EnumSelectionAction) -> Result<Self, SelectionError> {
        let state = self.get(id).ok_or(SelectionError::UnknownRecord {
            id,
            n_records: self.len(),
        })?;
        let state_next = reduce_selection_state(state, action);
        debug!(
            id,
            selected = state_next.selected,
            if_note_edited = state_next.if_note_edited,
            "selection state updated"
        );

        let mut l_states = self.states.clone();
        l_states[id] = state_next;
        Ok(Self { states: l_states })
    }

    /// Shorthand for [`EnumSelectionAction::Toggle`].
    pub fn toggle(&self, id: usize) -> Result<Self, SelectionError> {
        self.apply(id, &EnumSelectionAction::Toggle)
    }

    /// Shorthand for [`EnumSelectionAction::SetNote`].
    pub fn set_note(&self, id: usize, text: impl Into<String>) -> Result<Self, SelectionError> {
        self.apply(id, &EnumSelectionAction::SetNote(text.into()))
    }
}
