//! The staff member the viewer is focused on.

use fieldops_core::error::AppError;
use fieldops_core::result::AppResult;
use fieldops_core::types::Identity;
use fieldops_entity::PresenceRecord;

/// At most one selected record.
///
/// The selection is a copy taken when the user tapped the entry. It is not
/// refreshed by later snapshots and survives the record leaving the
/// directory, until cleared or replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    selected: Option<PresenceRecord>,
}

impl SelectionState {
    /// Nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the entry with `identity`, replacing any previous selection.
    pub fn select(
        &mut self,
        entries: &[PresenceRecord],
        identity: &Identity,
    ) -> AppResult<&PresenceRecord> {
        let record = entries
            .iter()
            .find(|r| &r.identity == identity)
            .cloned()
            .ok_or_else(|| {
                AppError::not_found(format!("No staff member with a known position: {identity}"))
            })?;
        Ok(&*self.selected.insert(record))
    }

    /// Drop the selection.
    pub fn clear(&mut self) -> Option<PresenceRecord> {
        self.selected.take()
    }

    pub fn selected(&self) -> Option<&PresenceRecord> {
        self.selected.as_ref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.selected.as_ref().map(|r| &r.identity)
    }

    /// Whether `identity` is the selected one.
    pub fn is_selected(&self, identity: &Identity) -> bool {
        self.identity() == Some(identity)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
    }
}
