use metawriter_model::EntityEdit;
use std::collections::HashSet;

/// Pending entity edits for one writer session.
///
/// Equal edits collapse to one. Iteration order is unspecified.
#[derive(Debug, Default)]
pub struct Batch {
    pending: HashSet<EntityEdit>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an edit. Returns false if an equal edit was already pending.
    pub fn add(&mut self, edit: EntityEdit) -> bool {
        self.pending.insert(edit)
    }

    pub fn contains(&self, edit: &EntityEdit) -> bool {
        self.pending.contains(edit)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityEdit> {
        self.pending.iter()
    }

    /// Removes and returns every pending edit.
    pub fn take(&mut self) -> Vec<EntityEdit> {
        self.pending.drain().collect()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
