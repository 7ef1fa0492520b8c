use std::collections::HashMap;

use crate::document::DocumentId;

/// Jump mode activation
///
/// A global flag provides the default for every document; a document may
/// override it locally. Changing the global flag drops all local overrides,
/// so the new value applies everywhere at once.
#[derive(Debug, Clone, Default)]
pub struct JumpMode {
    global: bool,
    overrides: HashMap<DocumentId, bool>,
}

impl JumpMode {
    pub fn new(global: bool) -> Self {
        Self {
            global,
            overrides: HashMap::new(),
        }
    }

    pub fn is_active(&self, id: DocumentId) -> bool {
        self.overrides.get(&id).copied().unwrap_or(self.global)
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn has_override(&self, id: DocumentId) -> bool {
        self.overrides.contains_key(&id)
    }

    /// Toggle the mode for one document and return the new state
    pub fn toggle_local(&mut self, id: DocumentId) -> bool {
        let active = !self.is_active(id);
        self.set_local(id, active);
        active
    }

    pub fn set_local(&mut self, id: DocumentId, active: bool) {
        self.overrides.insert(id, active);
    }

    /// Toggle the global flag and return the new state
    pub fn toggle_global(&mut self) -> bool {
        let active = !self.global;
        self.set_global(active);
        active
    }

    pub fn set_global(&mut self, active: bool) {
        self.global = active;
        self.overrides.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: DocumentId = DocumentId(1);
    const B: DocumentId = DocumentId(2);

    #[test]
    fn test_global_default_applies_to_all_documents() {
        let mode = JumpMode::new(true);
        assert!(mode.is_active(A));
        assert!(mode.is_active(B));
        assert!(!JumpMode::default().is_active(A));
    }

    #[test]
    fn test_local_toggle_affects_one_document() {
        let mut mode = JumpMode::new(true);
        assert!(!mode.toggle_local(A));

        assert!(!mode.is_active(A));
        assert!(mode.is_active(B));
        assert!(mode.has_override(A));
        assert!(mode.is_global());

        assert!(mode.toggle_local(A));
        assert!(mode.is_active(A));
    }

    #[test]
    fn test_global_toggle_clears_overrides() {
        let mut mode = JumpMode::new(true);
        mode.set_local(A, false);
        mode.set_local(B, true);

        assert!(!mode.toggle_global());
        assert!(!mode.is_active(A));
        assert!(!mode.is_active(B));
        assert!(!mode.has_override(A));

        mode.set_global(true);
        assert!(mode.is_active(A));
        assert!(mode.is_active(B));
    }
}
