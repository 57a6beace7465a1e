//! Reconciliation decision table.
//!
//! Pure: given which sides moved away from the baseline, pick what to do.

/// Which fingerprints differ from the baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Local body changed
    pub local_content: bool,
    /// Local editable metadata changed
    pub local_meta: bool,
    /// Remote body changed
    pub remote_content: bool,
    /// Remote editable metadata changed
    pub remote_meta: bool,
}

impl ChangeSet {
    /// Anything changed locally.
    pub fn local_changed(&self) -> bool {
        self.local_content || self.local_meta
    }

    /// Anything changed remotely.
    pub fn remote_changed(&self) -> bool {
        self.remote_content || self.remote_meta
    }

    /// The same axis moved on both sides.
    pub fn is_conflict(&self) -> bool {
        (self.local_content && self.remote_content) || (self.local_meta && self.remote_meta)
    }

    /// Classify.
    pub fn action(&self) -> SyncAction {
        if self.is_conflict() {
            SyncAction::Conflict
        } else if self.local_changed() {
            SyncAction::Push {
                content: self.local_content,
                metadata: self.local_meta,
            }
        } else if self.remote_changed() {
            SyncAction::Pull
        } else {
            SyncAction::None
        }
    }
}

/// What to do with one post present on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Nothing moved
    None,
    /// Send local changes to the server
    Push {
        /// Include the body
        content: bool,
        /// Include the editable metadata
        metadata: bool,
    },
    /// Overwrite the local copy with the server's
    Pull,
    /// Both sides changed the same axis; leave both alone
    Conflict,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(lc: bool, lm: bool, rc: bool, rm: bool) -> ChangeSet {
        ChangeSet {
            local_content: lc,
            local_meta: lm,
            remote_content: rc,
            remote_meta: rm,
        }
    }

    #[test]
    fn test_unchanged_is_noop() {
        assert_eq!(ChangeSet::default().action(), SyncAction::None);
    }

    #[test]
    fn test_one_sided_changes() {
        assert_eq!(
            changes(true, false, false, false).action(),
            SyncAction::Push {
                content: true,
                metadata: false
            }
        );
        assert_eq!(
            changes(true, true, false, false).action(),
            SyncAction::Push {
                content: true,
                metadata: true
            }
        );
        assert_eq!(changes(false, false, false, true).action(), SyncAction::Pull);
        assert_eq!(changes(false, false, true, true).action(), SyncAction::Pull);
    }

    #[test]
    fn test_same_axis_on_both_sides_conflicts() {
        assert_eq!(changes(true, false, true, false).action(), SyncAction::Conflict);
        assert_eq!(changes(false, true, false, true).action(), SyncAction::Conflict);
        assert_eq!(changes(true, true, true, true).action(), SyncAction::Conflict);
    }

    #[test]
    fn test_crossed_axes_push_local() {
        assert_eq!(
            changes(true, false, false, true).action(),
            SyncAction::Push {
                content: true,
                metadata: false
            }
        );
        assert_eq!(
            changes(false, true, true, false).action(),
            SyncAction::Push {
                content: false,
                metadata: true
            }
        );
    }

    #[test]
    fn test_conflict_is_symmetric() {
        for bits in 0u8..16 {
            let set = changes(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0);
            let mirrored = changes(
                set.remote_content,
                set.remote_meta,
                set.local_content,
                set.local_meta,
            );
            assert_eq!(set.is_conflict(), mirrored.is_conflict(), "{set:?}");
        }
    }
}
