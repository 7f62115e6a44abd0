use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::model::{MarkerId, SubjectId};

/// An identifier generator for deterministic ids in services and tests.
///
/// Clones of a `Sequence` source share one counter, so handing a clone to the
/// editor and another to the seeding code never produces duplicates.
#[derive(Debug, Clone, Default)]
pub enum IdSource {
    #[default]
    Random,
    Sequence(Arc<SequenceState>),
}

#[derive(Debug)]
pub struct SequenceState {
    prefix: String,
    next: AtomicU64,
}

impl IdSource {
    /// Returns a source that produces random UUID v4 identifiers.
    #[must_use]
    pub fn random() -> Self {
        Self::Random
    }

    /// Returns a source producing `"{prefix}-1"`, `"{prefix}-2"`, ...
    #[must_use]
    pub fn sequence(prefix: impl Into<String>) -> Self {
        Self::Sequence(Arc::new(SequenceState {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }))
    }

    /// Returns the next raw identifier.
    #[must_use]
    pub fn next_id(&self) -> String {
        match self {
            IdSource::Random => Uuid::new_v4().to_string(),
            IdSource::Sequence(state) => {
                let n = state.next.fetch_add(1, Ordering::Relaxed);
                format!("{}-{n}", state.prefix)
            }
        }
    }

    #[must_use]
    pub fn next_subject_id(&self) -> SubjectId {
        SubjectId::new(self.next_id())
    }

    #[must_use]
    pub fn next_marker_id(&self) -> MarkerId {
        MarkerId::new(self.next_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_counts_from_one() {
        let ids = IdSource::sequence("t");
        assert_eq!(ids.next_id(), "t-1");
        assert_eq!(ids.next_id(), "t-2");
    }

    #[test]
    fn sequence_clones_share_counter() {
        let ids = IdSource::sequence("t");
        let other = ids.clone();
        assert_eq!(ids.next_id(), "t-1");
        assert_eq!(other.next_id(), "t-2");
    }

    #[test]
    fn random_ids_are_uuids() {
        let ids = IdSource::random();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
