use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, info, warn};
use storage::repository::{KeyValueStore, StoredCollection, SubjectRepository};
use valley_core::editor::{SubjectDraft, SubjectEditor};
use valley_core::model::{StudySubject, SubjectId};

use crate::error::StoreError;
use crate::seed::seed_subjects;

/// Whether a mutation reached durable storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    Saved,
    /// The write failed; the in-memory collection still holds the change.
    Failed(String),
}

impl Persistence {
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Persistence::Saved)
    }
}

/// Where the collection came from on `load`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    Persisted,
    /// Nothing was stored; the seed set was installed.
    Seeded,
    /// The stored value was unreadable; the seed set replaced it.
    Recovered { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub source: LoadSource,
    pub subjects: Vec<StudySubject>,
    /// `None` when loading did not need to write anything.
    pub persistence: Option<Persistence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertKind {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    pub subject: StudySubject,
    pub kind: UpsertKind,
    pub persistence: Persistence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    NonPositiveHours,
    UnknownSubject,
}

/// Result of `add_time`. Ignored calls leave memory and storage untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum AddTimeOutcome {
    Updated {
        total_hours: f64,
        /// Hours actually credited after clamping at the target.
        added: f64,
        persistence: Persistence,
    },
    Ignored(IgnoredReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(Persistence),
    NotFound,
}

/// Authoritative in-memory subject collection with a persisted mirror.
///
/// Every mutation updates memory first and then writes the whole collection
/// under one key. Assumes a single logical writer: two concurrent mutations
/// may persist their snapshots out of order.
pub struct SubjectStore {
    editor: SubjectEditor,
    kv: Arc<dyn KeyValueStore>,
    subjects: Mutex<Vec<StudySubject>>,
}

impl SubjectStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, editor: SubjectEditor) -> Self {
        Self {
            editor,
            kv,
            subjects: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<StudySubject>>, StoreError> {
        self.subjects.lock().map_err(|_| StoreError::Poisoned)
    }

    async fn persist(&self, snapshot: &[StudySubject]) -> Persistence {
        match self.kv.save_subjects(snapshot).await {
            Ok(()) => Persistence::Saved,
            Err(err) => {
                warn!(
                    "failed to persist {} subjects; keeping in-memory state: {err}",
                    snapshot.len()
                );
                Persistence::Failed(err.to_string())
            }
        }
    }

    /// Read the persisted collection, seeding it on first launch.
    ///
    /// An unreadable stored value is copied aside, replaced with the seed set
    /// and reported as `LoadSource::Recovered`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the backend cannot be read.
    pub async fn load(&self) -> Result<LoadReport, StoreError> {
        let (subjects, source) = match self.kv.load_subjects().await? {
            StoredCollection::Loaded(subjects) => {
                info!("loaded {} subjects from storage", subjects.len());
                (subjects, LoadSource::Persisted)
            }
            StoredCollection::Missing => {
                info!("no stored subjects; installing seed set");
                (seed_subjects(&self.editor)?, LoadSource::Seeded)
            }
            StoredCollection::Malformed { raw, reason } => {
                error!(
                    "stored subject collection is unreadable ({reason}); falling back to seed set"
                );
                if let Err(err) = self.kv.quarantine_subjects(&raw).await {
                    warn!("could not keep a copy of the unreadable collection: {err}");
                }
                (seed_subjects(&self.editor)?, LoadSource::Recovered { reason })
            }
        };

        {
            let mut guard = self.lock()?;
            *guard = subjects.clone();
        }

        let persistence = match source {
            LoadSource::Persisted => None,
            LoadSource::Seeded | LoadSource::Recovered { .. } => {
                Some(self.persist(&subjects).await)
            }
        };

        Ok(LoadReport {
            source,
            subjects,
            persistence,
        })
    }

    /// Snapshot of the collection in display order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the collection lock is poisoned.
    pub fn subjects(&self) -> Result<Vec<StudySubject>, StoreError> {
        Ok(self.lock()?.clone())
    }

    /// Look up a subject by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the collection lock is poisoned.
    pub fn get(&self, id: &SubjectId) -> Result<Option<StudySubject>, StoreError> {
        Ok(self.lock()?.iter().find(|s| s.id() == id).cloned())
    }

    /// Number of subjects in the collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the collection lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the collection lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    /// Replace the subject with the same id in place, or append it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the collection lock is poisoned.
    /// Persistence failures are reported in the outcome instead.
    pub async fn upsert(&self, subject: StudySubject) -> Result<UpsertOutcome, StoreError> {
        let (snapshot, kind) = {
            let mut guard = self.lock()?;
            let kind = match guard.iter().position(|s| s.id() == subject.id()) {
                Some(index) => {
                    guard[index] = subject.clone();
                    UpsertKind::Updated
                }
                None => {
                    guard.push(subject.clone());
                    UpsertKind::Created
                }
            };
            (guard.clone(), kind)
        };

        debug!("{kind:?} subject {}", subject.id());
        let persistence = self.persist(&snapshot).await;
        Ok(UpsertOutcome {
            subject,
            kind,
            persistence,
        })
    }

    /// Validate a draft and upsert the result.
    ///
    /// When the draft targets an existing subject and carries no total, the
    /// stored total is kept.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` if the draft is rejected; the
    /// collection is not touched in that case.
    pub async fn submit(&self, mut draft: SubjectDraft) -> Result<UpsertOutcome, StoreError> {
        if draft.total_hours.is_none() {
            if let Some(id) = draft.id.as_ref() {
                draft.total_hours = self.get(id)?.map(|s| s.total_hours());
            }
        }
        let subject = self.editor.submit(draft)?;
        self.upsert(subject).await
    }

    /// Credit study time to a subject, clamping the total at its target.
    ///
    /// Non-positive (or non-finite) hours and unknown ids are silent no-ops,
    /// reported as `AddTimeOutcome::Ignored`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the collection lock is poisoned.
    pub async fn add_time(
        &self,
        subject_id: &SubjectId,
        hours: f64,
    ) -> Result<AddTimeOutcome, StoreError> {
        if !hours.is_finite() || hours <= 0.0 {
            debug!("ignoring add_time of {hours}h for {subject_id}");
            return Ok(AddTimeOutcome::Ignored(IgnoredReason::NonPositiveHours));
        }

        let (snapshot, total_hours, added) = {
            let mut guard = self.lock()?;
            let Some(subject) = guard.iter_mut().find(|s| s.id() == subject_id) else {
                debug!("ignoring add_time for unknown subject {subject_id}");
                return Ok(AddTimeOutcome::Ignored(IgnoredReason::UnknownSubject));
            };
            let added = subject.log_hours(hours);
            let total_hours = subject.total_hours();
            (guard.clone(), total_hours, added)
        };

        let persistence = self.persist(&snapshot).await;
        Ok(AddTimeOutcome::Updated {
            total_hours,
            added,
            persistence,
        })
    }

    /// Remove a subject from the collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the collection lock is poisoned.
    pub async fn remove(&self, subject_id: &SubjectId) -> Result<RemoveOutcome, StoreError> {
        let snapshot = {
            let mut guard = self.lock()?;
            let Some(index) = guard.iter().position(|s| s.id() == subject_id) else {
                return Ok(RemoveOutcome::NotFound);
            };
            guard.remove(index);
            guard.clone()
        };

        info!("removed subject {subject_id}");
        Ok(RemoveOutcome::Removed(self.persist(&snapshot).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use storage::keys::{CORRUPT_SUBJECTS_KEY, SUBJECTS_KEY};
    use storage::repository::{InMemoryStore, StorageError};
    use valley_core::IdSource;
    use valley_core::editor::{EditorError, MarkerDraft};

    use crate::seed::seed_drafts;

    /// Reads from an in-memory map but refuses every write.
    struct ReadOnlyStore(InMemoryStore);

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key).await
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("quota exceeded".into()))
        }

        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("quota exceeded".into()))
        }
    }

    fn store_over(kv: Arc<dyn KeyValueStore>) -> SubjectStore {
        SubjectStore::new(kv, SubjectEditor::new(IdSource::sequence("id")))
    }

    async fn seeded() -> (SubjectStore, InMemoryStore) {
        let kv = InMemoryStore::new();
        let store = store_over(Arc::new(kv.clone()));
        store.load().await.unwrap();
        (store, kv)
    }

    fn draft(name: &str, target: f64, markers: Vec<MarkerDraft>) -> SubjectDraft {
        SubjectDraft {
            name: name.into(),
            target_hours: target,
            level_markers: markers,
            ..SubjectDraft::blank()
        }
    }

    #[tokio::test]
    async fn first_load_installs_exact_seed_set() {
        let kv = InMemoryStore::new();
        let store = store_over(Arc::new(kv.clone()));
        let report = store.load().await.unwrap();

        let expected = seed_subjects(&SubjectEditor::new(IdSource::sequence("id"))).unwrap();
        assert_eq!(report.source, LoadSource::Seeded);
        assert_eq!(report.subjects, expected);
        assert_eq!(store.subjects().unwrap(), expected);
        assert_eq!(report.persistence, Some(Persistence::Saved));
        assert!(kv.get(SUBJECTS_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn persisted_collection_survives_reload() {
        let (store, kv) = seeded().await;
        store
            .submit(draft("Chess", 30.0, vec![MarkerDraft::new("Openings", 10.0)]))
            .await
            .unwrap();
        let guitar = store.subjects().unwrap()[2].id().clone();
        store.add_time(&guitar, 1.5).await.unwrap();

        let reopened = store_over(Arc::new(kv));
        let report = reopened.load().await.unwrap();
        assert_eq!(report.source, LoadSource::Persisted);
        assert_eq!(report.persistence, None);
        assert_eq!(report.subjects, store.subjects().unwrap());
    }

    #[tokio::test]
    async fn upsert_replaces_in_place_or_appends() {
        let (store, _kv) = seeded().await;
        let before = store.subjects().unwrap();

        let mut edit = SubjectDraft::from_subject(&before[1]);
        edit.name = "Drawing".into();
        let outcome = store.submit(edit).await.unwrap();
        assert_eq!(outcome.kind, UpsertKind::Updated);
        assert!(outcome.persistence.is_saved());

        let after = store.subjects().unwrap();
        assert_eq!(after.len(), before.len());
        assert_eq!(after[1].name(), "Drawing");
        assert_eq!(after[1].id(), before[1].id());
        let ids_before: Vec<&SubjectId> = before.iter().map(StudySubject::id).collect();
        let ids_after: Vec<&SubjectId> = after.iter().map(StudySubject::id).collect();
        assert_eq!(ids_before, ids_after);

        let outcome = store.submit(draft("Chess", 30.0, vec![])).await.unwrap();
        assert_eq!(outcome.kind, UpsertKind::Created);
        let appended = store.subjects().unwrap();
        assert_eq!(appended.len(), before.len() + 1);
        assert_eq!(appended.last().map(StudySubject::name), Some("Chess"));
        assert!(appended.last().unwrap().total_hours().abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn edit_without_total_keeps_stored_total() {
        let (store, _kv) = seeded().await;
        let programming = store.subjects().unwrap()[0].clone();

        let mut edit = SubjectDraft::from_subject(&programming);
        edit.total_hours = None;
        edit.target_hours = 300.0;
        let outcome = store.submit(edit).await.unwrap();

        assert!((outcome.subject.total_hours() - 25.0).abs() < f64::EPSILON);
        assert!((outcome.subject.target_hours() - 300.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn add_time_clamps_at_target() {
        let (store, _kv) = seeded().await;
        let created = store
            .submit(SubjectDraft {
                total_hours: Some(90.0),
                ..draft("Clamp", 100.0, vec![])
            })
            .await
            .unwrap();
        let id = created.subject.id().clone();

        let outcome = store.add_time(&id, 20.0).await.unwrap();
        assert_eq!(
            outcome,
            AddTimeOutcome::Updated {
                total_hours: 100.0,
                added: 10.0,
                persistence: Persistence::Saved,
            }
        );

        for _ in 0..3 {
            store.add_time(&id, 5.0).await.unwrap();
        }
        let total = store.get(&id).unwrap().unwrap().total_hours();
        assert!((total - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn add_time_ignores_non_positive_hours_and_unknown_ids() {
        let (store, kv) = seeded().await;
        let id = store.subjects().unwrap()[0].id().clone();
        let before = store.subjects().unwrap();
        let raw_before = kv.get(SUBJECTS_KEY).await.unwrap();

        for hours in [0.0, -1.0, f64::NAN] {
            assert_eq!(
                store.add_time(&id, hours).await.unwrap(),
                AddTimeOutcome::Ignored(IgnoredReason::NonPositiveHours)
            );
        }
        assert_eq!(
            store.add_time(&SubjectId::new("nope"), 1.0).await.unwrap(),
            AddTimeOutcome::Ignored(IgnoredReason::UnknownSubject)
        );

        assert_eq!(store.subjects().unwrap(), before);
        assert_eq!(kv.get(SUBJECTS_KEY).await.unwrap(), raw_before);
    }

    #[tokio::test]
    async fn marker_beyond_target_is_rejected_without_mutation() {
        let (store, kv) = seeded().await;
        let before = store.subjects().unwrap();
        let raw_before = kv.get(SUBJECTS_KEY).await.unwrap();

        let err = store
            .submit(draft("Overshoot", 50.0, vec![MarkerDraft::new("X", 60.0)]))
            .await
            .unwrap_err();
        let err = match err {
            StoreError::Validation(err) => err,
            other => panic!("expected validation error, got {other:?}"),
        };
        assert!(matches!(err, EditorError::MarkerExceedsTarget { .. }));
        let message = err.to_string();
        assert!(message.contains("\"X\""));
        assert!(message.contains("60h"));
        assert!(message.contains("50h"));

        assert_eq!(store.subjects().unwrap(), before);
        assert_eq!(kv.get(SUBJECTS_KEY).await.unwrap(), raw_before);
    }

    #[tokio::test]
    async fn duplicate_marker_labels_are_rejected_without_mutation() {
        let (store, _kv) = seeded().await;
        let err = store
            .submit(draft(
                "Dupes",
                100.0,
                vec![
                    MarkerDraft::new("Basic", 10.0),
                    MarkerDraft::new("basic", 20.0),
                ],
            ))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must be unique"));
        assert_eq!(store.len().unwrap(), seed_drafts().len());
    }

    #[tokio::test]
    async fn remove_drops_subject_and_persists() {
        let (store, kv) = seeded().await;
        let id = store.subjects().unwrap()[0].id().clone();

        let outcome = store.remove(&id).await.unwrap();
        assert_eq!(outcome, RemoveOutcome::Removed(Persistence::Saved));
        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.remove(&id).await.unwrap(), RemoveOutcome::NotFound);

        let reopened = store_over(Arc::new(kv));
        let report = reopened.load().await.unwrap();
        assert_eq!(report.subjects.len(), 2);
        assert!(report.subjects.iter().all(|s| s.id() != &id));
    }

    #[tokio::test]
    async fn malformed_storage_recovers_to_seed_and_keeps_raw_copy() {
        let kv = InMemoryStore::new();
        kv.set(SUBJECTS_KEY, r#"[{"id":"a"}]"#).await.unwrap();

        let store = store_over(Arc::new(kv.clone()));
        let report = store.load().await.unwrap();

        assert!(matches!(report.source, LoadSource::Recovered { .. }));
        assert_eq!(report.subjects.len(), 3);
        assert_eq!(
            kv.get(CORRUPT_SUBJECTS_KEY).await.unwrap().as_deref(),
            Some(r#"[{"id":"a"}]"#)
        );
        let reloaded = store_over(Arc::new(kv)).load().await.unwrap();
        assert_eq!(reloaded.source, LoadSource::Persisted);
    }

    #[tokio::test]
    async fn failed_writes_keep_in_memory_state() {
        let store = store_over(Arc::new(ReadOnlyStore(InMemoryStore::new())));
        let report = store.load().await.unwrap();
        assert!(matches!(report.persistence, Some(Persistence::Failed(_))));

        let id = store.subjects().unwrap()[2].id().clone();
        let outcome = store.add_time(&id, 1.0).await.unwrap();
        match outcome {
            AddTimeOutcome::Updated {
                total_hours,
                persistence,
                ..
            } => {
                assert!((total_hours - 6.0).abs() < f64::EPSILON);
                assert_eq!(
                    persistence,
                    Persistence::Failed("connection error: quota exceeded".into())
                );
            }
            other => panic!("expected update, got {other:?}"),
        }
        let total = store.get(&id).unwrap().unwrap().total_hours();
        assert!((total - 6.0).abs() < f64::EPSILON);
    }
}
