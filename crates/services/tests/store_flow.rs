use services::{AddTimeOutcome, AppServices, IdSource, LoadSource, RemoveOutcome, UpsertKind};
use storage::keys::{CORRUPT_SUBJECTS_KEY, SUBJECTS_KEY};
use storage::repository::{KeyValueStore, Storage};
use valley_core::editor::{MarkerDraft, SubjectDraft};
use valley_core::model::Theme;

#[tokio::test]
async fn create_log_time_and_reload_from_sqlite() {
    let storage = Storage::sqlite("sqlite:file:memdb_store_flow?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");

    let app = AppServices::from_storage(&storage, IdSource::sequence("flow"), Theme::Light)
        .await
        .expect("first open");
    assert_eq!(app.load_report().source, LoadSource::Seeded);
    let store = app.subjects();
    assert_eq!(store.len().unwrap(), 3);

    let mut draft = SubjectDraft::blank();
    draft.name = "Chess".into();
    draft.target_hours = 50.0;
    draft.level_markers = vec![
        MarkerDraft::new("Openings", 10.0),
        MarkerDraft::new("Endgames", 30.0),
    ];
    let created = store.submit(draft).await.expect("create chess");
    assert_eq!(created.kind, UpsertKind::Created);
    assert!(created.persistence.is_saved());
    let chess_id = created.subject.id().clone();

    match store.add_time(&chess_id, 12.5).await.unwrap() {
        AddTimeOutcome::Updated { total_hours, .. } => {
            assert!((total_hours - 12.5).abs() < f64::EPSILON);
        }
        other => panic!("expected update, got {other:?}"),
    }

    let reopened = AppServices::from_storage(&storage, IdSource::sequence("other"), Theme::Light)
        .await
        .expect("second open");
    assert_eq!(reopened.load_report().source, LoadSource::Persisted);
    let subjects = reopened.subjects().subjects().unwrap();
    assert_eq!(subjects.len(), 4);
    let chess = subjects.last().unwrap();
    assert_eq!(chess.name(), "Chess");
    assert_eq!(chess.reached_markers().count(), 1);
    assert_eq!(chess.next_marker().map(|m| m.label()), Some("Endgames"));

    let outcome = reopened.subjects().remove(&chess_id).await.unwrap();
    assert!(matches!(outcome, RemoveOutcome::Removed(p) if p.is_saved()));
    assert_eq!(reopened.subjects().len().unwrap(), 3);
}

#[tokio::test]
async fn corrupt_collection_is_quarantined_and_reseeded() {
    let storage = Storage::sqlite("sqlite:file:memdb_store_corrupt?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    storage.kv.set(SUBJECTS_KEY, "[{\"id\":").await.unwrap();

    let app = AppServices::from_storage(&storage, IdSource::sequence("c"), Theme::Dark)
        .await
        .expect("open");
    assert!(matches!(app.load_report().source, LoadSource::Recovered { .. }));
    assert_eq!(app.subjects().len().unwrap(), 3);
    assert_eq!(
        storage.kv.get(CORRUPT_SUBJECTS_KEY).await.unwrap().as_deref(),
        Some("[{\"id\":")
    );
    assert_eq!(app.theme().load().await.unwrap(), Theme::Dark);
}
