//! Repository integration tests against a live PostgreSQL instance.
//!
//! Run with `cargo test -- --ignored` once a test database is available
//! (see `test_fixtures::DEFAULT_TEST_DATABASE_URL`).

use carnet_db::test_fixtures::TestDatabase;
use carnet_db::{
    CategoryRepository, CreateCategoryRequest, CreateNoteRequest, Error, ListNotesRequest,
    NoteRepository, UpdateCategoryRequest, UpdateNoteRequest,
};
use uuid::Uuid;

fn note_req(title: &str) -> CreateNoteRequest {
    CreateNoteRequest {
        title: title.to_string(),
        content: "content".to_string(),
    }
}

fn category_req(name: &str) -> CreateCategoryRequest {
    CreateCategoryRequest {
        name: name.to_string(),
        color: Some("#FF5733".to_string()),
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL test database"]
async fn duplicate_category_name_is_a_conflict() {
    let test_db = TestDatabase::new().await;
    test_db.cleanup().await;
    let db = &test_db.db;

    db.categories.insert(category_req("Work")).await.unwrap();
    let err = db.categories.insert(category_req("Work")).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateCategoryName(name) if name == "Work"));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL test database"]
async fn rename_to_taken_name_is_a_conflict() {
    let test_db = TestDatabase::new().await;
    test_db.cleanup().await;
    let db = &test_db.db;

    db.categories.insert(category_req("Work")).await.unwrap();
    let personal = db.categories.insert(category_req("Personal")).await.unwrap();

    let err = db
        .categories
        .update(
            personal.id,
            UpdateCategoryRequest {
                name: Some("Work".to_string()),
                color: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateCategoryName(_)));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL test database"]
async fn adding_same_category_twice_is_idempotent() {
    let test_db = TestDatabase::new().await;
    test_db.cleanup().await;
    let db = &test_db.db;

    let note = db.notes.insert(note_req("T")).await.unwrap();
    let cat = db.categories.insert(category_req("Work")).await.unwrap();

    db.notes.add_category(note.id, cat.id).await.unwrap();
    let after = db
        .notes
        .add_category(note.id, cat.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(after.categories.len(), 1);
    assert_eq!(after.categories[0].name, "Work");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL test database"]
async fn removing_absent_category_is_a_no_op() {
    let test_db = TestDatabase::new().await;
    test_db.cleanup().await;
    let db = &test_db.db;

    let note = db.notes.insert(note_req("T")).await.unwrap();
    let cat = db.categories.insert(category_req("Work")).await.unwrap();

    let after = db
        .notes
        .remove_category(note.id, cat.id)
        .await
        .unwrap()
        .unwrap();
    assert!(after.categories.is_empty());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL test database"]
async fn deleting_category_cascades_membership_not_notes() {
    let test_db = TestDatabase::new().await;
    test_db.cleanup().await;
    let db = &test_db.db;

    let note = db.notes.insert(note_req("T")).await.unwrap();
    let cat = db.categories.insert(category_req("Work")).await.unwrap();
    db.notes.add_category(note.id, cat.id).await.unwrap();

    assert!(db.categories.delete(cat.id).await.unwrap());

    let after = db.notes.fetch(note.id).await.unwrap().unwrap();
    assert!(after.categories.is_empty());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL test database"]
async fn deleting_note_leaves_other_memberships_alone() {
    let test_db = TestDatabase::new().await;
    test_db.cleanup().await;
    let db = &test_db.db;

    let a = db.notes.insert(note_req("A")).await.unwrap();
    let b = db.notes.insert(note_req("B")).await.unwrap();
    let cat = db.categories.insert(category_req("Work")).await.unwrap();
    db.notes.add_category(a.id, cat.id).await.unwrap();
    db.notes.add_category(b.id, cat.id).await.unwrap();

    assert!(db.notes.delete(a.id).await.unwrap());

    let b_after = db.notes.fetch(b.id).await.unwrap().unwrap();
    assert_eq!(b_after.categories.len(), 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL test database"]
async fn archive_filter_controls_visibility() {
    let test_db = TestDatabase::new().await;
    test_db.cleanup().await;
    let db = &test_db.db;

    let note = db.notes.insert(note_req("T")).await.unwrap();
    db.notes.set_archived(note.id, true).await.unwrap();

    let archived = db
        .notes
        .list(ListNotesRequest {
            archived: Some(true),
            category_id: None,
        })
        .await
        .unwrap();
    assert!(archived.iter().any(|n| n.id == note.id));

    let active = db
        .notes
        .list(ListNotesRequest {
            archived: Some(false),
            category_id: None,
        })
        .await
        .unwrap();
    assert!(!active.iter().any(|n| n.id == note.id));

    let all = db.notes.list(ListNotesRequest::default()).await.unwrap();
    assert!(all.iter().any(|n| n.id == note.id));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL test database"]
async fn list_filters_by_category_and_orders_newest_first() {
    let test_db = TestDatabase::new().await;
    test_db.cleanup().await;
    let db = &test_db.db;

    let first = db.notes.insert(note_req("first")).await.unwrap();
    let second = db.notes.insert(note_req("second")).await.unwrap();
    let cat = db.categories.insert(category_req("Work")).await.unwrap();
    db.notes.add_category(second.id, cat.id).await.unwrap();

    let all = db.notes.list(ListNotesRequest::default()).await.unwrap();
    let positions: Vec<Uuid> = all.iter().map(|n| n.id).collect();
    assert!(
        positions.iter().position(|id| *id == second.id)
            < positions.iter().position(|id| *id == first.id),
        "newest note should come first"
    );

    let filtered = db
        .notes
        .list(ListNotesRequest {
            archived: None,
            category_id: Some(cat.id),
        })
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, second.id);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL test database"]
async fn mutations_re_stamp_updated_at() {
    let test_db = TestDatabase::new().await;
    test_db.cleanup().await;
    let db = &test_db.db;

    let note = db.notes.insert(note_req("T")).await.unwrap();
    assert!(note.updated_at_utc >= note.created_at_utc);

    let updated = db
        .notes
        .update(
            note.id,
            UpdateNoteRequest {
                title: Some("T2".to_string()),
                content: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert!(updated.updated_at_utc >= note.updated_at_utc);
    assert_eq!(updated.title, "T2");
    assert_eq!(updated.content, "content");

    let archived = db.notes.set_archived(note.id, true).await.unwrap().unwrap();
    assert!(archived.updated_at_utc >= updated.updated_at_utc);
    assert!(archived.archived);

    // Archiving an already-archived note still succeeds and re-stamps.
    let again = db.notes.set_archived(note.id, true).await.unwrap().unwrap();
    assert!(again.updated_at_utc >= archived.updated_at_utc);

    // Membership changes leave updated_at_utc alone.
    let cat = db.categories.insert(category_req("Stamp")).await.unwrap();
    let attached = db
        .notes
        .add_category(note.id, cat.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(attached.updated_at_utc, again.updated_at_utc);

    let detached = db
        .notes
        .remove_category(note.id, cat.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detached.updated_at_utc, again.updated_at_utc);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL test database"]
async fn absent_ids_surface_as_sentinels() {
    let test_db = TestDatabase::new().await;
    test_db.cleanup().await;
    let db = &test_db.db;

    let missing = Uuid::now_v7();
    assert!(db.notes.fetch(missing).await.unwrap().is_none());
    assert!(!db.notes.delete(missing).await.unwrap());
    assert!(db
        .notes
        .update(missing, UpdateNoteRequest::default())
        .await
        .unwrap()
        .is_none());
    assert!(db.notes.set_archived(missing, true).await.unwrap().is_none());
    assert!(db.categories.fetch(missing).await.unwrap().is_none());
    assert!(!db.categories.delete(missing).await.unwrap());

    test_db.cleanup().await;
}
