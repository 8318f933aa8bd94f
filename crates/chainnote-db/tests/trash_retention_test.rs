//! Soft delete, restore, and the 30-day retention window.

use chainnote_db::test_fixtures::{TestDatabase, TestSchema};
use chainnote_db::{CreateNoteRequest, TagRepository, TrashFilter};

fn note(title: &str) -> CreateNoteRequest {
    CreateNoteRequest {
        title: title.to_string(),
        content: "body".to_string(),
        tags: vec!["home".to_string()],
        ..Default::default()
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_soft_delete_hides_note_until_restored() {
    let test_db = TestDatabase::new(TestSchema::MultiTenant).await;
    let db = test_db.db();
    let user = test_db.create_user("ada").await;

    let created = db.notes.create(user, note("Groceries")).await.expect("create");

    let deleted = db
        .notes
        .soft_delete(user, created.id)
        .await
        .expect("delete")
        .expect("note should exist");
    assert_eq!(deleted.id, created.id);
    assert!(!deleted.hard);

    assert!(db.notes.get(user, created.id).await.expect("get").is_none());
    assert!(db.notes.list(user, TrashFilter::Live).await.expect("list").is_empty());

    let trash = db
        .notes
        .list(user, TrashFilter::OnlyDeleted)
        .await
        .expect("trash");
    assert_eq!(trash.len(), 1);
    assert!(trash[0].is_deleted());

    // Tag counts skip trashed notes.
    let tags = db.tags.list(user).await.expect("tags");
    assert_eq!(tags[0].note_count, 0);

    let restored = db
        .notes
        .restore(user, created.id)
        .await
        .expect("restore")
        .expect("note should be restorable");
    assert!(restored.deleted_at.is_none());
    assert_eq!(restored.tags, vec!["home"]);
    assert!(db.notes.get(user, created.id).await.expect("get").is_some());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_deleting_a_trashed_note_removes_it_permanently() {
    let test_db = TestDatabase::new(TestSchema::MultiTenant).await;
    let db = test_db.db();
    let owner = test_db.create_user("ada").await;
    let other = test_db.create_user("bob").await;

    let created = db.notes.create(owner, note("Groceries")).await.expect("create");
    let first = db
        .notes
        .soft_delete(owner, created.id)
        .await
        .expect("delete")
        .expect("note should exist");
    assert!(!first.hard);

    // Someone else's trash is still out of reach.
    assert!(db
        .notes
        .soft_delete(other, created.id)
        .await
        .expect("foreign delete")
        .is_none());

    let second = db
        .notes
        .soft_delete(owner, created.id)
        .await
        .expect("delete again")
        .expect("trashed note should be purged");
    assert_eq!(second.id, created.id);
    assert!(second.hard);

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM notes WHERE note_id = $1)")
        .bind(created.id)
        .fetch_one(&test_db.pool)
        .await
        .expect("exists");
    assert!(!exists);
    assert!(db.notes.restore(owner, created.id).await.expect("restore").is_none());
    assert!(db
        .notes
        .list(owner, TrashFilter::OnlyDeleted)
        .await
        .expect("trash")
        .is_empty());

    // Nothing left to delete.
    assert!(db
        .notes
        .soft_delete(owner, created.id)
        .await
        .expect("third delete")
        .is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_include_deleted_lists_live_and_recent_trash() {
    let test_db = TestDatabase::new(TestSchema::MultiTenant).await;
    let db = test_db.db();
    let user = test_db.create_user("ada").await;

    let live = db.notes.create(user, note("Live")).await.expect("live");
    let recent = db.notes.create(user, note("Recent")).await.expect("recent");
    let expired = db.notes.create(user, note("Expired")).await.expect("expired");

    db.notes.soft_delete(user, recent.id).await.expect("delete");
    db.notes.soft_delete(user, expired.id).await.expect("delete");
    test_db.age_deleted_note("note_id", expired.id, 31).await;

    let mut ids: Vec<i64> = db
        .notes
        .list(user, TrashFilter::IncludeDeleted)
        .await
        .expect("list")
        .into_iter()
        .map(|n| n.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec![live.id, recent.id]);

    let trash = db
        .notes
        .list(user, TrashFilter::OnlyDeleted)
        .await
        .expect("trash");
    assert_eq!(trash.len(), 1);
    assert_eq!(trash[0].id, recent.id);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_restore_respects_retention_window() {
    let test_db = TestDatabase::new(TestSchema::MultiTenant).await;
    let db = test_db.db();
    let user = test_db.create_user("ada").await;

    let within = db.notes.create(user, note("29 days")).await.expect("create");
    let beyond = db.notes.create(user, note("31 days")).await.expect("create");
    db.notes.soft_delete(user, within.id).await.expect("delete");
    db.notes.soft_delete(user, beyond.id).await.expect("delete");
    test_db.age_deleted_note("note_id", within.id, 29).await;
    test_db.age_deleted_note("note_id", beyond.id, 31).await;

    assert!(db.notes.restore(user, within.id).await.expect("restore").is_some());
    assert!(db.notes.restore(user, beyond.id).await.expect("restore").is_none());

    // Expired rows are hidden, not purged.
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM notes WHERE note_id = $1)")
        .bind(beyond.id)
        .fetch_one(&test_db.pool)
        .await
        .expect("exists");
    assert!(exists);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_restore_of_live_note_is_a_miss() {
    let test_db = TestDatabase::new(TestSchema::MultiTenant).await;
    let db = test_db.db();
    let user = test_db.create_user("ada").await;

    let created = db.notes.create(user, note("Live")).await.expect("create");
    assert!(db.notes.restore(user, created.id).await.expect("restore").is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_without_trash_column_delete_is_hard() {
    let test_db = TestDatabase::new(TestSchema::MultiTenantWithoutTrash).await;
    let db = test_db.db();
    assert!(!db.profile.soft_delete);
    let user = test_db.create_user("ada").await;

    let created = db.notes.create(user, note("Groceries")).await.expect("create");
    assert!(db
        .notes
        .list(user, TrashFilter::OnlyDeleted)
        .await
        .expect("trash")
        .is_empty());
    assert_eq!(
        db.notes
            .list(user, TrashFilter::IncludeDeleted)
            .await
            .expect("all")
            .len(),
        1
    );

    let deleted = db
        .notes
        .soft_delete(user, created.id)
        .await
        .expect("delete")
        .expect("note should exist");
    assert!(deleted.hard);
    assert!(db.notes.get(user, created.id).await.expect("get").is_none());
    assert!(db.notes.restore(user, created.id).await.expect("restore").is_none());

    test_db.cleanup().await;
}
