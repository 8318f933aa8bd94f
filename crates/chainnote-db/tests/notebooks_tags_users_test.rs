//! Notebook, tag, and user repositories.

use chainnote_db::test_fixtures::{TestDatabase, TestSchema};
use chainnote_db::{
    CreateNoteRequest, CreateUserRequest, Error, LinkWalletRequest,
    NotebookRepository, TagRepository, UserRepository, WalletNetwork,
};

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_notebook_crud_is_owner_scoped() {
    let test_db = TestDatabase::new(TestSchema::MultiTenant).await;
    let db = test_db.db();
    let owner = test_db.create_user("ada").await;
    let other = test_db.create_user("mallory").await;

    let work = db.notebooks.create(owner, "  Work ").await.expect("create");
    assert_eq!(work.name, "Work");
    db.notebooks.create(owner, "Home").await.expect("create");

    let names: Vec<String> = db
        .notebooks
        .list(owner)
        .await
        .expect("list")
        .into_iter()
        .map(|n| n.name)
        .collect();
    assert_eq!(names, vec!["Home", "Work"]);

    assert!(db.notebooks.get(other, work.id).await.expect("get").is_none());
    assert!(db
        .notebooks
        .rename(other, work.id, "Stolen")
        .await
        .expect("rename")
        .is_none());

    let renamed = db
        .notebooks
        .rename(owner, work.id, "Office")
        .await
        .expect("rename")
        .expect("owned");
    assert_eq!(renamed.name, "Office");

    assert!(matches!(
        db.notebooks.create(owner, "   ").await,
        Err(Error::InvalidInput(_))
    ));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_deleting_notebook_keeps_its_notes() {
    let test_db = TestDatabase::new(TestSchema::MultiTenant).await;
    let db = test_db.db();
    let user = test_db.create_user("ada").await;

    let notebook = db.notebooks.create(user, "Home").await.expect("notebook");
    let note = db
        .notes
        .create(
            user,
            CreateNoteRequest {
                title: "Groceries".to_string(),
                content: "milk".to_string(),
                notebook_id: Some(notebook.id),
                ..Default::default()
            },
        )
        .await
        .expect("note");
    assert_eq!(note.notebook_id, Some(notebook.id));

    let removed = db
        .notebooks
        .delete(user, notebook.id)
        .await
        .expect("delete")
        .expect("owned");
    assert_eq!(removed.id, notebook.id);

    let note = db.notes.get(user, note.id).await.expect("get").expect("kept");
    assert!(note.notebook_id.is_none());
    assert!(note.notebook_name.is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_tag_create_is_idempotent_and_rename_conflicts() {
    let test_db = TestDatabase::new(TestSchema::MultiTenant).await;
    let db = test_db.db();
    let user = test_db.create_user("ada").await;

    let first = db.tags.create(user, "home").await.expect("create");
    let again = db.tags.create(user, " home ").await.expect("create");
    assert_eq!(first.id, again.id);

    let work = db.tags.create(user, "work").await.expect("create");
    assert!(matches!(
        db.tags.rename(user, work.id, "home").await,
        Err(Error::Conflict(_))
    ));

    let renamed = db
        .tags
        .rename(user, work.id, "office")
        .await
        .expect("rename")
        .expect("owned");
    assert_eq!(renamed.name, "office");

    let removed = db.tags.delete(user, first.id).await.expect("delete");
    assert_eq!(removed.map(|t| t.name), Some("home".to_string()));
    assert!(db.tags.delete(user, first.id).await.expect("delete").is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_set_for_note_reconciles() {
    let test_db = TestDatabase::new(TestSchema::MultiTenant).await;
    let db = test_db.db();
    let user = test_db.create_user("ada").await;

    let note = db
        .notes
        .create(
            user,
            CreateNoteRequest {
                title: "Groceries".to_string(),
                content: "milk".to_string(),
                tags: vec!["home".to_string(), "errands".to_string()],
                ..Default::default()
            },
        )
        .await
        .expect("note");

    db.tags
        .set_for_note(
            user,
            note.id,
            &[" weekly ".to_string(), "".to_string(), "home".to_string()],
        )
        .await
        .expect("set");
    assert_eq!(
        db.tags.tags_for_note(user, note.id).await.expect("tags"),
        vec!["home", "weekly"]
    );

    // Deleting a tag only unlinks it.
    let weekly = db
        .tags
        .list(user)
        .await
        .expect("list")
        .into_iter()
        .find(|t| t.name == "weekly")
        .expect("weekly");
    db.tags.delete(user, weekly.id).await.expect("delete");
    assert_eq!(
        db.tags.tags_for_note(user, note.id).await.expect("tags"),
        vec!["home"]
    );

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_tag_cap_keeps_first_fifty() {
    let test_db = TestDatabase::new(TestSchema::MultiTenant).await;
    let db = test_db.db();
    let user = test_db.create_user("ada").await;

    let tags: Vec<String> = (0..60).map(|i| format!("t{:02}", i)).collect();
    let note = db
        .notes
        .create(
            user,
            CreateNoteRequest {
                title: "Many".to_string(),
                content: "tags".to_string(),
                tags,
                ..Default::default()
            },
        )
        .await
        .expect("note");

    assert_eq!(note.tags.len(), 50);
    assert!(note.tags.contains(&"t49".to_string()));
    assert!(!note.tags.contains(&"t50".to_string()));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_registration_and_wallet_link() {
    let test_db = TestDatabase::new(TestSchema::MultiTenant).await;
    let db = test_db.db();

    let user = db
        .users
        .create(CreateUserRequest {
            username: "ada".to_string(),
            email: "Ada@Example.test".to_string(),
            password_hash: "$argon2id$stub".to_string(),
        })
        .await
        .expect("create");
    assert_eq!(user.email, "ada@example.test");
    assert!(user.wallet.is_none());

    let duplicate = db
        .users
        .create(CreateUserRequest {
            username: "ada2".to_string(),
            email: "ada@example.test".to_string(),
            password_hash: "x".to_string(),
        })
        .await;
    assert!(matches!(duplicate, Err(Error::Conflict(_))));

    let found = db
        .users
        .find_by_email(" ADA@example.test")
        .await
        .expect("find")
        .expect("registered");
    assert_eq!(found.id, user.id);

    let bad = db
        .users
        .link_wallet(
            user.id,
            LinkWalletRequest {
                address: "addr_test1qpzry9x8gf2tvdw0s3jn54khce6mua7l".to_string(),
                label: None,
                network: WalletNetwork::Mainnet,
            },
        )
        .await;
    assert!(matches!(bad, Err(Error::InvalidInput(_))));

    let linked = db
        .users
        .link_wallet(
            user.id,
            LinkWalletRequest {
                address: "addr_test1qpzry9x8gf2tvdw0s3jn54khce6mua7l".to_string(),
                label: Some("Nami".to_string()),
                network: WalletNetwork::Preprod,
            },
        )
        .await
        .expect("link")
        .expect("user exists");
    let wallet = linked.wallet.expect("wallet linked");
    assert_eq!(wallet.network, WalletNetwork::Preprod);
    assert_eq!(wallet.label.as_deref(), Some("Nami"));

    let unlinked = db
        .users
        .unlink_wallet(user.id)
        .await
        .expect("unlink")
        .expect("user exists");
    assert!(unlinked.wallet.is_none());

    assert!(db.users.get(-1).await.expect("get").is_none());

    test_db.cleanup().await;
}
