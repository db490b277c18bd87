use shoplist_core::db::migrations::latest_version;
use shoplist_core::db::open_db_in_memory;
use shoplist_core::{ItemPatch, ItemStore, SqliteItemStore, StoreError};
use rusqlite::Connection;
use uuid::Uuid;

fn names(store: &SqliteItemStore) -> Vec<String> {
    store
        .list()
        .unwrap()
        .into_iter()
        .map(|item| item.name)
        .collect()
}

#[test]
fn create_persists_one_unchecked_item() {
    let store = SqliteItemStore::open_in_memory().unwrap();

    let created = store.create("Milk").unwrap();
    assert_eq!(created.name, "Milk");
    assert!(!created.is_checked);

    let listed = store.list().unwrap();
    assert_eq!(listed, vec![created.clone()]);
    assert_eq!(store.get(created.id).unwrap(), Some(created));
}

#[test]
fn create_trims_name_before_persisting() {
    let store = SqliteItemStore::open_in_memory().unwrap();

    store.create("  Butter \t").unwrap();
    assert_eq!(names(&store), vec!["Butter"]);
}

#[test]
fn create_rejects_empty_and_blank_names() {
    let store = SqliteItemStore::open_in_memory().unwrap();

    for blank in ["", "   ", "\n\t"] {
        let err = store.create(blank).unwrap_err();
        assert!(err.is_validation(), "unexpected error for {blank:?}: {err}");
    }
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn list_sorts_by_name_with_binary_collation() {
    let store = SqliteItemStore::open_in_memory().unwrap();

    store.create("Banana").unwrap();
    store.create("Apple").unwrap();
    store.create("apple").unwrap();
    store.create("Zucchini").unwrap();

    assert_eq!(names(&store), vec!["Apple", "Banana", "Zucchini", "apple"]);
}

#[test]
fn list_breaks_name_ties_by_creation_order() {
    let store = SqliteItemStore::open_in_memory().unwrap();

    let first = store.create("Eggs").unwrap();
    store.create("Bread").unwrap();
    let second = store.create("Eggs").unwrap();

    let ids: Vec<_> = store
        .list()
        .unwrap()
        .into_iter()
        .filter(|item| item.name == "Eggs")
        .map(|item| item.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[test]
fn update_applies_partial_changes() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let item = store.create("Milk").unwrap();

    let checked = store.update(item.id, &ItemPatch::checked(true)).unwrap();
    assert!(checked.is_checked);
    assert_eq!(checked.name, "Milk");

    let renamed = store.update(item.id, &ItemPatch::rename(" Oat milk ")).unwrap();
    assert_eq!(renamed.name, "Oat milk");
    assert!(renamed.is_checked);
    assert_eq!(renamed.created_at, item.created_at);

    assert_eq!(store.get(item.id).unwrap(), Some(renamed));
}

#[test]
fn update_with_empty_patch_returns_current_item() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let item = store.create("Rice").unwrap();

    let unchanged = store.update(item.id, &ItemPatch::default()).unwrap();
    assert_eq!(unchanged, item);
}

#[test]
fn update_blank_rename_keeps_existing_state() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let item = store.create("Milk").unwrap();

    let patch = ItemPatch {
        name: Some("  ".to_string()),
        is_checked: Some(true),
    };
    let err = store.update(item.id, &patch).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    assert_eq!(store.get(item.id).unwrap(), Some(item));
}

#[test]
fn update_unknown_id_returns_not_found() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let missing = Uuid::new_v4();

    let err = store.update(missing, &ItemPatch::checked(true)).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == missing));
}

#[test]
fn second_delete_of_same_id_returns_not_found() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let item = store.create("Cheese").unwrap();

    store.delete(item.id).unwrap();
    let err = store.delete(item.id).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == item.id));
    assert!(store.get(item.id).unwrap().is_none());
}

#[test]
fn delete_all_empties_store_for_any_size() {
    for count in [0usize, 1, 7] {
        let store = SqliteItemStore::open_in_memory().unwrap();
        for index in 0..count {
            store.create(&format!("item {index}")).unwrap();
        }

        assert_eq!(store.delete_all().unwrap(), count);
        assert!(store.list().unwrap().is_empty());
    }
}

#[test]
fn delete_many_is_all_or_nothing() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let apples = store.create("Apples").unwrap();
    let pears = store.create("Pears").unwrap();

    let err = store.delete_many(&[apples.id, Uuid::new_v4()]).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(names(&store), vec!["Apples", "Pears"]);

    let removed = store
        .delete_many(&[apples.id, pears.id, apples.id])
        .unwrap();
    assert_eq!(removed, 2);
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn rejected_write_surfaces_persistence_error_and_commits_nothing() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_inserts BEFORE INSERT ON shopping_items
         BEGIN
            SELECT RAISE(ABORT, 'storage rejected write');
         END;",
    )
    .unwrap();
    let store = SqliteItemStore::from_connection(conn).unwrap();

    let err = store.create("Milk").unwrap_err();
    assert!(err.is_persistence(), "unexpected error: {err}");
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn failed_delete_all_rolls_back_every_row() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER keep_locked BEFORE DELETE ON shopping_items
         WHEN OLD.name = 'Locked'
         BEGIN
            SELECT RAISE(ABORT, 'row is locked');
         END;",
    )
    .unwrap();
    let store = SqliteItemStore::from_connection(conn).unwrap();
    store.create("Apples").unwrap();
    store.create("Locked").unwrap();
    store.create("Zucchini").unwrap();

    let err = store.delete_all().unwrap_err();
    assert!(err.is_persistence());
    assert_eq!(names(&store), vec!["Apples", "Locked", "Zucchini"]);
}

#[test]
fn items_survive_close_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shoplist.sqlite3");

    let store = SqliteItemStore::open(&path).unwrap();
    let milk = store.create("Milk").unwrap();
    store.update(milk.id, &ItemPatch::checked(true)).unwrap();
    store.close().unwrap();

    let reopened = SqliteItemStore::open(&path).unwrap();
    let items = reopened.list().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, milk.id);
    assert!(items[0].is_checked);
}

#[test]
fn invalid_persisted_row_is_reported_not_masked() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO shopping_items (uuid, name, is_checked, created_at)
         VALUES ('not-a-uuid', 'Milk', 0, 0);",
        [],
    )
    .unwrap();
    let store = SqliteItemStore::from_connection(conn).unwrap();

    assert!(matches!(store.list(), Err(StoreError::InvalidData(_))));
}

#[test]
fn store_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteItemStore::from_connection(conn) {
        Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn store_rejects_connection_without_items_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteItemStore::from_connection(conn),
        Err(StoreError::MissingRequiredTable("shopping_items"))
    ));
}

#[test]
fn store_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE shopping_items (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            is_checked INTEGER NOT NULL DEFAULT 0
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteItemStore::from_connection(conn),
        Err(StoreError::MissingRequiredColumn {
            table: "shopping_items",
            column: "created_at"
        })
    ));
}
