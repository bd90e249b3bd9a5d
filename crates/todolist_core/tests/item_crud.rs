use todolist_core::db::open_db_in_memory;
use todolist_core::{
    ItemService, ItemStore, ItemValidationError, RepoError, RepoResult, ServiceError,
    SqliteItemStore, TodoItem, TodoItemList,
};
use rusqlite::Connection;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn positions(list: &TodoItemList) -> Vec<(String, i64)> {
    list.items
        .iter()
        .map(|item| (item.text.clone(), item.position))
        .collect()
}

#[test]
fn txn_primitives_roundtrip() {
    let conn = setup();
    let store = SqliteItemStore::try_new(&conn).unwrap();

    let item = TodoItem::with_id("first", "write tests", 1);
    store
        .execute(|txn| -> RepoResult<()> { txn.add(&item) })
        .unwrap();

    let loaded = store
        .execute(|txn| -> RepoResult<TodoItem> { txn.get("first") })
        .unwrap();
    assert_eq!(loaded, item);

    let mut changed = loaded.clone();
    changed.text = "write more tests".to_string();
    store
        .execute(|txn| -> RepoResult<()> { txn.update(&changed) })
        .unwrap();

    let list = store
        .execute(|txn| -> RepoResult<TodoItemList> { txn.list() })
        .unwrap();
    assert_eq!(list.count, 1);
    assert_eq!(list.items[0].text, "write more tests");

    store
        .execute(|txn| -> RepoResult<()> { txn.delete("first") })
        .unwrap();
    let err = store
        .execute(|txn| -> RepoResult<TodoItem> { txn.get("first") })
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == "first"));
}

#[test]
fn txn_point_writes_on_unknown_id_return_not_found() {
    let conn = setup();
    let store = SqliteItemStore::try_new(&conn).unwrap();

    let ghost = TodoItem::with_id("ghost", "nothing", 1);
    let update_err = store
        .execute(|txn| -> RepoResult<()> { txn.update(&ghost) })
        .unwrap_err();
    assert!(matches!(update_err, RepoError::NotFound(id) if id == "ghost"));

    let delete_err = store
        .execute(|txn| -> RepoResult<()> { txn.delete("ghost") })
        .unwrap_err();
    assert!(matches!(delete_err, RepoError::NotFound(id) if id == "ghost"));
}

#[test]
fn txn_add_duplicate_id_is_rejected() {
    let conn = setup();
    let store = SqliteItemStore::try_new(&conn).unwrap();

    let item = TodoItem::with_id("same", "one", 1);
    store
        .execute(|txn| -> RepoResult<()> { txn.add(&item) })
        .unwrap();
    let err = store
        .execute(|txn| -> RepoResult<()> { txn.add(&item) })
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateId(id) if id == "same"));
}

#[test]
fn list_is_ordered_by_position() {
    let conn = setup();
    let store = SqliteItemStore::try_new(&conn).unwrap();

    store
        .execute(|txn| -> RepoResult<()> {
            txn.add(&TodoItem::with_id("z", "third", 3))?;
            txn.add(&TodoItem::with_id("y", "first", 1))?;
            txn.add(&TodoItem::with_id("x", "second", 2))
        })
        .unwrap();

    let list = store
        .execute(|txn| -> RepoResult<TodoItemList> { txn.list() })
        .unwrap();
    let ids: Vec<&str> = list.items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["y", "x", "z"]);
}

#[test]
fn failed_action_rolls_back_every_write() {
    let conn = setup();
    let store = SqliteItemStore::try_new(&conn).unwrap();

    let err = store
        .execute(|txn| -> RepoResult<()> {
            txn.add(&TodoItem::with_id("a", "kept?", 1))?;
            txn.delete("missing")
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    let list = store
        .execute(|txn| -> RepoResult<TodoItemList> { txn.list() })
        .unwrap();
    assert_eq!(list.count, 0);
}

#[test]
fn add_item_appends_at_count_plus_one() {
    let conn = setup();
    let service = ItemService::new(SqliteItemStore::try_new(&conn).unwrap());

    for expected in 1..=6 {
        let item = service.add_item(format!("item {expected}"), None).unwrap();
        assert_eq!(item.position, expected);

        let list = service.list_items().unwrap();
        assert_eq!(list.count as i64, expected);
        assert!(list.is_dense());
        assert_eq!(list.find(&item.id), Some(&item));
    }
}

#[test]
fn add_item_keeps_caller_id_and_rejects_duplicates() {
    let conn = setup();
    let service = ItemService::new(SqliteItemStore::try_new(&conn).unwrap());

    let item = service
        .add_item("groceries", Some("todo-1".to_string()))
        .unwrap();
    assert_eq!(item.id, "todo-1");

    let err = service
        .add_item("again", Some("todo-1".to_string()))
        .unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateId(id) if id == "todo-1"));
    assert_eq!(service.list_items().unwrap().count, 1);
}

#[test]
fn add_item_rejects_blank_id() {
    let conn = setup();
    let service = ItemService::new(SqliteItemStore::try_new(&conn).unwrap());

    let err = service.add_item("text", Some("  ".to_string())).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ItemValidationError::BlankId)
    ));
}

#[test]
fn get_item_unknown_id_returns_not_found() {
    let conn = setup();
    let service = ItemService::new(SqliteItemStore::try_new(&conn).unwrap());

    let err = service.get_item("nope").unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(id) if id == "nope"));
}

#[test]
fn update_item_changes_text_and_keeps_position() {
    let conn = setup();
    let service = ItemService::new(SqliteItemStore::try_new(&conn).unwrap());

    service.add_item("one", None).unwrap();
    let second = service.add_item("two", None).unwrap();

    let updated = service.update_item(&second.id, "two, revised").unwrap();
    assert_eq!(updated.position, 2);

    let loaded = service.get_item(&second.id).unwrap();
    assert_eq!(loaded.text, "two, revised");
    assert_eq!(loaded.position, 2);

    let err = service.update_item("missing", "x").unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn delete_item_redensifies_remaining_positions() {
    let conn = setup();
    let service = ItemService::new(SqliteItemStore::try_new(&conn).unwrap());

    let ids: Vec<String> = ["a", "b", "c", "d"]
        .iter()
        .map(|text| service.add_item(*text, None).unwrap().id)
        .collect();

    let removed = service.delete_item(&ids[1]).unwrap();
    assert_eq!(removed.text, "b");
    assert_eq!(removed.position, 2);

    let list = service.list_items().unwrap();
    assert!(list.find(&ids[1]).is_none());
    assert!(list.is_dense());
    assert_eq!(
        positions(&list),
        vec![
            ("a".to_string(), 1),
            ("c".to_string(), 2),
            ("d".to_string(), 3),
        ]
    );

    let next = service.add_item("e", None).unwrap();
    assert_eq!(next.position, 4);
}

#[test]
fn delete_item_unknown_id_changes_nothing() {
    let conn = setup();
    let service = ItemService::new(SqliteItemStore::try_new(&conn).unwrap());

    service.add_item("a", None).unwrap();
    let err = service.delete_item("missing").unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(id) if id == "missing"));
    assert_eq!(service.list_items().unwrap().count, 1);
}
