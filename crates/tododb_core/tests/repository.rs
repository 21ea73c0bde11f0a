//! Behavior shared by every repository implementation.

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::tempdir;
use tododb_core::{InMemoryTodoRepository, KvTodoRepository, Todo, TodoRepository};
use tododb_kv::Database;

fn kv_repo() -> KvTodoRepository {
    KvTodoRepository::new(Arc::new(Database::open_in_memory().unwrap()))
}

fn implementations() -> Vec<(&'static str, Box<dyn TodoRepository>)> {
    vec![
        ("kv", Box::new(kv_repo())),
        ("memory", Box::new(InMemoryTodoRepository::new())),
    ]
}

#[test]
fn example_scenario() {
    for (name, repo) in implementations() {
        repo.create(&Todo::new("1", "Buy milk")).unwrap();
        assert_eq!(repo.get_by_id("1").unwrap(), Todo::new("1", "Buy milk"), "{name}");

        let done = Todo::new("1", "Buy milk").with_completed(true);
        repo.update(&done).unwrap();
        assert_eq!(repo.get_all().unwrap(), vec![done], "{name}");

        repo.delete("1").unwrap();
        let err = repo.get_by_id("1").unwrap_err();
        assert_eq!(err.to_string(), "todo with id 1 not found", "{name}");
    }
}

#[test]
fn empty_store_lists_nothing() {
    for (name, repo) in implementations() {
        assert!(repo.get_all().unwrap().is_empty(), "{name}");
    }
}

#[test]
fn create_rejects_existing_id_and_keeps_record() {
    for (name, repo) in implementations() {
        repo.create(&Todo::new("1", "original")).unwrap();

        let err = repo.create(&Todo::new("1", "impostor")).unwrap_err();
        assert!(err.is_invalid_input(), "{name}");
        assert_eq!(
            err.to_string(),
            "invalid input: todo with this ID already exists",
            "{name}"
        );
        assert_eq!(repo.get_by_id("1").unwrap().title, "original", "{name}");
    }
}

#[test]
fn update_and_delete_require_existence() {
    for (name, repo) in implementations() {
        let err = repo.update(&Todo::new("ghost", "x")).unwrap_err();
        assert!(err.is_not_found(), "{name}");
        assert!(repo.get_all().unwrap().is_empty(), "{name}");

        let err = repo.delete("ghost").unwrap_err();
        assert_eq!(err.to_string(), "todo with id ghost not found", "{name}");
    }
}

#[test]
fn get_all_is_in_id_byte_order() {
    for (name, repo) in implementations() {
        for id in ["b", "10", "a", "2", "1"] {
            repo.create(&Todo::new(id, format!("todo {id}"))).unwrap();
        }
        let ids: Vec<_> = repo.get_all().unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, ["1", "10", "2", "a", "b"], "{name}");
    }
}

#[test]
fn id_is_checked_before_title() {
    for (name, repo) in implementations() {
        let err = repo.create(&Todo::new(" ", " ")).unwrap_err();
        assert_eq!(err.to_string(), "invalid input: id cannot be empty", "{name}");

        let err = repo.update(&Todo::new("1", "")).unwrap_err();
        assert_eq!(err.to_string(), "invalid input: title cannot be empty", "{name}");
    }
}

#[test]
fn records_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todos.db");

    {
        let db = Arc::new(Database::open(&path).unwrap());
        let repo = KvTodoRepository::new(Arc::clone(&db));
        repo.create(&Todo::new("1", "Buy milk")).unwrap();
        repo.create(&Todo::new("2", "Walk dog")).unwrap();
        repo.update(&Todo::new("2", "Walk dog").with_completed(true))
            .unwrap();
        repo.delete("1").unwrap();
        db.close().unwrap();
    }

    let repo = KvTodoRepository::new(Arc::new(Database::open(&path).unwrap()));
    assert_eq!(
        repo.get_all().unwrap(),
        vec![Todo::new("2", "Walk dog").with_completed(true)]
    );
}

fn blank() -> impl Strategy<Value = String> {
    "[ \t\n]{0,4}"
}

fn word() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,8}"
}

proptest! {
    #[test]
    fn blank_fields_never_reach_storage(id in blank(), title in word(), other in word()) {
        let repo = kv_repo();
        let seq = repo.database().committed_seq();

        let blank_id = Todo::new(id.clone(), title.clone());
        let blank_title = Todo::new(other, id.clone());
        prop_assert!(repo.create(&blank_id).unwrap_err().is_invalid_input());
        prop_assert!(repo.create(&blank_title).unwrap_err().is_invalid_input());
        prop_assert!(repo.update(&Todo::new(id, title)).unwrap_err().is_invalid_input());
        prop_assert_eq!(repo.database().committed_seq(), seq);
    }

    #[test]
    fn get_all_returns_last_writes(
        writes in prop::collection::vec((word(), word(), any::<bool>()), 1..30)
    ) {
        let repo = kv_repo();
        let mut expected = BTreeMap::new();

        for (id, title, completed) in writes {
            let todo = Todo::new(id.clone(), title).with_completed(completed);
            if expected.contains_key(&id) {
                repo.update(&todo).unwrap();
            } else {
                repo.create(&todo).unwrap();
            }
            expected.insert(id, todo);
        }

        let expected: Vec<_> = expected.into_values().collect();
        prop_assert_eq!(repo.get_all().unwrap(), expected);
    }
}
