//! Check-then-act under contention.

use std::sync::{Arc, Barrier};
use std::thread;
use tododb_core::{InMemoryTodoRepository, KvTodoRepository, Todo, TodoRepository};
use tododb_kv::Database;

fn race_creates(repo: Arc<dyn TodoRepository>, threads: usize) -> (usize, usize) {
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let repo = Arc::clone(&repo);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                repo.create(&Todo::new("shared", format!("from thread {i}")))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = results.iter().filter(|r| r.is_ok()).count();
    let invalid = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.is_invalid_input()))
        .count();
    (wins, invalid)
}

#[test]
fn concurrent_creates_of_one_id_have_one_winner() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let repo = Arc::new(KvTodoRepository::new(Arc::clone(&db)));

    let (wins, invalid) = race_creates(repo, 16);
    assert_eq!(wins, 1);
    assert_eq!(invalid, 15);

    let pairs = db.view(|txn| txn.scan()).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].0, b"shared");
}

#[test]
fn in_memory_repository_serializes_creates_too() {
    let (wins, invalid) = race_creates(Arc::new(InMemoryTodoRepository::new()), 16);
    assert_eq!((wins, invalid), (1, 15));
}

#[test]
fn listing_never_sees_half_a_batch() {
    let repo = Arc::new(KvTodoRepository::new(Arc::new(
        Database::open_in_memory().unwrap(),
    )));
    for id in 0..20 {
        repo.create(&Todo::new(format!("{id:02}"), "pending")).unwrap();
    }

    let writer = {
        let repo = Arc::clone(&repo);
        thread::spawn(move || {
            for round in 0..20 {
                for id in 0..20 {
                    let todo = Todo::new(format!("{id:02}"), "pending")
                        .with_completed(round % 2 == 0);
                    repo.update(&todo).unwrap();
                }
            }
        })
    };

    for _ in 0..50 {
        let todos = repo.get_all().unwrap();
        assert_eq!(todos.len(), 20);
        assert!(todos.windows(2).all(|w| w[0].id < w[1].id));
    }
    writer.join().unwrap();
}

#[test]
fn distinct_ids_all_succeed() {
    let repo = Arc::new(KvTodoRepository::new(Arc::new(
        Database::open_in_memory().unwrap(),
    )));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || {
                for i in 0..25 {
                    repo.create(&Todo::new(format!("t{t}-{i:02}"), "work")).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(repo.get_all().unwrap().len(), 200);
}
