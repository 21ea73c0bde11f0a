//! On-disk behavior: reopen, torn tails, corruption, locking.

use std::fs::OpenOptions;
use std::io::Write;
use tempfile::tempdir;
use tododb_kv::{Config, Database, KvError, SequenceNumber};

fn put(db: &Database, key: &str, value: &str) {
    db.update(|txn| txn.put(key.as_bytes(), value.as_bytes()))
        .unwrap();
}

#[test]
fn committed_data_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todos.db");

    {
        let db = Database::open(&path).unwrap();
        put(&db, "1", "Buy milk");
        put(&db, "2", "Walk dog");
        db.update(|txn| txn.delete(&b"2"[..])).unwrap();
        db.close().unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.committed_seq(), SequenceNumber::new(3));
    let pairs = db.view(|txn| txn.scan()).unwrap();
    assert_eq!(pairs, vec![(b"1".to_vec(), b"Buy milk".to_vec())]);

    // Sequence numbering continues where the log left off.
    let mut txn = db.begin_write().unwrap();
    txn.put(&b"3"[..], &b"Read book"[..]).unwrap();
    assert_eq!(txn.commit().unwrap(), SequenceNumber::new(4));
}

#[test]
fn drop_without_close_is_still_durable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todos.db");

    {
        let db = Database::open_with_config(&path, Config::new().sync_on_commit(false)).unwrap();
        put(&db, "a", "1");
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.view(|txn| txn.get(b"a")).unwrap(), Some(b"1".to_vec()));
}

#[test]
fn torn_tail_is_discarded_and_log_stays_appendable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todos.db");
    let wal = path.join("wal.log");

    {
        let db = Database::open(&path).unwrap();
        put(&db, "1", "kept");
    }
    let good_len = std::fs::metadata(&wal).unwrap().len();

    // A crash in the middle of the next append.
    {
        let mut file = OpenOptions::new().append(true).open(&wal).unwrap();
        file.write_all(b"TKVL\x01\x00\x01\x08\x00").unwrap();
    }

    {
        let db = Database::open(&path).unwrap();
        assert_eq!(std::fs::metadata(&wal).unwrap().len(), good_len);
        put(&db, "2", "after crash");
    }

    let db = Database::open(&path).unwrap();
    let keys: Vec<_> = db
        .view(|txn| txn.scan())
        .unwrap()
        .into_iter()
        .map(|(k, _)| k)
        .collect();
    assert_eq!(keys, vec![b"1".to_vec(), b"2".to_vec()]);
}

#[test]
fn corrupted_log_refuses_to_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todos.db");
    let wal = path.join("wal.log");

    {
        let db = Database::open(&path).unwrap();
        put(&db, "1", "Buy milk");
    }

    let mut bytes = std::fs::read(&wal).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0x01;
    std::fs::write(&wal, &bytes).unwrap();

    let err = Database::open(&path).unwrap_err();
    assert!(err.is_corruption(), "unexpected error: {err}");
    assert_eq!(std::fs::read(&wal).unwrap(), bytes);
}

#[test]
fn second_handle_is_locked_out() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todos.db");

    let first = Database::open(&path).unwrap();
    assert!(matches!(
        Database::open(&path),
        Err(KvError::DatabaseLocked)
    ));

    drop(first);
    assert!(Database::open(&path).is_ok());
}

#[test]
fn create_and_exists_flags() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todos.db");

    assert!(matches!(
        Database::open_with_config(&path, Config::new().create_if_missing(false)),
        Err(KvError::InvalidFormat { .. })
    ));

    {
        let db = Database::open(&path).unwrap();
        put(&db, "1", "x");
    }

    assert!(matches!(
        Database::open_with_config(&path, Config::new().error_if_exists(true)),
        Err(KvError::InvalidFormat { .. })
    ));
    assert!(Database::open_with_config(&path, Config::new().create_if_missing(false)).is_ok());
}

#[test]
fn stats_reflect_log_growth() {
    let dir = tempdir().unwrap();
    let db = Database::open(&dir.path().join("todos.db")).unwrap();
    assert_eq!(db.path(), Some(dir.path().join("todos.db").as_path()));

    let before = db.stats().unwrap();
    put(&db, "1", "Buy milk");
    let after = db.stats().unwrap();

    assert_eq!(before.wal_size, 0);
    assert!(after.wal_size > 0);
    assert_eq!(after.key_count, 1);
    assert_eq!(after.committed_seq, SequenceNumber::new(1));
}
