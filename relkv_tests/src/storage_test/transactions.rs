use super::*;

#[test]
fn staged_writes_are_private_until_commit() {
    let mut storage = mem_with_table("t");
    let txn = storage.begin().unwrap();
    storage.put(Some(txn), "t", b"a", b"1").unwrap();

    assert!(keys(&storage, "t", None).is_empty());
    assert_eq!(keys(&storage, "t", Some(txn)), vec![b"a".to_vec()]);

    storage.commit(txn).unwrap();
    assert_eq!(keys(&storage, "t", None), vec![b"a".to_vec()]);
}

#[test]
fn abort_discards_staged_writes() {
    let mut storage = mem_with_table("t");
    storage.put(None, "t", b"keep", b"1").unwrap();
    let txn = storage.begin().unwrap();
    storage.put(Some(txn), "t", b"drop", b"2").unwrap();
    storage.abort(txn).unwrap();

    assert_eq!(keys(&storage, "t", None), vec![b"keep".to_vec()]);
    assert!(matches!(
        storage.commit(txn),
        Err(StorageError::UnknownTransaction(t)) if t == txn
    ));
}

#[test]
fn second_writer_on_same_key_conflicts() {
    let mut storage = mem_with_table("t");
    let first = storage.begin().unwrap();
    let second = storage.begin().unwrap();
    assert!(second.id() > first.id());
    assert_eq!(first.to_string(), format!("txn#{}", first.id()));
    storage.put(Some(first), "t", b"k", b"1").unwrap();

    let err = storage.put(Some(second), "t", b"k", b"2").unwrap_err();
    assert!(matches!(err, StorageError::Conflict { ref txn, .. } if *txn == first));
    let err = storage.put(None, "t", b"k", b"3").unwrap_err();
    assert!(matches!(err, StorageError::Conflict { .. }));

    // other keys are unaffected
    storage.put(Some(second), "t", b"other", b"2").unwrap();

    storage.commit(first).unwrap();
    storage.put(Some(second), "t", b"k", b"2").unwrap();
    storage.commit(second).unwrap();

    let mut cursor = storage.open_cursor("t", None).unwrap();
    let entries = drain(cursor.as_mut());
    assert_eq!(entries[0], KvEntry::new(b"k".to_vec(), b"2".to_vec()));
}

#[test]
fn put_new_rejects_visible_keys() {
    let mut storage = mem_with_table("t");
    storage.put_new(None, "t", b"k", b"1").unwrap();
    let err = storage.put_new(None, "t", b"k", b"2").unwrap_err();
    assert!(matches!(err, StorageError::KeyExists { .. }));

    let txn = storage.begin().unwrap();
    storage.put_new(Some(txn), "t", b"j", b"1").unwrap();
    assert!(matches!(
        storage.put_new(Some(txn), "t", b"j", b"1"),
        Err(StorageError::KeyExists { .. })
    ));

    storage.put(None, "t", b"k", b"overwritten").unwrap();
    let mut cursor = storage.open_cursor("t", None).unwrap();
    assert_eq!(
        cursor.get_first().unwrap(),
        Some(KvEntry::new(b"k".to_vec(), b"overwritten".to_vec()))
    );
}

#[test]
fn append_assigns_increasing_row_ids() {
    let mut storage = mem_with_table("t");
    let a = storage.append(None, "t", b"x").unwrap();
    let b = storage.append(None, "t", b"y").unwrap();
    assert_eq!(a, 1u64.to_be_bytes().to_vec());
    assert_eq!(b, 2u64.to_be_bytes().to_vec());
    assert_eq!(keys(&storage, "t", None), vec![a, b]);
}

#[test]
fn cursor_semantics() {
    let mut storage = mem_with_table("t");
    for k in [b"c", b"a", b"b"] {
        storage.put(None, "t", k, b"v").unwrap();
    }
    let mut cursor = storage.open_cursor("t", None).unwrap();
    // unpositioned get_next behaves as get_first
    assert_eq!(cursor.get_next().unwrap().unwrap().key, b"a".to_vec());
    assert_eq!(cursor.get_next().unwrap().unwrap().key, b"b".to_vec());
    assert_eq!(cursor.get_next().unwrap().unwrap().key, b"c".to_vec());
    assert!(cursor.get_next().unwrap().is_none());
    assert!(cursor.get_next().unwrap().is_none());
    assert_eq!(cursor.get_first().unwrap().unwrap().key, b"a".to_vec());
}

#[test]
fn unknown_table_and_duplicate_create() {
    let mut storage = mem_with_table("t");
    assert!(matches!(
        storage.put(None, "nope", b"k", b"v"),
        Err(StorageError::NoSuchTable(_))
    ));
    assert!(storage.open_cursor("nope", None).is_err());
    assert!(matches!(
        storage.create_table("t"),
        Err(StorageError::TableExists(_))
    ));
}

#[test]
fn transaction_cursor_merges_staged_writes_in_key_order() {
    let mut storage = mem_with_table("t");
    for k in [b"a", b"c", b"e"] {
        storage.put(None, "t", k, b"old").unwrap();
    }
    let txn = storage.begin().unwrap();
    storage.put(Some(txn), "t", b"b", b"new").unwrap();
    storage.put(Some(txn), "t", b"c", b"new").unwrap();
    storage.put(Some(txn), "t", b"f", b"new").unwrap();

    let mut cursor = storage.open_cursor("t", Some(txn)).unwrap();
    let seen: Vec<(Vec<u8>, Vec<u8>)> = drain(cursor.as_mut())
        .into_iter()
        .map(|e| (e.key, e.value))
        .collect();
    let expected: Vec<(Vec<u8>, Vec<u8>)> = [
        (b"a", b"old"),
        (b"b", b"new"),
        (b"c", b"new"),
        (b"e", b"old"),
        (b"f", b"new"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_vec(), v.to_vec()))
    .collect();
    assert_eq!(seen, expected);
    assert!(cursor.get_next().unwrap().is_none());

    // two cursors over the same table advance independently
    let mut outer = storage.open_cursor("t", None).unwrap();
    let mut inner = storage.open_cursor("t", None).unwrap();
    assert_eq!(outer.get_next().unwrap().unwrap().key, b"a".to_vec());
    assert_eq!(inner.get_next().unwrap().unwrap().key, b"a".to_vec());
    assert_eq!(inner.get_next().unwrap().unwrap().key, b"c".to_vec());
    assert_eq!(outer.get_next().unwrap().unwrap().key, b"c".to_vec());
    assert_eq!(storage.open_cursor_count(), 3);
}
