use super::*;

#[test]
fn disk_storage_survives_reopen() {
    let root = temp_dir("disk_reopen");
    {
        let mut storage = DiskStorage::new(root.clone()).unwrap();
        storage.create_table("t").unwrap();
        storage.put(None, "t", b"b", b"2").unwrap();
        storage.put(None, "t", b"a", b"1").unwrap();
        storage.append(None, "t", b"row").unwrap();
    }
    let content = std::fs::read_to_string(root.join("tables").join("t.kv")).unwrap();
    assert!(content.starts_with("#next_row_id=2\n"));
    assert!(content.contains(&format!("{}\t{}", hex_of(b"a"), hex_of(b"1"))));

    let mut storage = DiskStorage::new(root.clone()).unwrap();
    assert_eq!(storage.root(), root.as_path());
    storage.bootstrap_table("t").unwrap();
    assert_eq!(
        keys(&storage, "t", None),
        vec![1u64.to_be_bytes().to_vec(), b"a".to_vec(), b"b".to_vec()]
    );
    let next = storage.append(None, "t", b"again").unwrap();
    assert_eq!(next, 2u64.to_be_bytes().to_vec());
}

#[test]
fn uncommitted_writes_never_reach_disk() {
    let root = temp_dir("disk_uncommitted");
    let mut storage = DiskStorage::new(root.clone()).unwrap();
    storage.create_table("t").unwrap();
    let txn = storage.begin().unwrap();
    storage.put(Some(txn), "t", b"k", b"v").unwrap();

    let mut reopened = DiskStorage::new(root.clone()).unwrap();
    reopened.bootstrap_table("t").unwrap();
    assert!(keys(&reopened, "t", None).is_empty());

    storage.commit(txn).unwrap();
    let mut reopened = DiskStorage::new(root).unwrap();
    reopened.bootstrap_table("t").unwrap();
    assert_eq!(keys(&reopened, "t", None), vec![b"k".to_vec()]);
}

#[test]
fn deferred_sync_waits_for_checkpoint() {
    let root = temp_dir("disk_deferred");
    let mut storage = DiskStorage::new(root.clone())
        .unwrap()
        .with_sync_on_commit(false);
    storage.create_table("t").unwrap();
    storage.put(None, "t", b"k", b"v").unwrap();

    let file = root.join("tables").join("t.kv");
    assert!(!std::fs::read_to_string(&file).unwrap().contains(&hex_of(b"k")));
    storage.checkpoint().unwrap();
    assert!(std::fs::read_to_string(&file).unwrap().contains(&hex_of(b"k")));
}

#[test]
fn corrupt_table_file_is_reported() {
    let root = temp_dir("disk_corrupt");
    std::fs::create_dir_all(root.join("tables")).unwrap();
    std::fs::write(root.join("tables").join("t.kv"), "zz\t00\n").unwrap();
    let mut storage = DiskStorage::new(root).unwrap();
    let err = storage.bootstrap_table("t").unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { .. }));
}

#[test]
fn missing_row_id_header_is_recovered_from_keys() {
    let root = temp_dir("disk_no_header");
    std::fs::create_dir_all(root.join("tables")).unwrap();
    let line = format!("{}\t{}\n", hex_of(&7u64.to_be_bytes()), hex_of(b"v"));
    std::fs::write(root.join("tables").join("t.kv"), line).unwrap();
    let mut storage = DiskStorage::new(root).unwrap();
    storage.bootstrap_table("t").unwrap();
    assert_eq!(
        storage.append(None, "t", b"w").unwrap(),
        8u64.to_be_bytes().to_vec()
    );
}

fn hex_of(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
