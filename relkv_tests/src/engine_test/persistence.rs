use super::*;

#[test]
fn reopen_keeps_catalog_and_rows() -> anyhow::Result<()> {
    let root = temp_dir("db_reopen");
    {
        let mut db = disk_db(&root);
        db.create_table("users", users_columns())?;
        db.open_table("users")?;
        seed_users_3(&mut db);
    }
    assert!(root.join("catalog.json").exists());

    let mut db = disk_db(&root);
    assert!(db.catalog().exists("users"));
    // tables come back closed
    assert!(!db.catalog().is_open("users"));
    assert!(db.scan("users", &[], None, None).is_err());

    db.open_table("users")?;
    let young = Condition::compare("age", CompareOp::Lt, 25);
    assert_eq!(db.count_matching("users", Some(&young), None)?, 2);

    let mut cursor = db.scan("users", &["name"], None, None)?;
    assert!(cursor.next()?);
    assert_eq!(cursor.column_value("name")?, Value::from("a"));
    assert_eq!(cursor.current_row()?, user(1, "a", 30, None));
    Ok(())
}

#[test]
fn committed_transaction_survives_reopen() -> anyhow::Result<()> {
    let root = temp_dir("db_txn_reopen");
    {
        let mut db = disk_db(&root);
        db.create_table("users", users_columns())?;
        db.open_table("users")?;
        let kept = db.begin()?;
        db.insert(Some(kept), "users", &user(1, "kept", 1, None))?;
        db.commit(kept)?;
        let dropped = db.begin()?;
        db.insert(Some(dropped), "users", &user(2, "dropped", 2, None))?;
        db.abort(dropped)?;
    }
    let mut db = disk_db(&root);
    db.open_table("users")?;
    assert_eq!(db.count_matching("users", None, None)?, 1);
    Ok(())
}

#[test]
fn deferred_sync_flushes_on_drop() {
    let root = temp_dir("db_deferred");
    let config = Config {
        sync_on_commit: false,
        ..Config::at(&root)
    };
    {
        init_tracing();
        let mut db = Database::open(config.clone()).unwrap();
        db.create_table("users", users_columns()).unwrap();
        db.open_table("users").unwrap();
        seed_users_3(&mut db);
    }
    let mut db = Database::open(config).unwrap();
    db.open_table("users").unwrap();
    assert_eq!(db.count_matching("users", None, None).unwrap(), 3);
}

#[test]
fn catalog_persistence_can_be_disabled() {
    let root = temp_dir("db_no_catalog");
    let config = Config {
        persist_catalog: false,
        ..Config::at(&root)
    };
    init_tracing();
    let mut db = Database::open(config).unwrap();
    db.create_table("users", users_columns()).unwrap();
    assert!(!root.join("catalog.json").exists());
    assert!(root.join("tables").join("users.kv").exists());
}

#[test]
fn existing_table_file_leaves_catalog_untouched() -> anyhow::Result<()> {
    let root = temp_dir("db_stale_table_file");
    let config = Config {
        persist_catalog: false,
        ..Config::at(&root)
    };
    init_tracing();
    {
        let mut db = Database::open(config.clone())?;
        db.create_table("users", users_columns())?;
    }

    // without a catalog the reopened database does not know the table, but
    // its file is still on disk
    let mut db = Database::open(config)?;
    assert!(!db.catalog().exists("users"));
    for _ in 0..2 {
        let err = db.create_table("users", users_columns()).unwrap_err();
        assert!(matches!(
            err,
            DbError::DataAccess(StorageError::TableExists(ref t)) if t == "users"
        ));
        assert!(!db.catalog().exists("users"));
        assert!(!db.storage().has_table("users"));
    }
    Ok(())
}
