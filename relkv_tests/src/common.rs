use relkv_core::{Column, ColumnType, Database, Schema, Value};
use std::path::PathBuf;
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn temp_dir(prefix: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let mut path = std::env::temp_dir();
    path.push(format!(
        "relkv_{}_{}_{}",
        prefix,
        std::process::id(),
        id
    ));
    let _ = std::fs::remove_dir_all(&path);
    path
}

/// `(id int primary key, name varchar, age int, nickname varchar)`
pub fn users_columns() -> Vec<Column> {
    vec![
        Column::primary_key("id", ColumnType::Integer),
        Column::new("name", ColumnType::VarText),
        Column::new("age", ColumnType::Integer),
        Column::new("nickname", ColumnType::VarText),
    ]
}

pub fn users_schema() -> Schema {
    Schema::new(users_columns())
}

pub fn user(id: i32, name: &str, age: i32, nickname: Option<&str>) -> Vec<Value> {
    vec![
        Value::Integer(id),
        Value::from(name),
        Value::Integer(age),
        Value::from(nickname),
    ]
}

pub fn test_db() -> Database {
    init_tracing();
    let mut db = Database::in_memory();
    db.create_table("users", users_columns()).unwrap();
    db.open_table("users").unwrap();
    db
}

pub fn seed_users_3(db: &mut Database) {
    db.insert(None, "users", &user(1, "a", 30, None)).unwrap();
    db.insert(None, "users", &user(2, "b", 20, Some("bee"))).unwrap();
    db.insert(None, "users", &user(3, "c", 10, None)).unwrap();
}
