use super::*;

fn mixed_schema() -> Schema {
    Schema::new(vec![
        Column::new("title", ColumnType::VarText),
        Column::new("score", ColumnType::Real),
        Column::primary_key("code", ColumnType::FixedText(4)),
        Column::new("tag", ColumnType::FixedText(3)),
        Column::new("count", ColumnType::Integer),
        Column::new("note", ColumnType::VarText),
    ])
}

#[test]
fn round_trip_mixed_columns() {
    let schema = mixed_schema();
    assert_round_trip(
        &schema,
        &[
            Value::from("hello"),
            Value::Real(-2.5),
            Value::from("K1"),
            Value::from("abc"),
            Value::Integer(i32::MIN),
            Value::from(""),
        ],
    );
}

#[test]
fn null_decodes_as_null_at_every_position() {
    let schema = mixed_schema();
    let base = vec![
        Value::from("t"),
        Value::Real(1.0),
        Value::from("PK"),
        Value::from("x"),
        Value::Integer(9),
        Value::from("note"),
    ];
    for nulled in [0usize, 1, 3, 4, 5] {
        let mut row = base.clone();
        row[nulled] = Value::Null;
        assert_round_trip(&schema, &row);
    }
}

#[test]
fn runs_of_skipped_columns_before_a_payload() {
    let schema = mixed_schema();
    // title, score null; code in key; tag null -> count must walk back to slot 0
    let row = vec![
        Value::Null,
        Value::Null,
        Value::from("Z"),
        Value::Null,
        Value::Integer(77),
        Value::Null,
    ];
    assert_round_trip(&schema, &row);

    let encoded = encode(&schema, &row).unwrap();
    assert_eq!(encoded.value.len(), 7 * 4 + 4);
}

#[test]
fn only_primary_key_present() {
    let schema = mixed_schema();
    let row = vec![
        Value::Null,
        Value::Null,
        Value::from("ONLY"),
        Value::Null,
        Value::Null,
        Value::Null,
    ];
    let encoded = encode(&schema, &row).unwrap();
    assert_eq!(encoded.value.len(), 7 * 4);
    assert_round_trip(&schema, &row);
}

#[test]
fn real_primary_key_round_trips() {
    let schema = Schema::new(vec![
        Column::primary_key("x", ColumnType::Real),
        Column::new("label", ColumnType::VarText),
    ]);
    for x in [-1e9, -0.5, 0.0, 3.25, f64::MAX] {
        assert_round_trip(&schema, &[Value::Real(x), Value::from("p")]);
    }
}

#[test]
fn unicode_text_round_trips() {
    let schema = users_schema();
    assert_round_trip(&schema, &user(3, "Zoë ✓", -4, Some("日本")));
}
