//! Whole statements described as JSON, the way a dynamic caller would pass them.

use pgabstract::prelude::*;
use serde_json::{Value, json};

fn node(value: Value) -> ValueNode {
    ValueNode::classify(value).unwrap()
}

fn insert(table: &str, values: Value, options: Value) -> SqlResult<BuiltQuery> {
    let options = InsertOptions::try_from(&node(options))?;
    PgAbstract::new().insert(table, &node(values), &options)
}

fn select(source: Value, fields: Value, where_clause: Value, tail: Value) -> SqlResult<BuiltQuery> {
    let source = Source::try_from(&node(source))?;
    let tail = match tail {
        Value::Null => None,
        tail => Some(SelectTail::try_from(&node(tail))?),
    };
    PgAbstract::new().select(&source, &node(fields), &node(where_clause), tail.as_ref())
}

fn texts(binds: &[Bind]) -> Vec<String> {
    binds.iter().map(|b| b.value().to_string()).collect()
}

#[test]
fn insert_do_nothing() {
    let q = insert("t", json!({"a": "b"}), json!({"on_conflict": null})).unwrap();
    assert_eq!(q.sql, r#"INSERT INTO "t" ("a") VALUES (?) ON CONFLICT DO NOTHING"#);
    assert_eq!(texts(&q.binds), ["b"]);
}

#[test]
fn insert_do_update() {
    let q = insert(
        "t",
        json!({"a": "b"}),
        json!({"on_conflict": [["a"], {"a": "c"}]}),
    )
    .unwrap();
    assert_eq!(
        q.sql,
        r#"INSERT INTO "t" ("a") VALUES (?) ON CONFLICT ("a") DO UPDATE SET "a" = ?"#
    );
    assert_eq!(texts(&q.binds), ["b", "c"]);
}

#[test]
fn insert_upsert_with_returning_and_json() {
    let q = insert(
        "users",
        json!({"name": "alice", "profile": {"-json": {"age": 30}}}),
        json!({
            "on_conflict": ["name", {"profile": {"-ident": "excluded.profile"}}],
            "returning": ["id", "name"]
        }),
    )
    .unwrap();
    assert_eq!(
        q.sql,
        concat!(
            r#"INSERT INTO "users" ("name", "profile") VALUES (?, ?)"#,
            r#" ON CONFLICT ("name") DO UPDATE SET "profile" = "excluded"."profile""#,
            r#" RETURNING "id", "name""#
        )
    );
    assert_eq!(q.binds.len(), 2);
    assert!(q.binds[1].is_json());
}

#[test]
fn insert_without_options_has_no_returning() {
    let q = insert("t", json!({"a": 1}), json!(null)).unwrap();
    assert_eq!(q.sql, r#"INSERT INTO "t" ("a") VALUES (?)"#);
}

#[test]
fn insert_conflict_errors() {
    let err = insert("t", json!({"a": 1}), json!({"on_conflict": [["a"], 1]})).unwrap_err();
    assert!(matches!(err, SqlError::MalformedConflictSpec(_)));

    let err = insert("t", json!({"a": 1}), json!({"on_conflict": 1})).unwrap_err();
    assert_eq!(err.context(), Some("on_conflict"));
}

#[test]
fn select_join() {
    let q = select(json!(["foo", ["bar", "foo_id", "id"]]), json!("*"), json!(null), json!(null))
        .unwrap();
    assert_eq!(
        q.sql,
        r#"SELECT * FROM "foo" JOIN "bar" ON ("bar"."foo_id" = "foo"."id")"#
    );
    assert!(q.binds.is_empty());
}

#[test]
fn select_joins_keep_caller_order() {
    let q = select(
        json!([
            "a",
            ["-right", "c", "a_id", "id"],
            ["-left", "b", "a_id", "id"],
            ["d", "a_id", "id"]
        ]),
        json!(null),
        json!(null),
        json!(null),
    )
    .unwrap();
    let c = q.sql.find("RIGHT JOIN \"c\"").unwrap();
    let b = q.sql.find("LEFT JOIN \"b\"").unwrap();
    let d = q.sql.find(" JOIN \"d\"").unwrap();
    assert!(c < b && b < d);
}

#[test]
fn select_group_by_having() {
    let q = select(
        json!("t"),
        json!("*"),
        json!(null),
        json!({"group_by": ["a"], "having": {"b": "c"}}),
    )
    .unwrap();
    assert_eq!(q.sql, r#"SELECT * FROM "t" GROUP BY "a" HAVING "b" = ?"#);
    assert_eq!(texts(&q.binds), ["c"]);
}

#[test]
fn select_for_update_skip_locked_scalar_is_rejected() {
    let err = select(json!("t"), json!("*"), json!(null), json!({"for": "update skip locked"}))
        .unwrap_err();
    assert!(matches!(err, SqlError::DisallowedForValue(ref v) if v == "update skip locked"));

    let q = select(
        json!("t"),
        json!("*"),
        json!(null),
        json!({"for": {"-literal": "update skip locked"}}),
    )
    .unwrap();
    assert_eq!(q.sql, r#"SELECT * FROM "t" FOR update skip locked"#);
}

#[test]
fn select_everything() {
    let q = select(
        json!(["orders", ["-left", "customers", "customer_id", "id"]]),
        json!([
            "orders.id",
            ["customers.name", "customer"],
            {"-literal": ["count(*) FILTER (WHERE orders.total > ?) AS big", 100]}
        ]),
        json!({"orders.status": {"-in": ["open", "paid"]}, "customers.active": true}),
        json!({
            "group_by": ["orders.id", "customers.name"],
            "having": {"-literal": ["count(*) > ?", 1]},
            "order_by": {"-desc": "orders.id"},
            "limit": 10,
            "offset": 20,
            "for": "update"
        }),
    )
    .unwrap();
    assert_eq!(
        q.sql,
        concat!(
            r#"SELECT "orders"."id", "customers"."name" AS "customer","#,
            r#" count(*) FILTER (WHERE orders.total > ?) AS big"#,
            r#" FROM "orders" LEFT JOIN "customers" ON ("customers"."customer_id" = "orders"."id")"#,
            r#" WHERE "customers"."active" = ? AND "orders"."status" IN (?, ?)"#,
            r#" GROUP BY "orders"."id", "customers"."name""#,
            r#" HAVING count(*) > ?"#,
            r#" ORDER BY "orders"."id" DESC"#,
            r#" LIMIT ? OFFSET ? FOR UPDATE"#
        )
    );
    assert_eq!(
        texts(&q.binds),
        ["100", "true", "open", "paid", "1", "10", "20"]
    );
    assert_eq!(q.binds.len(), q.sql.matches('?').count());
}

#[test]
fn numbered_placeholders_follow_bind_order() {
    let q = select(
        json!("t"),
        json!("*"),
        json!({"a": 1, "b": {"-between": [2, 3]}}),
        json!({"limit": 4}),
    )
    .unwrap();
    assert_eq!(
        q.to_numbered_sql(),
        r#"SELECT * FROM "t" WHERE "a" = $1 AND "b" BETWEEN $2 AND $3 LIMIT $4"#
    );
    assert_eq!(texts(&q.binds), ["1", "2", "3", "4"]);
}

#[test]
fn update_and_delete_from_json() {
    let pg = PgAbstract::new();
    let q = pg
        .update(
            "t",
            &node(json!({"tags": ["a", "b"], "doc": {"-json": [1]}})),
            &node(json!({"id": 1})),
            Some(&node(json!(["id"]))),
        )
        .unwrap();
    assert_eq!(
        q.sql,
        r#"UPDATE "t" SET "doc" = ?, "tags" = ? WHERE "id" = ? RETURNING "id""#
    );
    assert!(q.binds[0].is_json());
    assert_eq!(q.binds[1].value(), &BindValue::from(vec!["a", "b"]));

    let q = pg.delete("t", &node(json!({"id": [1, 2]})), None).unwrap();
    assert_eq!(q.sql, r#"DELETE FROM "t" WHERE ("id" = ? OR "id" = ?)"#);
}

#[test]
fn config_from_serde() {
    let config: Config = serde_json::from_value(json!({"quote_char": "`", "keyword_case": "lower"})).unwrap();
    let q = PgAbstract::with_config(config)
        .select(&Source::from("a.b"), &node(json!(null)), &node(json!(null)), None)
        .unwrap();
    assert_eq!(q.sql, "select * from `a`.`b`");
}
