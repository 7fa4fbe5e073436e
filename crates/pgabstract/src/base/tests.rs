//! Tests for the generic builder.

use super::*;
use serde_json::json;

fn builder() -> BaseBuilder {
    BaseBuilder::default()
}

fn compile_where(node: ValueNode) -> (String, Vec<Bind>) {
    builder().where_clause(&node, "where").unwrap().into_parts()
}

#[test]
fn quote_dotted_names() {
    let b = builder();
    assert_eq!(b.quote("a.b").unwrap(), r#""a"."b""#);
    assert_eq!(b.quote("t.*").unwrap(), r#""t".*"#);
    assert_eq!(b.quote(r#"we"ird"#).unwrap(), r#""we""ird""#);
}

#[test]
fn quote_rejects_empty_names() {
    assert!(matches!(
        builder().quote("").unwrap_err(),
        SqlError::InvalidIdentifier(_)
    ));
    assert!(matches!(
        builder().quote("a..b").unwrap_err(),
        SqlError::InvalidIdentifier(_)
    ));
}

#[test]
fn keyword_case_follows_config() {
    assert_eq!(builder().keyword("order by"), "ORDER BY");
    let lower = BaseBuilder::new(Config::new().lowercase_keywords());
    assert_eq!(lower.keyword("ORDER BY"), "order by");
}

#[test]
fn table_refs() {
    let b = builder();
    let tables = vec![TableRef::from("a"), TableRef::literal("(SELECT 1) AS x")];
    assert_eq!(b.from_list(&tables).unwrap(), r#""a", (SELECT 1) AS x"#);
}

// ==================== WHERE ====================

#[test]
fn where_absent_is_empty() {
    assert!(builder().where_clause(&ValueNode::Absent, "where").unwrap().is_empty());
    assert!(builder()
        .where_clause(&ValueNode::map(Vec::<(String, ValueNode)>::new()), "where")
        .unwrap()
        .is_empty());
}

#[test]
fn where_map_joins_with_and_in_key_order() {
    let (sql, binds) = compile_where(ValueNode::map([
        ("b", ValueNode::Absent),
        ("a", ValueNode::from(1)),
    ]));
    assert_eq!(sql, r#""a" = ? AND "b" IS NULL"#);
    assert_eq!(binds, vec![Bind::from(1)]);
}

#[test]
fn where_sequence_is_or() {
    let (sql, binds) = compile_where(ValueNode::seq([
        ValueNode::map([("a", 1)]),
        ValueNode::map([("b", 2)]),
    ]));
    assert_eq!(sql, r#""a" = ? OR "b" = ?"#);
    assert_eq!(binds, vec![Bind::from(1), Bind::from(2)]);
}

#[test]
fn where_nested_groups_are_parenthesized() {
    let (sql, binds) = compile_where(ValueNode::map([
        (
            "-or",
            ValueNode::seq([ValueNode::map([("a", 1)]), ValueNode::map([("b", 2)])]),
        ),
        ("c", ValueNode::from(3)),
    ]));
    assert_eq!(sql, r#"("a" = ? OR "b" = ?) AND "c" = ?"#);
    assert_eq!(binds, vec![Bind::from(1), Bind::from(2), Bind::from(3)]);
}

#[test]
fn where_not() {
    let (sql, _) = compile_where(ValueNode::map([("-not", ValueNode::map([("a", 1)]))]));
    assert_eq!(sql, r#"NOT ("a" = ?)"#);
}

#[test]
fn where_column_sequence() {
    let (sql, binds) = compile_where(ValueNode::map([("a", ValueNode::seq([1, 2]))]));
    assert_eq!(sql, r#"("a" = ? OR "a" = ?)"#);
    assert_eq!(binds.len(), 2);

    let (sql, binds) = compile_where(ValueNode::map([("a", ValueNode::seq(Vec::<i32>::new()))]));
    assert_eq!(sql, "0=1");
    assert!(binds.is_empty());
}

#[test]
fn where_comparison_operators() {
    let (sql, binds) = compile_where(ValueNode::map([(
        "a",
        ValueNode::map([("<", 5), (">=", 1)]),
    )]));
    assert_eq!(sql, r#"("a" < ? AND "a" >= ?)"#);
    assert_eq!(binds, vec![Bind::from(5), Bind::from(1)]);

    let (sql, _) = compile_where(ValueNode::map([("a", ValueNode::map([("-LIKE", "x%")]))]));
    assert_eq!(sql, r#""a" LIKE ?"#);

    let (sql, _) = compile_where(ValueNode::map([("a", ValueNode::map([("-not_ilike", "x%")]))]));
    assert_eq!(sql, r#""a" NOT ILIKE ?"#);
}

#[test]
fn where_null_comparisons() {
    let (sql, binds) = compile_where(ValueNode::map([(
        "a",
        ValueNode::map([("!=", ValueNode::Absent)]),
    )]));
    assert_eq!(sql, r#""a" IS NOT NULL"#);
    assert!(binds.is_empty());

    let (sql, _) = compile_where(ValueNode::map([("a", ValueNode::map([("=", ValueNode::Absent)]))]));
    assert_eq!(sql, r#""a" IS NULL"#);
}

#[test]
fn where_in_lists() {
    let (sql, binds) = compile_where(ValueNode::map([(
        "a",
        ValueNode::map([("-in", ValueNode::seq([1, 2]))]),
    )]));
    assert_eq!(sql, r#""a" IN (?, ?)"#);
    assert_eq!(binds, vec![Bind::from(1), Bind::from(2)]);

    let empty = || ValueNode::seq(Vec::<i32>::new());
    let (sql, _) = compile_where(ValueNode::map([("a", ValueNode::map([("-in", empty())]))]));
    assert_eq!(sql, "0=1");
    let (sql, _) = compile_where(ValueNode::map([("a", ValueNode::map([("-not_in", empty())]))]));
    assert_eq!(sql, "1=1");
}

#[test]
fn where_between() {
    let (sql, binds) = compile_where(ValueNode::map([(
        "a",
        ValueNode::map([("-between", ValueNode::seq([1, 5]))]),
    )]));
    assert_eq!(sql, r#""a" BETWEEN ? AND ?"#);
    assert_eq!(binds, vec![Bind::from(1), Bind::from(5)]);

    let err = builder()
        .where_clause(
            &ValueNode::map([("a", ValueNode::map([("-between", ValueNode::seq([1]))]))]),
            "where",
        )
        .unwrap_err();
    assert_eq!(err.context(), Some("where"));
}

#[test]
fn where_json_identifier_and_literal_values() {
    let (sql, binds) = compile_where(ValueNode::map([("a", ValueNode::json(json!({"k": 1})))]));
    assert_eq!(sql, r#""a" = ?"#);
    assert!(binds[0].is_json());

    let (sql, binds) = compile_where(ValueNode::map([("a", ValueNode::ident("b.c"))]));
    assert_eq!(sql, r#""a" = "b"."c""#);
    assert!(binds.is_empty());

    let (sql, binds) = compile_where(ValueNode::map([(
        "a",
        ValueNode::sql_with_binds("> ? + 1", [Bind::from(2)]),
    )]));
    assert_eq!(sql, r#""a" > ? + 1"#);
    assert_eq!(binds, vec![Bind::from(2)]);
}

#[test]
fn where_rejects_unknown_operators_and_shapes() {
    let err = builder()
        .where_clause(&ValueNode::map([("a", ValueNode::map([("~~", 1)]))]), "where")
        .unwrap_err();
    assert!(err.is_unsupported_shape());

    let err = builder()
        .where_clause(&ValueNode::map([("-xor", ValueNode::seq([1]))]), "where")
        .unwrap_err();
    assert!(err.is_unsupported_shape());

    let err = builder().where_clause(&ValueNode::from(1), "having").unwrap_err();
    assert_eq!(err, SqlError::unsupported("having", "plain scalar"));
}

// ==================== ORDER BY ====================

#[test]
fn order_by_names_and_literals() {
    let b = builder();
    let frag = b.order_by(&ValueNode::seq([ValueNode::from("a"), ValueNode::ident("t.b")])).unwrap();
    assert_eq!(frag.sql, r#""a", "t"."b""#);

    let frag = b.order_by(&ValueNode::sql("random()")).unwrap();
    assert_eq!(frag.sql, "random()");
}

#[test]
fn order_by_directions() {
    let b = builder();
    let frag = b.order_by(&ValueNode::map([("-desc", ValueNode::seq(["a", "b"]))])).unwrap();
    assert_eq!(frag.sql, r#""a" DESC, "b" DESC"#);

    let frag = b.order_by(&ValueNode::map([("-ASC", "a")])).unwrap();
    assert_eq!(frag.sql, r#""a" ASC"#);

    let frag = b
        .order_by(&ValueNode::seq([
            ValueNode::map([("-asc", "a")]),
            ValueNode::map([("-desc", "b")]),
        ]))
        .unwrap();
    assert_eq!(frag.sql, r#""a" ASC, "b" DESC"#);
}

#[test]
fn order_by_rejects_unknown_keys() {
    let err = builder().order_by(&ValueNode::map([("-up", "a")])).unwrap_err();
    assert_eq!(err.context(), Some("order_by"));
}

// ==================== Fields / values / set lists ====================

#[test]
fn fields_shapes() {
    let b = builder();
    assert_eq!(b.fields(&ValueNode::Absent).unwrap().sql, "*");
    assert_eq!(b.fields(&ValueNode::from("count(*)")).unwrap().sql, "count(*)");
    assert_eq!(
        b.fields(&ValueNode::seq(["a", "b.c"])).unwrap().sql,
        r#""a", "b"."c""#
    );
    let err = b.fields(&ValueNode::map([("a", 1)])).unwrap_err();
    assert_eq!(err.context(), Some("fields"));
}

#[test]
fn set_list_in_key_order() {
    let frag = builder()
        .set_list(&ValueNode::map([("b", ValueNode::from(2)), ("a", ValueNode::from("x"))]), "set")
        .unwrap();
    assert_eq!(frag.sql, r#""a" = ?, "b" = ?"#);
    assert_eq!(frag.binds, vec![Bind::from("x"), Bind::from(2)]);
}

#[test]
fn set_list_rejects_empty_maps() {
    let err = builder()
        .set_list(&ValueNode::map(Vec::<(String, ValueNode)>::new()), "set")
        .unwrap_err();
    assert_eq!(err.context(), Some("set"));
}

#[test]
fn sequence_value_is_one_array_bind() {
    let frag = builder().value(&ValueNode::seq(["x", "y"]), "values").unwrap();
    assert_eq!(frag.sql, "?");
    assert_eq!(frag.binds, vec![Bind::new(vec!["x", "y"])]);

    let err = builder()
        .value(&ValueNode::seq([ValueNode::map([("a", 1)])]), "values")
        .unwrap_err();
    assert_eq!(err.context(), Some("values"));
}

// ==================== Statements ====================

#[test]
fn insert_head_shapes() {
    let b = builder();
    let frag = b
        .insert_head(
            "t",
            &ValueNode::map([("b", ValueNode::json(json!([1]))), ("a", ValueNode::from(1))]),
        )
        .unwrap();
    assert_eq!(frag.sql, r#"INSERT INTO "t" ("a", "b") VALUES (?, ?)"#);
    assert!(!frag.binds[0].is_json());
    assert!(frag.binds[1].is_json());

    let frag = b.insert_head("t", &ValueNode::seq([1, 2])).unwrap();
    assert_eq!(frag.sql, r#"INSERT INTO "t" VALUES (?, ?)"#);

    let frag = b.insert_head("t", &ValueNode::Absent).unwrap();
    assert_eq!(frag.sql, r#"INSERT INTO "t" DEFAULT VALUES"#);
}

#[test]
fn select_skeleton() {
    let b = builder();
    let q = b.select_statement(Fragment::raw("*"), r#""t""#, Fragment::new(), Fragment::new());
    assert_eq!(q.sql, r#"SELECT * FROM "t""#);
}

#[test]
fn update_with_where_and_returning() {
    let returning = ValueNode::seq(["id"]);
    let q = builder()
        .update(
            "t",
            &ValueNode::map([("a", 1)]),
            &ValueNode::map([("id", 2)]),
            Some(&returning),
        )
        .unwrap();
    assert_eq!(q.sql, r#"UPDATE "t" SET "a" = ? WHERE "id" = ? RETURNING "id""#);
    assert_eq!(q.binds, vec![Bind::from(1), Bind::from(2)]);
}

#[test]
fn delete_without_where() {
    let q = builder().delete("t", &ValueNode::Absent, None).unwrap();
    assert_eq!(q.sql, r#"DELETE FROM "t""#);
    assert!(q.binds.is_empty());
}
