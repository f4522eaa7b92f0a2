use structform_schema::{
    Comparator, FieldType, MemoryStore, QueryEngine, SchemaCatalog, SchemaError, Search, ROWID,
};
use tempfile::TempDir;

const ORDERS: &str = r#"
name: orders
columns:
  - label: id
    type:
      kind: increment
      zerofill: 4
  - label: color
    type:
      kind: lookup
      schema: colors
      field: name
"#;

const COLORS: &str = r#"
name: colors
columns:
  - label: name
    type:
      kind: text
"#;

#[tokio::test]
async fn load_dir_reads_yaml_schemas() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("orders.yaml"), ORDERS).unwrap();
    std::fs::write(tmp.path().join("colors.yaml"), COLORS).unwrap();
    std::fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

    let store = MemoryStore::new();
    let loaded = store.load_dir(tmp.path()).await.unwrap();
    assert_eq!(loaded, 2);

    let orders = store.load_schema("orders").await.unwrap();
    let id = orders.find_column("id").unwrap();
    assert_eq!(id.field_type(), &FieldType::Increment { zerofill: 4 });
    assert_eq!(id.full_qualified_label(), "orders.id");
}

#[tokio::test]
async fn load_dir_skips_invalid_definitions() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("colors.yaml"), COLORS).unwrap();
    std::fs::write(tmp.path().join("broken.yaml"), "name: [unterminated").unwrap();
    std::fs::write(
        tmp.path().join("dupes.yaml"),
        "name: dupes\ncolumns:\n  - label: a\n    type: {kind: text}\n  - label: a\n    type: {kind: text}\n",
    )
    .unwrap();

    let store = MemoryStore::new();
    assert_eq!(store.load_dir(tmp.path()).await.unwrap(), 1);
    assert!(matches!(
        store.load_schema("dupes").await,
        Err(SchemaError::UnknownTable { .. })
    ));
}

#[tokio::test]
async fn load_missing_dir_errors() {
    let tmp = TempDir::new().unwrap();
    let store = MemoryStore::new();
    let result = store.load_dir(tmp.path().join("nope")).await;
    assert!(matches!(result, Err(SchemaError::NotInitialized { .. })));
}

#[tokio::test]
async fn display_values_follow_column_type() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("orders.yaml"), ORDERS).unwrap();
    let store = MemoryStore::new();
    store.load_dir(tmp.path()).await.unwrap();

    let rid = store
        .insert("orders", [("id", "7"), ("color", r#"["3","Red"]"#)])
        .await
        .unwrap();
    let search = Search::new()
        .schema("orders")
        .column("id")
        .column("color")
        .filter(ROWID, rid.to_string(), Comparator::Eq);
    let rows = store.execute(&search).await.unwrap();
    assert_eq!(rows[0][0].value(), "7");
    assert_eq!(rows[0][0].display_value(), "0007");
    assert_eq!(rows[0][1].display_value(), "Red");
}
