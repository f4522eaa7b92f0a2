use std::collections::HashSet;
use std::sync::Arc;

use structform_field::{FieldEngine, HtmlForm, RenderParams};
use structform_schema::MemoryStore;
use structform_test_utils::{fixture_store, schema_dir};

async fn render(engine: &FieldEngine, args: &[&str], submitted: Option<&str>) -> (String, String) {
    let (mut field, _) = engine.initialize(args).await;
    if let Some(submitted) = submitted {
        engine.set_value(&mut field, submitted).await;
    }
    let mut params = RenderParams::new("f");
    let mut form = HtmlForm::new("form1");
    engine.render_field(&field, &mut params, &mut form);
    let html = form.elements().concat();
    (html, params.class.unwrap_or_default())
}

#[tokio::test]
async fn error_class_follows_last_submission() {
    let engine = FieldEngine::from_store(fixture_store().await);

    let (html, class) = render(&engine, &["struct_field", "orders.amount"], Some("x")).await;
    assert_eq!(class, "bureaucracy_error");
    assert!(html.contains("<label class=\"bureaucracy_error\""));

    let (html, class) = render(&engine, &["struct_field", "orders.amount"], Some("12")).await;
    assert!(class.is_empty());
    assert!(!html.contains("bureaucracy_error"));
    assert!(html.contains("value=\"12\""));
}

#[tokio::test]
async fn label_hint_and_required_marker() {
    let engine = FieldEngine::from_store(fixture_store().await);

    let (html, _) = render(&engine, &["struct_field", "orders.title"], None).await;
    assert!(html.contains("data-column=\"orders.title\""));
    assert!(html.contains("<span class=\"label hashint\" title=\"Short summary\">title <sup>*</sup></span>"));

    let (html, _) = render(&engine, &["struct_field", "orders.title", "!"], None).await;
    assert!(!html.contains("<sup>*</sup>"));

    let (html, _) = render(&engine, &["struct_field", "orders.amount"], None).await;
    assert!(html.contains("<span class=\"label \" title=\"\">amount"));
}

#[tokio::test]
async fn opens_fieldset_once_and_ids_are_unique() {
    let engine = FieldEngine::from_store(fixture_store().await);
    let (field, _) = engine.initialize(&["struct_field", "orders.title"]).await;

    let mut form = HtmlForm::new("form1");
    for name in ["a", "b", "c"] {
        engine.render_field(&field, &mut RenderParams::new(name), &mut form);
    }
    assert_eq!(form.fieldset_count(), 1);

    let ids: HashSet<String> = form
        .elements()
        .iter()
        .map(|html| {
            let start = html.find("for=\"").unwrap() + 5;
            let end = html[start..].find('"').unwrap() + start;
            html[start..end].to_string()
        })
        .collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.iter().all(|id| id.starts_with("struct__")));
}

#[tokio::test]
async fn degraded_field_renders_nothing() {
    let engine = FieldEngine::from_store(fixture_store().await);
    let (html, _) = render(&engine, &["struct_field", "orders.nope"], Some("1")).await;
    assert!(html.is_empty());
}

#[tokio::test]
async fn lookup_and_multi_editors() {
    let engine = FieldEngine::from_store(fixture_store().await);

    let (html, _) = render(&engine, &["struct_field", "orders.color"], Some("2")).await;
    assert!(html.contains("<select name=\"f\" class=\"struct_lookup\""));
    assert!(html.contains("data-schema=\"colors\""));
    assert!(html.contains("<option value=\"1\">Red</option>"));
    assert!(html.contains("<option value=\"2\" selected=\"selected\">Blue</option>"));
    assert!(!html.contains("<input "));

    let (html, _) = render(&engine, &["struct_field", "orders.sizes"], Some("1, 2")).await;
    assert!(html.contains("multiple=\"multiple\""));
    assert!(html.contains("<option value=\"1\" selected=\"selected\">Red</option>"));
    assert!(html.contains("<option value=\"2\" selected=\"selected\">Blue</option>"));

    let (html, _) = render(&engine, &["struct_field", "orders.tags"], Some("a, b,")).await;
    assert!(html.contains("<div class=\"multiwrap\">"));
    assert!(html.contains("value=\"a, b\""));
    assert!(html.contains("<small>Separate multiple values with commas.</small>"));
}

#[tokio::test]
async fn configured_language_and_classes() {
    let dir = schema_dir([("structform.yaml", "lang: de\nerror_class: invalid\n")]);
    let engine = FieldEngine::from_store(fixture_store().await)
        .load_config(Some(&dir.path().join("structform.yaml")))
        .unwrap();
    assert_eq!(engine.config().lang, "de");

    let (html, class) = render(&engine, &["struct_field", "orders.title"], Some("")).await;
    assert_eq!(class, "invalid");
    assert!(html.contains(">Titel <sup>*</sup></span>"));
    // No German hint is defined.
    assert!(html.contains("<span class=\"label \" title=\"\">"));
}

#[tokio::test]
async fn renders_schema_loaded_from_yaml() {
    let dir = schema_dir([(
        "tickets.yaml",
        r#"
name: tickets
columns:
  - label: number
    type:
      kind: increment
      zerofill: 5
    labels:
      en: Ticket number
    hints:
      en: Assigned on save
"#,
    )]);
    let store = Arc::new(MemoryStore::new());
    assert_eq!(store.load_dir(dir.path()).await.unwrap(), 1);

    let engine = FieldEngine::from_store(store);
    let (html, _) = render(&engine, &["struct_field", "tickets.number"], Some("")).await;
    assert!(html.contains("title=\"Assigned on save\">Ticket number"));
    assert!(html.contains("class=\"struct_increment\""));
    assert!(html.contains("value=\"1\""));
}
