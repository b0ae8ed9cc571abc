use pagediff_rs::{
    diff_documents, json_diff, parse_html, parse_json, parse_xml, text_diff, xml_diff,
    DiffConfig, DiffError, DiffOutcome, DiffSet, Document, DocumentKind, ExclusionSet, Node,
};
use proptest::prelude::*;

fn json(text: &str) -> Node {
    parse_json(text).unwrap()
}

fn set(items: &[&str]) -> DiffSet {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_json_identical() {
    let doc = json(r#"{"a": {"b": [1, 2, {"c": null}]}, "d": "x"}"#);
    let diff = json_diff(&doc, &doc, &DiffConfig::default()).unwrap();
    assert!(diff.is_empty());
}

#[test]
fn test_json_key_order_is_not_a_change() {
    let a = json(r#"{"a": 1, "b": {"x": 1, "y": 2}}"#);
    let b = json(r#"{"b": {"y": 2, "x": 1}, "a": 1}"#);
    assert!(json_diff(&a, &b, &DiffConfig::default()).unwrap().is_empty());
}

#[test]
fn test_json_collapses_to_deepest_location() {
    let a = json(r#"{"a": {"b": 1}}"#);
    let b = json(r#"{"a": {"b": 2}}"#);
    let diff = json_diff(&a, &b, &DiffConfig::default()).unwrap();
    assert_eq!(diff, set(&["a.b"]));
    assert!(!diff.contains("a"));
}

#[test]
fn test_json_sibling_changes_reported_separately() {
    let a = json(r#"{"a": {"b": 1, "c": 2, "d": 3}, "e": [1, 2]}"#);
    let b = json(r#"{"a": {"b": 9, "c": 2, "d": 9}, "e": [1, 3]}"#);
    let diff = json_diff(&a, &b, &DiffConfig::default()).unwrap();
    assert_eq!(diff, set(&["a.b", "a.d", "e[1]"]));
}

#[test]
fn test_json_missing_key_is_a_change() {
    let diff = json_diff(&json(r#"{"a": 1}"#), &json("{}"), &DiffConfig::default()).unwrap();
    assert_eq!(diff, set(&["a"]));
}

#[test]
fn test_json_added_key_is_not_reported() {
    // Only locations of the baseline are visited.
    let diff = json_diff(
        &json(r#"{"a": 1}"#),
        &json(r#"{"a": 1, "b": 2}"#),
        &DiffConfig::default(),
    )
    .unwrap();
    assert!(diff.is_empty());
}

#[test]
fn test_json_type_change_is_a_change() {
    let a = json(r#"{"a": {"b": 1}, "n": 1}"#);
    let b = json(r#"{"a": [1], "n": "1"}"#);
    let diff = json_diff(&a, &b, &DiffConfig::default()).unwrap();
    assert_eq!(diff, set(&["a.b", "n"]));
}

#[test]
fn test_json_shrunk_array() {
    let diff = json_diff(&json("[1, 2, 3]"), &json("[1]"), &DiffConfig::default()).unwrap();
    assert_eq!(diff, set(&["[1]", "[2]"]));
}

#[test]
fn test_json_sign_token_suppression() {
    let a = json(r#"{"t": "2024-01-01"}"#);
    let b = json(r#"{"t": "2024-01-02"}"#);
    let config = DiffConfig::default().with_sign_token("2024");
    assert!(json_diff(&a, &b, &config).unwrap().is_empty());
    assert_eq!(
        json_diff(&a, &b, &DiffConfig::default()).unwrap(),
        set(&["t"])
    );
}

#[test]
fn test_json_sign_token_checks_new_value() {
    let a = json(r#"{"id": "req-1", "n": 5}"#);
    let b = json(r#"{"id": "other", "n": 6}"#);
    let config = DiffConfig::default().with_sign_token("req-");
    assert_eq!(json_diff(&a, &b, &config).unwrap(), set(&["id", "n"]));
}

#[test]
fn test_json_sign_token_does_not_apply_to_containers() {
    let a = json(r#"{"list": [1]}"#);
    let b = json(r#"{"list": ["2024"]}"#);
    let config = DiffConfig::default().with_sign_token("2024");
    assert_eq!(json_diff(&a, &b, &config).unwrap(), set(&["list"]));
}

#[test]
fn test_json_exclusions() {
    let a = json(r#"{"x": 1, "y": 1}"#);
    let b = json(r#"{"x": 2, "y": 2}"#);
    let config = DiffConfig::default().with_exclusions(ExclusionSet::new().exclude("x"));
    assert_eq!(json_diff(&a, &b, &config).unwrap(), set(&["y"]));
}

#[test]
fn test_json_exclusion_applies_after_collapsing() {
    // Excluding the ancestor does not hide the descendant that replaced it.
    let a = json(r#"{"a": {"b": 1}}"#);
    let b = json(r#"{"a": {"b": 2}}"#);
    let config = DiffConfig::default().with_exclusions(ExclusionSet::new().exclude("a"));
    assert_eq!(json_diff(&a, &b, &config).unwrap(), set(&["a.b"]));
}

#[test]
fn test_json_ignore_pattern() {
    let a = json(r#"{"meta": {"generated": 1}, "items": [{"id": 1, "v": 1}]}"#);
    let b = json(r#"{"meta": {"generated": 2}, "items": [{"id": 2, "v": 2}]}"#);
    let exclusions = ExclusionSet::new().ignore("**.generated").ignore("items[*].id");
    let config = DiffConfig::default().with_exclusions(exclusions);
    assert_eq!(json_diff(&a, &b, &config).unwrap(), set(&["items[0].v"]));
}

#[test]
fn test_json_quoted_locations() {
    let a = json(r#"{"a.b": 1, "c d": {"e": 1}}"#);
    let b = json(r#"{"a.b": 2, "c d": {"e": 2}}"#);
    let diff = json_diff(&a, &b, &DiffConfig::default()).unwrap();
    assert_eq!(diff, set(&["\"a.b\"", "\"c d\".e"]));
}

#[test]
fn test_json_depth_limit_is_unavailable() {
    let a = json(r#"{"a": {"b": {"c": 1}}}"#);
    let config = DiffConfig::default().with_max_depth(3);
    assert_eq!(
        json_diff(&a, &a, &config),
        Err(DiffError::TooDeep { limit: 3 })
    );
}

#[test]
fn test_xml_identical() {
    let doc = parse_xml(r#"<feed><entry id="1"><title>A</title></entry></feed>"#).unwrap();
    assert!(xml_diff(&doc, &doc, &DiffConfig::default()).unwrap().is_empty());
}

#[test]
fn test_xml_reparse_and_attribute_order_are_not_changes() {
    let a = parse_xml(r#"<r><e a="1" b="2">x</e></r>"#).unwrap();
    let b = parse_xml("<r>\n  <e b=\"2\" a=\"1\">x</e>\n</r>").unwrap();
    assert!(xml_diff(&a, &b, &DiffConfig::default()).unwrap().is_empty());
}

#[test]
fn test_xml_changed_text_collapses_to_element() {
    let a = parse_xml("<r><a><b>1</b></a><c>x</c></r>").unwrap();
    let b = parse_xml("<r><a><b>2</b></a><c>x</c></r>").unwrap();
    let diff = xml_diff(&a, &b, &DiffConfig::default()).unwrap();
    assert_eq!(diff, set(&["/r/a/b"]));
}

#[test]
fn test_xml_attribute_change() {
    let a = parse_xml(r#"<r><a href="/x"/><a href="/y"/></r>"#).unwrap();
    let b = parse_xml(r#"<r><a href="/x"/><a href="/z"/></r>"#).unwrap();
    let diff = xml_diff(&a, &b, &DiffConfig::default()).unwrap();
    assert_eq!(diff, set(&["/r/a[2]"]));
}

#[test]
fn test_xml_removed_element() {
    let a = parse_xml("<r><p>1</p><p>2</p></r>").unwrap();
    let b = parse_xml("<r><p>1</p></r>").unwrap();
    let diff = xml_diff(&a, &b, &DiffConfig::default()).unwrap();
    assert_eq!(diff, set(&["/r/p[2]"]));
}

#[test]
fn test_html_page_with_inline_script_is_idempotent() {
    let page = parse_html(
        "<html><head><script>if (a < b[0]) {}</script>\
         <script>for (i=0;i<arr[0].length;i++) {}</script></head>\
         <body><p>x</p></body></html>",
    )
    .unwrap();
    assert_eq!(xml_diff(&page, &page, &DiffConfig::default()), Ok(DiffSet::new()));
}

#[test]
fn test_html_script_change_reported_on_script_element() {
    let a = parse_html("<html><head><script>if (a < b[0]) {}</script></head></html>").unwrap();
    let b = parse_html("<html><head><script>if (a < b[1]) {}</script></head></html>").unwrap();
    let diff = xml_diff(&a, &b, &DiffConfig::default()).unwrap();
    assert_eq!(diff, set(&["/html/head/script"]));
}

#[test]
fn test_xml_ignores_sign_tokens() {
    let a = parse_xml("<r><t>2024-01-01</t></r>").unwrap();
    let b = parse_xml("<r><t>2024-01-02</t></r>").unwrap();
    let config = DiffConfig::default().with_sign_token("2024");
    assert_eq!(xml_diff(&a, &b, &config).unwrap(), set(&["/r/t"]));
}

#[test]
fn test_xml_exclusions() {
    let a = parse_html("<html><body><div>ad 1</div><p>news</p></body></html>").unwrap();
    let b = parse_html("<html><body><div>ad 2</div><p>more news</p></body></html>").unwrap();
    let config =
        DiffConfig::default().with_exclusions(ExclusionSet::new().exclude("/html/body/div"));
    assert_eq!(xml_diff(&a, &b, &config).unwrap(), set(&["/html/body/p"]));
}

#[test]
fn test_text_added_word() {
    let diff = text_diff("the cat sat", "the cat sat quietly", &DiffConfig::default());
    assert_eq!(diff, set(&["quietly"]));
}

#[test]
fn test_text_identical() {
    assert!(text_diff("a b c", "a b c", &DiffConfig::default()).is_empty());
}

#[test]
fn test_text_whitespace_is_not_a_change() {
    assert!(text_diff("a  b\nc", "a b c\n", &DiffConfig::default()).is_empty());
}

#[test]
fn test_text_removed_words_are_not_reported() {
    assert!(text_diff("a b c d", "a c", &DiffConfig::default()).is_empty());
}

#[test]
fn test_text_replaced_word() {
    let diff = text_diff("price 10 EUR", "price 12 EUR", &DiffConfig::default());
    assert_eq!(diff, set(&["12"]));
}

#[test]
fn test_text_exclusions_and_sign_tokens() {
    let config = DiffConfig::default()
        .with_exclusions(ExclusionSet::new().exclude("quietly"))
        .with_sign_token("loud");
    let diff = text_diff("the cat", "the cat quietly loudly", &config);
    assert_eq!(diff, set(&["loudly"]));
}

#[test]
fn test_dispatch_type_mismatch_passes_through() {
    let a = Document::Json(json(r#"{"a": 1}"#));
    let b = Document::Text("plain body".to_string());
    let outcome = diff_documents(&a, &b, &DiffConfig::default()).unwrap();
    assert_eq!(outcome, DiffOutcome::PassThrough(&b));
    assert!(!outcome.is_empty());
}

#[test]
fn test_dispatch_picks_engine() {
    let a = Document::Text("a".to_string());
    let b = Document::Text("a b".to_string());
    let outcome = diff_documents(&a, &b, &DiffConfig::default()).unwrap();
    assert_eq!(
        outcome,
        DiffOutcome::Changes {
            kind: DocumentKind::Text,
            diff: set(&["b"]),
        }
    );
}

#[test]
fn test_dispatch_unavailable_is_not_empty_diff() {
    let a = Document::Json(json(r#"[[[[1]]]]"#));
    let config = DiffConfig::default().with_max_depth(2);
    assert!(matches!(
        diff_documents(&a, &a, &config),
        Err(DiffError::TooDeep { limit: 2 })
    ));
}

fn arb_node() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        Just(Node::Null),
        any::<bool>().prop_map(Node::Bool),
        (-1000i32..1000).prop_map(|n| Node::Number(n as f64)),
        "[a-z .\"']{0,6}".prop_map(Node::String),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Node::Array),
            prop::collection::vec(("[a-z .\\[\\]\"$]{0,4}", inner), 0..4)
                .prop_map(|entries| Node::Object(entries.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_json_diff_idempotent(node in arb_node()) {
        let diff = json_diff(&node, &node, &DiffConfig::default()).unwrap();
        prop_assert!(diff.is_empty());
    }

    #[test]
    fn prop_text_diff_idempotent(words in prop::collection::vec("[a-z]{1,5}", 0..20)) {
        let text = words.join(" ");
        prop_assert!(text_diff(&text, &text, &DiffConfig::default()).is_empty());
    }

    #[test]
    fn prop_json_diff_against_empty_object_reports_every_key(
        keys in prop::collection::hash_set("[a-z]{1,4}", 1..6)
    ) {
        let object = Node::Object(keys.iter().map(|k| (k.clone(), Node::Bool(true))).collect());
        let empty = Node::Object(Default::default());
        let diff = json_diff(&object, &empty, &DiffConfig::default()).unwrap();
        prop_assert_eq!(diff.len(), keys.len());
    }
}
