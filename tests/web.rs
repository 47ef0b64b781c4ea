//! Tests for the JavaScript facade, run with `wasm-pack test --node`.

#![cfg(target_arch = "wasm32")]

use family_tree_wasm::FamilyTreeWasm;
use js_sys::JSON;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

fn js(text: &str) -> JsValue {
    JSON::parse(text).unwrap()
}

fn sample() -> FamilyTreeWasm {
    FamilyTreeWasm::new(
        js(r#"{"Alice": [["Bob", "Carol"], ["Dave"]], "Eve": [["Frank"]]}"#),
        js(r#"{"rootLabel": "Root"}"#),
    )
    .unwrap()
}

#[wasm_bindgen_test]
fn builds_from_object() {
    let tree = sample();
    assert_eq!(tree.root_label(), "Root");
    assert_eq!(tree.node_count(), 7);
    assert_eq!(tree.edge_count(), 6);
    assert_eq!(tree.branch_options(), vec!["All", "Alice", "Eve"]);
}

#[wasm_bindgen_test]
fn builds_from_pairs_with_default_config() {
    let tree = FamilyTreeWasm::new(js(r#"[["Eve", [["Frank", null, 3]]]]"#), JsValue::UNDEFINED).unwrap();
    assert_eq!(tree.root_label(), "Henrietta & Edmond");
    assert_eq!(tree.node_count(), 4);
}

#[wasm_bindgen_test]
fn rejects_malformed_tables() {
    assert!(FamilyTreeWasm::new(js("42"), JsValue::NULL).is_err());
}

#[wasm_bindgen_test]
fn view_exposes_positions_and_hit_testing() {
    let tree = sample();
    let view = tree.view("Eve", JsValue::NULL).unwrap();

    assert_eq!(view.nodes(), vec!["Root", "Eve", "Frank"]);
    assert_eq!(view.layout_kind(), "hierarchical");
    assert!(view.failure().is_none());

    let positions = view.positions().to_vec();
    assert_eq!(positions.len(), 6);
    assert_eq!((positions[0], positions[1]), (0.5, 0.0));

    assert_eq!(view.person_at(0.5, 0.0, 0.01).as_deref(), Some("Root"));
    assert!(view.to_js().is_ok());
}

#[wasm_bindgen_test]
fn view_reports_fallback() {
    let tree = sample();
    let view = tree.view("All", js(r#"{"maxDepth": 0}"#)).unwrap();

    assert_eq!(view.layout_kind(), "fallback");
    assert!(view.failure().is_some());
}
