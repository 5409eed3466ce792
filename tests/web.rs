//! Browser tests for the web-sys document adapter
//!
//! Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, MouseEvent, Node};

use sticky_vocab::dom::DocumentTree;
use sticky_vocab::terms::{TermMap, TermStore};
use sticky_vocab::web::tooltip::TooltipRenderer;
use sticky_vocab::web::WebDocument;
use sticky_vocab::{Highlighter, VocabConfig};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().and_then(|w| w.document()).expect("browser document")
}

/// Fresh container under <body> holding `html`
fn fixture(html: &str) -> (WebDocument, Node) {
    let document = document();
    let container = document.create_element("div").expect("create div");
    container.set_inner_html(html);
    document.body().expect("body").append_child(&container).expect("append");

    let renderer = TooltipRenderer::new(document.clone(), &VocabConfig::default());
    (WebDocument::new(document, renderer.handlers()), container.into())
}

fn store(pairs: &[(&str, &str)]) -> TermStore {
    TermStore::from_map(pairs.iter().map(|(t, d)| (t.to_string(), d.to_string())).collect::<TermMap>())
}

fn inner_html(node: &Node) -> String {
    node.dyn_ref::<Element>().map(|e| e.inner_html()).unwrap_or_default()
}

#[wasm_bindgen_test]
fn test_gravity_in_live_dom() {
    let (mut doc, root) = fixture("<p>Gravity pulls objects. Antigravity devices don't exist.</p>");
    let report = Highlighter::default()
        .reannotate(&mut doc, &root, &store(&[("gravity", "a force")]))
        .unwrap();

    assert_eq!(report.spans_created, 1);
    let spans = doc.elements_with_class(&root, "sticky-vocab-highlight");
    assert_eq!(spans.len(), 1);
    assert_eq!(doc.text_content(&spans[0]), "Gravity");
    assert_eq!(doc.attribute(&spans[0], "data-definition").as_deref(), Some("a force"));
}

#[wasm_bindgen_test]
fn test_remove_restores_markup() {
    let original = "<p>a <b>cat</b> and a dog</p>";
    let (mut doc, root) = fixture(original);
    let mut highlighter = Highlighter::default();
    highlighter
        .reannotate(&mut doc, &root, &store(&[("cat", "feline"), ("dog", "canine")]))
        .unwrap();
    assert_ne!(inner_html(&root), original);

    assert_eq!(highlighter.remove_highlights(&mut doc, &root), 2);
    assert_eq!(inner_html(&root), original);
}

#[wasm_bindgen_test]
fn test_editable_content_untouched() {
    let html = r#"<div contenteditable="true">cat</div><textarea>cat</textarea>"#;
    let (mut doc, root) = fixture(html);
    let report = Highlighter::default()
        .reannotate(&mut doc, &root, &store(&[("cat", "feline")]))
        .unwrap();
    assert_eq!(report.spans_created, 0);
    assert_eq!(inner_html(&root), html);
}

#[wasm_bindgen_test]
fn test_hover_shows_and_hides_definition() {
    let (mut doc, root) = fixture("<p>a cat</p>");
    Highlighter::default()
        .reannotate(&mut doc, &root, &store(&[("cat", "feline")]))
        .unwrap();
    let span = doc.elements_with_class(&root, "sticky-vocab-highlight")[0].clone();
    let tooltip = || {
        document()
            .query_selector(".sticky-vocab-definition-tooltip")
            .expect("selector")
    };

    span.dispatch_event(&MouseEvent::new("mouseenter").expect("event"))
        .expect("dispatch");
    assert_eq!(tooltip().and_then(|t| t.text_content()).as_deref(), Some("feline"));

    span.dispatch_event(&MouseEvent::new("mouseleave").expect("event"))
        .expect("dispatch");
    assert!(tooltip().is_none());
}
