//! Annotation pass contract tests
//!
//! Each test drives the full remove/compile/annotate pipeline over an
//! in-memory document and checks the resulting markup.

use super::fixtures::*;
use crate::annotate::Highlighter;
use crate::dom::{DocumentTree, HoverListener};

// ============================================================================
// Matching
// ============================================================================

#[test]
fn test_gravity_scenario() {
    let (doc, report) = annotate(
        "<p>Gravity pulls objects. Antigravity devices don't exist.</p>",
        &[("gravity", "a force")],
    );

    assert_eq!(
        doc.inner_html(doc.body()),
        "<p><span class=\"sticky-vocab-highlight\" data-definition=\"a force\">Gravity</span> \
         pulls objects. Antigravity devices don't exist.</p>"
    );
    assert_eq!(report.spans_created, 1);
    assert_eq!(report.terms, 1);
}

#[test]
fn test_longest_match_wins() {
    let (doc, _) = annotate("<p>I visited New York</p>", &[("New", "n"), ("New York", "city")]);
    let spans = highlights(&doc);
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].matched_text, "New York");
    assert_eq!(spans[0].definition, "city");
}

#[test]
fn test_whole_words_only() {
    let (doc, report) = annotate("<p>category and concatenate</p>", &[("cat", "feline")]);
    assert_eq!(report.spans_created, 0);
    assert_eq!(doc.inner_html(doc.body()), "<p>category and concatenate</p>");
}

#[test]
fn test_case_fallback_resolves_definition() {
    let (doc, _) = annotate("<p>Paris in spring</p>", &[("paris", "capital of France")]);
    let spans = highlights(&doc);
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].matched_text, "Paris");
    assert_eq!(spans[0].definition, "capital of France");
}

#[test]
fn test_matches_across_nested_formatting() {
    let (doc, report) = annotate(
        "<div><p>The <em>cat</em> saw a <strong>dog</strong>.</p><ul><li>cat</li></ul></div>",
        &[("cat", "feline"), ("dog", "canine")],
    );
    assert_eq!(matched_texts(&doc), vec!["cat", "dog", "cat"]);
    assert_eq!(report.text_nodes_annotated, 3);
}

#[test]
fn test_every_span_has_one_pair_of_hover_handlers() {
    let (doc, _) = annotate("<p>cat cat cat</p>", &[("cat", "feline")]);
    let spans = doc.elements_with_class(&doc.body(), HIGHLIGHT);
    assert_eq!(spans.len(), 3);
    for span in spans {
        assert_eq!(doc.listeners(span), &[HoverListener::Enter, HoverListener::Leave]);
    }
}

// ============================================================================
// Exclusions
// ============================================================================

#[test]
fn test_script_and_style_untouched() {
    let html = "<script>var cat = 1;</script><style>.cat { }</style><p>cat</p>";
    let (doc, report) = annotate(html, &[("cat", "feline")]);
    assert_eq!(report.spans_created, 1);

    let script = doc.find_element(doc.body(), "script").unwrap();
    assert_eq!(doc.inner_html(script), "var cat = 1;");
}

#[test]
fn test_editable_and_form_fields_untouched() {
    let html = r#"<div contenteditable="true">cat</div><textarea>cat</textarea><div role="textbox">cat</div><button>cat</button>"#;
    let (doc, report) = annotate(html, &[("cat", "feline")]);
    assert_eq!(report.spans_created, 0);
    assert_eq!(doc.inner_html(doc.body()), html);
}

#[test]
fn test_ignore_attribute_excludes_subtree() {
    let (doc, _) = annotate(
        "<nav data-highlight-ignore><p>cat</p></nav><p>cat</p>",
        &[("cat", "feline")],
    );
    let nav = doc.find_element(doc.body(), "nav").unwrap();
    assert!(doc.elements_with_class(&nav, HIGHLIGHT).is_empty());
    assert_eq!(highlights(&doc).len(), 1);
}

#[test]
fn test_extension_ui_is_never_annotated() {
    let html = r#"<div class="sticky-vocab-popup"><h3>cat</h3></div><div class="sticky-vocab-definition-tooltip">cat</div>"#;
    let (doc, report) = annotate(html, &[("cat", "feline")]);
    assert_eq!(report.spans_created, 0);
    assert_eq!(doc.inner_html(doc.body()), html);
}

// ============================================================================
// Idempotence and failures
// ============================================================================

#[test]
fn test_second_annotate_pass_changes_nothing() {
    let mut doc = page("<p>a cat and a dog</p>");
    let body = doc.body();
    let terms = store(&[("cat", "feline"), ("dog", "canine")]);
    let mut highlighter = Highlighter::default();

    highlighter.annotate(&mut doc, &body, &terms).unwrap();
    let once = doc.inner_html(body);
    let second = highlighter.annotate(&mut doc, &body, &terms).unwrap();

    assert_eq!(second.spans_created, 0);
    assert_eq!(doc.inner_html(body), once);
}

#[test]
fn test_failed_node_does_not_stop_siblings() {
    let mut doc = page("<p>cat one</p><p>cat two</p><p>cat three</p>");
    let body = doc.body();
    let second = doc.children(body)[1];
    let poisoned = doc.children(second)[0];
    doc.poison(poisoned);

    let report = Highlighter::default()
        .reannotate(&mut doc, &body, &store(&[("cat", "feline")]))
        .unwrap();

    assert_eq!(report.errors, 1);
    assert_eq!(report.spans_created, 2);
    assert_eq!(doc.inner_html(second), "cat two");
}

#[test]
fn test_empty_dictionary_is_a_noop() {
    let (doc, report) = annotate("<p>anything</p>", &[]);
    assert_eq!(report.spans_created, 0);
    assert_eq!(doc.inner_html(doc.body()), "<p>anything</p>");
}
