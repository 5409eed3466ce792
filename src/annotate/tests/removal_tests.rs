//! Removal and reannotation round-trip tests

use super::fixtures::*;
use crate::annotate::Highlighter;
use crate::dom::DocumentTree;

#[test]
fn test_remove_restores_original_text() {
    let original = "<p>Gravity pulls <b>objects</b>. Gravity again.</p>";
    let (mut doc, _) = annotate(original, &[("gravity", "a force"), ("objects", "things")]);
    let body = doc.body();

    let removed = Highlighter::default().remove_highlights(&mut doc, &body);
    assert_eq!(removed, 3);
    assert_eq!(doc.inner_html(body), original);
}

#[test]
fn test_remove_then_reannotate_round_trip() {
    let (mut doc, _) = annotate("<p>a cat and a dog</p>", &[("cat", "feline"), ("dog", "canine")]);
    let body = doc.body();
    let text_before = doc.text_content(&body);
    let markup_before = doc.inner_html(body);

    let terms = store(&[("cat", "feline"), ("dog", "canine")]);
    let report = Highlighter::default().reannotate(&mut doc, &body, &terms).unwrap();

    assert_eq!(report.removed, 2);
    assert_eq!(report.spans_created, 2);
    assert_eq!(doc.text_content(&body), text_before);
    assert_eq!(doc.inner_html(body), markup_before);
}

#[test]
fn test_removal_merges_text_nodes() {
    let (mut doc, _) = annotate("<p>one cat two cat three</p>", &[("cat", "feline")]);
    let body = doc.body();
    let p = doc.find_element(body, "p").unwrap();
    assert_eq!(doc.children(p).len(), 5);

    Highlighter::default().remove_highlights(&mut doc, &body);
    assert_eq!(doc.children(p).len(), 1);
    assert_eq!(doc.text_child_count(p), 1);
}

#[test]
fn test_deleting_a_term_removes_only_its_highlights() {
    let (mut doc, _) = annotate("<p>a cat and a dog</p>", &[("cat", "feline"), ("dog", "canine")]);
    let body = doc.body();

    let mut terms = store(&[("cat", "feline"), ("dog", "canine")]);
    terms.remove("cat");
    Highlighter::default().reannotate(&mut doc, &body, &terms).unwrap();

    assert_eq!(matched_texts(&doc), vec!["dog"]);
    assert_eq!(doc.text_content(&body), "a cat and a dog");
}

#[test]
fn test_updated_definition_is_picked_up() {
    let (mut doc, _) = annotate("<p>cat</p>", &[("cat", "feline")]);
    let body = doc.body();
    let mut highlighter = Highlighter::default();

    let mut terms = store(&[("cat", "feline")]);
    highlighter.reannotate(&mut doc, &body, &terms).unwrap();
    terms.save("cat", "a small domesticated carnivore");
    highlighter.reannotate(&mut doc, &body, &terms).unwrap();

    let spans = highlights(&doc);
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].definition, "a small domesticated carnivore");
}

#[test]
fn test_detached_span_is_skipped() {
    let (mut doc, _) = annotate("<p>cat</p>", &[("cat", "feline")]);
    let body = doc.body();
    let p = doc.find_element(body, "p").unwrap();
    doc.detach(p).unwrap();

    // Span no longer under the body, nothing to remove
    assert_eq!(Highlighter::default().remove_highlights(&mut doc, &body), 0);
}
