//! HighlightRemover: unwraps annotation spans back into plain text

use crate::dom::DocumentTree;
use crate::error::DomError;

pub struct HighlightRemover<'a> {
    highlight_class: &'a str,
}

impl<'a> HighlightRemover<'a> {
    pub fn new(highlight_class: &'a str) -> Self {
        Self { highlight_class }
    }

    /// Replace every span under `root` with its text and re-merge the text
    /// around it. Detached spans are skipped. Returns the number unwrapped.
    pub fn remove<D: DocumentTree>(&self, doc: &mut D, root: &D::Node) -> usize {
        let spans = doc.elements_with_class(root, self.highlight_class);
        if spans.is_empty() {
            return 0;
        }

        let mut removed = 0;
        for span in spans {
            let parent = match doc.parent(&span) {
                Some(parent) => parent,
                None => continue,
            };
            match unwrap_span(doc, &span, &parent) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("[HighlightRemover] could not unwrap {:?}: {}", span, e),
            }
        }

        log::debug!("[HighlightRemover] removed {} highlights", removed);
        removed
    }
}

fn unwrap_span<D: DocumentTree>(doc: &mut D, span: &D::Node, parent: &D::Node) -> Result<(), DomError> {
    let text = doc.text_content(span);
    let replacement = doc.create_text(&text)?;
    doc.replace_with(span, &[replacement])?;
    doc.normalize(parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ArenaDocument;

    const CLASS: &str = "sticky-vocab-highlight";

    #[test]
    fn test_unwraps_and_merges_text() {
        let mut doc = ArenaDocument::parse_fragment(
            r#"<p>a <span class="sticky-vocab-highlight" data-definition="f">cat</span> here</p>"#,
        )
        .unwrap();
        let body = doc.body();
        assert_eq!(HighlightRemover::new(CLASS).remove(&mut doc, &body), 1);

        let p = doc.find_element(body, "p").unwrap();
        assert_eq!(doc.inner_html(body), "<p>a cat here</p>");
        assert_eq!(doc.text_child_count(p), 1);
    }

    #[test]
    fn test_no_spans_is_noop() {
        let mut doc = ArenaDocument::parse_fragment("<p>plain</p>").unwrap();
        let body = doc.body();
        assert_eq!(HighlightRemover::new(CLASS).remove(&mut doc, &body), 0);
        assert_eq!(doc.inner_html(body), "<p>plain</p>");
    }

    #[test]
    fn test_leaves_foreign_spans_alone() {
        let html = r#"<p><span class="other">x</span></p>"#;
        let mut doc = ArenaDocument::parse_fragment(html).unwrap();
        let body = doc.body();
        assert_eq!(HighlightRemover::new(CLASS).remove(&mut doc, &body), 0);
        assert_eq!(doc.inner_html(body), html);
    }
}
