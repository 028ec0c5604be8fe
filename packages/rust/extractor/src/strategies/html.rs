//! Markup-to-text helpers shared by the direct and fallback tiers.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Elements the direct tier never reads text from.
pub(crate) const DIRECT_STRIP_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "form", "aside", "iframe", "noscript",
];

/// Elements the fallback tier never reads text from. Navigation is kept on purpose.
pub(crate) const FALLBACK_STRIP_TAGS: &[&str] = &["script", "style", "noscript"];

/// Class/id fragments that mark a content container.
static CONTENT_HINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"content|main|article|post").expect("valid regex"));

/// Text of the primary-content region, or of the whole document when no
/// region is found. Text under `DIRECT_STRIP_TAGS` is skipped either way.
pub(crate) fn main_content_text(doc: &Html) -> String {
    match find_main_region(doc, DIRECT_STRIP_TAGS) {
        Some(region) => text_excluding(region, DIRECT_STRIP_TAGS),
        None => document_text(doc, DIRECT_STRIP_TAGS),
    }
}

/// All document text except what sits under `strip` elements.
pub(crate) fn document_text(doc: &Html, strip: &[&str]) -> String {
    text_excluding(doc.root_element(), strip)
}

/// Locate the primary-content region: `<main>`, then `<article>`, then a
/// `<div>` whose class, then whose id, looks like a content container.
fn find_main_region<'a>(doc: &'a Html, strip: &[&str]) -> Option<ElementRef<'a>> {
    let main_sel = Selector::parse("main").expect("valid selector");
    let article_sel = Selector::parse("article").expect("valid selector");
    let div_sel = Selector::parse("div").expect("valid selector");

    doc.select(&main_sel)
        .find(|el| !is_stripped(el, strip))
        .or_else(|| doc.select(&article_sel).find(|el| !is_stripped(el, strip)))
        .or_else(|| {
            doc.select(&div_sel).find(|el| {
                !is_stripped(el, strip) && el.value().classes().any(|c| CONTENT_HINT_RE.is_match(c))
            })
        })
        .or_else(|| {
            doc.select(&div_sel).find(|el| {
                !is_stripped(el, strip)
                    && el.value().id().is_some_and(|id| CONTENT_HINT_RE.is_match(id))
            })
        })
}

/// Whether `el` sits inside (or is) one of the `strip` elements.
fn is_stripped(el: &ElementRef<'_>, strip: &[&str]) -> bool {
    strip.contains(&el.value().name())
        || el
            .ancestors()
            .filter_map(|node| node.value().as_element())
            .any(|e| strip.contains(&e.name()))
}

/// Concatenate the text nodes under `root`, skipping stripped subtrees.
fn text_excluding(root: ElementRef<'_>, strip: &[&str]) -> String {
    let mut out = String::new();

    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let stripped = node
            .ancestors()
            .filter_map(|a| a.value().as_element())
            .any(|e| strip.contains(&e.name()));
        if !stripped {
            out.push_str(text);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentgate_text::normalize;

    fn load_fixture(name: &str) -> Html {
        let path = format!("../../../fixtures/html/{name}");
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("missing fixture: {path}"));
        Html::parse_document(&content)
    }

    #[test]
    fn main_region_excludes_chrome_and_scripts() {
        let doc = load_fixture("article.html");
        let text = normalize(&main_content_text(&doc));

        assert!(text.starts_with("O mercado de cafés especiais cresce no Brasil"));
        assert!(text.contains("aumentou 18%"));
        assert!(text.contains("até 2026"));
        assert!(!text.contains("trackPageView"));
        assert!(!text.contains("newsletter"));
        assert!(!text.contains("Portal de Notícias"));
        assert!(!text.contains("Leia também"));
    }

    #[test]
    fn content_class_div_is_found() {
        let doc = load_fixture("content_div.html");
        let text = normalize(&main_content_text(&doc));

        assert!(text.contains("inside the post body container"));
        assert!(!text.contains("Promotional banner"));
        assert!(!text.contains("First comment"));
    }

    #[test]
    fn content_id_div_is_found() {
        let doc = load_fixture("id_region.html");
        let text = normalize(&main_content_text(&doc));

        assert_eq!(
            text,
            "Report paragraph found through the element id heuristic."
        );
    }

    #[test]
    fn no_region_falls_back_to_document() {
        let doc = load_fixture("no_region.html");
        let text = normalize(&main_content_text(&doc));

        assert!(text.contains("A plain page with no main"));
        assert!(text.contains("Every visible paragraph"));
        assert!(!text.contains("Site header line"));
        assert!(!text.contains("enable JavaScript"));
    }

    #[test]
    fn fallback_text_keeps_navigation() {
        let doc = load_fixture("nav_heavy.html");

        let direct = normalize(&main_content_text(&doc));
        assert_eq!(direct, "Short teaser only.");

        let fallback = normalize(&document_text(&doc, FALLBACK_STRIP_TAGS));
        assert!(fallback.contains("agriculture section"));
        assert!(fallback.contains("Short teaser only."));
        assert!(!fallback.contains("tracking pixel"));
    }

    #[test]
    fn region_inside_stripped_element_is_ignored() {
        let html = r#"<html><body>
            <header><main><p>Header-embedded main that must not be chosen</p></main></header>
            <article><p>The real article body lives in this element.</p></article>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let text = normalize(&main_content_text(&doc));
        assert_eq!(text, "The real article body lives in this element.");
    }
}
