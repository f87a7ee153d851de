//! Source detection.

use deckify_core::{Document, DocumentTree, SourceType};
use deckify_markdown::{has_markdown_extension, is_rendered_markdown};
use deckify_notion::is_notion_document;
use url::Url;

/// Hosts that serve Markdown files as plain text.
const RAW_MARKDOWN_HOSTS: &[&str] = &["raw.githubusercontent.com", "gist.githubusercontent.com"];

/// Work out what kind of document `doc` is.
///
/// Checks run in order: the URL host, the URL's file extension, then
/// marker classes in the document itself. `None` means the page is not a
/// supported source, which is an ordinary outcome.
pub fn detect(doc: &dyn DocumentTree, url: &str) -> Option<SourceType> {
    let parsed = Url::parse(url).ok();

    if let Some(source) = parsed
        .as_ref()
        .and_then(|u| u.host_str())
        .and_then(detect_from_host)
    {
        return Some(source);
    }

    let path = parsed.as_ref().map_or(url, |u| u.path());
    if has_markdown_extension(path) {
        return Some(if is_rendered_markdown(doc) {
            SourceType::RenderedMarkdown
        } else {
            SourceType::RawMarkdown
        });
    }

    if is_notion_document(doc) {
        Some(SourceType::Notion)
    } else if is_rendered_markdown(doc) {
        Some(SourceType::RenderedMarkdown)
    } else {
        None
    }
}

fn detect_from_host(host: &str) -> Option<SourceType> {
    let host = host.to_ascii_lowercase();
    if host == "notion.so"
        || host == "notion.site"
        || host.ends_with(".notion.so")
        || host.ends_with(".notion.site")
    {
        return Some(SourceType::Notion);
    }
    if RAW_MARKDOWN_HOSTS.contains(&host.as_str()) {
        return Some(SourceType::RawMarkdown);
    }
    None
}

/// Build a document from page content.
///
/// Markup is parsed as HTML; Markdown files that arrive as bare text are
/// wrapped the way a browser shows text files.
pub fn load_document(content: &str, url: &str) -> Document {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    let is_markup = content.trim_start().starts_with('<');
    if !is_markup && has_markdown_extension(&path) {
        Document::from_plain_text(content)
    } else {
        Document::parse_html(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckify_core::Marker;

    fn html(body: &str) -> Document {
        Document::parse_html(body)
    }

    #[test]
    fn test_notion_hosts() {
        let doc = html("<p>x</p>");
        for url in [
            "https://www.notion.so/team/Page-123",
            "https://notion.so/Page",
            "https://acme.notion.site/Roadmap-abc",
        ] {
            assert_eq!(detect(&doc, url), Some(SourceType::Notion), "{url}");
        }
    }

    #[test]
    fn test_raw_hosts() {
        let doc = Document::from_plain_text("# Title");
        assert_eq!(
            detect(&doc, "https://raw.githubusercontent.com/o/r/main/README.md"),
            Some(SourceType::RawMarkdown)
        );
        assert_eq!(
            detect(&doc, "https://gist.githubusercontent.com/u/1/raw/notes.txt"),
            Some(SourceType::RawMarkdown)
        );
    }

    #[test]
    fn test_markdown_extension() {
        let rendered = html(r#"<article class="markdown-body"><h1>A</h1></article>"#);
        let raw = Document::from_plain_text("# A");
        let url = "https://github.com/o/r/blob/main/docs/guide.md";
        assert_eq!(detect(&rendered, url), Some(SourceType::RenderedMarkdown));
        assert_eq!(detect(&raw, url), Some(SourceType::RawMarkdown));
        assert_eq!(detect(&raw, "notes/talk.markdown"), Some(SourceType::RawMarkdown));
    }

    #[test]
    fn test_dom_markers() {
        let notion = html(r#"<div class="notion-page-content"></div>"#);
        assert_eq!(detect(&notion, "https://example.com/"), Some(SourceType::Notion));
        let rendered = html(r#"<div class="markdown-body"></div>"#);
        assert_eq!(detect(&rendered, "https://example.com/"), Some(SourceType::RenderedMarkdown));
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(detect(&html("<p>Hello</p>"), "https://example.com/"), None);
        assert_eq!(detect(&html(""), ""), None);
    }

    #[test]
    fn test_load_document() {
        let doc = load_document("# Title\n\n<b>not html</b>", "talk.md");
        let pre = doc.find_first(doc.root(), &[Marker::Tag("pre")]).unwrap();
        assert_eq!(doc.text(pre), "# Title\n\n<b>not html</b>");

        let doc = load_document("<h1>Title</h1>", "https://example.com/page");
        assert!(doc.find_first(doc.root(), &[Marker::Tag("h1")]).is_some());
    }
}
