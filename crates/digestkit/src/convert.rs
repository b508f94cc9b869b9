//! HTML to plain text conversion
//!
//! Documents are parsed with `scraper` (html5ever), so omitted end tags,
//! unquoted attributes and character references follow the HTML parsing
//! rules rather than a tag scanner's guesses.

use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Elements whose content is never visible text
const HIDDEN_ELEMENTS: &[&str] = &[
    "head", "title", "script", "style", "noscript", "template", "svg", "iframe", "object",
    "canvas",
];

/// Elements that sit on their own lines in the text output
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Longest entity name accepted between `&` and `;`
const MAX_ENTITY_LEN: usize = 10;

/// Check if content is HTML based on content type and body
pub fn is_html(content_type: Option<&str>, body: &str) -> bool {
    if let Some(ct) = content_type {
        let ct = ct.to_ascii_lowercase();
        if ct.contains("text/html") || ct.contains("application/xhtml") {
            return true;
        }
    }

    let head: String = body.trim_start().chars().take(15).collect();
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// Strip markup from an HTML document, keeping the visible text
///
/// Scripts, styles and the document head are dropped, block elements become
/// line breaks and character references are decoded.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut output = String::with_capacity(html.len() / 2);
    collect_text(document.root_element(), &mut output);
    clean_whitespace(&output)
}

fn collect_text(element: ElementRef<'_>, output: &mut String) {
    for child in element.children() {
        if let Node::Text(text) = child.value() {
            output.push_str(text);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };

        let name = child.value().name();
        if HIDDEN_ELEMENTS.contains(&name) {
            continue;
        }
        if name == "br" {
            output.push('\n');
            continue;
        }

        let block = BLOCK_ELEMENTS.contains(&name);
        if block {
            output.push('\n');
        }
        collect_text(child, output);
        if block {
            output.push('\n');
        } else if matches!(name, "td" | "th") {
            output.push(' ');
        }
    }
}

/// Extract the document title from `<title>`
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "title")?;
    let title = clean_whitespace(&title.text().collect::<String>());
    (!title.is_empty()).then_some(title)
}

/// Decode HTML character references (`&amp;`, `&#39;`, `&#x2014;`, ...)
///
/// Unknown or malformed references are left as-is.
pub fn decode_entities(s: &str) -> String {
    let mut output = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        output.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&end| end > 0 && end <= MAX_ENTITY_LEN)
            .and_then(|end| decode_entity(&after[..end]).map(|ch| (ch, end)));

        match decoded {
            Some((ch, end)) => {
                output.push(ch);
                rest = &after[end + 1..];
            }
            None => {
                output.push('&');
                rest = after;
            }
        }
    }

    output.push_str(rest);
    output
}

fn decode_entity(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "mdash" => '—',
        "ndash" => '–',
        "hellip" => '…',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "laquo" => '«',
        "raquo" => '»',
        "middot" => '·',
        "bull" => '•',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            return char::from_u32(code);
        }
    };
    Some(ch)
}

/// Collapse whitespace runs, trim lines and keep at most one blank line
pub fn clean_whitespace(s: &str) -> String {
    let mut output = String::with_capacity(s.len());
    let mut blank_lines = 0;

    for line in s.lines() {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            blank_lines += 1;
            continue;
        }
        if !output.is_empty() {
            output.push_str(if blank_lines > 0 { "\n\n" } else { "\n" });
        }
        output.push_str(&words.join(" "));
        blank_lines = 0;
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_html_by_content_type() {
        assert!(is_html(Some("text/html"), ""));
        assert!(is_html(Some("text/html; charset=utf-8"), ""));
        assert!(is_html(Some("application/xhtml+xml"), ""));
        assert!(!is_html(Some("text/plain"), ""));
        assert!(!is_html(Some("application/json"), ""));
    }

    #[test]
    fn test_is_html_by_body() {
        assert!(is_html(None, "<!DOCTYPE html><html>"));
        assert!(is_html(None, "  <!doctype html>"));
        assert!(is_html(None, "<HTML><body>"));
        assert!(!is_html(None, "Hello world"));
        assert!(!is_html(None, "{\"json\": true}"));
    }

    #[test]
    fn test_html_to_text_paragraphs() {
        let text = html_to_text("<p>Hello</p><p>World</p>");
        assert_eq!(text, "Hello\n\nWorld");
    }

    #[test]
    fn test_html_to_text_inline_elements_stay_on_line() {
        let text = html_to_text("<p>A <strong>bold</strong> and <a href=\"/x\">linked</a> word</p>");
        assert_eq!(text, "A bold and linked word");
    }

    #[test]
    fn test_html_to_text_drops_head_scripts_and_styles() {
        let html = r#"<!DOCTYPE html>
<html>
<head><title>Page Title</title><style>p { color: red; }</style></head>
<body>
  <p>Before</p>
  <script>if (a < b && c > d) { alert('bad'); }</script>
  <noscript>Enable JavaScript</noscript>
  <p>After</p>
</body>
</html>"#;
        let text = html_to_text(html);
        assert!(text.contains("Before"));
        assert!(text.contains("After"));
        assert!(!text.contains("alert"));
        assert!(!text.contains("color"));
        assert!(!text.contains("Page Title"));
        assert!(!text.contains("JavaScript"));
    }

    #[test]
    fn test_html_to_text_skips_comments() {
        let text = html_to_text("<p>Visible<!-- <p>hidden</p> --> text</p>");
        assert_eq!(text, "Visible text");
    }

    #[test]
    fn test_html_to_text_quoted_gt_in_attribute() {
        let text = html_to_text("<div data-x=\"a>b\">Content</div>");
        assert_eq!(text, "Content");
    }

    #[test]
    fn test_html_to_text_stray_less_than() {
        let text = html_to_text("<p>1 < 2</p>");
        assert_eq!(text, "1 < 2");
    }

    #[test]
    fn test_html_to_text_omitted_head_end_tag() {
        let html = "<!DOCTYPE html><html><head><title>T</title><meta charset=utf-8><body><p>Hello visible world</p></body></html>";
        assert_eq!(html_to_text(html), "Hello visible world");

        let html = "<html><head><title>T</title><p>Body starts implicitly</p>";
        assert_eq!(html_to_text(html), "Body starts implicitly");
    }

    #[test]
    fn test_html_to_text_apostrophe_in_unquoted_attribute() {
        let html = "<p><a title=don't href=/x>link</a> first paragraph</p><p>second paragraph</p><p>it's the third</p>";
        assert_eq!(
            html_to_text(html),
            "link first paragraph\n\nsecond paragraph\n\nit's the third"
        );
    }

    #[test]
    fn test_html_to_text_decodes_entities_and_breaks() {
        let text = html_to_text("<p>Fish &amp; chips<br>&#8212; daily</p>");
        assert_eq!(text, "Fish & chips\n\u{2014} daily");
    }

    #[test]
    fn test_html_to_text_markup_only_is_empty() {
        let text = html_to_text("<html><head><title>T</title></head><body>  <div> </div></body></html>");
        assert!(text.is_empty());
    }

    #[test]
    fn test_html_to_text_table_cells() {
        let text = html_to_text("<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>");
        assert_eq!(text, "a b\n\nc");
    }

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>  My &amp; Page\n</title></head></html>";
        assert_eq!(extract_title(html), Some("My & Page".to_string()));
        assert_eq!(extract_title("<TITLE lang=\"en\">Upper</TITLE>"), Some("Upper".to_string()));
        assert_eq!(extract_title("<title></title>"), None);
        assert_eq!(extract_title("<p>No title</p>"), None);
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(
            decode_entities("&amp; &lt; &gt; &quot; &apos; &#39; &#x2014; &mdash; &copy;"),
            "& < > \" ' ' — — ©"
        );
        assert_eq!(decode_entities("fish &amp chips"), "fish &amp chips");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
        assert_eq!(decode_entities("a & b; c"), "a & b; c");
        assert_eq!(decode_entities("trailing &"), "trailing &");
    }

    #[test]
    fn test_decode_entities_double_escaped() {
        let once = decode_entities("it&amp;#39;s");
        assert_eq!(once, "it&#39;s");
        assert_eq!(decode_entities(&once), "it's");
    }

    #[test]
    fn test_clean_whitespace() {
        let input = "  hello   world  \n\n\n\n  test  ";
        assert_eq!(clean_whitespace(input), "hello world\n\ntest");
        assert_eq!(clean_whitespace("a\nb"), "a\nb");
        assert_eq!(clean_whitespace(" \n\t\n "), "");
    }
}
