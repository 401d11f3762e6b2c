//! Builtin sanitization passes.
//!
//! Each pass is a function `&str -> String` applied in sequence by the
//! [`Pipeline`](crate::Pipeline). Passes never fail: malformed input degrades
//! to best-effort output so a broken description cannot block a render.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Matches a complete HTML tag, tolerating `>` inside quoted attribute values.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"</?[a-zA-Z][a-zA-Z0-9]*(?:"[^"]*"|'[^']*'|[^>"'])*>"#).expect("valid regex")
});

/// Extract the lowercased element name from a tag matched by [`TAG_RE`].
fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Elements that never take a closing tag.
fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Apply `f` to every text segment outside of tags, leaving tag markup and
/// the content of `code`/`pre`/`script`/`style` elements untouched.
fn map_text_segments(text: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut skip_depth = 0usize;

    for m in TAG_RE.find_iter(text) {
        let segment = &text[last..m.start()];
        if skip_depth == 0 {
            out.push_str(&f(segment));
        } else {
            out.push_str(segment);
        }

        let tag = m.as_str();
        let name = tag_name(tag);
        if matches!(name.as_str(), "code" | "pre" | "script" | "style") {
            if tag.starts_with("</") {
                skip_depth = skip_depth.saturating_sub(1);
            } else {
                skip_depth += 1;
            }
        }
        out.push_str(tag);
        last = m.end();
    }

    let tail = &text[last..];
    if skip_depth == 0 {
        out.push_str(&f(tail));
    } else {
        out.push_str(tail);
    }
    out
}

// ---------------------------------------------------------------------------
// Pass 1: Allow-list markup filter
// ---------------------------------------------------------------------------

/// Tags that survive sanitization. Everything else is stripped, inner text
/// kept, except `script`/`style` which are removed with their content.
const DEFAULT_ALLOWED_TAGS: &[&str] = &[
    "a",
    "abbr",
    "acronym",
    "b",
    "blockquote",
    "br",
    "code",
    "del",
    "em",
    "i",
    "li",
    "ol",
    "p",
    "pre",
    "q",
    "span",
    "strong",
    "ul",
];

/// Attributes kept on allowed tags. Event handlers and style never survive.
const ALLOWED_ATTRS: &[&str] = &["href", "title", "cite", "class", "rel"];

static SCRIPT_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex")
});

static STYLE_ELEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid regex"));

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z][a-zA-Z0-9-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("valid regex")
});

/// Strip markup not on the allow-list, keeping inner text.
pub(crate) fn filter_markup(text: &str, extra_allowed: &[String]) -> String {
    // Dangerous elements go first, content and all.
    let text = SCRIPT_ELEMENT_RE.replace_all(text, "");
    let text = STYLE_ELEMENT_RE.replace_all(&text, "");
    let text = COMMENT_RE.replace_all(&text, "");

    TAG_RE
        .replace_all(&text, |caps: &regex::Captures| {
            let tag = &caps[0];
            let name = tag_name(tag);

            let allowed = DEFAULT_ALLOWED_TAGS.contains(&name.as_str())
                || extra_allowed.iter().any(|t| t == &name);
            if !allowed {
                return String::new();
            }

            if tag.starts_with("</") {
                return format!("</{name}>");
            }

            let mut rebuilt = format!("<{name}");
            for attr in ATTR_RE.captures_iter(tag) {
                let attr_name = attr[1].to_ascii_lowercase();
                if !ALLOWED_ATTRS.contains(&attr_name.as_str()) {
                    continue;
                }
                let value = attr
                    .get(2)
                    .or_else(|| attr.get(3))
                    .or_else(|| attr.get(4))
                    .map(|m| m.as_str())
                    .unwrap_or("");
                if attr_name == "href"
                    && value.trim().to_ascii_lowercase().starts_with("javascript:")
                {
                    continue;
                }
                rebuilt.push_str(&format!(" {attr_name}=\"{}\"", value.replace('"', "&quot;")));
            }
            if is_void_element(&name) {
                rebuilt.push_str(" />");
            } else {
                rebuilt.push('>');
            }
            rebuilt
        })
        .to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Auto-link bare URLs
// ---------------------------------------------------------------------------

/// A bare URL must follow start-of-text, whitespace, or an opening paren.
/// URLs already inside markup follow `"`, `=`, or `>` and are skipped,
/// which also makes the pass idempotent.
static BARE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(^|[\s(])(https?://[^\s<>"']+)"#).expect("valid regex")
});

/// Wrap bare `http(s)://` URLs in anchor tags.
pub(crate) fn auto_link(text: &str) -> String {
    BARE_URL_RE
        .replace_all(text, |caps: &regex::Captures| {
            let prefix = &caps[1];
            let (link, trailing) = split_trailing_punctuation(&caps[2]);

            if Url::parse(link).is_err() {
                return caps[0].to_string();
            }

            format!("{prefix}<a href=\"{link}\">{link}</a>{trailing}")
        })
        .to_string()
}

/// Peel sentence punctuation off the end of a matched URL.
fn split_trailing_punctuation(url: &str) -> (&str, &str) {
    let mut end = url.len();
    for c in url.chars().rev() {
        let strip = matches!(c, '.' | ',' | ';' | ':' | '!' | '?')
            || (c == ')' && !url.contains('('));
        if strip {
            end -= c.len_utf8();
        } else {
            break;
        }
    }
    url.split_at(end)
}

// ---------------------------------------------------------------------------
// Pass 3: Balance tags
// ---------------------------------------------------------------------------

/// Close unclosed tags and drop stray closing tags.
///
/// Stack-based: a closing tag that matches an open element closes every
/// element nested inside it first; a closing tag with no open counterpart
/// is dropped; elements still open at the end are closed in reverse order.
pub(crate) fn balance_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut stack: Vec<String> = Vec::new();
    let mut last = 0;

    for m in TAG_RE.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        last = m.end();

        let tag = m.as_str();
        let name = tag_name(tag);

        if is_void_element(&name) {
            out.push_str(tag);
            continue;
        }

        if tag.starts_with("</") {
            if let Some(pos) = stack.iter().rposition(|open| *open == name) {
                // Close everything nested inside the element first.
                while stack.len() > pos + 1 {
                    let inner = stack.pop().unwrap_or_default();
                    out.push_str(&format!("</{inner}>"));
                }
                stack.pop();
                out.push_str(tag);
            }
            // No open counterpart: drop the stray closer.
        } else if tag.ends_with("/>") {
            out.push_str(tag);
        } else {
            stack.push(name);
            out.push_str(tag);
        }
    }

    out.push_str(&text[last..]);

    while let Some(open) = stack.pop() {
        out.push_str(&format!("</{open}>"));
    }
    out
}

// ---------------------------------------------------------------------------
// Pass 4: Typographic substitutions
// ---------------------------------------------------------------------------

/// Smart quotes, dashes, and ellipses, applied only to text outside tags
/// and outside `code`/`pre` content.
pub(crate) fn texturize(text: &str) -> String {
    map_text_segments(text, texturize_segment)
}

fn texturize_segment(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let mut out = String::with_capacity(segment.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let prev = if i > 0 { Some(chars[i - 1]) } else { None };
        let next = chars.get(i + 1).copied();

        match c {
            '.' if next == Some('.') && chars.get(i + 2) == Some(&'.') => {
                out.push('…');
                i += 3;
            }
            '-' if next == Some('-') => {
                if chars.get(i + 2) == Some(&'-') {
                    out.push('—');
                    i += 3;
                } else {
                    out.push('–');
                    i += 2;
                }
            }
            '"' => {
                if opens_quote(prev) {
                    out.push('“');
                } else {
                    out.push('”');
                }
                i += 1;
            }
            '\'' => {
                let between_letters = prev.is_some_and(|p| p.is_alphanumeric())
                    && next.is_some_and(|n| n.is_alphanumeric());
                if between_letters {
                    out.push('’');
                } else if opens_quote(prev) {
                    out.push('‘');
                } else {
                    out.push('’');
                }
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// A quote opens after start-of-segment, whitespace, or an opening bracket.
fn opens_quote(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(p) => p.is_whitespace() || matches!(p, '(' | '[' | '{' | '—' | '–'),
    }
}

// ---------------------------------------------------------------------------
// Pass 5: Emoticon conversion
// ---------------------------------------------------------------------------

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+").expect("valid regex"));

fn smiley_glyph(token: &str) -> Option<&'static str> {
    Some(match token {
        ":)" | ":-)" => "🙂",
        ":(" | ":-(" => "🙁",
        ";)" | ";-)" => "😉",
        ":D" | ":-D" => "😀",
        ":P" | ":-P" => "😛",
        ":?" | ":-?" => "😕",
        _ => return None,
    })
}

/// Convert whitespace-delimited emoticon tokens to their canonical glyph,
/// outside tags and `code`/`pre` content only.
pub(crate) fn convert_smilies(text: &str) -> String {
    map_text_segments(text, |segment| {
        TOKEN_RE
            .replace_all(segment, |caps: &regex::Captures| {
                let token = &caps[0];
                smiley_glyph(token).unwrap_or(token).to_string()
            })
            .to_string()
    })
}

// ---------------------------------------------------------------------------
// Pass 6: Entity-encode stray characters
// ---------------------------------------------------------------------------

/// A `&` already beginning a named or numeric entity reference.
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:[a-zA-Z][a-zA-Z0-9]{1,7}|#[0-9]{1,6}|#[xX][0-9a-fA-F]{1,6});")
        .expect("valid regex")
});

/// Encode bare ampersands as `&amp;` and drop stray control characters.
/// Ampersands that already begin an entity are left alone (idempotence).
pub(crate) fn encode_bare_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        match c {
            '&' if !ENTITY_RE.is_match(&text[i..]) => out.push_str("&amp;"),
            c if c.is_control() && !matches!(c, '\n' | '\t' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Pass 7: Strip storage-layer slash escaping
// ---------------------------------------------------------------------------

/// Undo backslash escaping introduced by the storage layer.
///
/// Runs to a fixed point so the result is stable under re-application:
/// any depth of redundant escaping collapses, and a second run of the
/// whole pipeline finds nothing left to strip.
pub(crate) fn strip_slashes(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = strip_one_level(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_one_level(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const NO_EXTRA: &[String] = &[];

    #[test]
    fn filter_markup_removes_script_with_content() {
        let input = "<script>alert('x')</script>Safe text";
        assert_eq!(filter_markup(input, NO_EXTRA), "Safe text");
    }

    #[test]
    fn filter_markup_strips_disallowed_keeps_text() {
        let input = "<div class=\"wrap\">Inner <em>text</em></div>";
        assert_eq!(filter_markup(input, NO_EXTRA), "Inner <em>text</em>");
    }

    #[test]
    fn filter_markup_drops_event_handlers() {
        let input = "<a href=\"https://example.com\" onclick=\"steal()\">link</a>";
        let result = filter_markup(input, NO_EXTRA);
        assert_eq!(result, "<a href=\"https://example.com\">link</a>");
    }

    #[test]
    fn filter_markup_drops_javascript_href() {
        let input = "<a href=\"javascript:alert(1)\">x</a>";
        assert_eq!(filter_markup(input, NO_EXTRA), "<a>x</a>");
    }

    #[test]
    fn filter_markup_honors_extra_allowed() {
        let input = "<kbd>Ctrl</kbd>";
        assert_eq!(filter_markup(input, NO_EXTRA), "Ctrl");
        assert_eq!(filter_markup(input, &["kbd".to_string()]), "<kbd>Ctrl</kbd>");
    }

    #[test]
    fn auto_link_wraps_bare_url() {
        let result = auto_link("See https://example.com/docs for details.");
        assert_eq!(
            result,
            "See <a href=\"https://example.com/docs\">https://example.com/docs</a> for details."
        );
    }

    #[test]
    fn auto_link_trims_trailing_punctuation() {
        let result = auto_link("Read https://example.com/page.");
        assert!(result.ends_with("</a>."));
    }

    #[test]
    fn auto_link_skips_existing_anchor() {
        let input = "<a href=\"https://example.com\">https://example.com</a>";
        assert_eq!(auto_link(input), input);
    }

    #[test]
    fn balance_tags_closes_unclosed() {
        assert_eq!(
            balance_tags("<em>emphasis <strong>both"),
            "<em>emphasis <strong>both</strong></em>"
        );
    }

    #[test]
    fn balance_tags_drops_stray_closer() {
        assert_eq!(balance_tags("text</em> more"), "text more");
    }

    #[test]
    fn balance_tags_leaves_balanced_alone() {
        let input = "<p>fine <br /> text</p>";
        assert_eq!(balance_tags(input), input);
    }

    #[test]
    fn texturize_quotes_and_dashes() {
        let result = texturize("\"quoted\" -- it's... done");
        assert_eq!(result, "“quoted” – it’s… done");
    }

    #[test]
    fn texturize_skips_code_content() {
        let input = "<code>x = \"raw\" -- y</code> but \"this\"";
        let result = texturize(input);
        assert!(result.contains("x = \"raw\" -- y"));
        assert!(result.contains("“this”"));
    }

    #[test]
    fn texturize_skips_tag_attributes() {
        let input = "<span class=\"note\">it's</span>";
        let result = texturize(input);
        assert!(result.starts_with("<span class=\"note\">"));
        assert!(result.contains("it’s"));
    }

    #[test]
    fn convert_smilies_maps_tokens() {
        assert_eq!(convert_smilies("works :)"), "works 🙂");
        // Only whole tokens convert.
        assert_eq!(convert_smilies("ratio 1:2"), "ratio 1:2");
    }

    #[test]
    fn encode_bare_entities_escapes_lone_ampersand() {
        assert_eq!(encode_bare_entities("fish & chips"), "fish &amp; chips");
    }

    #[test]
    fn encode_bare_entities_keeps_existing_entities() {
        assert_eq!(encode_bare_entities("fish &amp; chips"), "fish &amp; chips");
        assert_eq!(encode_bare_entities("&#8212; &hellip;"), "&#8212; &hellip;");
    }

    #[test]
    fn strip_slashes_collapses_multiple_levels() {
        assert_eq!(strip_slashes(r#"it\'s"#), "it's");
        assert_eq!(strip_slashes(r#"it\\\'s"#), "it's");
    }

    #[test]
    fn strip_slashes_is_stable() {
        let once = strip_slashes(r"a\\b");
        assert_eq!(strip_slashes(&once), once);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(filter_markup("", NO_EXTRA), "");
        assert_eq!(auto_link(""), "");
        assert_eq!(balance_tags(""), "");
        assert_eq!(texturize(""), "");
        assert_eq!(convert_smilies(""), "");
        assert_eq!(encode_bare_entities(""), "");
        assert_eq!(strip_slashes(""), "");
    }
}
