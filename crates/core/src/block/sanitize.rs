//! Rich text markup sanitation applied on every write of a `richtext` block.

use std::sync::LazyLock;

use regex::Regex;

/// Elements removed together with everything inside them.
const REMOVED_ELEMENTS: &[&str] = &["script", "style", "iframe", "object", "embed"];

/// Elements whose tags are dropped while their inner text is kept.
const STRIPPED_TAGS: &[&str] = &[
    "form", "input", "button", "link", "meta", "base", "textarea", "select",
];

static REMOVED_ELEMENT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    REMOVED_ELEMENTS
        .iter()
        .flat_map(|tag| {
            [
                // Element with its content.
                format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"),
                // Unterminated or stray tags.
                format!(r"(?i)</?{tag}\b[^>]*>"),
            ]
        })
        .map(|pattern| Regex::new(&pattern).expect("valid regex"))
        .collect()
});

static STRIPPED_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)</?(?:{})\b[^>]*>", STRIPPED_TAGS.join("|"))).expect("valid regex")
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]+>").expect("valid regex"));

static EVENT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)[\s/]+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).expect("valid regex")
});

static JS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(href|src)\s*=\s*(["']?)\s*javascript:[^"'\s>]*"#).expect("valid regex")
});

/// Strip disallowed markup from rich text.
///
/// Removes active elements (`script`, `style`, `iframe`, `object`, `embed`)
/// including their content, drops form-like tags but keeps their text, and
/// removes `on*` event handler attributes and `javascript:` URLs from the
/// remaining tags. Passes repeat until nothing changes, so markup split
/// around a removed element cannot reassemble into a disallowed one.
/// Sanitizing already-clean markup returns it unchanged.
pub fn sanitize_markup(html: &str) -> String {
    let mut out = html.to_string();
    loop {
        let next = sanitize_pass(&out);
        if next == out {
            return out;
        }
        out = next;
    }
}

/// One pass over every rule. Each rule only removes or shortens text, so
/// repeated passes reach a fixed point.
fn sanitize_pass(html: &str) -> String {
    let mut out = html.to_string();
    for re in REMOVED_ELEMENT_RES.iter() {
        out = re.replace_all(&out, "").into_owned();
    }
    out = STRIPPED_TAG_RE.replace_all(&out, "").into_owned();
    TAG_RE
        .replace_all(&out, |caps: &regex::Captures<'_>| {
            let tag = EVENT_ATTR_RE.replace_all(&caps[0], "");
            JS_URL_RE.replace_all(&tag, "$1=$2#").into_owned()
        })
        .into_owned()
}
