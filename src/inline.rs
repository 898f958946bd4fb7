use std::sync::OnceLock;

use regex::Regex;

use crate::block::TextSpan;

// Alternatives are tried in order at each position, so bold wins over italic.
fn inline_pattern() -> &'static Regex {
    static INLINE: OnceLock<Regex> = OnceLock::new();
    INLINE.get_or_init(|| {
        Regex::new(concat!(
            r"\*\*(?P<bold>.+?)\*\*",
            r"|\*(?P<star>.+?)\*",
            r"|_(?P<under>.+?)_",
            r"|`(?P<code>[^`]+)`",
            r"|\[(?P<label>[^\]]+)\]\((?P<url>[^)]+)\)",
        ))
        .expect("Invalid inline regex")
    })
}

/// Parse one line of inline markup into flat styled spans.
///
/// Delimiters never nest: the first alternative matching at a position
/// consumes up to its own (shortest) closing delimiter. Text outside any
/// match becomes plain spans, so concatenating the spans gives back the
/// input minus the markup.
pub fn parse_inline(text: &str) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    let mut pos = 0;

    for caps in inline_pattern().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > pos {
            spans.push(TextSpan::plain(&text[pos..whole.start()]));
        }

        let span = if let Some(m) = caps.name("bold") {
            TextSpan::bold(m.as_str())
        } else if let Some(m) = caps.name("star").or_else(|| caps.name("under")) {
            TextSpan::italic(m.as_str())
        } else if let Some(m) = caps.name("code") {
            TextSpan::code(m.as_str())
        } else if let (Some(label), Some(url)) = (caps.name("label"), caps.name("url")) {
            TextSpan::link(label.as_str(), url.as_str())
        } else {
            TextSpan::plain(whole.as_str())
        };
        spans.push(span);
        pos = whole.end();
    }

    if pos < text.len() {
        spans.push(TextSpan::plain(&text[pos..]));
    }

    if spans.is_empty() {
        spans.push(TextSpan::plain(text));
    }

    spans
}

/// The text of `spans` with all styling dropped.
pub fn plain_text(spans: &[TextSpan]) -> String {
    spans.iter().map(|span| span.text.as_str()).collect()
}
