use crate::block::{Block, TextSpan};

/// Length of `text` in the remote's offset unit (UTF-16 code units).
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// What a style range does to the text under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleKind {
    Heading(u8),
    Bold,
    Italic,
    InlineCode,
    Link(String),
    Bullet(usize),
    CodeBlock,
    Rule,
}

/// A style applied to `[start, end)` of a flow payload. `start < end` always.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleOp {
    pub start: usize,
    pub end: usize,
    pub kind: StyleKind,
}

/// One text segment compiled to a single insertable string plus styles
/// addressed by offsets local to that string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlowPayload {
    pub text: String,
    pub styles: Vec<StyleOp>,
}

impl FlowPayload {
    pub fn len(&self) -> usize {
        utf16_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Compile flowing blocks into one payload. Tables are materialized
/// separately and are skipped here.
pub fn compile_flow(blocks: &[Block], rule_text: &str) -> FlowPayload {
    let mut out = FlowBuilder::default();

    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                let start = out.pos;
                out.push(text);
                out.push("\n");
                out.style(start, StyleKind::Heading(*level));
            }
            Block::Paragraph { spans } => {
                out.push_spans(spans);
                out.push("\n");
            }
            Block::BulletItem {
                spans,
                indent_level,
            } => {
                let start = out.pos;
                out.push_spans(spans);
                out.push("\n");
                out.style(start, StyleKind::Bullet(*indent_level));
            }
            Block::CodeBlock { text, language } => {
                let start = out.pos;
                if !language.is_empty() {
                    out.push(&format!("[{language}]\n"));
                }
                out.push(text.trim_end_matches('\n'));
                out.push("\n");
                out.style(start, StyleKind::CodeBlock);
                // Unstyled spacer line after the block.
                out.push("\n");
            }
            Block::HorizontalRule => {
                let start = out.pos;
                out.push(rule_text);
                out.push("\n");
                out.style(start, StyleKind::Rule);
            }
            Block::Table(_) => {}
        }
    }

    FlowPayload {
        text: out.text,
        styles: out.styles,
    }
}

#[derive(Default)]
struct FlowBuilder {
    text: String,
    pos: usize,
    styles: Vec<StyleOp>,
}

impl FlowBuilder {
    fn push(&mut self, text: &str) {
        self.text.push_str(text);
        self.pos += utf16_len(text);
    }

    /// Style everything from `start` up to the current position, unless that
    /// range is empty.
    fn style(&mut self, start: usize, kind: StyleKind) {
        if start < self.pos {
            self.styles.push(StyleOp {
                start,
                end: self.pos,
                kind,
            });
        }
    }

    fn push_spans(&mut self, spans: &[TextSpan]) {
        for span in spans {
            let start = self.pos;
            self.push(&span.text);
            if span.bold {
                self.style(start, StyleKind::Bold);
            }
            if span.italic {
                self.style(start, StyleKind::Italic);
            }
            if span.code {
                self.style(start, StyleKind::InlineCode);
            }
            if let Some(url) = &span.link {
                self.style(start, StyleKind::Link(url.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_blocks;
    use pretty_assertions::assert_eq;

    fn op(start: usize, end: usize, kind: StyleKind) -> StyleOp {
        StyleOp { start, end, kind }
    }

    #[test]
    fn heading_and_styled_paragraph() {
        let blocks = parse_blocks("## Intro\n\nA **b** c\n");
        let payload = compile_flow(&blocks, "---");
        assert_eq!(payload.text, "Intro\nA b c\n");
        assert_eq!(
            payload.styles,
            vec![
                op(0, 6, StyleKind::Heading(2)),
                op(8, 9, StyleKind::Bold),
            ]
        );
    }

    #[test]
    fn bullet_range_includes_newline() {
        let blocks = parse_blocks("- one\n  - [two](http://t)\n");
        let payload = compile_flow(&blocks, "---");
        assert_eq!(payload.text, "one\ntwo\n");
        assert_eq!(
            payload.styles,
            vec![
                op(0, 4, StyleKind::Bullet(0)),
                op(4, 7, StyleKind::Link("http://t".into())),
                op(4, 8, StyleKind::Bullet(1)),
            ]
        );
    }

    #[test]
    fn code_block_with_language_and_spacer() {
        let blocks = vec![Block::CodeBlock {
            text: "let x = 1;\n\n".into(),
            language: "rust".into(),
        }];
        let payload = compile_flow(&blocks, "---");
        assert_eq!(payload.text, "[rust]\nlet x = 1;\n\n");
        assert_eq!(payload.styles, vec![op(0, 18, StyleKind::CodeBlock)]);
    }

    #[test]
    fn rule_uses_configured_glyphs() {
        let payload = compile_flow(&[Block::HorizontalRule], "──");
        assert_eq!(payload.text, "──\n");
        assert_eq!(payload.styles, vec![op(0, 3, StyleKind::Rule)]);
    }

    #[test]
    fn quote_styles_every_span_italic() {
        let payload = compile_flow(&parse_blocks("> a `b`"), "-");
        assert_eq!(payload.text, "a b\n");
        assert_eq!(
            payload.styles,
            vec![
                op(0, 2, StyleKind::Italic),
                op(2, 3, StyleKind::Italic),
                op(2, 3, StyleKind::InlineCode),
            ]
        );
    }

    #[test]
    fn empty_spans_emit_no_styles() {
        let blocks = vec![Block::Paragraph {
            spans: vec![TextSpan::bold(""), TextSpan::plain("x")],
        }];
        let payload = compile_flow(&blocks, "-");
        assert_eq!(payload.text, "x\n");
        assert!(payload.styles.is_empty());
    }

    #[test]
    fn offsets_count_utf16_units() {
        let payload = compile_flow(&parse_blocks("😀 **b**"), "-");
        assert_eq!(payload.styles, vec![op(3, 4, StyleKind::Bold)]);
        assert_eq!(payload.len(), 5);
    }

    #[test]
    fn no_blocks_empty_payload() {
        assert!(compile_flow(&[], "-").is_empty());
    }
}
