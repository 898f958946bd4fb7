use std::sync::OnceLock;

use regex::Regex;

use crate::block::{Alignment, Block, Table, TextSpan};
use crate::inline::parse_inline;

fn heading_pattern() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("Invalid heading regex"))
}

fn bold_pattern() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("Invalid bold regex"))
}

fn bullet_pattern() -> &'static Regex {
    static BULLET: OnceLock<Regex> = OnceLock::new();
    BULLET.get_or_init(|| Regex::new(r"^(\s*)[-*]\s+(.+)$").expect("Invalid bullet regex"))
}

/// Parse markdown text into a flat list of blocks.
///
/// Never fails: anything unrecognized ends up in a paragraph.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let mut state = LineParser {
        lines: markdown.lines().collect(),
        pos: 0,
    };
    let mut blocks = Vec::new();

    while let Some(line) = state.current() {
        if line.trim().is_empty() {
            state.pos += 1;
            continue;
        }
        if let Some(block) = state.next_block(line) {
            blocks.push(block);
        }
    }

    blocks
}

struct LineParser<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineParser<'a> {
    fn current(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    /// Consume at least one line starting at the cursor.
    fn next_block(&mut self, line: &'a str) -> Option<Block> {
        let trimmed = line.trim();

        if let Some(caps) = heading_pattern().captures(line) {
            self.pos += 1;
            let level = caps[1].len() as u8;
            let text = bold_pattern().replace_all(caps[2].trim(), "$1").into_owned();
            return Some(Block::Heading { level, text });
        }

        if let Some(language) = trimmed.strip_prefix("```") {
            self.pos += 1;
            return Some(self.code_block(language.trim()));
        }

        if is_rule(line) {
            self.pos += 1;
            return Some(Block::HorizontalRule);
        }

        if self.is_table_start(self.pos) {
            return Some(Block::Table(self.table()));
        }

        if let Some(caps) = bullet_pattern().captures(line) {
            self.pos += 1;
            let indent_level = caps[1].chars().count() / 2;
            return Some(Block::BulletItem {
                spans: parse_inline(&caps[2]),
                indent_level,
            });
        }

        if trimmed.starts_with('>') {
            self.pos += 1;
            let text = trimmed.trim_start_matches('>').trim();
            if text.is_empty() {
                return None;
            }
            let spans = parse_inline(text)
                .into_iter()
                .map(|span| TextSpan {
                    italic: true,
                    ..span
                })
                .collect();
            return Some(Block::Paragraph { spans });
        }

        if trimmed.starts_with('→') {
            self.pos += 1;
            return Some(Block::Paragraph {
                spans: parse_inline(trimmed),
            });
        }

        Some(self.paragraph())
    }

    fn code_block(&mut self, language: &str) -> Block {
        let mut code_lines = Vec::new();
        while let Some(line) = self.current() {
            self.pos += 1;
            if line.trim().starts_with("```") {
                break;
            }
            code_lines.push(line);
        }
        Block::CodeBlock {
            text: code_lines.join("\n"),
            language: language.to_string(),
        }
    }

    fn is_table_start(&self, index: usize) -> bool {
        match (self.lines.get(index), self.lines.get(index + 1)) {
            (Some(line), Some(next)) => line.contains('|') && is_separator(next),
            _ => false,
        }
    }

    fn table(&mut self) -> Table {
        let header_cells = split_row(self.lines[self.pos]);
        let separator = split_row(self.lines[self.pos + 1]);
        self.pos += 2;

        let mut data_rows = Vec::new();
        while let Some(line) = self.current() {
            if !line.contains('|') || line.trim().is_empty() {
                break;
            }
            data_rows.push(split_row(line));
            self.pos += 1;
        }

        let column_alignment = (0..header_cells.len())
            .map(|c| separator.get(c).map(|cell| alignment(cell)).unwrap_or_default())
            .collect();

        Table {
            header_cells,
            data_rows,
            column_alignment,
        }
    }

    fn paragraph(&mut self) -> Block {
        let mut para_lines = Vec::new();
        while let Some(line) = self.current() {
            if !para_lines.is_empty() && self.ends_paragraph(line) {
                break;
            }
            para_lines.push(line.trim());
            self.pos += 1;
        }
        Block::Paragraph {
            spans: parse_inline(&para_lines.join(" ")),
        }
    }

    fn ends_paragraph(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.is_empty()
            || heading_pattern().is_match(line)
            || trimmed.starts_with("```")
            || trimmed.starts_with('|')
            || is_rule(line)
            || self.is_table_start(self.pos)
            || bullet_pattern().is_match(line)
    }
}

fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-')
}

fn is_separator(line: &str) -> bool {
    line.contains(['-', ':'])
        && line
            .chars()
            .all(|c| c == '-' || c == ':' || c == '|' || c.is_whitespace())
}

fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(|cell| cell.trim().to_string()).collect()
}

fn alignment(separator_cell: &str) -> Alignment {
    let cell = separator_cell.trim();
    if cell.starts_with(':') && cell.ends_with(':') {
        Alignment::Center
    } else if cell.ends_with(':') {
        Alignment::End
    } else {
        Alignment::Start
    }
}
