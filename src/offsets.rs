//! Turning locally addressed content into absolute edits.
//!
//! Flowing text is inserted in one piece, so its styles only need shifting by
//! the insertion point. Tables are different: the remote allocates the cells
//! and reports their offsets, the fill inserts must run back to front, and
//! styling waits for a fresh read of the filled table.

use crate::block::{Alignment, Table, TextSpan};
use crate::config::Config;
use crate::edit::{
    Dimension, EditOp, Link, ParagraphStyle, Range, Shading, TextStyle, WeightedFontFamily,
};
use crate::flow::{FlowPayload, StyleKind, utf16_len};
use crate::inline::{parse_inline, plain_text};
use crate::remote::TableHandle;

/// Edits inserting `payload` at `insert_at` and styling it. The insert comes
/// first; the style edits after it do not move any text.
pub fn flow_edits(payload: &FlowPayload, insert_at: usize, config: &Config) -> Vec<EditOp> {
    if payload.is_empty() {
        return Vec::new();
    }

    let mut edits = vec![EditOp::insert_text(insert_at, payload.text.clone())];
    for style in &payload.styles {
        let range = Range::new(insert_at + style.start, insert_at + style.end);
        edits.extend(style_edits(range, &style.kind, config));
    }
    edits
}

fn style_edits(range: Range, kind: &StyleKind, config: &Config) -> Vec<EditOp> {
    match kind {
        StyleKind::Heading(level) => vec![EditOp::paragraph_style(
            range,
            ParagraphStyle {
                named_style_type: Some(format!("HEADING_{}", (*level).clamp(1, 6))),
                ..ParagraphStyle::default()
            },
        )],
        StyleKind::Bold => vec![EditOp::text_style(range, bold())],
        StyleKind::Italic => vec![EditOp::text_style(range, italic())],
        StyleKind::InlineCode => vec![EditOp::text_style(
            range,
            monospace(config, config.code.inline_size),
        )],
        StyleKind::Link(url) => vec![EditOp::text_style(range, link(url, config))],
        StyleKind::Bullet(level) => {
            let mut edits = vec![EditOp::bullets(range, config.bullets.preset.clone())];
            if *level > 0 {
                let indent = Dimension::pt(*level as f32 * config.bullets.indent_per_level);
                edits.push(EditOp::paragraph_style(
                    range,
                    ParagraphStyle {
                        indent_start: Some(indent),
                        indent_first_line: Some(indent),
                        ..ParagraphStyle::default()
                    },
                ));
            }
            edits
        }
        StyleKind::CodeBlock => vec![
            EditOp::text_style(
                range,
                TextStyle {
                    foreground_color: Some(config.code.foreground.into()),
                    ..monospace(config, config.code.block_size)
                },
            ),
            EditOp::paragraph_style(
                range,
                ParagraphStyle {
                    shading: Some(Shading {
                        background_color: config.code.background.into(),
                    }),
                    space_above: Some(Dimension::pt(config.code.spacing)),
                    space_below: Some(Dimension::pt(config.code.spacing)),
                    ..ParagraphStyle::default()
                },
            ),
        ],
        StyleKind::Rule => vec![EditOp::text_style(
            range,
            TextStyle {
                foreground_color: Some(config.rule.color.into()),
                font_size: Some(Dimension::pt(config.rule.size)),
                ..TextStyle::default()
            },
        )],
    }
}

fn bold() -> TextStyle {
    TextStyle {
        bold: Some(true),
        ..TextStyle::default()
    }
}

fn italic() -> TextStyle {
    TextStyle {
        italic: Some(true),
        ..TextStyle::default()
    }
}

fn monospace(config: &Config, size: f32) -> TextStyle {
    TextStyle {
        weighted_font_family: Some(WeightedFontFamily {
            font_family: config.code.font_family.clone(),
        }),
        font_size: Some(Dimension::pt(size)),
        ..TextStyle::default()
    }
}

fn link(url: &str, config: &Config) -> TextStyle {
    TextStyle {
        link: Some(Link {
            url: url.to_string(),
        }),
        foreground_color: Some(config.links.color.into()),
        ..TextStyle::default()
    }
}

/// Fill inserts for a freshly created table, plus the length of text each
/// cell received.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFill {
    pub edits: Vec<EditOp>,
    /// `cell_lengths[row][column]`, zero for cells left empty.
    pub cell_lengths: Vec<Vec<usize>>,
}

/// Plan the text inserts filling `table` into the empty grid `handle`.
pub fn table_fill(handle: &TableHandle, table: &Table) -> TableFill {
    let rows = table.padded_rows();
    let mut cells: Vec<(usize, String)> = Vec::new();
    let mut cell_lengths = Vec::with_capacity(handle.row_count());

    for (r, row) in rows.iter().enumerate().take(handle.row_count()) {
        let mut lengths = Vec::with_capacity(row.len());
        for (c, raw) in row.iter().enumerate() {
            let text = plain_text(&parse_inline(raw));
            match handle.cell(r, c) {
                Some(cell) if !text.is_empty() => {
                    lengths.push(utf16_len(&text));
                    cells.push((cell.start_offset, text));
                }
                _ => lengths.push(0),
            }
        }
        cell_lengths.push(lengths);
    }

    // Each insert shifts everything after it, so inserts must go from the
    // last cell to the first: a target offset is only valid while no earlier
    // offset has received text.
    cells.sort_by(|a, b| b.0.cmp(&a.0));
    debug_assert!(cells.windows(2).all(|pair| pair[0].0 > pair[1].0));

    TableFill {
        edits: cells
            .into_iter()
            .map(|(offset, text)| EditOp::insert_text(offset, text))
            .collect(),
        cell_lengths,
    }
}

/// Styling for a filled table. `handle` must come from a read taken after the
/// fill was applied.
pub fn table_style_edits(
    handle: &TableHandle,
    table: &Table,
    cell_lengths: &[Vec<usize>],
    config: &Config,
) -> Vec<EditOp> {
    let mut edits = vec![EditOp::text_style(
        Range::new(handle.start_offset, handle.end_offset),
        TextStyle {
            font_size: Some(Dimension::pt(config.table.font_size)),
            ..TextStyle::default()
        },
    )];

    for (r, row) in table.padded_rows().iter().enumerate() {
        for (c, raw) in row.iter().enumerate() {
            let len = cell_lengths
                .get(r)
                .and_then(|lengths| lengths.get(c))
                .copied()
                .unwrap_or(0);
            let Some(cell) = handle.cell(r, c) else {
                continue;
            };
            if len == 0 {
                continue;
            }
            let start = cell.start_offset;
            let header = r == 0;

            if header {
                edits.push(EditOp::text_style(Range::new(start, start + len), bold()));
            }
            edits.extend(cell_span_edits(start, &parse_inline(raw), header, config));
            if table.alignment(c) != Alignment::Start {
                edits.push(EditOp::paragraph_style(
                    Range::new(start, start + len),
                    ParagraphStyle {
                        alignment: Some(table.alignment(c)),
                        ..ParagraphStyle::default()
                    },
                ));
            }
        }
    }

    edits.push(EditOp::row_background(
        handle.start_offset,
        0,
        0,
        table.column_count(),
        config.table.header_background,
    ));
    edits
}

fn cell_span_edits(start: usize, spans: &[TextSpan], header: bool, config: &Config) -> Vec<EditOp> {
    let mut edits = Vec::new();
    let mut offset = start;
    for span in spans {
        let range = Range::new(offset, offset + utf16_len(&span.text));
        offset = range.end_index;
        if range.is_empty() {
            continue;
        }
        // Header cells are bold as a whole already.
        if span.bold && !header {
            edits.push(EditOp::text_style(range, bold()));
        }
        if span.italic {
            edits.push(EditOp::text_style(range, italic()));
        }
        if span.code {
            edits.push(EditOp::text_style(range, monospace(config, config.table.code_size)));
        }
        if let Some(url) = &span.link {
            edits.push(EditOp::text_style(range, link(url, config)));
        }
    }
    edits
}
